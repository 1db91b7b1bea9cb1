use thiserror::Error;

/// Failure to obtain usable output from a generative model.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// The model API key (or another required setting) is absent.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The request was rejected before any network call.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The model API returned an error envelope or a non-2xx status.
    #[error("model API error: {0}")]
    Api(String),

    /// The response carried no generated text at all.
    #[error("model returned no content")]
    EmptyResponse,

    /// Generated text could not be reduced to the expected JSON object.
    #[error("malformed model output: {0}")]
    Malformed(String),

    /// The JSON object parsed but a required field was blank.
    #[error("model output is missing text for '{field}'")]
    Incomplete { field: &'static str },

    /// The image response had no image payload.
    #[error("no image returned from the image model")]
    EmptyImage,

    #[error("image payload could not be decoded: {0}")]
    InvalidImageData(String),
}
