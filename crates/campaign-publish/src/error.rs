use thiserror::Error;

/// Failure to publish to a social platform.
#[derive(Debug, Error)]
pub enum PublishError {
    /// A credential or id required by this publisher is not configured.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Instagram posts require an image.
    #[error("an image is required to publish to Instagram")]
    MissingImage,

    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The Graph API returned an error envelope or a non-2xx status.
    #[error("{context} failed: {message}")]
    Platform { context: String, message: String },

    /// A 2xx response did not carry the expected fields.
    #[error("unexpected response from {context}: {detail}")]
    UnexpectedResponse { context: String, detail: String },

    /// The media container reported an ERROR processing status.
    #[error("media processing failed with status {0}")]
    ProcessingFailed(String),

    /// The media container was still not ready after the polling budget.
    #[error("media was not ready after {attempts} status checks")]
    ProcessingTimeout { attempts: u32 },

    #[error("invalid image data: {0}")]
    InvalidImageData(String),
}
