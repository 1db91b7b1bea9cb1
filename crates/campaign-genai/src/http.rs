use std::time::Duration;

use reqwest::{Client, Response};

use crate::error::GenerationError;

pub(crate) fn build_client(user_agent: &str) -> Result<Client, GenerationError> {
    Ok(Client::builder()
        .connect_timeout(Duration::from_secs(10))
        .user_agent(user_agent)
        .build()?)
}

/// Reads a model response body, surfacing `{"error": {...}}` envelopes and
/// non-2xx statuses as [`GenerationError::Api`].
pub(crate) async fn read_json(response: Response) -> Result<serde_json::Value, GenerationError> {
    let status = response.status();
    let body = response.text().await?;

    let parsed = serde_json::from_str::<serde_json::Value>(&body);

    if let Ok(value) = &parsed {
        if let Some(error) = value.get("error").filter(|e| !e.is_null()) {
            let message = error
                .get("message")
                .and_then(serde_json::Value::as_str)
                .unwrap_or("unknown model API error");
            return Err(GenerationError::Api(message.to_string()));
        }
    }

    if !status.is_success() {
        return Err(GenerationError::Api(format!("model API returned HTTP {status}")));
    }

    parsed.map_err(|e| GenerationError::Malformed(format!("response body is not JSON: {e}")))
}
