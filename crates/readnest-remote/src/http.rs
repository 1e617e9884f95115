//! Shared reqwest plumbing: client construction and status handling.

use std::time::Duration;

use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;

use crate::error::{RemoteError, RemoteResult};

pub(crate) fn build_client(timeout_secs: u64) -> RemoteResult<Client> {
    let client = Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .user_agent(concat!("readnest/", env!("CARGO_PKG_VERSION")))
        .build()?;
    Ok(client)
}

/// Passes 2xx responses through and turns everything else into a `RemoteError`.
pub(crate) async fn check_status(response: Response) -> RemoteResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    match status {
        StatusCode::UNAUTHORIZED => Err(RemoteError::Unauthorized),
        StatusCode::TOO_MANY_REQUESTS => Err(RemoteError::RateLimited),
        status => {
            let body = response.text().await.unwrap_or_default();
            Err(RemoteError::Api {
                status: status.as_u16(),
                message: error_message(&body),
            })
        }
    }
}

/// Reads the body as text and decodes it, so decode errors carry serde's message.
pub(crate) async fn decode_json<T: DeserializeOwned>(response: Response) -> RemoteResult<T> {
    let body = response.text().await?;
    Ok(serde_json::from_str(&body)?)
}

/// Pulls a readable message out of a BaaS / catalog error body.
///
/// The services answer with one of `{"msg"}`, `{"message"}`,
/// `{"error_description"}` or `{"error": {"message"}}`.
pub(crate) fn error_message(body: &str) -> String {
    let Ok(value) = serde_json::from_str::<serde_json::Value>(body) else {
        return body.trim().to_string();
    };

    ["msg", "message", "error_description"]
        .iter()
        .find_map(|key| value.get(key).and_then(|v| v.as_str()))
        .or_else(|| value.pointer("/error/message").and_then(|v| v.as_str()))
        .or_else(|| value.get("error").and_then(|v| v.as_str()))
        .map(str::to_string)
        .unwrap_or_else(|| body.trim().to_string())
}
