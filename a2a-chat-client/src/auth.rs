//! Bearer token acquisition.

use a2a_chat_types::ChatError;
use serde::Deserialize;

/// Shape of the token endpoint reply: `{status, token}` or just `{token}`.
/// Only the token matters here; extra fields are ignored.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(default)]
    token: Option<String>,
}

/// Fetch a bearer token from the token endpoint.
///
/// Any failure here is a [`ChatError::Auth`]: the chat request is never
/// issued without a token once authentication is enabled.
pub(crate) async fn fetch_token(
    client: &reqwest::Client,
    url: &str,
) -> Result<String, ChatError> {
    tracing::debug!(url = %url, "fetching bearer token");

    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| ChatError::Auth(format!("token request failed: {e}")))?;

    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| ChatError::Auth(format!("token response read failed: {e}")))?;

    if !status.is_success() {
        return Err(ChatError::Auth(format!(
            "token endpoint returned HTTP {status}: {body}"
        )));
    }

    let parsed: TokenResponse = serde_json::from_str(&body)
        .map_err(|e| ChatError::Auth(format!("token response was not JSON: {e}")))?;

    match parsed.token {
        Some(token) if !token.is_empty() => Ok(token),
        _ => Err(ChatError::Auth(format!("token not found in response: {body}"))),
    }
}
