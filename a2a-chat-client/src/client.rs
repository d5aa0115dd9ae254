//! A2A endpoint client struct and builder.

use a2a_chat_types::{AgentCard, AgentReply, ChatError, TurnStream};

use crate::auth::fetch_token;
use crate::envelope::{parse_rpc_reply, rpc_request, stream_request};
use crate::error::{map_http_status, map_reqwest_error};
use crate::streaming::stream_turn;

/// Well-known path where an A2A agent publishes its card.
const AGENT_CARD_PATH: &str = "/.well-known/agent.json";

/// Client for one A2A agent endpoint.
///
/// # Example
///
/// ```no_run
/// use a2a_chat_client::A2aClient;
///
/// let client = A2aClient::new("agent.example.com")
///     .token_url("https://ui.example.com/get-token");
/// ```
pub struct A2aClient {
    /// Endpoint URL, scheme included.
    pub(crate) endpoint: String,
    /// Token endpoint; `None` disables authentication.
    pub(crate) token_url: Option<String>,
    /// Shared HTTP client.
    pub(crate) client: reqwest::Client,
}

impl A2aClient {
    /// Create a client for the given endpoint.
    ///
    /// A bare host is assumed to be reachable over `https://`.
    #[must_use]
    pub fn new(endpoint: impl Into<String>) -> Self {
        let endpoint = endpoint.into();
        let endpoint = if endpoint.starts_with("http") {
            endpoint
        } else {
            format!("https://{endpoint}")
        };
        Self {
            endpoint,
            token_url: None,
            client: reqwest::Client::new(),
        }
    }

    /// Enable authentication: bearer tokens are fetched from this URL before
    /// the conversation starts.
    #[must_use]
    pub fn token_url(mut self, url: impl Into<String>) -> Self {
        self.token_url = Some(url.into());
        self
    }

    /// Build the agent card URL.
    pub(crate) fn agent_card_url(&self) -> String {
        format!("{}{AGENT_CARD_PATH}", self.endpoint.trim_end_matches('/'))
    }

    /// Fetch a bearer token from the configured token URL.
    ///
    /// Returns `Ok(None)` when authentication is disabled. A configured token
    /// endpoint that fails or yields no token is a [`ChatError::Auth`].
    pub async fn fetch_token(&self) -> Result<Option<String>, ChatError> {
        match &self.token_url {
            Some(url) => fetch_token(&self.client, url).await.map(Some),
            None => Ok(None),
        }
    }

    /// Fetch the agent card published by the endpoint.
    pub async fn fetch_agent_card(&self, token: Option<&str>) -> Result<AgentCard, ChatError> {
        let url = self.agent_card_url();
        tracing::debug!(url = %url, "fetching agent card");

        let mut request = self.client.get(&url);
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        let response = request.send().await.map_err(map_reqwest_error)?;

        let status = response.status();
        let body = response.text().await.map_err(map_reqwest_error)?;
        if !status.is_success() {
            return Err(map_http_status(status, &body));
        }

        serde_json::from_str(&body)
            .map_err(|e| ChatError::InvalidResponse(format!("agent card: {e}")))
    }

    /// Send one message and wait for the complete reply (the JSON-RPC
    /// `message/send` variant some deployments speak).
    pub async fn send_message(
        &self,
        text: &str,
        token: Option<&str>,
    ) -> Result<AgentReply, ChatError> {
        let body = rpc_request(&message_id(), text);
        tracing::debug!(endpoint = %self.endpoint, "sending message");

        let mut request = self.client.post(&self.endpoint).json(&body);
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        let response = request.send().await.map_err(map_reqwest_error)?;

        let status = response.status();
        let response_text = response.text().await.map_err(map_reqwest_error)?;
        if !status.is_success() {
            return Err(map_http_status(status, &response_text));
        }

        let json: serde_json::Value = serde_json::from_str(&response_text)
            .map_err(|e| ChatError::InvalidResponse(format!("invalid JSON response: {e}")))?;
        parse_rpc_reply(&json)
    }

    /// Send one message and stream the reply.
    ///
    /// A non-success status consumes the body into [`ChatError::Request`];
    /// otherwise the response body is handed to the streaming reader.
    pub async fn send_streaming(
        &self,
        text: &str,
        context_id: Option<&str>,
        token: Option<&str>,
    ) -> Result<TurnStream, ChatError> {
        let body = stream_request(text, context_id);
        tracing::debug!(endpoint = %self.endpoint, context_id = ?context_id, "sending streaming message");

        let mut request = self.client.post(&self.endpoint).json(&body);
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        let response = request.send().await.map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.map_err(map_reqwest_error)?;
            return Err(map_http_status(status, &body));
        }

        Ok(stream_turn(response))
    }
}

/// Message ids for the JSON-RPC variant, `msg-<unix-millis>`.
fn message_id() -> String {
    let now = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default();
    format!("msg-{}", now.as_millis())
}
