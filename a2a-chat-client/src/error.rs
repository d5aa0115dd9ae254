//! Internal helpers for mapping HTTP/reqwest failures to [`ChatError`].

use a2a_chat_types::ChatError;

/// Map a non-success HTTP status and its body to a [`ChatError`].
pub(crate) fn map_http_status(status: reqwest::StatusCode, body: &str) -> ChatError {
    ChatError::Request {
        status: status.as_u16(),
        body: body.to_string(),
    }
}

/// Map a [`reqwest::Error`] to a [`ChatError`].
pub(crate) fn map_reqwest_error(err: reqwest::Error) -> ChatError {
    ChatError::Transport(Box::new(err))
}
