//! Error types for the a2a-chat crates.

/// Errors from chat client operations.
///
/// Every failure is scoped to the current user action: authentication
/// failures abort initialization, request and transport failures abort the
/// current turn. Nothing here is fatal to the process, and no operation
/// retries — a failed request requires the user to resend.
///
/// A malformed `data:` payload inside an otherwise healthy stream is *not* an
/// error; the reader reports it as a diagnostic and keeps going.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    /// Token acquisition failed before the chat request was issued.
    #[error("authentication failed: {0}")]
    Auth(String),
    /// The HTTP response status indicated failure.
    #[error("request failed with HTTP {status}: {body}")]
    Request {
        /// The HTTP status code.
        status: u16,
        /// The response body, parsed as text when available.
        body: String,
    },
    /// The connection or body read failed.
    #[error("transport error: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),
    /// The response body did not have the expected shape.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}
