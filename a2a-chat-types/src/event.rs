//! Decoded events from the SSE stream and the reader's output types.

use std::pin::Pin;

use futures::Stream;
use serde::Deserialize;

use crate::error::ChatError;

/// A decoded JSON payload from one `data:` line.
///
/// Known `kind` values get typed variants; anything else is preserved as raw
/// JSON so a novel or partial event never fails the batch.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind")]
pub enum StreamEvent {
    /// A chunk of produced content.
    #[serde(rename = "artifact-update")]
    ArtifactUpdate(ArtifactUpdate),
    /// A task state change. Carries no visible text.
    #[serde(rename = "status-update")]
    StatusUpdate(StatusUpdate),
    /// Any event with an unknown or absent `kind`.
    #[serde(untagged)]
    Other(serde_json::Value),
}

impl StreamEvent {
    /// The conversation context id, when the event carries one.
    #[must_use]
    pub fn context_id(&self) -> Option<&str> {
        match self {
            Self::ArtifactUpdate(update) => update.context_id.as_deref(),
            Self::StatusUpdate(update) => update.context_id.as_deref(),
            Self::Other(value) => value.get("contextId").and_then(serde_json::Value::as_str),
        }
    }
}

/// An `artifact-update` event.
#[derive(Debug, Clone, Deserialize)]
pub struct ArtifactUpdate {
    /// Conversation context id, when present.
    #[serde(rename = "contextId")]
    pub context_id: Option<String>,
    /// The artifact chunk. Events without one carry no text.
    #[serde(default)]
    pub artifact: Artifact,
}

impl ArtifactUpdate {
    /// The first part carrying non-empty text, if any.
    #[must_use]
    pub fn first_text(&self) -> Option<&str> {
        self.artifact
            .parts
            .iter()
            .filter_map(|part| part.text.as_deref())
            .find(|text| !text.is_empty())
    }
}

/// A unit of produced content, carrying one or more parts.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Artifact {
    /// Ordered content parts.
    #[serde(default)]
    pub parts: Vec<Part>,
}

/// One part of an artifact. Only text parts are rendered.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Part {
    /// Text content, when this is a text part.
    #[serde(default)]
    pub text: Option<String>,
}

/// A `status-update` event.
#[derive(Debug, Clone, Deserialize)]
pub struct StatusUpdate {
    /// Conversation context id, when present.
    #[serde(rename = "contextId")]
    pub context_id: Option<String>,
    /// Whether this is the terminal status for the task.
    #[serde(rename = "final", default)]
    pub is_final: bool,
    /// Raw task status object.
    #[serde(default)]
    pub status: Option<serde_json::Value>,
}

/// What the streaming response reader emits, one per processed `data:` line.
#[derive(Debug)]
pub enum TurnEvent {
    /// A successfully parsed stream event.
    Event(StreamEvent),
    /// A `data:` payload that was not valid JSON. Non-fatal; the reader
    /// continues with subsequent lines.
    Malformed {
        /// The offending payload.
        line: String,
        /// The parse error.
        error: String,
    },
    /// The underlying read failed. Terminal for this turn; previously emitted
    /// events remain applied.
    Error(ChatError),
}

/// Handle to a streaming chat response.
pub struct TurnStream {
    /// The stream of events. Consume with `StreamExt::next()`.
    pub receiver: Pin<Box<dyn Stream<Item = TurnEvent> + Send>>,
}
