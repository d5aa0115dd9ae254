#![doc = include_str!("../README.md")]

pub(crate) mod auth;
pub mod client;
pub(crate) mod envelope;
pub(crate) mod error;
pub mod session;
pub(crate) mod streaming;

pub use client::A2aClient;
pub use session::ChatSession;

// Re-export the shared types for convenience
pub use a2a_chat_types::{
    AgentCard, AgentReply, AgentSkill, ChatError, ChatMessage, Sender, Session, Stats,
    StreamEvent, Transcript, TurnEvent, TurnReport, TurnStream,
};
