//! High-level chat session: transcript, stats, and turn orchestration.

use std::time::Instant;

use a2a_chat_types::{
    AgentCard, ChatError, ChatMessage, Session, Stats, StreamEvent, Transcript, TurnEvent,
    TurnReport,
};
use futures::StreamExt;

use crate::client::A2aClient;

/// One user-facing conversation with an A2A agent.
///
/// Owns the session state, the transcript, and the stats accumulator with a
/// well-defined lifecycle: created here, context reset on
/// [`initialize`](Self::initialize), stats never reset.
///
/// [`send`](Self::send) takes `&mut self`, so turns cannot overlap on the
/// same conversation — the previous stream is fully drained (or failed)
/// before the next send can begin, and no two readers ever interleave into
/// the same transcript.
pub struct ChatSession {
    client: A2aClient,
    session: Session,
    transcript: Transcript,
    stats: Stats,
}

impl ChatSession {
    /// Create a session over the given client. No network traffic happens
    /// until [`initialize`](Self::initialize) or [`send`](Self::send).
    #[must_use]
    pub fn new(client: A2aClient) -> Self {
        Self {
            client,
            session: Session::new(),
            transcript: Transcript::new(),
            stats: Stats::new(),
        }
    }

    /// Prepare the conversation: acquire a bearer token when authentication
    /// is configured, forget any previous conversation context, and fetch the
    /// agent card.
    ///
    /// An authentication failure aborts initialization and no chat request is
    /// ever issued. The transcript and stats are left untouched, so
    /// re-initializing mid-conversation only resets the context id.
    pub async fn initialize(&mut self) -> Result<AgentCard, ChatError> {
        let token = self.client.fetch_token().await?;
        self.session.set_bearer_token(token);
        self.session.reset_context();
        self.client
            .fetch_agent_card(self.session.bearer_token())
            .await
    }

    /// Send one user message and stream the reply into the transcript.
    ///
    /// Empty input is a silent no-op returning `Ok(None)`; nothing is
    /// mutated. Otherwise the user message is appended, the streamed reply
    /// flows into the transcript delta by delta, and the completed turn's
    /// timings are returned.
    ///
    /// On failure the turn is aborted: any partial output stays visible, a
    /// single bot-visible `Error: ...` message is appended as a new entry,
    /// the failed turn still counts into the stats, and the error is
    /// returned. Nothing is retried.
    pub async fn send(&mut self, text: &str) -> Result<Option<TurnReport>, ChatError> {
        if text.is_empty() {
            return Ok(None);
        }

        self.transcript.push(ChatMessage::user(text));
        let started = Instant::now();

        match self.run_turn(text, started).await {
            Ok(report) => {
                self.stats.record_turn(report.total);
                Ok(Some(report))
            }
            Err(err) => Err(self.fail_turn(started, err)),
        }
    }

    /// Send one user message and wait for the complete reply (the
    /// non-streaming JSON-RPC variant).
    ///
    /// Same transcript, context, and stats bookkeeping as [`send`](Self::send),
    /// without incremental deltas; `time_to_first_chunk` is absent.
    pub async fn send_once(&mut self, text: &str) -> Result<Option<TurnReport>, ChatError> {
        if text.is_empty() {
            return Ok(None);
        }

        self.transcript.push(ChatMessage::user(text));
        let started = Instant::now();

        match self
            .client
            .send_message(text, self.session.bearer_token())
            .await
        {
            Ok(reply) => {
                if let Some(id) = &reply.context_id {
                    self.session.capture_context_id(id);
                }
                self.stats.record_chars(reply.text.chars().count() as u64);
                self.transcript.push(ChatMessage::bot(reply.text));
                let total = started.elapsed();
                self.stats.record_turn(total);
                Ok(Some(TurnReport {
                    time_to_first_chunk: None,
                    total,
                    diagnostics: Vec::new(),
                }))
            }
            Err(err) => Err(self.fail_turn(started, err)),
        }
    }

    /// Drive one streamed turn to completion.
    async fn run_turn(
        &mut self,
        text: &str,
        started: Instant,
    ) -> Result<TurnReport, ChatError> {
        let turn = self
            .client
            .send_streaming(text, self.session.context_id(), self.session.bearer_token())
            .await?;

        let mut events = turn.receiver;
        let mut first_chunk = None;
        let mut diagnostics = Vec::new();

        while let Some(event) = events.next().await {
            match event {
                TurnEvent::Event(event) => {
                    if first_chunk.is_none() {
                        first_chunk = Some(started.elapsed());
                    }
                    if let Some(id) = event.context_id() {
                        self.session.capture_context_id(id);
                    }
                    if let StreamEvent::ArtifactUpdate(update) = &event {
                        if let Some(delta) = update.first_text() {
                            self.stats.record_chars(delta.chars().count() as u64);
                            self.transcript.append_delta(delta);
                        }
                    }
                    tracing::debug!(?event, "stream event");
                }
                TurnEvent::Malformed { line, error } => {
                    diagnostics.push(format!("error parsing SSE payload `{line}`: {error}"));
                }
                TurnEvent::Error(err) => return Err(err),
            }
        }

        Ok(TurnReport {
            time_to_first_chunk: first_chunk,
            total: started.elapsed(),
            diagnostics,
        })
    }

    /// Close out a failed turn: the error becomes a bot-visible message (a
    /// fresh entry, never merged into partial output) and the turn still
    /// counts into the stats.
    fn fail_turn(&mut self, started: Instant, err: ChatError) -> ChatError {
        self.stats.record_turn(started.elapsed());
        self.transcript.push(ChatMessage::bot(format!("Error: {err}")));
        err
    }

    /// The conversation transcript.
    #[must_use]
    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// The running stats accumulator.
    #[must_use]
    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    /// The session state (token and context id).
    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// The underlying endpoint client.
    #[must_use]
    pub fn client(&self) -> &A2aClient {
        &self.client
    }
}
