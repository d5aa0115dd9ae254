//! Running statistics across chat turns.

use std::time::Duration;

/// Monotonically accumulating counters across all turns of a session.
///
/// There is no reset operation; a fresh accumulator is a fresh value. The
/// latency counters advance exactly once per finished turn, completed or
/// failed; character counts accumulate as visible deltas arrive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Stats {
    total_chars_received: u64,
    response_count: u64,
    total_latency: Duration,
}

impl Stats {
    /// Create a zeroed accumulator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Count characters received as visible text deltas.
    pub fn record_chars(&mut self, count: u64) {
        self.total_chars_received += count;
    }

    /// Record one finished turn and its elapsed time.
    pub fn record_turn(&mut self, elapsed: Duration) {
        self.response_count += 1;
        self.total_latency += elapsed;
    }

    /// Total characters received across all turns.
    #[must_use]
    pub fn total_chars_received(&self) -> u64 {
        self.total_chars_received
    }

    /// Number of finished turns.
    #[must_use]
    pub fn response_count(&self) -> u64 {
        self.response_count
    }

    /// Summed elapsed time across all finished turns.
    #[must_use]
    pub fn total_latency(&self) -> Duration {
        self.total_latency
    }

    /// Mean turn latency; zero before the first finished turn.
    #[must_use]
    pub fn average_latency(&self) -> Duration {
        if self.response_count == 0 {
            Duration::ZERO
        } else {
            self.total_latency / u32::try_from(self.response_count).unwrap_or(u32::MAX)
        }
    }
}

/// Timings and diagnostics for a single turn.
#[derive(Debug, Clone, Default)]
pub struct TurnReport {
    /// Elapsed time from request start to the first successfully parsed
    /// event. Absent when the stream ended before any event parsed, or for
    /// the non-streaming send variant.
    pub time_to_first_chunk: Option<Duration>,
    /// Total elapsed time for the turn.
    pub total: Duration,
    /// One entry per `data:` payload that failed to parse.
    pub diagnostics: Vec<String>,
}
