//! The streaming response reader.
//!
//! Consumes a chunked response body as SSE-style lines and emits one
//! [`TurnEvent`] per processed `data:` line. The relevant line shape is:
//!
//!   data: {"kind":"artifact-update","contextId":"...","artifact":{"parts":[{"text":"Hi"}]}}
//!
//! Chunk boundaries are arbitrary: a multi-byte character or a line may be
//! split across reads, so partial bytes and the trailing incomplete line are
//! carried over to the next chunk.

use a2a_chat_types::{StreamEvent, TurnEvent, TurnStream};
use futures::{Stream, StreamExt};

use crate::error::map_reqwest_error;

/// Wrap an HTTP response body into a [`TurnStream`] that emits [`TurnEvent`]s.
pub(crate) fn stream_turn(response: reqwest::Response) -> TurnStream {
    let event_stream = parse_sse_stream(response.bytes_stream());
    TurnStream {
        receiver: Box::pin(event_stream),
    }
}

/// Parse a raw byte stream into a stream of [`TurnEvent`]s.
///
/// The stream completes when the underlying byte stream ends; a read failure
/// emits a terminal [`TurnEvent::Error`]. Malformed payloads are reported and
/// skipped, never aborting the stream.
fn parse_sse_stream(
    byte_stream: impl Stream<Item = Result<bytes::Bytes, reqwest::Error>> + Send + 'static,
) -> impl Stream<Item = TurnEvent> + Send + 'static {
    async_stream::stream! {
        let mut scanner = SseScanner::new();
        let mut byte_stream = std::pin::pin!(byte_stream);

        while let Some(chunk_result) = byte_stream.next().await {
            let chunk = match chunk_result {
                Ok(bytes) => bytes,
                Err(e) => {
                    yield TurnEvent::Error(map_reqwest_error(e));
                    return;
                }
            };
            for event in scanner.push_chunk(&chunk) {
                yield event;
            }
        }

        // The body may end without a final newline.
        for event in scanner.finish() {
            yield event;
        }
    }
}

/// Sequential SSE scanning state: incremental UTF-8 decoding plus line
/// reassembly across chunk boundaries.
struct SseScanner {
    decoder: Utf8Decoder,
    line_buf: String,
}

impl SseScanner {
    fn new() -> Self {
        Self {
            decoder: Utf8Decoder::new(),
            line_buf: String::new(),
        }
    }

    /// Feed one chunk of body bytes and return events for every complete line.
    fn push_chunk(&mut self, chunk: &[u8]) -> Vec<TurnEvent> {
        let decoded = self.decoder.decode(chunk);
        self.line_buf.push_str(&decoded);

        let mut events = Vec::new();
        while let Some(newline_pos) = self.line_buf.find('\n') {
            let line = self.line_buf[..newline_pos]
                .trim_end_matches('\r')
                .to_string();
            self.line_buf.drain(..=newline_pos);
            events.extend(self.process_line(&line));
        }
        events
    }

    /// Drain the trailing unterminated line at end of stream. Normalized the
    /// same way as newline-terminated lines: only a trailing `\r` is removed.
    fn finish(&mut self) -> Vec<TurnEvent> {
        let rest = std::mem::take(&mut self.line_buf);
        let rest = rest.trim_end_matches('\r');
        if rest.is_empty() {
            Vec::new()
        } else {
            self.process_line(rest).into_iter().collect()
        }
    }

    /// Handle one complete line. Only `data:` lines carry payloads; anything
    /// else (blank lines, comments, `event:` prefixes) is ignored.
    fn process_line(&self, line: &str) -> Option<TurnEvent> {
        let data = line.strip_prefix("data:")?.trim();
        if data.is_empty() {
            return None;
        }
        match serde_json::from_str::<StreamEvent>(data) {
            Ok(event) => Some(TurnEvent::Event(event)),
            Err(e) => {
                tracing::debug!(payload = %data, error = %e, "unparseable data line");
                Some(TurnEvent::Malformed {
                    line: data.to_string(),
                    error: e.to_string(),
                })
            }
        }
    }
}

/// Incremental UTF-8 decoder.
///
/// A chunk boundary may split a multi-byte sequence; the incomplete tail is
/// held back until the next chunk completes it. Invalid sequences inside a
/// chunk decode to U+FFFD rather than failing the stream.
struct Utf8Decoder {
    pending: Vec<u8>,
}

impl Utf8Decoder {
    fn new() -> Self {
        Self {
            pending: Vec::new(),
        }
    }

    fn decode(&mut self, chunk: &[u8]) -> String {
        self.pending.extend_from_slice(chunk);
        let buf = std::mem::take(&mut self.pending);

        let mut out = String::new();
        let mut rest = buf.as_slice();
        loop {
            match std::str::from_utf8(rest) {
                Ok(valid) => {
                    out.push_str(valid);
                    break;
                }
                Err(e) => {
                    let valid_len = e.valid_up_to();
                    // valid_up_to guarantees the prefix decodes cleanly
                    out.push_str(&String::from_utf8_lossy(&rest[..valid_len]));
                    match e.error_len() {
                        Some(invalid_len) => {
                            out.push(char::REPLACEMENT_CHARACTER);
                            rest = &rest[valid_len + invalid_len..];
                        }
                        None => {
                            // Incomplete sequence at the end of the chunk;
                            // carry it into the next decode call.
                            self.pending = rest[valid_len..].to_vec();
                            break;
                        }
                    }
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn artifact_line(text: &str) -> String {
        format!(
            "data: {{\"kind\":\"artifact-update\",\"artifact\":{{\"parts\":[{{\"text\":\"{text}\"}}]}}}}\n"
        )
    }

    fn deltas(events: &[TurnEvent]) -> Vec<String> {
        events
            .iter()
            .filter_map(|event| match event {
                TurnEvent::Event(StreamEvent::ArtifactUpdate(update)) => {
                    update.first_text().map(str::to_string)
                }
                _ => None,
            })
            .collect()
    }

    #[test]
    fn complete_lines_produce_events() {
        let mut scanner = SseScanner::new();
        let body = format!("{}{}", artifact_line("Hel"), artifact_line("lo"));
        let events = scanner.push_chunk(body.as_bytes());
        assert_eq!(deltas(&events), vec!["Hel", "lo"]);
    }

    #[test]
    fn line_split_across_chunks_is_reassembled() {
        let mut scanner = SseScanner::new();
        let line = artifact_line("Hello");
        let (head, tail) = line.as_bytes().split_at(20);

        let events = scanner.push_chunk(head);
        assert!(events.is_empty());
        let events = scanner.push_chunk(tail);
        assert_eq!(deltas(&events), vec!["Hello"]);
    }

    #[test]
    fn multibyte_char_split_across_chunks_decodes_cleanly() {
        let mut scanner = SseScanner::new();
        let line = artifact_line("héllo");
        let bytes = line.as_bytes();
        // 'é' is two bytes; split in the middle of it.
        let split = line.find('é').unwrap() + 1;

        let mut events = scanner.push_chunk(&bytes[..split]);
        events.extend(scanner.push_chunk(&bytes[split..]));
        assert_eq!(deltas(&events), vec!["héllo"]);
    }

    #[test]
    fn malformed_payload_is_reported_and_skipped() {
        let mut scanner = SseScanner::new();
        let body = format!("data: not-json\n{}", artifact_line("ok"));
        let events = scanner.push_chunk(body.as_bytes());

        assert_eq!(events.len(), 2);
        assert!(
            matches!(&events[0], TurnEvent::Malformed { line, .. } if line == "not-json"),
            "expected Malformed first, got {:?}",
            events[0]
        );
        assert_eq!(deltas(&events), vec!["ok"]);
    }

    #[test]
    fn empty_data_payload_is_skipped() {
        let mut scanner = SseScanner::new();
        let events = scanner.push_chunk(b"data:\ndata:   \n");
        assert!(events.is_empty());
    }

    #[test]
    fn non_data_lines_are_ignored() {
        let mut scanner = SseScanner::new();
        let body = format!(
            "event: message\n: comment\n\n{}",
            artifact_line("hi")
        );
        let events = scanner.push_chunk(body.as_bytes());
        assert_eq!(deltas(&events), vec!["hi"]);
    }

    #[test]
    fn crlf_line_endings_are_handled() {
        let mut scanner = SseScanner::new();
        let body = artifact_line("hi").replace('\n', "\r\n");
        let events = scanner.push_chunk(body.as_bytes());
        assert_eq!(deltas(&events), vec!["hi"]);
    }

    #[test]
    fn trailing_unterminated_line_is_processed_at_finish() {
        let mut scanner = SseScanner::new();
        let line = artifact_line("tail");
        let events = scanner.push_chunk(line.trim_end().as_bytes());
        assert!(events.is_empty());

        let events = scanner.finish();
        assert_eq!(deltas(&events), vec!["tail"]);
    }

    #[test]
    fn finish_normalizes_lines_like_push_chunk() {
        // A line with leading whitespace has no `data:` prefix and is
        // ignored; the unterminated twin must be treated identically.
        let line = format!("  {}", artifact_line("tail"));

        let mut scanner = SseScanner::new();
        let events = scanner.push_chunk(line.as_bytes());
        assert!(events.is_empty());

        let events = scanner.push_chunk(line.trim_end().as_bytes());
        assert!(events.is_empty());
        assert!(scanner.finish().is_empty());
    }

    #[test]
    fn context_id_surfaces_on_parsed_events() {
        let mut scanner = SseScanner::new();
        let events = scanner
            .push_chunk(b"data: {\"kind\":\"status-update\",\"contextId\":\"ctx-1\"}\n");
        match &events[0] {
            TurnEvent::Event(event) => assert_eq!(event.context_id(), Some("ctx-1")),
            other => panic!("expected Event, got {other:?}"),
        }
    }

    #[test]
    fn decoder_carries_partial_sequences() {
        let mut decoder = Utf8Decoder::new();
        let bytes = "é".as_bytes();
        assert_eq!(decoder.decode(&bytes[..1]), "");
        assert_eq!(decoder.decode(&bytes[1..]), "é");
    }

    #[test]
    fn decoder_replaces_invalid_sequences() {
        let mut decoder = Utf8Decoder::new();
        let decoded = decoder.decode(&[b'a', 0xFF, b'b']);
        assert_eq!(decoded, "a\u{FFFD}b");
    }
}
