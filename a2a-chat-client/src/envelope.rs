//! Wire envelopes for the A2A endpoint.

use a2a_chat_types::{AgentReply, ChatError};
use serde_json::{Value, json};

/// Body for the streaming send: the generic message envelope plus the current
/// conversation context id (JSON null before one is learned).
pub(crate) fn stream_request(text: &str, context_id: Option<&str>) -> Value {
    json!({
        "message": { "role": "user", "parts": [{ "text": text }] },
        "context_id": context_id,
    })
}

/// Body for the non-streaming send: a JSON-RPC `message/send` call.
pub(crate) fn rpc_request(message_id: &str, text: &str) -> Value {
    json!({
        "jsonrpc": "2.0",
        "method": "message/send",
        "params": {
            "message": {
                "messageId": message_id,
                "role": "user",
                "parts": [{ "text": text }],
            }
        },
        "id": "1",
    })
}

/// Extract the reply text and optional context id from a JSON-RPC response.
///
/// The text lives at `result.artifacts[0].parts[0].text`.
pub(crate) fn parse_rpc_reply(value: &Value) -> Result<AgentReply, ChatError> {
    let result = value
        .get("result")
        .filter(|v| !v.is_null())
        .ok_or_else(|| ChatError::InvalidResponse("missing result".into()))?;

    let text = result
        .pointer("/artifacts/0/parts/0/text")
        .and_then(Value::as_str)
        .ok_or_else(|| ChatError::InvalidResponse("missing artifact text".into()))?;

    let context_id = result
        .get("contextId")
        .and_then(Value::as_str)
        .map(str::to_string);

    Ok(AgentReply {
        text: text.to_string(),
        context_id,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stream_request_carries_message_and_context() {
        let body = stream_request("hello", Some("ctx-1"));
        assert_eq!(body["message"]["role"], "user");
        assert_eq!(body["message"]["parts"][0]["text"], "hello");
        assert_eq!(body["context_id"], "ctx-1");
    }

    #[test]
    fn stream_request_sends_null_context_before_first_reply() {
        let body = stream_request("hello", None);
        assert!(body["context_id"].is_null());
    }

    #[test]
    fn rpc_request_is_well_formed() {
        let body = rpc_request("msg-1", "hello");
        assert_eq!(body["jsonrpc"], "2.0");
        assert_eq!(body["method"], "message/send");
        assert_eq!(body["params"]["message"]["messageId"], "msg-1");
        assert_eq!(body["params"]["message"]["parts"][0]["text"], "hello");
        assert_eq!(body["id"], "1");
    }

    #[test]
    fn rpc_reply_parses_text_and_context() {
        let value = json!({
            "result": {
                "contextId": "ctx-9",
                "artifacts": [{ "parts": [{ "text": "Hi there" }] }],
            }
        });
        let reply = parse_rpc_reply(&value).unwrap();
        assert_eq!(reply.text, "Hi there");
        assert_eq!(reply.context_id.as_deref(), Some("ctx-9"));
    }

    #[test]
    fn rpc_reply_without_result_is_invalid() {
        let err = parse_rpc_reply(&json!({ "result": null })).unwrap_err();
        assert!(matches!(err, ChatError::InvalidResponse(_)));
    }

    #[test]
    fn rpc_reply_without_text_is_invalid() {
        let err = parse_rpc_reply(&json!({ "result": { "artifacts": [] } })).unwrap_err();
        assert!(matches!(err, ChatError::InvalidResponse(_)));
    }
}
