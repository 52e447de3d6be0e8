use serde::Deserialize;
use serde_json::{json, Value};

use solace_core::errors::GatewayError;
use solace_core::messages::ChatMessage;
use solace_core::provider::GenerationOptions;

/// Build the chat-completions request body.
pub fn build_request_body(messages: &[ChatMessage], options: &GenerationOptions, model: &str) -> Value {
    let messages: Vec<Value> = messages
        .iter()
        .map(|m| json!({"role": m.role.as_str(), "content": m.content}))
        .collect();

    json!({
        "model": model,
        "messages": messages,
        "max_tokens": options.max_tokens,
        "temperature": options.temperature,
    })
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// Extract the first choice's text, trimmed. Empty or missing content is malformed.
pub fn parse_completion(raw: &str) -> Result<String, GatewayError> {
    let response: CompletionResponse = serde_json::from_str(raw)
        .map_err(|e| GatewayError::MalformedResponse(format!("invalid JSON: {e}")))?;

    let content = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| GatewayError::MalformedResponse("no choices".into()))?
        .message
        .content
        .ok_or_else(|| GatewayError::MalformedResponse("choice has no content".into()))?;

    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Err(GatewayError::MalformedResponse("empty content".into()));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_body_carries_roles_in_order() {
        let messages = vec![
            ChatMessage::system("be kind"),
            ChatMessage::user("hi"),
            ChatMessage::assistant("hello"),
        ];
        let body = build_request_body(&messages, &GenerationOptions::default(), "gpt-4o-mini");

        assert_eq!(body["model"], "gpt-4o-mini");
        assert_eq!(body["max_tokens"], 200);
        assert_eq!(body["temperature"], 0.7);
        let roles: Vec<&str> = body["messages"]
            .as_array()
            .unwrap()
            .iter()
            .map(|m| m["role"].as_str().unwrap())
            .collect();
        assert_eq!(roles, ["system", "user", "assistant"]);
        assert_eq!(body["messages"][1]["content"], "hi");
    }

    #[test]
    fn parse_trims_first_choice() {
        let raw = r#"{"choices":[{"message":{"role":"assistant","content":"  I hear you.\n"}},
                                 {"message":{"role":"assistant","content":"ignored"}}]}"#;
        assert_eq!(parse_completion(raw).unwrap(), "I hear you.");
    }

    #[test]
    fn parse_rejects_missing_choices() {
        let err = parse_completion(r#"{"choices":[]}"#).unwrap_err();
        assert!(matches!(err, GatewayError::MalformedResponse(msg) if msg == "no choices"));

        let err = parse_completion(r#"{"id":"x"}"#).unwrap_err();
        assert!(matches!(err, GatewayError::MalformedResponse(_)));
    }

    #[test]
    fn parse_rejects_null_or_blank_content() {
        let null = r#"{"choices":[{"message":{"content":null}}]}"#;
        assert!(matches!(parse_completion(null), Err(GatewayError::MalformedResponse(_))));

        let blank = r#"{"choices":[{"message":{"content":"   "}}]}"#;
        assert!(matches!(parse_completion(blank), Err(GatewayError::MalformedResponse(_))));
    }

    #[test]
    fn parse_rejects_non_json() {
        assert!(matches!(
            parse_completion("<html>bad gateway</html>"),
            Err(GatewayError::MalformedResponse(_))
        ));
    }
}
