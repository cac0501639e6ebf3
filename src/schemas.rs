//! Message shapes exchanged between services over the broker.
//!
//! Only the payload shapes live here; transporting them is the broker's
//! concern.

use serde::{Deserialize, Serialize};

/// Topics used for inter-service messaging.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Topic {
    #[serde(rename = "gpt_bot_result")]
    GptBotResult,
    #[serde(rename = "gpt_bot_request")]
    GptBotRequest,
}

impl std::fmt::Display for Topic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Topic::GptBotResult => "gpt_bot_result",
            Topic::GptBotRequest => "gpt_bot_request",
        };
        write!(f, "{}", name)
    }
}

/// Content variants a GPT response can carry.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum GptContentKind {
    Image,
    #[default]
    Text,
    Audio,
}

/// A GPT request or result exchanged between the bot services.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct GptMessage {
    pub content: String,
    #[serde(default)]
    pub is_error: bool,
    #[serde(default)]
    pub chat_id: Option<i64>,
    #[serde(default, rename = "type")]
    pub kind: GptContentKind,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_topic_wire_names() {
        assert_eq!(
            serde_json::to_value(Topic::GptBotResult).unwrap(),
            json!("gpt_bot_result")
        );
        assert_eq!(Topic::GptBotRequest.to_string(), "gpt_bot_request");
    }

    #[test]
    fn test_message_defaults_on_deserialize() {
        let message: GptMessage = serde_json::from_value(json!({"content": "hi"})).unwrap();
        assert_eq!(
            message,
            GptMessage {
                content: "hi".to_string(),
                is_error: false,
                chat_id: None,
                kind: GptContentKind::Text,
            }
        );
    }

    #[test]
    fn test_message_full_round_trip() {
        let message = GptMessage {
            content: "https://example.com/pic.png".to_string(),
            is_error: false,
            chat_id: Some(123456789012),
            kind: GptContentKind::Image,
        };

        let value = serde_json::to_value(&message).unwrap();
        assert_eq!(
            value,
            json!({
                "content": "https://example.com/pic.png",
                "is_error": false,
                "chat_id": 123456789012_i64,
                "type": "image"
            })
        );

        let parsed: GptMessage = serde_json::from_value(value).unwrap();
        assert_eq!(parsed, message);
    }

    #[test]
    fn test_error_message() {
        let message: GptMessage = serde_json::from_value(json!({
            "content": "model unavailable",
            "is_error": true,
            "type": "text"
        }))
        .unwrap();
        assert!(message.is_error);
        assert_eq!(message.kind, GptContentKind::Text);
    }
}
