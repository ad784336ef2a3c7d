//! WeCom group-robot message wire format.
//!
//! `{"msgtype":"text","text":{"content":"...","mentioned_list":[...]}}` or
//! `{"msgtype":"markdown","markdown":{"content":"..."}}`. Any other `msgtype` parses as
//! [`WebhookMessage::Unknown`] and is relayed as the caller's original bytes.

use serde::{Deserialize, Deserializer, Serialize};

/// Which content schema a message uses; selects the byte limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Text,
    Markdown,
    Unknown,
}

/// Parsed webhook message. Only the active kind's body is present on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "msgtype", rename_all = "lowercase")]
pub enum WebhookMessage {
    Text { text: TextMessage },
    Markdown { markdown: MarkdownMessage },
    #[serde(other)]
    Unknown,
}

/// `text` body. Mentions and any other fields are carried to every segment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextMessage {
    pub content: String,
    #[serde(default, deserialize_with = "null_as_empty", skip_serializing_if = "Vec::is_empty")]
    pub mentioned_list: Vec<String>,
    #[serde(default, deserialize_with = "null_as_empty", skip_serializing_if = "Vec::is_empty")]
    pub mentioned_mobile_list: Vec<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

fn null_as_empty<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<String>, D::Error> {
    Ok(Option::<Vec<String>>::deserialize(d)?.unwrap_or_default())
}

/// `markdown` body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarkdownMessage {
    pub content: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("encoding message: {0}")]
    Json(#[from] serde_json::Error),
    #[error("message of unknown kind has no canonical encoding")]
    UnknownKind,
}

impl WebhookMessage {
    /// Strict decode. A `text`/`markdown` tag without its body object is an error.
    pub fn parse(payload: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(payload)
    }

    /// Fail-open decode: anything that does not parse is `Unknown`.
    pub fn from_payload(payload: &[u8]) -> Self {
        match Self::parse(payload) {
            Ok(msg) => msg,
            Err(e) => {
                log::debug!("payload is not a structured message ({}), passing through", e);
                WebhookMessage::Unknown
            }
        }
    }

    pub fn kind(&self) -> MessageKind {
        match self {
            WebhookMessage::Text { .. } => MessageKind::Text,
            WebhookMessage::Markdown { .. } => MessageKind::Markdown,
            WebhookMessage::Unknown => MessageKind::Unknown,
        }
    }

    /// The splittable body, if this kind has one.
    pub fn content(&self) -> Option<&str> {
        match self {
            WebhookMessage::Text { text } => Some(&text.content),
            WebhookMessage::Markdown { markdown } => Some(&markdown.content),
            WebhookMessage::Unknown => None,
        }
    }

    /// Same kind and auxiliary fields, new content.
    pub fn with_content(&self, content: String) -> Self {
        match self {
            WebhookMessage::Text { text } => WebhookMessage::Text {
                text: TextMessage {
                    content,
                    ..text.clone()
                },
            },
            WebhookMessage::Markdown { markdown } => WebhookMessage::Markdown {
                markdown: MarkdownMessage {
                    content,
                    ..markdown.clone()
                },
            },
            WebhookMessage::Unknown => WebhookMessage::Unknown,
        }
    }

    /// Canonical wire JSON. `Unknown` has none; relay the original bytes instead.
    pub fn encode(&self) -> Result<Vec<u8>, CodecError> {
        match self {
            WebhookMessage::Unknown => Err(CodecError::UnknownKind),
            _ => Ok(serde_json::to_vec(self)?),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_text_with_mentions() {
        let msg = WebhookMessage::parse(
            br#"{"msgtype":"text","text":{"content":"hi","mentioned_list":["wangqing","@all"]}}"#,
        )
        .unwrap();
        assert_eq!(msg.kind(), MessageKind::Text);
        assert_eq!(msg.content(), Some("hi"));
        match msg {
            WebhookMessage::Text { text } => {
                assert_eq!(text.mentioned_list, vec!["wangqing", "@all"]);
                assert!(text.mentioned_mobile_list.is_empty());
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn null_mention_lists_are_empty() {
        let msg = WebhookMessage::parse(
            br#"{"msgtype":"text","text":{"content":"hi","mentioned_list":null,"mentioned_mobile_list":null}}"#,
        )
        .unwrap();
        let value: serde_json::Value = serde_json::from_slice(&msg.encode().unwrap()).unwrap();
        assert_eq!(value, json!({"msgtype":"text","text":{"content":"hi"}}));
    }

    #[test]
    fn parses_markdown() {
        let msg =
            WebhookMessage::parse(br##"{"msgtype":"markdown","markdown":{"content":"# title"}}"##)
                .unwrap();
        assert_eq!(msg.kind(), MessageKind::Markdown);
        assert_eq!(msg.content(), Some("# title"));
    }

    #[test]
    fn other_msgtype_is_unknown() {
        let msg = WebhookMessage::parse(br#"{"msgtype":"foo","data":"x"}"#).unwrap();
        assert_eq!(msg, WebhookMessage::Unknown);
        assert_eq!(msg.content(), None);
    }

    #[test]
    fn malformed_payloads_fail_open() {
        assert!(WebhookMessage::parse(b"not json").is_err());
        assert_eq!(WebhookMessage::from_payload(b"not json"), WebhookMessage::Unknown);
        // tag present, body missing
        assert!(WebhookMessage::parse(br#"{"msgtype":"text"}"#).is_err());
        assert_eq!(
            WebhookMessage::from_payload(br#"{"msgtype":"markdown","text":{"content":"x"}}"#),
            WebhookMessage::Unknown
        );
        assert_eq!(WebhookMessage::from_payload(br#"{"content":"x"}"#), WebhookMessage::Unknown);
    }

    #[test]
    fn encode_omits_other_kinds() {
        let msg = WebhookMessage::Markdown {
            markdown: MarkdownMessage {
                content: "body".to_string(),
                ..Default::default()
            },
        };
        let value: serde_json::Value = serde_json::from_slice(&msg.encode().unwrap()).unwrap();
        assert_eq!(value, json!({"msgtype":"markdown","markdown":{"content":"body"}}));
    }

    #[test]
    fn with_content_keeps_auxiliary_fields() {
        let msg = WebhookMessage::parse(
            br#"{"msgtype":"text","text":{"content":"long","mentioned_mobile_list":["13800001111"],"visible_to_user":"alice"}}"#,
        )
        .unwrap();
        let segment = msg.with_content("part".to_string());
        let value: serde_json::Value =
            serde_json::from_slice(&segment.encode().unwrap()).unwrap();
        assert_eq!(
            value,
            json!({
                "msgtype": "text",
                "text": {
                    "content": "part",
                    "mentioned_mobile_list": ["13800001111"],
                    "visible_to_user": "alice"
                }
            })
        );
    }

    #[test]
    fn unknown_has_no_encoding() {
        assert!(matches!(
            WebhookMessage::Unknown.encode(),
            Err(CodecError::UnknownKind)
        ));
    }
}
