use crate::converters::chat::ChatImageSource;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum ChatContentPart {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(rename = "image")]
    Image { source: ChatImageSource },
    // Anything else, including items that are not objects; dropped during
    // normalization
    Unknown,
}

impl From<Value> for ChatContentPart {
    fn from(value: Value) -> Self {
        match value.get("type").and_then(Value::as_str) {
            Some("text") => match value.get("text").and_then(Value::as_str) {
                Some(text) => ChatContentPart::Text { text: text.to_string() },
                None => ChatContentPart::Unknown,
            },
            Some("image") => value
                .get("source")
                .and_then(|source| ChatImageSource::deserialize(source).ok())
                .map_or(ChatContentPart::Unknown, |source| ChatContentPart::Image { source }),
            _ => ChatContentPart::Unknown,
        }
    }
}

// Never fails on well-formed JSON: unparseable parts become Unknown
impl<'de> Deserialize<'de> for ChatContentPart {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(ChatContentPart::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: Value) -> ChatContentPart {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_known_parts() {
        assert!(matches!(parse(json!({"type": "text", "text": "hi"})), ChatContentPart::Text { text } if text == "hi"));
        assert!(matches!(
            parse(json!({"type": "image", "source": {"media_type": "image/png", "data": "AAAA"}})),
            ChatContentPart::Image { source } if source.media_type.as_deref() == Some("image/png")
        ));
    }

    #[test]
    fn test_odd_shapes_become_unknown() {
        for value in [
            json!({"text": "no type"}),
            json!({"type": 7, "text": "numeric type"}),
            json!({"type": "text", "text": null}),
            json!({"type": "text"}),
            json!({"type": "image"}),
            json!({"type": "image", "source": {"media_type": 42}}),
            json!({"type": "document", "source": {}}),
            json!("bare string"),
            json!(null),
            json!([1, 2]),
        ] {
            assert!(matches!(parse(value.clone()), ChatContentPart::Unknown), "{}", value);
        }
    }
}
