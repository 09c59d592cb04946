use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Author of a conversation turn. Anything other than `user` and
/// `assistant`, including a missing or non-string role, is kept as `Other`
/// so the normalizer can apply the role policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(into = "String")]
pub enum ChatRole {
    User,
    Assistant,
    Other(String),
}

impl Default for ChatRole {
    // Used when the field is absent
    fn default() -> Self {
        ChatRole::Other(String::new())
    }
}

impl From<String> for ChatRole {
    fn from(role: String) -> Self {
        match role.as_str() {
            "user" => ChatRole::User,
            "assistant" => ChatRole::Assistant,
            _ => ChatRole::Other(role),
        }
    }
}

impl From<ChatRole> for String {
    fn from(role: ChatRole) -> Self {
        match role {
            ChatRole::User => "user".to_string(),
            ChatRole::Assistant => "assistant".to_string(),
            ChatRole::Other(role) => role,
        }
    }
}

impl<'de> Deserialize<'de> for ChatRole {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match Value::deserialize(deserializer)? {
            Value::String(role) => ChatRole::from(role),
            Value::Null => ChatRole::default(),
            other => ChatRole::Other(other.to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_role_from_any_json() {
        let parse = |v: Value| serde_json::from_value::<ChatRole>(v).unwrap();
        assert_eq!(parse(json!("user")), ChatRole::User);
        assert_eq!(parse(json!("assistant")), ChatRole::Assistant);
        assert_eq!(parse(json!("system")), ChatRole::Other("system".to_string()));
        assert_eq!(parse(json!(null)), ChatRole::Other(String::new()));
        assert_eq!(parse(json!(3)), ChatRole::Other("3".to_string()));
    }
}
