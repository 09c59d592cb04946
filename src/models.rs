use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self { error: error.into(), message: None, details: None }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }
}

// Reply shape expected by the frontend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatReply {
    pub content: Vec<ReplyText>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplyText {
    pub text: String,
}

impl ChatReply {
    pub fn from_text(text: String) -> Self {
        Self { content: vec![ReplyText { text }] }
    }
}
