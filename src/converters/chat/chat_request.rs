use crate::converters::chat::ChatTurn;
use serde::{Deserialize, Serialize};

/// Body accepted on the chat route.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    // Optional so a missing field surfaces as a validation error, not a parse error
    #[serde(default)]
    pub messages: Option<Vec<ChatTurn>>,
    #[serde(rename = "systemPrompt", alias = "system")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
}
