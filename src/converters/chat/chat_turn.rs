use crate::converters::chat::{ChatContent, ChatRole};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatTurn {
    #[serde(default)]
    pub role: ChatRole,
    pub content: ChatContent,
}
