use crate::converters::chat::ChatContentPart;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChatContent {
    Text(String),
    Array(Vec<ChatContentPart>),
}
