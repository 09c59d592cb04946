//! Translation between the frontend's conversation format and the
//! provider-facing request, and extraction of the reply text from a
//! provider response.
//!
//! The types here carry no wire naming; `GeminiRequest` owns that.

use crate::converters::chat::{ChatContent, ChatContentPart, ChatRole, ChatTurn};
use crate::converters::gemini::{GeminiPart, GeminiResponse};
use crate::error::{ChatError, ChatResult};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// What to do with a turn whose role is neither `user` nor `assistant`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RolePolicy {
    /// Drop the turn and keep going.
    #[default]
    Skip,
    /// Fail the whole request with `InvalidInput`.
    Reject,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderRole {
    User,
    Model,
}

impl ProviderRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderRole::User => "user",
            ProviderRole::Model => "model",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderPart {
    Text(String),
    InlineData { mime_type: String, data: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedTurn {
    pub role: ProviderRole,
    pub parts: Vec<ProviderPart>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedRequest {
    pub system_instruction: Option<String>,
    pub turns: Vec<NormalizedTurn>,
}

pub fn normalize_request(
    turns: &[ChatTurn],
    system_instruction: Option<&str>,
    role_policy: RolePolicy,
) -> ChatResult<NormalizedRequest> {
    let mut normalized = Vec::with_capacity(turns.len());

    for (index, turn) in turns.iter().enumerate() {
        match &turn.role {
            ChatRole::User => normalized.push(NormalizedTurn {
                role: ProviderRole::User,
                parts: user_parts(&turn.content),
            }),
            ChatRole::Assistant => normalized.push(NormalizedTurn {
                role: ProviderRole::Model,
                parts: vec![ProviderPart::Text(assistant_text(&turn.content))],
            }),
            ChatRole::Other(role) => {
                let problem = if role.is_empty() {
                    "no role".to_string()
                } else {
                    format!("unsupported role '{}'", role)
                };
                match role_policy {
                    RolePolicy::Skip => warn!("Skipping message {} with {}", index, problem),
                    RolePolicy::Reject => {
                        return Err(ChatError::InvalidInput(format!(
                            "messages[{}] has {}",
                            index, problem
                        )));
                    }
                }
            }
        }
    }

    let system_instruction = system_instruction
        .filter(|s| !s.is_empty())
        .map(str::to_string);

    debug!(
        "Normalized {} of {} messages (system instruction: {})",
        normalized.len(),
        turns.len(),
        system_instruction.is_some()
    );

    Ok(NormalizedRequest { system_instruction, turns: normalized })
}

fn user_parts(content: &ChatContent) -> Vec<ProviderPart> {
    match content {
        ChatContent::Text(text) => vec![ProviderPart::Text(text.clone())],
        ChatContent::Array(items) => items.iter().filter_map(provider_part).collect(),
    }
}

// Empty and unrecognized parts yield None
fn provider_part(part: &ChatContentPart) -> Option<ProviderPart> {
    match part {
        ChatContentPart::Text { text } if !text.is_empty() => Some(ProviderPart::Text(text.clone())),
        ChatContentPart::Image { source } => {
            let mime_type = source.media_type.as_deref().filter(|m| !m.is_empty())?;
            let data = source.data.as_deref().filter(|d| !d.is_empty())?;
            Some(ProviderPart::InlineData {
                mime_type: mime_type.to_string(),
                data: data.to_string(),
            })
        }
        _ => None,
    }
}

// Assistant turns are text-only upstream: text parts are concatenated and
// anything else is dropped.
fn assistant_text(content: &ChatContent) -> String {
    match content {
        ChatContent::Text(text) => text.clone(),
        ChatContent::Array(items) => {
            let mut text = String::new();
            for item in items {
                match item {
                    ChatContentPart::Text { text: t } => text.push_str(t),
                    ChatContentPart::Image { .. } => {
                        warn!("Dropping image content from assistant message");
                    }
                    ChatContentPart::Unknown => {}
                }
            }
            text
        }
    }
}

/// Returns the text of the first part of the first candidate.
pub fn extract_reply_text(response: &GeminiResponse) -> ChatResult<String> {
    let candidate = match response.candidates.as_deref() {
        Some([first, ..]) => first,
        _ => {
            let reason = response
                .prompt_feedback
                .as_ref()
                .and_then(|f| f.block_reason.as_deref());
            return Err(ChatError::EmptyResponse(match reason {
                Some(reason) => format!("no candidates returned (blocked: {})", reason),
                None => "no candidates returned".to_string(),
            }));
        }
    };

    let content = candidate
        .content
        .as_ref()
        .ok_or_else(|| ChatError::MalformedResponse("first candidate has no content".to_string()))?;

    match content.parts.first() {
        Some(GeminiPart::Text { text }) => Ok(text.clone()),
        Some(_) => Err(ChatError::MalformedResponse(
            "first part of first candidate is not text".to_string(),
        )),
        None => Err(ChatError::MalformedResponse(
            "first candidate has no content parts".to_string(),
        )),
    }
}
