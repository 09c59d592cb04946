use crate::converters::gemini::{
    GeminiContent, GeminiGenerationConfig, GeminiInlineData, GeminiPart,
};
use crate::converters::normalizer::{NormalizedRequest, ProviderPart};
use serde::{Deserialize, Serialize};

/// Body of a `models/{model}:generateContent` call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiRequest {
    pub contents: Vec<GeminiContent>,
    #[serde(rename = "systemInstruction")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<GeminiContent>,
    #[serde(rename = "generationConfig")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GeminiGenerationConfig>,
}

impl From<ProviderPart> for GeminiPart {
    fn from(part: ProviderPart) -> Self {
        match part {
            ProviderPart::Text(text) => GeminiPart::Text { text },
            ProviderPart::InlineData { mime_type, data } => GeminiPart::InlineData {
                inline_data: GeminiInlineData { mime_type, data },
            },
        }
    }
}

impl From<NormalizedRequest> for GeminiRequest {
    fn from(normalized: NormalizedRequest) -> Self {
        let contents = normalized
            .turns
            .into_iter()
            .map(|turn| GeminiContent {
                role: Some(turn.role.as_str().to_string()),
                parts: turn.parts.into_iter().map(GeminiPart::from).collect(),
            })
            .collect();

        let system_instruction = normalized.system_instruction.map(|text| GeminiContent {
            role: None,
            parts: vec![GeminiPart::Text { text }],
        });

        GeminiRequest {
            contents,
            system_instruction,
            generation_config: None,
        }
    }
}
