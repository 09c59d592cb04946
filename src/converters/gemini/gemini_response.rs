use crate::converters::gemini::{GeminiCandidate, GeminiPromptFeedback, GeminiUsage};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiResponse {
    // Absent when the prompt itself was blocked
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub candidates: Option<Vec<GeminiCandidate>>,
    #[serde(rename = "usageMetadata")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage_metadata: Option<GeminiUsage>,
    #[serde(rename = "modelVersion")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_version: Option<String>,
    #[serde(rename = "promptFeedback")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt_feedback: Option<GeminiPromptFeedback>,
    #[serde(rename = "responseId")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::converters::gemini::GeminiPart;

    #[test]
    fn test_parse_json_str() {
        let text = "{\"candidates\": [{\"content\": {\"parts\": [{\"text\": \"Hello there\"}, {\"functionCall\": {\"name\": \"noop\", \"args\": {}}}],\"role\": \"model\"},\"finishReason\": \"STOP\",\"index\": 0}],\"usageMetadata\": {\"promptTokenCount\": 5,\"candidatesTokenCount\": 2,\"totalTokenCount\": 7},\"modelVersion\": \"gemini-1.5-flash\",\"responseId\": \"abc\"}";
        let resp: GeminiResponse = serde_json::from_str(text).unwrap();
        let candidates = resp.candidates.unwrap();
        assert_eq!(candidates[0].finish_reason.as_deref(), Some("STOP"));
        let parts = &candidates[0].content.as_ref().unwrap().parts;
        assert!(matches!(&parts[0], GeminiPart::Text { text } if text == "Hello there"));
        assert!(matches!(&parts[1], GeminiPart::Other(_)));
        assert_eq!(resp.usage_metadata.unwrap().total_token_count, Some(7));
    }

    #[test]
    fn test_parse_blocked_prompt() {
        let text = r#"{"promptFeedback": {"blockReason": "SAFETY"}}"#;
        let resp: GeminiResponse = serde_json::from_str(text).unwrap();
        assert!(resp.candidates.is_none());
        assert_eq!(resp.prompt_feedback.unwrap().block_reason.as_deref(), Some("SAFETY"));
    }
}
