use crate::config::Config;
use crate::converters::gemini::GeminiRequest;
use crate::request_id::{REQUEST_ID_HEADER, RequestId};
use reqwest::header::HeaderValue;
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, info};

/// Thin wrapper over the shared HTTP client. Sends requests; never reads
/// the response.
#[derive(Debug)]
pub struct GeminiClient {
    http_client: Arc<reqwest::Client>,
}

impl GeminiClient {
    pub fn new(http_client: Arc<reqwest::Client>) -> Self {
        Self { http_client }
    }

    /// Target URL without the credential, safe to log.
    pub fn build_target_url(config: &Config) -> String {
        let api_base = config.api_base.trim_end_matches('/');
        format!("{}/models/{}:generateContent", api_base, config.model)
    }

    pub fn generate_content(
        &self,
        request: &GeminiRequest,
        config: &Config,
        api_key: &str,
        request_id: &RequestId,
    ) -> impl Future<Output = Result<reqwest::Response, reqwest::Error>> {
        let target_url = Self::build_target_url(config);

        let mut target_request = self
            .http_client
            .post(&target_url)
            .query(&[("key", api_key)])
            .header("Content-Type", "application/json");

        if let Ok(val) = HeaderValue::from_str(request_id.as_str()) {
            target_request = target_request.header(REQUEST_ID_HEADER, val);
        }

        info!("Forwarding request to: {}", target_url);
        if let Ok(body) = serde_json::to_string(request) {
            debug!("request body: {}", body);
        }
        target_request.json(request).send()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::converters::gemini::{GeminiContent, GeminiPart};
    use mockito::Matcher;

    #[test]
    fn test_build_target_url() {
        let mut config = Config::default();
        assert_eq!(
            GeminiClient::build_target_url(&config),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-flash:generateContent"
        );
        config.api_base = "http://localhost:9000/".to_string();
        config.model = "gemini-2.0-flash".to_string();
        assert_eq!(
            GeminiClient::build_target_url(&config),
            "http://localhost:9000/models/gemini-2.0-flash:generateContent"
        );
    }

    #[tokio::test]
    async fn test_generate_content_sends_key_and_body() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/models/gemini-1.5-flash:generateContent")
            .match_query(Matcher::UrlEncoded("key".into(), "secret".into()))
            .match_header(REQUEST_ID_HEADER, "req-1")
            .match_body(Matcher::PartialJsonString(
                r#"{"contents": [{"role": "user", "parts": [{"text": "ping"}]}]}"#.to_string(),
            ))
            .with_status(200)
            .with_body("{}")
            .create_async()
            .await;

        let config = Config { api_base: server.url(), ..Config::default() };
        let request = GeminiRequest {
            contents: vec![GeminiContent {
                role: Some("user".to_string()),
                parts: vec![GeminiPart::Text { text: "ping".to_string() }],
            }],
            system_instruction: None,
            generation_config: Some(config.generation_config()),
        };

        let client = GeminiClient::new(Arc::new(reqwest::Client::new()));
        let response = client
            .generate_content(&request, &config, "secret", &RequestId("req-1".to_string()))
            .await
            .expect("request failed");

        assert!(response.status().is_success());
        mock.assert_async().await;
    }
}
