use crate::models::ErrorResponse;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::Value;

/// Every way a chat request can fail. Each variant maps to one HTTP status
/// and a JSON `{error, message?, details?}` body.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("API key not configured")]
    MissingConfiguration,

    #[error("Invalid request: {0}")]
    InvalidInput(String),

    #[error("Request body too large: {0}")]
    PayloadTooLarge(String),

    #[error("Gemini API error ({status})")]
    Upstream { status: StatusCode, body: String },

    #[error("Malformed provider response: {0}")]
    MalformedResponse(String),

    #[error("Empty provider response: {0}")]
    EmptyResponse(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

pub type ChatResult<T> = Result<T, ChatError>;

impl ChatError {
    pub fn status(&self) -> StatusCode {
        match self {
            ChatError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ChatError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ChatError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ChatError::Upstream { status, .. } => *status,
            ChatError::MissingConfiguration
            | ChatError::MalformedResponse(_)
            | ChatError::EmptyResponse(_)
            | ChatError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Builds the response body. Internal detail is only exposed when
    /// `expose_details` is set.
    pub fn to_error_response(&self, expose_details: bool) -> ErrorResponse {
        match self {
            ChatError::MethodNotAllowed => ErrorResponse::new("Method not allowed"),
            ChatError::MissingConfiguration => ErrorResponse::new("API key not configured")
                .with_message("Set api_key in the config file or the configured environment variable"),
            ChatError::InvalidInput(msg) => ErrorResponse::new("Invalid request").with_message(msg),
            ChatError::PayloadTooLarge(msg) => {
                ErrorResponse::new("Request body too large").with_message(msg)
            }
            ChatError::Upstream { body, .. } => {
                // Keep structured upstream errors structured
                let details = serde_json::from_str::<Value>(body)
                    .unwrap_or_else(|_| Value::String(body.clone()));
                ErrorResponse::new("Gemini API error").with_details(details)
            }
            ChatError::MalformedResponse(msg) => {
                ErrorResponse::new("Malformed provider response").with_message(msg)
            }
            ChatError::EmptyResponse(msg) => {
                ErrorResponse::new("Empty provider response").with_message(msg)
            }
            ChatError::Internal(msg) => {
                let resp = ErrorResponse::new("Internal server error");
                if expose_details {
                    resp.with_message(msg)
                } else {
                    resp.with_message("An unexpected error occurred")
                }
            }
        }
    }

    pub fn into_response_with(self, expose_details: bool) -> Response {
        (self.status(), Json(self.to_error_response(expose_details))).into_response()
    }
}

impl IntoResponse for ChatError {
    fn into_response(self) -> Response {
        self.into_response_with(false)
    }
}

impl From<reqwest::Error> for ChatError {
    fn from(e: reqwest::Error) -> Self {
        ChatError::Internal(format!("Failed to send request: {}", e.without_url()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ChatError::MethodNotAllowed.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(ChatError::MissingConfiguration.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(ChatError::InvalidInput("x".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(ChatError::PayloadTooLarge("x".into()).status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(
            ChatError::Upstream { status: StatusCode::TOO_MANY_REQUESTS, body: String::new() }.status(),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(ChatError::EmptyResponse("x".into()).status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_upstream_details_kept_as_json() {
        let err = ChatError::Upstream {
            status: StatusCode::BAD_REQUEST,
            body: r#"{"error": {"code": 400, "message": "API key not valid"}}"#.to_string(),
        };
        let body = serde_json::to_value(err.to_error_response(false)).unwrap();
        assert_eq!(body["error"], "Gemini API error");
        assert_eq!(body["details"]["error"]["code"], 400);
        assert!(body.get("message").is_none());
    }

    #[test]
    fn test_internal_detail_hidden_in_production() {
        let err = ChatError::Internal("stack detail".to_string());
        let hidden = serde_json::to_value(err.to_error_response(false)).unwrap();
        assert_eq!(hidden["message"], "An unexpected error occurred");
        let shown = serde_json::to_value(err.to_error_response(true)).unwrap();
        assert_eq!(shown["message"], "stack detail");
    }
}
