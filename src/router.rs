use crate::config::Config;
use crate::converters::{
    chat::ChatRequest,
    gemini::{GeminiRequest, GeminiResponse},
    normalizer::{extract_reply_text, normalize_request},
};
use crate::error::{ChatError, ChatResult};
use crate::models::ChatReply;
use crate::request_id::{self, RequestId};
use crate::state::AppState;
use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Extension, State, rejection::JsonRejection},
    http::{
        HeaderValue, StatusCode,
        header::{
            ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
        },
    },
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tower_http::set_header::SetResponseHeaderLayer;
use tracing::{debug, error, info, warn};

pub const CHAT_PATH: &str = "/api/chat";

pub fn build_router(state: AppState, max_body_bytes: usize) -> Router {
    Router::new()
        .route(
            CHAT_PATH,
            post(chat).options(preflight).fallback(method_not_allowed),
        )
        .route("/health", get(|| async { "OK" }))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(axum::middleware::from_fn(request_id::inject_request_id))
        // Static CORS headers on every response, errors included
        .layer(SetResponseHeaderLayer::overriding(
            ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static("POST, OPTIONS"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static("Content-Type"),
        ))
        .with_state(state)
}

async fn preflight() -> StatusCode {
    StatusCode::OK
}

async fn method_not_allowed() -> ChatError {
    ChatError::MethodNotAllowed
}

#[axum_macros::debug_handler]
pub async fn chat(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Response {
    let config = state.config().await;
    match handle_chat(&state, &config, &request_id, payload).await {
        Ok(reply) => Json(reply).into_response(),
        Err(e) => {
            match &e {
                ChatError::Upstream { status, body } => {
                    warn!("Gemini request failed with status {}: {}", status, body)
                }
                ChatError::InvalidInput(_)
                | ChatError::PayloadTooLarge(_)
                | ChatError::MissingConfiguration => warn!("{}", e),
                _ => error!("{}", e),
            }
            e.into_response_with(config.expose_error_details)
        }
    }
}

async fn handle_chat(
    state: &AppState,
    config: &Config,
    request_id: &RequestId,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> ChatResult<ChatReply> {
    let api_key = config
        .api_key
        .as_deref()
        .ok_or(ChatError::MissingConfiguration)?;

    let Json(chat_request) = payload.map_err(|e| {
        if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ChatError::PayloadTooLarge(e.body_text())
        } else {
            ChatError::InvalidInput(e.body_text())
        }
    })?;
    let messages = chat_request
        .messages
        .ok_or_else(|| ChatError::InvalidInput("`messages` must be an array".to_string()))?;

    let normalized = normalize_request(
        &messages,
        chat_request.system_prompt.as_deref(),
        config.role_policy,
    )?;
    if normalized.turns.is_empty() {
        return Err(ChatError::InvalidInput(
            "`messages` contains no user or assistant messages".to_string(),
        ));
    }

    let mut gemini_request: GeminiRequest = normalized.into();
    gemini_request.generation_config = Some(config.generation_config());

    let response = state
        .gemini_client
        .generate_content(&gemini_request, config, api_key, request_id)
        .await?;
    parse_gemini_response(response).await
}

async fn parse_gemini_response(response: reqwest::Response) -> ChatResult<ChatReply> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        return Err(ChatError::Upstream { status, body });
    }

    debug!("raw response: {}", body);
    let gemini_response: GeminiResponse = serde_json::from_str(&body)
        .map_err(|e| ChatError::MalformedResponse(format!("Failed to parse response: {}", e)))?;

    if let Some(usage) = &gemini_response.usage_metadata {
        info!(
            "Gemini usage: prompt={:?} candidates={:?} total={:?}",
            usage.prompt_token_count, usage.candidates_token_count, usage.total_token_count
        );
    }

    let text = extract_reply_text(&gemini_response)?;
    Ok(ChatReply::from_text(text))
}
