use axum::{
    extract::Request,
    http::{HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};
use tracing::{Instrument, info_span};
use uuid::Uuid;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Correlates one chat call across our logs, the response and the Gemini
/// request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RequestId(pub String);

impl RequestId {
    /// Reuses a caller-supplied id when it is a usable header value,
    /// otherwise mints a UUID v4.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        headers
            .get(REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| RequestId(s.to_string()))
            .unwrap_or_else(|| RequestId(Uuid::new_v4().to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

pub async fn inject_request_id(mut req: Request, next: Next) -> Response {
    let request_id = RequestId::from_headers(req.headers());
    let span = info_span!(
        "http_request",
        trace_id = %request_id.as_str(),
        method = %req.method(),
        path = %req.uri().path()
    );
    let echoed = HeaderValue::from_str(request_id.as_str()).ok();
    req.extensions_mut().insert(request_id);

    let mut resp = next.run(req).instrument(span).await;
    if let Some(val) = echoed {
        resp.headers_mut().insert(REQUEST_ID_HEADER, val);
    }
    resp
}
