//! The mock request handler.
//!
//! [`mock_handler`] is the Axum fallback that receives every request not
//! claimed by a built-in route, resolves it against the current
//! configuration generation, and renders the selected response.

use std::sync::atomic::Ordering;
use std::sync::Arc;

use axum::body::Body;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use http::header::CONTENT_TYPE;
use http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode, Uri};

use crate::engine::select::ThreadRandom;
use crate::engine::tree::{Response as MockResponse, ResponseBody};
use crate::engine::{self, Outcome};
use crate::error::SelectionError;
use crate::server::AppState;

pub const CORRELATION_HEADER: &str = "x-correlation-id";

pub async fn mock_handler(
    State(state): State<Arc<AppState>>,
    method: Method,
    uri: Uri,
    req_headers: HeaderMap,
) -> Response {
    let path = uri.path();
    let correlation_id = req_headers
        .get(CORRELATION_HEADER)
        .and_then(|v| v.to_str().ok())
        .map_or_else(|| uuid::Uuid::new_v4().to_string(), String::from);

    let current = state.store.state().await;

    let mut response = match engine::resolve(&current, method.as_str(), path, &ThreadRandom) {
        Ok(Outcome::Matched(mock)) => {
            state.stats.matched.fetch_add(1, Ordering::Relaxed);
            tracing::info!(
                correlation_id = %correlation_id,
                method = %method,
                path = %path,
                status = mock.status_code,
                "request matched"
            );
            render(mock, &correlation_id)
        }
        Ok(Outcome::NotFound) | Err(SelectionError::NoResponse) => {
            state.stats.unmatched.fetch_add(1, Ordering::Relaxed);
            tracing::warn!(
                correlation_id = %correlation_id,
                method = %method,
                path = %path,
                "no endpoint matched"
            );
            StatusCode::NOT_FOUND.into_response()
        }
        Err(e @ SelectionError::UnsupportedMode(_)) => {
            state.stats.failed.fetch_add(1, Ordering::Relaxed);
            tracing::warn!(
                correlation_id = %correlation_id,
                method = %method,
                path = %path,
                error = %e,
                "matched action cannot respond"
            );
            (StatusCode::NOT_IMPLEMENTED, e.to_string()).into_response()
        }
        Ok(Outcome::Failed(message)) => {
            state.stats.failed.fetch_add(1, Ordering::Relaxed);
            tracing::error!(
                correlation_id = %correlation_id,
                method = %method,
                path = %path,
                "configuration unusable, rejecting request"
            );
            (StatusCode::INTERNAL_SERVER_ERROR, message.to_string()).into_response()
        }
    };

    if let Ok(value) = HeaderValue::from_str(&correlation_id) {
        response.headers_mut().insert(CORRELATION_HEADER, value);
    }
    response
}

/// Build the HTTP response for a configured mock response.
fn render(mock: &MockResponse, correlation_id: &str) -> Response {
    let status = StatusCode::from_u16(mock.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    let mut headers = HeaderMap::with_capacity(mock.headers.len() + 1);
    for (key, value) in &mock.headers {
        let parsed = HeaderName::from_bytes(key.as_bytes())
            .ok()
            .zip(HeaderValue::from_str(value).ok());
        match parsed {
            Some((name, value)) => {
                headers.append(name, value);
            }
            None => tracing::warn!(
                correlation_id = %correlation_id,
                header = %key,
                "skipping header that is not valid on the wire"
            ),
        }
    }

    if let Some(default_type) = mock.body.content_type() {
        if !headers.contains_key(CONTENT_TYPE) {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static(default_type));
        }
    }

    let body = match &mock.body {
        ResponseBody::Empty => Body::empty(),
        ResponseBody::Json(value) => Body::from(value.to_string()),
        ResponseBody::Xml(text) | ResponseBody::Text(text) => Body::from(text.clone()),
    };

    (status, headers, body).into_response()
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use http_body_util::BodyExt;

    use super::*;

    async fn body_text(response: Response) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn json_body_gets_default_content_type() {
        let mock = MockResponse {
            status_code: 201,
            body: ResponseBody::Json(serde_json::json!({"id": 7})),
            ..MockResponse::default()
        };
        let response = render(&mock, "c");
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(response.headers()[CONTENT_TYPE], "application/json");
        assert_eq!(body_text(response).await, r#"{"id":7}"#);
    }

    #[tokio::test]
    async fn configured_content_type_wins() {
        let mock = MockResponse {
            headers: BTreeMap::from([("Content-Type".to_string(), "text/csv".to_string())]),
            body: ResponseBody::Text("a,b".into()),
            ..MockResponse::default()
        };
        let response = render(&mock, "c");
        assert_eq!(response.headers()[CONTENT_TYPE], "text/csv");
        assert_eq!(body_text(response).await, "a,b");
    }

    #[tokio::test]
    async fn empty_body_has_no_content_type() {
        let response = render(&MockResponse::default(), "c");
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().get(CONTENT_TYPE).is_none());
        assert!(body_text(response).await.is_empty());
    }

    #[test]
    fn invalid_headers_are_skipped() {
        let mock = MockResponse {
            headers: BTreeMap::from([
                ("bad header".to_string(), "x".to_string()),
                ("x-ok".to_string(), "yes".to_string()),
                ("x-control".to_string(), "line\nbreak".to_string()),
            ]),
            ..MockResponse::default()
        };
        let response = render(&mock, "c");
        assert_eq!(response.headers()["x-ok"], "yes");
        assert!(response.headers().get("x-control").is_none());
        assert_eq!(response.headers().len(), 1);
    }

    #[test]
    fn xml_body_content_type() {
        let mock = MockResponse {
            body: ResponseBody::Xml("<a/>".into()),
            ..MockResponse::default()
        };
        assert_eq!(render(&mock, "c").headers()[CONTENT_TYPE], "application/xml");
    }
}
