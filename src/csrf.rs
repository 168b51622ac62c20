use axum::{
    body::{to_bytes, Body},
    extract::Request,
    http::{HeaderMap, Method},
    middleware::Next,
    response::{IntoResponse, Response},
};
use subtle::ConstantTimeEq;
use tracing::warn;

use crate::{error::AppError, session::Session};

pub const FORM_FIELD: &str = "csrf_token";
pub const HEADER: &str = "x-csrf-token";
// Same ceiling axum's `DefaultBodyLimit` applies to the `Form` extractor.
pub const MAX_FORM_BYTES: usize = 2 * 1024 * 1024;

/// Rejects state-changing requests whose token does not match the session's.
pub async fn verify_csrf(req: Request, next: Next) -> Response {
    if is_safe(req.method()) {
        return next.run(req).await;
    }

    let expected = req
        .extensions()
        .get::<Session>()
        .and_then(Session::existing_csrf_token);

    let (parts, body) = req.into_parts();
    let bytes = match to_bytes(body, MAX_FORM_BYTES).await {
        Ok(b) => b,
        Err(e) => {
            warn!(error = %e, "could not buffer request body for csrf check");
            return AppError::BadRequest.into_response();
        }
    };

    let submitted = header_token(&parts.headers).or_else(|| form_token(&bytes));
    let ok = match (expected, submitted) {
        (Some(expected), Some(submitted)) => tokens_match(&expected, &submitted),
        _ => false,
    };
    if !ok {
        warn!(method = %parts.method, path = %parts.uri.path(), "csrf token missing or invalid");
        return AppError::BadRequest.into_response();
    }

    next.run(Request::from_parts(parts, Body::from(bytes))).await
}

fn is_safe(method: &Method) -> bool {
    [Method::GET, Method::HEAD, Method::OPTIONS, Method::TRACE].contains(method)
}

fn header_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

fn form_token(body: &[u8]) -> Option<String> {
    url::form_urlencoded::parse(body)
        .find(|(k, _)| k == FORM_FIELD)
        .map(|(_, v)| v.into_owned())
}

pub fn tokens_match(expected: &str, submitted: &str) -> bool {
    expected.as_bytes().ct_eq(submitted.as_bytes()).into()
}
