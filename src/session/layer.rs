use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};
use cookie::{time::Duration as CookieDuration, Cookie, SameSite};
use tracing::{debug, error};

use super::{Session, SessionData, SessionKeys, COOKIE_NAME};
use crate::error::AppError;

/// Loads the session from its cookie, runs the request, and writes the
/// cookie back if the handler changed anything.
pub async fn load_session(
    State(keys): State<SessionKeys>,
    mut req: Request,
    next: Next,
) -> Response {
    let data = read_cookie(req.headers())
        .and_then(|token| match keys.decode(&token) {
            Ok(data) => Some(data),
            Err(e) => {
                debug!(error = %e, "discarding invalid session cookie");
                None
            }
        })
        .unwrap_or_default();

    let session = Session::new(data);
    req.extensions_mut().insert(session.clone());

    let mut res = next.run(req).await;

    if let Some(changed) = session.take_changes() {
        match set_cookie_value(&keys, &changed) {
            Ok(value) => {
                res.headers_mut().append(header::SET_COOKIE, value);
            }
            Err(e) => {
                error!(error = ?e, "failed to write session cookie");
                return AppError::Internal(e).into_response();
            }
        }
    }
    res
}

fn read_cookie(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|raw| Cookie::split_parse(raw.to_string()))
        .filter_map(Result::ok)
        .find(|c| c.name() == COOKIE_NAME)
        .map(|c| c.value().to_string())
}

fn set_cookie_value(keys: &SessionKeys, data: &SessionData) -> anyhow::Result<HeaderValue> {
    let token = keys.encode(data)?;
    let cookie = Cookie::build((COOKIE_NAME, token))
        .path("/")
        .http_only(true)
        .secure(keys.cookie_secure)
        .same_site(SameSite::Lax)
        .max_age(CookieDuration::seconds(keys.lifetime.whole_seconds()))
        .build();
    Ok(HeaderValue::from_str(&cookie.to_string())?)
}
