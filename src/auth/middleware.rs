use axum::{
    extract::{Request, State},
    http::{header, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use tracing::{debug, warn};

use super::extractors::AuthContext;
use crate::{error::{AppError, StoreError}, session::Session, state::AppState};

pub const LOGIN_PATH: &str = "/user/login";

/// Resolves the session's user id to an active user and records the outcome
/// as an [`AuthContext`] extension. Stale ids are dropped from the session.
pub async fn authenticate(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    let session = req.extensions().get::<Session>().cloned();

    let auth = match session.as_ref().and_then(Session::user_id) {
        None => AuthContext::anonymous(),
        Some(id) => match state.users.get(id).await {
            Ok(user) if user.active => AuthContext::authenticated(user.id),
            Ok(_) | Err(StoreError::NotFound) => {
                debug!(user_id = id, "session user missing or inactive; demoting");
                if let Some(session) = &session {
                    session.logout();
                }
                AuthContext::anonymous()
            }
            Err(e) => return AppError::from(e).into_response(),
        },
    };

    req.extensions_mut().insert(auth);
    next.run(req).await
}

/// Sends anonymous visitors to the login page.
pub async fn require_authentication(auth: AuthContext, req: Request, next: Next) -> Response {
    if !auth.is_authenticated() {
        warn!(path = %req.uri().path(), "anonymous request to protected route");
        return Redirect::to(LOGIN_PATH).into_response();
    }
    let mut res = next.run(req).await;
    res.headers_mut()
        .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    res
}

/// Keeps signed-in users away from the signup and login forms.
pub async fn redirect_if_authenticated(auth: AuthContext, req: Request, next: Next) -> Response {
    if auth.is_authenticated() {
        return Redirect::to("/").into_response();
    }
    next.run(req).await
}
