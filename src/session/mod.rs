//! Cookie-backed session carrying the flash message, the authenticated user
//! id and the CSRF token.
//!
//! [`layer::load_session`] decodes the cookie into a [`Session`] handle stored
//! in the request extensions, and re-signs it into `Set-Cookie` only when a
//! handler changed something.

pub mod keys;
pub mod layer;

use std::sync::{Arc, Mutex};

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
};
use rand::{distributions::Alphanumeric, Rng};
use serde::{Deserialize, Serialize};

pub use keys::SessionKeys;

pub const COOKIE_NAME: &str = "session";
pub const CSRF_TOKEN_LEN: usize = 32;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authenticated_user_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub csrf_token: Option<String>,
}

#[derive(Debug, Default)]
struct Inner {
    data: SessionData,
    dirty: bool,
}

/// Per-request handle; clones share the same state.
#[derive(Debug, Clone, Default)]
pub struct Session(Arc<Mutex<Inner>>);

impl Session {
    pub fn new(data: SessionData) -> Self {
        Self(Arc::new(Mutex::new(Inner { data, dirty: false })))
    }

    fn with<R>(&self, f: impl FnOnce(&mut Inner) -> R) -> R {
        let mut inner = self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&mut inner)
    }

    pub fn put_flash(&self, message: impl Into<String>) {
        let message = message.into();
        self.with(|s| {
            s.data.flash = Some(message);
            s.dirty = true;
        });
    }

    /// Returns the flash message and clears it.
    pub fn pop_flash(&self) -> Option<String> {
        self.with(|s| {
            let flash = s.data.flash.take();
            if flash.is_some() {
                s.dirty = true;
            }
            flash
        })
    }

    pub fn user_id(&self) -> Option<i64> {
        self.with(|s| s.data.authenticated_user_id)
    }

    /// Records `user_id` and rotates the CSRF token.
    pub fn login(&self, user_id: i64) {
        self.with(|s| {
            s.data.authenticated_user_id = Some(user_id);
            s.data.csrf_token = Some(new_csrf_token());
            s.dirty = true;
        });
    }

    pub fn logout(&self) {
        self.with(|s| {
            if s.data.authenticated_user_id.take().is_some() {
                s.dirty = true;
            }
        });
    }

    /// Current CSRF token, minted on first use.
    pub fn csrf_token(&self) -> String {
        self.with(|s| {
            if let Some(token) = &s.data.csrf_token {
                return token.clone();
            }
            let token = new_csrf_token();
            s.data.csrf_token = Some(token.clone());
            s.dirty = true;
            token
        })
    }

    pub fn existing_csrf_token(&self) -> Option<String> {
        self.with(|s| s.data.csrf_token.clone())
    }

    /// Data to write back, if anything changed.
    pub fn take_changes(&self) -> Option<SessionData> {
        self.with(|s| {
            if !s.dirty {
                return None;
            }
            s.dirty = false;
            Some(s.data.clone())
        })
    }
}

fn new_csrf_token() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(CSRF_TOKEN_LEN)
        .map(char::from)
        .collect()
}

#[async_trait]
impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, String);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<Session>().cloned().ok_or((
            StatusCode::INTERNAL_SERVER_ERROR,
            "session layer missing".to_string(),
        ))
    }
}
