//! In-memory collaborators and request helpers for the test suite.

use std::sync::{Arc, Mutex};

use axum::{
    body::{to_bytes, Body},
    http::{header, Request},
    response::Response,
};
use time::{Duration, OffsetDateTime};

use crate::session::{SessionData, SessionKeys, COOKIE_NAME};
use crate::snippets::memory::MemorySnippetRepo;
use crate::users::memory::MemoryUserRepo;

/// Settable "now" shared by the in-memory stores.
#[derive(Clone)]
pub struct Clock(Arc<Mutex<OffsetDateTime>>);

impl Clock {
    pub fn new() -> Self {
        Self(Arc::new(Mutex::new(OffsetDateTime::now_utc())))
    }

    pub fn now(&self) -> OffsetDateTime {
        *self.0.lock().unwrap()
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.0.lock().unwrap();
        *now += by;
    }
}

/// Test-side handles onto the stores behind a fake `AppState`.
pub struct Fakes {
    pub clock: Clock,
    pub snippets: Arc<MemorySnippetRepo>,
    pub users: Arc<MemoryUserRepo>,
    pub keys: SessionKeys,
}

pub const CSRF: &str = "test-csrf-token-0000000000000000";

impl Fakes {
    /// Cookie header for a session holding `user_id` and the [`CSRF`] token.
    pub fn cookie(&self, user_id: Option<i64>) -> String {
        let data = SessionData {
            authenticated_user_id: user_id,
            csrf_token: Some(CSRF.to_string()),
            flash: None,
        };
        format!("{}={}", COOKIE_NAME, self.keys.encode(&data).unwrap())
    }

    pub fn decode_set_cookie(&self, res: &Response) -> Option<SessionData> {
        let raw = res.headers().get(header::SET_COOKIE)?.to_str().ok()?;
        let token = raw
            .split(';')
            .next()?
            .strip_prefix(&format!("{}=", COOKIE_NAME))?;
        self.keys.decode(token).ok()
    }
}

pub fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut req = Request::builder().method("GET").uri(uri);
    if let Some(c) = cookie {
        req = req.header(header::COOKIE, c);
    }
    req.body(Body::empty()).unwrap()
}

/// Form POST; `csrf_token` is appended to `body` unless it is empty.
pub fn post_form(uri: &str, body: &str, cookie: Option<&str>) -> Request<Body> {
    let body = if body.is_empty() {
        format!("csrf_token={}", CSRF)
    } else {
        format!("{}&csrf_token={}", body, CSRF)
    };
    let mut req = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(c) = cookie {
        req = req.header(header::COOKIE, c);
    }
    req.body(Body::from(body)).unwrap()
}

pub async fn body_string(res: Response) -> String {
    let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub fn location(res: &Response) -> &str {
    res.headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
}
