use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};
use tracing::debug;

use super::SessionData;
use crate::config::SessionConfig;

/// Signed cookie payload.
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionClaims {
    pub iat: i64, // issued at (unix timestamp)
    pub exp: i64, // expires at (unix timestamp)
    #[serde(flatten)]
    pub data: SessionData,
}

/// HS256 keys used to sign and verify the session cookie.
#[derive(Clone)]
pub struct SessionKeys {
    pub encoding: EncodingKey,
    pub decoding: DecodingKey,
    pub lifetime: Duration,
    pub cookie_secure: bool,
}

impl SessionKeys {
    pub fn new(cfg: &SessionConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(cfg.secret.as_bytes()),
            decoding: DecodingKey::from_secret(cfg.secret.as_bytes()),
            lifetime: Duration::hours(cfg.lifetime_hours),
            cookie_secure: cfg.cookie_secure,
        }
    }

    /// Signs `data` with a fresh expiry of now + lifetime.
    pub fn encode(&self, data: &SessionData) -> anyhow::Result<String> {
        let now = OffsetDateTime::now_utc();
        let claims = SessionClaims {
            iat: now.unix_timestamp(),
            exp: (now + self.lifetime).unix_timestamp(),
            data: data.clone(),
        };
        let token = encode(&Header::default(), &claims, &self.encoding)?;
        debug!(user_id = ?data.authenticated_user_id, "session signed");
        Ok(token)
    }

    pub fn decode(&self, token: &str) -> anyhow::Result<SessionData> {
        let data = decode::<SessionClaims>(token, &self.decoding, &Validation::default())?;
        Ok(data.claims.data)
    }
}
