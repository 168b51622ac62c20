use anyhow::Context;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    pub secret: String,
    pub lifetime_hours: i64,
    pub cookie_secure: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub host: String,
    pub port: u16,
    pub static_dir: String,
    pub session: SessionConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL is not set")?;
        let secret = std::env::var("SESSION_SECRET").context("SESSION_SECRET is not set")?;
        anyhow::ensure!(
            secret.len() >= 32,
            "SESSION_SECRET must be at least 32 bytes long"
        );

        let session = SessionConfig {
            secret,
            lifetime_hours: env_or("SESSION_LIFETIME_HOURS", 12),
            cookie_secure: env_or("SESSION_COOKIE_SECURE", false),
        };

        Ok(Self {
            database_url,
            max_connections: env_or("DATABASE_MAX_CONNECTIONS", 10),
            host: std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: env_or("APP_PORT", 4000),
            static_dir: std::env::var("STATIC_DIR").unwrap_or_else(|_| "./ui/static".into()),
            session,
        })
    }
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}
