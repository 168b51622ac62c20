use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use lazy_static::lazy_static;
use rand::rngs::OsRng;
use tracing::error;

lazy_static! {
    // Verified against when no account matches, so a miss costs the same as a wrong password.
    static ref DUMMY_HASH: Option<String> = hash_password("snippetbox-dummy-password").ok();
}

/// Builds the fixed hash used for unknown accounts. Called once at startup so
/// no login request pays for it and a hashing failure stops the server.
pub fn prepare_dummy_hash() -> anyhow::Result<()> {
    let hash = DUMMY_HASH
        .as_deref()
        .ok_or_else(|| anyhow::anyhow!("could not build the dummy password hash"))?;
    PasswordHash::new(hash).map_err(|e| anyhow::anyhow!(e.to_string()))?;
    Ok(())
}

pub fn hash_password(plain: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| {
            error!(error = %e, "argon2 hash_password error");
            anyhow::anyhow!(e.to_string())
        })?
        .to_string();
    Ok(hash)
}

pub fn verify_password(plain: &str, hash: &str) -> anyhow::Result<bool> {
    let parsed = PasswordHash::new(hash).map_err(|e| {
        error!(error = %e, "argon2 parse hash error");
        anyhow::anyhow!(e.to_string())
    })?;
    Ok(Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok())
}

/// Checks `plain` against the stored hash of a looked-up account.
///
/// `None` still runs a full verification against a fixed hash and reports a
/// mismatch, keeping unknown-account and wrong-password paths alike.
pub fn verify_candidate(plain: &str, stored: Option<&str>) -> anyhow::Result<bool> {
    match stored {
        Some(hash) => verify_password(plain, hash),
        None => {
            let dummy = DUMMY_HASH
                .as_deref()
                .ok_or_else(|| anyhow::anyhow!("dummy password hash unavailable"))?;
            verify_password(plain, dummy)?;
            Ok(false)
        }
    }
}

/// Runs hashing off the async executor.
pub async fn hash_password_blocking(plain: String) -> anyhow::Result<String> {
    tokio::task::spawn_blocking(move || hash_password(&plain)).await?
}

pub async fn verify_candidate_blocking(plain: String, stored: Option<String>) -> anyhow::Result<bool> {
    tokio::task::spawn_blocking(move || verify_candidate(&plain, stored.as_deref())).await?
}
