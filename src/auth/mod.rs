mod password;
mod tokens;

pub use password::{hash_password, verify_password};
pub use tokens::{generate_token, token_digest};

use chrono::Utc;
use thiserror::Error;

use crate::storage::models::{AccountRecord, ProfileRecord, SessionRecord};
use crate::storage::{Database, DatabaseError};

#[derive(Debug, Error)]
pub enum AuthError {
    /// Unknown email and wrong password are deliberately indistinguishable.
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("Password hashing failed: {0}")]
    Hashing(String),
    #[error("Token generation failed")]
    TokenGeneration,
    #[error(transparent)]
    Database(#[from] DatabaseError),
}

/// The signed-in subject attached to a request.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub profile: ProfileRecord,
    /// Digest of the presented bearer token, kept for sign-out.
    pub token_digest: String,
}

impl CurrentUser {
    pub fn is_admin(&self) -> bool {
        self.profile.is_admin
    }
}

/// Verify credentials and mint a session. Returns the raw bearer token and
/// the signed-in profile.
pub fn sign_in(
    db: &Database,
    email: &str,
    password: &str,
    ttl: chrono::Duration,
) -> Result<(String, ProfileRecord), AuthError> {
    let account = db
        .get_account(email)?
        .ok_or(AuthError::InvalidCredentials)?;

    if !verify_password(password, &account.password_hash)? {
        return Err(AuthError::InvalidCredentials);
    }

    // An account whose profile row is gone is unusable; treat it like a
    // failed login.
    let profile = db
        .get_profile(&account.profile_id)?
        .ok_or(AuthError::InvalidCredentials)?;

    let token = generate_token()?;
    let now = Utc::now();
    let session = SessionRecord {
        profile_id: account.profile_id.clone(),
        created_at: now,
        expires_at: now + ttl,
    };
    db.put_session(&token_digest(&token), &session)?;

    Ok((token, profile))
}

/// Resolve a bearer token against the session and profile tables. Unknown,
/// expired, and orphaned tokens all read as no user.
pub fn resolve_token(db: &Database, token: &str) -> Result<Option<CurrentUser>, DatabaseError> {
    let digest = token_digest(token);

    let session = match db.get_session(&digest)? {
        Some(s) => s,
        None => return Ok(None),
    };

    let profile = match db.get_profile(&session.profile_id)? {
        Some(p) => p,
        None => return Ok(None),
    };

    Ok(Some(CurrentUser {
        profile,
        token_digest: digest,
    }))
}

/// Create an account with a fresh profile sharing its id. Returns None if
/// the email is already registered.
pub fn create_user(
    db: &Database,
    email: &str,
    password: &str,
    username: &str,
    is_admin: bool,
) -> Result<Option<ProfileRecord>, AuthError> {
    let id = uuid::Uuid::new_v4().to_string();
    let now = Utc::now();

    let profile = ProfileRecord {
        id: id.clone(),
        created_at: now,
        username: username.to_string(),
        avatar_url: None,
        is_admin,
    };
    let account = AccountRecord {
        email: email.trim().to_lowercase(),
        password_hash: hash_password(password)?,
        profile_id: id,
        created_at: now,
    };

    if db.create_account(&account, &profile)? {
        Ok(Some(profile))
    } else {
        Ok(None)
    }
}
