//! Local identity directory
//!
//! In-memory username/password directory implementing [`IdentityProvider`]
//! for tests and offline demos. Sign-up issues a confirmation code that
//! must be redeemed before the first sign-in, mirroring the hosted
//! provider's flow.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use super::{validate_password, IdentityProvider, SessionToken};
use crate::error::VaultError;

const SESSION_DURATION_HOURS: i64 = 24;

struct UserRecord {
    email: String,
    password_hash: String,
    salt: String,
    confirmed: bool,
    confirmation_code: Option<String>,
}

#[derive(Clone)]
struct SessionRecord {
    username: String,
    expires_at: i64,
}

#[derive(Default)]
struct DirectoryState {
    users: HashMap<String, UserRecord>,
    sessions: HashMap<String, SessionRecord>,
    /// Token of the most recent sign-in, used by `current_session`
    active_token: Option<String>,
}

/// Instance-owned directory; construct one and pass it where it is
/// needed instead of reaching for a global.
#[derive(Default)]
pub struct LocalDirectory {
    state: RwLock<DirectoryState>,
}

impl LocalDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Confirmation code pending for a user, if any.
    ///
    /// The hosted provider delivers this by email; locally it is exposed
    /// here for the console and for tests.
    pub fn pending_code(&self, username: &str) -> Option<String> {
        let state = self.state.read();
        state
            .users
            .get(username)
            .and_then(|u| u.confirmation_code.clone())
    }

    /// Email address a user registered with.
    pub fn registered_email(&self, username: &str) -> Option<String> {
        let state = self.state.read();
        state.users.get(username).map(|u| u.email.clone())
    }

    fn register(&self, username: &str, password: &str, email: &str) -> Result<(), VaultError> {
        if username.is_empty() {
            return Err(VaultError::InvalidInput(
                "Username cannot be empty".to_string(),
            ));
        }
        validate_password(password)?;

        let mut state = self.state.write();
        if state.users.contains_key(username) {
            return Err(VaultError::InvalidInput(
                "Username already exists".to_string(),
            ));
        }

        let salt = Uuid::new_v4().to_string();
        let code = generate_confirmation_code();

        state.users.insert(
            username.to_string(),
            UserRecord {
                email: email.to_string(),
                password_hash: hash_password(password, &salt),
                salt,
                confirmed: false,
                confirmation_code: Some(code.clone()),
            },
        );

        log::info!("Registered user {} <{}> (confirmation pending)", username, email);
        log::debug!("Confirmation code for {}: {}", username, code);
        Ok(())
    }

    fn confirm(&self, username: &str, code: &str) -> Result<(), VaultError> {
        let mut state = self.state.write();
        let record = state
            .users
            .get_mut(username)
            .ok_or_else(|| VaultError::Auth("Unknown user".to_string()))?;

        match &record.confirmation_code {
            Some(expected) if expected == code => {
                record.confirmed = true;
                record.confirmation_code = None;
                log::info!("User {} confirmed", username);
                Ok(())
            }
            Some(_) => Err(VaultError::Auth("Invalid confirmation code".to_string())),
            None => Ok(()), // already confirmed
        }
    }

    fn authenticate(&self, username: &str, password: &str) -> Result<SessionToken, VaultError> {
        let mut state = self.state.write();

        let record = state
            .users
            .get(username)
            .ok_or_else(|| VaultError::Auth("Invalid credentials".to_string()))?;

        if !record.confirmed {
            return Err(VaultError::Auth("User is not confirmed".to_string()));
        }
        if hash_password(password, &record.salt) != record.password_hash {
            return Err(VaultError::Auth("Invalid credentials".to_string()));
        }

        // Expired sessions are dropped on every sign-in
        let now = Utc::now().timestamp();
        state.sessions.retain(|_, s| s.expires_at > now);

        let token = generate_token();
        state.sessions.insert(
            token.clone(),
            SessionRecord {
                username: username.to_string(),
                expires_at: now + SESSION_DURATION_HOURS * 3600,
            },
        );
        state.active_token = Some(token.clone());

        log::info!("User authenticated: {}", username);
        Ok(SessionToken::new(token))
    }

    fn session(&self) -> Result<SessionToken, VaultError> {
        let state = self.state.read();
        let token = state
            .active_token
            .as_ref()
            .ok_or_else(|| VaultError::Auth("No valid session".to_string()))?;

        let record = state
            .sessions
            .get(token)
            .ok_or_else(|| VaultError::Auth("Session revoked".to_string()))?;

        if record.expires_at <= Utc::now().timestamp() {
            return Err(VaultError::Auth("Session expired".to_string()));
        }

        Ok(SessionToken::new(token.clone()))
    }

    fn end_session(&self) {
        let mut state = self.state.write();
        if let Some(token) = state.active_token.take() {
            if let Some(record) = state.sessions.remove(&token) {
                log::info!("User signed out: {}", record.username);
            }
        }
    }
}

#[async_trait]
impl IdentityProvider for LocalDirectory {
    async fn current_session(&self) -> Result<SessionToken, VaultError> {
        self.session()
    }

    async fn sign_in(&self, username: &str, password: &str) -> Result<SessionToken, VaultError> {
        self.authenticate(username, password)
    }

    async fn sign_up(
        &self,
        username: &str,
        password: &str,
        email: &str,
    ) -> Result<(), VaultError> {
        self.register(username, password, email)
    }

    async fn confirm_sign_up(&self, username: &str, code: &str) -> Result<(), VaultError> {
        self.confirm(username, code)
    }

    async fn sign_out(&self) -> Result<(), VaultError> {
        self.end_session();
        Ok(())
    }
}

fn hash_password(password: &str, salt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(format!("{}:{}", password, salt));
    format!("{:x}", hasher.finalize())
}

fn generate_token() -> String {
    use rand::Rng;
    let mut rng = rand::thread_rng();
    (0..64)
        .map(|_| {
            let idx = rng.gen_range(0..62);
            let chars = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
            chars[idx] as char
        })
        .collect()
}

fn generate_confirmation_code() -> String {
    use rand::Rng;
    let mut rng = rand::thread_rng();
    format!("{:06}", rng.gen_range(0..1_000_000))
}
