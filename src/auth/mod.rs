use std::sync::Arc;

use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use argon2::password_hash::{SaltString, rand_core::OsRng};
use chrono::{Duration, Utc};
use cookie::{Cookie, SameSite};

use crate::{
    domain::User,
    error::{AppError, Result},
    store::EntityStore,
};

pub mod session;

use session::{Session, SessionStore};

/// Simulated login against the user directory.
///
/// Every account shares one demo password. This is a convenience for
/// exploring the app, not a security boundary.
pub struct AuthService {
    store: Arc<EntityStore>,
    session_store: SessionStore,
    password_hash: String,
    session_duration_hours: i64,
}

impl AuthService {
    pub fn new(
        store: Arc<EntityStore>,
        demo_password: &str,
        session_duration_hours: i64,
    ) -> Result<Self> {
        Ok(Self {
            session_store: SessionStore::new(store.clone()),
            store,
            password_hash: Self::hash_password(demo_password)?,
            session_duration_hours,
        })
    }

    pub fn verify_password(password: &str, hash: &str) -> Result<bool> {
        let parsed_hash = PasswordHash::new(hash)
            .map_err(|e| AppError::Internal(format!("Invalid password hash: {}", e)))?;

        let argon2 = Argon2::default();

        Ok(argon2.verify_password(password.as_bytes(), &parsed_hash).is_ok())
    }

    pub fn hash_password(password: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();

        let password_hash = argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))?;

        Ok(password_hash.to_string())
    }

    /// Exact email match against the directory, then the shared password.
    /// Returns the user and a fresh session token.
    pub async fn login(&self, email: &str, password: &str) -> Result<(User, String)> {
        let user = self
            .find_user_by_email(email)
            .await
            .ok_or(AppError::Unauthorized)?;

        if !Self::verify_password(password, &self.password_hash)? {
            tracing::warn!(email = %email, "Login rejected: wrong password");
            return Err(AppError::Unauthorized);
        }

        let (_session, token) = self.create_session(&user).await?;
        tracing::info!(user_id = %user.id, role = user.role.as_str(), "User logged in");

        Ok((user, token))
    }

    pub async fn logout(&self, token: &str) -> Result<()> {
        self.session_store.delete_by_token(token).await
    }

    pub async fn find_user_by_email(&self, email: &str) -> Option<User> {
        self.store
            .users()
            .snapshot()
            .await
            .iter()
            .find(|u| u.email == email)
            .cloned()
    }

    async fn create_session(&self, user: &User) -> Result<(Session, String)> {
        let token = generate_token();
        let expires_at = Utc::now() + Duration::hours(self.session_duration_hours);

        let session = self.session_store
            .create(user.id, &token, expires_at)
            .await?;

        Ok((session, token))
    }

    /// Resolves a session token to the user it belongs to.
    pub async fn validate_session(&self, token: &str) -> Result<Option<User>> {
        let Some(session) = self.session_store.find_by_token(token).await? else {
            return Ok(None);
        };

        Ok(self.store.users().find(session.user_id).await)
    }

    pub async fn cleanup_expired_sessions(&self) -> Result<u64> {
        self.session_store.cleanup_expired().await
    }

    pub fn create_session_cookie(&self, token: &str, secure: bool) -> Cookie<'static> {
        Cookie::build(("session", token.to_string()))
            .path("/")
            .same_site(SameSite::Lax)
            .http_only(true)
            .secure(secure)
            .max_age(cookie::time::Duration::hours(self.session_duration_hours))
            .build()
    }

    pub fn create_logout_cookie() -> Cookie<'static> {
        Cookie::build(("session", ""))
            .path("/")
            .same_site(SameSite::Lax)
            .http_only(true)
            .max_age(cookie::time::Duration::seconds(0))
            .build()
    }
}

fn generate_token() -> String {
    use rand::RngCore;
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}
