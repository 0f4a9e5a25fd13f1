use std::sync::Arc;

use serde_json::{Map, Value};
use sqlx::{Pool, Sqlite};

use crate::crypto::{hash_password, verify_password, TokenService};
use crate::db::{User, UserRepository};
use crate::error::{AppError, AuthFailure};

/// Registration, login and profile lookup.
#[derive(Clone)]
pub struct AccountService {
    db: Pool<Sqlite>,
    tokens: Arc<TokenService>,
    token_ttl: chrono::Duration,
}

fn require(value: &str, message: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::Validation(message.to_string()));
    }
    Ok(())
}

impl AccountService {
    pub fn new(db: Pool<Sqlite>, tokens: Arc<TokenService>, token_ttl: chrono::Duration) -> Self {
        Self { db, tokens, token_ttl }
    }

    pub async fn register(
        &self,
        full_name: &str,
        email: &str,
        password: &str,
    ) -> Result<(User, String), AppError> {
        require(full_name, "Full Name is required")?;
        require(email, "Email is required")?;
        if password.is_empty() {
            return Err(AppError::Validation("Password is required".to_string()));
        }

        if UserRepository::get_by_email(&self.db, email).await?.is_some() {
            return Err(AppError::Conflict("User already exists".to_string()));
        }

        let password_hash = hash_password(password)?;
        let user = UserRepository::create(&self.db, full_name, email, &password_hash).await?;
        tracing::info!(user_id = %user.id, "account registered");

        let token = self.issue_for(&user)?;
        Ok((user, token))
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<(User, String), AppError> {
        require(email, "Email is required")?;
        if password.is_empty() {
            return Err(AppError::Validation("Password is required".to_string()));
        }

        let user = UserRepository::get_by_email(&self.db, email)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        if !verify_password(password, &user.password_hash)? {
            tracing::warn!(user_id = %user.id, "login rejected: wrong password");
            return Err(AppError::InvalidCredentials);
        }

        tracing::info!(user_id = %user.id, "login succeeded");
        let token = self.issue_for(&user)?;
        Ok((user, token))
    }

    /// The caller's own account. A token for a user that no longer resolves is refused.
    pub async fn profile(&self, user_id: &str) -> Result<User, AppError> {
        UserRepository::get_by_id(&self.db, user_id)
            .await?
            .ok_or(AppError::Unauthorized(AuthFailure::UnknownUser))
    }

    fn issue_for(&self, user: &User) -> Result<String, AppError> {
        let mut claims = Map::new();
        claims.insert("email".to_string(), Value::String(user.email.clone()));
        claims.insert("fullName".to_string(), Value::String(user.full_name.clone()));

        self.tokens.issue(&user.id, claims, self.token_ttl)
    }
}
