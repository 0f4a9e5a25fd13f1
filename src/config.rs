use std::str::FromStr;

use crate::error::AppError;

#[derive(Clone)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    pub database_url: String,
    pub token_secret: String,
    pub token_ttl_minutes: i64,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub request_timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let token_secret = std::env::var("ACCESS_TOKEN_SECRET")
            .ok()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| AppError::Config("ACCESS_TOKEN_SECRET must be set".to_string()))?;

        Ok(Config {
            server_host: std::env::var("SERVER_HOST")
                .unwrap_or_else(|_| "127.0.0.1".to_string()),
            server_port: env_or("SERVER_PORT", 8000)?,
            database_url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://notes.db?mode=rwc".to_string()),
            token_secret,
            token_ttl_minutes: env_or("ACCESS_TOKEN_TTL_MINUTES", 1440)?,
            db_max_connections: env_or("DB_MAX_CONNECTIONS", 20)?,
            db_min_connections: env_or("DB_MIN_CONNECTIONS", 1)?,
            request_timeout_secs: env_or("REQUEST_TIMEOUT_SECS", 30)?,
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }

    pub fn token_ttl(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.token_ttl_minutes)
    }
}

fn env_or<T>(key: &str, default: T) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .parse()
            .map_err(|e| AppError::Config(format!("Invalid {}: {}", key, e))),
        Err(_) => Ok(default),
    }
}
