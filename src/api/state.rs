use std::sync::Arc;
use crate::config::Config;
use crate::crypto::TokenService;
use crate::service::{AccountService, NoteService};

#[derive(Clone)]
pub struct AppState {
    pub accounts: AccountService,
    pub notes: NoteService,
    pub tokens: Arc<TokenService>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(db: sqlx::Pool<sqlx::Sqlite>, config: Arc<Config>) -> Self {
        let tokens = Arc::new(TokenService::new(config.token_secret.as_bytes()));

        Self {
            accounts: AccountService::new(db.clone(), tokens.clone(), config.token_ttl()),
            notes: NoteService::new(db),
            tokens,
            config,
        }
    }
}
