//! Signed, time-limited access tokens (HS256 JWT).
//!
//! Every token this service issues uses one claim layout: the user id in
//! `sub`, `iat`/`exp` as Unix seconds, and any auxiliary claims flattened
//! alongside. Tokens minted by older deployments carried the id either flat
//! (`{"id": ...}`) or inside an embedded user record (`{"user": {"_id": ...}}`);
//! [`TokenService::verify`] accepts all three and only ever hands back the id.

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{AppError, AuthFailure};

const RESERVED_CLAIMS: [&str; 3] = ["sub", "iat", "exp"];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
struct IncomingClaims {
    sub: Option<String>,
    id: Option<String>,
    user: Option<EmbeddedUser>,
}

#[derive(Debug, Deserialize)]
struct EmbeddedUser {
    #[serde(alias = "_id")]
    id: Option<String>,
}

impl IncomingClaims {
    fn user_id(self) -> Option<String> {
        self.sub
            .or(self.id)
            .or_else(|| self.user.and_then(|u| u.id))
            .filter(|id| !id.is_empty())
    }
}

pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl TokenService {
    pub fn new(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
        }
    }

    /// Sign a token for `user_id` that expires `ttl` from now.
    pub fn issue(
        &self,
        user_id: &str,
        mut extra: Map<String, Value>,
        ttl: chrono::Duration,
    ) -> Result<String, AppError> {
        for key in RESERVED_CLAIMS {
            extra.remove(key);
        }

        let iat = chrono::Utc::now().timestamp();
        let claims = Claims {
            sub: user_id.to_string(),
            iat,
            exp: iat + ttl.num_seconds(),
            extra,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AppError::Internal(format!("Token signing failed: {}", e)))
    }

    /// Check signature and expiry, returning the user id the token is bound to.
    pub fn verify(&self, token: &str) -> Result<String, AuthFailure> {
        let data = decode::<IncomingClaims>(token, &self.decoding, &self.validation).map_err(
            |e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthFailure::Expired,
                _ => AuthFailure::Malformed,
            },
        )?;

        data.claims.user_id().ok_or(AuthFailure::Malformed)
    }
}
