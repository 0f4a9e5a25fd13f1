use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::api::state::AppState;
use crate::error::{AppError, AuthFailure};

/// The authenticated caller, placed in request extensions by [`auth_middleware`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerId(pub String);

/// Pull the credential out of `Authorization: Bearer <token>`.
fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthFailure> {
    let auth_header = headers
        .get(AUTHORIZATION)
        .ok_or(AuthFailure::Missing)?
        .to_str()
        .map_err(|_| AuthFailure::Malformed)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or(AuthFailure::Malformed)?
        .trim();

    if token.is_empty() {
        return Err(AuthFailure::Missing);
    }
    Ok(token)
}

/// Authentication middleware - verifies the bearer token and records the caller
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(request.headers())?;

    let user_id = state.tokens.verify(token).map_err(|failure| {
        tracing::debug!(%failure, "bearer token rejected");
        failure
    })?;

    request.extensions_mut().insert(CallerId(user_id));

    Ok(next.run(request).await)
}
