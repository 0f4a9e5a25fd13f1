use axum::extract::FromRequest;

use crate::error::AppError;

/// `axum::Json`, but a bad body answers with the usual `{error, message}` shape.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);
