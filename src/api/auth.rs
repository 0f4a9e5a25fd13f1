use axum::{
    extract::State,
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};

use crate::api::extract::ApiJson;
use crate::api::middleware::CallerId;
use crate::api::state::AppState;
use crate::db::User;
use crate::error::AppError;

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RegisterRequest {
    pub full_name: String,
    pub email: String,
    pub password: String,
}

/// The account summary returned at registration, keyed by `id` rather than `_id`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisteredUser {
    pub id: String,
    pub full_name: String,
    pub email: String,
}

impl From<User> for RegisteredUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            full_name: user.full_name,
            email: user.email,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub error: bool,
    pub user: RegisteredUser,
    pub access_token: String,
    pub message: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub error: bool,
    pub message: String,
    pub email: String,
    pub access_token: String,
}

#[derive(Debug, Serialize)]
pub struct UserInfoResponse {
    pub error: bool,
    pub user: User,
    pub message: String,
}

/// POST /create-account
pub async fn register(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), AppError> {
    let (user, access_token) = state
        .accounts
        .register(&req.full_name, &req.email, &req.password)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            error: false,
            user: user.into(),
            access_token,
            message: "Register successful".to_string(),
        }),
    ))
}

/// POST /login
pub async fn login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let (user, access_token) = state.accounts.login(&req.email, &req.password).await?;

    Ok(Json(LoginResponse {
        error: false,
        message: "Login successful".to_string(),
        email: user.email,
        access_token,
    }))
}

/// GET /get-user (requires auth via middleware)
pub async fn me(
    State(state): State<AppState>,
    Extension(CallerId(user_id)): Extension<CallerId>,
) -> Result<Json<UserInfoResponse>, AppError> {
    let user = state.accounts.profile(&user_id).await?;

    Ok(Json(UserInfoResponse {
        error: false,
        user,
        message: String::new(),
    }))
}
