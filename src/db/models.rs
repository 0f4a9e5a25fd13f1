use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id")]
    pub id: String,
    pub full_name: String,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    #[serde(rename = "createdOn")]
    pub created_at: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    #[serde(rename = "_id")]
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub content: String,
    #[sqlx(json)]
    pub tags: Vec<String>, // JSON array column
    pub is_pinned: bool,
    #[serde(rename = "createdOn")]
    pub created_at: i64,
}
