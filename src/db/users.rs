use sqlx::{Pool, Sqlite};
use uuid::Uuid;
use crate::db::models::User;
use crate::error::AppError;

pub struct UserRepository;

impl UserRepository {
    pub async fn create(
        pool: &Pool<Sqlite>,
        full_name: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<User, AppError> {
        let id = Uuid::new_v4().to_string();
        let created_at = chrono::Utc::now().timestamp();

        let user = sqlx::query_as::<_, User>(
            r#"
INSERT INTO users (id, full_name, email, password_hash, created_at)
VALUES (?, ?, ?, ?, ?)
RETURNING *
            "#,
        )
        .bind(&id)
        .bind(full_name)
        .bind(email)
        .bind(password_hash)
        .bind(created_at)
        .fetch_one(pool)
        .await
        .map_err(|e| match e {
            // Lost a race with a concurrent registration for the same email
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                AppError::Conflict("User already exists".to_string())
            }
            other => AppError::Database(other),
        })?;

        Ok(user)
    }

    /// Exact, case-sensitive match on the login key.
    pub async fn get_by_email(
        pool: &Pool<Sqlite>,
        email: &str,
    ) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE email = ?"
        )
        .bind(email)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    pub async fn get_by_id(
        pool: &Pool<Sqlite>,
        id: &str,
    ) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE id = ?"
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }
}
