use sqlx::types::Json;
use sqlx::{Pool, Sqlite};
use uuid::Uuid;
use crate::db::models::Note;
use crate::error::AppError;

pub struct NoteRepository;

/// Fields to overwrite in place; `None` keeps the stored value.
#[derive(Debug, Default)]
pub struct NoteUpdate<'a> {
    pub title: Option<&'a str>,
    pub content: Option<&'a str>,
    pub tags: Option<&'a [String]>,
    pub is_pinned: Option<bool>,
}

impl NoteRepository {
    pub async fn create(
        pool: &Pool<Sqlite>,
        user_id: &str,
        title: &str,
        content: &str,
        tags: &[String],
    ) -> Result<Note, AppError> {
        let id = Uuid::new_v4().to_string();
        let created_at = chrono::Utc::now().timestamp();

        let note = sqlx::query_as::<_, Note>(
            r#"
INSERT INTO notes (id, user_id, title, content, tags, is_pinned, created_at)
VALUES (?, ?, ?, ?, ?, FALSE, ?)
RETURNING *
            "#,
        )
        .bind(&id)
        .bind(user_id)
        .bind(title)
        .bind(content)
        .bind(Json(tags))
        .bind(created_at)
        .fetch_one(pool)
        .await?;

        Ok(note)
    }

    pub async fn get_by_owner(
        pool: &Pool<Sqlite>,
        id: &str,
        user_id: &str,
    ) -> Result<Option<Note>, AppError> {
        let note = sqlx::query_as::<_, Note>(
            "SELECT * FROM notes WHERE id = ? AND user_id = ?"
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        Ok(note)
    }

    /// All of a user's notes, pinned first, then oldest first.
    pub async fn list_by_owner(
        pool: &Pool<Sqlite>,
        user_id: &str,
    ) -> Result<Vec<Note>, AppError> {
        let notes = sqlx::query_as::<_, Note>(
            r#"
SELECT * FROM notes
WHERE user_id = ?
ORDER BY is_pinned DESC, created_at ASC, rowid ASC
            "#
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(notes)
    }

    /// Notes whose title or content contains `query`, ignoring case.
    ///
    /// Matching happens here rather than in SQL because SQLite only folds ASCII case.
    pub async fn search_by_owner(
        pool: &Pool<Sqlite>,
        user_id: &str,
        query: &str,
    ) -> Result<Vec<Note>, AppError> {
        let needle = query.to_lowercase();

        let notes = Self::list_by_owner(pool, user_id)
            .await?
            .into_iter()
            .filter(|n| {
                n.title.to_lowercase().contains(&needle)
                    || n.content.to_lowercase().contains(&needle)
            })
            .collect();

        Ok(notes)
    }

    /// Apply `update` in a single statement. `None` when no such note belongs to `user_id`.
    pub async fn update_by_owner(
        pool: &Pool<Sqlite>,
        id: &str,
        user_id: &str,
        update: &NoteUpdate<'_>,
    ) -> Result<Option<Note>, AppError> {
        let note = sqlx::query_as::<_, Note>(
            r#"
UPDATE notes SET
    title = COALESCE(?, title),
    content = COALESCE(?, content),
    tags = COALESCE(?, tags),
    is_pinned = COALESCE(?, is_pinned)
WHERE id = ? AND user_id = ?
RETURNING *
            "#,
        )
        .bind(update.title)
        .bind(update.content)
        .bind(update.tags.map(Json))
        .bind(update.is_pinned)
        .bind(id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        Ok(note)
    }

    pub async fn toggle_pin_by_owner(
        pool: &Pool<Sqlite>,
        id: &str,
        user_id: &str,
    ) -> Result<Option<Note>, AppError> {
        let note = sqlx::query_as::<_, Note>(
            r#"
UPDATE notes SET is_pinned = NOT is_pinned
WHERE id = ? AND user_id = ?
RETURNING *
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        Ok(note)
    }

    /// Upsert on `id`. An existing row is only overwritten when it belongs to `note.user_id`.
    pub async fn save(
        pool: &Pool<Sqlite>,
        note: &Note,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
INSERT INTO notes (id, user_id, title, content, tags, is_pinned, created_at)
VALUES (?, ?, ?, ?, ?, ?, ?)
ON CONFLICT(id) DO UPDATE SET
    title = excluded.title,
    content = excluded.content,
    tags = excluded.tags,
    is_pinned = excluded.is_pinned
WHERE notes.user_id = excluded.user_id
            "#,
        )
        .bind(&note.id)
        .bind(&note.user_id)
        .bind(&note.title)
        .bind(&note.content)
        .bind(Json(&note.tags))
        .bind(note.is_pinned)
        .bind(note.created_at)
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Returns the number of rows removed (0 or 1).
    pub async fn delete_by_owner(
        pool: &Pool<Sqlite>,
        id: &str,
        user_id: &str,
    ) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM notes WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected())
    }
}
