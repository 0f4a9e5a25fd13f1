use serde::Deserialize;
use sqlx::{Pool, Sqlite};

use crate::db::notes::NoteUpdate;
use crate::db::{Note, NoteRepository, UserRepository};
use crate::error::{AppError, AuthFailure};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct NewNote {
    pub title: String,
    pub content: String,
    pub tags: Option<Vec<String>>,
}

/// A partial update. `None` leaves the field alone; `Some` replaces it,
/// including `Some(false)` for `is_pinned` and `Some(vec![])` for `tags`.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NoteChanges {
    pub title: Option<String>,
    pub content: Option<String>,
    pub tags: Option<Vec<String>>,
    pub is_pinned: Option<bool>,
}

impl NoteChanges {
    fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.content.is_none()
            && self.tags.is_none()
            && self.is_pinned.is_none()
    }
}

/// Trim, drop blanks, and de-duplicate keeping first occurrence.
fn normalize_tags(tags: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.trim();
        if !tag.is_empty() && !out.iter().any(|t| t == tag) {
            out.push(tag.to_string());
        }
    }
    out
}

fn not_found() -> AppError {
    AppError::NotFound("Note not found".to_string())
}

/// Note use cases. Every lookup is keyed on the note id *and* the caller's id.
#[derive(Clone)]
pub struct NoteService {
    db: Pool<Sqlite>,
}

impl NoteService {
    pub fn new(db: Pool<Sqlite>) -> Self {
        Self { db }
    }

    pub async fn create(&self, owner_id: &str, new: NewNote) -> Result<Note, AppError> {
        if new.title.trim().is_empty() {
            return Err(AppError::Validation("Title is required".to_string()));
        }
        if new.content.trim().is_empty() {
            return Err(AppError::Validation("Content is required".to_string()));
        }

        if UserRepository::get_by_id(&self.db, owner_id).await?.is_none() {
            return Err(AuthFailure::UnknownUser.into());
        }

        let tags = normalize_tags(new.tags.unwrap_or_default());
        let note =
            NoteRepository::create(&self.db, owner_id, &new.title, &new.content, &tags).await?;
        tracing::debug!(note_id = %note.id, owner_id, "note created");

        Ok(note)
    }

    pub async fn edit(
        &self,
        owner_id: &str,
        note_id: &str,
        changes: NoteChanges,
    ) -> Result<Note, AppError> {
        if changes.is_empty() {
            return Err(AppError::Validation("No changes provided".to_string()));
        }
        if changes.title.as_deref().is_some_and(|t| t.trim().is_empty()) {
            return Err(AppError::Validation("Title cannot be empty".to_string()));
        }
        if changes.content.as_deref().is_some_and(|c| c.trim().is_empty()) {
            return Err(AppError::Validation("Content cannot be empty".to_string()));
        }

        let tags = changes.tags.map(normalize_tags);
        let update = NoteUpdate {
            title: changes.title.as_deref(),
            content: changes.content.as_deref(),
            tags: tags.as_deref(),
            is_pinned: changes.is_pinned,
        };

        let note = NoteRepository::update_by_owner(&self.db, note_id, owner_id, &update)
            .await?
            .ok_or_else(not_found)?;
        tracing::debug!(note_id, owner_id, "note edited");

        Ok(note)
    }

    pub async fn list_all(&self, owner_id: &str) -> Result<Vec<Note>, AppError> {
        NoteRepository::list_by_owner(&self.db, owner_id).await
    }

    pub async fn delete(&self, owner_id: &str, note_id: &str) -> Result<(), AppError> {
        NoteRepository::get_by_owner(&self.db, note_id, owner_id)
            .await?
            .ok_or_else(not_found)?;

        // A concurrent delete may have won between the lookup and here
        if NoteRepository::delete_by_owner(&self.db, note_id, owner_id).await? == 0 {
            return Err(not_found());
        }
        tracing::debug!(note_id, owner_id, "note deleted");

        Ok(())
    }

    pub async fn toggle_pin(&self, owner_id: &str, note_id: &str) -> Result<Note, AppError> {
        let note = NoteRepository::toggle_pin_by_owner(&self.db, note_id, owner_id)
            .await?
            .ok_or_else(not_found)?;
        tracing::debug!(note_id, owner_id, pinned = note.is_pinned, "note pin toggled");

        Ok(note)
    }

    /// The query is matched as given; surrounding whitespace is significant.
    pub async fn search(&self, owner_id: &str, query: &str) -> Result<Vec<Note>, AppError> {
        if query.trim().is_empty() {
            return Err(AppError::Validation("Search query is required".to_string()));
        }

        NoteRepository::search_by_owner(&self.db, owner_id, query).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;

    struct Fixture {
        notes: NoteService,
        alice: String,
        bob: String,
    }

    async fn fixture() -> Fixture {
        let pool = test_pool().await;
        let alice = UserRepository::create(&pool, "Alice", "alice@example.com", "hash")
            .await
            .unwrap()
            .id;
        let bob = UserRepository::create(&pool, "Bob", "bob@example.com", "hash")
            .await
            .unwrap()
            .id;

        Fixture { notes: NoteService::new(pool), alice, bob }
    }

    fn new_note(title: &str, content: &str) -> NewNote {
        NewNote {
            title: title.to_string(),
            content: content.to_string(),
            tags: None,
        }
    }

    #[test]
    fn test_normalize_tags() {
        let tags = vec![" work ".into(), "".into(), "home".into(), "work".into(), "  ".into()];
        assert_eq!(normalize_tags(tags), vec!["work".to_string(), "home".to_string()]);
    }

    #[tokio::test]
    async fn test_create_requires_title_and_content() {
        let f = fixture().await;

        assert!(matches!(
            f.notes.create(&f.alice, new_note("", "body")).await.unwrap_err(),
            AppError::Validation(_)
        ));
        assert!(matches!(
            f.notes.create(&f.alice, new_note("title", " ")).await.unwrap_err(),
            AppError::Validation(_)
        ));
        assert!(f.notes.list_all(&f.alice).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_for_unknown_owner() {
        let f = fixture().await;

        assert!(matches!(
            f.notes.create("ghost", new_note("t", "c")).await.unwrap_err(),
            AppError::Unauthorized(AuthFailure::UnknownUser)
        ));
    }

    #[tokio::test]
    async fn test_created_note_visible_only_to_owner() {
        let f = fixture().await;

        let note = f.notes.create(&f.alice, new_note("Title", "Body")).await.unwrap();
        assert!(!note.is_pinned);
        assert!(note.tags.is_empty());
        assert_eq!(note.user_id, f.alice);

        let mine = f.notes.list_all(&f.alice).await.unwrap();
        assert_eq!(mine, vec![note.clone()]);
        assert!(f.notes.list_all(&f.bob).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_edit_is_partial() {
        let f = fixture().await;
        let note = f
            .notes
            .create(
                &f.alice,
                NewNote {
                    title: "Title".into(),
                    content: "Body".into(),
                    tags: Some(vec!["a".into()]),
                },
            )
            .await
            .unwrap();

        let edited = f
            .notes
            .edit(
                &f.alice,
                &note.id,
                NoteChanges { content: Some("New body".into()), ..Default::default() },
            )
            .await
            .unwrap();
        assert_eq!(edited.title, "Title");
        assert_eq!(edited.content, "New body");
        assert_eq!(edited.tags, vec!["a".to_string()]);

        let stored = &f.notes.list_all(&f.alice).await.unwrap()[0];
        assert_eq!(stored, &edited);
    }

    #[tokio::test]
    async fn test_edit_without_changes_fails() {
        let f = fixture().await;
        let note = f.notes.create(&f.alice, new_note("Title", "Body")).await.unwrap();

        assert!(matches!(
            f.notes.edit(&f.alice, &note.id, NoteChanges::default()).await.unwrap_err(),
            AppError::Validation(_)
        ));
    }

    #[tokio::test]
    async fn test_edit_can_unpin_and_clear_tags() {
        let f = fixture().await;
        let note = f
            .notes
            .create(
                &f.alice,
                NewNote {
                    title: "Title".into(),
                    content: "Body".into(),
                    tags: Some(vec!["x".into()]),
                },
            )
            .await
            .unwrap();
        f.notes.toggle_pin(&f.alice, &note.id).await.unwrap();

        let edited = f
            .notes
            .edit(
                &f.alice,
                &note.id,
                NoteChanges {
                    is_pinned: Some(false),
                    tags: Some(vec![]),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(!edited.is_pinned);
        assert!(edited.tags.is_empty());
    }

    #[tokio::test]
    async fn test_edit_foreign_note_is_not_found() {
        let f = fixture().await;
        let note = f.notes.create(&f.alice, new_note("Title", "Body")).await.unwrap();

        let err = f
            .notes
            .edit(
                &f.bob,
                &note.id,
                NoteChanges { title: Some("Mine now".into()), ..Default::default() },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        let stored = &f.notes.list_all(&f.alice).await.unwrap()[0];
        assert_eq!(stored.title, "Title");
    }

    #[tokio::test]
    async fn test_delete() {
        let f = fixture().await;
        let note = f.notes.create(&f.alice, new_note("Title", "Body")).await.unwrap();

        assert!(matches!(
            f.notes.delete(&f.bob, &note.id).await.unwrap_err(),
            AppError::NotFound(_)
        ));

        f.notes.delete(&f.alice, &note.id).await.unwrap();
        assert!(f.notes.list_all(&f.alice).await.unwrap().is_empty());

        assert!(matches!(
            f.notes.delete(&f.alice, &note.id).await.unwrap_err(),
            AppError::NotFound(_)
        ));
    }

    #[tokio::test]
    async fn test_toggle_pin_twice_restores_state() {
        let f = fixture().await;
        let note = f.notes.create(&f.alice, new_note("Title", "Body")).await.unwrap();

        assert!(f.notes.toggle_pin(&f.alice, &note.id).await.unwrap().is_pinned);
        assert!(!f.notes.toggle_pin(&f.alice, &note.id).await.unwrap().is_pinned);

        assert!(matches!(
            f.notes.toggle_pin(&f.bob, &note.id).await.unwrap_err(),
            AppError::NotFound(_)
        ));
    }

    #[tokio::test]
    async fn test_list_orders_pinned_first() {
        let f = fixture().await;
        let a = f.notes.create(&f.alice, new_note("A", "a")).await.unwrap();
        let b = f.notes.create(&f.alice, new_note("B", "b")).await.unwrap();
        let c = f.notes.create(&f.alice, new_note("C", "c")).await.unwrap();
        f.notes.toggle_pin(&f.alice, &b.id).await.unwrap();

        let order: Vec<String> = f
            .notes
            .list_all(&f.alice)
            .await
            .unwrap()
            .into_iter()
            .map(|n| n.id)
            .collect();
        assert_eq!(order, vec![b.id, a.id, c.id]);
    }

    #[tokio::test]
    async fn test_search() {
        let f = fixture().await;
        let title_hit = f.notes.create(&f.alice, new_note("Category list", "stuff")).await.unwrap();
        let content_hit = f.notes.create(&f.alice, new_note("Pets", "I have a cat")).await.unwrap();
        f.notes.create(&f.alice, new_note("Dogs", "Woof")).await.unwrap();
        f.notes.create(&f.bob, new_note("cat facts", "cat")).await.unwrap();

        let ids: Vec<String> = f
            .notes
            .search(&f.alice, "cat")
            .await
            .unwrap()
            .into_iter()
            .map(|n| n.id)
            .collect();
        assert_eq!(ids, vec![title_hit.id, content_hit.id]);

        assert_eq!(f.notes.search(&f.alice, "CAT").await.unwrap().len(), 2);
        assert!(matches!(
            f.notes.search(&f.alice, "").await.unwrap_err(),
            AppError::Validation(_)
        ));
    }

    #[tokio::test]
    async fn test_concurrent_toggles_both_apply() {
        let f = fixture().await;
        let note = f.notes.create(&f.alice, new_note("Title", "Body")).await.unwrap();

        let (first, second) = tokio::join!(
            f.notes.toggle_pin(&f.alice, &note.id),
            f.notes.toggle_pin(&f.alice, &note.id),
        );
        first.unwrap();
        second.unwrap();

        let stored = &f.notes.list_all(&f.alice).await.unwrap()[0];
        assert!(!stored.is_pinned);
    }

    #[tokio::test]
    async fn test_concurrent_edit_and_toggle_keep_both_changes() {
        let f = fixture().await;
        let note = f.notes.create(&f.alice, new_note("t", "Body")).await.unwrap();

        let (edited, toggled) = tokio::join!(
            f.notes.edit(
                &f.alice,
                &note.id,
                NoteChanges { title: Some("t2".into()), ..Default::default() },
            ),
            f.notes.toggle_pin(&f.alice, &note.id),
        );
        edited.unwrap();
        toggled.unwrap();

        let stored = &f.notes.list_all(&f.alice).await.unwrap()[0];
        assert_eq!(stored.title, "t2");
        assert!(stored.is_pinned);
        assert_eq!(stored.content, "Body");
    }

    #[tokio::test]
    async fn test_search_folds_non_ascii_case() {
        let f = fixture().await;
        let hit = f.notes.create(&f.alice, new_note("Über café", "menu")).await.unwrap();
        f.notes.create(&f.alice, new_note("Uber", "rides")).await.unwrap();

        let hits = f.notes.search(&f.alice, "über").await.unwrap();
        assert_eq!(hits, vec![hit.clone()]);
        assert_eq!(f.notes.search(&f.alice, "CAFÉ").await.unwrap(), vec![hit]);
    }

    #[tokio::test]
    async fn test_search_keeps_surrounding_whitespace() {
        let f = fixture().await;
        f.notes.create(&f.alice, new_note("Category list", "stuff")).await.unwrap();
        let spaced = f.notes.create(&f.alice, new_note("Pets", "I have a cat")).await.unwrap();

        let hits = f.notes.search(&f.alice, " cat").await.unwrap();
        assert_eq!(hits, vec![spaced]);
        assert!(matches!(
            f.notes.search(&f.alice, "   ").await.unwrap_err(),
            AppError::Validation(_)
        ));
    }

    #[tokio::test]
    async fn test_concurrent_deletes_report_one_success() {
        let f = fixture().await;
        let note = f.notes.create(&f.alice, new_note("Title", "Body")).await.unwrap();

        let (first, second) = tokio::join!(
            f.notes.delete(&f.alice, &note.id),
            f.notes.delete(&f.alice, &note.id),
        );

        let outcomes = [first, second];
        assert_eq!(outcomes.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(outcomes
            .iter()
            .any(|r| matches!(r, Err(AppError::NotFound(_)))));
    }
}
