use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};

use crate::api::extract::ApiJson;
use crate::api::middleware::CallerId;
use crate::api::state::AppState;
use crate::db::Note;
use crate::error::AppError;
use crate::service::{NewNote, NoteChanges};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SearchQuery {
    pub query: String,
}

#[derive(Debug, Serialize)]
pub struct NoteResponse {
    pub error: bool,
    pub note: Note,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct NotesResponse {
    pub error: bool,
    pub notes: Vec<Note>,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub error: bool,
    pub message: String,
}

fn note_response(note: Note, message: &str) -> Json<NoteResponse> {
    Json(NoteResponse {
        error: false,
        note,
        message: message.to_string(),
    })
}

fn notes_response(notes: Vec<Note>, message: &str) -> Json<NotesResponse> {
    Json(NotesResponse {
        error: false,
        notes,
        message: message.to_string(),
    })
}

/// POST /add-note
pub async fn add_note(
    State(state): State<AppState>,
    Extension(CallerId(user_id)): Extension<CallerId>,
    ApiJson(req): ApiJson<NewNote>,
) -> Result<Json<NoteResponse>, AppError> {
    let note = state.notes.create(&user_id, req).await?;
    Ok(note_response(note, "Note added successfully"))
}

/// PUT /edit-note/:noteId
pub async fn edit_note(
    State(state): State<AppState>,
    Extension(CallerId(user_id)): Extension<CallerId>,
    Path(note_id): Path<String>,
    ApiJson(changes): ApiJson<NoteChanges>,
) -> Result<Json<NoteResponse>, AppError> {
    let note = state.notes.edit(&user_id, &note_id, changes).await?;
    Ok(note_response(note, "Note updated successfully"))
}

/// GET /get-all-notes
pub async fn get_all_notes(
    State(state): State<AppState>,
    Extension(CallerId(user_id)): Extension<CallerId>,
) -> Result<Json<NotesResponse>, AppError> {
    let notes = state.notes.list_all(&user_id).await?;
    Ok(notes_response(notes, "All notes retrieved successfully"))
}

/// DELETE /delete-note/:noteId
pub async fn delete_note(
    State(state): State<AppState>,
    Extension(CallerId(user_id)): Extension<CallerId>,
    Path(note_id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    state.notes.delete(&user_id, &note_id).await?;

    Ok(Json(MessageResponse {
        error: false,
        message: "Note deleted successfully".to_string(),
    }))
}

/// PUT /update-note-pinned/:noteId
///
/// Flips the pinned flag. Any request body is ignored.
pub async fn update_note_pinned(
    State(state): State<AppState>,
    Extension(CallerId(user_id)): Extension<CallerId>,
    Path(note_id): Path<String>,
) -> Result<Json<NoteResponse>, AppError> {
    let note = state.notes.toggle_pin(&user_id, &note_id).await?;
    Ok(note_response(note, "Note updated successfully"))
}

/// GET /search-notes?query=
pub async fn search_notes(
    State(state): State<AppState>,
    Extension(CallerId(user_id)): Extension<CallerId>,
    Query(params): Query<SearchQuery>,
) -> Result<Json<NotesResponse>, AppError> {
    let notes = state.notes.search(&user_id, &params.query).await?;
    Ok(notes_response(
        notes,
        "Notes matching the search query retrieved successfully",
    ))
}
