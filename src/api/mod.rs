pub mod auth;
pub mod extract;
pub mod notes;
pub mod state;
pub mod middleware;

pub use state::AppState;
pub use middleware::CallerId;

use axum::{
    Router,
    routing::{delete, get, post, put},
    middleware as axum_middleware,
};
use tower_http::{
    cors::CorsLayer,
    trace::TraceLayer,
    timeout::TimeoutLayer,
};
use std::time::Duration;
use serde::Serialize;

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

pub fn create_router(state: AppState) -> Router {
    let timeout = Duration::from_secs(state.config.request_timeout_secs);

    // Everything here sits behind the bearer-token gate
    let protected = Router::new()
        .route("/get-user", get(auth::me))
        .route("/add-note", post(notes::add_note))
        .route("/edit-note/:noteId", put(notes::edit_note))
        .route("/get-all-notes", get(notes::get_all_notes))
        .route("/delete-note/:noteId", delete(notes::delete_note))
        .route("/update-note-pinned/:noteId", put(notes::update_note_pinned))
        .route("/search-notes", get(notes::search_notes))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::auth_middleware,
        ));

    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/create-account", post(auth::register))
        .route("/login", post(auth::login))
        .merge(protected)
        .layer(TimeoutLayer::new(timeout))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn root() -> &'static str {
    "Server is running"
}

async fn health() -> axum::Json<HealthResponse> {
    axum::Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
