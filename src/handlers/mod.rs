pub mod converse;
pub mod converse_types;

use axum::{
    routing::{get, post},
    Router,
};

use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/telugu/v1/converse", post(converse::handle_converse))
        .route("/telugu/v1/health", get(|| async { "ok" }))
        .with_state(state)
}
