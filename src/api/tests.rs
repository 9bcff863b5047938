//! Paper-test CRUD endpoints.

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use serde_json::json;

use crate::error::{AppError, Result};
use crate::services::{NewTest, SaveOutcome};
use crate::types::{PaperTest, TestStats};
use crate::AppState;

/// Create the tests router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_tests).post(create_test))
        .route("/stats", get(get_stats))
        .route(
            "/:id",
            get(get_test).put(update_test).delete(delete_test),
        )
}

/// All tests, newest first.
async fn list_tests(State(state): State<AppState>) -> Json<Vec<PaperTest>> {
    Json(state.store.all())
}

/// Promote a signal to a test. Duplicates are reported in the body, not as
/// an error status.
async fn create_test(
    State(state): State<AppState>,
    Json(new): Json<NewTest>,
) -> Result<Json<serde_json::Value>> {
    let outcome = state.store.create(
        new,
        state.config.manual_dedup_window_mins,
        chrono::Utc::now().timestamp(),
    )?;

    match outcome {
        SaveOutcome::Created(id) => Ok(Json(json!({ "id": id }))),
        SaveOutcome::Duplicate => Ok(Json(json!({ "error": "Duplicate test" }))),
    }
}

async fn get_test(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PaperTest>> {
    state
        .store
        .get(&id)
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("test {id}")))
}

/// Write back a full test record (the caller owns the transition logic).
async fn update_test(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(mut test): Json<PaperTest>,
) -> Result<Json<serde_json::Value>> {
    test.id = id;
    state.store.update(test)?;
    Ok(Json(json!({ "success": true })))
}

async fn delete_test(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>> {
    if !state.store.delete(&id)? {
        return Err(AppError::NotFound(format!("test {id}")));
    }
    Ok(Json(json!({ "success": true })))
}

async fn get_stats(State(state): State<AppState>) -> Json<TestStats> {
    Json(state.store.stats())
}
