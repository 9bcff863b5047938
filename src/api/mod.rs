pub mod market;
pub mod signals;
pub mod tests;

use axum::{routing::get, Json, Router};
use serde_json::json;

use crate::AppState;

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .nest("/api/market", market::router())
        .nest("/api/signals", signals::router())
        .nest("/api/tests", tests::router())
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}
