//! `GET /health`

use axum::Json;
use axum::extract::State;
use serde_json::{Value, json};

use crate::state::AppState;

pub async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "topic_base": state.router.topic_base(),
        "admin": state.router.admin().get(),
        "channels": state.channels.as_slice(),
        "topics": state.bus.topic_count(),
    }))
}
