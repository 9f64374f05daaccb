use axum::extract::State;
use axum::Json;
use serde_json::json;

use super::AppState;
use crate::error::AppError;

pub async fn health() -> Json<serde_json::Value> {
    Json(json!({"status": "ok"}))
}

/// Ready once the journal answers; reports the current block height.
pub async fn ready(State(state): State<AppState>) -> Result<Json<serde_json::Value>, AppError> {
    let journaled = state.node.repository().count_receipts().await?;
    let block_number = state.node.read(|chain| chain.block_number()).await;
    Ok(Json(json!({
        "status": "ready",
        "blockNumber": block_number,
        "receipts": journaled,
    })))
}
