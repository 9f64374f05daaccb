use axum::extract::State;
use axum::Json;

use super::AppState;
use crate::chain::{Receipt, Transaction};
use crate::error::AppError;

/// Execute a transaction. Contract-level failures still answer 200 with a
/// receipt whose `success` is false.
pub async fn post_transaction(
    State(state): State<AppState>,
    Json(tx): Json<Transaction>,
) -> Result<Json<Receipt>, AppError> {
    let receipt = state.node.submit(tx).await?;
    Ok(Json(receipt))
}
