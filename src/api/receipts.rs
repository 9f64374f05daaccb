use axum::extract::{Path, Query, State};
use axum::Json;
use primitive_types::H256;
use serde::{Deserialize, Serialize};

use super::AppState;
use crate::chain::Receipt;
use crate::db::ReceiptQuery;
use crate::domain::parse_address;
use crate::error::AppError;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptsParams {
    pub from: Option<String>,
    pub to: Option<String>,
    pub from_block: Option<u64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct ReceiptsResponse {
    pub receipts: Vec<Receipt>,
}

pub async fn get_receipts(
    Query(params): Query<ReceiptsParams>,
    State(state): State<AppState>,
) -> Result<Json<ReceiptsResponse>, AppError> {
    let query = ReceiptQuery {
        from: params.from.as_deref().map(parse_address).transpose()?,
        to: params.to.as_deref().map(parse_address).transpose()?,
        from_block: params.from_block,
        limit: params.limit,
    };
    let receipts = state.node.receipts(&query).await?;
    Ok(Json(ReceiptsResponse { receipts }))
}

pub async fn get_receipt(
    Path(hash): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<Receipt>, AppError> {
    let tx_hash = parse_tx_hash(&hash)?;
    state
        .node
        .receipt(&tx_hash)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("no receipt for {}", hash)))
}

fn parse_tx_hash(raw: &str) -> Result<H256, AppError> {
    let digits = raw.trim().strip_prefix("0x").unwrap_or(raw.trim());
    match hex::decode(digits) {
        Ok(bytes) if bytes.len() == 32 => Ok(H256::from_slice(&bytes)),
        _ => Err(AppError::BadRequest(format!("invalid transaction hash: {}", raw))),
    }
}
