use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use super::AppState;
use crate::db::DeploymentRow;
use crate::domain::{Address, BlockNumber};
use crate::error::AppError;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainResponse {
    pub block_number: BlockNumber,
    pub ledger: Address,
    pub deployments: Vec<DeploymentRow>,
}

#[derive(Debug, Deserialize)]
pub struct MineRequest {
    #[serde(default = "one_block")]
    pub blocks: u64,
}

fn one_block() -> u64 {
    1
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MineResponse {
    pub block_number: BlockNumber,
}

pub async fn get_chain(State(state): State<AppState>) -> Result<Json<ChainResponse>, AppError> {
    let block_number = state.node.read(|chain| chain.block_number()).await;
    let deployments = state.node.deployments().await?;
    Ok(Json(ChainResponse {
        block_number,
        ledger: state.ledger,
        deployments,
    }))
}

pub async fn post_mine(
    State(state): State<AppState>,
    Json(body): Json<MineRequest>,
) -> Result<Json<MineResponse>, AppError> {
    if body.blocks == 0 || body.blocks > 10_000 {
        return Err(AppError::BadRequest(
            "blocks must be between 1 and 10000".into(),
        ));
    }
    let block_number = state.node.mine(body.blocks).await;
    Ok(Json(MineResponse { block_number }))
}
