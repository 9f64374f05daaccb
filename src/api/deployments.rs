use axum::extract::State;
use axum::Json;

use super::AppState;
use crate::chain::Deployment;
use crate::db::DeploymentRow;
use crate::error::AppError;

pub async fn post_deployment(
    State(state): State<AppState>,
    Json(deployment): Json<Deployment>,
) -> Result<Json<DeploymentRow>, AppError> {
    let row = state.node.deploy(deployment).await?;
    Ok(Json(row))
}
