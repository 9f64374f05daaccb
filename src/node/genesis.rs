use super::{Node, NodeError};
use crate::chain::Chain;
use crate::config::Config;
use crate::db::{DeploymentRow, Repository};
use crate::domain::Address;
use std::sync::Arc;
use tracing::info;

/// Fund the genesis accounts, deploy the configured ledger and wrap the
/// result in a `Node`. Returns the node and the ledger address.
pub async fn bootstrap(config: &Config, repo: Arc<Repository>) -> Result<(Node, Address), NodeError> {
    let mut chain = Chain::new();
    for account in &config.genesis_accounts {
        chain.fund(*account, config.genesis_balance)?;
    }
    let ledger = chain.deploy_ledger(config.ledger_owner, config.ledger_fee, None)?;
    repo.insert_deployment(&DeploymentRow {
        address: ledger,
        kind: "ledger".to_string(),
        deployer: config.ledger_owner,
        block_number: chain.block_number(),
    })
    .await?;

    info!(
        ?ledger,
        owner = ?config.ledger_owner,
        fee = %config.ledger_fee,
        funded = config.genesis_accounts.len(),
        "genesis complete"
    );
    Ok((Node::new(chain, repo), ledger))
}
