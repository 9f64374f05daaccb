//! Shared handle over the chain plus the receipt journal.
//!
//! All transactions go through one async mutex, so the chain sees a single
//! serialized sequence no matter how many requests race.

pub mod genesis;

pub use genesis::bootstrap;

use crate::chain::{Chain, Deployment, Receipt, Transaction};
use crate::db::{DeploymentRow, ReceiptQuery, Repository};
use crate::error::LedgerError;
use primitive_types::H256;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum NodeError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error("Database error: {0}")]
    Db(#[from] sqlx::Error),
}

#[derive(Clone)]
pub struct Node {
    chain: Arc<Mutex<Chain>>,
    repo: Arc<Repository>,
}

impl Node {
    pub fn new(chain: Chain, repo: Arc<Repository>) -> Self {
        Self {
            chain: Arc::new(Mutex::new(chain)),
            repo,
        }
    }

    pub fn repository(&self) -> &Repository {
        &self.repo
    }

    /// Execute a transaction and journal its receipt.
    ///
    /// A transaction that fails inside the chain still returns `Ok` with a
    /// failed receipt. If the journal write fails the chain is put back to
    /// where it was before the transaction, so an `Err` never leaves state
    /// behind.
    pub async fn submit(&self, tx: Transaction) -> Result<Receipt, NodeError> {
        let mut chain = self.chain.lock().await;
        let checkpoint = chain.clone();
        let receipt = chain.execute(tx);
        if let Err(e) = self.repo.insert_receipt(&receipt).await {
            *chain = checkpoint;
            warn!(tx_hash = ?receipt.tx_hash, error = %e, "journal write failed, transaction discarded");
            return Err(e.into());
        }
        Ok(receipt)
    }

    pub async fn deploy(&self, deployment: Deployment) -> Result<DeploymentRow, NodeError> {
        let kind = match &deployment {
            Deployment::Ledger { .. } => "ledger",
            Deployment::Token { .. } => "token",
            Deployment::AccountModifiers { .. } => "accountModifiers",
        };
        let deployer = deployment.deployer();

        let mut chain = self.chain.lock().await;
        let checkpoint = chain.clone();
        let address = chain.deploy(deployment)?;
        let row = DeploymentRow {
            address,
            kind: kind.to_string(),
            deployer,
            block_number: chain.block_number(),
        };
        if let Err(e) = self.repo.insert_deployment(&row).await {
            *chain = checkpoint;
            warn!(?address, error = %e, "journal write failed, deployment discarded");
            return Err(e.into());
        }
        info!(?address, kind, "contract deployed through node");
        Ok(row)
    }

    /// Run a read-only closure against the current chain state.
    pub async fn read<T>(&self, f: impl FnOnce(&Chain) -> T) -> T {
        let chain = self.chain.lock().await;
        f(&chain)
    }

    pub async fn mine(&self, blocks: u64) -> u64 {
        let mut chain = self.chain.lock().await;
        chain.mine(blocks);
        chain.block_number()
    }

    pub async fn receipts(&self, query: &ReceiptQuery) -> Result<Vec<Receipt>, NodeError> {
        Ok(self.repo.query_receipts(query).await?)
    }

    pub async fn receipt(&self, tx_hash: &H256) -> Result<Option<Receipt>, NodeError> {
        Ok(self.repo.get_receipt(tx_hash).await?)
    }

    pub async fn deployments(&self) -> Result<Vec<DeploymentRow>, NodeError> {
        Ok(self.repo.list_deployments().await?)
    }
}
