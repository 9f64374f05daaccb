//! Repository layer over the receipt journal.

use crate::chain::Receipt;
use crate::domain::{parse_address, Address, BlockNumber, Log};
use crate::error::FailureKind;
use primitive_types::H256;
use serde::Serialize;
use sqlx::sqlite::{SqlitePool, SqliteRow};
use sqlx::Row;
use tracing::warn;

/// Filter for receipt queries. Results come back in block order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReceiptQuery {
    pub from: Option<Address>,
    pub to: Option<Address>,
    pub from_block: Option<BlockNumber>,
    pub limit: Option<i64>,
}

/// A contract created through the node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentRow {
    pub address: Address,
    pub kind: String,
    pub deployer: Address,
    pub block_number: BlockNumber,
}

/// Repository for database operations.
#[derive(Debug, Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Repository { pool }
    }

    // =========================================================================
    // Receipts
    // =========================================================================

    /// Journal a receipt. Re-inserting the same transaction hash is a no-op.
    ///
    /// # Errors
    /// Returns an error if the insert fails.
    pub async fn insert_receipt(&self, receipt: &Receipt) -> Result<bool, sqlx::Error> {
        let logs = serde_json::to_string(&receipt.logs)
            .map_err(|e| sqlx::Error::Protocol(format!("receipt logs not serializable: {}", e)))?;
        let result = sqlx::query(
            r#"
            INSERT INTO receipts (tx_hash, block_number, sender, recipient, method,
                                  success, failure_kind, message, logs, recorded_at_ms)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(tx_hash) DO NOTHING
            "#,
        )
        .bind(hex_h256(&receipt.tx_hash))
        .bind(receipt.block_number as i64)
        .bind(hex_address(&receipt.from))
        .bind(hex_address(&receipt.to))
        .bind(&receipt.method)
        .bind(receipt.success)
        .bind(receipt.failure_kind.map(|k| k.as_str()))
        .bind(receipt.message.as_deref())
        .bind(logs)
        .bind(chrono::Utc::now().timestamp_millis())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Query journaled receipts.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub async fn query_receipts(&self, query: &ReceiptQuery) -> Result<Vec<Receipt>, sqlx::Error> {
        let rows = sqlx::query(
            r#"
            SELECT tx_hash, block_number, sender, recipient, method,
                   success, failure_kind, message, logs
            FROM receipts
            WHERE (?1 IS NULL OR sender = ?1)
              AND (?2 IS NULL OR recipient = ?2)
              AND block_number >= ?3
            ORDER BY block_number ASC
            LIMIT ?4
            "#,
        )
        .bind(query.from.as_ref().map(hex_address))
        .bind(query.to.as_ref().map(hex_address))
        .bind(query.from_block.unwrap_or(0) as i64)
        .bind(query.limit.unwrap_or(-1))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().filter_map(receipt_from_row).collect())
    }

    /// Get a receipt by transaction hash.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub async fn get_receipt(&self, tx_hash: &H256) -> Result<Option<Receipt>, sqlx::Error> {
        let row = sqlx::query(
            r#"
            SELECT tx_hash, block_number, sender, recipient, method,
                   success, failure_kind, message, logs
            FROM receipts
            WHERE tx_hash = ?
            "#,
        )
        .bind(hex_h256(tx_hash))
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().and_then(receipt_from_row))
    }

    pub async fn count_receipts(&self) -> Result<i64, sqlx::Error> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM receipts")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.0)
    }

    // =========================================================================
    // Deployments
    // =========================================================================

    /// Record a deployed contract.
    ///
    /// # Errors
    /// Returns an error if the insert fails.
    pub async fn insert_deployment(&self, deployment: &DeploymentRow) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            INSERT INTO deployments (address, kind, deployer, block_number, recorded_at_ms)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(address) DO NOTHING
            "#,
        )
        .bind(hex_address(&deployment.address))
        .bind(&deployment.kind)
        .bind(hex_address(&deployment.deployer))
        .bind(deployment.block_number as i64)
        .bind(chrono::Utc::now().timestamp_millis())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn list_deployments(&self) -> Result<Vec<DeploymentRow>, sqlx::Error> {
        let rows = sqlx::query(
            r#"
            SELECT address, kind, deployer, block_number
            FROM deployments
            ORDER BY block_number ASC, address ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .iter()
            .filter_map(|row| {
                Some(DeploymentRow {
                    address: parse_address(&row.get::<String, _>("address")).ok()?,
                    kind: row.get("kind"),
                    deployer: parse_address(&row.get::<String, _>("deployer")).ok()?,
                    block_number: row.get::<i64, _>("block_number") as BlockNumber,
                })
            })
            .collect())
    }
}

fn hex_address(address: &Address) -> String {
    format!("{:?}", address)
}

fn hex_h256(hash: &H256) -> String {
    format!("{:?}", hash)
}

fn parse_h256(raw: &str) -> Option<H256> {
    let bytes = hex::decode(raw.trim_start_matches("0x")).ok()?;
    (bytes.len() == 32).then(|| H256::from_slice(&bytes))
}

fn receipt_from_row(row: &SqliteRow) -> Option<Receipt> {
    let tx_hash: String = row.get("tx_hash");
    let logs: String = row.get("logs");
    let logs: Vec<Log> = match serde_json::from_str(&logs) {
        Ok(logs) => logs,
        Err(e) => {
            warn!(%tx_hash, error = %e, "skipping receipt with unreadable logs");
            return None;
        }
    };
    let failure_kind = match row.get::<Option<String>, _>("failure_kind").as_deref() {
        Some("revert") => Some(FailureKind::Revert),
        Some("invalid_opcode") => Some(FailureKind::InvalidOpcode),
        _ => None,
    };

    Some(Receipt {
        tx_hash: parse_h256(&tx_hash)?,
        block_number: row.get::<i64, _>("block_number") as BlockNumber,
        from: parse_address(&row.get::<String, _>("sender")).ok()?,
        to: parse_address(&row.get::<String, _>("recipient")).ok()?,
        method: row.get("method"),
        success: row.get("success"),
        failure_kind,
        message: row.get("message"),
        logs,
        error: None,
    })
}
