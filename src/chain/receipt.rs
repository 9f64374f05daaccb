use crate::domain::{Address, BlockNumber, Log};
use crate::error::{FailureKind, LedgerError};
use primitive_types::H256;
use serde::{Deserialize, Serialize};

/// Outcome of one executed transaction.
///
/// A failed transaction still gets a receipt and a block; its logs are empty
/// because every state change it made was rolled back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Receipt {
    pub tx_hash: H256,
    pub block_number: BlockNumber,
    pub from: Address,
    pub to: Address,
    pub method: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub failure_kind: Option<FailureKind>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub message: Option<String>,
    pub logs: Vec<Log>,
    #[serde(skip)]
    pub error: Option<LedgerError>,
}

impl Receipt {
    pub(crate) fn succeeded(
        tx_hash: H256,
        block_number: BlockNumber,
        from: Address,
        to: Address,
        method: &str,
        logs: Vec<Log>,
    ) -> Self {
        Self {
            tx_hash,
            block_number,
            from,
            to,
            method: method.to_string(),
            success: true,
            failure_kind: None,
            message: None,
            logs,
            error: None,
        }
    }

    pub(crate) fn failed(
        tx_hash: H256,
        block_number: BlockNumber,
        from: Address,
        to: Address,
        method: &str,
        error: LedgerError,
    ) -> Self {
        Self {
            tx_hash,
            block_number,
            from,
            to,
            method: method.to_string(),
            success: false,
            failure_kind: Some(error.kind()),
            message: Some(error.to_string()),
            logs: Vec::new(),
            error: Some(error),
        }
    }

    pub fn into_result(self) -> Result<Receipt, LedgerError> {
        match self.error.clone() {
            Some(err) => Err(err),
            None => Ok(self),
        }
    }
}
