use crate::domain::{Address, Asset, ParseError};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use primitive_types::U256;
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;

/// How a failed call surfaces to callers.
///
/// `Revert` is an explicit business-rule check; `InvalidOpcode` is an
/// arithmetic invariant violation. Both roll back the whole transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Revert,
    InvalidOpcode,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::Revert => "revert",
            FailureKind::InvalidOpcode => "invalid_opcode",
        }
    }
}

/// Every way a contract call can fail.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("insufficient balance of {asset} for {account:?}: needed {needed}, available {available}")]
    InsufficientBalance {
        asset: Asset,
        account: Address,
        needed: U256,
        available: U256,
    },
    #[error("insufficient allowance for {spender:?} on {owner:?}: needed {needed}, available {available}")]
    InsufficientAllowance {
        owner: Address,
        spender: Address,
        needed: U256,
        available: U256,
    },
    #[error("arithmetic overflow")]
    ArithmeticOverflow,
    #[error("arithmetic underflow")]
    ArithmeticUnderflow,
    #[error("division by zero")]
    DivisionByZero,
    #[error("order signature does not match maker {maker:?}")]
    SignatureInvalid { maker: Address },
    #[error("order expired or already filled")]
    OrderExpiredOrExhausted,
    #[error("order oversubscribed: requested {requested}, remaining {remaining}")]
    OversubscribedOrder { requested: U256, remaining: U256 },
    #[error("caller {caller:?} is not authorized")]
    Unauthorized { caller: Address },
    #[error("ledger is not deprecated")]
    NotDeprecated,
    #[error("ledger is already deprecated")]
    AlreadyDeprecated,
    #[error("successor chain loops back to {0:?}")]
    CircularSuccession(Address),
    #[error("successor chain is longer than {max_hops} links")]
    SuccessionTooLong { max_hops: usize },
    #[error("token {token:?} rejected the transfer")]
    TokenTransferFailed { token: Address },
    #[error("no contract deployed at {0:?}")]
    UnknownContract(Address),
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),
}

impl LedgerError {
    pub fn kind(&self) -> FailureKind {
        match self {
            LedgerError::ArithmeticOverflow
            | LedgerError::ArithmeticUnderflow
            | LedgerError::DivisionByZero => FailureKind::InvalidOpcode,
            _ => FailureKind::Revert,
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Internal server error: {0}")]
    Internal(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<ParseError> for AppError {
    fn from(err: ParseError) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

impl From<crate::node::NodeError> for AppError {
    fn from(err: crate::node::NodeError) -> Self {
        match err {
            crate::node::NodeError::Ledger(LedgerError::UnknownContract(address)) => {
                AppError::NotFound(format!("no contract deployed at {:?}", address))
            }
            crate::node::NodeError::Ledger(e) => AppError::BadRequest(e.to_string()),
            crate::node::NodeError::Db(e) => AppError::Internal(e.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}
