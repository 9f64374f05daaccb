//! Events emitted by contracts during a transaction.

use crate::domain::primitives::u256_dec;
use crate::domain::{Address, Asset};
use primitive_types::{H256, U256};
use serde::{Deserialize, Serialize};

/// A log entry: the emitting contract plus the event payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Log {
    pub address: Address,
    pub event: Event,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Event {
    #[serde(rename_all = "camelCase")]
    Deposit {
        asset: Asset,
        user: Address,
        #[serde(with = "u256_dec")]
        amount: U256,
        #[serde(with = "u256_dec")]
        balance: U256,
    },
    #[serde(rename_all = "camelCase")]
    Withdraw {
        asset: Asset,
        user: Address,
        #[serde(with = "u256_dec")]
        amount: U256,
        #[serde(with = "u256_dec")]
        balance: U256,
    },
    #[serde(rename_all = "camelCase")]
    Trade {
        order_hash: H256,
        token_get: Asset,
        #[serde(with = "u256_dec")]
        amount_get: U256,
        token_give: Asset,
        #[serde(with = "u256_dec")]
        amount_give: U256,
        maker: Address,
        taker: Address,
        #[serde(with = "u256_dec")]
        gross_fee: U256,
        #[serde(with = "u256_dec")]
        maker_rebate: U256,
    },
    #[serde(rename_all = "camelCase")]
    FundsMigrated { user: Address, target: Address },
    #[serde(rename_all = "camelCase")]
    Deprecated { successor: Address },
    #[serde(rename_all = "camelCase")]
    ModifiersChanged { provider: Address },
    #[serde(rename_all = "camelCase")]
    FeeAccountChanged { fee_account: Address },
    #[serde(rename_all = "camelCase")]
    OwnershipTransferred { previous: Address, owner: Address },
    #[serde(rename_all = "camelCase")]
    Transfer {
        from: Address,
        to: Address,
        #[serde(with = "u256_dec")]
        amount: U256,
    },
    #[serde(rename_all = "camelCase")]
    Approval {
        owner: Address,
        spender: Address,
        #[serde(with = "u256_dec")]
        amount: U256,
    },
    #[serde(rename_all = "camelCase")]
    ModifiersSet {
        account: Address,
        taker_discount: u8,
        maker_rebate: u8,
    },
}
