use crate::domain::primitives::u256_dec;
use crate::domain::{Address, SignedOrder};
use primitive_types::{H256, U256};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// A call sent by `from` to the contract at `to`, optionally carrying ether.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub from: Address,
    pub to: Address,
    #[serde(default, with = "u256_dec")]
    pub value: U256,
    pub call: Call,
}

impl Transaction {
    pub fn new(from: Address, to: Address, call: Call) -> Self {
        Self {
            from,
            to,
            value: U256::zero(),
            call,
        }
    }

    pub fn with_value(mut self, value: U256) -> Self {
        self.value = value;
        self
    }

    /// Identifier of this transaction when sent with the given sender nonce.
    pub fn hash(&self, nonce: u64) -> H256 {
        let mut hasher = Sha256::new();
        hasher.update(self.from.as_bytes());
        hasher.update(nonce.to_be_bytes());
        hasher.update(self.to.as_bytes());
        let mut value = [0u8; 32];
        self.value.to_big_endian(&mut value);
        hasher.update(value);
        hasher.update(serde_json::to_vec(&self.call).unwrap_or_default());
        H256::from_slice(&hasher.finalize())
    }
}

/// Contract methods reachable by a transaction.
///
/// Ledger methods go to a ledger address, `approve`/`transfer`/`transferFrom`
/// to a token and `setModifiers` to a modifiers provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "method", content = "params", rename_all = "camelCase")]
pub enum Call {
    Deposit,
    #[serde(rename_all = "camelCase")]
    DepositToken {
        token: Address,
        #[serde(with = "u256_dec")]
        amount: U256,
    },
    Withdraw {
        #[serde(with = "u256_dec")]
        amount: U256,
    },
    #[serde(rename_all = "camelCase")]
    WithdrawToken {
        token: Address,
        #[serde(with = "u256_dec")]
        amount: U256,
    },
    Trade {
        order: SignedOrder,
        #[serde(with = "u256_dec")]
        amount: U256,
    },
    Deprecate {
        deprecated: bool,
        successor: Address,
    },
    MigrateFunds {
        #[serde(default)]
        tokens: Vec<Address>,
    },
    DepositForUser {
        user: Address,
    },
    DepositTokenForUser {
        token: Address,
        #[serde(with = "u256_dec")]
        amount: U256,
        user: Address,
    },
    ChangeAccountModifiers {
        provider: Address,
    },
    #[serde(rename_all = "camelCase")]
    ChangeFeeAccount {
        fee_account: Address,
    },
    TransferOwnership {
        owner: Address,
    },
    Approve {
        spender: Address,
        #[serde(with = "u256_dec")]
        amount: U256,
    },
    Transfer {
        to: Address,
        #[serde(with = "u256_dec")]
        amount: U256,
    },
    TransferFrom {
        from: Address,
        to: Address,
        #[serde(with = "u256_dec")]
        amount: U256,
    },
    #[serde(rename_all = "camelCase")]
    SetModifiers {
        account: Address,
        taker_discount: u8,
        maker_rebate: u8,
    },
}

impl Call {
    pub fn method(&self) -> &'static str {
        match self {
            Call::Deposit => "deposit",
            Call::DepositToken { .. } => "depositToken",
            Call::Withdraw { .. } => "withdraw",
            Call::WithdrawToken { .. } => "withdrawToken",
            Call::Trade { .. } => "trade",
            Call::Deprecate { .. } => "deprecate",
            Call::MigrateFunds { .. } => "migrateFunds",
            Call::DepositForUser { .. } => "depositForUser",
            Call::DepositTokenForUser { .. } => "depositTokenForUser",
            Call::ChangeAccountModifiers { .. } => "changeAccountModifiers",
            Call::ChangeFeeAccount { .. } => "changeFeeAccount",
            Call::TransferOwnership { .. } => "transferOwnership",
            Call::Approve { .. } => "approve",
            Call::Transfer { .. } => "transfer",
            Call::TransferFrom { .. } => "transferFrom",
            Call::SetModifiers { .. } => "setModifiers",
        }
    }

    /// Whether the method accepts attached ether.
    pub fn is_payable(&self) -> bool {
        matches!(self, Call::Deposit | Call::DepositForUser { .. })
    }
}

/// Contracts that can be created through the node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Deployment {
    Ledger {
        from: Address,
        #[serde(with = "u256_dec")]
        fee: U256,
        #[serde(default)]
        predecessor: Option<Address>,
    },
    Token {
        from: Address,
        #[serde(with = "u256_dec")]
        supply: U256,
        name: String,
        decimals: u8,
        symbol: String,
    },
    AccountModifiers {
        from: Address,
    },
}

impl Deployment {
    pub fn deployer(&self) -> Address {
        match self {
            Deployment::Ledger { from, .. }
            | Deployment::Token { from, .. }
            | Deployment::AccountModifiers { from } => *from,
        }
    }
}
