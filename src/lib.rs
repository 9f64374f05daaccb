pub mod api;
pub mod chain;
pub mod config;
pub mod contracts;
pub mod db;
pub mod domain;
pub mod engine;
pub mod error;
pub mod node;

pub use chain::{Call, Chain, Deployment, LedgerInfo, Receipt, Transaction};
pub use config::Config;
pub use contracts::{AccountModifiers, Eip20Token, Erc20, Modifiers, ModifiersProvider};
pub use db::{init_db, Repository};
pub use domain::{Address, Asset, Order, OrderSigner, SignedOrder};
pub use engine::TokenStore;
pub use error::{AppError, FailureKind, LedgerError};
pub use node::{Node, NodeError};
