//! Domain types for the exchange ledger.
//!
//! This module provides:
//! - Addresses, asset identifiers and U256 parsing helpers
//! - Checked arithmetic used by every balance mutation
//! - Orders, their canonical digest and maker signatures
//! - Events emitted by contracts

pub mod event;
pub mod math;
pub mod order;
pub mod primitives;
pub mod signature;

pub use event::{Event, Log};
pub use order::{Order, SignedOrder};
pub use primitives::{parse_address, parse_amount, Address, Asset, BlockNumber, ParseError};
pub use signature::{OrderSignature, OrderSigner};
