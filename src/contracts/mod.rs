//! Collaborator contracts the ledger talks to through trait interfaces.
//!
//! The ledger never depends on a concrete token or modifiers implementation;
//! it looks them up by address in the chain's contract registry and calls
//! them through `Erc20` / `ModifiersProvider`.

use crate::domain::Address;
use crate::error::LedgerError;
use primitive_types::U256;
use serde::{Deserialize, Serialize};
use std::fmt;

pub mod modifiers;
pub mod token;

pub use modifiers::AccountModifiers;
pub use token::Eip20Token;

/// Standard fungible token surface.
///
/// Methods receive the calling account explicitly. `Ok(false)` and `Err(_)`
/// are both failures from the ledger's point of view.
pub trait Erc20: fmt::Debug + Send + Sync {
    fn name(&self) -> &str;

    fn symbol(&self) -> &str;

    fn decimals(&self) -> u8;

    fn total_supply(&self) -> U256;

    fn balance_of(&self, owner: &Address) -> U256;

    fn allowance(&self, owner: &Address, spender: &Address) -> U256;

    fn transfer(&mut self, sender: Address, to: Address, amount: U256)
        -> Result<bool, LedgerError>;

    fn transfer_from(
        &mut self,
        spender: Address,
        from: Address,
        to: Address,
        amount: U256,
    ) -> Result<bool, LedgerError>;

    fn approve(
        &mut self,
        owner: Address,
        spender: Address,
        amount: U256,
    ) -> Result<bool, LedgerError>;

    fn clone_box(&self) -> Box<dyn Erc20>;
}

impl Clone for Box<dyn Erc20> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

/// Fee modifiers of a single account, in percent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Modifiers {
    /// Discount on the taker fee when this account takes an order.
    pub taker_discount: u8,
    /// Share of the taker fee paid back when this account made the order.
    pub maker_rebate: u8,
}

/// Modifiers relevant to one trade: the taker's discount and the maker's rebate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TradeModifiers {
    pub taker_discount: u8,
    pub maker_rebate: u8,
}

/// Source of per-account fee modifiers.
pub trait ModifiersProvider: fmt::Debug + Send + Sync {
    /// Modifiers of `account`; absent entries are (0, 0).
    fn modifiers_of(&self, account: &Address) -> Modifiers;

    fn trade_modifiers(&self, maker: &Address, taker: &Address) -> TradeModifiers {
        TradeModifiers {
            taker_discount: self.modifiers_of(taker).taker_discount,
            maker_rebate: self.modifiers_of(maker).maker_rebate,
        }
    }

    fn set_modifiers(
        &mut self,
        caller: Address,
        account: Address,
        modifiers: Modifiers,
    ) -> Result<(), LedgerError>;

    fn clone_box(&self) -> Box<dyn ModifiersProvider>;
}

impl Clone for Box<dyn ModifiersProvider> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}
