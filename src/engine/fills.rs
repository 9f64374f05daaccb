use crate::domain::math::{safe_add, safe_sub};
use crate::domain::Address;
use crate::error::LedgerError;
use primitive_types::{H256, U256};
use std::collections::BTreeMap;

/// Cumulative filled `amountGet` per (maker, order hash).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FillTracker {
    filled: BTreeMap<(Address, H256), U256>,
}

impl FillTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filled(&self, maker: &Address, order_hash: &H256) -> U256 {
        self.filled
            .get(&(*maker, *order_hash))
            .copied()
            .unwrap_or_default()
    }

    /// Unfilled part of an order of size `amount_get`.
    pub fn remaining(
        &self,
        maker: &Address,
        order_hash: &H256,
        amount_get: U256,
    ) -> Result<U256, LedgerError> {
        safe_sub(amount_get, self.filled(maker, order_hash))
    }

    pub fn is_exhausted(&self, maker: &Address, order_hash: &H256, amount_get: U256) -> bool {
        self.filled(maker, order_hash) >= amount_get
    }

    /// Check that `amount` more can be filled.
    ///
    /// An order with nothing left is `OrderExpiredOrExhausted`; a request
    /// larger than what is left is `OversubscribedOrder`.
    pub fn check(
        &self,
        maker: &Address,
        order_hash: &H256,
        amount_get: U256,
        amount: U256,
    ) -> Result<U256, LedgerError> {
        let filled = self.filled(maker, order_hash);
        if filled >= amount_get {
            return Err(LedgerError::OrderExpiredOrExhausted);
        }
        let after = safe_add(filled, amount)?;
        if after > amount_get {
            return Err(LedgerError::OversubscribedOrder {
                requested: amount,
                remaining: amount_get - filled,
            });
        }
        Ok(after)
    }

    pub fn record(&mut self, maker: Address, order_hash: H256, filled_after: U256) {
        self.filled.insert((maker, order_hash), filled_after);
    }
}
