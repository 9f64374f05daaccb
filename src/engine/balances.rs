use crate::domain::math::{safe_add, safe_sub};
use crate::domain::{Address, Asset};
use crate::error::LedgerError;
use primitive_types::U256;
use std::collections::BTreeMap;

/// (asset, account) → balance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BalanceBook {
    balances: BTreeMap<(Asset, Address), U256>,
}

impl BalanceBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn balance_of(&self, asset: Asset, account: &Address) -> U256 {
        self.balances
            .get(&(asset, *account))
            .copied()
            .unwrap_or_default()
    }

    /// Add `amount`; fails with `ArithmeticOverflow` and leaves the book untouched.
    pub fn credit(&mut self, asset: Asset, account: Address, amount: U256) -> Result<U256, LedgerError> {
        let updated = safe_add(self.balance_of(asset, &account), amount)?;
        self.balances.insert((asset, account), updated);
        Ok(updated)
    }

    /// Subtract `amount` after an explicit sufficiency check.
    pub fn debit(&mut self, asset: Asset, account: Address, amount: U256) -> Result<U256, LedgerError> {
        let available = self.balance_of(asset, &account);
        if available < amount {
            return Err(LedgerError::InsufficientBalance {
                asset,
                account,
                needed: amount,
                available,
            });
        }
        let updated = available - amount;
        self.balances.insert((asset, account), updated);
        Ok(updated)
    }

    /// Zero the balance and return what was there.
    pub fn take(&mut self, asset: Asset, account: Address) -> U256 {
        self.balances
            .insert((asset, account), U256::zero())
            .unwrap_or_default()
    }

    /// Sum of every account's balance of `asset`.
    pub fn total_of(&self, asset: Asset) -> Result<U256, LedgerError> {
        self.balances
            .iter()
            .filter(|((a, _), _)| *a == asset)
            .try_fold(U256::zero(), |acc, (_, v)| safe_add(acc, *v))
    }

    /// Start a staged batch of mutations over this book.
    pub fn stage(&self) -> StagedBalances<'_> {
        StagedBalances {
            base: self,
            overlay: BTreeMap::new(),
        }
    }

    /// Apply the result of a successful `StagedBalances` batch.
    pub fn commit(&mut self, changes: BalanceChanges) {
        for (key, value) in changes.0 {
            self.balances.insert(key, value);
        }
    }
}

/// Overlay of pending balance writes, read-through to the base book.
///
/// Nothing reaches the book until `finish` hands the overlay to
/// `BalanceBook::commit`; dropping a failed batch discards it.
pub struct StagedBalances<'a> {
    base: &'a BalanceBook,
    overlay: BTreeMap<(Asset, Address), U256>,
}

/// Final values produced by a staged batch.
#[derive(Debug, Default)]
pub struct BalanceChanges(BTreeMap<(Asset, Address), U256>);

impl<'a> StagedBalances<'a> {
    pub fn balance_of(&self, asset: Asset, account: &Address) -> U256 {
        self.overlay
            .get(&(asset, *account))
            .copied()
            .unwrap_or_else(|| self.base.balance_of(asset, account))
    }

    pub fn credit(&mut self, asset: Asset, account: Address, amount: U256) -> Result<(), LedgerError> {
        let updated = safe_add(self.balance_of(asset, &account), amount)?;
        self.overlay.insert((asset, account), updated);
        Ok(())
    }

    /// Checked subtraction; a shortfall is an `ArithmeticUnderflow`.
    pub fn debit(&mut self, asset: Asset, account: Address, amount: U256) -> Result<(), LedgerError> {
        let updated = safe_sub(self.balance_of(asset, &account), amount)?;
        self.overlay.insert((asset, account), updated);
        Ok(())
    }

    pub fn finish(self) -> BalanceChanges {
        BalanceChanges(self.overlay)
    }
}
