//! Reference EIP-20 token.

use super::Erc20;
use crate::domain::math::{safe_add, safe_sub};
use crate::domain::{Address, Asset};
use crate::error::LedgerError;
use primitive_types::U256;
use std::collections::BTreeMap;

#[derive(Debug, Clone)]
pub struct Eip20Token {
    name: String,
    symbol: String,
    decimals: u8,
    total_supply: U256,
    balances: BTreeMap<Address, U256>,
    allowed: BTreeMap<(Address, Address), U256>,
}

impl Eip20Token {
    /// Mint the whole supply to `creator`.
    pub fn new(creator: Address, supply: U256, name: &str, decimals: u8, symbol: &str) -> Self {
        let mut balances = BTreeMap::new();
        balances.insert(creator, supply);
        Self {
            name: name.to_string(),
            symbol: symbol.to_string(),
            decimals,
            total_supply: supply,
            balances,
            allowed: BTreeMap::new(),
        }
    }

    fn move_balance(&mut self, from: Address, to: Address, amount: U256) -> Result<(), LedgerError> {
        let available = self.balance_of(&from);
        if available < amount {
            // The chain fills in this token's address when it surfaces the error.
            return Err(LedgerError::InsufficientBalance {
                asset: Asset::default(),
                account: from,
                needed: amount,
                available,
            });
        }
        self.balances.insert(from, safe_sub(available, amount)?);
        let credited = safe_add(self.balance_of(&to), amount)?;
        self.balances.insert(to, credited);
        Ok(())
    }
}

impl Erc20 for Eip20Token {
    fn name(&self) -> &str {
        &self.name
    }

    fn symbol(&self) -> &str {
        &self.symbol
    }

    fn decimals(&self) -> u8 {
        self.decimals
    }

    fn total_supply(&self) -> U256 {
        self.total_supply
    }

    fn balance_of(&self, owner: &Address) -> U256 {
        self.balances.get(owner).copied().unwrap_or_default()
    }

    fn allowance(&self, owner: &Address, spender: &Address) -> U256 {
        self.allowed
            .get(&(*owner, *spender))
            .copied()
            .unwrap_or_default()
    }

    fn transfer(
        &mut self,
        sender: Address,
        to: Address,
        amount: U256,
    ) -> Result<bool, LedgerError> {
        self.move_balance(sender, to, amount)?;
        Ok(true)
    }

    fn transfer_from(
        &mut self,
        spender: Address,
        from: Address,
        to: Address,
        amount: U256,
    ) -> Result<bool, LedgerError> {
        let allowance = self.allowance(&from, &spender);
        if allowance < amount {
            return Err(LedgerError::InsufficientAllowance {
                owner: from,
                spender,
                needed: amount,
                available: allowance,
            });
        }
        self.move_balance(from, to, amount)?;
        if allowance < U256::MAX {
            self.allowed
                .insert((from, spender), safe_sub(allowance, amount)?);
        }
        Ok(true)
    }

    fn approve(
        &mut self,
        owner: Address,
        spender: Address,
        amount: U256,
    ) -> Result<bool, LedgerError> {
        self.allowed.insert((owner, spender), amount);
        Ok(true)
    }

    fn clone_box(&self) -> Box<dyn Erc20> {
        Box::new(self.clone())
    }
}
