use crate::contracts::{Erc20, ModifiersProvider};
use crate::domain::math::{safe_add, safe_sub};
use crate::domain::{Address, Asset, Event, Log};
use crate::engine::TokenStore;
use crate::error::LedgerError;
use primitive_types::U256;
use std::collections::BTreeMap;

/// Code deployed at an address.
#[derive(Debug, Clone)]
pub enum Contract {
    Ledger(TokenStore),
    Token(Box<dyn Erc20>),
    Modifiers(Box<dyn ModifiersProvider>),
}

impl Contract {
    pub fn kind(&self) -> &'static str {
        match self {
            Contract::Ledger(_) => "ledger",
            Contract::Token(_) => "token",
            Contract::Modifiers(_) => "modifiers",
        }
    }
}

/// Everything a transaction can change: native balances, contract storage
/// and the log buffer of the running transaction.
///
/// Cloning it is how the chain takes a rollback snapshot.
#[derive(Debug, Clone, Default)]
pub struct WorldState {
    ether: BTreeMap<Address, U256>,
    contracts: BTreeMap<Address, Contract>,
    logs: Vec<Log>,
}

impl WorldState {
    pub fn ether_balance(&self, account: &Address) -> U256 {
        self.ether.get(account).copied().unwrap_or_default()
    }

    pub fn mint_ether(&mut self, account: Address, amount: U256) -> Result<(), LedgerError> {
        let updated = safe_add(self.ether_balance(&account), amount)?;
        self.ether.insert(account, updated);
        Ok(())
    }

    pub fn transfer_ether(&mut self, from: Address, to: Address, amount: U256) -> Result<(), LedgerError> {
        if amount.is_zero() {
            return Ok(());
        }
        let available = self.ether_balance(&from);
        if available < amount {
            return Err(LedgerError::InsufficientBalance {
                asset: Asset::ETHER,
                account: from,
                needed: amount,
                available,
            });
        }
        self.ether.insert(from, safe_sub(available, amount)?);
        let credited = safe_add(self.ether_balance(&to), amount)?;
        self.ether.insert(to, credited);
        Ok(())
    }

    pub fn contract(&self, address: &Address) -> Option<&Contract> {
        self.contracts.get(address)
    }

    pub fn insert_contract(&mut self, address: Address, contract: Contract) {
        self.contracts.insert(address, contract);
    }

    pub fn ledger(&self, address: &Address) -> Result<&TokenStore, LedgerError> {
        match self.contracts.get(address) {
            Some(Contract::Ledger(ledger)) => Ok(ledger),
            _ => Err(LedgerError::UnknownContract(*address)),
        }
    }

    pub fn ledger_mut(&mut self, address: &Address) -> Result<&mut TokenStore, LedgerError> {
        match self.contracts.get_mut(address) {
            Some(Contract::Ledger(ledger)) => Ok(ledger),
            _ => Err(LedgerError::UnknownContract(*address)),
        }
    }

    pub fn token(&self, address: &Address) -> Result<&dyn Erc20, LedgerError> {
        match self.contracts.get(address) {
            Some(Contract::Token(token)) => Ok(token.as_ref()),
            _ => Err(LedgerError::UnknownContract(*address)),
        }
    }

    fn token_mut(&mut self, address: &Address) -> Result<&mut dyn Erc20, LedgerError> {
        match self.contracts.get_mut(address) {
            Some(Contract::Token(token)) => Ok(token.as_mut()),
            _ => Err(LedgerError::UnknownContract(*address)),
        }
    }

    pub fn modifiers(&self, address: &Address) -> Result<&dyn ModifiersProvider, LedgerError> {
        match self.contracts.get(address) {
            Some(Contract::Modifiers(provider)) => Ok(provider.as_ref()),
            _ => Err(LedgerError::UnknownContract(*address)),
        }
    }

    pub fn modifiers_mut(
        &mut self,
        address: &Address,
    ) -> Result<&mut dyn ModifiersProvider, LedgerError> {
        match self.contracts.get_mut(address) {
            Some(Contract::Modifiers(provider)) => Ok(provider.as_mut()),
            _ => Err(LedgerError::UnknownContract(*address)),
        }
    }

    /// `token.transfer` on behalf of `sender`.
    pub fn token_transfer(
        &mut self,
        token: Address,
        sender: Address,
        to: Address,
        amount: U256,
    ) -> Result<(), LedgerError> {
        let accepted = self
            .token_mut(&token)?
            .transfer(sender, to, amount)
            .map_err(|e| attribute_to_token(e, token))?;
        if !accepted {
            return Err(LedgerError::TokenTransferFailed { token });
        }
        self.emit(token, Event::Transfer { from: sender, to, amount });
        Ok(())
    }

    /// `token.transferFrom` called by `spender`.
    pub fn token_transfer_from(
        &mut self,
        token: Address,
        spender: Address,
        from: Address,
        to: Address,
        amount: U256,
    ) -> Result<(), LedgerError> {
        let accepted = self
            .token_mut(&token)?
            .transfer_from(spender, from, to, amount)
            .map_err(|e| attribute_to_token(e, token))?;
        if !accepted {
            return Err(LedgerError::TokenTransferFailed { token });
        }
        self.emit(token, Event::Transfer { from, to, amount });
        Ok(())
    }

    pub fn token_approve(
        &mut self,
        token: Address,
        owner: Address,
        spender: Address,
        amount: U256,
    ) -> Result<(), LedgerError> {
        let accepted = self
            .token_mut(&token)?
            .approve(owner, spender, amount)
            .map_err(|e| attribute_to_token(e, token))?;
        if !accepted {
            return Err(LedgerError::TokenTransferFailed { token });
        }
        self.emit(
            token,
            Event::Approval {
                owner,
                spender,
                amount,
            },
        );
        Ok(())
    }

    pub fn emit(&mut self, address: Address, event: Event) {
        self.logs.push(Log { address, event });
    }

    pub fn take_logs(&mut self) -> Vec<Log> {
        std::mem::take(&mut self.logs)
    }
}

fn attribute_to_token(err: LedgerError, token: Address) -> LedgerError {
    match err {
        LedgerError::InsufficientBalance {
            account,
            needed,
            available,
            ..
        } => LedgerError::InsufficientBalance {
            asset: Asset::token(token),
            account,
            needed,
            available,
        },
        other => other,
    }
}
