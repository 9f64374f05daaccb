//! Owner-managed table of per-account fee modifiers.

use super::{Modifiers, ModifiersProvider};
use crate::domain::Address;
use crate::error::LedgerError;
use std::collections::BTreeMap;

#[derive(Debug, Clone)]
pub struct AccountModifiers {
    owner: Address,
    entries: BTreeMap<Address, Modifiers>,
}

impl AccountModifiers {
    pub fn new(owner: Address) -> Self {
        Self {
            owner,
            entries: BTreeMap::new(),
        }
    }
}

impl ModifiersProvider for AccountModifiers {
    fn modifiers_of(&self, account: &Address) -> Modifiers {
        self.entries.get(account).copied().unwrap_or_default()
    }

    fn set_modifiers(
        &mut self,
        caller: Address,
        account: Address,
        modifiers: Modifiers,
    ) -> Result<(), LedgerError> {
        if caller != self.owner {
            return Err(LedgerError::Unauthorized { caller });
        }
        if modifiers.taker_discount > 100 || modifiers.maker_rebate > 100 {
            return Err(LedgerError::InvalidArgument("modifier percentage above 100"));
        }
        self.entries.insert(account, modifiers);
        Ok(())
    }

    fn clone_box(&self) -> Box<dyn ModifiersProvider> {
        Box::new(self.clone())
    }
}
