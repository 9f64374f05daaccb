//! Ledger entrypoints that need more than the ledger's own storage:
//! ether and token movements, modifiers lookups and calls into other ledgers.

use super::world::WorldState;
use crate::domain::{Address, Asset, BlockNumber, Event, SignedOrder};
use crate::error::LedgerError;
use primitive_types::U256;
use std::collections::BTreeSet;
use tracing::debug;

/// Upper bound on successor and predecessor walks.
pub const MAX_SUCCESSION_HOPS: usize = 20;

/// One call frame against the ledger deployed at `this`.
pub struct LedgerCall<'w> {
    world: &'w mut WorldState,
    this: Address,
    caller: Address,
    value: U256,
    block: BlockNumber,
}

impl<'w> LedgerCall<'w> {
    /// Frame for a call whose `value` has already been moved to `this`.
    pub fn new(
        world: &'w mut WorldState,
        this: Address,
        caller: Address,
        value: U256,
        block: BlockNumber,
    ) -> Result<Self, LedgerError> {
        world.ledger(&this)?;
        Ok(Self {
            world,
            this,
            caller,
            value,
            block,
        })
    }

    pub fn deposit(self) -> Result<(), LedgerError> {
        self.world.ledger(&self.this)?.ensure_active()?;
        let balance = self
            .world
            .ledger_mut(&self.this)?
            .balances
            .credit(Asset::ETHER, self.caller, self.value)?;
        self.world.emit(
            self.this,
            Event::Deposit {
                asset: Asset::ETHER,
                user: self.caller,
                amount: self.value,
                balance,
            },
        );
        Ok(())
    }

    pub fn deposit_token(self, token: Address, amount: U256) -> Result<(), LedgerError> {
        if token.is_zero() {
            return Err(LedgerError::InvalidArgument("ether is deposited with deposit"));
        }
        self.world.ledger(&self.this)?.ensure_active()?;
        self.world
            .token_transfer_from(token, self.this, self.caller, self.this, amount)?;
        let asset = Asset::token(token);
        let balance = self
            .world
            .ledger_mut(&self.this)?
            .balances
            .credit(asset, self.caller, amount)?;
        self.world.emit(
            self.this,
            Event::Deposit {
                asset,
                user: self.caller,
                amount,
                balance,
            },
        );
        Ok(())
    }

    pub fn withdraw(self, amount: U256) -> Result<(), LedgerError> {
        let balance = self
            .world
            .ledger_mut(&self.this)?
            .balances
            .debit(Asset::ETHER, self.caller, amount)?;
        self.world.transfer_ether(self.this, self.caller, amount)?;
        self.world.emit(
            self.this,
            Event::Withdraw {
                asset: Asset::ETHER,
                user: self.caller,
                amount,
                balance,
            },
        );
        Ok(())
    }

    pub fn withdraw_token(self, token: Address, amount: U256) -> Result<(), LedgerError> {
        if token.is_zero() {
            return Err(LedgerError::InvalidArgument("ether is withdrawn with withdraw"));
        }
        let asset = Asset::token(token);
        let balance = self
            .world
            .ledger_mut(&self.this)?
            .balances
            .debit(asset, self.caller, amount)?;
        self.world
            .token_transfer(token, self.this, self.caller, amount)?;
        self.world.emit(
            self.this,
            Event::Withdraw {
                asset,
                user: self.caller,
                amount,
                balance,
            },
        );
        Ok(())
    }

    pub fn trade(self, signed: &SignedOrder, amount: U256) -> Result<(), LedgerError> {
        let ledger = self.world.ledger(&self.this)?;
        let modifiers = match ledger.account_modifiers {
            Some(provider) => Some(
                self.world
                    .modifiers(&provider)?
                    .trade_modifiers(&signed.order.maker, &self.caller),
            ),
            None => None,
        };
        let settlement =
            ledger.plan_trade(self.this, signed, amount, self.caller, self.block, modifiers)?;
        let give_amount = settlement.give_amount;
        let fee = settlement.fee;
        let order_hash = self.world.ledger_mut(&self.this)?.apply(settlement);

        debug!(
            ledger = ?self.this,
            order = ?order_hash,
            taker = ?self.caller,
            %amount,
            %give_amount,
            fee = %fee.gross_fee,
            "trade settled"
        );
        let order = &signed.order;
        self.world.emit(
            self.this,
            Event::Trade {
                order_hash,
                token_get: order.token_get,
                amount_get: amount,
                token_give: order.token_give,
                amount_give: give_amount,
                maker: order.maker,
                taker: self.caller,
                gross_fee: fee.gross_fee,
                maker_rebate: fee.maker_rebate,
            },
        );
        Ok(())
    }

    pub fn deprecate(self, deprecated: bool, successor: Address) -> Result<(), LedgerError> {
        self.world.ledger(&self.this)?.ensure_owner(self.caller)?;
        if deprecated {
            if successor == self.this {
                return Err(LedgerError::InvalidArgument("a ledger cannot succeed itself"));
            }
            self.world.ledger(&successor)?;
        }
        let changed = self
            .world
            .ledger_mut(&self.this)?
            .deprecate(self.caller, deprecated, successor)?;
        if changed {
            self.world.emit(self.this, Event::Deprecated { successor });
        }
        Ok(())
    }

    /// Move the caller's ether and the listed token balances into the newest
    /// ledger of the successor chain.
    pub fn migrate_funds(self, tokens: &[Address]) -> Result<(), LedgerError> {
        self.world.ledger(&self.this)?.ensure_deprecated()?;
        let target = newest_successor(self.world, self.this)?;
        let user = self.caller;
        let mut moved = false;

        let ether = self
            .world
            .ledger_mut(&self.this)?
            .balances
            .take(Asset::ETHER, user);
        if !ether.is_zero() {
            self.world.transfer_ether(self.this, target, ether)?;
            LedgerCall::new(&mut *self.world, target, self.this, ether, self.block)?
                .deposit_for_user(user)?;
            moved = true;
        }

        for &token in tokens {
            if token.is_zero() {
                return Err(LedgerError::InvalidArgument("token list must not contain ether"));
            }
            let amount = self
                .world
                .ledger_mut(&self.this)?
                .balances
                .take(Asset::token(token), user);
            if amount.is_zero() {
                continue;
            }
            self.world.token_approve(token, self.this, target, amount)?;
            LedgerCall::new(&mut *self.world, target, self.this, U256::zero(), self.block)?
                .deposit_token_for_user(token, amount, user)?;
            moved = true;
        }

        if moved {
            self.world.ledger_mut(&self.this)?.migrated_out = true;
        }
        debug!(from = ?self.this, to = ?target, ?user, moved, "funds migrated");
        self.world
            .emit(self.this, Event::FundsMigrated { user, target });
        Ok(())
    }

    pub fn deposit_for_user(self, user: Address) -> Result<(), LedgerError> {
        self.ensure_deprecated_predecessor()?;
        self.world.ledger(&self.this)?.ensure_active()?;
        if user.is_zero() || self.value.is_zero() {
            return Err(LedgerError::InvalidArgument("user and value must be non-zero"));
        }
        let balance = self
            .world
            .ledger_mut(&self.this)?
            .balances
            .credit(Asset::ETHER, user, self.value)?;
        self.world.emit(
            self.this,
            Event::Deposit {
                asset: Asset::ETHER,
                user,
                amount: self.value,
                balance,
            },
        );
        Ok(())
    }

    pub fn deposit_token_for_user(
        self,
        token: Address,
        amount: U256,
        user: Address,
    ) -> Result<(), LedgerError> {
        self.ensure_deprecated_predecessor()?;
        self.world.ledger(&self.this)?.ensure_active()?;
        if token.is_zero() || user.is_zero() || amount.is_zero() {
            return Err(LedgerError::InvalidArgument(
                "token, user and amount must be non-zero",
            ));
        }
        self.world
            .token_transfer_from(token, self.this, self.caller, self.this, amount)?;
        let asset = Asset::token(token);
        let balance = self
            .world
            .ledger_mut(&self.this)?
            .balances
            .credit(asset, user, amount)?;
        self.world.emit(
            self.this,
            Event::Deposit {
                asset,
                user,
                amount,
                balance,
            },
        );
        Ok(())
    }

    pub fn change_account_modifiers(self, provider: Address) -> Result<(), LedgerError> {
        self.world.ledger(&self.this)?.ensure_owner(self.caller)?;
        let provider = if provider.is_zero() {
            None
        } else {
            self.world.modifiers(&provider)?;
            Some(provider)
        };
        self.world.ledger_mut(&self.this)?.account_modifiers = provider;
        self.world.emit(
            self.this,
            Event::ModifiersChanged {
                provider: provider.unwrap_or_default(),
            },
        );
        Ok(())
    }

    pub fn change_fee_account(self, fee_account: Address) -> Result<(), LedgerError> {
        self.world.ledger(&self.this)?.ensure_owner(self.caller)?;
        if fee_account.is_zero() {
            return Err(LedgerError::InvalidArgument("fee account must be non-zero"));
        }
        self.world.ledger_mut(&self.this)?.fee_account = fee_account;
        self.world
            .emit(self.this, Event::FeeAccountChanged { fee_account });
        Ok(())
    }

    pub fn transfer_ownership(self, owner: Address) -> Result<(), LedgerError> {
        self.world.ledger(&self.this)?.ensure_owner(self.caller)?;
        if owner.is_zero() {
            return Err(LedgerError::InvalidArgument("owner must be non-zero"));
        }
        self.world.ledger_mut(&self.this)?.owner = owner;
        self.world.emit(
            self.this,
            Event::OwnershipTransferred {
                previous: self.caller,
                owner,
            },
        );
        Ok(())
    }

    /// The caller must be a deprecated ledger somewhere up this ledger's
    /// predecessor chain.
    fn ensure_deprecated_predecessor(&self) -> Result<(), LedgerError> {
        let unauthorized = LedgerError::Unauthorized {
            caller: self.caller,
        };
        let mut cursor = self.world.ledger(&self.this)?.predecessor;
        for _ in 0..MAX_SUCCESSION_HOPS {
            let Some(predecessor) = cursor else { break };
            let Ok(ledger) = self.world.ledger(&predecessor) else {
                break;
            };
            if predecessor == self.caller {
                return if ledger.deprecated {
                    Ok(())
                } else {
                    Err(unauthorized)
                };
            }
            cursor = ledger.predecessor;
        }
        Err(unauthorized)
    }
}

/// Follow `successor` links from `this` to the last ledger of the chain.
///
/// Visiting any ledger twice is `CircularSuccession`; needing more than
/// `MAX_SUCCESSION_HOPS` links is `SuccessionTooLong`.
pub fn newest_successor(world: &WorldState, this: Address) -> Result<Address, LedgerError> {
    let mut next = world
        .ledger(&this)?
        .successor
        .ok_or(LedgerError::NotDeprecated)?;
    let mut visited = BTreeSet::from([this]);
    loop {
        if !visited.insert(next) {
            return Err(LedgerError::CircularSuccession(next));
        }
        if visited.len() - 1 > MAX_SUCCESSION_HOPS {
            return Err(LedgerError::SuccessionTooLong {
                max_hops: MAX_SUCCESSION_HOPS,
            });
        }
        match world.ledger(&next)?.successor {
            Some(successor) => next = successor,
            None => return Ok(next),
        }
    }
}
