//! Deterministic single-threaded execution environment for the contracts.
//!
//! The chain owns the world state, executes one transaction at a time and
//! mines one block per transaction. A failing transaction restores the
//! snapshot taken before it ran, so cross-contract calls are all-or-nothing.

pub mod entrypoints;
pub mod receipt;
pub mod transaction;
pub mod world;

pub use entrypoints::{newest_successor, LedgerCall, MAX_SUCCESSION_HOPS};
pub use receipt::Receipt;
pub use transaction::{Call, Deployment, Transaction};
pub use world::{Contract, WorldState};

use crate::contracts::{AccountModifiers, Eip20Token, Erc20, Modifiers};
use crate::domain::math::one_ether;
use crate::domain::primitives::u256_dec;
use crate::domain::signature::keccak256;
use crate::domain::{Address, Asset, BlockNumber, Event, SignedOrder};
use crate::engine::TokenStore;
use crate::error::LedgerError;
use primitive_types::U256;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// Read-only view of one ledger's configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerInfo {
    pub address: Address,
    pub owner: Address,
    pub fee_account: Address,
    #[serde(with = "u256_dec")]
    pub fee: U256,
    pub account_modifiers: Option<Address>,
    pub deprecated: bool,
    pub successor: Option<Address>,
    pub predecessor: Option<Address>,
    pub version: u64,
    pub migrated_out: bool,
}

#[derive(Debug, Clone, Default)]
pub struct Chain {
    world: WorldState,
    block_number: BlockNumber,
    nonces: BTreeMap<Address, u64>,
}

impl Chain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn block_number(&self) -> BlockNumber {
        self.block_number
    }

    pub fn nonce(&self, account: &Address) -> u64 {
        self.nonces.get(account).copied().unwrap_or_default()
    }

    /// Mint native currency outside of any transaction (genesis allocation).
    pub fn fund(&mut self, account: Address, amount: U256) -> Result<(), LedgerError> {
        self.world.mint_ether(account, amount)
    }

    /// Advance the block height without transactions.
    pub fn mine(&mut self, blocks: u64) {
        self.block_number += blocks;
    }

    pub fn deploy(&mut self, deployment: Deployment) -> Result<Address, LedgerError> {
        match deployment {
            Deployment::Ledger {
                from,
                fee,
                predecessor,
            } => self.deploy_ledger(from, fee, predecessor),
            Deployment::Token {
                from,
                supply,
                name,
                decimals,
                symbol,
            } => Ok(self.deploy_token(from, supply, &name, decimals, &symbol)),
            Deployment::AccountModifiers { from } => Ok(self.deploy_modifiers(from)),
        }
    }

    /// Deploy a ledger owned by `from`. `predecessor` links it into a
    /// migration chain and determines its version.
    pub fn deploy_ledger(
        &mut self,
        from: Address,
        fee: U256,
        predecessor: Option<Address>,
    ) -> Result<Address, LedgerError> {
        if fee > one_ether() {
            return Err(LedgerError::InvalidArgument("fee rate above 100%"));
        }
        let predecessor = predecessor.filter(|p| !p.is_zero());
        let version = match predecessor {
            Some(p) => self.world.ledger(&p)?.version + 1,
            None => 1,
        };
        let address = self.next_contract_address(from);
        self.world.insert_contract(
            address,
            Contract::Ledger(TokenStore::new(from, fee, predecessor, version)),
        );
        info!(?address, owner = ?from, %fee, version, "ledger deployed");
        Ok(address)
    }

    pub fn deploy_token(
        &mut self,
        from: Address,
        supply: U256,
        name: &str,
        decimals: u8,
        symbol: &str,
    ) -> Address {
        self.deploy_token_contract(
            from,
            Box::new(Eip20Token::new(from, supply, name, decimals, symbol)),
        )
    }

    /// Register any `Erc20` implementation as a token contract.
    pub fn deploy_token_contract(&mut self, from: Address, token: Box<dyn Erc20>) -> Address {
        let address = self.next_contract_address(from);
        info!(?address, symbol = token.symbol(), "token deployed");
        self.world.insert_contract(address, Contract::Token(token));
        address
    }

    pub fn deploy_modifiers(&mut self, from: Address) -> Address {
        let address = self.next_contract_address(from);
        self.world.insert_contract(
            address,
            Contract::Modifiers(Box::new(AccountModifiers::new(from))),
        );
        info!(?address, owner = ?from, "account modifiers deployed");
        address
    }

    /// Run one transaction in the next block.
    ///
    /// Any error restores the world to its state before the transaction.
    pub fn execute(&mut self, tx: Transaction) -> Receipt {
        let block = self.block_number + 1;
        let nonce = self.bump_nonce(tx.from);
        let tx_hash = tx.hash(nonce);
        let method = tx.call.method();

        let snapshot = self.world.clone();
        let result = dispatch(&mut self.world, &tx, block);
        let logs = self.world.take_logs();
        self.block_number = block;

        match result {
            Ok(()) => {
                debug!(?tx_hash, block, method, from = ?tx.from, to = ?tx.to, "transaction succeeded");
                Receipt::succeeded(tx_hash, block, tx.from, tx.to, method, logs)
            }
            Err(err) => {
                self.world = snapshot;
                warn!(
                    ?tx_hash,
                    block,
                    method,
                    kind = err.kind().as_str(),
                    error = %err,
                    "transaction failed"
                );
                Receipt::failed(tx_hash, block, tx.from, tx.to, method, err)
            }
        }
    }

    /// `execute` with the failure surfaced as an error.
    pub fn send(&mut self, tx: Transaction) -> Result<Receipt, LedgerError> {
        self.execute(tx).into_result()
    }

    pub fn ether_balance(&self, account: &Address) -> U256 {
        self.world.ether_balance(account)
    }

    pub fn token_balance(&self, token: &Address, account: &Address) -> Result<U256, LedgerError> {
        Ok(self.world.token(token)?.balance_of(account))
    }

    pub fn token_allowance(
        &self,
        token: &Address,
        owner: &Address,
        spender: &Address,
    ) -> Result<U256, LedgerError> {
        Ok(self.world.token(token)?.allowance(owner, spender))
    }

    pub fn modifiers_of(&self, provider: &Address, account: &Address) -> Result<Modifiers, LedgerError> {
        Ok(self.world.modifiers(provider)?.modifiers_of(account))
    }

    pub fn ledger(&self, ledger: &Address) -> Result<&TokenStore, LedgerError> {
        self.world.ledger(ledger)
    }

    pub fn ledger_info(&self, address: &Address) -> Result<LedgerInfo, LedgerError> {
        let ledger = self.world.ledger(address)?;
        Ok(LedgerInfo {
            address: *address,
            owner: ledger.owner,
            fee_account: ledger.fee_account,
            fee: ledger.fee,
            account_modifiers: ledger.account_modifiers,
            deprecated: ledger.deprecated,
            successor: ledger.successor,
            predecessor: ledger.predecessor,
            version: ledger.version,
            migrated_out: ledger.migrated_out,
        })
    }

    pub fn balance_of(
        &self,
        ledger: &Address,
        asset: Asset,
        account: &Address,
    ) -> Result<U256, LedgerError> {
        Ok(self.world.ledger(ledger)?.balances.balance_of(asset, account))
    }

    /// Sum of all account balances of `asset` held in the ledger.
    pub fn ledger_total(&self, ledger: &Address, asset: Asset) -> Result<U256, LedgerError> {
        self.world.ledger(ledger)?.balances.total_of(asset)
    }

    pub fn fee(&self, ledger: &Address) -> Result<U256, LedgerError> {
        Ok(self.world.ledger(ledger)?.fee)
    }

    pub fn amount_filled(&self, ledger: &Address, order: &SignedOrder) -> Result<U256, LedgerError> {
        Ok(self.world.ledger(ledger)?.amount_filled(*ledger, order))
    }

    /// Fillable volume as seen by a transaction in the next block.
    pub fn available_volume(&self, ledger: &Address, order: &SignedOrder) -> Result<U256, LedgerError> {
        self.world
            .ledger(ledger)?
            .available_volume(*ledger, order, self.block_number + 1)
    }

    /// Whether `trade(order, amount)` sent by `taker` would succeed in the next block.
    pub fn test_trade(
        &self,
        ledger: &Address,
        order: &SignedOrder,
        amount: U256,
        taker: &Address,
    ) -> bool {
        let mut world = self.world.clone();
        let block = self.block_number + 1;
        LedgerCall::new(&mut world, *ledger, *taker, U256::zero(), block)
            .and_then(|call| call.trade(order, amount))
            .is_ok()
    }

    fn bump_nonce(&mut self, account: Address) -> u64 {
        let nonce = self.nonces.entry(account).or_insert(0);
        let current = *nonce;
        *nonce += 1;
        current
    }

    fn next_contract_address(&mut self, deployer: Address) -> Address {
        let nonce = self.bump_nonce(deployer);
        let mut preimage = Vec::with_capacity(28);
        preimage.extend_from_slice(deployer.as_bytes());
        preimage.extend_from_slice(&nonce.to_be_bytes());
        let hash = keccak256(&preimage);
        Address::from_slice(&hash[12..])
    }
}

fn dispatch(world: &mut WorldState, tx: &Transaction, block: BlockNumber) -> Result<(), LedgerError> {
    if !tx.value.is_zero() {
        if !tx.call.is_payable() {
            return Err(LedgerError::InvalidArgument("method does not accept ether"));
        }
        world.transfer_ether(tx.from, tx.to, tx.value)?;
    }

    let (from, to) = (tx.from, tx.to);

    match &tx.call {
        Call::Deposit => ledger(world, tx, block)?.deposit(),
        Call::DepositToken { token, amount } => ledger(world, tx, block)?.deposit_token(*token, *amount),
        Call::Withdraw { amount } => ledger(world, tx, block)?.withdraw(*amount),
        Call::WithdrawToken { token, amount } => ledger(world, tx, block)?.withdraw_token(*token, *amount),
        Call::Trade { order, amount } => ledger(world, tx, block)?.trade(order, *amount),
        Call::Deprecate {
            deprecated,
            successor,
        } => ledger(world, tx, block)?.deprecate(*deprecated, *successor),
        Call::MigrateFunds { tokens } => ledger(world, tx, block)?.migrate_funds(tokens),
        Call::DepositForUser { user } => ledger(world, tx, block)?.deposit_for_user(*user),
        Call::DepositTokenForUser {
            token,
            amount,
            user,
        } => ledger(world, tx, block)?.deposit_token_for_user(*token, *amount, *user),
        Call::ChangeAccountModifiers { provider } => {
            ledger(world, tx, block)?.change_account_modifiers(*provider)
        }
        Call::ChangeFeeAccount { fee_account } => ledger(world, tx, block)?.change_fee_account(*fee_account),
        Call::TransferOwnership { owner } => ledger(world, tx, block)?.transfer_ownership(*owner),
        Call::Approve { spender, amount } => world.token_approve(to, from, *spender, *amount),
        Call::Transfer { to: recipient, amount } => {
            world.token_transfer(to, from, *recipient, *amount)
        }
        Call::TransferFrom {
            from: owner,
            to: recipient,
            amount,
        } => world.token_transfer_from(to, from, *owner, *recipient, *amount),
        Call::SetModifiers {
            account,
            taker_discount,
            maker_rebate,
        } => {
            world.modifiers_mut(&to)?.set_modifiers(
                from,
                *account,
                Modifiers {
                    taker_discount: *taker_discount,
                    maker_rebate: *maker_rebate,
                },
            )?;
            world.emit(
                to,
                Event::ModifiersSet {
                    account: *account,
                    taker_discount: *taker_discount,
                    maker_rebate: *maker_rebate,
                },
            );
            Ok(())
        }
    }
}

fn ledger<'w>(
    world: &'w mut WorldState,
    tx: &Transaction,
    block: BlockNumber,
) -> Result<LedgerCall<'w>, LedgerError> {
    LedgerCall::new(world, tx.to, tx.from, tx.value, block)
}
