mod common;

use common::{addr, u, Market};
use primitive_types::U256;
use tokenstore::domain::Event;
use tokenstore::{Address, Asset, Call, Erc20, FailureKind, LedgerError, Transaction};

#[test]
fn test_ether_deposit_and_withdraw() {
    let mut m = Market::new();
    let start = m.chain.ether_balance(&m.taker);

    let receipt = m.deposit_ether(m.taker, u(1_000)).unwrap();
    let expected = Event::Deposit {
        asset: Asset::ETHER,
        user: m.taker,
        amount: u(1_000),
        balance: u(1_000),
    };
    assert_eq!(receipt.logs.len(), 1);
    assert_eq!(receipt.logs[0].event, expected);
    assert_eq!(receipt.logs[0].address, m.ledger);
    assert_eq!(m.ether(m.taker), u(1_000));
    assert_eq!(m.chain.ether_balance(&m.taker), start - u(1_000));

    m.chain
        .send(Transaction::new(
            m.taker,
            m.ledger,
            Call::Withdraw { amount: u(400) },
        ))
        .unwrap();
    assert_eq!(m.ether(m.taker), u(600));
    assert_eq!(m.chain.ether_balance(&m.taker), start - u(600));
    m.assert_conserved(m.ledger);
}

#[test]
fn test_withdraw_more_than_balance_reverts() {
    let mut m = Market::new();
    m.deposit_ether(m.taker, u(1_000)).unwrap();

    let receipt = m.chain.execute(Transaction::new(
        m.taker,
        m.ledger,
        Call::Withdraw { amount: u(1_001) },
    ));
    assert_eq!(receipt.failure_kind, Some(FailureKind::Revert));
    assert!(matches!(
        receipt.error,
        Some(LedgerError::InsufficientBalance { .. })
    ));
    assert_eq!(m.ether(m.taker), u(1_000));
    assert_eq!(m.chain.ether_balance(&m.ledger), u(1_000));
}

#[test]
fn test_token_deposit_and_withdraw() {
    let mut m = Market::new();
    let start = m.chain.token_balance(&m.token, &m.taker).unwrap();

    m.deposit_token(m.taker, u(5_000)).unwrap();
    assert_eq!(m.tokens(m.taker), u(5_000));
    assert_eq!(m.chain.token_balance(&m.token, &m.ledger).unwrap(), u(5_000));
    assert_eq!(
        m.chain
            .token_allowance(&m.token, &m.taker, &m.ledger)
            .unwrap(),
        u(0)
    );

    m.chain
        .send(Transaction::new(
            m.taker,
            m.ledger,
            Call::WithdrawToken {
                token: m.token,
                amount: u(5_000),
            },
        ))
        .unwrap();
    assert_eq!(m.tokens(m.taker), u(0));
    assert_eq!(m.chain.token_balance(&m.token, &m.taker).unwrap(), start);
}

#[test]
fn test_token_deposit_without_allowance_reverts() {
    let mut m = Market::new();
    let err = m
        .chain
        .send(Transaction::new(
            m.taker,
            m.ledger,
            Call::DepositToken {
                token: m.token,
                amount: u(1),
            },
        ))
        .unwrap_err();
    assert!(matches!(err, LedgerError::InsufficientAllowance { .. }));
    assert_eq!(m.tokens(m.taker), u(0));
}

#[test]
fn test_token_deposit_beyond_holdings_names_the_token() {
    let mut m = Market::new();
    let err = m.deposit_token(m.taker, u(10_000_001)).unwrap_err();
    match err {
        LedgerError::InsufficientBalance { asset, account, .. } => {
            assert_eq!(asset, m.token_asset());
            assert_eq!(account, m.taker);
        }
        other => panic!("unexpected error {:?}", other),
    }
}

#[test]
fn test_ether_is_not_a_token() {
    let mut m = Market::new();
    for call in [
        Call::DepositToken {
            token: Address::zero(),
            amount: u(1),
        },
        Call::WithdrawToken {
            token: Address::zero(),
            amount: u(1),
        },
    ] {
        let err = m
            .chain
            .send(Transaction::new(m.taker, m.ledger, call))
            .unwrap_err();
        assert!(matches!(err, LedgerError::InvalidArgument(_)));
    }
}

/// A token whose transfers report failure instead of erroring.
#[derive(Debug, Clone)]
struct RefusingToken;

impl Erc20 for RefusingToken {
    fn name(&self) -> &str {
        "Refusing"
    }

    fn symbol(&self) -> &str {
        "NOPE"
    }

    fn decimals(&self) -> u8 {
        0
    }

    fn total_supply(&self) -> U256 {
        U256::zero()
    }

    fn balance_of(&self, _owner: &Address) -> U256 {
        U256::MAX
    }

    fn allowance(&self, _owner: &Address, _spender: &Address) -> U256 {
        U256::MAX
    }

    fn transfer(&mut self, _: Address, _: Address, _: U256) -> Result<bool, LedgerError> {
        Ok(false)
    }

    fn transfer_from(
        &mut self,
        _: Address,
        _: Address,
        _: Address,
        _: U256,
    ) -> Result<bool, LedgerError> {
        Ok(false)
    }

    fn approve(&mut self, _: Address, _: Address, _: U256) -> Result<bool, LedgerError> {
        Ok(true)
    }

    fn clone_box(&self) -> Box<dyn Erc20> {
        Box::new(self.clone())
    }
}

#[test]
fn test_token_reporting_failure_rolls_back_deposit() {
    let mut m = Market::new();
    let refusing = m
        .chain
        .deploy_token_contract(m.owner, Box::new(RefusingToken));

    let receipt = m.chain.execute(Transaction::new(
        m.taker,
        m.ledger,
        Call::DepositToken {
            token: refusing,
            amount: u(10),
        },
    ));
    assert!(!receipt.success);
    assert_eq!(
        receipt.error,
        Some(LedgerError::TokenTransferFailed { token: refusing })
    );
    assert_eq!(
        m.balance(Asset::token(refusing), m.taker),
        u(0)
    );
}

#[test]
fn test_deprecated_ledger_refuses_deposits_but_allows_withdrawals() {
    let mut m = Market::funded();
    let successor = m
        .chain
        .deploy_ledger(m.owner, u(common::FEE), Some(m.ledger))
        .unwrap();
    m.chain
        .send(Transaction::new(
            m.owner,
            m.ledger,
            Call::Deprecate {
                deprecated: true,
                successor,
            },
        ))
        .unwrap();

    assert_eq!(
        m.deposit_ether(m.taker, u(1)).unwrap_err(),
        LedgerError::AlreadyDeprecated
    );
    let order = m.ether_for_tokens(20_000, 100_000, 1);
    assert_eq!(
        m.trade(m.taker, &order, 10).unwrap_err(),
        LedgerError::AlreadyDeprecated
    );

    m.chain
        .send(Transaction::new(
            m.taker,
            m.ledger,
            Call::Withdraw {
                amount: u(100_000),
            },
        ))
        .unwrap();
    m.chain
        .send(Transaction::new(
            m.taker,
            m.ledger,
            Call::WithdrawToken {
                token: m.token,
                amount: u(1_000_000),
            },
        ))
        .unwrap();
    assert_eq!(m.ether(m.taker), u(0));
    assert_eq!(m.tokens(m.taker), u(0));
    m.assert_conserved(m.ledger);
}

#[test]
fn test_owner_admin_operations() {
    let mut m = Market::new();
    let new_owner = addr(0xd0);

    let err = m
        .chain
        .send(Transaction::new(
            m.taker,
            m.ledger,
            Call::TransferOwnership { owner: m.taker },
        ))
        .unwrap_err();
    assert_eq!(err, LedgerError::Unauthorized { caller: m.taker });

    m.chain
        .send(Transaction::new(
            m.owner,
            m.ledger,
            Call::TransferOwnership { owner: new_owner },
        ))
        .unwrap();
    let info = m.chain.ledger_info(&m.ledger).unwrap();
    assert_eq!(info.owner, new_owner);
    assert_eq!(info.fee_account, m.owner);

    let err = m
        .chain
        .send(Transaction::new(
            m.owner,
            m.ledger,
            Call::ChangeFeeAccount {
                fee_account: m.owner,
            },
        ))
        .unwrap_err();
    assert_eq!(err, LedgerError::Unauthorized { caller: m.owner });
}
