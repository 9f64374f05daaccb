use super::balances::{BalanceBook, BalanceChanges};
use super::fees::{nominal_fee, split_fee, FeeSplit};
use super::fills::FillTracker;
use crate::contracts::TradeModifiers;
use crate::domain::math::{mul_div, safe_add};
use crate::domain::{Address, BlockNumber, SignedOrder};
use crate::error::LedgerError;
use primitive_types::{H256, U256};

/// Storage of one exchange ledger instance.
#[derive(Debug, Clone)]
pub struct TokenStore {
    pub owner: Address,
    pub fee_account: Address,
    /// Fee rate per 10^18 units of the filled amount. Fixed at construction.
    pub fee: U256,
    pub account_modifiers: Option<Address>,
    pub deprecated: bool,
    pub successor: Option<Address>,
    pub predecessor: Option<Address>,
    pub version: u64,
    /// Set once a migration has moved funds out; freezes `successor`.
    pub migrated_out: bool,
    pub balances: BalanceBook,
    pub fills: FillTracker,
}

/// Everything a validated fill will change, computed before any write.
#[derive(Debug)]
pub struct Settlement {
    pub order_hash: H256,
    pub maker: Address,
    pub filled_after: U256,
    pub give_amount: U256,
    pub fee: FeeSplit,
    changes: BalanceChanges,
}

impl TokenStore {
    pub fn new(owner: Address, fee: U256, predecessor: Option<Address>, version: u64) -> Self {
        Self {
            owner,
            fee_account: owner,
            fee,
            account_modifiers: None,
            deprecated: false,
            successor: None,
            predecessor,
            version,
            migrated_out: false,
            balances: BalanceBook::new(),
            fills: FillTracker::new(),
        }
    }

    pub fn ensure_owner(&self, caller: Address) -> Result<(), LedgerError> {
        if caller != self.owner {
            return Err(LedgerError::Unauthorized { caller });
        }
        Ok(())
    }

    pub fn ensure_active(&self) -> Result<(), LedgerError> {
        if self.deprecated {
            return Err(LedgerError::AlreadyDeprecated);
        }
        Ok(())
    }

    pub fn ensure_deprecated(&self) -> Result<(), LedgerError> {
        if !self.deprecated {
            return Err(LedgerError::NotDeprecated);
        }
        Ok(())
    }

    /// Owner switch to the deprecated state. Returns whether anything changed.
    ///
    /// Deprecation is one-way. While deprecated the successor can still be
    /// re-pointed until the first migration has moved funds out.
    pub fn deprecate(
        &mut self,
        caller: Address,
        deprecated: bool,
        successor: Address,
    ) -> Result<bool, LedgerError> {
        self.ensure_owner(caller)?;
        if !deprecated {
            if self.deprecated {
                return Err(LedgerError::AlreadyDeprecated);
            }
            return Ok(false);
        }
        if self.deprecated && self.migrated_out {
            return Err(LedgerError::AlreadyDeprecated);
        }
        if successor.is_zero() {
            return Err(LedgerError::InvalidArgument("successor must be set"));
        }
        self.deprecated = true;
        self.successor = Some(successor);
        Ok(true)
    }

    /// Validate a fill of `amount` (in `tokenGet` units) by `taker` and
    /// compute every resulting balance without touching storage.
    pub fn plan_trade(
        &self,
        this: Address,
        signed: &SignedOrder,
        amount: U256,
        taker: Address,
        block: BlockNumber,
        modifiers: Option<TradeModifiers>,
    ) -> Result<Settlement, LedgerError> {
        self.ensure_active()?;
        let order = &signed.order;
        let order_hash = signed.digest(this);

        if U256::from(block) >= order.expires
            || self.fills.is_exhausted(&order.maker, &order_hash, order.amount_get)
        {
            return Err(LedgerError::OrderExpiredOrExhausted);
        }
        if !signed.verify(this) {
            return Err(LedgerError::SignatureInvalid { maker: order.maker });
        }
        let filled_after = self
            .fills
            .check(&order.maker, &order_hash, order.amount_get, amount)?;

        let fee = split_fee(nominal_fee(amount, self.fee)?, modifiers)?;
        let give_amount = mul_div(order.amount_give, amount, order.amount_get)?;

        let mut staged = self.balances.stage();
        staged.credit(
            order.token_get,
            order.maker,
            safe_add(amount, fee.maker_rebate)?,
        )?;
        staged.debit(order.token_get, taker, safe_add(amount, fee.gross_fee)?)?;
        staged.debit(order.token_give, order.maker, give_amount)?;
        staged.credit(order.token_give, taker, give_amount)?;
        staged.credit(order.token_get, self.fee_account, fee.collector_fee)?;

        Ok(Settlement {
            order_hash,
            maker: order.maker,
            filled_after,
            give_amount,
            fee,
            changes: staged.finish(),
        })
    }

    pub fn apply(&mut self, settlement: Settlement) -> H256 {
        self.balances.commit(settlement.changes);
        self.fills
            .record(settlement.maker, settlement.order_hash, settlement.filled_after);
        settlement.order_hash
    }

    /// How much of `amountGet` can still be filled, limited by what the
    /// maker holds. Zero for expired or badly signed orders.
    pub fn available_volume(
        &self,
        this: Address,
        signed: &SignedOrder,
        block: BlockNumber,
    ) -> Result<U256, LedgerError> {
        let order = &signed.order;
        if U256::from(block) >= order.expires || !signed.verify(this) {
            return Ok(U256::zero());
        }
        let unfilled = self
            .fills
            .remaining(&order.maker, &signed.digest(this), order.amount_get)?;
        let covered = mul_div(
            self.balances.balance_of(order.token_give, &order.maker),
            order.amount_get,
            order.amount_give,
        )?;
        Ok(unfilled.min(covered))
    }

    pub fn amount_filled(&self, this: Address, signed: &SignedOrder) -> U256 {
        self.fills
            .filled(&signed.order.maker, &signed.digest(this))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Asset, Order, OrderSigner};

    const FEE: u64 = 3_000_000_000_000_000;

    fn addr(n: u64) -> Address {
        Address::from_low_u64_be(n)
    }

    struct Setup {
        store: TokenStore,
        this: Address,
        maker: OrderSigner,
        taker: Address,
        token: Asset,
    }

    fn setup() -> Setup {
        let owner = addr(100);
        let maker = OrderSigner::from_seed("maker");
        let taker = addr(2);
        let token = Asset::token(addr(50));
        let mut store = TokenStore::new(owner, U256::from(FEE), None, 1);
        for account in [maker.address(), taker] {
            store
                .balances
                .credit(Asset::ETHER, account, U256::from(100_000u64))
                .unwrap();
            store
                .balances
                .credit(token, account, U256::from(1_000_000u64))
                .unwrap();
        }
        Setup {
            store,
            this: addr(7),
            maker,
            taker,
            token,
        }
    }

    fn order(s: &Setup, amount_get: u64, amount_give: u64, expires: u64) -> SignedOrder {
        Order {
            token_get: Asset::ETHER,
            amount_get: U256::from(amount_get),
            token_give: s.token,
            amount_give: U256::from(amount_give),
            expires: U256::from(expires),
            nonce: U256::zero(),
            maker: s.maker.address(),
        }
        .sign(s.this, &s.maker)
    }

    #[test]
    fn test_plan_and_apply_trade() {
        let mut s = setup();
        let signed = order(&s, 20_000, 100_000, 100);
        let plan = s
            .store
            .plan_trade(s.this, &signed, U256::from(10_000u64), s.taker, 1, None)
            .unwrap();
        assert_eq!(plan.give_amount, U256::from(50_000u64));
        assert_eq!(plan.fee.gross_fee, U256::from(30u64));
        s.store.apply(plan);

        let b = &s.store.balances;
        assert_eq!(b.balance_of(s.token, &s.maker.address()), U256::from(950_000u64));
        assert_eq!(b.balance_of(s.token, &s.taker), U256::from(1_050_000u64));
        assert_eq!(b.balance_of(Asset::ETHER, &s.maker.address()), U256::from(110_000u64));
        assert_eq!(b.balance_of(Asset::ETHER, &s.taker), U256::from(89_970u64));
        assert_eq!(b.balance_of(Asset::ETHER, &addr(100)), U256::from(30u64));
        assert_eq!(
            s.store.amount_filled(s.this, &signed),
            U256::from(10_000u64)
        );
    }

    #[test]
    fn test_plan_does_not_touch_storage() {
        let s = setup();
        let before = s.store.balances.clone();
        let signed = order(&s, 20_000, 100_000, 100);
        s.store
            .plan_trade(s.this, &signed, U256::from(10_000u64), s.taker, 1, None)
            .unwrap();
        assert_eq!(s.store.balances, before);
    }

    #[test]
    fn test_expired_order_rejected() {
        let s = setup();
        let signed = order(&s, 20_000, 100_000, 5);
        let err = s
            .store
            .plan_trade(s.this, &signed, U256::one(), s.taker, 5, None)
            .unwrap_err();
        assert_eq!(err, LedgerError::OrderExpiredOrExhausted);
    }

    #[test]
    fn test_tampered_order_rejected() {
        let s = setup();
        let mut signed = order(&s, 20_000, 100_000, 100);
        signed.order.amount_give = U256::from(200_000u64);
        let err = s
            .store
            .plan_trade(s.this, &signed, U256::one(), s.taker, 1, None)
            .unwrap_err();
        assert!(matches!(err, LedgerError::SignatureInvalid { .. }));
    }

    #[test]
    fn test_precondition_order() {
        let mut s = setup();
        let genuine = order(&s, 2_000, 10_000, 100);
        let forged = genuine
            .order
            .clone()
            .sign(s.this, &OrderSigner::from_seed("mallory"));

        // A bad signature is reported before the size check.
        let err = s
            .store
            .plan_trade(s.this, &forged, U256::from(5_000u64), s.taker, 1, None)
            .unwrap_err();
        assert!(matches!(err, LedgerError::SignatureInvalid { .. }));

        let plan = s
            .store
            .plan_trade(s.this, &genuine, U256::from(2_000u64), s.taker, 1, None)
            .unwrap();
        s.store.apply(plan);

        // Exhaustion comes first, whoever signed.
        for signed in [&genuine, &forged] {
            let err = s
                .store
                .plan_trade(s.this, signed, U256::one(), s.taker, 1, None)
                .unwrap_err();
            assert_eq!(err, LedgerError::OrderExpiredOrExhausted);
        }
    }

    #[test]
    fn test_taker_shortfall_is_underflow() {
        let s = setup();
        let signed = order(&s, 200_000, 100_000, 100);
        let err = s
            .store
            .plan_trade(s.this, &signed, U256::from(100_000u64), s.taker, 1, None)
            .unwrap_err();
        // 100_000 + 300 fee exceeds the taker's 100_000 ether.
        assert_eq!(err, LedgerError::ArithmeticUnderflow);
    }

    #[test]
    fn test_deprecated_ledger_refuses_trades() {
        let mut s = setup();
        s.store.deprecate(addr(100), true, addr(8)).unwrap();
        let signed = order(&s, 20_000, 100_000, 100);
        let err = s
            .store
            .plan_trade(s.this, &signed, U256::one(), s.taker, 1, None)
            .unwrap_err();
        assert_eq!(err, LedgerError::AlreadyDeprecated);
    }

    #[test]
    fn test_available_volume_limited_by_maker_balance() {
        let mut s = setup();
        let signed = order(&s, 20_000, 100_000, 100);
        assert_eq!(
            s.store.available_volume(s.this, &signed, 1).unwrap(),
            U256::from(20_000u64)
        );

        s.store
            .balances
            .debit(s.token, s.maker.address(), U256::from(950_000u64))
            .unwrap();
        // 50_000 tokens cover 10_000 of the 20_000 requested.
        assert_eq!(
            s.store.available_volume(s.this, &signed, 1).unwrap(),
            U256::from(10_000u64)
        );
        assert_eq!(
            s.store.available_volume(s.this, &signed, 100).unwrap(),
            U256::zero()
        );
    }

    #[test]
    fn test_deprecate_state_machine() {
        let mut store = TokenStore::new(addr(1), U256::zero(), None, 1);
        assert_eq!(
            store.deprecate(addr(2), true, addr(9)),
            Err(LedgerError::Unauthorized { caller: addr(2) })
        );
        assert_eq!(store.deprecate(addr(1), false, addr(9)), Ok(false));
        assert!(!store.deprecated);

        assert_eq!(store.deprecate(addr(1), true, addr(9)), Ok(true));
        assert_eq!(store.successor, Some(addr(9)));
        assert_eq!(
            store.deprecate(addr(1), false, Address::zero()),
            Err(LedgerError::AlreadyDeprecated)
        );

        // Re-pointing is fine until funds move.
        assert_eq!(store.deprecate(addr(1), true, addr(10)), Ok(true));
        store.migrated_out = true;
        assert_eq!(
            store.deprecate(addr(1), true, addr(11)),
            Err(LedgerError::AlreadyDeprecated)
        );
        assert_eq!(store.successor, Some(addr(10)));
    }
}
