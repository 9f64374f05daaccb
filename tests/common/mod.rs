#![allow(dead_code)]

use primitive_types::U256;
use tokenstore::{
    Address, Asset, Call, Chain, LedgerError, Order, OrderSigner, Receipt, SignedOrder,
    Transaction,
};

/// 0.3% per filled unit.
pub const FEE: u64 = 3_000_000_000_000_000;

pub fn addr(n: u64) -> Address {
    Address::from_low_u64_be(n)
}

pub fn u(n: u64) -> U256 {
    U256::from(n)
}

/// A chain with one ledger, one token, an owner, a maker and a taker.
pub struct Market {
    pub chain: Chain,
    pub owner: Address,
    pub maker: OrderSigner,
    pub taker: Address,
    pub ledger: Address,
    pub token: Address,
}

impl Market {
    /// Accounts hold ether and tokens outside the ledger; nothing deposited.
    pub fn new() -> Self {
        let mut chain = Chain::new();
        let owner = addr(0xa0);
        let maker = OrderSigner::from_seed("maker");
        let taker = addr(0xb0);
        for account in [owner, maker.address(), taker] {
            chain.fund(account, U256::exp10(21)).unwrap();
        }
        let token = chain.deploy_token(owner, U256::exp10(24), "Test Token", 18, "TST");
        let ledger = chain.deploy_ledger(owner, u(FEE), None).unwrap();
        for account in [maker.address(), taker] {
            chain
                .send(Transaction::new(
                    owner,
                    token,
                    Call::Transfer {
                        to: account,
                        amount: u(10_000_000),
                    },
                ))
                .unwrap();
        }
        Market {
            chain,
            owner,
            maker,
            taker,
            ledger,
            token,
        }
    }

    /// Maker and taker each hold 100,000 ether and 1,000,000 tokens in the ledger.
    pub fn funded() -> Self {
        let mut market = Self::new();
        for account in [market.maker.address(), market.taker] {
            market.deposit_ether(account, u(100_000)).unwrap();
            market.deposit_token(account, u(1_000_000)).unwrap();
        }
        market
    }

    pub fn token_asset(&self) -> Asset {
        Asset::token(self.token)
    }

    pub fn deposit_ether(&mut self, from: Address, amount: U256) -> Result<Receipt, LedgerError> {
        self.deposit_ether_into(self.ledger, from, amount)
    }

    pub fn deposit_ether_into(
        &mut self,
        ledger: Address,
        from: Address,
        amount: U256,
    ) -> Result<Receipt, LedgerError> {
        self.chain
            .send(Transaction::new(from, ledger, Call::Deposit).with_value(amount))
    }

    pub fn deposit_token(&mut self, from: Address, amount: U256) -> Result<Receipt, LedgerError> {
        self.deposit_token_into(self.ledger, from, amount)
    }

    /// approve + depositToken, the way a wallet does it.
    pub fn deposit_token_into(
        &mut self,
        ledger: Address,
        from: Address,
        amount: U256,
    ) -> Result<Receipt, LedgerError> {
        self.chain.send(Transaction::new(
            from,
            self.token,
            Call::Approve {
                spender: ledger,
                amount,
            },
        ))?;
        self.chain.send(Transaction::new(
            from,
            ledger,
            Call::DepositToken {
                token: self.token,
                amount,
            },
        ))
    }

    /// Maker order on the market ledger wanting `amount_get` ether for
    /// `amount_give` tokens.
    pub fn ether_for_tokens(&self, amount_get: u64, amount_give: u64, nonce: u64) -> SignedOrder {
        self.order(
            Asset::ETHER,
            u(amount_get),
            self.token_asset(),
            u(amount_give),
            100,
            nonce,
        )
    }

    pub fn order(
        &self,
        token_get: Asset,
        amount_get: U256,
        token_give: Asset,
        amount_give: U256,
        expires_in: u64,
        nonce: u64,
    ) -> SignedOrder {
        Order {
            token_get,
            amount_get,
            token_give,
            amount_give,
            expires: u(self.chain.block_number() + expires_in),
            nonce: u(nonce),
            maker: self.maker.address(),
        }
        .sign(self.ledger, &self.maker)
    }

    pub fn trade_tx(&self, taker: Address, order: &SignedOrder, amount: u64) -> Transaction {
        Transaction::new(
            taker,
            self.ledger,
            Call::Trade {
                order: order.clone(),
                amount: u(amount),
            },
        )
    }

    pub fn trade(
        &mut self,
        taker: Address,
        order: &SignedOrder,
        amount: u64,
    ) -> Result<Receipt, LedgerError> {
        let tx = self.trade_tx(taker, order, amount);
        self.chain.send(tx)
    }

    pub fn balance(&self, asset: Asset, account: Address) -> U256 {
        self.chain
            .balance_of(&self.ledger, asset, &account)
            .unwrap()
    }

    pub fn ether(&self, account: Address) -> U256 {
        self.balance(Asset::ETHER, account)
    }

    pub fn tokens(&self, account: Address) -> U256 {
        self.balance(self.token_asset(), account)
    }

    /// Ledger custody equals the sum of its account balances, per asset.
    pub fn assert_conserved(&self, ledger: Address) {
        assert_eq!(
            self.chain.ledger_total(&ledger, Asset::ETHER).unwrap(),
            self.chain.ether_balance(&ledger),
            "ether custody of {:?}",
            ledger
        );
        assert_eq!(
            self.chain
                .ledger_total(&ledger, self.token_asset())
                .unwrap(),
            self.chain.token_balance(&self.token, &ledger).unwrap(),
            "token custody of {:?}",
            ledger
        );
    }
}
