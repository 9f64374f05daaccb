//! Signed off-chain orders and their canonical digest.

use crate::domain::primitives::{u256_dec, u256_to_be_bytes};
use crate::domain::signature::{recover_signer, OrderSignature, OrderSigner};
use crate::domain::{Address, Asset};
use primitive_types::{H256, U256};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// The terms a maker commits to.
///
/// `amount_get` of `token_get` is what the maker wants; `amount_give` of
/// `token_give` is what the maker offers in exchange.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub token_get: Asset,
    #[serde(with = "u256_dec")]
    pub amount_get: U256,
    pub token_give: Asset,
    #[serde(with = "u256_dec")]
    pub amount_give: U256,
    #[serde(with = "u256_dec")]
    pub expires: U256,
    #[serde(with = "u256_dec")]
    pub nonce: U256,
    pub maker: Address,
}

impl Order {
    /// SHA-256 over the packed tuple
    /// (ledger, tokenGet, amountGet, tokenGive, amountGive, expires, nonce).
    ///
    /// Addresses take 20 bytes, numbers 32 big-endian bytes. Binding the
    /// ledger address prevents replay against another deployment.
    pub fn digest(&self, ledger: Address) -> H256 {
        let mut hasher = Sha256::new();
        hasher.update(ledger.as_bytes());
        hasher.update(self.token_get.address().as_bytes());
        hasher.update(u256_to_be_bytes(&self.amount_get));
        hasher.update(self.token_give.address().as_bytes());
        hasher.update(u256_to_be_bytes(&self.amount_give));
        hasher.update(u256_to_be_bytes(&self.expires));
        hasher.update(u256_to_be_bytes(&self.nonce));
        H256::from_slice(&hasher.finalize())
    }

    /// Sign the order for `ledger` with the maker's key.
    pub fn sign(self, ledger: Address, signer: &OrderSigner) -> SignedOrder {
        let signature = signer.sign_digest(&self.digest(ledger).0);
        SignedOrder {
            order: self,
            signature,
        }
    }
}

/// An order together with the maker's signature over its digest.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedOrder {
    #[serde(flatten)]
    pub order: Order,
    #[serde(flatten)]
    pub signature: OrderSignature,
}

impl SignedOrder {
    pub fn digest(&self, ledger: Address) -> H256 {
        self.order.digest(ledger)
    }

    /// True when the signature recovers to the claimed maker.
    pub fn verify(&self, ledger: Address) -> bool {
        let digest = self.digest(ledger);
        match recover_signer(&digest.0, &self.signature) {
            Some(signer) => signer == self.order.maker,
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_order(maker: Address) -> Order {
        Order {
            token_get: Asset::ETHER,
            amount_get: U256::from(20_000u64),
            token_give: Asset::token(Address::from_low_u64_be(0xaa)),
            amount_give: U256::from(100_000u64),
            expires: U256::from(100u64),
            nonce: U256::from(7u64),
            maker,
        }
    }

    #[test]
    fn test_digest_matches_packed_sha256() {
        let ledger = Address::from_low_u64_be(0x1234);
        let order = sample_order(Address::zero());

        let mut packed = Vec::new();
        packed.extend_from_slice(ledger.as_bytes());
        packed.extend_from_slice(&[0u8; 20]);
        packed.extend_from_slice(&u256_to_be_bytes(&U256::from(20_000u64)));
        packed.extend_from_slice(Address::from_low_u64_be(0xaa).as_bytes());
        packed.extend_from_slice(&u256_to_be_bytes(&U256::from(100_000u64)));
        packed.extend_from_slice(&u256_to_be_bytes(&U256::from(100u64)));
        packed.extend_from_slice(&u256_to_be_bytes(&U256::from(7u64)));
        assert_eq!(packed.len(), 20 * 3 + 32 * 4);

        let expected = H256::from_slice(&Sha256::digest(&packed));
        assert_eq!(order.digest(ledger), expected);
    }

    #[test]
    fn test_digest_binds_ledger_address() {
        let order = sample_order(Address::zero());
        assert_ne!(
            order.digest(Address::from_low_u64_be(1)),
            order.digest(Address::from_low_u64_be(2))
        );
    }

    #[test]
    fn test_signed_order_verifies_for_maker_only() {
        let signer = OrderSigner::from_seed("maker");
        let ledger = Address::from_low_u64_be(0x99);
        let signed = sample_order(signer.address()).sign(ledger, &signer);
        assert!(signed.verify(ledger));
        assert!(!signed.verify(Address::from_low_u64_be(0x98)));

        let mut forged = signed.clone();
        forged.order.maker = Address::from_low_u64_be(0x77);
        assert!(!forged.verify(ledger));
    }

    #[test]
    fn test_signed_order_json_is_flat() {
        let signer = OrderSigner::from_seed("maker");
        let signed = sample_order(signer.address()).sign(Address::zero(), &signer);
        let value = serde_json::to_value(&signed).unwrap();
        assert_eq!(value["amountGet"], "20000");
        assert!(value["v"].is_u64());
        assert!(value["r"].is_string());

        let back: SignedOrder = serde_json::from_value(value).unwrap();
        assert_eq!(back, signed);
    }
}
