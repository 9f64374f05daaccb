//! Ethereum-style personal-message signatures over order digests.

use crate::domain::Address;
use primitive_types::H256;
use serde::{Deserialize, Serialize};
use sha3::{Digest, Keccak256};

const MESSAGE_PREFIX: &[u8] = b"\x19Ethereum Signed Message:\n32";

/// Recoverable ECDSA signature as carried by an order: (v, r, s).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderSignature {
    pub v: u8,
    pub r: H256,
    pub s: H256,
}

pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut out = [0u8; 32];
    out.copy_from_slice(&Keccak256::digest(data));
    out
}

/// keccak256("\x19Ethereum Signed Message:\n32" ‖ digest)
pub fn eth_message_hash(digest: &[u8; 32]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(MESSAGE_PREFIX);
    hasher.update(digest);
    let mut out = [0u8; 32];
    out.copy_from_slice(&hasher.finalize());
    out
}

pub fn public_key_to_address(public_key: &secp256k1::PublicKey) -> Address {
    let hash = keccak256(&public_key.serialize()[1..]);
    Address::from_slice(&hash[12..])
}

/// Recover the account that signed `digest` as a personal message.
///
/// Returns `None` for malformed signatures; callers treat that the same as a
/// signer mismatch.
pub fn recover_signer(digest: &[u8; 32], signature: &OrderSignature) -> Option<Address> {
    let recovery = match signature.v {
        27 | 28 => signature.v - 27,
        0 | 1 => signature.v,
        _ => return None,
    };
    let recovery_id = secp256k1::RecoveryId::parse(recovery).ok()?;

    let mut rs = [0u8; 64];
    rs[..32].copy_from_slice(signature.r.as_bytes());
    rs[32..].copy_from_slice(signature.s.as_bytes());
    let sig = secp256k1::Signature::parse_standard(&rs).ok()?;

    let message = secp256k1::Message::parse(&eth_message_hash(digest));
    let public_key = secp256k1::recover(&message, &sig, &recovery_id).ok()?;
    Some(public_key_to_address(&public_key))
}

/// Off-chain signing key of a maker.
#[derive(Clone)]
pub struct OrderSigner {
    secret: secp256k1::SecretKey,
    address: Address,
}

impl OrderSigner {
    /// Build a signer from a raw 32-byte secret key.
    pub fn from_secret(bytes: &[u8; 32]) -> Option<Self> {
        let secret = secp256k1::SecretKey::parse(bytes).ok()?;
        let address = public_key_to_address(&secp256k1::PublicKey::from_secret_key(&secret));
        Some(Self { secret, address })
    }

    /// Deterministic test/dev key derived from a seed string.
    pub fn from_seed(seed: &str) -> Self {
        let mut counter = 0u32;
        loop {
            let mut material = seed.as_bytes().to_vec();
            material.extend_from_slice(&counter.to_be_bytes());
            if let Some(signer) = Self::from_secret(&keccak256(&material)) {
                return signer;
            }
            counter += 1;
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    /// Sign `digest` as a personal message; `v` is 27 or 28.
    pub fn sign_digest(&self, digest: &[u8; 32]) -> OrderSignature {
        let message = secp256k1::Message::parse(&eth_message_hash(digest));
        let (sig, recovery_id) = secp256k1::sign(&message, &self.secret);
        let bytes = sig.serialize();
        OrderSignature {
            v: recovery_id.serialize() + 27,
            r: H256::from_slice(&bytes[..32]),
            s: H256::from_slice(&bytes[32..]),
        }
    }
}

impl std::fmt::Debug for OrderSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderSigner")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}
