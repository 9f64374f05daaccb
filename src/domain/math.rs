//! Checked 256-bit arithmetic.
//!
//! Every balance and fee computation goes through these helpers so that a
//! wrap-around is reported as an `InvalidOpcode`-class failure instead of
//! silently corrupting state.

use crate::error::LedgerError;
use primitive_types::U256;

/// 10^18, the denominator of the fee rate.
pub fn one_ether() -> U256 {
    U256::exp10(18)
}

pub fn safe_add(a: U256, b: U256) -> Result<U256, LedgerError> {
    a.checked_add(b).ok_or(LedgerError::ArithmeticOverflow)
}

pub fn safe_sub(a: U256, b: U256) -> Result<U256, LedgerError> {
    a.checked_sub(b).ok_or(LedgerError::ArithmeticUnderflow)
}

pub fn safe_mul(a: U256, b: U256) -> Result<U256, LedgerError> {
    a.checked_mul(b).ok_or(LedgerError::ArithmeticOverflow)
}

pub fn safe_div(a: U256, b: U256) -> Result<U256, LedgerError> {
    a.checked_div(b).ok_or(LedgerError::DivisionByZero)
}

/// `a * b / denominator`, truncating.
pub fn mul_div(a: U256, b: U256, denominator: U256) -> Result<U256, LedgerError> {
    safe_div(safe_mul(a, b)?, denominator)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_add_overflow() {
        assert_eq!(
            safe_add(U256::MAX, U256::one()),
            Err(LedgerError::ArithmeticOverflow)
        );
        assert_eq!(safe_add(U256::one(), U256::one()), Ok(U256::from(2u64)));
    }

    #[test]
    fn test_safe_sub_underflow() {
        assert_eq!(
            safe_sub(U256::zero(), U256::one()),
            Err(LedgerError::ArithmeticUnderflow)
        );
    }

    #[test]
    fn test_mul_div_truncates() {
        // 10_000 * 0.3% = 30
        let fee = mul_div(U256::from(10_000u64), U256::from(3_000_000_000_000_000u64), one_ether())
            .unwrap();
        assert_eq!(fee, U256::from(30u64));

        let truncated = mul_div(U256::from(18u64), U256::from(30u64), U256::from(100u64)).unwrap();
        assert_eq!(truncated, U256::from(5u64));
    }

    #[test]
    fn test_mul_div_by_zero() {
        assert_eq!(
            mul_div(U256::one(), U256::one(), U256::zero()),
            Err(LedgerError::DivisionByZero)
        );
    }

    #[test]
    fn test_safe_mul_overflow() {
        assert_eq!(
            safe_mul(U256::MAX, U256::from(2u64)),
            Err(LedgerError::ArithmeticOverflow)
        );
    }
}
