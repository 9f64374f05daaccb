use crate::contracts::TradeModifiers;
use crate::domain::math::{mul_div, one_ether, safe_sub};
use crate::error::LedgerError;
use primitive_types::U256;

/// How the taker's fee for one fill is divided.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FeeSplit {
    /// Charged to the taker on top of the fill amount.
    pub gross_fee: U256,
    /// Paid back to the maker out of the gross fee.
    pub maker_rebate: U256,
    /// Left for the fee account.
    pub collector_fee: U256,
}

/// Nominal fee of a fill: `amount * fee_rate / 10^18`.
pub fn nominal_fee(amount: U256, fee_rate: U256) -> Result<U256, LedgerError> {
    mul_div(amount, fee_rate, one_ether())
}

/// Apply taker discount and maker rebate to a nominal fee.
///
/// Percentages above 100 count as 0. Each division truncates, so any rounding
/// goes to the fee account rather than to the maker's rebate.
pub fn split_fee(nominal: U256, modifiers: Option<TradeModifiers>) -> Result<FeeSplit, LedgerError> {
    let Some(modifiers) = modifiers else {
        return Ok(FeeSplit {
            gross_fee: nominal,
            maker_rebate: U256::zero(),
            collector_fee: nominal,
        });
    };

    let discount = clamp_percentage(modifiers.taker_discount);
    let rebate = clamp_percentage(modifiers.maker_rebate);
    let hundred = U256::from(100u64);

    let gross_fee = mul_div(nominal, U256::from(100 - discount), hundred)?;
    let maker_rebate = mul_div(gross_fee, U256::from(rebate), hundred)?;
    let collector_fee = safe_sub(gross_fee, maker_rebate)?;

    Ok(FeeSplit {
        gross_fee,
        maker_rebate,
        collector_fee,
    })
}

fn clamp_percentage(pct: u8) -> u64 {
    if pct > 100 {
        0
    } else {
        u64::from(pct)
    }
}
