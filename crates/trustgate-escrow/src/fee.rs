//! # Fee Split
//!
//! `platform_fee = floor(amount × bps / 10000)`, `net = amount − platform_fee`.
//!
//! All arithmetic is integer minor currency units with `u128`
//! intermediates. Because a valid rate never exceeds 10000 bps, the fee
//! never exceeds the amount and the net is never negative.

use serde::{Deserialize, Serialize};

use trustgate_core::BPS_DENOMINATOR;

use crate::error::EscrowError;

/// A platform fee rate in basis points, at most 10000.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct FeeRate(u32);

impl FeeRate {
    /// 12%.
    pub const DEFAULT: FeeRate = FeeRate(1200);

    /// Validate a basis-point rate.
    pub fn new(bps: u32) -> Result<Self, EscrowError> {
        if bps > BPS_DENOMINATOR {
            return Err(EscrowError::InvalidFeeRate(bps));
        }
        Ok(Self(bps))
    }

    /// The rate in basis points.
    pub fn bps(&self) -> u32 {
        self.0
    }

    /// Split `amount` into fee and net.
    pub fn split(&self, amount: u64) -> FeeSplit {
        let fee = platform_fee(amount, *self);
        FeeSplit {
            gross: amount,
            fee_bps: self.0,
            platform_fee: fee,
            net: amount - fee,
        }
    }
}

impl Default for FeeRate {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<u32> for FeeRate {
    type Error = EscrowError;

    fn try_from(bps: u32) -> Result<Self, Self::Error> {
        Self::new(bps)
    }
}

impl From<FeeRate> for u32 {
    fn from(rate: FeeRate) -> Self {
        rate.0
    }
}

/// `floor(amount × rate / 10000)`.
pub fn platform_fee(amount: u64, rate: FeeRate) -> u64 {
    let fee = u128::from(amount) * u128::from(rate.0) / u128::from(BPS_DENOMINATOR);
    // fee <= amount because rate <= 10000
    u64::try_from(fee).unwrap_or(amount)
}

/// `amount − platform_fee(amount, rate)`.
pub fn net_amount(amount: u64, rate: FeeRate) -> u64 {
    amount - platform_fee(amount, rate)
}

/// A computed fee breakdown. Derived on demand, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeSplit {
    /// Amount paid into escrow.
    pub gross: u64,
    /// Rate the split was computed at.
    pub fee_bps: u32,
    /// Platform's share.
    pub platform_fee: u64,
    /// Counterparty's share.
    pub net: u64,
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Net matches the closed-form definition for every amount and rate.
        #[test]
        fn net_matches_definition(amount in any::<u64>(), bps in 0u32..=10_000) {
            let rate = FeeRate::new(bps).unwrap();
            let expected_fee = (u128::from(amount) * u128::from(bps) / 10_000) as u64;
            prop_assert_eq!(platform_fee(amount, rate), expected_fee);
            prop_assert_eq!(net_amount(amount, rate), amount - expected_fee);
        }

        /// Fee plus net always reconstructs the gross amount.
        #[test]
        fn split_is_lossless(amount in any::<u64>(), bps in 0u32..=10_000) {
            let split = FeeRate::new(bps).unwrap().split(amount);
            prop_assert_eq!(split.platform_fee + split.net, split.gross);
            prop_assert!(split.platform_fee <= amount);
        }
    }
}
