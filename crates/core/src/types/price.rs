//! Type-safe price representation using decimal arithmetic.
//!
//! The storefront sells in US dollars only.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// A price in US dollars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price {
    /// Amount in dollars, not cents.
    pub amount: Decimal,
}

impl Price {
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self { amount }
    }

    /// Apply a percentage discount (0-100) and round to cents.
    ///
    /// Percentages outside 0-100 are clamped.
    #[must_use]
    pub fn discounted(&self, percent: Decimal) -> Self {
        let percent = percent.clamp(Decimal::ZERO, Decimal::ONE_HUNDRED);
        let factor = Decimal::ONE - percent / Decimal::ONE_HUNDRED;
        Self::new(round_cents(self.amount * factor))
    }
}

/// Round a monetary amount to two decimal places, half away from zero.
#[must_use]
pub fn round_cents(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}
