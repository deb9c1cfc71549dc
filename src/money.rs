//! Fixed two-decimal currency amounts.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of decimal places every amount is rounded to.
pub const DECIMAL_PLACES: u32 = 2;

/// Largest amount in paise (999,999,999,999,999.99).
const MAX_MINOR_UNITS: i64 = 99_999_999_999_999_999;

/// Largest representable amount. Anything above is clamped to it.
pub fn max_amount() -> Decimal {
    Decimal::new(MAX_MINOR_UNITS, DECIMAL_PLACES)
}

/// A non-negative monetary amount, rounded to two decimal places.
///
/// Displays and serializes as a string with exactly two decimals, so the same
/// inputs always produce the same text: `"0.00"`, `"200.00"`, `"50.50"`.
///
/// # Example
///
/// ```
/// use bill_kit::Money;
/// use rust_decimal::Decimal;
///
/// let amount = Money::new(Decimal::new(12345, 3)); // 12.345
/// assert_eq!(amount.to_string(), "12.35");
///
/// let clamped = Money::new(Decimal::new(-5, 0));
/// assert_eq!(clamped.to_string(), "0.00");
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Money(Decimal);

impl Money {
    pub const ZERO: Money = Money(Decimal::ZERO);

    /// Round to two places (midpoint away from zero) and clamp into
    /// `0..=max_amount()`.
    pub fn new(amount: Decimal) -> Self {
        let rounded =
            amount.round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero);
        Money(rounded.max(Decimal::ZERO).min(max_amount()))
    }

    /// The underlying decimal value.
    pub fn amount(&self) -> Decimal {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut fixed = self.0;
        fixed.rescale(DECIMAL_PLACES);
        write!(f, "{}", fixed)
    }
}

impl FromStr for Money {
    type Err = String;

    /// Strict parse: rejects non-numeric, negative and out-of-range input.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let amount = Decimal::from_str(s.trim()).map_err(|e| format!("invalid amount {:?}: {}", s, e))?;
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(format!("negative amount {:?}", s));
        }
        if amount > max_amount() {
            return Err(format!("amount {:?} exceeds {}", s, max_amount()));
        }
        Ok(Money::new(amount))
    }
}

impl TryFrom<String> for Money {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Money> for String {
    fn from(value: Money) -> Self {
        value.to_string()
    }
}

impl From<Money> for Decimal {
    fn from(value: Money) -> Self {
        value.0
    }
}
