//! Value Objects for pricing

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;

use crate::PricingError;

/// Money value object
///
/// Always non-negative. Arithmetic that could go below zero saturates at zero.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Money(Decimal);

impl Money {
    pub const ZERO: Money = Money(Decimal::ZERO);

    pub fn new(amount: Decimal) -> Result<Self, PricingError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PricingError::NegativeAmount(amount));
        }
        Ok(Self(amount))
    }

    /// Builds from an arbitrary decimal, flooring negatives at zero.
    pub fn saturating(amount: Decimal) -> Self { Self(amount.max(Decimal::ZERO)) }

    pub fn amount(&self) -> Decimal { self.0 }
    pub fn add(&self, other: &Money) -> Money { Money(self.0 + other.0) }
    pub fn saturating_sub(&self, other: &Money) -> Money { Money::saturating(self.0 - other.0) }
    pub fn multiply(&self, qty: Quantity) -> Money { Money(self.0 * Decimal::from(qty.value())) }

    /// Applies a percentage reduction: `amount * (1 - pct / 100)`.
    pub fn reduce_by(&self, pct: &Percentage) -> Money { Money::saturating(self.0 * pct.remaining_factor()) }

    /// Two decimal places, banker's rounding, scale fixed at 2.
    pub fn rounded(&self) -> Money {
        let mut amount = self.0.round_dp(2);
        amount.rescale(2);
        Money(amount)
    }

    /// Number of digits left of the decimal point.
    pub fn integer_digits(&self) -> u32 {
        let mut whole = self.0.trunc();
        whole.rescale(0);
        whole.mantissa().unsigned_abs().checked_ilog10().map_or(0, |d| d + 1)
    }
}

impl TryFrom<Decimal> for Money {
    type Error = PricingError;
    fn try_from(value: Decimal) -> Result<Self, Self::Error> { Money::new(value) }
}

impl From<Money> for Decimal {
    fn from(value: Money) -> Self { value.0 }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self { iter.fold(Money::ZERO, |acc, m| acc.add(&m)) }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}

/// Percentage value object, `10` meaning ten percent.
///
/// Values above 100 are representable; price reductions using them floor at zero.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Percentage(Decimal);

impl Percentage {
    pub const HUNDRED: Percentage = Percentage(Decimal::ONE_HUNDRED);

    pub fn new(value: Decimal) -> Result<Self, PricingError> {
        if value.is_sign_negative() && !value.is_zero() {
            return Err(PricingError::NegativePercentage(value));
        }
        Ok(Self(value))
    }

    pub fn value(&self) -> Decimal { self.0 }

    pub fn rounded(&self) -> Percentage {
        let mut value = self.0.round_dp(2);
        value.rescale(2);
        Percentage(value)
    }

    /// `1 - value / 100`, floored at zero once the percentage exceeds 100.
    pub fn remaining_factor(&self) -> Decimal { (Decimal::ONE - self.0 / Decimal::ONE_HUNDRED).max(Decimal::ZERO) }
}

impl TryFrom<Decimal> for Percentage {
    type Error = PricingError;
    fn try_from(value: Decimal) -> Result<Self, Self::Error> { Percentage::new(value) }
}

impl From<Percentage> for Decimal {
    fn from(value: Percentage) -> Self { value.0 }
}

impl fmt::Display for Percentage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}%", self.0) }
}

/// Quantity value object, at least one unit
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Quantity(u32);

impl Quantity {
    pub fn new(value: u32) -> Result<Self, PricingError> {
        if value == 0 { return Err(PricingError::InvalidQuantity); }
        Ok(Self(value))
    }
    pub fn value(&self) -> u32 { self.0 }

    /// Inclusive threshold check used by bulk pricing.
    pub fn reaches(&self, threshold: u32) -> bool { self.0 >= threshold }
}

impl TryFrom<u32> for Quantity {
    type Error = PricingError;
    fn try_from(value: u32) -> Result<Self, Self::Error> { Quantity::new(value) }
}

impl From<Quantity> for u32 {
    fn from(value: Quantity) -> Self { value.0 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_money_rejects_negative() {
        assert!(Money::new(dec!(-0.01)).is_err());
        assert_eq!(Money::new(dec!(0)).unwrap(), Money::ZERO);
    }

    #[test]
    fn test_money_saturating_sub() {
        let a = Money::new(dec!(5)).unwrap();
        let b = Money::new(dec!(7.50)).unwrap();
        assert_eq!(a.saturating_sub(&b), Money::ZERO);
        assert_eq!(b.saturating_sub(&a).amount(), dec!(2.50));
    }

    #[test]
    fn test_money_rounded_is_two_places() {
        let m = Money::new(dec!(80.0)).unwrap().rounded();
        assert_eq!(m.to_string(), "80.00");
        assert_eq!(Money::new(dec!(10.125)).unwrap().rounded().amount(), dec!(10.12));
    }

    #[test]
    fn test_money_integer_digits() {
        assert_eq!(Money::new(dec!(0.99)).unwrap().integer_digits(), 0);
        assert_eq!(Money::new(dec!(12345678.99)).unwrap().integer_digits(), 8);
        assert_eq!(Money::new(dec!(100)).unwrap().integer_digits(), 3);
        assert_eq!(Money::new(dec!(100000000.00)).unwrap().integer_digits(), 9);
    }

    #[test]
    fn test_reduce_by_over_hundred_floors() {
        let m = Money::new(dec!(20)).unwrap();
        assert_eq!(m.reduce_by(&Percentage::new(dec!(150)).unwrap()), Money::ZERO);
        assert_eq!(Percentage::new(Decimal::MAX).unwrap().remaining_factor(), Decimal::ZERO);
    }

    #[test]
    fn test_quantity() {
        assert!(Quantity::new(0).is_err());
        let q = Quantity::new(10).unwrap();
        assert!(q.reaches(10));
        assert!(!q.reaches(11));
    }

    #[test]
    fn test_money_deserializes_from_string_and_number() {
        let a: Money = serde_json::from_str("\"19.99\"").unwrap();
        let b: Money = serde_json::from_str("20").unwrap();
        assert_eq!(a.amount(), dec!(19.99));
        assert_eq!(b.amount(), dec!(20));
        assert!(serde_json::from_str::<Money>("\"-1\"").is_err());
    }
}
