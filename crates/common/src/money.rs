//! Money amounts in integer cents.

use serde::{Deserialize, Serialize};

/// Money amount represented in cents to avoid floating point issues.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct Money {
    /// Amount in cents (e.g., 1000 = $10.00)
    cents: i64,
}

impl Money {
    /// Creates a new Money amount from cents.
    pub const fn from_cents(cents: i64) -> Self {
        Self { cents }
    }

    /// Creates a new Money amount from a whole-unit value.
    pub const fn from_units(units: i64) -> Self {
        Self { cents: units * 100 }
    }

    /// Returns zero money.
    pub const fn zero() -> Self {
        Self { cents: 0 }
    }

    /// Returns the amount in cents.
    pub fn cents(&self) -> i64 {
        self.cents
    }

    /// Returns the whole-unit portion.
    pub fn units(&self) -> i64 {
        self.cents / 100
    }

    /// Returns the cents portion (remainder after whole units).
    pub fn cents_part(&self) -> i64 {
        self.cents.abs() % 100
    }

    pub fn is_zero(&self) -> bool {
        self.cents == 0
    }

    pub fn is_negative(&self) -> bool {
        self.cents < 0
    }

    /// Multiplies by a quantity.
    pub fn multiply(&self, quantity: u32) -> Money {
        Money {
            cents: self.cents * i64::from(quantity),
        }
    }

    /// Multiplies by a quantity, returning `None` on overflow.
    pub fn checked_multiply(&self, quantity: u32) -> Option<Money> {
        self.cents
            .checked_mul(i64::from(quantity))
            .map(Money::from_cents)
    }

    pub fn checked_add(&self, other: Money) -> Option<Money> {
        self.cents.checked_add(other.cents).map(Money::from_cents)
    }

    /// Returns `percent`% of this amount, rounded half away from zero to the
    /// nearest cent, or `None` if the result does not fit.
    pub fn checked_percent(&self, percent: u32) -> Option<Money> {
        let scaled = i128::from(self.cents) * i128::from(percent);
        let mut cents = scaled / 100;
        if (scaled % 100).abs() >= 50 {
            cents += scaled.signum();
        }
        i64::try_from(cents).ok().map(Money::from_cents)
    }

    /// Like [`Money::checked_percent`], saturating at the bounds of `i64`.
    pub fn percent(&self, percent: u32) -> Money {
        self.checked_percent(percent).unwrap_or(if self.cents < 0 {
            Money::from_cents(i64::MIN)
        } else {
            Money::from_cents(i64::MAX)
        })
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.cents < 0 {
            write!(f, "-${}.{:02}", self.units().abs(), self.cents_part())
        } else {
            write!(f, "${}.{:02}", self.units(), self.cents_part())
        }
    }
}

impl std::ops::Add for Money {
    type Output = Money;

    fn add(self, rhs: Self) -> Self::Output {
        Money {
            cents: self.cents + rhs.cents,
        }
    }
}

impl std::ops::Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Self) -> Self::Output {
        Money {
            cents: self.cents - rhs.cents,
        }
    }
}

impl std::ops::AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.cents += rhs.cents;
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_money_from_cents() {
        let money = Money::from_cents(1234);
        assert_eq!(money.cents(), 1234);
        assert_eq!(money.units(), 12);
        assert_eq!(money.cents_part(), 34);
    }

    #[test]
    fn test_money_display() {
        assert_eq!(Money::from_cents(1234).to_string(), "$12.34");
        assert_eq!(Money::from_cents(5).to_string(), "$0.05");
        assert_eq!(Money::from_cents(-1234).to_string(), "-$12.34");
    }

    #[test]
    fn test_money_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!((a + b).cents(), 1500);
        assert_eq!((a - b).cents(), 500);
        assert_eq!(a.multiply(3).cents(), 3000);
    }

    #[test]
    fn test_percent_exact() {
        assert_eq!(Money::from_units(20).percent(18), Money::from_cents(360));
        assert_eq!(Money::from_units(20).percent(10), Money::from_cents(200));
    }

    #[test]
    fn test_percent_rounds_half_away_from_zero() {
        // 10.99 * 18% = 1.9782
        assert_eq!(Money::from_cents(1099).percent(18).cents(), 198);
        // 0.25 * 10% = 0.025
        assert_eq!(Money::from_cents(25).percent(10).cents(), 3);
        // 0.24 * 10% = 0.024
        assert_eq!(Money::from_cents(24).percent(10).cents(), 2);
        assert_eq!(Money::from_cents(-25).percent(10).cents(), -3);
    }

    #[test]
    fn test_checked_multiply_overflow() {
        assert_eq!(
            Money::from_cents(250).checked_multiply(4),
            Some(Money::from_units(10))
        );
        assert_eq!(Money::from_cents(i64::MAX).checked_multiply(2), None);
        assert_eq!(Money::from_cents(i64::MAX).checked_add(Money::from_cents(1)), None);
    }

    #[test]
    fn test_checked_percent_overflow() {
        assert_eq!(
            Money::from_units(20).checked_percent(18),
            Some(Money::from_cents(360))
        );
        assert_eq!(Money::from_cents(i64::MAX).checked_percent(200), None);
        assert_eq!(
            Money::from_cents(i64::MAX).percent(200),
            Money::from_cents(i64::MAX)
        );
        // fits: percents up to 100 never grow the amount
        assert!(Money::from_cents(i64::MAX).checked_percent(18).is_some());
    }

    #[test]
    fn test_sum() {
        let total: Money = [100, 250, 5].into_iter().map(Money::from_cents).sum();
        assert_eq!(total.cents(), 355);
    }

    #[test]
    fn test_serializes_as_cents() {
        let json = serde_json::to_string(&Money::from_cents(999)).unwrap();
        assert_eq!(json, "999");
    }
}
