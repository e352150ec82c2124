use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Sub};
use std::str::FromStr;

use crate::errors::LedgerError;

/// decimal places kept on every money amount (rupees and paise)
pub const MONEY_DP: u32 = 2;

/// decimal places kept on attendance percentages
pub const PERCENTAGE_DP: u32 = 1;

/// money type with paise-level precision
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub struct Money(Decimal);

impl Money {
    pub const ZERO: Money = Money(Decimal::ZERO);
    pub const PAISA: Money = Money(Decimal::from_parts(1, 0, 0, false, 2));

    /// create from decimal
    pub fn from_decimal(d: Decimal) -> Self {
        Money(d.round_dp(MONEY_DP))
    }

    /// create from string with exact parsing
    pub fn from_str_exact(s: &str) -> Result<Self, rust_decimal::Error> {
        Ok(Money(Decimal::from_str(s.trim())?.round_dp(MONEY_DP)))
    }

    /// create from whole rupees
    pub fn from_major(amount: i64) -> Self {
        Money(Decimal::from(amount))
    }

    /// create from paise
    pub fn from_minor(amount: i64) -> Self {
        Money(Decimal::new(amount, MONEY_DP))
    }

    /// get underlying decimal
    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// strictly greater than zero
    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    pub fn is_negative(&self) -> bool {
        self.0 < Decimal::ZERO
    }

    /// true when the amount carries more precision than paise
    pub fn has_sub_paisa_precision(raw: Decimal) -> bool {
        raw.normalize().scale() > MONEY_DP
    }

    /// multiply by a whole count (e.g. monthly fee times due months)
    pub fn times(&self, count: usize) -> Self {
        Money((self.0 * Decimal::from(count as u64)).round_dp(MONEY_DP))
    }

    /// average over a count, zero when the count is zero
    pub fn average_over(&self, count: usize) -> Self {
        if count == 0 {
            return Money::ZERO;
        }
        Money((self.0 / Decimal::from(count as u64)).round_dp(MONEY_DP))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Money {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Money::from_str_exact(s)
    }
}

impl From<Decimal> for Money {
    fn from(d: Decimal) -> Self {
        Money::from_decimal(d)
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, other: Money) -> Money {
        Money((self.0 + other.0).round_dp(MONEY_DP))
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, other: Money) {
        self.0 = (self.0 + other.0).round_dp(MONEY_DP);
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, other: Money) -> Money {
        Money((self.0 - other.0).round_dp(MONEY_DP))
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, |acc, m| acc + m)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, |acc, m| acc + *m)
    }
}

/// attendance percentage on a 0..=100 scale, one decimal place.
/// deserializing a value outside that range fails instead of clamping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(try_from = "Decimal")]
pub struct Percentage(Decimal);

impl Percentage {
    pub const ZERO: Percentage = Percentage(Decimal::ZERO);
    pub const HUNDRED: Percentage = Percentage(Decimal::ONE_HUNDRED);

    /// create from a value already on the 0..=100 scale, clamped into range
    pub fn from_decimal(d: Decimal) -> Self {
        Percentage(
            d.max(Decimal::ZERO)
                .min(Decimal::ONE_HUNDRED)
                .round_dp(PERCENTAGE_DP),
        )
    }

    /// create from a whole number of percent (e.g. 75 for 75%)
    pub fn from_whole(p: u32) -> Self {
        Percentage::from_decimal(Decimal::from(p))
    }

    /// present / (present + absent) * 100, zero when nothing was counted.
    /// every attendance figure in the crate goes through here.
    pub fn from_counts(present: u32, absent: u32) -> Self {
        let counted = present as u64 + absent as u64;
        if counted == 0 {
            return Percentage::ZERO;
        }
        let ratio = Decimal::from(present) * Decimal::ONE_HUNDRED / Decimal::from(counted);
        Percentage::from_decimal(ratio)
    }

    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    /// strictly below the threshold
    pub fn is_below(&self, threshold: Percentage) -> bool {
        self.0 < threshold.0
    }
}

impl fmt::Display for Percentage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

impl TryFrom<Decimal> for Percentage {
    type Error = LedgerError;

    fn try_from(d: Decimal) -> Result<Self, Self::Error> {
        if d < Decimal::ZERO || d > Decimal::ONE_HUNDRED {
            return Err(LedgerError::InvalidInput {
                message: format!("percentage {} outside 0..=100", d),
            });
        }
        Ok(Percentage::from_decimal(d))
    }
}
