//! # Money Module
//!
//! Provides the `Money` type for NAFL amounts.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  The backend speaks JSON numbers:                                      │
//! │    balance 0.3, expense 0.1 + 0.2 = 0.30000000000000004  ❌            │
//! │    → "exceeds your balance" on an exact spend                          │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    Convert once at the edge (JSON / operator input)                    │
//! │    Compare and sum in i64 cents everywhere else                        │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use norsa_core::money::Money;
//!
//! let balance = Money::from_cents(3000);
//! let expense: Money = "12.5".parse().unwrap();
//!
//! assert!(expense <= balance);
//! assert_eq!((balance - expense).to_string(), "17.50");
//! assert_eq!(expense.with_currency("NAFL"), "NAFL 12.50");
//! ```

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};
use std::str::FromStr;

use crate::error::ValidationError;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in cents.
///
/// ## Design Decisions
/// - **i64 (signed)**: daily totals go negative when retours dominate
/// - **Decimal on the wire**: serialises as a JSON number in major units,
///   deserialises from a number or a numeric string
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents.
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from whole guilders.
    #[inline]
    pub const fn from_major(major: i64) -> Self {
        Money(major * 100)
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// Renders the amount prefixed with a currency label: `NAFL 12.50`.
    pub fn with_currency(&self, currency: &str) -> String {
        format!("{} {}", currency, self)
    }

    /// Converts a decimal number in major units, rounding to the nearest cent.
    ///
    /// Only used at the JSON edge. Returns `None` for NaN and infinities.
    pub fn from_major_f64(value: f64) -> Option<Self> {
        if !value.is_finite() {
            return None;
        }
        let cents = (value * 100.0).round();
        if cents.abs() > i64::MAX as f64 {
            return None;
        }
        Some(Money(cents as i64))
    }

    /// The amount in major units as a float, for JSON output.
    pub fn as_major_f64(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Parses operator input such as `12`, `12.5`, `12.50` or `.5`.
    ///
    /// ## Rules
    /// ```text
    /// ""        → AmountEmpty
    /// "12a"     → AmountNotNumeric
    /// "1.2.3"   → AmountNotNumeric
    /// "-3"      → AmountNotNumeric (sign is not an operator input)
    /// "1.234"   → AmountTooPrecise
    /// "12.5"    → 1250 cents
    /// ```
    pub fn parse_amount(input: &str) -> Result<Self, ValidationError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(ValidationError::AmountEmpty);
        }

        let (whole, fraction) = match input.split_once('.') {
            Some((whole, fraction)) => (whole, Some(fraction)),
            None => (input, None),
        };

        let digits_only = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
        if !digits_only(whole) {
            return Err(ValidationError::AmountNotNumeric);
        }

        let fraction_cents = match fraction {
            None => 0,
            Some(f) => {
                if f.is_empty() || !digits_only(f) {
                    return Err(ValidationError::AmountNotNumeric);
                }
                if f.len() > 2 {
                    return Err(ValidationError::AmountTooPrecise);
                }
                let value: i64 = f.parse().map_err(|_| ValidationError::AmountNotNumeric)?;
                if f.len() == 1 {
                    value * 10
                } else {
                    value
                }
            }
        };

        let whole_units: i64 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| ValidationError::AmountNotNumeric)?
        };

        whole_units
            .checked_mul(100)
            .and_then(|c| c.checked_add(fraction_cents))
            .map(Money)
            .ok_or(ValidationError::AmountNotNumeric)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Plain decimal with two places and no currency: `-4.05`.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{}{}.{:02}", sign, abs / 100, abs % 100)
    }
}

impl FromStr for Money {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Money::parse_amount(s)
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Neg for Money {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Money(-self.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

// =============================================================================
// Serde
// =============================================================================

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.0 % 100 == 0 {
            serializer.serialize_i64(self.0 / 100)
        } else {
            serializer.serialize_f64(self.as_major_f64())
        }
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(MoneyVisitor)
    }
}

struct MoneyVisitor;

impl<'de> Visitor<'de> for MoneyVisitor {
    type Value = Money;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an amount as a number or numeric string")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Money, E> {
        v.checked_mul(100)
            .map(Money)
            .ok_or_else(|| E::custom("amount out of range"))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Money, E> {
        i64::try_from(v)
            .map_err(|_| E::custom("amount out of range"))
            .and_then(|v| self.visit_i64(v))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Money, E> {
        Money::from_major_f64(v).ok_or_else(|| E::custom("amount is not a finite number"))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Money, E> {
        let trimmed = v.trim();
        let parsed: f64 = trimmed
            .parse()
            .map_err(|_| E::custom(format!("amount '{}' is not numeric", v)))?;
        self.visit_f64(parsed)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
