//! # Money and Quantity
//!
//! Fixed-point types for the two measured values in the system: rupee amounts
//! and fruit weights.
//!
//! ## Why Integer Arithmetic?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In floating point:                                                     │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  OUR SOLUTION: integer paise and integer grams                         │
//! │    ₹450.00 = 45000 paise                                               │
//! │    5.00 kg = 5000 grams                                                │
//! │    line total = 45000 × 5000 / 1000 = 225000 paise = ₹2250.00  ✓       │
//! │                                                                         │
//! │  The database, calculations, and API all use the integer units.        │
//! │  Both types serialize as two-decimal strings at the boundary.          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::ops::{Add, AddAssign, Sub, SubAssign};
use std::str::FromStr;
use thiserror::Error;

/// Failure to parse a decimal string into a fixed-point value.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid decimal amount: {0}")]
pub struct ParseAmountError(String);

/// Parses a decimal string into an integer scaled by 10^scale.
///
/// Accepts "450", "450.5", "450.00"; rejects empty input, stray characters,
/// and more fractional digits than the scale allows.
fn parse_fixed(input: &str, scale: u32, allow_negative: bool) -> Result<i64, ParseAmountError> {
    let raw = input.trim();
    let err = || ParseAmountError(input.to_string());

    let (negative, digits) = match raw.strip_prefix('-') {
        Some(rest) if allow_negative => (true, rest),
        Some(_) => return Err(err()),
        None => (false, raw),
    };

    let (int_part, frac_part) = match digits.split_once('.') {
        Some((i, f)) => (i, f),
        None => (digits, ""),
    };

    if int_part.is_empty() && frac_part.is_empty() {
        return Err(err());
    }
    if !int_part.chars().all(|c| c.is_ascii_digit()) {
        return Err(err());
    }
    if frac_part.len() > scale as usize || !frac_part.chars().all(|c| c.is_ascii_digit()) {
        return Err(err());
    }

    let unit = 10i64.pow(scale);
    let whole: i64 = if int_part.is_empty() {
        0
    } else {
        int_part.parse().map_err(|_| err())?
    };

    // Right-pad the fraction to the full scale: "5" at scale 3 means 500.
    let mut frac: i64 = 0;
    if !frac_part.is_empty() {
        frac = frac_part.parse().map_err(|_| err())?;
        frac *= 10i64.pow(scale - frac_part.len() as u32);
    }

    let value = whole.checked_mul(unit).and_then(|v| v.checked_add(frac)).ok_or_else(err)?;
    Ok(if negative { -value } else { value })
}

// =============================================================================
// Money
// =============================================================================

/// A monetary value in paise (1/100 rupee).
///
/// ## Design Decisions
/// - **i64 (signed)**: headroom for aggregate totals, and refund math if it
///   ever arrives
/// - **Single field tuple struct**: zero-cost abstraction over i64
/// - **String serde**: serialized as a two-decimal string ("450.00") so JSON
///   consumers never see the internal unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(transparent))]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from paise (the smallest currency unit).
    #[inline]
    pub const fn from_paise(paise: i64) -> Self {
        Money(paise)
    }

    /// Creates a Money value from whole rupees.
    ///
    /// ## Example
    /// ```rust
    /// use orchard_core::money::Money;
    ///
    /// assert_eq!(Money::from_rupees(450).paise(), 45_000);
    /// ```
    #[inline]
    pub const fn from_rupees(rupees: i64) -> Self {
        Money(rupees * 100)
    }

    /// Returns the value in paise.
    #[inline]
    pub const fn paise(&self) -> i64 {
        self.0
    }

    /// Zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is strictly positive.
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Multiplies a unit price by a weight, producing a line total.
    ///
    /// ## Implementation
    /// paise × grams is scaled back by /1000 (grams per kilogram) using
    /// round-half-up integer math in i128, so a 9-digit price times a 7-digit
    /// weight cannot overflow. Exact whenever the product divides evenly,
    /// which covers every price at 10-paise resolution.
    ///
    /// ## Example
    /// ```rust
    /// use orchard_core::money::{Money, Quantity};
    ///
    /// let unit_price = Money::from_rupees(450);      // per kg
    /// let quantity = Quantity::from_grams(5_000);    // 5 kg
    /// assert_eq!(unit_price.times(quantity).paise(), 225_000); // ₹2250.00
    /// ```
    pub fn times(&self, quantity: Quantity) -> Money {
        let product = self.0 as i128 * quantity.grams() as i128;
        Money(((product + 500) / 1000) as i64)
    }
}

impl fmt::Display for Money {
    /// Formats as a plain two-decimal string, e.g. "450.00".
    ///
    /// This is also the serialized wire form, so no currency symbol here.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{}.{:02}", sign, (self.0 / 100).abs(), (self.0 % 100).abs())
    }
}

impl FromStr for Money {
    type Err = ParseAmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_fixed(s, 2, true).map(Money)
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
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

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(D::Error::custom)
    }
}

// =============================================================================
// Quantity
// =============================================================================

/// A fruit weight in grams.
///
/// Mirrors [`Money`]: integer internal unit, decimal-kilogram wire form.
/// Quantities are never negative; parsing rejects a leading minus outright.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(transparent))]
pub struct Quantity(i64);

impl Quantity {
    /// Creates a quantity from grams.
    #[inline]
    pub const fn from_grams(grams: i64) -> Self {
        Quantity(grams)
    }

    /// Creates a quantity from whole kilograms.
    #[inline]
    pub const fn from_kg(kg: i64) -> Self {
        Quantity(kg * 1000)
    }

    /// Returns the weight in grams.
    #[inline]
    pub const fn grams(&self) -> i64 {
        self.0
    }

    /// Zero quantity.
    #[inline]
    pub const fn zero() -> Self {
        Quantity(0)
    }

    /// Checks if the quantity is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the quantity is strictly positive.
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }
}

impl fmt::Display for Quantity {
    /// Formats in kilograms: "5.00", or "2.505" when gram precision is used.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 % 10 == 0 {
            write!(f, "{}.{:02}", self.0 / 1000, (self.0 % 1000) / 10)
        } else {
            write!(f, "{}.{:03}", self.0 / 1000, self.0 % 1000)
        }
    }
}

impl FromStr for Quantity {
    type Err = ParseAmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_fixed(s, 3, false).map(Quantity)
    }
}

impl Default for Quantity {
    fn default() -> Self {
        Quantity::zero()
    }
}

impl Add for Quantity {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Quantity(self.0 + other.0)
    }
}

impl AddAssign for Quantity {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Quantity {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Quantity(self.0 - other.0)
    }
}

impl Serialize for Quantity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Quantity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(D::Error::custom)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_paise_and_rupees() {
        assert_eq!(Money::from_paise(45_000).paise(), 45_000);
        assert_eq!(Money::from_rupees(450), Money::from_paise(45_000));
    }

    #[test]
    fn test_money_display() {
        assert_eq!(Money::from_paise(45_000).to_string(), "450.00");
        assert_eq!(Money::from_paise(45_050).to_string(), "450.50");
        assert_eq!(Money::from_paise(5).to_string(), "0.05");
        assert_eq!(Money::from_paise(-550).to_string(), "-5.50");
        assert_eq!(Money::zero().to_string(), "0.00");
    }

    #[test]
    fn test_money_parse() {
        assert_eq!("450".parse::<Money>().unwrap(), Money::from_rupees(450));
        assert_eq!("450.5".parse::<Money>().unwrap(), Money::from_paise(45_050));
        assert_eq!("450.00".parse::<Money>().unwrap(), Money::from_paise(45_000));
        assert_eq!("-5.50".parse::<Money>().unwrap(), Money::from_paise(-550));
        assert_eq!(".50".parse::<Money>().unwrap(), Money::from_paise(50));

        assert!("".parse::<Money>().is_err());
        assert!("abc".parse::<Money>().is_err());
        assert!("1.234".parse::<Money>().is_err()); // too many decimals
        assert!("1,50".parse::<Money>().is_err());
    }

    #[test]
    fn test_money_serde_round_trip() {
        let price = Money::from_paise(45_000);
        let json = serde_json::to_string(&price).unwrap();
        assert_eq!(json, "\"450.00\"");
        let back: Money = serde_json::from_str(&json).unwrap();
        assert_eq!(back, price);
    }

    #[test]
    fn test_money_arithmetic() {
        let a = Money::from_paise(1000);
        let b = Money::from_paise(500);
        assert_eq!((a + b).paise(), 1500);
        assert_eq!((a - b).paise(), 500);

        let mut total = Money::zero();
        total += a;
        total += b;
        assert_eq!(total.paise(), 1500);
    }

    #[test]
    fn test_line_total() {
        // 5 kg at ₹450.00/kg = ₹2250.00
        let total = Money::from_rupees(450).times(Quantity::from_kg(5));
        assert_eq!(total.paise(), 225_000);

        // 2.5 kg at ₹120.00/kg = ₹300.00
        let total = Money::from_rupees(120).times(Quantity::from_grams(2_500));
        assert_eq!(total.paise(), 30_000);

        // Rounding case: 1 gram at 1 paise/kg rounds to zero paise
        let total = Money::from_paise(1).times(Quantity::from_grams(1));
        assert_eq!(total.paise(), 0);
    }

    #[test]
    fn test_quantity_display() {
        assert_eq!(Quantity::from_kg(5).to_string(), "5.00");
        assert_eq!(Quantity::from_grams(2_500).to_string(), "2.50");
        assert_eq!(Quantity::from_grams(2_505).to_string(), "2.505");
        assert_eq!(Quantity::zero().to_string(), "0.00");
    }

    #[test]
    fn test_quantity_parse() {
        assert_eq!("5".parse::<Quantity>().unwrap(), Quantity::from_kg(5));
        assert_eq!("2.5".parse::<Quantity>().unwrap(), Quantity::from_grams(2_500));
        assert_eq!("2.505".parse::<Quantity>().unwrap(), Quantity::from_grams(2_505));

        assert!("-1".parse::<Quantity>().is_err()); // negative weight
        assert!("1.2345".parse::<Quantity>().is_err()); // below gram resolution
        assert!("".parse::<Quantity>().is_err());
    }

    #[test]
    fn test_quantity_serde_round_trip() {
        let qty = Quantity::from_grams(3_000);
        let json = serde_json::to_string(&qty).unwrap();
        assert_eq!(json, "\"3.00\"");
        let back: Quantity = serde_json::from_str(&json).unwrap();
        assert_eq!(back, qty);
    }

    #[test]
    fn test_quantity_ordering() {
        assert!(Quantity::from_grams(5_000) < Quantity::from_grams(6_000));
        assert!(Quantity::from_kg(3) >= Quantity::from_grams(3_000));
    }
}
