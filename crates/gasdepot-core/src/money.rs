//! # Money Module
//!
//! The `Money` type used for every amount the engine touches: unit prices,
//! line subtotals, charged/paid/due amounts and balance deltas.
//!
//! ## Integer Minor Units
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Every amount is an i64 count of the smallest currency unit.            │
//! │                                                                         │
//! │    unitPrice 1500 × quantity 2  = 3000      (exact, no rounding)        │
//! │    finalAmount 3000 - paid 500  = 2500 due  (exact)                     │
//! │                                                                         │
//! │  Balance deltas are summed by the database; integer addition commutes,  │
//! │  so concurrent terminals produce the same total in any commit order.    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Arithmetic used on request input goes through the `checked_*` methods so a
//! hostile quantity/price pair surfaces as an error instead of wrapping.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};
use ts_rs::TS;

/// A monetary value in minor units. Signed: balance deltas may be negative.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize, TS,
)]
#[serde(transparent)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from minor units.
    ///
    /// ## Example
    /// ```rust
    /// use gasdepot_core::money::Money;
    ///
    /// let price = Money::from_minor(1500);
    /// assert_eq!(price.minor(), 1500);
    /// ```
    #[inline]
    pub const fn from_minor(minor: i64) -> Self {
        Money(minor)
    }

    /// Returns the value in minor units.
    #[inline]
    pub const fn minor(&self) -> i64 {
        self.0
    }

    /// Zero.
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

    /// Line subtotal: `self × quantity`, or `None` on overflow.
    ///
    /// ## Example
    /// ```rust
    /// use gasdepot_core::money::Money;
    ///
    /// let subtotal = Money::from_minor(1500).checked_line_total(2);
    /// assert_eq!(subtotal, Some(Money::from_minor(3000)));
    /// assert_eq!(Money::from_minor(i64::MAX).checked_line_total(2), None);
    /// ```
    #[inline]
    pub fn checked_line_total(&self, quantity: i64) -> Option<Self> {
        self.0.checked_mul(quantity).map(Money)
    }

    /// Checked addition.
    #[inline]
    pub fn checked_add(&self, other: Money) -> Option<Self> {
        self.0.checked_add(other.0).map(Money)
    }

    /// Checked subtraction.
    #[inline]
    pub fn checked_sub(&self, other: Money) -> Option<Self> {
        self.0.checked_sub(other.0).map(Money)
    }
}

/// Renders `major.minor` with two minor digits, e.g. `15.00`, `-5.50`.
///
/// Currency symbols are a receipt-rendering concern and are not added here.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{}{}.{:02}", sign, abs / 100, abs % 100)
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
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

impl From<i64> for Money {
    fn from(minor: i64) -> Self {
        Money(minor)
    }
}
