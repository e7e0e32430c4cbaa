//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In floating point:                                                     │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  A day of ₹19.90 coffees summed as floats drifts by fractions of a    │
//! │  paisa, and the report disagrees with the receipts.                    │
//! │                                                                         │
//! │  OUR SOLUTION: Integer minor units (paise)                              │
//! │    1990 paise × 3 = 5970 paise, exactly                                 │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Rounding Lives In Exactly Two Places
//! - [`Money::average_over`] for the report's average order value
//! - [`Money::rounded_major`] for display (`₹250`)
//!
//! Cart totals, order totals and report revenue are never rounded.
//!
//! ## Overflow
//! Addition, subtraction and quantity multiplication saturate at the `i64`
//! bounds. A total past roughly ₹92 quadrillion pins at `i64::MAX` instead
//! of wrapping or panicking.
//!
//! ## Usage
//! ```rust
//! use bistro_core::money::Money;
//!
//! let price = Money::from_minor(32050); // ₹320.50
//! let line = price * 2;                 // ₹641.00
//! assert_eq!(line.minor(), 64100);
//! assert_eq!(line.rounded_major(), 641);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use ts_rs::TS;

/// Number of minor units in one major unit (paise per rupee).
pub const MINOR_PER_MAJOR: i64 = 100;

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in the smallest currency unit.
///
/// ## Design Decisions
/// - **i64 (signed)**: differences between totals can go negative
/// - **Single field tuple struct**: zero-cost abstraction over i64
/// - **Serde transparent**: stored as a plain integer in every record
///
/// ## Where Money Flows
/// ```text
/// MenuItem.price ──► CartLine.price ──► OrderItem.price
///                         │                    │
///                         ▼                    ▼
///                 Cart::total()          Order.total ──► SalesReport
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[serde(transparent)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from minor units (paise).
    #[inline]
    pub const fn from_minor(minor: i64) -> Self {
        Money(minor)
    }

    /// Creates a Money value from whole major units (rupees).
    ///
    /// ## Example
    /// ```rust
    /// use bistro_core::money::Money;
    ///
    /// assert_eq!(Money::from_major(399).minor(), 39900);
    /// ```
    #[inline]
    pub const fn from_major(major: i64) -> Self {
        Money(major.saturating_mul(MINOR_PER_MAJOR))
    }

    /// Returns the value in minor units.
    #[inline]
    pub const fn minor(&self) -> i64 {
        self.0
    }

    /// Returns the whole major units, truncated toward zero.
    #[inline]
    pub const fn major(&self) -> i64 {
        self.0 / MINOR_PER_MAJOR
    }

    /// Returns the minor-unit remainder (always 0-99).
    #[inline]
    pub const fn minor_part(&self) -> i64 {
        (self.0 % MINOR_PER_MAJOR).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Multiplies money by a line quantity.
    ///
    /// ## Example
    /// ```rust
    /// use bistro_core::money::Money;
    ///
    /// let unit_price = Money::from_major(150); // Cheesy Fries
    /// assert_eq!(unit_price.multiply_quantity(5), Money::from_major(750));
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: u32) -> Self {
        Money(self.0.saturating_mul(qty as i64))
    }

    /// Divides a total evenly over `count` parts, rounding half away from
    /// zero to the nearest minor unit.
    ///
    /// Returns zero when `count` is zero, so an empty month has an average
    /// order value of zero instead of an error.
    ///
    /// ## Example
    /// ```rust
    /// use bistro_core::money::Money;
    ///
    /// assert_eq!(Money::from_major(300).average_over(2), Money::from_major(150));
    /// assert_eq!(Money::from_minor(100).average_over(3), Money::from_minor(33));
    /// assert_eq!(Money::from_minor(200).average_over(3), Money::from_minor(67));
    /// assert_eq!(Money::from_major(300).average_over(0), Money::zero());
    /// ```
    pub fn average_over(&self, count: usize) -> Money {
        if count == 0 {
            return Money::zero();
        }
        // i128 so that the doubling below cannot overflow
        let total = self.0 as i128;
        let count = count as i128;
        let magnitude = (total.abs() * 2 + count) / (count * 2);
        let signed = if total < 0 { -magnitude } else { magnitude };
        Money(signed as i64)
    }

    /// Rounds to the nearest whole major unit for display.
    ///
    /// Halves round toward positive infinity, matching what the counter
    /// screens have always shown (`₹320.50` displays as `₹321`).
    ///
    /// ## Example
    /// ```rust
    /// use bistro_core::money::Money;
    ///
    /// assert_eq!(Money::from_minor(32050).rounded_major(), 321);
    /// assert_eq!(Money::from_minor(32049).rounded_major(), 320);
    /// assert_eq!(Money::from_minor(-150).rounded_major(), -1);
    /// ```
    #[inline]
    pub const fn rounded_major(&self) -> i64 {
        // i128 so that adding the half cannot overflow near i64::MAX
        let per_major = MINOR_PER_MAJOR as i128;
        ((self.0 as i128 + per_major / 2).div_euclid(per_major)) as i64
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display shows the exact amount with two decimals.
///
/// ## Note
/// This is for logs and debugging. Operator-facing amounts go through
/// [`crate::display::format_currency`], which rounds to whole units.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{}.{:02}", sign, self.major().abs(), self.minor_part())
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
        Money(self.0.saturating_add(other.0))
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_add(other.0);
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0.saturating_sub(other.0))
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_sub(other.0);
    }
}

/// Multiplication by a line quantity.
impl Mul<u32> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: u32) -> Self {
        self.multiply_quantity(qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
