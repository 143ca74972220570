//! # Money Module
//!
//! Provides the `Money` type for prices and invoice totals.
//!
//! ## Why Decimal Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  Summing recovered lines as floats:                                     │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ ends up in the import file       │
//! │                                                                         │
//! │  OUR SOLUTION: Exact Decimals                                           │
//! │    Prices keep every digit of precio_venta (0.333 stays 0.333).         │
//! │    Line totals and invoice totals are exact decimal math, checked       │
//! │    for overflow instead of wrapping or panicking.                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use recovery_core::money::Money;
//!
//! let price: Money = "10.0".parse().unwrap();
//! let line_total = price.checked_mul_quantity(3).unwrap();
//! assert_eq!(line_total.to_string(), "30.00");
//!
//! let price: Money = "0.333".parse().unwrap();
//! assert_eq!(price.checked_mul_quantity(3).unwrap().to_string(), "0.999");
//! ```

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Serialize, Serializer};

/// Fewest decimal places written for a monetary value.
const MIN_PLACES: u32 = 2;

// =============================================================================
// Money Type
// =============================================================================

/// An exact monetary value.
///
/// ## Where Money is Used
/// ```text
/// productos.precio_venta ──► ProductIndex ──► line.precio_unitario
///                                                   │ × cantidad
///                                                   ▼
///                                            line.precio_total
///                                                   │ Σ per factura_uuid
///                                                   ▼
///                                     invoice.subtotal == invoice.total
/// ```
///
/// Equality is by value: `10.0` and `10.00` are the same amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Money(Decimal);

impl Money {
    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(Decimal::ZERO)
    }

    /// True for amounts below zero. `-0` is not negative.
    pub fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    /// Multiplies a unit price by a quantity.
    ///
    /// Returns `None` when the product is out of range.
    ///
    /// ```rust
    /// use recovery_core::money::Money;
    ///
    /// let unit_price: Money = "2.99".parse().unwrap();
    /// assert_eq!(unit_price.checked_mul_quantity(3).unwrap().to_string(), "8.97");
    /// ```
    pub fn checked_mul_quantity(&self, qty: i64) -> Option<Self> {
        self.0.checked_mul(Decimal::from(qty)).map(Money)
    }

    /// Adds two amounts. Returns `None` when the sum is out of range.
    pub fn checked_add(&self, other: Money) -> Option<Self> {
        self.0.checked_add(other.0).map(Money)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Parses plain (`10.50`) or scientific (`1.05e1`) decimal text.
impl FromStr for Money {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        Decimal::from_str(text)
            .or_else(|_| Decimal::from_scientific(text))
            .map(Money)
    }
}

/// Plain decimal rendering with at least two places: `30.00`, `0.999`.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut amount = self.0.normalize();
        if amount.scale() < MIN_PLACES {
            amount.rescale(MIN_PLACES);
        }
        write!(f, "{}", amount)
    }
}

/// Serializes as the display string so CSV cells read `30.00`.
impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
