//! # Validation Module
//!
//! Field parsers used while folding over source rows.
//!
//! ## Parsing Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Per-Record Parsing                                 │
//! │                                                                         │
//! │  raw cell (Option<String>)                                              │
//! │       │                                                                 │
//! │       ├── missing / empty? ──► ValidationError::Required                │
//! │       │                                                                 │
//! │       ├── not a number?    ──► ValidationError::InvalidFormat           │
//! │       │                                                                 │
//! │       └── out of domain?   ──► Negative / MustBePositive                │
//! │                                                                         │
//! │  Every failure is attached to its row (RecordError) by the caller,      │
//! │  logged, and the row is skipped. Nothing here aborts a run.             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::error::ValidationError;
use crate::money::Money;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Presence
// =============================================================================

/// Returns the cell value, or `Required` when it is missing or empty.
///
/// ```rust
/// use recovery_core::validation::require;
///
/// let cell = Some("P1".to_string());
/// assert_eq!(require("producto_id", &cell).unwrap(), "P1");
/// assert!(require("producto_id", &None).is_err());
/// ```
pub fn require<'a>(field: &str, value: &'a Option<String>) -> ValidationResult<&'a str> {
    match value.as_deref() {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(ValidationError::required(field)),
    }
}

// =============================================================================
// Numbers
// =============================================================================

/// Parses decimal text, accepting plain (`-3.50`) and scientific (`2.5e2`) forms.
fn parse_decimal(field: &str, raw: &str) -> ValidationResult<Decimal> {
    let text = raw.trim();
    Decimal::from_str(text)
        .or_else(|_| Decimal::from_scientific(text))
        .map_err(|_| ValidationError::invalid_format(field, raw, "not a number"))
}

/// Parses a unit sale price.
///
/// ## Rules
/// - Must be a decimal number
/// - Must not be negative (zero is allowed)
/// - Kept exactly as written, no rounding
///
/// ```rust
/// use recovery_core::validation::parse_price;
///
/// assert_eq!(parse_price("precio_venta", "10.0").unwrap().to_string(), "10.00");
/// assert_eq!(parse_price("precio_venta", "0.333").unwrap().to_string(), "0.333");
/// assert!(parse_price("precio_venta", "-1").is_err());
/// assert!(parse_price("precio_venta", "abc").is_err());
/// ```
pub fn parse_price(field: &str, raw: &str) -> ValidationResult<Money> {
    let price: Money = raw
        .parse()
        .map_err(|_| ValidationError::invalid_format(field, raw, "not a number"))?;

    if price.is_negative() {
        return Err(ValidationError::Negative {
            field: field.to_string(),
            value: raw.to_string(),
        });
    }

    Ok(price)
}

/// Parses a stock delta into a sold quantity.
///
/// ## Rules
/// ```text
/// "-3"   ──► 3     magnitude of the delta
/// "-2.7" ──► 2     truncated toward zero
/// "4"    ──► 4     sign is ignored
/// "-0.5" ──► error truncates to zero, and a line needs a positive quantity
/// ```
pub fn parse_quantity(field: &str, raw: &str) -> ValidationResult<i64> {
    let delta = parse_decimal(field, raw)?;

    let quantity = delta
        .trunc()
        .abs()
        .to_i64()
        .ok_or_else(|| ValidationError::invalid_format(field, raw, "quantity too large"))?;

    if quantity == 0 {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
            value: raw.to_string(),
        });
    }

    Ok(quantity)
}

// =============================================================================
// Timestamps
// =============================================================================

/// Checks whether a timestamp is in an ISO-8601 form whose string order
/// matches its chronological order.
///
/// Accepted: RFC 3339 (`2024-01-01T10:00:00Z`), `YYYY-MM-DD HH:MM:SS[.f]`,
/// `YYYY-MM-DDTHH:MM:SS[.f]`, and bare `YYYY-MM-DD` dates.
///
/// ```rust
/// use recovery_core::validation::is_iso_timestamp;
///
/// assert!(is_iso_timestamp("2024-01-02"));
/// assert!(is_iso_timestamp("2024-01-02 10:30:00.123+00"));
/// assert!(!is_iso_timestamp("02/01/2024"));
/// assert!(!is_iso_timestamp("now()"));
/// ```
pub fn is_iso_timestamp(value: &str) -> bool {
    DateTime::parse_from_rfc3339(value).is_ok()
        || DateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%.f%#z").is_ok()
        || NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%.f").is_ok()
        || NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f").is_ok()
        || NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require() {
        assert_eq!(require("id", &Some("P1".to_string())).unwrap(), "P1");
        assert_eq!(
            require("id", &Some(String::new())),
            Err(ValidationError::required("id"))
        );
        assert_eq!(require("id", &None), Err(ValidationError::required("id")));
    }

    #[test]
    fn test_parse_price() {
        let price = |raw: &str| parse_price("p", raw).unwrap().to_string();

        assert_eq!(price("10.0"), "10.00");
        assert_eq!(price(" 2.5 "), "2.50");
        assert_eq!(price("0"), "0.00");
        assert_eq!(price("-0"), "0.00");
        assert_eq!(price("3.335"), "3.335");
        assert_eq!(price("1234.5678"), "1234.5678");

        assert!(matches!(
            parse_price("p", "-1.5"),
            Err(ValidationError::Negative { .. })
        ));
        assert!(matches!(
            parse_price("p", "abc"),
            Err(ValidationError::InvalidFormat { .. })
        ));
        assert!(parse_price("p", "").is_err());
    }

    #[test]
    fn test_parse_quantity() {
        assert_eq!(parse_quantity("q", "-3").unwrap(), 3);
        assert_eq!(parse_quantity("q", "-2.7").unwrap(), 2);
        assert_eq!(parse_quantity("q", "4").unwrap(), 4);
        assert_eq!(parse_quantity("q", "-3.0").unwrap(), 3);

        assert!(matches!(
            parse_quantity("q", "0"),
            Err(ValidationError::MustBePositive { .. })
        ));
        assert!(matches!(
            parse_quantity("q", "-0.5"),
            Err(ValidationError::MustBePositive { .. })
        ));
        assert!(matches!(
            parse_quantity("q", "tres"),
            Err(ValidationError::InvalidFormat { .. })
        ));
    }

    #[test]
    fn test_is_iso_timestamp() {
        assert!(is_iso_timestamp("2024-01-01"));
        assert!(is_iso_timestamp("2024-01-01T10:00:00Z"));
        assert!(is_iso_timestamp("2024-01-01T10:00:00"));
        assert!(is_iso_timestamp("2024-01-01 10:00:00"));
        assert!(is_iso_timestamp("2024-01-01 10:00:00.5+00"));

        assert!(!is_iso_timestamp("1/2/2024"));
        assert!(!is_iso_timestamp(""));
        assert!(!is_iso_timestamp("now()"));
    }
}
