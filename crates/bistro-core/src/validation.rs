//! # Validation Module
//!
//! Input validation for menu management and report selection.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: CLI argument parsing                                         │
//! │  ├── Arity checks (missing arguments)                                  │
//! │  └── Immediate usage feedback                                          │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── Menu item name / price / image rules                              │
//! │  └── Report month range                                                │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Menu / Cart / Ledger                                         │
//! │  └── Structural invariants (unique ids, quantity ≥ 1)                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use bistro_core::validation::{parse_price, validate_item_name};
//!
//! validate_item_name("Pesto Pasta").unwrap();
//! assert_eq!(parse_price("320.50").unwrap().minor(), 32050);
//! ```

use crate::error::ValidationError;
use crate::money::{Money, MINOR_PER_MAJOR};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Longest menu item name accepted.
pub const MAX_ITEM_NAME_LEN: usize = 100;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a menu item name.
///
/// ## Rules
/// - Must not be empty (after trimming)
/// - At most [`MAX_ITEM_NAME_LEN`] characters
///
/// ## Example
/// ```rust
/// use bistro_core::validation::validate_item_name;
///
/// assert!(validate_item_name("Choco Lava").is_ok());
/// assert!(validate_item_name("   ").is_err());
/// ```
pub fn validate_item_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.chars().count() > MAX_ITEM_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: MAX_ITEM_NAME_LEN,
        });
    }

    Ok(())
}

/// Validates a menu item image URI. Only emptiness is rejected; the
/// rendering layer falls back to a placeholder for broken images.
pub fn validate_image(image: &str) -> ValidationResult<()> {
    if image.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "image".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a menu price.
///
/// ## Rules
/// - Must be non-negative (>= 0)
/// - Zero is allowed (complimentary items)
pub fn validate_price(price: Money) -> ValidationResult<()> {
    if price.is_negative() {
        return Err(ValidationError::MustBeNonNegative {
            field: "price".to_string(),
        });
    }

    Ok(())
}

/// Parses a price typed by the operator into [`Money`].
///
/// ## Rules
/// - Digits with an optional decimal point and at most two decimals
/// - Negative prices are rejected
///
/// ## Example
/// ```rust
/// use bistro_core::validation::parse_price;
///
/// assert_eq!(parse_price("399").unwrap().minor(), 39900);
/// assert_eq!(parse_price("12.5").unwrap().minor(), 1250);
/// assert!(parse_price("-3").is_err());
/// assert!(parse_price("1.234").is_err());
/// ```
pub fn parse_price(input: &str) -> ValidationResult<Money> {
    let input = input.trim();

    if input.is_empty() {
        return Err(ValidationError::Required {
            field: "price".to_string(),
        });
    }

    if input.starts_with('-') {
        return Err(ValidationError::MustBeNonNegative {
            field: "price".to_string(),
        });
    }

    let invalid = |reason: &str| ValidationError::InvalidFormat {
        field: "price".to_string(),
        reason: reason.to_string(),
    };

    let (whole, fraction) = match input.split_once('.') {
        Some((whole, fraction)) => (whole, fraction),
        None => (input, ""),
    };

    if whole.is_empty() && fraction.is_empty() {
        return Err(invalid("expected a number like 320 or 320.50"));
    }
    if !whole.chars().all(|c| c.is_ascii_digit()) || !fraction.chars().all(|c| c.is_ascii_digit())
    {
        return Err(invalid("expected a number like 320 or 320.50"));
    }
    if fraction.len() > 2 {
        return Err(invalid("at most two decimal places"));
    }

    let major: i64 = if whole.is_empty() {
        0
    } else {
        whole.parse().map_err(|_| invalid("amount is too large"))?
    };
    // "5" → 50 paise, "05" → 5 paise
    let minor: i64 = match fraction.len() {
        0 => 0,
        1 => fraction.parse::<i64>().map_err(|_| invalid("bad decimals"))? * 10,
        _ => fraction.parse().map_err(|_| invalid("bad decimals"))?,
    };

    major
        .checked_mul(MINOR_PER_MAJOR)
        .and_then(|m| m.checked_add(minor))
        .map(Money::from_minor)
        .ok_or_else(|| invalid("amount is too large"))
}

/// Validates a 1-indexed calendar month.
pub fn validate_month(month: u32) -> ValidationResult<()> {
    if !(1..=12).contains(&month) {
        return Err(ValidationError::OutOfRange {
            field: "month".to_string(),
            min: 1,
            max: 12,
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_item_name() {
        assert!(validate_item_name("Mini Margherita").is_ok());
        assert!(validate_item_name("").is_err());
        assert!(validate_item_name("   ").is_err());
        assert!(validate_item_name(&"A".repeat(101)).is_err());
        assert!(validate_item_name(&"A".repeat(100)).is_ok());
    }

    #[test]
    fn test_validate_image() {
        assert!(validate_image("https://images.example.com/rice.jpg").is_ok());
        assert!(validate_image("").is_err());
    }

    #[test]
    fn test_validate_price() {
        assert!(validate_price(Money::zero()).is_ok());
        assert!(validate_price(Money::from_major(399)).is_ok());
        assert!(validate_price(Money::from_minor(-1)).is_err());
    }

    #[test]
    fn test_parse_price() {
        assert_eq!(parse_price("0").unwrap(), Money::zero());
        assert_eq!(parse_price(" 220 ").unwrap(), Money::from_major(220));
        assert_eq!(parse_price("19.05").unwrap(), Money::from_minor(1905));
        assert_eq!(parse_price(".5").unwrap(), Money::from_minor(50));
        assert_eq!(parse_price("7.").unwrap(), Money::from_major(7));

        assert!(parse_price("").is_err());
        assert!(parse_price(".").is_err());
        assert!(parse_price("abc").is_err());
        assert!(parse_price("1e3").is_err());
        assert!(parse_price("-0.5").is_err());
        assert!(parse_price("99999999999999999999").is_err());
    }

    #[test]
    fn test_validate_month() {
        assert!(validate_month(1).is_ok());
        assert!(validate_month(12).is_ok());
        assert!(validate_month(0).is_err());
        assert!(validate_month(13).is_err());
    }
}
