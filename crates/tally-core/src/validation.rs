//! # Validation Module
//!
//! Coerces raw form strings into domain values.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Browser                                                      │
//! │  └── `required` / `type=number` attributes on the form                 │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── trim + required checks                                            │
//! │  ├── decimal → Money, text → quantity, text → NaiveDate                │
//! │  └── sign checks                                                       │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: SQLite                                                       │
//! │  ├── NOT NULL / CHECK constraints                                      │
//! │  └── UNIQUE(items.name)                                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Checks stop at type coercion and required fields; there are no business
//! limits on names or amounts beyond what the store can hold.

use chrono::NaiveDate;

use crate::error::ValidationError;
use crate::money::{Money, ParseMoneyError};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Longest accepted search term.
pub const MAX_SEARCH_LEN: usize = 100;

// =============================================================================
// Text
// =============================================================================

/// Trims `value` and requires it to be non-empty.
///
/// ## Example
/// ```rust
/// use tally_core::validation::require_text;
///
/// assert_eq!(require_text("customer_name", "  Ann ").unwrap(), "Ann");
/// assert!(require_text("customer_name", "   ").is_err());
/// ```
pub fn require_text(field: &str, value: &str) -> ValidationResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ValidationError::required(field));
    }
    Ok(value.to_string())
}

/// Trims optional free text; blank becomes `None`.
pub fn optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Validates a search query.
///
/// Empty is allowed (matches everything). Returns the trimmed term.
pub fn validate_search_query(query: &str) -> ValidationResult<String> {
    let query = query.trim();

    if query.chars().count() > MAX_SEARCH_LEN {
        return Err(ValidationError::TooLong {
            field: "search".to_string(),
            max: MAX_SEARCH_LEN,
        });
    }

    Ok(query.to_string())
}

// =============================================================================
// Numbers
// =============================================================================

/// Parses a non-negative decimal amount (`price`, `amount`).
///
/// ## Example
/// ```rust
/// use tally_core::validation::parse_amount;
///
/// assert_eq!(parse_amount("price", "120.00").unwrap().cents(), 12000);
/// assert!(parse_amount("price", "-1").is_err());
/// assert!(parse_amount("price", "").is_err());
/// ```
pub fn parse_amount(field: &str, value: &str) -> ValidationResult<Money> {
    let amount: Money = value.parse().map_err(|err| match err {
        ParseMoneyError::Empty => ValidationError::required(field),
        other => ValidationError::invalid_format(field, other.to_string()),
    })?;

    if amount.is_negative() {
        return Err(ValidationError::Negative {
            field: field.to_string(),
        });
    }

    Ok(amount)
}

/// Parses a quantity field.
///
/// Any integer is accepted here, including zero and negatives: pricing
/// skips non-positive quantities instead of failing the whole form.
/// Blank means zero (an untouched form row).
pub fn parse_quantity(value: &str) -> ValidationResult<i64> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(0);
    }
    value.parse().map_err(|_| {
        ValidationError::invalid_format("quantity", format!("'{value}' is not a whole number"))
    })
}

/// Parses an item id from a form picker.
///
/// Returns `None` for anything that is not an integer; such rows are
/// treated like an unknown item.
pub fn parse_item_id(value: &str) -> Option<i64> {
    value.trim().parse().ok()
}

// =============================================================================
// Dates
// =============================================================================

/// Parses a `YYYY-MM-DD` form date, using `fallback` when blank.
///
/// ## Example
/// ```rust
/// use chrono::NaiveDate;
/// use tally_core::validation::parse_date_or;
///
/// let today = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
/// assert_eq!(parse_date_or("date", "", today).unwrap(), today);
/// assert_eq!(
///     parse_date_or("date", "2024-02-29", today).unwrap(),
///     NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()
/// );
/// assert!(parse_date_or("date", "2023-02-29", today).is_err());
/// ```
pub fn parse_date_or(field: &str, value: &str, fallback: NaiveDate) -> ValidationResult<NaiveDate> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(fallback);
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| ValidationError::invalid_format(field, "expected a date like 2024-01-31"))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_text() {
        assert_eq!(require_text("name", "Agnara").unwrap(), "Agnara");
        assert_eq!(require_text("name", "  Agnara\t").unwrap(), "Agnara");
        assert_eq!(
            require_text("name", ""),
            Err(ValidationError::required("name"))
        );
    }

    #[test]
    fn test_optional_text() {
        assert_eq!(optional_text(None), None);
        assert_eq!(optional_text(Some("   ")), None);
        assert_eq!(optional_text(Some(" paid cash ")), Some("paid cash".to_string()));
    }

    #[test]
    fn test_validate_search_query() {
        assert_eq!(validate_search_query("  ann ").unwrap(), "ann");
        assert_eq!(validate_search_query("").unwrap(), "");
        assert!(validate_search_query(&"a".repeat(101)).is_err());
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("amount", "30").unwrap().cents(), 3000);
        assert_eq!(parse_amount("amount", "0").unwrap().cents(), 0);
        assert_eq!(
            parse_amount("amount", "-2"),
            Err(ValidationError::Negative {
                field: "amount".to_string()
            })
        );
        assert_eq!(
            parse_amount("amount", " "),
            Err(ValidationError::required("amount"))
        );
        assert!(matches!(
            parse_amount("amount", "thirty"),
            Err(ValidationError::InvalidFormat { .. })
        ));
    }

    #[test]
    fn test_parse_quantity() {
        assert_eq!(parse_quantity("2").unwrap(), 2);
        assert_eq!(parse_quantity(" 0 ").unwrap(), 0);
        assert_eq!(parse_quantity("-1").unwrap(), -1);
        assert_eq!(parse_quantity("").unwrap(), 0);
        assert!(parse_quantity("2.5").is_err());
        assert!(parse_quantity("two").is_err());
    }

    #[test]
    fn test_parse_item_id() {
        assert_eq!(parse_item_id("7"), Some(7));
        assert_eq!(parse_item_id(""), None);
        assert_eq!(parse_item_id("abc"), None);
    }

    #[test]
    fn test_parse_date_or() {
        let fallback = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        assert_eq!(parse_date_or("date", "  ", fallback).unwrap(), fallback);
        assert_eq!(
            parse_date_or("date", "2024-01-31", fallback).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 31).unwrap()
        );
        assert!(parse_date_or("date", "31/01/2024", fallback).is_err());
    }
}
