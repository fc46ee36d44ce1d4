//! # Sale Pricing
//!
//! Turns the `(item_id, quantity)` pairs of a sale form into priced lines.
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Form pairs                    Catalog lookup          Priced lines     │
//! │  ──────────                    ──────────────          ────────────     │
//! │  (1, 2)  ───────────────────►  #1 White Springtail ──► 2 × 120.00       │
//! │  (3, 0)  ── qty ≤ 0: skip                                               │
//! │  (9, 1)  ───────────────────►  not found / inactive: skip               │
//! │                                                                         │
//! │  lines empty?  yes → CoreError::EmptySale                               │
//! │                no  → PricedSale { lines, total = Σ subtotal }           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The lookup is a closure so the database layer can feed rows it loaded
//! inside its own transaction while this module stays free of I/O.

use serde::Serialize;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::{Item, LineSelection};

/// A line ready to be written, priced at the item's current price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PricedLine {
    pub item_name: String,
    pub quantity: i64,
    pub price: Money,
    pub subtotal: Money,
}

/// The complete set of lines for a sale plus their total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PricedSale {
    pub lines: Vec<PricedLine>,
    pub total: Money,
}

/// Prices a list of selections.
///
/// ## Rules
/// - Selections with `quantity <= 0` are skipped.
/// - Selections whose item the lookup cannot find, or finds inactive, are
///   skipped silently.
/// - Each pair becomes its own line; repeated ids are not merged.
/// - If nothing survives, returns [`CoreError::EmptySale`].
///
/// ## Example
/// ```rust
/// use tally_core::{price_lines, Item, LineSelection, Money};
///
/// let catalog = vec![Item {
///     id: 1,
///     name: "White Springtail".into(),
///     price: Money::from_cents(12000),
///     active: true,
/// }];
/// let priced = price_lines(&[LineSelection::new(1, 2)], |id| {
///     catalog.iter().find(|item| item.id == id)
/// })
/// .unwrap();
///
/// assert_eq!(priced.total.cents(), 24000);
/// assert_eq!(priced.lines[0].item_name, "White Springtail");
/// ```
pub fn price_lines<'a, F>(selections: &[LineSelection], lookup: F) -> CoreResult<PricedSale>
where
    F: Fn(i64) -> Option<&'a Item>,
{
    let mut lines = Vec::with_capacity(selections.len());
    let mut total = Money::zero();

    for selection in selections {
        if selection.quantity <= 0 {
            continue;
        }

        let Some(item) = lookup(selection.item_id).filter(|item| item.active) else {
            continue;
        };

        let subtotal = item
            .price
            .checked_multiply_quantity(selection.quantity)
            .ok_or_else(|| quantity_overflow(item.price))?;
        total = total
            .checked_add(subtotal)
            .ok_or_else(|| quantity_overflow(item.price))?;

        lines.push(PricedLine {
            item_name: item.name.clone(),
            quantity: selection.quantity,
            price: item.price,
            subtotal,
        });
    }

    if lines.is_empty() {
        return Err(CoreError::EmptySale);
    }

    Ok(PricedSale { lines, total })
}

fn quantity_overflow(price: Money) -> CoreError {
    let max = if price.is_positive() {
        i64::MAX / price.cents()
    } else {
        i64::MAX
    };
    ValidationError::OutOfRange {
        field: "quantity".to_string(),
        min: 1,
        max,
    }
    .into()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Vec<Item> {
        vec![
            Item {
                id: 1,
                name: "White Springtail".to_string(),
                price: Money::from_cents(12000),
                active: true,
            },
            Item {
                id: 2,
                name: "Orange Springtail".to_string(),
                price: Money::from_cents(25000),
                active: true,
            },
            Item {
                id: 3,
                name: "Retired Isopod".to_string(),
                price: Money::from_cents(9000),
                active: false,
            },
        ]
    }

    fn price(selections: &[LineSelection]) -> CoreResult<PricedSale> {
        let items = catalog();
        price_lines(selections, |id| items.iter().find(|item| item.id == id))
    }

    #[test]
    fn test_single_line() {
        let priced = price(&[LineSelection::new(1, 2)]).unwrap();
        assert_eq!(priced.total.cents(), 24000);
        assert_eq!(
            priced.lines,
            vec![PricedLine {
                item_name: "White Springtail".to_string(),
                quantity: 2,
                price: Money::from_cents(12000),
                subtotal: Money::from_cents(24000),
            }]
        );
    }

    #[test]
    fn test_total_is_sum_of_subtotals() {
        let priced = price(&[LineSelection::new(1, 1), LineSelection::new(2, 3)]).unwrap();
        let sum: Money = priced.lines.iter().map(|line| line.subtotal).sum();
        assert_eq!(priced.total, sum);
        assert_eq!(priced.total.cents(), 12000 + 75000);
        for line in &priced.lines {
            assert_eq!(line.subtotal, line.price * line.quantity);
            assert!(line.quantity > 0);
        }
    }

    #[test]
    fn test_skips_non_positive_quantities() {
        let priced = price(&[
            LineSelection::new(1, 0),
            LineSelection::new(2, -4),
            LineSelection::new(1, 1),
        ])
        .unwrap();
        assert_eq!(priced.lines.len(), 1);
        assert_eq!(priced.total.cents(), 12000);
    }

    #[test]
    fn test_skips_unknown_and_inactive_items() {
        let priced = price(&[
            LineSelection::new(99, 1),
            LineSelection::new(3, 1),
            LineSelection::new(2, 1),
        ])
        .unwrap();
        assert_eq!(priced.lines.len(), 1);
        assert_eq!(priced.lines[0].item_name, "Orange Springtail");
    }

    #[test]
    fn test_repeated_item_gives_separate_lines() {
        let priced = price(&[LineSelection::new(1, 1), LineSelection::new(1, 2)]).unwrap();
        assert_eq!(priced.lines.len(), 2);
        assert_eq!(priced.total.cents(), 36000);
    }

    #[test]
    fn test_empty_selection_is_rejected() {
        assert!(matches!(price(&[]), Err(CoreError::EmptySale)));
        assert!(matches!(
            price(&[LineSelection::new(1, 0), LineSelection::new(3, 2)]),
            Err(CoreError::EmptySale)
        ));
    }

    #[test]
    fn test_overflowing_quantity_is_rejected() {
        let err = price(&[LineSelection::new(2, i64::MAX)]).unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::OutOfRange { .. })
        ));
    }
}
