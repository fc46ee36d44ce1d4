//! # Form Decoding
//!
//! Raw `application/x-www-form-urlencoded` bodies, and their conversion into
//! validated domain input.
//!
//! ## Sale Form Layout
//! ```text
//! customer_name=Ann&date=2024-01-15&notes=
//!   &item_id=1&quantity=2        ← row 1
//!   &item_id=3&quantity=0        ← row 2 (skipped by pricing)
//!   &item_id=&quantity=          ← untouched row
//! ```
//! `item_id` and `quantity` repeat, so the sale form is read as a list of
//! pairs rather than a struct; the two lists are zipped pairwise and any
//! surplus entries are ignored.
//!
//! Raw values are kept as strings so a rejected form can be redisplayed
//! exactly as submitted.

use chrono::NaiveDate;
use serde::Deserialize;

use tally_core::validation::{
    optional_text, parse_amount, parse_date_or, parse_item_id, parse_quantity, require_text,
    validate_search_query,
};
use tally_core::{ExpenseDraft, LineSelection, Money, SaleHeader, ValidationError};

// =============================================================================
// Search
// =============================================================================

/// `?search=` on list pages.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub search: String,
}

impl SearchQuery {
    /// Trimmed, length-checked search term.
    pub fn term(&self) -> Result<String, ValidationError> {
        validate_search_query(&self.search)
    }
}

// =============================================================================
// Sale
// =============================================================================

/// One submitted line row, still raw.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawLine {
    pub item_id: String,
    pub quantity: String,
}

/// Sale form as submitted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SaleForm {
    pub customer_name: String,
    pub date: String,
    pub notes: String,
    pub lines: Vec<RawLine>,
}

impl SaleForm {
    /// Collects the form from decoded key/value pairs.
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut form = SaleForm::default();
        let mut item_ids = Vec::new();
        let mut quantities = Vec::new();

        for (key, value) in pairs {
            match key.as_str() {
                "customer_name" => form.customer_name = value,
                "date" => form.date = value,
                "notes" => form.notes = value,
                "item_id" => item_ids.push(value),
                "quantity" => quantities.push(value),
                _ => {}
            }
        }

        form.lines = item_ids
            .into_iter()
            .zip(quantities)
            .map(|(item_id, quantity)| RawLine { item_id, quantity })
            .collect();

        form
    }

    /// Validates the header and turns rows into selections.
    ///
    /// `fallback_date` is used when the date field is blank: today on
    /// create, the stored date on edit.
    ///
    /// ## Errors
    /// - blank customer name
    /// - malformed date
    /// - a quantity that is not a whole number
    ///
    /// Rows whose `item_id` is not a number are dropped like unknown items.
    pub fn into_input(
        &self,
        fallback_date: NaiveDate,
    ) -> Result<(SaleHeader, Vec<LineSelection>), ValidationError> {
        let customer_name = require_text("customer_name", &self.customer_name)?;
        let date = parse_date_or("date", &self.date, fallback_date)?;
        let notes = optional_text(Some(&self.notes));

        let mut selections = Vec::with_capacity(self.lines.len());
        for line in &self.lines {
            let quantity = parse_quantity(&line.quantity)?;
            if let Some(item_id) = parse_item_id(&line.item_id) {
                selections.push(LineSelection::new(item_id, quantity));
            }
        }

        Ok((
            SaleHeader {
                customer_name,
                date,
                notes,
            },
            selections,
        ))
    }
}

// =============================================================================
// Item
// =============================================================================

/// Catalog add/edit form.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ItemForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub price: String,
}

impl ItemForm {
    /// Returns the trimmed name and the parsed price.
    pub fn validate(&self) -> Result<(String, Money), ValidationError> {
        let name = require_text("name", &self.name)?;
        let price = parse_amount("price", &self.price)?;
        Ok((name, price))
    }
}

// =============================================================================
// Expense
// =============================================================================

/// Expense add/edit form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ExpenseForm {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub amount: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub notes: String,
}

impl ExpenseForm {
    /// Validates the form into an [`ExpenseDraft`].
    pub fn into_draft(&self, fallback_date: NaiveDate) -> Result<ExpenseDraft, ValidationError> {
        Ok(ExpenseDraft {
            description: require_text("description", &self.description)?,
            amount: parse_amount("amount", &self.amount)?,
            category: require_text("category", &self.category)?,
            date: parse_date_or("date", &self.date, fallback_date)?,
            notes: optional_text(Some(&self.notes)),
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(raw: &[(&str, &str)]) -> Vec<(String, String)> {
        raw.iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
    }

    #[test]
    fn test_sale_form_zips_rows() {
        let form = SaleForm::from_pairs(pairs(&[
            ("customer_name", " Ann "),
            ("date", ""),
            ("item_id", "1"),
            ("quantity", "2"),
            ("item_id", "abc"),
            ("quantity", "1"),
            ("item_id", "3"),
            ("quantity", ""),
            ("item_id", "4"),
        ]));

        // The unpaired trailing item_id is dropped
        assert_eq!(form.lines.len(), 3);

        let (header, selections) = form.into_input(today()).unwrap();
        assert_eq!(header.customer_name, "Ann");
        assert_eq!(header.date, today());
        assert_eq!(header.notes, None);
        assert_eq!(
            selections,
            vec![LineSelection::new(1, 2), LineSelection::new(3, 0)]
        );
    }

    #[test]
    fn test_sale_form_rejects_bad_quantity() {
        let form = SaleForm::from_pairs(pairs(&[
            ("customer_name", "Ann"),
            ("item_id", "1"),
            ("quantity", "two"),
        ]));

        let err = form.into_input(today()).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidFormat { .. }));
    }

    #[test]
    fn test_sale_form_requires_customer() {
        let form = SaleForm::from_pairs(pairs(&[("customer_name", "  ")]));

        assert_eq!(
            form.into_input(today()).unwrap_err(),
            ValidationError::required("customer_name")
        );
    }

    #[test]
    fn test_item_form() {
        let form = ItemForm {
            name: " Agnara ".to_string(),
            price: "120".to_string(),
        };
        let (name, price) = form.validate().unwrap();
        assert_eq!(name, "Agnara");
        assert_eq!(price.cents(), 12_000);

        let negative = ItemForm {
            name: "Agnara".to_string(),
            price: "-1".to_string(),
        };
        assert!(negative.validate().is_err());
    }

    #[test]
    fn test_expense_form() {
        let form = ExpenseForm {
            description: "Crickets".to_string(),
            amount: "30".to_string(),
            category: " Feed ".to_string(),
            date: "2024-01-05".to_string(),
            notes: "   ".to_string(),
        };

        let draft = form.into_draft(today()).unwrap();
        assert_eq!(draft.amount.to_string(), "30.00");
        assert_eq!(draft.category, "Feed");
        assert_eq!(draft.date, NaiveDate::from_ymd_opt(2024, 1, 5).unwrap());
        assert_eq!(draft.notes, None);

        let missing_amount = ExpenseForm {
            amount: String::new(),
            ..form
        };
        assert_eq!(
            missing_amount.into_draft(today()).unwrap_err(),
            ValidationError::required("amount")
        );
    }
}
