//! # Domain Types
//!
//! Core domain types used throughout Tally.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │      Item       │   │      Sale       │   │    SaleLine     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │   │  id             │   │  sale_id (FK)   │       │
//! │  │  name (unique)  │ ┄►│  customer_name  │◄──│  item_name  ┄┄┄ │ name  │
//! │  │  price          │   │  date, total    │   │  qty, price     │ copy  │
//! │  │  active         │   │  notes          │   │  subtotal       │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐                             │
//! │  │     Expense     │   │    Dashboard    │                             │
//! │  │  description    │   │  revenue        │                             │
//! │  │  amount         │   │  expenses       │                             │
//! │  │  category       │   │  net_profit     │                             │
//! │  └─────────────────┘   └─────────────────┘                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Snapshot Pattern
//! A `SaleLine` stores the item's name and unit price as they were when the
//! sale was written. It is not a foreign key into `items`: renaming,
//! repricing or deleting a catalog item never rewrites history.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Item
// =============================================================================

/// A sellable catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Item {
    pub id: i64,

    /// Display name, unique across the catalog.
    pub name: String,

    /// Current unit price.
    #[cfg_attr(feature = "sqlx", sqlx(rename = "price_cents"))]
    pub price: Money,

    /// Inactive items are hidden from sale pickers but kept for history.
    pub active: bool,
}

/// Outcome of deleting a catalog item.
///
/// ## Decision
/// ```text
/// delete item #7 ("Agnara")
///      │
///      ▼
/// any sale_items.item_name = "Agnara"?
///      │
///      ├── yes → Deactivated (row kept, active = false)
///      └── no  → Deleted (row removed)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemRemoval {
    Deactivated,
    Deleted,
    NotFound,
}

// =============================================================================
// Sale
// =============================================================================

/// A recorded sale header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Sale {
    pub id: i64,
    pub customer_name: String,
    pub date: NaiveDate,

    /// Always equals the sum of this sale's line subtotals.
    #[cfg_attr(feature = "sqlx", sqlx(rename = "total_cents"))]
    pub total: Money,

    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// One line of a sale (row of `sale_items`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct SaleLine {
    pub id: i64,
    pub sale_id: i64,

    /// Item name snapshot.
    pub item_name: String,

    /// Always positive.
    pub quantity: i64,

    /// Unit price snapshot.
    #[cfg_attr(feature = "sqlx", sqlx(rename = "price_cents"))]
    pub price: Money,

    /// `quantity * price`.
    #[cfg_attr(feature = "sqlx", sqlx(rename = "subtotal_cents"))]
    pub subtotal: Money,
}

/// A sale together with its lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SaleWithLines {
    #[serde(flatten)]
    pub sale: Sale,
    pub lines: Vec<SaleLine>,
}

impl SaleWithLines {
    /// Sum of line subtotals.
    pub fn lines_total(&self) -> Money {
        self.lines.iter().map(|line| line.subtotal).sum()
    }
}

/// Header fields submitted with a sale form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleHeader {
    pub customer_name: String,

    /// Already resolved: an empty form date becomes today on create and the
    /// stored date on edit before the repository sees it.
    pub date: NaiveDate,

    pub notes: Option<String>,
}

/// One `(item_id, quantity)` pair from the dynamic line-item form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineSelection {
    pub item_id: i64,
    pub quantity: i64,
}

impl LineSelection {
    pub fn new(item_id: i64, quantity: i64) -> Self {
        LineSelection { item_id, quantity }
    }
}

/// Result of removing an item name from every sale.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RemovalSummary {
    /// `sale_items` rows deleted.
    pub lines_removed: u64,

    /// Sales whose total was recomputed.
    pub sales_updated: u64,

    /// Sales deleted because no lines (or a zero total) remained.
    pub sales_deleted: u64,
}

// =============================================================================
// Expense
// =============================================================================

/// A recorded business expense.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Expense {
    pub id: i64,
    pub description: String,

    #[cfg_attr(feature = "sqlx", sqlx(rename = "amount_cents"))]
    pub amount: Money,

    /// Free text; grouping and bulk delete use exact string equality.
    pub category: String,

    pub date: NaiveDate,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Validated expense form values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseDraft {
    pub description: String,
    pub amount: Money,
    pub category: String,
    pub date: NaiveDate,
    pub notes: Option<String>,
}

// =============================================================================
// Dashboard
// =============================================================================

/// Best-seller row: lines grouped by item name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopItem {
    pub item_name: String,

    /// Current catalog id for this name, if the item still exists.
    pub item_id: Option<i64>,

    pub quantity: i64,
    pub sales: Money,
}

/// Expense total for one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryTotal {
    pub category: String,
    pub total: Money,

    /// Ids of the expenses in this category.
    pub expense_ids: Vec<i64>,
}

/// Everything the dashboard page shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dashboard {
    pub revenue: Money,
    pub transactions: i64,
    pub expenses: Money,
    pub net_profit: Money,
    pub recent_sales: Vec<Sale>,
    pub recent_expenses: Vec<Expense>,
    pub top_items: Vec<TopItem>,
    pub expense_breakdown: Vec<CategoryTotal>,
}

/// Headline figures; `net_profit` is derived, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Totals {
    pub revenue: Money,
    pub transactions: i64,
    pub expenses: Money,
}

impl Dashboard {
    /// Builds the dashboard, computing `net_profit = revenue - expenses`.
    pub fn new(
        totals: Totals,
        recent_sales: Vec<Sale>,
        recent_expenses: Vec<Expense>,
        top_items: Vec<TopItem>,
        expense_breakdown: Vec<CategoryTotal>,
    ) -> Self {
        Dashboard {
            revenue: totals.revenue,
            transactions: totals.transactions,
            expenses: totals.expenses,
            net_profit: totals.revenue - totals.expenses,
            recent_sales,
            recent_expenses,
            top_items,
            expense_breakdown,
        }
    }
}

/// Revenue for one calendar month, as served by `/api/stats`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct MonthlyRevenue {
    /// `YYYY-MM`.
    pub month: String,

    /// Major units, for plotting.
    pub revenue: f64,

    /// Exact value in cents.
    pub revenue_cents: i64,
}

impl MonthlyRevenue {
    pub fn new(month: impl Into<String>, revenue: Money) -> Self {
        MonthlyRevenue {
            month: month.into(),
            revenue: revenue.as_major_f64(),
            revenue_cents: revenue.cents(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
