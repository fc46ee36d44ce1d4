//! # tally-core: Pure Business Logic for Tally
//!
//! Bookkeeping rules for a small shop, as pure functions with zero I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Tally Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 Browser (server-rendered HTML)                  │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ HTTP forms / JSON                      │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    apps/web (axum handlers)                     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ tally-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │  pricing  │  │ validation│  │   │
//! │  │   │   Item    │  │   Money   │  │ PricedSale│  │   rules   │  │   │
//! │  │   │   Sale    │  │  (cents)  │  │  lines    │  │  parsing  │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    tally-db (Database Layer)                    │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Item, Sale, SaleLine, Expense, Dashboard)
//! - [`money`] - Money type with integer arithmetic
//! - [`pricing`] - Turns line selections into priced sale lines
//! - [`error`] - Domain error types
//! - [`validation`] - Form value parsing and checks
//!
//! ## Example Usage
//!
//! ```rust
//! use tally_core::money::Money;
//!
//! let price: Money = "120.00".parse().unwrap();
//! let subtotal = price.multiply_quantity(2);
//! assert_eq!(subtotal.to_string(), "240.00");
//! ```

pub mod error;
pub mod money;
pub mod pricing;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use pricing::{price_lines, PricedLine, PricedSale};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Catalog seeded into an empty `items` table on first start.
///
/// Prices are in cents.
pub const DEFAULT_ITEMS: &[(&str, i64)] = &[
    ("White Springtail", 12_000),
    ("Orange Springtail", 25_000),
    ("Agnara", 12_000),
    ("Porcellio Sevilla", 25_000),
];

/// Number of rows in each "recent" and "top" dashboard panel.
pub const DASHBOARD_PANEL_SIZE: u32 = 5;

/// Number of months returned by the revenue stats endpoint.
pub const STATS_MONTHS: u32 = 12;

/// Message shown when a sale form yields no valid lines.
pub const EMPTY_SALE_MESSAGE: &str = "Please add at least one item to the sale.";
