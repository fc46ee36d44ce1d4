//! # Repository Module
//!
//! Database repository implementations for Tally.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  axum handler                                                          │
//! │       │                                                                 │
//! │       │  db.sales().create(&header, &selections)                       │
//! │       ▼                                                                 │
//! │  SaleRepository                                                        │
//! │  ├── search(&self, term)                                               │
//! │  ├── get_with_lines(&self, id)                                         │
//! │  ├── create(&self, header, selections)   ← one transaction             │
//! │  └── replace(&self, id, header, selections)                            │
//! │       │                                                                 │
//! │       │  SQL (runtime-checked sqlx queries)                            │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`item::ItemRepository`] - Catalog CRUD, soft delete, default seeding
//! - [`sale::SaleRepository`] - Sales with snapshot lines, bulk item removal
//! - [`expense::ExpenseRepository`] - Expense CRUD and category delete
//! - [`report::ReportRepository`] - Dashboard aggregates and monthly revenue

pub mod expense;
pub mod item;
pub mod report;
pub mod sale;
