//! # HTTP Handlers
//!
//! One module per page family. Handlers stay thin: decode the request,
//! call a repository, render a view or redirect.
//!
//! ## Handler Shape
//! ```text
//! Form / Path / Query extractor
//!        │
//!        ▼
//! forms::* validation ──── invalid ──► re-render form (422)
//!        │
//!        ▼
//! state.db.<repo>().<op>() ── store error ──► re-render / ApiError
//!        │
//!        ▼
//! Redirect::to(..)  (303 See Other)  or  Html(views::*)
//! ```

pub mod dashboard;
pub mod expenses;
pub mod health;
pub mod items;
pub mod sales;
pub mod stats;

use chrono::NaiveDate;

/// Local calendar date, used when a form leaves its date blank.
pub(crate) fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}
