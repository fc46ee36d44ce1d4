//! # Tally Web
//!
//! HTTP front end for the Tally bookkeeping app: server-rendered pages for
//! sales, expenses and the item catalog, plus a small JSON stats API.
//!
//! ## Module Organization
//! ```text
//! tally_web/
//! ├── config.rs    ← WebConfig (environment variables)
//! ├── error.rs     ← ApiError → HTTP response
//! ├── forms.rs     ← urlencoded bodies → validated input
//! ├── views.rs     ← HTML rendering
//! └── handlers/    ← one module per page family
//! ```
//!
//! ## Request Path
//! ```text
//! Browser ──► Router (TraceLayer) ──► handler ──► Database repositories
//!    ▲                                   │
//!    └────── Html / Redirect / Json ◄────┘
//! ```

pub mod config;
pub mod error;
pub mod forms;
pub mod handlers;
pub mod views;

use std::path::Path;

use axum::routing::{get, post};
use axum::Router;
use tally_db::Database;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use crate::handlers::{dashboard, expenses, health, items, sales, stats};

/// State shared by every handler.
///
/// `Database` wraps a pool, so cloning per request is cheap.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
}

impl AppState {
    pub fn new(db: Database) -> Self {
        AppState { db }
    }
}

/// Builds the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(dashboard::show))
        // Sales
        .route("/add-sale", get(sales::new_form).post(sales::create))
        .route("/sales", get(sales::list))
        .route("/sales/delete/:sale_id", post(sales::delete))
        .route("/sales/edit/:sale_id", get(sales::edit_form).post(sales::update))
        .route("/sales/delete-item/:item_name", post(sales::remove_item))
        // Catalog
        .route("/items", get(items::list))
        .route("/items/add", post(items::add))
        .route("/items/edit/:id", post(items::edit))
        .route("/items/toggle/:id", post(items::toggle))
        .route("/items/delete/:id", post(items::delete))
        // Expenses
        .route("/expenses", get(expenses::list))
        .route("/expenses/add", get(expenses::new_form).post(expenses::create))
        .route("/expenses/edit/:id", get(expenses::edit_form).post(expenses::update))
        .route("/expenses/delete/:id", post(expenses::delete))
        .route(
            "/expenses/delete-category/:category",
            post(expenses::delete_category),
        )
        // JSON
        .route("/api/stats", get(stats::monthly_revenue))
        .route("/health", get(health::check))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serves `dir` under `/static`.
pub fn with_static_files(router: Router, dir: &Path) -> Router {
    router.nest_service("/static", ServeDir::new(dir))
}

/// Installs the global tracing subscriber.
///
/// `RUST_LOG` overrides the default filter.
pub fn init_tracing() {
    // "tally" prefixes every crate target in the workspace
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tally=debug,sqlx=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();
}
