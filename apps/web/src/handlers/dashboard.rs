//! Dashboard page.

use axum::extract::State;
use axum::response::Html;
use tracing::debug;

use crate::error::ApiResult;
use crate::{views, AppState};

/// `GET /`
pub async fn show(State(state): State<AppState>) -> ApiResult<Html<String>> {
    let dashboard = state.db.reports().dashboard().await?;

    debug!(
        revenue = %dashboard.revenue,
        expenses = %dashboard.expenses,
        transactions = dashboard.transactions,
        "Rendering dashboard"
    );

    Ok(Html(views::dashboard(&dashboard)))
}
