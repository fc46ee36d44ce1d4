//! Monthly revenue JSON for the dashboard chart.

use axum::extract::State;
use axum::Json;
use tally_core::{MonthlyRevenue, STATS_MONTHS};

use crate::error::ApiResult;
use crate::AppState;

/// `GET /api/stats`
///
/// ```json
/// [{ "month": "2024-02", "revenue": 240.0, "revenue_cents": 24000 }]
/// ```
pub async fn monthly_revenue(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<MonthlyRevenue>>> {
    let months = state.db.reports().monthly_revenue(STATS_MONTHS).await?;
    Ok(Json(months))
}
