//! # Sale Handlers
//!
//! Add, list, edit and delete sales, plus removing an item name from every
//! sale at once.
//!
//! ## Create Flow
//! ```text
//! POST /add-sale  (customer_name, date, notes, item_id*, quantity*)
//!        │
//!        ▼
//! SaleForm::from_pairs ──► into_input(today)
//!        │                      │
//!        │                      └── bad quantity / blank customer ──► form, 422
//!        ▼
//! SaleRepository::create (one transaction)
//!        │
//!        ├── Rejected(EmptySale) ──► form + "Please add at least one item…", 422
//!        ├── other store error ────► form + "Error adding sale: …", 500
//!        ▼
//! 303 → /
//! ```

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::Form;
use tracing::{error, info};

use tally_core::{Item, SaleWithLines};
use tally_db::DbError;

use crate::error::{ApiError, ApiResult};
use crate::forms::{RawLine, SaleForm, SearchQuery};
use crate::views::{self, SaleFormView};
use crate::AppState;

use super::today;

/// `GET /add-sale`
pub async fn new_form(State(state): State<AppState>) -> ApiResult<Response> {
    let form = SaleForm {
        date: today().to_string(),
        ..SaleForm::default()
    };
    render_form(&state, FormMode::Create, &form, None, StatusCode::OK).await
}

/// `POST /add-sale`
pub async fn create(
    State(state): State<AppState>,
    Form(pairs): Form<Vec<(String, String)>>,
) -> ApiResult<Response> {
    let form = SaleForm::from_pairs(pairs);

    let (header, selections) = match form.into_input(today()) {
        Ok(input) => input,
        Err(e) => {
            let message = e.to_string();
            return render_form(
                &state,
                FormMode::Create,
                &form,
                Some(&message),
                StatusCode::UNPROCESSABLE_ENTITY,
            )
            .await;
        }
    };

    match state.db.sales().create(&header, &selections).await {
        Ok(created) => {
            info!(
                sale_id = created.sale.id,
                customer = %created.sale.customer_name,
                total = %created.sale.total,
                "Sale recorded"
            );
            Ok(Redirect::to("/").into_response())
        }
        Err(e) => {
            let (message, status) = store_failure("Error adding sale", e);
            render_form(&state, FormMode::Create, &form, Some(&message), status).await
        }
    }
}

/// `GET /sales?search=`
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Html<String>> {
    let term = query.term()?;
    let sales = state.db.sales().search(&term).await?;
    Ok(Html(views::sales_list(&sales, &term)))
}

/// `GET /sales/edit/:sale_id`
pub async fn edit_form(
    State(state): State<AppState>,
    Path(sale_id): Path<i64>,
) -> ApiResult<Response> {
    let existing = state
        .db
        .sales()
        .get_with_lines(sale_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Sale not found"))?;

    let items = state.db.items().list_active().await?;
    let form = prefill(&existing, &items);
    let mode = FormMode::Edit(sale_id);

    let html = views::sale_form(&SaleFormView {
        title: mode.title(),
        action: &mode.action(),
        submit_label: mode.submit_label(),
        items: &items,
        form: &form,
        error: None,
    });
    Ok(Html(html).into_response())
}

/// `POST /sales/edit/:sale_id`
pub async fn update(
    State(state): State<AppState>,
    Path(sale_id): Path<i64>,
    Form(pairs): Form<Vec<(String, String)>>,
) -> ApiResult<Response> {
    let stored = state
        .db
        .sales()
        .get_by_id(sale_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Sale not found"))?;

    let mode = FormMode::Edit(sale_id);
    let form = SaleForm::from_pairs(pairs);

    // A blank date keeps the stored one
    let (header, selections) = match form.into_input(stored.date) {
        Ok(input) => input,
        Err(e) => {
            let message = e.to_string();
            return render_form(
                &state,
                mode,
                &form,
                Some(&message),
                StatusCode::UNPROCESSABLE_ENTITY,
            )
            .await;
        }
    };

    match state.db.sales().replace(sale_id, &header, &selections).await {
        Ok(updated) => {
            info!(
                sale_id,
                lines = updated.lines.len(),
                total = %updated.sale.total,
                "Sale updated"
            );
            Ok(Redirect::to("/sales").into_response())
        }
        // Deleted between the lookup and the write
        Err(DbError::NotFound { .. }) => Err(ApiError::not_found("Sale not found")),
        Err(e) => {
            let (message, status) = store_failure("Error updating sale", e);
            render_form(&state, mode, &form, Some(&message), status).await
        }
    }
}

/// `POST /sales/delete/:sale_id`
pub async fn delete(
    State(state): State<AppState>,
    Path(sale_id): Path<i64>,
) -> ApiResult<Redirect> {
    if state.db.sales().delete(sale_id).await? {
        info!(sale_id, "Sale deleted");
    }
    Ok(Redirect::to("/sales"))
}

/// `POST /sales/delete-item/:item_name`
pub async fn remove_item(
    State(state): State<AppState>,
    Path(item_name): Path<String>,
) -> ApiResult<Redirect> {
    let summary = state.db.sales().remove_item_everywhere(&item_name).await?;

    info!(
        item = %item_name,
        lines_removed = summary.lines_removed,
        sales_updated = summary.sales_updated,
        sales_deleted = summary.sales_deleted,
        "Item removed from sales"
    );

    Ok(Redirect::to("/"))
}

// =============================================================================
// Helpers
// =============================================================================

#[derive(Debug, Clone, Copy)]
enum FormMode {
    Create,
    Edit(i64),
}

impl FormMode {
    fn title(self) -> &'static str {
        match self {
            FormMode::Create => "Add Sale",
            FormMode::Edit(_) => "Edit Sale",
        }
    }

    fn action(self) -> String {
        match self {
            FormMode::Create => "/add-sale".to_string(),
            FormMode::Edit(id) => format!("/sales/edit/{}", id),
        }
    }

    fn submit_label(self) -> &'static str {
        match self {
            FormMode::Create => "Save Sale",
            FormMode::Edit(_) => "Update Sale",
        }
    }
}

/// Renders the sale form with the active catalog.
async fn render_form(
    state: &AppState,
    mode: FormMode,
    form: &SaleForm,
    error: Option<&str>,
    status: StatusCode,
) -> ApiResult<Response> {
    let items = state.db.items().list_active().await?;

    let html = views::sale_form(&SaleFormView {
        title: mode.title(),
        action: &mode.action(),
        submit_label: mode.submit_label(),
        items: &items,
        form,
        error,
    });

    Ok((status, Html(html)).into_response())
}

/// Message and status for a failed create/replace.
///
/// Business rejections keep their own message; anything else is logged and
/// reported generically under `context`.
fn store_failure(context: &str, err: DbError) -> (String, StatusCode) {
    match err {
        DbError::Rejected(core) => {
            let api = ApiError::from(core);
            (api.message.clone(), api.status())
        }
        other => {
            error!(error = %other, "{}", context);
            let api = ApiError::from(other);
            (format!("{}: {}", context, api.message), api.status())
        }
    }
}

/// Form values for an existing sale.
///
/// Lines are matched back to active catalog entries by name; a line whose
/// item is gone or inactive gets an empty picker.
fn prefill(existing: &SaleWithLines, items: &[Item]) -> SaleForm {
    let lines = existing
        .lines
        .iter()
        .map(|line| RawLine {
            item_id: items
                .iter()
                .find(|item| item.name == line.item_name)
                .map(|item| item.id.to_string())
                .unwrap_or_default(),
            quantity: line.quantity.to_string(),
        })
        .collect();

    SaleForm {
        customer_name: existing.sale.customer_name.clone(),
        date: existing.sale.date.to_string(),
        notes: existing.sale.notes.clone().unwrap_or_default(),
        lines,
    }
}
