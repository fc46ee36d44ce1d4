//! # Expense Handlers
//!
//! List, add, edit and delete expenses, plus deleting a whole category
//! from the dashboard.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::Form;
use tally_core::Expense;
use tracing::{error, info};

use crate::error::{ApiError, ApiResult};
use crate::forms::{ExpenseForm, SearchQuery};
use crate::views::{self, ExpenseFormView};
use crate::AppState;

use super::today;

/// `GET /expenses?search=`
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Html<String>> {
    let term = query.term()?;
    let repo = state.db.expenses();

    let expenses = repo.search(&term).await?;
    let total = repo.total().await?;

    Ok(Html(views::expenses_list(&expenses, total, &term)))
}

/// `GET /expenses/add`
pub async fn new_form() -> Html<String> {
    let form = ExpenseForm {
        date: today().to_string(),
        ..ExpenseForm::default()
    };
    Html(render_form(FormMode::Create, &form, None))
}

/// `POST /expenses/add`
pub async fn create(
    State(state): State<AppState>,
    Form(form): Form<ExpenseForm>,
) -> ApiResult<Response> {
    let draft = match form.into_draft(today()) {
        Ok(draft) => draft,
        Err(e) => return Ok(invalid(FormMode::Create, &form, &e.to_string())),
    };

    match state.db.expenses().insert(&draft).await {
        Ok(expense) => {
            info!(
                expense_id = expense.id,
                category = %expense.category,
                amount = %expense.amount,
                "Expense recorded"
            );
            Ok(Redirect::to("/expenses").into_response())
        }
        Err(e) => {
            error!(error = %e, "Error adding expense");
            let api = ApiError::from(e);
            let message = format!("Error adding expense: {}", api.message);
            Ok(failure(FormMode::Create, &form, &message, api.status()))
        }
    }
}

/// `GET /expenses/edit/:id`
pub async fn edit_form(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Html<String>> {
    let expense = find(&state, id).await?;
    Ok(Html(render_form(FormMode::Edit(id), &prefill(&expense), None)))
}

/// `POST /expenses/edit/:id`
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Form(form): Form<ExpenseForm>,
) -> ApiResult<Response> {
    let stored = find(&state, id).await?;
    let mode = FormMode::Edit(id);

    // A blank date keeps the stored one
    let draft = match form.into_draft(stored.date) {
        Ok(draft) => draft,
        Err(e) => return Ok(invalid(mode, &form, &e.to_string())),
    };

    match state.db.expenses().update(id, &draft).await {
        Ok(true) => {
            info!(expense_id = id, amount = %draft.amount, "Expense updated");
            Ok(Redirect::to("/expenses").into_response())
        }
        Ok(false) => Err(ApiError::not_found("Expense not found")),
        Err(e) => {
            error!(expense_id = id, error = %e, "Error updating expense");
            let api = ApiError::from(e);
            let message = format!("Error updating expense: {}", api.message);
            Ok(failure(mode, &form, &message, api.status()))
        }
    }
}

/// `POST /expenses/delete/:id`
pub async fn delete(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Redirect> {
    if state.db.expenses().delete(id).await? {
        info!(expense_id = id, "Expense deleted");
    }
    Ok(Redirect::to("/expenses"))
}

/// `POST /expenses/delete-category/:category`
pub async fn delete_category(
    State(state): State<AppState>,
    Path(category): Path<String>,
) -> ApiResult<Redirect> {
    let removed = state.db.expenses().delete_category(&category).await?;
    info!(category = %category, removed, "Expense category deleted");
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

async fn find(state: &AppState, id: i64) -> ApiResult<Expense> {
    state
        .db
        .expenses()
        .get_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Expense not found"))
}

fn render_form(mode: FormMode, form: &ExpenseForm, error: Option<&str>) -> String {
    let (title, action, submit_label) = match mode {
        FormMode::Create => ("Add Expense", "/expenses/add".to_string(), "Save Expense"),
        FormMode::Edit(id) => (
            "Edit Expense",
            format!("/expenses/edit/{}", id),
            "Update Expense",
        ),
    };

    views::expense_form(&ExpenseFormView {
        title,
        action: &action,
        submit_label,
        form,
        error,
    })
}

fn invalid(mode: FormMode, form: &ExpenseForm, message: &str) -> Response {
    failure(mode, form, message, StatusCode::UNPROCESSABLE_ENTITY)
}

fn failure(mode: FormMode, form: &ExpenseForm, message: &str, status: StatusCode) -> Response {
    (status, Html(render_form(mode, form, Some(message)))).into_response()
}

fn prefill(expense: &Expense) -> ExpenseForm {
    ExpenseForm {
        description: expense.description.clone(),
        amount: expense.amount.to_string(),
        category: expense.category.clone(),
        date: expense.date.to_string(),
        notes: expense.notes.clone().unwrap_or_default(),
    }
}
