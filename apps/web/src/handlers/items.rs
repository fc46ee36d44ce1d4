//! # Catalog Handlers
//!
//! Every mutation redirects to `/items` on success. On failure the error is
//! logged at `warn` and the catalog page is rendered again with the message:
//!
//! ```text
//! duplicate name       → 409
//! blank name / bad price → 422
//! anything else        → 500
//! ```

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::Form;
use tally_core::ItemRemoval;
use tracing::{info, warn};

use crate::error::{ApiError, ApiResult};
use crate::forms::ItemForm;
use crate::{views, AppState};

/// `GET /items`
pub async fn list(State(state): State<AppState>) -> ApiResult<Html<String>> {
    let items = state.db.items().list().await?;
    Ok(Html(views::items_page(&items, &ItemForm::default(), None)))
}

/// `POST /items/add`
pub async fn add(State(state): State<AppState>, Form(form): Form<ItemForm>) -> ApiResult<Response> {
    let (name, price) = match form.validate() {
        Ok(valid) => valid,
        Err(e) => return render_failure(&state, "add", &form, ApiError::from(e)).await,
    };

    match state.db.items().insert(&name, price).await {
        Ok(item) => {
            info!(item_id = item.id, name = %item.name, price = %item.price, "Item added");
            Ok(Redirect::to("/items").into_response())
        }
        Err(e) => render_failure(&state, "add", &form, ApiError::from(e)).await,
    }
}

/// `POST /items/edit/:id`
pub async fn edit(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Form(form): Form<ItemForm>,
) -> ApiResult<Response> {
    let blank = ItemForm::default();

    let (name, price) = match form.validate() {
        Ok(valid) => valid,
        Err(e) => return render_failure(&state, "edit", &blank, ApiError::from(e)).await,
    };

    match state.db.items().update(id, &name, price).await {
        Ok(updated) => {
            if updated {
                info!(item_id = id, name = %name, price = %price, "Item updated");
            }
            Ok(Redirect::to("/items").into_response())
        }
        Err(e) => render_failure(&state, "edit", &blank, ApiError::from(e)).await,
    }
}

/// `POST /items/toggle/:id`
pub async fn toggle(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Response> {
    match state.db.items().toggle_active(id).await {
        Ok(toggled) => {
            if toggled {
                info!(item_id = id, "Item availability toggled");
            }
            Ok(Redirect::to("/items").into_response())
        }
        Err(e) => render_failure(&state, "toggle", &ItemForm::default(), ApiError::from(e)).await,
    }
}

/// `POST /items/delete/:id`
///
/// Items referenced by past sales are deactivated rather than deleted.
pub async fn delete(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Response> {
    match state.db.items().remove(id).await {
        Ok(outcome) => {
            match outcome {
                ItemRemoval::Deleted => info!(item_id = id, "Item deleted"),
                ItemRemoval::Deactivated => {
                    info!(item_id = id, "Item used in sales; deactivated instead")
                }
                ItemRemoval::NotFound => {}
            }
            Ok(Redirect::to("/items").into_response())
        }
        Err(e) => render_failure(&state, "delete", &ItemForm::default(), ApiError::from(e)).await,
    }
}

/// Logs a failed mutation and redisplays the catalog with its message.
async fn render_failure(
    state: &AppState,
    action: &str,
    form: &ItemForm,
    err: ApiError,
) -> ApiResult<Response> {
    warn!(action, code = ?err.code, message = %err.message, "Catalog update failed");

    let status: StatusCode = err.status();
    let items = state.db.items().list().await?;
    let html = views::items_page(&items, form, Some(&err.message));

    Ok((status, Html(html)).into_response())
}
