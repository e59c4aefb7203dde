//! Budget read/update endpoints.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use shared::{BudgetData, BudgetItem, BudgetItemPatch, BudgetPatch, BudgetStateResponse, PaymentTerm};
use tracing::info;

use super::error::ApiError;
use crate::AppState;

/// GET /api/budget
pub async fn get_budget(State(state): State<AppState>) -> Json<BudgetStateResponse> {
    Json(BudgetStateResponse {
        budget: state.sync_service.budget(),
        loading: state.sync_service.loading(),
        is_saving: state.sync_service.is_saving(),
    })
}

/// PATCH /api/budget: shallow partial update of the aggregate.
pub async fn update_budget(
    State(state): State<AppState>,
    Json(patch): Json<BudgetPatch>,
) -> Json<BudgetData> {
    info!("PATCH /api/budget");
    state.sync_service.update(patch);
    Json(state.sync_service.budget())
}

/// POST /api/budget/reset: clear client and items, keep everything else.
pub async fn reset_budget(State(state): State<AppState>) -> Json<BudgetData> {
    info!("POST /api/budget/reset");
    state.sync_service.reset();
    Json(state.sync_service.budget())
}

/// POST /api/items: append a new line with catalog defaults.
pub async fn add_item(State(state): State<AppState>) -> (StatusCode, Json<BudgetItem>) {
    info!("POST /api/items");
    let item = state.sync_service.add_item();
    (StatusCode::CREATED, Json(item))
}

/// PATCH /api/items/:id
pub async fn update_item(
    State(state): State<AppState>,
    Path(item_id): Path<String>,
    Json(patch): Json<BudgetItemPatch>,
) -> Result<Json<BudgetItem>, ApiError> {
    info!("PATCH /api/items/{}", item_id);
    state
        .sync_service
        .update_item(&item_id, patch)
        .map(Json)
        .map_err(|e| ApiError::NotFound(e.to_string()))
}

/// DELETE /api/items/:id
pub async fn remove_item(
    State(state): State<AppState>,
    Path(item_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    info!("DELETE /api/items/{}", item_id);
    state
        .sync_service
        .remove_item(&item_id)
        .map(|_| StatusCode::NO_CONTENT)
        .map_err(|e| ApiError::NotFound(e.to_string()))
}

/// PUT /api/payment-terms: replace the installment list wholesale.
pub async fn set_payment_terms(
    State(state): State<AppState>,
    Json(terms): Json<Vec<PaymentTerm>>,
) -> Json<BudgetData> {
    info!("PUT /api/payment-terms ({} terms)", terms.len());
    state.sync_service.set_payment_terms(terms);
    Json(state.sync_service.budget())
}
