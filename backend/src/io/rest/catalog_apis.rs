//! Group/category catalog management endpoints.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use shared::{AddCategoryRequest, AddGroupRequest, CategoryItem, Group};
use tracing::info;

use super::error::ApiError;
use crate::AppState;

/// POST /api/groups
pub async fn add_group(
    State(state): State<AppState>,
    Json(request): Json<AddGroupRequest>,
) -> Result<(StatusCode, Json<Group>), ApiError> {
    info!("POST /api/groups ({})", request.name);
    state
        .sync_service
        .add_group(&request.name)
        .map(|group| (StatusCode::CREATED, Json(group)))
        .map_err(|e| ApiError::BadRequest(e.to_string()))
}

/// DELETE /api/groups/:name
pub async fn remove_group(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<StatusCode, ApiError> {
    info!("DELETE /api/groups/{}", name);
    state
        .sync_service
        .remove_group(&name)
        .map(|_| StatusCode::NO_CONTENT)
        .map_err(|e| ApiError::BadRequest(e.to_string()))
}

/// POST /api/groups/:name/categories
pub async fn add_category(
    State(state): State<AppState>,
    Path(group): Path<String>,
    Json(request): Json<AddCategoryRequest>,
) -> Result<(StatusCode, Json<CategoryItem>), ApiError> {
    info!("POST /api/groups/{}/categories ({})", group, request.name);
    state
        .sync_service
        .add_category(&group, &request.name)
        .map(|category| (StatusCode::CREATED, Json(category)))
        .map_err(|e| ApiError::BadRequest(e.to_string()))
}

/// DELETE /api/groups/:name/categories/:category
pub async fn remove_category(
    State(state): State<AppState>,
    Path((group, category)): Path<(String, String)>,
) -> Result<StatusCode, ApiError> {
    info!("DELETE /api/groups/{}/categories/{}", group, category);
    state
        .sync_service
        .remove_category(&group, &category)
        .map(|_| StatusCode::NO_CONTENT)
        .map_err(|e| ApiError::BadRequest(e.to_string()))
}
