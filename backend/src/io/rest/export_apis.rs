//! Export, import and print endpoints.

use axum::extract::State;
use axum::http::header;
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use shared::BudgetData;
use tracing::info;

use super::error::ApiError;
use crate::domain::ExportFile;
use crate::AppState;

fn as_attachment(file: ExportFile) -> Response {
    (
        [
            (header::CONTENT_TYPE, file.content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", file.filename),
            ),
        ],
        file.bytes,
    )
        .into_response()
}

/// GET /api/export/json: the portable budget file.
pub async fn export_json(State(state): State<AppState>) -> Result<Response, ApiError> {
    info!("GET /api/export/json");
    let file = state.export_service.export_json(&state.sync_service.budget())?;
    Ok(as_attachment(file))
}

/// GET /api/export/xlsx: the spreadsheet rendition.
pub async fn export_xlsx(State(state): State<AppState>) -> Result<Response, ApiError> {
    info!("GET /api/export/xlsx");
    let file = state.export_service.export_xlsx(&state.sync_service.budget())?;
    Ok(as_attachment(file))
}

/// GET /api/print: the bilingual printable document.
pub async fn print_view(State(state): State<AppState>) -> Html<String> {
    info!("GET /api/print");
    Html(state.print_service.render(&state.sync_service.budget()))
}

/// POST /api/import: apply a previously exported file as a partial update.
/// A malformed file is rejected and leaves local state unchanged.
pub async fn import_budget(
    State(state): State<AppState>,
    body: String,
) -> Result<Json<BudgetData>, ApiError> {
    info!("POST /api/import ({} bytes)", body.len());
    let patch = state
        .import_service
        .parse(&body)
        .map_err(|e| ApiError::BadRequest(format!("{:#}", e)))?;
    state.sync_service.update(patch);
    Ok(Json(state.sync_service.budget()))
}
