//! Advisory validation endpoint.
//!
//! Returns booleans only; nothing here ever blocks saving. The UI shows the
//! result as an inline hint.

use axum::extract::Query;
use axum::Json;
use serde::Deserialize;
use shared::ValidationResponse;

use crate::domain::validation::{validate_nif_or_cif, validate_spanish_phone};

#[derive(Debug, Deserialize)]
pub struct ValidationQuery {
    pub dni: Option<String>,
    pub phone: Option<String>,
}

/// GET /api/validate?dni=…&phone=…
pub async fn validate(Query(query): Query<ValidationQuery>) -> Json<ValidationResponse> {
    Json(ValidationResponse {
        dni: query.dni.as_deref().map(validate_nif_or_cif),
        phone: query.phone.as_deref().map(validate_spanish_phone),
    })
}
