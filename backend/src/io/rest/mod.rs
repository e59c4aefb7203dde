//! # REST API Interface Layer
//!
//! HTTP endpoints for the budget builder UI. This layer only translates:
//! request/response serialization, error-to-status mapping and request
//! logging live here; every business decision stays in the domain services.
//!
//! ## Endpoints
//!
//! - `GET/PATCH /api/budget`, `POST /api/budget/reset`
//! - `POST /api/items`, `PATCH/DELETE /api/items/:id`
//! - `POST /api/groups`, `DELETE /api/groups/:name`,
//!   `POST /api/groups/:name/categories`,
//!   `DELETE /api/groups/:name/categories/:category`
//! - `PUT /api/payment-terms`
//! - `POST /api/import`, `GET /api/export/{json,xlsx}`, `GET /api/print`
//! - `GET /api/validate`

pub mod budget_apis;
pub mod catalog_apis;
pub mod error;
pub mod export_apis;
pub mod validation_apis;

pub use budget_apis::*;
pub use catalog_apis::*;
pub use error::ApiError;
pub use export_apis::*;
pub use validation_apis::*;
