//! # Backend Module
//!
//! All non-UI logic for the budget builder.
//!
//! ## Architecture
//!
//! ```text
//! UI Layer (browser SPA)
//!     ↓
//! IO Layer (REST API, handlers)
//!     ↓
//! Domain Layer (sync, totals, validation, exports)
//!     ↓
//! Storage Layer (shared budget document)
//! ```
//!
//! The backend holds one budget aggregate behind the sync service; the REST
//! layer is a translation surface over it. Swapping the document store (local
//! JSON file, cloud document service) never touches domain or IO code.

pub mod domain;
pub mod io;
pub mod storage;

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use axum::http::{HeaderValue, Method};
use axum::routing::{get, post, put};
use axum::Router;
use log::info;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;

use crate::domain::{BudgetSyncService, ExportService, ImportService, PrintService};
use crate::storage::JsonBudgetRepository;

/// Main application state that holds all services.
#[derive(Clone)]
pub struct AppState {
    pub sync_service: BudgetSyncService<JsonBudgetRepository>,
    pub export_service: ExportService,
    pub import_service: ImportService,
    pub print_service: PrintService,
}

/// Initialize the backend with all required services. Requires a running
/// tokio runtime (the sync service spawns its snapshot listener).
pub fn initialize_backend(data_dir: &Path) -> Result<AppState> {
    info!("setting up budget document store");
    let store = Arc::new(JsonBudgetRepository::new(data_dir)?);

    info!("setting up domain services");
    let sync_service = BudgetSyncService::start(store);

    Ok(AppState {
        sync_service,
        export_service: ExportService::new(),
        import_service: ImportService::new(),
        print_service: PrintService::new(),
    })
}

/// Create the Axum router with all routes configured.
pub fn create_router(app_state: AppState) -> Router {
    // CORS setup to allow the dev frontend to make requests
    let cors = CorsLayer::new()
        .allow_origin("http://localhost:8080".parse::<HeaderValue>().unwrap())
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers(Any);

    let api_routes = Router::new()
        .route("/budget", get(io::get_budget).patch(io::update_budget))
        .route("/budget/reset", post(io::reset_budget))
        .route("/items", post(io::add_item))
        .route(
            "/items/:id",
            axum::routing::patch(io::update_item).delete(io::remove_item),
        )
        .route("/groups", post(io::add_group))
        .route("/groups/:name", axum::routing::delete(io::remove_group))
        .route("/groups/:name/categories", post(io::add_category))
        .route(
            "/groups/:name/categories/:category",
            axum::routing::delete(io::remove_category),
        )
        .route("/payment-terms", put(io::set_payment_terms))
        .route("/import", post(io::import_budget))
        .route("/export/json", get(io::export_json))
        .route("/export/xlsx", get(io::export_xlsx))
        .route("/print", get(io::print_view))
        .route("/validate", get(io::validate));

    Router::new()
        .nest("/api", api_routes)
        .fallback_service(ServeDir::new("frontend/dist"))
        .layer(cors)
        .with_state(app_state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use shared::BudgetStateResponse;
    use std::time::Duration;
    use tower::util::ServiceExt;

    async fn ready_state(dir: &Path) -> AppState {
        let state = initialize_backend(dir).unwrap();
        for _ in 0..200 {
            if !state.sync_service.loading() {
                return state;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("sync service never became ready");
    }

    #[tokio::test]
    async fn get_budget_returns_state() {
        let dir = tempfile::tempdir().unwrap();
        let app = create_router(ready_state(dir.path()).await);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/budget")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let state: BudgetStateResponse = serde_json::from_slice(&body).unwrap();
        assert!(!state.loading);
        assert_eq!(state.budget.iva_rate, 0.21);
    }

    #[tokio::test]
    async fn patch_budget_applies_partial_update() {
        let dir = tempfile::tempdir().unwrap();
        let state = ready_state(dir.path()).await;
        let app = create_router(state.clone());

        let response = app
            .oneshot(
                Request::builder()
                    .method("PATCH")
                    .uri("/api/budget")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{ "ivaRate": 0.10 }"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(state.sync_service.budget().iva_rate, 0.10);
    }

    #[tokio::test]
    async fn validate_endpoint_is_advisory() {
        let dir = tempfile::tempdir().unwrap();
        let app = create_router(ready_state(dir.path()).await);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/validate?dni=12345678Z&phone=123456789")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let result: shared::ValidationResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(result.dni, Some(true));
        assert_eq!(result.phone, Some(false));
    }

    #[tokio::test]
    async fn import_rejects_malformed_files() {
        let dir = tempfile::tempdir().unwrap();
        let state = ready_state(dir.path()).await;
        let before = state.sync_service.budget();
        let app = create_router(state.clone());

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/import")
                    .body(Body::from("{ not json"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(state.sync_service.budget(), before);
    }
}
