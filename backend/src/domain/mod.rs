//! # Domain Module
//!
//! Business logic for the budget builder, independent of HTTP and of the
//! storage backing.
//!
//! ## Module Organization
//!
//! - **sync_service**: the budget aggregate, remote subscription and
//!   debounced persistence (the single mutation entry point)
//! - **totals**: pure base/IVA/total aggregation and payment splits
//! - **validation**: advisory NIF/CIF and phone checks
//! - **export_service** / **import_service**: portable JSON files and the
//!   XLSX workbook
//! - **print_service**: the bilingual printable document
//! - **i18n**: Basque/Spanish label tables
//!
//! ## Key Rules
//!
//! - Derived figures are computed on demand, never cached as mutable state
//! - Validation never blocks data entry or persistence
//! - Every mutation funnels through the sync service's `update`

pub mod export_service;
pub mod i18n;
pub mod import_service;
pub mod print_service;
pub mod sync_service;
pub mod totals;
pub mod validation;

pub use export_service::{ExportFile, ExportService};
pub use import_service::ImportService;
pub use print_service::PrintService;
pub use sync_service::BudgetSyncService;
pub use totals::{compute_totals, payment_schedule, percentage_sum, Totals};
