//! # Storage Module
//!
//! Persistence for the budget document. The domain layer only sees the
//! [`BudgetDocumentStore`] trait; the backing can be the JSON-file store, the
//! in-memory store, or any future cloud document service without touching
//! domain code.
//!
//! ## Key Responsibilities
//!
//! - **Snapshot delivery**: push the current document to new subscribers and
//!   every committed write to live ones
//! - **Merge-writes**: upsert top-level fields, never clobbering unknown keys
//!   already present in the stored document
//! - **Atomicity**: temp-file + rename writes so a crash never leaves a
//!   half-written document

pub mod json;
pub mod memory;
pub mod traits;

pub use json::JsonBudgetRepository;
pub use memory::MemoryBudgetStore;
pub use traits::{BudgetDocumentStore, SnapshotEvent, GLOBAL_BUDGET_DOC_ID};
