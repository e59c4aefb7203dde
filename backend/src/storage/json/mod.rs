//! # JSON Storage Module
//!
//! File-based implementation of the budget document store. The shared budget
//! lives in a single pretty-printed JSON document under the data directory,
//! written atomically and fanned out to live subscribers on every commit.
//!
//! ## File Structure
//!
//! ```text
//! data/
//! └── budgets/
//!     └── global-shared-budget-v1.json    ← the shared budget document
//! ```

pub mod budget_repository;

pub use budget_repository::JsonBudgetRepository;
