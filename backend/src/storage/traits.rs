//! # Storage Traits
//!
//! Defines the document-store abstraction the domain layer syncs against.
//! The budget lives in a single logical document behind an opaque key-value
//! document service; implementations only need to deliver snapshots and
//! accept merge-writes, so the sync service works the same against a local
//! JSON file or a cloud store.

use anyhow::Result;
use shared::{BudgetData, BudgetPatch};
use tokio::sync::mpsc;

/// Fixed identifier of the shared budget document. Every session reads and
/// writes the same document; there is no per-user namespacing.
pub const GLOBAL_BUDGET_DOC_ID: &str = "global-shared-budget-v1";

/// One snapshot delivered over a live subscription.
#[derive(Debug, Clone)]
pub enum SnapshotEvent {
    /// The document exists; payload is whatever fields are stored. A document
    /// written by an older version may miss newer fields, so this is a patch,
    /// not a full `BudgetData`.
    Document(BudgetPatch),
    /// The document has never been written.
    Missing,
    /// The subscription failed. No further events will follow.
    Error(String),
}

/// Interface to the shared budget document.
///
/// `subscribe` must deliver the current state immediately (document, missing
/// or error) and then push a new `Document` snapshot after every committed
/// write, including the subscriber's own. Dropping the receiver ends the
/// subscription.
pub trait BudgetDocumentStore: Send + Sync + 'static {
    /// Open a live subscription to the budget document.
    fn subscribe(&self) -> mpsc::UnboundedReceiver<SnapshotEvent>;

    /// Merge-write the full budget state into the stored document. Top-level
    /// fields are upserted; keys already stored but unknown to this version
    /// are preserved untouched.
    fn merge_write(&self, budget: &BudgetData) -> Result<()>;
}
