//! # Budget Sync Service
//!
//! Owns the in-memory [`BudgetData`] aggregate and keeps it synchronized with
//! the shared remote document. Every mutation in the system funnels through
//! [`BudgetSyncService::update`]; no other component writes persisted state.
//!
//! ## Lifecycle
//!
//! `uninitialized → loading → ready`. On start the service subscribes to the
//! document store. A snapshot with a document shallow-merges the stored fields
//! over the hardcoded defaults (stored fields win, missing fields fall back);
//! a snapshot without a document keeps pure defaults. Either way the remote is
//! marked as loaded, which is what arms persistence: until that first snapshot
//! resolves, local edits must never be written out, or a stray early write
//! could replace genuine cloud data with defaults.
//!
//! ## Persistence
//!
//! Edits apply to memory synchronously and schedule a debounced merge-write
//! of the full current state. Re-arming cancels the previous timer, so an
//! edit burst collapses into one write carrying the latest state; the
//! in-memory state is always ahead of or equal to the persisted state. Write
//! failures are logged and never rolled back.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{bail, Result};
use log::{error, info};
use shared::{
    default_groups, BudgetData, BudgetItem, BudgetItemPatch, BudgetPatch, CategoryItem, Client,
    Group, PaymentTerm,
};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::storage::{BudgetDocumentStore, SnapshotEvent};

/// Delay between the last edit of a burst and the remote write.
pub const DEBOUNCE_DELAY: Duration = Duration::from_secs(1);

struct SyncState {
    budget: BudgetData,
    loading: bool,
    has_loaded_remote: bool,
    pending_write: Option<JoinHandle<()>>,
}

struct SyncShared {
    state: Mutex<SyncState>,
    is_saving: AtomicBool,
    changes: watch::Sender<BudgetData>,
}

pub struct BudgetSyncService<S: BudgetDocumentStore> {
    store: Arc<S>,
    shared: Arc<SyncShared>,
    debounce_delay: Duration,
}

// Manual impl: cloning shares the same state and store, whatever `S` is.
impl<S: BudgetDocumentStore> Clone for BudgetSyncService<S> {
    fn clone(&self) -> Self {
        BudgetSyncService {
            store: Arc::clone(&self.store),
            shared: Arc::clone(&self.shared),
            debounce_delay: self.debounce_delay,
        }
    }
}

impl<S: BudgetDocumentStore> BudgetSyncService<S> {
    /// Start the service: spawn the snapshot listener and expose the local
    /// state. Requires a running tokio runtime.
    pub fn start(store: Arc<S>) -> Self {
        Self::with_debounce(store, DEBOUNCE_DELAY)
    }

    /// Same as [`start`](Self::start) with a custom debounce delay; tests use
    /// short delays to keep the suite fast.
    pub fn with_debounce(store: Arc<S>, debounce_delay: Duration) -> Self {
        let defaults = BudgetData::default();
        let (changes, _) = watch::channel(defaults.clone());
        let shared = Arc::new(SyncShared {
            state: Mutex::new(SyncState {
                budget: defaults,
                loading: true,
                has_loaded_remote: false,
                pending_write: None,
            }),
            is_saving: AtomicBool::new(false),
            changes,
        });

        let mut snapshots = store.subscribe();
        let listener_shared = Arc::clone(&shared);
        tokio::spawn(async move {
            while let Some(event) = snapshots.recv().await {
                match event {
                    SnapshotEvent::Document(patch) => {
                        let mut state = listener_shared.state.lock().unwrap();
                        // Stored fields win field-by-field over the defaults;
                        // fields the document never had fall back cleanly.
                        let mut merged = BudgetData::default();
                        merged.apply(patch);
                        state.budget = merged;
                        state.loading = false;
                        state.has_loaded_remote = true;
                        let _ = listener_shared.changes.send(state.budget.clone());
                    }
                    SnapshotEvent::Missing => {
                        let mut state = listener_shared.state.lock().unwrap();
                        state.loading = false;
                        // The document does not exist yet; marking the remote
                        // as loaded is what permits first-time creation.
                        state.has_loaded_remote = true;
                        info!("budget document missing, starting from defaults");
                    }
                    SnapshotEvent::Error(message) => {
                        let mut state = listener_shared.state.lock().unwrap();
                        state.loading = false;
                        error!("budget subscription error: {}", message);
                    }
                }
            }
        });

        BudgetSyncService {
            store,
            shared,
            debounce_delay,
        }
    }

    /// Current budget state.
    pub fn budget(&self) -> BudgetData {
        self.shared.state.lock().unwrap().budget.clone()
    }

    /// True only before the first snapshot has resolved.
    pub fn loading(&self) -> bool {
        self.shared.state.lock().unwrap().loading
    }

    /// True strictly while a persistence write is in flight (not while a
    /// debounce timer is merely pending).
    pub fn is_saving(&self) -> bool {
        self.shared.is_saving.load(Ordering::SeqCst)
    }

    /// Change feed for UI re-rendering; fires on every local mutation and
    /// every merged remote snapshot.
    pub fn watch(&self) -> watch::Receiver<BudgetData> {
        self.shared.changes.subscribe()
    }

    /// Apply a partial update: shallow-merge into memory immediately, then
    /// (re)arm the debounced persistence if the remote has been loaded.
    pub fn update(&self, patch: BudgetPatch) {
        let mut state = self.shared.state.lock().unwrap();
        state.budget.apply(patch);
        let _ = self.shared.changes.send(state.budget.clone());

        if !state.has_loaded_remote {
            return;
        }
        if let Some(pending) = state.pending_write.take() {
            pending.abort();
        }

        let store = Arc::clone(&self.store);
        let shared = Arc::clone(&self.shared);
        let delay = self.debounce_delay;
        state.pending_write = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // Snapshot the state at fire time: the write carries the
            // cumulative effect of the whole edit burst.
            let budget = shared.state.lock().unwrap().budget.clone();
            shared.is_saving.store(true, Ordering::SeqCst);
            if let Err(e) = store.merge_write(&budget) {
                error!("failed to persist budget: {:#}", e);
            }
            shared.is_saving.store(false, Ordering::SeqCst);
        }));
    }

    /// Cancel any pending debounce and persist the current state now. Used on
    /// graceful shutdown; a no-op while the remote has not been loaded.
    pub fn flush(&self) -> Result<()> {
        let budget = {
            let mut state = self.shared.state.lock().unwrap();
            if !state.has_loaded_remote {
                return Ok(());
            }
            if let Some(pending) = state.pending_write.take() {
                pending.abort();
            }
            state.budget.clone()
        };
        self.shared.is_saving.store(true, Ordering::SeqCst);
        let result = self.store.merge_write(&budget);
        self.shared.is_saving.store(false, Ordering::SeqCst);
        result
    }

    // ---- Domain operations; every one of them goes through `update` ----

    /// Append a new empty line pointing at the first group and its first
    /// category.
    pub fn add_item(&self) -> BudgetItem {
        let budget = self.budget();
        let catalog = if budget.dynamic_groups.is_empty() {
            default_groups()
        } else {
            budget.dynamic_groups.clone()
        };
        let group = &catalog[0];
        let category = group
            .categories
            .first()
            .map(|c| c.name.clone())
            .unwrap_or_default();

        let item = BudgetItem::new(group.name.clone(), category);
        let mut items = budget.items;
        items.push(item.clone());
        self.update(BudgetPatch {
            items: Some(items),
            ..Default::default()
        });
        item
    }

    /// Patch a single line. Changing the group re-points the category to the
    /// first category of the newly selected group.
    pub fn update_item(&self, item_id: &str, patch: BudgetItemPatch) -> Result<BudgetItem> {
        let budget = self.budget();
        let mut items = budget.items;
        let Some(item) = items.iter_mut().find(|i| i.id == item_id) else {
            bail!("no budget item with id '{}'", item_id);
        };

        if let Some(description) = patch.description {
            item.description = description;
        }
        if let Some(width) = patch.width {
            item.width = Some(width);
        }
        if let Some(height) = patch.height {
            item.height = Some(height);
        }
        if let Some(quantity) = patch.quantity {
            item.quantity = quantity;
        }
        if let Some(cost_price) = patch.cost_price {
            item.cost_price = cost_price;
        }
        if let Some(sale_price) = patch.sale_price {
            item.sale_price = sale_price;
        }
        if let Some(category) = patch.category {
            item.category = category;
        }
        if let Some(group) = patch.group {
            item.group = group;
            if let Some(catalog_group) =
                budget.dynamic_groups.iter().find(|g| g.name == item.group)
            {
                if let Some(first) = catalog_group.categories.first() {
                    item.category = first.name.clone();
                }
            }
        }

        let updated = item.clone();
        self.update(BudgetPatch {
            items: Some(items),
            ..Default::default()
        });
        Ok(updated)
    }

    pub fn remove_item(&self, item_id: &str) -> Result<()> {
        let budget = self.budget();
        let mut items = budget.items;
        let before = items.len();
        items.retain(|i| i.id != item_id);
        if items.len() == before {
            bail!("no budget item with id '{}'", item_id);
        }
        self.update(BudgetPatch {
            items: Some(items),
            ..Default::default()
        });
        Ok(())
    }

    /// Clear the client block and the item list; everything else (company,
    /// notes, catalog, terms) survives a reset.
    pub fn reset(&self) {
        self.update(BudgetPatch {
            client: Some(Client::default()),
            items: Some(Vec::new()),
            ..Default::default()
        });
    }

    /// Add a group, seeded with a single "General" category. Names are unique
    /// case-insensitively.
    pub fn add_group(&self, name: &str) -> Result<Group> {
        let name = name.trim();
        if name.is_empty() {
            bail!("group name must not be empty");
        }
        let budget = self.budget();
        if budget
            .dynamic_groups
            .iter()
            .any(|g| g.name.eq_ignore_ascii_case(name))
        {
            bail!("group '{}' already exists", name);
        }

        let group = Group {
            name: name.to_string(),
            categories: vec![CategoryItem::new("General")],
        };
        let mut groups = budget.dynamic_groups;
        groups.push(group.clone());
        self.update(BudgetPatch {
            dynamic_groups: Some(groups),
            ..Default::default()
        });
        Ok(group)
    }

    /// Remove a group. The last group can never be removed; items that
    /// referenced the removed group are re-pointed at the first remaining
    /// group and its first category, so no line is left dangling.
    pub fn remove_group(&self, name: &str) -> Result<()> {
        let budget = self.budget();
        if budget.dynamic_groups.len() <= 1 {
            bail!("at least one group must exist");
        }
        if !budget.dynamic_groups.iter().any(|g| g.name == name) {
            bail!("no group named '{}'", name);
        }

        let mut groups = budget.dynamic_groups;
        groups.retain(|g| g.name != name);

        let fallback = groups[0].clone();
        let fallback_category = fallback
            .categories
            .first()
            .map(|c| c.name.clone())
            .unwrap_or_default();
        let mut items = budget.items;
        for item in items.iter_mut().filter(|i| i.group == name) {
            item.group = fallback.name.clone();
            item.category = fallback_category.clone();
        }

        self.update(BudgetPatch {
            dynamic_groups: Some(groups),
            items: Some(items),
            ..Default::default()
        });
        Ok(())
    }

    /// Add a category to a group; unique per group, case-insensitively.
    pub fn add_category(&self, group_name: &str, category_name: &str) -> Result<CategoryItem> {
        let category_name = category_name.trim();
        if category_name.is_empty() {
            bail!("category name must not be empty");
        }
        let budget = self.budget();
        let mut groups = budget.dynamic_groups;
        let Some(group) = groups.iter_mut().find(|g| g.name == group_name) else {
            bail!("no group named '{}'", group_name);
        };
        if group
            .categories
            .iter()
            .any(|c| c.name.eq_ignore_ascii_case(category_name))
        {
            bail!(
                "category '{}' already exists in group '{}'",
                category_name,
                group_name
            );
        }

        let category = CategoryItem::new(category_name);
        group.categories.push(category.clone());
        self.update(BudgetPatch {
            dynamic_groups: Some(groups),
            ..Default::default()
        });
        Ok(category)
    }

    /// Remove a category from a group. A group keeps at least one category;
    /// items that referenced the removed category fall back to the group's
    /// first remaining one.
    pub fn remove_category(&self, group_name: &str, category_name: &str) -> Result<()> {
        let budget = self.budget();
        let mut groups = budget.dynamic_groups;
        let Some(group) = groups.iter_mut().find(|g| g.name == group_name) else {
            bail!("no group named '{}'", group_name);
        };
        if group.categories.len() <= 1 {
            bail!("every group keeps at least one category");
        }
        let before = group.categories.len();
        group.categories.retain(|c| c.name != category_name);
        if group.categories.len() == before {
            bail!(
                "no category '{}' in group '{}'",
                category_name,
                group_name
            );
        }

        let fallback = group.categories[0].name.clone();
        let mut items = budget.items;
        for item in items
            .iter_mut()
            .filter(|i| i.group == group_name && i.category == category_name)
        {
            item.category = fallback.clone();
        }

        self.update(BudgetPatch {
            dynamic_groups: Some(groups),
            items: Some(items),
            ..Default::default()
        });
        Ok(())
    }

    /// Replace the payment-term list wholesale. The percentage sum is an
    /// advisory concern surfaced by the UI, never enforced here.
    pub fn set_payment_terms(&self, terms: Vec<PaymentTerm>) {
        self.update(BudgetPatch {
            payment_terms: Some(terms),
            ..Default::default()
        });
    }
}
