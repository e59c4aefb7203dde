//! In-memory budget document store.
//!
//! Keeps the document as a plain JSON object map behind a mutex. The write
//! counter and the failure/silent constructors make the sync service's
//! persistence behaviour observable in tests without touching the disk.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use anyhow::Result;
use log::debug;
use serde_json::{Map, Value};
use shared::{BudgetData, BudgetPatch};
use tokio::sync::mpsc;

use super::traits::{BudgetDocumentStore, SnapshotEvent};

#[derive(Default)]
pub struct MemoryBudgetStore {
    document: Mutex<Option<Map<String, Value>>>,
    subscribers: Mutex<Vec<mpsc::UnboundedSender<SnapshotEvent>>>,
    write_count: AtomicUsize,
    fail_subscriptions: bool,
    suppress_initial: bool,
}

impl MemoryBudgetStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store whose subscriptions immediately report an error, for exercising
    /// the fail-open path.
    pub fn failing() -> Self {
        MemoryBudgetStore {
            fail_subscriptions: true,
            ..Self::default()
        }
    }

    /// Store that never delivers the initial snapshot, like a remote that is
    /// slow to answer. Later writes still broadcast.
    pub fn silent() -> Self {
        MemoryBudgetStore {
            suppress_initial: true,
            ..Self::default()
        }
    }

    /// Pre-load the document, as if another session had written it earlier.
    pub fn seed(&self, budget: &BudgetData) {
        let map = to_object(budget);
        *self.document.lock().unwrap() = Some(map);
    }

    /// Number of merge-writes committed so far.
    pub fn write_count(&self) -> usize {
        self.write_count.load(Ordering::SeqCst)
    }

    /// Current document contents, if any.
    pub fn document(&self) -> Option<Map<String, Value>> {
        self.document.lock().unwrap().clone()
    }

    fn broadcast(&self, map: &Map<String, Value>) {
        let event = match serde_json::from_value::<BudgetPatch>(Value::Object(map.clone())) {
            Ok(patch) => SnapshotEvent::Document(patch),
            Err(e) => SnapshotEvent::Error(e.to_string()),
        };
        self.subscribers
            .lock()
            .unwrap()
            .retain(|tx| tx.send(event.clone()).is_ok());
    }
}

fn to_object(budget: &BudgetData) -> Map<String, Value> {
    match serde_json::to_value(budget) {
        Ok(Value::Object(map)) => map,
        _ => Map::new(),
    }
}

impl BudgetDocumentStore for MemoryBudgetStore {
    fn subscribe(&self) -> mpsc::UnboundedReceiver<SnapshotEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        if self.fail_subscriptions {
            let _ = tx.send(SnapshotEvent::Error("subscription refused".to_string()));
            return rx;
        }
        if self.suppress_initial {
            self.subscribers.lock().unwrap().push(tx);
            return rx;
        }

        let initial = match self.document.lock().unwrap().as_ref() {
            Some(map) => match serde_json::from_value::<BudgetPatch>(Value::Object(map.clone())) {
                Ok(patch) => SnapshotEvent::Document(patch),
                Err(e) => SnapshotEvent::Error(e.to_string()),
            },
            None => SnapshotEvent::Missing,
        };
        let _ = tx.send(initial);
        self.subscribers.lock().unwrap().push(tx);
        rx
    }

    fn merge_write(&self, budget: &BudgetData) -> Result<()> {
        let merged = {
            let mut doc = self.document.lock().unwrap();
            let mut map = doc.take().unwrap_or_default();
            for (key, value) in to_object(budget) {
                map.insert(key, value);
            }
            *doc = Some(map.clone());
            map
        };
        self.write_count.fetch_add(1, Ordering::SeqCst);
        debug!("memory store committed write #{}", self.write_count());
        self.broadcast(&merged);
        Ok(())
    }
}
