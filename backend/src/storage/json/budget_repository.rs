//! JSON-file budget document repository.
//!
//! One document, one file: `budgets/global-shared-budget-v1.json` under the
//! base data directory. Reads tolerate a missing file (the document simply
//! does not exist yet); writes merge over whatever is already stored and are
//! committed with the temp-file + rename pattern.

use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use log::{debug, info, warn};
use serde_json::{Map, Value};
use shared::{BudgetData, BudgetPatch};
use tokio::sync::mpsc;

use super::super::traits::{BudgetDocumentStore, SnapshotEvent, GLOBAL_BUDGET_DOC_ID};

pub struct JsonBudgetRepository {
    base_directory: PathBuf,
    subscribers: Mutex<Vec<mpsc::UnboundedSender<SnapshotEvent>>>,
}

impl JsonBudgetRepository {
    /// Create a repository rooted at the given data directory. The directory
    /// tree is created eagerly so the first write cannot fail on a missing
    /// parent.
    pub fn new(base_directory: impl Into<PathBuf>) -> Result<Self> {
        let base_directory = base_directory.into();
        let budgets_dir = base_directory.join("budgets");
        fs::create_dir_all(&budgets_dir)
            .with_context(|| format!("failed to create data directory {:?}", budgets_dir))?;
        info!("budget document store at {:?}", budgets_dir);
        Ok(JsonBudgetRepository {
            base_directory,
            subscribers: Mutex::new(Vec::new()),
        })
    }

    pub fn document_path(&self) -> PathBuf {
        self.base_directory
            .join("budgets")
            .join(format!("{}.json", GLOBAL_BUDGET_DOC_ID))
    }

    /// Load the stored document as a raw JSON object, `None` if it has never
    /// been written.
    fn read_document(&self) -> Result<Option<Map<String, Value>>> {
        let path = self.document_path();
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&path)
            .with_context(|| format!("failed to read budget document {:?}", path))?;
        let value: Value = serde_json::from_str(&content)
            .with_context(|| format!("budget document {:?} is not valid JSON", path))?;
        match value {
            Value::Object(map) => Ok(Some(map)),
            _ => anyhow::bail!("budget document {:?} is not a JSON object", path),
        }
    }

    fn write_document(&self, map: &Map<String, Value>) -> Result<()> {
        let path = self.document_path();
        let content = serde_json::to_string_pretty(&Value::Object(map.clone()))?;

        // Atomic write pattern: write to temp file, then rename.
        let temp_path = path.with_extension("tmp");
        fs::write(&temp_path, content)
            .with_context(|| format!("failed to write {:?}", temp_path))?;
        fs::rename(&temp_path, &path)
            .with_context(|| format!("failed to commit {:?}", path))?;
        debug!("budget document saved to {:?}", path);
        Ok(())
    }

    fn snapshot_event(map: Map<String, Value>) -> SnapshotEvent {
        match serde_json::from_value::<BudgetPatch>(Value::Object(map)) {
            Ok(patch) => SnapshotEvent::Document(patch),
            Err(e) => SnapshotEvent::Error(e.to_string()),
        }
    }

    fn broadcast(&self, map: &Map<String, Value>) {
        let event = Self::snapshot_event(map.clone());
        self.subscribers
            .lock()
            .unwrap()
            .retain(|tx| tx.send(event.clone()).is_ok());
    }
}

impl BudgetDocumentStore for JsonBudgetRepository {
    fn subscribe(&self) -> mpsc::UnboundedReceiver<SnapshotEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        let initial = match self.read_document() {
            Ok(Some(map)) => Self::snapshot_event(map),
            Ok(None) => SnapshotEvent::Missing,
            Err(e) => SnapshotEvent::Error(e.to_string()),
        };
        let _ = tx.send(initial);
        self.subscribers.lock().unwrap().push(tx);
        rx
    }

    fn merge_write(&self, budget: &BudgetData) -> Result<()> {
        // An unreadable document must not block saving: last write wins.
        let mut map = match self.read_document() {
            Ok(existing) => existing.unwrap_or_default(),
            Err(e) => {
                warn!("discarding unreadable budget document: {:#}", e);
                Map::new()
            }
        };

        match serde_json::to_value(budget)? {
            Value::Object(fields) => {
                for (key, value) in fields {
                    map.insert(key, value);
                }
            }
            _ => anyhow::bail!("budget did not serialize to a JSON object"),
        }

        self.write_document(&map)?;
        self.broadcast(&map);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup() -> (JsonBudgetRepository, TempDir) {
        let temp_dir = TempDir::new().expect("failed to create temp dir");
        let repo = JsonBudgetRepository::new(temp_dir.path()).expect("failed to create repo");
        (repo, temp_dir)
    }

    #[tokio::test]
    async fn missing_document_reports_missing() {
        let (repo, _dir) = setup();
        let mut rx = repo.subscribe();
        assert!(matches!(rx.recv().await, Some(SnapshotEvent::Missing)));
    }

    #[tokio::test]
    async fn write_then_subscribe_round_trips() {
        let (repo, _dir) = setup();

        let mut budget = BudgetData::default();
        budget.notes = "<p>condiciones</p>".to_string();
        budget.iva_rate = 0.10;
        repo.merge_write(&budget).unwrap();

        let mut rx = repo.subscribe();
        match rx.recv().await {
            Some(SnapshotEvent::Document(patch)) => {
                assert_eq!(patch.notes.as_deref(), Some("<p>condiciones</p>"));
                assert_eq!(patch.iva_rate, Some(0.10));
            }
            other => panic!("expected document snapshot, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn live_subscribers_are_notified_of_writes() {
        let (repo, _dir) = setup();
        let mut rx = repo.subscribe();
        assert!(matches!(rx.recv().await, Some(SnapshotEvent::Missing)));

        repo.merge_write(&BudgetData::default()).unwrap();
        assert!(matches!(rx.recv().await, Some(SnapshotEvent::Document(_))));
    }

    #[test]
    fn merge_write_preserves_foreign_fields() {
        let (repo, _dir) = setup();

        let mut map = Map::new();
        map.insert("futureField".to_string(), Value::from(42));
        repo.write_document(&map).unwrap();

        repo.merge_write(&BudgetData::default()).unwrap();

        let stored = repo.read_document().unwrap().unwrap();
        assert_eq!(stored.get("futureField"), Some(&Value::from(42)));
        assert!(stored.contains_key("client"));
    }

    #[tokio::test]
    async fn corrupt_document_surfaces_subscription_error() {
        let (repo, _dir) = setup();
        fs::write(repo.document_path(), "{not json").unwrap();

        let mut rx = repo.subscribe();
        assert!(matches!(rx.recv().await, Some(SnapshotEvent::Error(_))));
    }
}
