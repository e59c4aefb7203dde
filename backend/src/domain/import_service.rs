//! Import of previously exported budget files.
//!
//! An imported file is applied as a partial update: only the portable fields
//! it actually carries replace local state, everything else is untouched. A
//! malformed file is rejected wholesale so local state never ends up
//! half-imported.

use anyhow::{bail, Context, Result};
use serde_json::Value;
use shared::BudgetPatch;

#[derive(Clone, Default)]
pub struct ImportService;

impl ImportService {
    pub fn new() -> Self {
        ImportService
    }

    /// Parse a budget file into the patch to apply. Recognized fields:
    /// `client`, `items`, `notes`, `ivaRate`, `company`, `dynamicGroups`;
    /// anything else in the file (including `version`) is ignored.
    pub fn parse(&self, content: &str) -> Result<BudgetPatch> {
        let value: Value =
            serde_json::from_str(content).context("imported file is not valid JSON")?;
        let Value::Object(map) = value else {
            bail!("imported file is not a JSON object");
        };

        let field = |name: &str| map.get(name).filter(|v| !v.is_null()).cloned();

        let mut patch = BudgetPatch::default();
        if let Some(v) = field("client") {
            patch.client = Some(serde_json::from_value(v).context("invalid client block")?);
        }
        if let Some(v) = field("items") {
            patch.items = Some(serde_json::from_value(v).context("invalid items list")?);
        }
        if let Some(v) = field("notes") {
            patch.notes = Some(serde_json::from_value(v).context("invalid notes")?);
        }
        if let Some(v) = field("ivaRate") {
            patch.iva_rate = Some(serde_json::from_value(v).context("invalid ivaRate")?);
        }
        if let Some(v) = field("company") {
            patch.company = Some(serde_json::from_value(v).context("invalid company block")?);
        }
        if let Some(v) = field("dynamicGroups") {
            patch.dynamic_groups =
                Some(serde_json::from_value(v).context("invalid group catalog")?);
        }
        Ok(patch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_yields_partial_patch() {
        let service = ImportService::new();
        let patch = service.parse(r#"{ "notes": "<p>x</p>" }"#).unwrap();

        assert_eq!(patch.notes.as_deref(), Some("<p>x</p>"));
        assert!(patch.client.is_none());
        assert!(patch.items.is_none());
        assert!(patch.company.is_none());
        assert!(patch.dynamic_groups.is_none());
        assert!(patch.iva_rate.is_none());
    }

    #[test]
    fn unknown_and_null_fields_are_ignored() {
        let service = ImportService::new();
        let patch = service
            .parse(r#"{ "version": "1.0", "notes": null, "ivaRate": 0.10 }"#)
            .unwrap();
        assert!(patch.notes.is_none());
        assert_eq!(patch.iva_rate, Some(0.10));
    }

    #[test]
    fn malformed_json_is_rejected() {
        let service = ImportService::new();
        assert!(service.parse("{ not json").is_err());
        assert!(service.parse("[1, 2]").is_err());
    }

    #[test]
    fn mistyped_field_rejects_the_whole_file() {
        let service = ImportService::new();
        assert!(service.parse(r#"{ "ivaRate": "twenty-one" }"#).is_err());
        assert!(service.parse(r#"{ "items": { "not": "a list" } }"#).is_err());
    }

    #[test]
    fn round_trips_an_exported_file() {
        let export = crate::domain::export_service::ExportService::new();
        let mut budget = shared::BudgetData::default();
        budget.client.name = "Cliente".to_string();
        budget.iva_rate = 0.10;
        let file = export.export_json(&budget).unwrap();

        let service = ImportService::new();
        let patch = service.parse(std::str::from_utf8(&file.bytes).unwrap()).unwrap();
        assert_eq!(patch.iva_rate, Some(0.10));
        assert_eq!(patch.client.unwrap().name, "Cliente");
    }
}
