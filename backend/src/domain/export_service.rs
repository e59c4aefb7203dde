//! Export service: budget files for saving and sharing.
//!
//! Two formats: the portable JSON budget file (re-importable, versioned) and
//! a single-sheet XLSX workbook mirroring the printed document. The service
//! produces in-memory files with their suggested filenames; writing to disk
//! is a separate step so an HTTP caller can stream the bytes instead.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use chrono::Utc;
use log::info;
use once_cell::sync::Lazy;
use regex::Regex;
use rust_xlsxwriter::Workbook;
use shared::{BudgetData, ExportedBudget, EXPORT_FORMAT_VERSION};

use super::totals::compute_totals;

static HTML_TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").unwrap());

pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// An export ready to hand to the user: suggested filename plus raw bytes.
#[derive(Debug, Clone)]
pub struct ExportFile {
    pub filename: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

/// Drop every HTML tag, keeping the text content. Used where the notes field
/// lands in a plain-text cell.
pub fn strip_html(value: &str) -> String {
    HTML_TAG_RE.replace_all(value, "").to_string()
}

#[derive(Clone, Default)]
pub struct ExportService;

impl ExportService {
    pub fn new() -> Self {
        ExportService
    }

    /// Portable JSON budget file: the re-importable subset of the document
    /// plus a format version marker, pretty-printed.
    pub fn export_json(&self, budget: &BudgetData) -> Result<ExportFile> {
        let exported = ExportedBudget {
            client: budget.client.clone(),
            items: budget.items.clone(),
            notes: budget.notes.clone(),
            iva_rate: budget.iva_rate,
            company: budget.company.clone(),
            dynamic_groups: budget.dynamic_groups.clone(),
            version: EXPORT_FORMAT_VERSION.to_string(),
        };
        let content = serde_json::to_string_pretty(&exported)?;

        let client_name = if budget.client.name.is_empty() {
            "SinNombre"
        } else {
            budget.client.name.as_str()
        };
        let filename = format!(
            "Presupuesto_{}_{}.json",
            client_name,
            Utc::now().date_naive()
        );

        info!("exported budget as JSON ({} bytes)", content.len());
        Ok(ExportFile {
            filename,
            content_type: JSON_CONTENT_TYPE,
            bytes: content.into_bytes(),
        })
    }

    /// Single-sheet workbook mirroring the printed document: company header,
    /// client block, item rows, totals, then the notes with HTML stripped.
    pub fn export_xlsx(&self, budget: &BudgetData) -> Result<ExportFile> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet.set_name("Presupuesto")?;

        worksheet.set_column_width(0, 60)?;
        worksheet.set_column_width(1, 10)?;
        worksheet.set_column_width(2, 15)?;
        worksheet.set_column_width(3, 15)?;

        let company = &budget.company;
        let client = &budget.client;
        let mut row: u32 = 0;

        worksheet.write_string(row, 0, company.name.to_uppercase())?;
        row += 1;
        worksheet.write_string(row, 0, company.address.as_str())?;
        row += 1;
        worksheet.write_string(
            row,
            0,
            format!(
                "{} - {}",
                company.city.as_deref().unwrap_or_default(),
                company.phone
            ),
        )?;
        row += 1;
        worksheet.write_string(row, 0, format!("CIF: {} | {}", company.cif, company.email))?;
        row += 2;

        worksheet.write_string(row, 0, "DATOS DEL CLIENTE")?;
        row += 1;
        for (label, value) in [
            ("Nombre:", &client.name),
            ("Dirección:", &client.address),
            ("Localidad:", &client.city),
            ("DNI/CIF:", &client.dni),
            ("Fecha:", &client.date),
            ("Proyecto:", &client.project),
        ] {
            worksheet.write_string(row, 0, label)?;
            worksheet.write_string(row, 1, value.as_str())?;
            row += 1;
        }
        row += 1;

        worksheet.write_string(row, 0, "CONCEPTO / DESCRIPCIÓN")?;
        worksheet.write_string(row, 1, "CANTIDAD")?;
        worksheet.write_string(row, 2, "PRECIO UNIDAD")?;
        worksheet.write_string(row, 3, "TOTAL")?;
        row += 1;

        for item in &budget.items {
            worksheet.write_string(row, 0, format!("{}\n{}", item.category, item.description))?;
            worksheet.write_number(row, 1, item.quantity)?;
            worksheet.write_number(row, 2, item.sale_price)?;
            worksheet.write_number(row, 3, item.total())?;
            row += 1;
        }
        row += 1;

        let totals = compute_totals(&budget.items, budget.iva_rate);
        worksheet.write_string(row, 2, "BASE IMPONIBLE:")?;
        worksheet.write_number(row, 3, totals.base)?;
        row += 1;
        worksheet.write_string(row, 2, format!("IVA ({:.0}%):", budget.iva_rate * 100.0))?;
        worksheet.write_number(row, 3, totals.tax)?;
        row += 1;
        worksheet.write_string(row, 2, "TOTAL:")?;
        worksheet.write_number(row, 3, totals.total)?;
        row += 2;

        worksheet.write_string(row, 0, "NOTAS Y CONDICIONES")?;
        row += 1;
        worksheet.write_string(row, 0, strip_html(&budget.notes))?;

        let bytes = workbook.save_to_buffer()?;

        let client_name: String = budget
            .client
            .name
            .split_whitespace()
            .collect::<Vec<_>>()
            .join("_");
        let filename = format!(
            "Presupuesto_{}_{}.xlsx",
            client_name,
            Utc::now().date_naive()
        );

        info!("exported budget as XLSX ({} bytes)", bytes.len());
        Ok(ExportFile {
            filename,
            content_type: XLSX_CONTENT_TYPE,
            bytes,
        })
    }

    /// Write an export to disk. Resolution order for the target directory:
    /// the explicit path, the user's Documents folder, the home directory.
    pub fn export_to_path(&self, file: &ExportFile, custom_dir: Option<&Path>) -> Result<PathBuf> {
        let dir = match custom_dir {
            Some(dir) => dir.to_path_buf(),
            None => dirs::document_dir()
                .or_else(dirs::home_dir)
                .ok_or_else(|| anyhow!("could not determine an export directory"))?,
        };
        fs::create_dir_all(&dir)
            .with_context(|| format!("failed to create export directory {:?}", dir))?;

        let path = dir.join(&file.filename);
        fs::write(&path, &file.bytes)
            .with_context(|| format!("failed to write export file {:?}", path))?;
        info!("exported budget to {:?}", path);
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::BudgetItem;

    fn sample_budget() -> BudgetData {
        let mut budget = BudgetData::default();
        budget.client.name = "Ane Etxebarria".to_string();
        let mut item = BudgetItem::new("Obra Civil", "Pintura");
        item.description = "Pintar salón".to_string();
        item.quantity = 2.0;
        item.sale_price = 300.0;
        budget.items.push(item);
        budget
    }

    #[test]
    fn json_export_carries_version_and_fields() {
        let service = ExportService::new();
        let file = service.export_json(&sample_budget()).unwrap();

        assert!(file.filename.starts_with("Presupuesto_Ane Etxebarria_"));
        assert!(file.filename.ends_with(".json"));

        let value: serde_json::Value = serde_json::from_slice(&file.bytes).unwrap();
        assert_eq!(value["version"], "1.0");
        assert_eq!(value["ivaRate"], 0.21);
        assert_eq!(value["items"][0]["salePrice"], 300.0);
        // Sync-only flags stay out of the portable file.
        assert!(value.get("showPrices").is_none());
        assert!(value.get("paymentTerms").is_none());
    }

    #[test]
    fn json_export_falls_back_to_default_name() {
        let service = ExportService::new();
        let file = service.export_json(&BudgetData::default()).unwrap();
        assert!(file.filename.starts_with("Presupuesto_SinNombre_"));
    }

    #[test]
    fn xlsx_export_produces_a_workbook() {
        let service = ExportService::new();
        let file = service.export_xlsx(&sample_budget()).unwrap();

        assert!(file.filename.starts_with("Presupuesto_Ane_Etxebarria_"));
        assert!(file.filename.ends_with(".xlsx"));
        // XLSX files are zip archives: "PK" magic.
        assert_eq!(&file.bytes[0..2], b"PK");
    }

    #[test]
    fn strip_html_removes_tags_only() {
        assert_eq!(strip_html("<p>Hola <b>mundo</b></p>"), "Hola mundo");
        assert_eq!(strip_html("sin etiquetas"), "sin etiquetas");
        assert_eq!(strip_html(""), "");
    }

    #[test]
    fn export_to_path_writes_the_file() {
        let service = ExportService::new();
        let file = service.export_json(&sample_budget()).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = service.export_to_path(&file, Some(dir.path())).unwrap();
        assert_eq!(fs::read(&path).unwrap(), file.bytes);
    }
}
