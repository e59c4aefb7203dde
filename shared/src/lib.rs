use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Version marker written into exported budget files.
pub const EXPORT_FORMAT_VERSION: &str = "1.0";

/// Bank account printed on the budget document and referenced in the default notes.
pub const BANK_ACCOUNT: &str = "ES23 2100 3771 2022 0013 7681";

/// UI / document language.
///
/// The printable document is always bilingual; this selects the language of the
/// editing surface and is persisted with the rest of the budget so every
/// session sees the same choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Eu,
    Es,
}

impl Default for Language {
    fn default() -> Self {
        Language::Eu
    }
}

/// Client block of the budget: who the quote is for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    pub name: String,
    pub address: String,
    pub city: String,
    /// NIF/CIF as typed by the user. Validation is advisory only.
    pub dni: String,
    pub phone: String,
    pub email: String,
    /// ISO date (YYYY-MM-DD) shown on the document.
    pub date: String,
    pub project: String,
    /// Data-URL of the client's drawn signature, if captured.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
}

impl Default for Client {
    fn default() -> Self {
        Client {
            name: String::new(),
            address: String::new(),
            city: String::new(),
            dni: String::new(),
            phone: String::new(),
            email: String::new(),
            date: Utc::now().date_naive().to_string(),
            project: String::new(),
            signature: None,
        }
    }
}

/// Issuing company block. Editable only while `companyLocked` is cleared,
/// but that lock is a UI concern; the data layer never rejects an update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyInfo {
    pub name: String,
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    pub phone: String,
    pub email: String,
    pub cif: String,
    /// Image reference (path or data-URL) for the company logo.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
    /// Image reference for the company stamp/signature.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
}

impl Default for CompanyInfo {
    fn default() -> Self {
        CompanyInfo {
            name: "DLKom".to_string(),
            address: "Garaizar nº 4 - 1º".to_string(),
            city: None,
            phone: "944 15 66 77".to_string(),
            email: "bilbao@dlkom.com".to_string(),
            cif: "B95123456".to_string(),
            logo: Some("/DLKomPresupuesto/logo.png".to_string()),
            signature: Some("/DLKomPresupuesto/SELLO.jpg".to_string()),
        }
    }
}

/// A selectable concept inside a group, with an optional suggested price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryItem {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_price: Option<f64>,
}

impl CategoryItem {
    pub fn new(name: impl Into<String>) -> Self {
        CategoryItem {
            name: name.into(),
            default_price: None,
        }
    }
}

/// Top-level bucket for line items (e.g. "Obra Civil"). Group names are
/// unique within the collection; every group keeps at least one category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub name: String,
    pub categories: Vec<CategoryItem>,
}

/// A single budget line.
///
/// `group` and `category` reference the group catalog by name. They are
/// resolved at creation time; catalog edits re-point affected items rather
/// than leaving dangling names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetItem {
    pub id: String,
    pub group: String,
    pub category: String,
    pub description: String,
    /// Optional m² dimensions feeding the quantity column.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    pub quantity: f64,
    pub cost_price: f64,
    pub sale_price: f64,
}

impl BudgetItem {
    /// New empty line pointing at the given group/category pair.
    pub fn new(group: impl Into<String>, category: impl Into<String>) -> Self {
        BudgetItem {
            id: Uuid::new_v4().to_string(),
            group: group.into(),
            category: category.into(),
            description: String::new(),
            width: None,
            height: None,
            quantity: 1.0,
            cost_price: 0.0,
            sale_price: 0.0,
        }
    }

    /// Line total: sale price times quantity.
    pub fn total(&self) -> f64 {
        self.sale_price * self.quantity
    }

    /// Margin as a fraction of the sale price, 0 when there is no sale price.
    pub fn margin(&self) -> f64 {
        if self.sale_price > 0.0 {
            (self.sale_price - self.cost_price) / self.sale_price
        } else {
            0.0
        }
    }
}

/// A named percentage-of-total installment (e.g. "30% a la aceptación").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentTerm {
    pub id: String,
    pub label: String,
    pub percentage: f64,
}

/// The whole budget document: the single unit of persistence and sync.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetData {
    pub client: Client,
    pub items: Vec<BudgetItem>,
    /// Legal notes as an HTML fragment, printed on the final page.
    pub notes: String,
    /// VAT rate as a fraction (0.21 = 21%).
    pub iva_rate: f64,
    pub company: CompanyInfo,
    pub dynamic_groups: Vec<Group>,
    pub payment_terms: Vec<PaymentTerm>,
    pub show_prices: bool,
    pub company_locked: bool,
    pub notes_locked: bool,
    pub language: Language,
}

impl Default for BudgetData {
    fn default() -> Self {
        BudgetData {
            client: Client::default(),
            items: Vec::new(),
            notes: DEFAULT_NOTES.to_string(),
            iva_rate: 0.21,
            company: CompanyInfo::default(),
            dynamic_groups: default_groups(),
            payment_terms: default_payment_terms(),
            show_prices: true,
            company_locked: true,
            notes_locked: true,
            language: Language::Eu,
        }
    }
}

impl BudgetData {
    /// Shallow-merge a partial update into this budget: present fields win
    /// wholesale, absent fields are left untouched. This is the only merge
    /// semantics anywhere in the system; nested structures are replaced, not
    /// deep-merged.
    pub fn apply(&mut self, patch: BudgetPatch) {
        if let Some(client) = patch.client {
            self.client = client;
        }
        if let Some(items) = patch.items {
            self.items = items;
        }
        if let Some(notes) = patch.notes {
            self.notes = notes;
        }
        if let Some(iva_rate) = patch.iva_rate {
            self.iva_rate = iva_rate;
        }
        if let Some(company) = patch.company {
            self.company = company;
        }
        if let Some(groups) = patch.dynamic_groups {
            self.dynamic_groups = groups;
        }
        if let Some(terms) = patch.payment_terms {
            self.payment_terms = terms;
        }
        if let Some(show_prices) = patch.show_prices {
            self.show_prices = show_prices;
        }
        if let Some(locked) = patch.company_locked {
            self.company_locked = locked;
        }
        if let Some(locked) = patch.notes_locked {
            self.notes_locked = locked;
        }
        if let Some(language) = patch.language {
            self.language = language;
        }
    }
}

/// Partial update of [`BudgetData`]: every field optional. This is both the
/// mutation payload accepted by the sync service and the shape a remote
/// snapshot is read as (a stored document may predate newer fields).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client: Option<Client>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<BudgetItem>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iva_rate: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<CompanyInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dynamic_groups: Option<Vec<Group>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_terms: Option<Vec<PaymentTerm>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_prices: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_locked: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes_locked: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<Language>,
}

impl BudgetPatch {
    pub fn is_empty(&self) -> bool {
        self == &BudgetPatch::default()
    }
}

/// Partial update of a single budget line, keyed by item id at the API level.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetItemPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sale_price: Option<f64>,
}

/// Budget file format written by the JSON export and read back by import.
/// Carries only the portable part of the document plus a version marker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportedBudget {
    pub client: Client,
    pub items: Vec<BudgetItem>,
    pub notes: String,
    pub iva_rate: f64,
    pub company: CompanyInfo,
    pub dynamic_groups: Vec<Group>,
    pub version: String,
}

/// Read-state snapshot returned by the budget API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetStateResponse {
    pub budget: BudgetData,
    /// True only before the first remote snapshot has resolved.
    pub loading: bool,
    /// True strictly while a persistence write is in flight.
    pub is_saving: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddGroupRequest {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddCategoryRequest {
    pub name: String,
}

/// Advisory validation results; a `None` means the field was not checked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dni: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<bool>,
}

/// Default legal conditions, printed on the last page of the document.
pub const DEFAULT_NOTES: &str = "1. VALIDEZ DEL PRESUPUESTO
El presente presupuesto tiene una validez de 30 días naturales a partir de su fecha de emisión.

2. FORMA DE PAGO
- 30% A la aceptación del presupuesto.
- 40% Al inicio de las obras y recepción de materiales.
- 30% A la finalización y entrega de la obra.

3. EJECUCIÓN Y PLAZOS
El plazo estimado de ejecución se acordará de mutuo acuerdo tras la firma. Retrasos ajenos a DLKom (falta de suministro, inclemencias o cambios del cliente) no serán responsabilidad de la empresa.

4. GARANTÍAS
DLKom garantiza sus trabajos según la legislación vigente (LOE). La garantía no cubre desperfectos debidos a un uso inadecuado o falta de mantenimiento.

5. DATOS BANCARIOS
CUENTA: ES23 2100 3771 2022 0013 7681";

/// Seeded group catalog for a renovation business.
pub fn default_groups() -> Vec<Group> {
    vec![
        Group {
            name: "Obra Civil".to_string(),
            categories: [
                "Albañilería",
                "Carpintería",
                "Fontanería",
                "Electricidad",
                "Lucidor",
                "Pladur",
                "Pintura",
                "Metalistería",
                "Ebanistería",
                "Barnizador",
                "Lacador",
                "Acuchillador",
            ]
            .into_iter()
            .map(CategoryItem::new)
            .collect(),
        },
        Group {
            name: "Decoracion".to_string(),
            categories: [
                "Mob. Cocina",
                "Mob. Baño",
                "Gress",
                "Accesorios cocina",
                "Accesorios Baño",
                "Mob. Salon",
                "Mob. General",
            ]
            .into_iter()
            .map(CategoryItem::new)
            .collect(),
        },
        Group {
            name: "Varios".to_string(),
            categories: ["Transporte", "Desescombro", "Otras instalaciones", "Varios"]
                .into_iter()
                .map(CategoryItem::new)
                .collect(),
        },
        Group {
            name: "Formas de Pago".to_string(),
            categories: ["Transferencia", "A la vista"]
                .into_iter()
                .map(CategoryItem::new)
                .collect(),
        },
    ]
}

/// Default 30/40/30 installment split, matching the default notes text.
pub fn default_payment_terms() -> Vec<PaymentTerm> {
    vec![
        PaymentTerm {
            id: "term-1".to_string(),
            label: "A la aceptación del presupuesto".to_string(),
            percentage: 30.0,
        },
        PaymentTerm {
            id: "term-2".to_string(),
            label: "Al inicio de las obras y recepción de materiales".to_string(),
            percentage: 40.0,
        },
        PaymentTerm {
            id: "term-3".to_string(),
            label: "A la finalización y entrega de la obra".to_string(),
            percentage: 30.0,
        },
    ]
}
