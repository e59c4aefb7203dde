//! Label tables for the two document languages (Basque and Spanish).
//!
//! The printable document always shows both languages side by side, so most
//! callers go through [`bilingual`]; [`labels`] serves the single-language
//! editing surface.

use shared::Language;

/// The label set the document and export paths need.
#[derive(Debug, Clone, Copy)]
pub struct Labels {
    pub budget: &'static str,
    pub client_data: &'static str,
    pub date: &'static str,
    pub project: &'static str,
    pub concept: &'static str,
    pub total: &'static str,
    pub summary: &'static str,
    pub base_imponible: &'static str,
    pub iva: &'static str,
    pub total_budget: &'static str,
    pub payment_method: &'static str,
    pub account_number: &'static str,
    pub validity_notice: &'static str,
    pub materials_notice: &'static str,
    pub client_signature: &'static str,
    pub accept_conditions: &'static str,
    pub general_conditions: &'static str,
    pub notes_title: &'static str,
}

pub const EU: Labels = Labels {
    budget: "Aurrekontua",
    client_data: "Bezeroaren Datuak",
    date: "Data",
    project: "Proiektua",
    concept: "Kontzeptua / Azalpena",
    total: "Guztira",
    summary: "Laburpena",
    base_imponible: "Oinarri Zerga-lagun",
    iva: "BEZ",
    total_budget: "AURREKONTUA GUZTIRA",
    payment_method: "ORDAINTZEKO MODUA",
    account_number: "KONTU ZENBAKIA (LA CAIXA)",
    validity_notice: "Aurrekontu honek 15 eguneko balioa du.",
    materials_notice: "Prezio guztiek materialak eta eskulanak barne hartzen dituzte.",
    client_signature: "BEZEROAREN SINADURA",
    accept_conditions: "Baldintzak onartzen ditut",
    general_conditions: "Baldintza Orokorrak eta Oharrak",
    notes_title: "Aurrekontuaren Oharrak eta Baldintzak",
};

pub const ES: Labels = Labels {
    budget: "Presupuesto",
    client_data: "Datos del Cliente",
    date: "Fecha",
    project: "Proyecto",
    concept: "Descripción / Concepto",
    total: "Total",
    summary: "Resumen",
    base_imponible: "Base Imponible",
    iva: "IVA",
    total_budget: "TOTAL PRESUPUESTO",
    payment_method: "FORMA DE PAGO",
    account_number: "Nº DE CUENTA (LA CAIXA)",
    validity_notice: "Este presupuesto tiene una validez de 15 días.",
    materials_notice: "Todos los precios incluyen materiales y mano de obra.",
    client_signature: "FIRMA CLIENTE",
    accept_conditions: "Acepto condiciones",
    general_conditions: "Condiciones Generales y Notas",
    notes_title: "Notas y Condiciones del Presupuesto",
};

pub fn labels(language: Language) -> &'static Labels {
    match language {
        Language::Eu => &EU,
        Language::Es => &ES,
    }
}

/// Both languages of one label, Basque first, as printed on the document.
pub fn bilingual(select: impl Fn(&'static Labels) -> &'static str) -> String {
    format!("{} / {}", select(&EU), select(&ES))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_follow_the_language() {
        assert_eq!(labels(Language::Eu).budget, "Aurrekontua");
        assert_eq!(labels(Language::Es).budget, "Presupuesto");
    }

    #[test]
    fn bilingual_pairs_basque_first() {
        assert_eq!(bilingual(|l| l.budget), "Aurrekontua / Presupuesto");
    }
}
