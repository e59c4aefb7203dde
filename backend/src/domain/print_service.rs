//! Printable budget document.
//!
//! Renders the whole budget as a self-contained bilingual HTML page: header
//! with client and company blocks, the item table (price column optional),
//! payment breakdown, totals and the legal notes on a final page. Every label
//! appears in both languages, Basque first, like the paper documents the
//! business sends out.
//!
//! User-entered text is escaped; the notes field is the one deliberate
//! exception, since it stores an HTML fragment authored in the rich-text
//! editor and is embedded verbatim.

use shared::{BudgetData, BANK_ACCOUNT};

use super::i18n::bilingual;
use super::totals::{compute_totals, payment_schedule};

/// Format an amount the es-ES way: dot for thousands, comma for decimals,
/// two decimal places, trailing euro sign.
pub fn format_eur(value: f64) -> String {
    let cents = (value.abs() * 100.0).round() as i64;
    let euros = cents / 100;
    let fraction = cents % 100;

    let digits = euros.to_string();
    let mut grouped = String::new();
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(c);
    }

    let sign = if value < 0.0 && cents > 0 { "-" } else { "" };
    format!("{}{},{:02} €", sign, grouped, fraction)
}

/// Minimal HTML escaping for user-entered text.
pub fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[derive(Clone, Default)]
pub struct PrintService;

impl PrintService {
    pub fn new() -> Self {
        PrintService
    }

    /// Render the full printable document.
    pub fn render(&self, budget: &BudgetData) -> String {
        let totals = compute_totals(&budget.items, budget.iva_rate);
        let client = &budget.client;
        let company = &budget.company;

        let mut html = String::with_capacity(8 * 1024);
        html.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
        html.push_str(&format!(
            "<title>{} - {}</title>\n",
            escape_html(&bilingual(|l| l.budget)),
            escape_html(&client.name)
        ));
        html.push_str(
            "<style>\n\
             body { font-family: sans-serif; color: #1e293b; margin: 10mm 15mm; font-size: 10pt; }\n\
             h1 { text-align: center; text-transform: uppercase; letter-spacing: 0.1em; font-size: 14pt; }\n\
             table.items { width: 100%; border-collapse: collapse; }\n\
             table.items th { text-align: left; border-bottom: 2px solid #1e293b; text-transform: uppercase; font-size: 8pt; padding: 8px 4px; }\n\
             table.items td { border-bottom: 1px solid #f1f5f9; padding: 10px 4px; vertical-align: top; }\n\
             td.amount, th.amount { text-align: right; white-space: nowrap; }\n\
             .header { display: flex; justify-content: space-between; }\n\
             .muted { color: #64748b; font-size: 8pt; text-transform: uppercase; letter-spacing: 0.1em; }\n\
             .totals { margin-top: 12px; text-align: right; }\n\
             .total-line { font-weight: bold; font-size: 13pt; border-top: 1px solid #1e293b; }\n\
             .notice { font-size: 7pt; color: #94a3b8; font-style: italic; text-align: right; }\n\
             .account { font-family: monospace; font-weight: bold; }\n\
             .signatures { display: flex; justify-content: space-between; margin-top: 24px; }\n\
             .signature-box { border: 1px solid #e2e8f0; border-radius: 6px; height: 70px; width: 45%; }\n\
             .notes-page { page-break-before: always; border-top: 2px solid #1e293b; margin-top: 24px; padding-top: 12px; }\n\
             img.stamp { max-height: 60px; }\n\
             @media print { .notes-page { page-break-before: always; } }\n\
             </style>\n</head>\n<body>\n",
        );

        // Header: client on the left, company on the right.
        html.push_str("<div class=\"header\">\n<div>\n");
        html.push_str(&format!(
            "<p class=\"muted\">{}</p>\n",
            escape_html(&bilingual(|l| l.client_data))
        ));
        html.push_str(&format!("<p><strong>{}</strong><br>\n", escape_html(&client.name)));
        html.push_str(&format!("{}<br>\n", escape_html(&client.address)));
        html.push_str(&format!("{}<br>\n", escape_html(&client.city)));
        html.push_str(&format!("NIF/CIF: {}<br>\n", escape_html(&client.dni)));
        html.push_str(&format!(
            "{}: {}<br>\n",
            escape_html(&bilingual(|l| l.date)),
            escape_html(&client.date)
        ));
        html.push_str(&format!(
            "{}: {}</p>\n</div>\n",
            escape_html(&bilingual(|l| l.project)),
            escape_html(&client.project)
        ));

        html.push_str("<div style=\"text-align: right\">\n");
        if let Some(logo) = &company.logo {
            html.push_str(&format!(
                "<img src=\"{}\" alt=\"Logo\" style=\"max-height: 60px\"><br>\n",
                escape_html(logo)
            ));
        }
        html.push_str(&format!("<p><strong>{}</strong><br>\n", escape_html(&company.name)));
        html.push_str(&format!("{}<br>\n", escape_html(&company.address)));
        if let Some(city) = &company.city {
            html.push_str(&format!("{}<br>\n", escape_html(city)));
        }
        html.push_str(&format!(
            "{} | {}<br>\nCIF: {}</p>\n</div>\n</div>\n",
            escape_html(&company.phone),
            escape_html(&company.email),
            escape_html(&company.cif)
        ));

        html.push_str(&format!("<h1>{}</h1>\n", escape_html(&bilingual(|l| l.budget))));

        // Item table.
        html.push_str("<table class=\"items\">\n<thead>\n<tr>\n");
        html.push_str(&format!(
            "<th>{}</th>\n",
            escape_html(&bilingual(|l| l.concept))
        ));
        if budget.show_prices {
            html.push_str(&format!(
                "<th class=\"amount\">{}</th>\n",
                escape_html(&bilingual(|l| l.total))
            ));
        }
        html.push_str("</tr>\n</thead>\n<tbody>\n");
        for item in &budget.items {
            html.push_str("<tr>\n<td>");
            html.push_str(&format!(
                "<strong>{}</strong><br>{}",
                escape_html(&item.category),
                escape_html(&item.description).replace('\n', "<br>")
            ));
            html.push_str("</td>\n");
            if budget.show_prices {
                html.push_str(&format!(
                    "<td class=\"amount\">{}</td>\n",
                    format_eur(item.total())
                ));
            }
            html.push_str("</tr>\n");
        }
        html.push_str("</tbody>\n</table>\n");

        // Payment terms and totals, side by side in the paper layout.
        html.push_str("<div class=\"header\" style=\"margin-top: 16px\">\n<div>\n");
        html.push_str(&format!(
            "<p class=\"muted\">{}</p>\n<table>\n",
            escape_html(&bilingual(|l| l.payment_method))
        ));
        for entry in payment_schedule(&budget.payment_terms, totals.total) {
            html.push_str(&format!(
                "<tr><td>{}% {}:</td><td class=\"amount\"><strong>{}</strong></td></tr>\n",
                entry.term.percentage,
                escape_html(&entry.term.label),
                format_eur(entry.due)
            ));
        }
        html.push_str("</table>\n");
        html.push_str(&format!(
            "<p class=\"muted\">{}</p>\n<p class=\"account\">{}</p>\n</div>\n",
            escape_html(&bilingual(|l| l.account_number)),
            BANK_ACCOUNT
        ));

        html.push_str("<div class=\"totals\">\n");
        html.push_str(&format!(
            "<p>{}: {}</p>\n",
            escape_html(&bilingual(|l| l.base_imponible)),
            format_eur(totals.base)
        ));
        html.push_str(&format!(
            "<p>{} ({:.0}%): {}</p>\n",
            escape_html(&bilingual(|l| l.iva)),
            budget.iva_rate * 100.0,
            format_eur(totals.tax)
        ));
        html.push_str(&format!(
            "<p class=\"total-line\">{}: {}</p>\n",
            escape_html(&bilingual(|l| l.total_budget)),
            format_eur(totals.total)
        ));
        html.push_str(&format!(
            "<p class=\"notice\">{}<br>{}</p>\n</div>\n</div>\n",
            escape_html(&bilingual(|l| l.validity_notice)),
            escape_html(&bilingual(|l| l.materials_notice))
        ));

        // Signature slots: client signature left, company stamp right.
        html.push_str("<div class=\"signatures\">\n<div style=\"width: 45%\">\n");
        html.push_str(&format!(
            "<p class=\"muted\">{}</p>\n",
            escape_html(&bilingual(|l| l.client_signature))
        ));
        match &client.signature {
            Some(signature) => html.push_str(&format!(
                "<div class=\"signature-box\"><img src=\"{}\" alt=\"Firma\" style=\"max-height: 100%\"></div>\n",
                escape_html(signature)
            )),
            None => html.push_str("<div class=\"signature-box\"></div>\n"),
        }
        html.push_str(&format!(
            "<p class=\"notice\" style=\"text-align: left\">{}</p>\n</div>\n",
            escape_html(&bilingual(|l| l.accept_conditions))
        ));
        html.push_str("<div style=\"text-align: right\">\n");
        if let Some(stamp) = &company.signature {
            html.push_str(&format!(
                "<img class=\"stamp\" src=\"{}\" alt=\"Sello\">\n",
                escape_html(stamp)
            ));
        }
        html.push_str("</div>\n</div>\n");

        // Legal notes on their own page, embedded as authored.
        html.push_str("<div class=\"notes-page\">\n");
        html.push_str(&format!(
            "<h2>{}</h2>\n",
            escape_html(&bilingual(|l| l.general_conditions))
        ));
        html.push_str(&budget.notes);
        html.push_str("\n</div>\n</body>\n</html>\n");

        html
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::BudgetItem;

    #[test]
    fn eur_formatting_uses_spanish_separators() {
        assert_eq!(format_eur(0.0), "0,00 €");
        assert_eq!(format_eur(1234.5), "1.234,50 €");
        assert_eq!(format_eur(1234567.891), "1.234.567,89 €");
        assert_eq!(format_eur(-42.0), "-42,00 €");
        assert_eq!(format_eur(999.999), "1.000,00 €");
    }

    #[test]
    fn escaping_covers_markup_characters() {
        assert_eq!(escape_html("a < b & \"c\""), "a &lt; b &amp; &quot;c&quot;");
    }

    fn sample_budget() -> BudgetData {
        let mut budget = BudgetData::default();
        budget.client.name = "Cliente <Prueba>".to_string();
        let mut item = BudgetItem::new("Obra Civil", "Fontanería");
        item.description = "Cambiar tuberías".to_string();
        item.quantity = 1.0;
        item.sale_price = 1000.0;
        budget.items.push(item);
        budget
    }

    #[test]
    fn document_is_bilingual_and_totalled() {
        let html = PrintService::new().render(&sample_budget());

        assert!(html.contains("Aurrekontua / Presupuesto"));
        assert!(html.contains("Bezeroaren Datuak / Datos del Cliente"));
        // 1000 + 21% IVA
        assert!(html.contains("1.210,00 €"));
        assert!(html.contains(BANK_ACCOUNT));
        // User text is escaped.
        assert!(html.contains("Cliente &lt;Prueba&gt;"));
        assert!(!html.contains("Cliente <Prueba>"));
    }

    #[test]
    fn price_column_respects_show_prices() {
        let mut budget = sample_budget();
        budget.items[0].sale_price = 400.0;
        let mut second = BudgetItem::new("Obra Civil", "Pintura");
        second.quantity = 1.0;
        second.sale_price = 600.0;
        budget.items.push(second);
        budget.show_prices = false;

        let html = PrintService::new().render(&budget);
        // Per-item amounts disappear with the price column…
        assert!(!html.contains("400,00 €"));
        assert!(!html.contains("600,00 €"));
        // …but the summary block still prints.
        assert!(html.contains("1.000,00 €"));
        assert!(html.contains("1.210,00 €"));
    }

    #[test]
    fn notes_html_is_embedded_verbatim() {
        let mut budget = sample_budget();
        budget.notes = "<p><b>Condiciones</b></p>".to_string();
        let html = PrintService::new().render(&budget);
        assert!(html.contains("<p><b>Condiciones</b></p>"));
    }

    #[test]
    fn payment_terms_print_their_due_amounts() {
        let html = PrintService::new().render(&sample_budget());
        // 30% of 1210.00
        assert!(html.contains("363,00 €"));
        assert!(html.contains("A la aceptación del presupuesto"));
    }
}
