//! Budget totals.
//!
//! Pure aggregation over the line items: no caching, no stored derived state.
//! Callers recompute from `(items, rate)` wherever a figure is needed, so a
//! total can never go stale. Rounding to two decimals happens only at render
//! and export time, never here.

use serde::Serialize;
use shared::{BudgetItem, PaymentTerm};

/// Base, tax and grand total for a set of items.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Totals {
    /// Pre-tax sum of all line totals ("base imponible").
    pub base: f64,
    /// IVA amount: `base * rate`.
    pub tax: f64,
    /// `base + tax`, always derived from the two figures above so the three
    /// can never disagree.
    pub total: f64,
}

/// Compute the budget totals for the given tax rate (a fraction, e.g. 0.21).
pub fn compute_totals(items: &[BudgetItem], iva_rate: f64) -> Totals {
    let base: f64 = items.iter().map(BudgetItem::total).sum();
    let tax = base * iva_rate;
    Totals {
        base,
        tax,
        total: base + tax,
    }
}

/// Amount due for one payment term.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TermDue {
    pub term: PaymentTerm,
    pub due: f64,
}

/// Split the grand total across the payment terms. Percentages are taken as
/// given; whether they sum to 100 is the caller's (advisory) concern.
pub fn payment_schedule(terms: &[PaymentTerm], total: f64) -> Vec<TermDue> {
    terms
        .iter()
        .map(|term| TermDue {
            term: term.clone(),
            due: total * (term.percentage / 100.0),
        })
        .collect()
}

/// Running sum of term percentages, surfaced in the UI next to its deviation
/// from 100.
pub fn percentage_sum(terms: &[PaymentTerm]) -> f64 {
    terms.iter().map(|t| t.percentage).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::default_payment_terms;

    const EPS: f64 = 1e-9;

    fn item(quantity: f64, sale_price: f64) -> BudgetItem {
        let mut item = BudgetItem::new("Obra Civil", "Pintura");
        item.quantity = quantity;
        item.sale_price = sale_price;
        item
    }

    #[test]
    fn empty_budget_is_all_zero() {
        let totals = compute_totals(&[], 0.21);
        assert_eq!(totals.base, 0.0);
        assert_eq!(totals.tax, 0.0);
        assert_eq!(totals.total, 0.0);
    }

    #[test]
    fn base_tax_total_are_consistent() {
        let items = vec![item(2.0, 100.0), item(1.5, 80.0), item(1.0, 0.0)];
        let totals = compute_totals(&items, 0.21);
        assert!((totals.base - 320.0).abs() < EPS);
        assert!((totals.tax - 320.0 * 0.21).abs() < EPS);
        assert!((totals.total - (totals.base + totals.tax)).abs() < EPS);
    }

    #[test]
    fn zero_rate_means_no_tax() {
        let totals = compute_totals(&[item(1.0, 500.0)], 0.0);
        assert_eq!(totals.tax, 0.0);
        assert_eq!(totals.total, totals.base);
    }

    #[test]
    fn schedule_reproduces_total_when_percentages_sum_to_100() {
        let terms = default_payment_terms();
        assert!((percentage_sum(&terms) - 100.0).abs() < EPS);

        let total = 1234.56;
        let schedule = payment_schedule(&terms, total);
        assert_eq!(schedule.len(), terms.len());
        assert!((schedule[0].due - total * 0.30).abs() < EPS);

        let sum: f64 = schedule.iter().map(|t| t.due).sum();
        assert!((sum - total).abs() < EPS);
    }

    #[test]
    fn schedule_does_not_force_percentages_to_100() {
        let terms = vec![PaymentTerm {
            id: "only".to_string(),
            label: "Única entrega".to_string(),
            percentage: 50.0,
        }];
        let schedule = payment_schedule(&terms, 200.0);
        assert!((schedule[0].due - 100.0).abs() < EPS);
        assert!((percentage_sum(&terms) - 50.0).abs() < EPS);
    }
}
