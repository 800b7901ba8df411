//! Line item and totals derivation.

use crate::input::InvoiceInput;

/// Quantity text of the single-unit extra line.
pub const EXTRA_ITEM_QUANTITY: &str = "1 item";

/// One row of the items table with every cell already formatted.
#[derive(Clone, Debug, PartialEq)]
pub struct ComputedLineItem {
    pub index: String,
    pub description: String,
    pub quantity: String,
    pub unit_price: String,
    pub net: String,
    pub vat_rate: String,
    pub vat: String,
    pub gross: String,
}

impl ComputedLineItem {
    /// Builds a row, deriving VAT and gross from `net`.
    fn new(
        index: usize,
        description: &str,
        quantity: String,
        unit_price: f64,
        net: f64,
        pricing: &Pricing<'_>,
    ) -> Self {
        Self {
            index: index.to_string(),
            description: description.to_owned(),
            quantity,
            unit_price: format_money(unit_price, pricing.currency),
            net: format_money(net, pricing.currency),
            vat_rate: pricing.vat_label.clone(),
            vat: format_money(vat_of(net, pricing.vat_percent), pricing.currency),
            gross: format_money(gross_of(net, pricing.vat_percent), pricing.currency),
        }
    }

    /// Cells in table column order.
    pub fn cells(&self) -> [&str; 8] {
        [
            &self.index,
            &self.description,
            &self.quantity,
            &self.unit_price,
            &self.net,
            &self.vat_rate,
            &self.vat,
            &self.gross,
        ]
    }
}

/// Invoice-level amounts, unformatted.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ComputedTotals {
    pub total_net: f64,
    pub vat_amount: f64,
    pub gross: f64,
}

/// Output of the computation stage.
#[derive(Clone, Debug, PartialEq)]
pub struct InvoiceSummary {
    pub items: Vec<ComputedLineItem>,
    pub totals: ComputedTotals,
    /// VAT percent as shown in the table, rounded to an integer.
    pub vat_label: String,
    pub currency: String,
}

impl InvoiceSummary {
    /// Formats an amount in the invoice currency.
    pub fn money(&self, amount: f64) -> String {
        format_money(amount, &self.currency)
    }
}

struct Pricing<'a> {
    vat_percent: f64,
    vat_label: String,
    currency: &'a str,
}

/// Derives the table rows and totals from a resolved invoice.
///
/// The primary line is always emitted. The extra line is billed as one unit
/// at its own net. Totals prefer explicit invoice-level values and otherwise
/// derive from the primary line only.
pub fn compute(input: &InvoiceInput) -> InvoiceSummary {
    let pricing = Pricing {
        vat_percent: input.vat_percent,
        vat_label: vat_label(input.vat_percent),
        currency: &input.currency,
    };

    let mut items = vec![ComputedLineItem::new(
        1,
        &input.description,
        format!("{:.2} {}", input.hours, input.unit),
        input.rate,
        input.net,
        &pricing,
    )];

    if let Some(extra) = &input.extra {
        items.push(ComputedLineItem::new(
            items.len() + 1,
            &extra.description,
            EXTRA_ITEM_QUANTITY.to_owned(),
            extra.net,
            extra.net,
            &pricing,
        ));
    }

    let total_net = input.total_net.unwrap_or(input.net);
    let totals = ComputedTotals {
        total_net,
        vat_amount: input
            .vat_amount
            .unwrap_or_else(|| vat_of(total_net, input.vat_percent)),
        gross: input
            .gross
            .unwrap_or_else(|| gross_of(total_net, input.vat_percent)),
    };

    InvoiceSummary {
        items,
        totals,
        vat_label: pricing.vat_label,
        currency: input.currency.clone(),
    }
}

fn vat_of(net: f64, vat_percent: f64) -> f64 {
    net * vat_percent / 100.0
}

fn gross_of(net: f64, vat_percent: f64) -> f64 {
    net * (1.0 + vat_percent / 100.0)
}

/// Display label for a VAT percent. Fractional rates are rounded for
/// display only; amounts keep the full precision.
pub fn vat_label(vat_percent: f64) -> String {
    format!("{:.0}%", vat_percent)
}

/// Formats an amount with two decimals followed by the currency code.
///
/// No trailing space is emitted when the currency is empty.
pub fn format_money(amount: f64, currency: &str) -> String {
    if currency.is_empty() {
        format!("{:.2}", amount)
    } else {
        format!("{:.2} {}", amount, currency)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn summary_for(value: serde_json::Value) -> InvoiceSummary {
        compute(&InvoiceInput::from_value(&value).expect("object input"))
    }

    #[test]
    fn formats_money_with_two_decimals() {
        assert_eq!(format_money(500.0, "EUR"), "500.00 EUR");
        assert_eq!(format_money(0.1 + 0.2, "PLN"), "0.30 PLN");
        assert_eq!(format_money(12.3456, ""), "12.35");
        assert_eq!(format_money(0.0, ""), "0.00");
    }

    #[test]
    fn vat_label_is_rounded_for_display() {
        assert_eq!(vat_label(23.0), "23%");
        assert_eq!(vat_label(7.7), "8%");
        assert_eq!(vat_label(0.0), "0%");
    }

    #[test]
    fn computes_the_reference_invoice() {
        let summary = summary_for(json!({
            "invoiceNumber": "2024/01",
            "currency": "EUR",
            "hours": 10,
            "rate": 50,
            "net": 500,
            "vatPercent": 23,
        }));

        assert_eq!(summary.items.len(), 1);
        let row = &summary.items[0];
        assert_eq!(row.index, "1");
        assert_eq!(row.description, "Services");
        assert_eq!(row.quantity, "10.00 h");
        assert_eq!(row.unit_price, "50.00 EUR");
        assert_eq!(row.net, "500.00 EUR");
        assert_eq!(row.vat_rate, "23%");
        assert_eq!(row.vat, "115.00 EUR");
        assert_eq!(row.gross, "615.00 EUR");

        assert_eq!(summary.money(summary.totals.total_net), "500.00 EUR");
        assert_eq!(summary.money(summary.totals.vat_amount), "115.00 EUR");
        assert_eq!(summary.money(summary.totals.gross), "615.00 EUR");
    }

    #[test]
    fn empty_invoice_degrades_to_zero() {
        let summary = summary_for(json!({}));

        assert_eq!(summary.items.len(), 1);
        let row = &summary.items[0];
        assert_eq!(row.quantity, "0.00 h");
        assert_eq!(row.unit_price, "0.00");
        assert_eq!(row.net, "0.00");
        assert_eq!(row.vat_rate, "0%");
        assert_eq!(row.vat, "0.00");
        assert_eq!(row.gross, "0.00");
        assert_eq!(summary.money(summary.totals.total_net), "0.00");
        assert_eq!(summary.money(summary.totals.vat_amount), "0.00");
        assert_eq!(summary.money(summary.totals.gross), "0.00");
    }

    #[test]
    fn extra_line_is_a_single_unit() {
        let summary = summary_for(json!({
            "currency": "EUR",
            "net": 100,
            "vatPercent": 10,
            "extra": {"desc": "Travel", "net": 40, "vat": 999, "gross": 999},
        }));

        assert_eq!(summary.items.len(), 2);
        let extra = &summary.items[1];
        assert_eq!(extra.index, "2");
        assert_eq!(extra.description, "Travel");
        assert_eq!(extra.quantity, "1 item");
        assert_eq!(extra.unit_price, "40.00 EUR");
        assert_eq!(extra.net, "40.00 EUR");
        assert_eq!(extra.vat, "4.00 EUR");
        assert_eq!(extra.gross, "44.00 EUR");
    }

    #[test]
    fn derived_totals_ignore_the_extra_line() {
        let summary = summary_for(json!({
            "net": 100,
            "vatPercent": 10,
            "extra": {"desc": "Travel", "net": 40},
        }));

        assert_eq!(summary.totals.total_net, 100.0);
        assert!((summary.totals.vat_amount - 10.0).abs() < 1e-9);
        assert!((summary.totals.gross - 110.0).abs() < 1e-9);
    }

    #[test]
    fn explicit_totals_are_used_verbatim() {
        let summary = summary_for(json!({
            "currency": "USD",
            "net": 100,
            "vatPercent": 20,
            "totalNet": 140,
            "vatAmount": "27.5",
            "gross": 167.499,
        }));

        assert_eq!(summary.money(summary.totals.total_net), "140.00 USD");
        assert_eq!(summary.money(summary.totals.vat_amount), "27.50 USD");
        assert_eq!(summary.money(summary.totals.gross), "167.50 USD");
    }

    #[test]
    fn derived_vat_uses_explicit_total_net() {
        let summary = summary_for(json!({"net": 100, "vatPercent": 20, "totalNet": 200}));

        assert!((summary.totals.vat_amount - 40.0).abs() < 1e-9);
        assert!((summary.totals.gross - 240.0).abs() < 1e-9);
    }

    #[test]
    fn fractional_vat_keeps_full_precision_in_amounts() {
        let summary = summary_for(json!({"net": 1000, "vatPercent": 7.7}));

        let row = &summary.items[0];
        assert_eq!(row.vat_rate, "8%");
        assert_eq!(row.vat, "77.00");
        assert_eq!(row.gross, "1077.00");
    }
}
