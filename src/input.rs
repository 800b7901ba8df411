//! Resolution of the raw JSON invoice into [`InvoiceInput`].
//!
//! Every optional field is resolved exactly once here, with its default
//! applied, so that the computation and assembly stages never look at raw
//! JSON. Numeric fields all go through [`parse_number`]; a malformed value
//! never fails the run.

use std::io::Read;

use log::debug;
use serde_json::{Map, Value};

use crate::error::InputError;

/// Invoice number shown when the input carries none.
pub const DEFAULT_INVOICE_NUMBER: &str = "Invoice";
/// Unit label of the primary line item.
pub const DEFAULT_UNIT: &str = "h";
/// Description of the primary line item.
pub const DEFAULT_ITEM_DESCRIPTION: &str = "Services";

/// Contact block of the buyer or seller.
///
/// Absent, null and empty fields are all stored as `None` and are omitted
/// from the rendered panel.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Party {
    pub name: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub tax_id: Option<String>,
    /// Bank account number; only read for the seller.
    pub account: Option<String>,
    /// Bank name; only read for the seller.
    pub bank: Option<String>,
}

impl Party {
    fn from_value(value: Option<&Value>, with_bank_details: bool) -> Self {
        let Some(Value::Object(fields)) = value else {
            return Self::default();
        };

        let mut party = Self {
            name: text_field(fields, "name"),
            address: text_field(fields, "address"),
            city: text_field(fields, "city"),
            tax_id: text_field(fields, "taxId"),
            account: None,
            bank: None,
        };
        if with_bank_details {
            party.account = text_field(fields, "account");
            party.bank = text_field(fields, "bank");
        }
        party
    }
}

/// Optional second line item billed as a single unit.
#[derive(Clone, Debug, PartialEq)]
pub struct ExtraItem {
    pub description: String,
    pub net: f64,
}

/// Fully resolved invoice with every default applied.
#[derive(Clone, Debug, PartialEq)]
pub struct InvoiceInput {
    pub invoice_number: String,
    pub issue_date: String,
    pub sale_date: String,
    pub due_date: String,
    pub place: String,
    pub seller: Party,
    pub buyer: Party,
    pub currency: String,
    pub vat_percent: f64,
    pub hours: f64,
    pub unit: String,
    pub description: String,
    pub rate: f64,
    pub net: f64,
    pub total_net: Option<f64>,
    pub vat_amount: Option<f64>,
    pub gross: Option<f64>,
    pub extra: Option<ExtraItem>,
}

impl Default for InvoiceInput {
    fn default() -> Self {
        Self::from_fields(&Map::new())
    }
}

impl InvoiceInput {
    /// Reads the whole stream and resolves it into an invoice.
    pub fn from_reader<R: Read>(mut reader: R) -> Result<Self, InputError> {
        let mut raw = String::new();
        reader.read_to_string(&mut raw).map_err(InputError::Read)?;
        Self::from_json_str(&raw)
    }

    /// Parses a JSON document and resolves it into an invoice.
    ///
    /// The document must be an object; an empty object is valid and yields
    /// an invoice made entirely of defaults.
    pub fn from_json_str(raw: &str) -> Result<Self, InputError> {
        let value: Value = serde_json::from_str(raw).map_err(InputError::Parse)?;
        Self::from_value(&value)
    }

    /// Resolves an already parsed JSON value.
    pub fn from_value(value: &Value) -> Result<Self, InputError> {
        match value {
            Value::Object(fields) => {
                let input = Self::from_fields(fields);
                debug!(
                    "resolved invoice '{}' (extra item: {})",
                    input.invoice_number,
                    input.extra.is_some()
                );
                Ok(input)
            }
            other => Err(InputError::NotAnObject {
                found: json_type_name(other),
            }),
        }
    }

    fn from_fields(fields: &Map<String, Value>) -> Self {
        let item = fields.get("item").and_then(Value::as_object);
        let item_text = |key: &str| item.and_then(|item| text_field(item, key));

        Self {
            invoice_number: text_field(fields, "invoiceNumber")
                .unwrap_or_else(|| DEFAULT_INVOICE_NUMBER.to_owned()),
            issue_date: text_field(fields, "issueDate").unwrap_or_default(),
            sale_date: text_field(fields, "saleDate").unwrap_or_default(),
            due_date: text_field(fields, "dueDate").unwrap_or_default(),
            place: text_field(fields, "place").unwrap_or_default(),
            seller: Party::from_value(fields.get("seller"), true),
            buyer: Party::from_value(fields.get("buyer"), false),
            currency: text_field(fields, "currency").unwrap_or_default(),
            vat_percent: number_field(fields, "vatPercent").unwrap_or(0.0),
            hours: number_field(fields, "hours").unwrap_or(0.0),
            unit: item_text("unit").unwrap_or_else(|| DEFAULT_UNIT.to_owned()),
            description: item_text("desc")
                .unwrap_or_else(|| DEFAULT_ITEM_DESCRIPTION.to_owned()),
            rate: number_field(fields, "rate").unwrap_or(0.0),
            net: number_field(fields, "net").unwrap_or(0.0),
            total_net: number_field(fields, "totalNet"),
            vat_amount: number_field(fields, "vatAmount"),
            gross: number_field(fields, "gross"),
            extra: extra_item(fields.get("extra")),
        }
    }
}

fn extra_item(value: Option<&Value>) -> Option<ExtraItem> {
    let fields = value?.as_object()?;
    let description = text_field(fields, "desc")?;
    Some(ExtraItem {
        description,
        net: number_field(fields, "net").unwrap_or(0.0),
    })
}

/// Best-effort numeric parse shared by every numeric field.
///
/// Numbers are taken as-is and strings are parsed after trimming. Anything
/// else, including non-finite results, yields `None` so the caller can apply
/// its default.
pub fn parse_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    };
    number.filter(|number| number.is_finite())
}

/// Textual value of a field; empty strings and structured values are absent.
pub fn parse_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(text) => text.clone(),
        Value::Number(number) => number.to_string(),
        Value::Bool(flag) => flag.to_string(),
        Value::Null | Value::Array(_) | Value::Object(_) => return None,
    };
    (!text.is_empty()).then_some(text)
}

fn number_field(fields: &Map<String, Value>, key: &str) -> Option<f64> {
    fields.get(key).and_then(parse_number)
}

fn text_field(fields: &Map<String, Value>, key: &str) -> Option<String> {
    fields.get(key).and_then(parse_text)
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_object_resolves_to_defaults() {
        let input = InvoiceInput::from_json_str("{}").expect("empty object is valid");

        assert_eq!(input.invoice_number, DEFAULT_INVOICE_NUMBER);
        assert_eq!(input.unit, "h");
        assert_eq!(input.description, "Services");
        assert_eq!(input.currency, "");
        assert_eq!(input.vat_percent, 0.0);
        assert_eq!(input.total_net, None);
        assert_eq!(input.extra, None);
        assert_eq!(input.seller, Party::default());
        assert_eq!(input, InvoiceInput::default());
    }

    #[test]
    fn numeric_fields_accept_numbers_and_numeric_strings() {
        let input = InvoiceInput::from_value(&json!({
            "hours": "7.5",
            "rate": 40,
            "net": " 300 ",
            "vatPercent": 8.5,
        }))
        .expect("object");

        assert_eq!(input.hours, 7.5);
        assert_eq!(input.rate, 40.0);
        assert_eq!(input.net, 300.0);
        assert_eq!(input.vat_percent, 8.5);
    }

    #[test]
    fn malformed_numbers_fall_back_to_zero() {
        let input = InvoiceInput::from_value(&json!({
            "hours": "ten",
            "rate": [50],
            "net": {"value": 1},
            "vatPercent": true,
            "totalNet": "n/a",
        }))
        .expect("malformed numbers are not an error");

        assert_eq!(input.hours, 0.0);
        assert_eq!(input.rate, 0.0);
        assert_eq!(input.net, 0.0);
        assert_eq!(input.vat_percent, 0.0);
        assert_eq!(input.total_net, None);
    }

    #[test]
    fn non_finite_strings_are_rejected() {
        assert_eq!(parse_number(&json!("NaN")), None);
        assert_eq!(parse_number(&json!("inf")), None);
        assert_eq!(parse_number(&json!("1e3")), Some(1000.0));
    }

    #[test]
    fn explicit_zero_totals_are_kept() {
        let input = InvoiceInput::from_value(&json!({"net": 100, "totalNet": 0}))
            .expect("object");
        assert_eq!(input.total_net, Some(0.0));
    }

    #[test]
    fn empty_text_counts_as_absent() {
        let input = InvoiceInput::from_value(&json!({
            "invoiceNumber": "",
            "item": {"unit": "", "desc": "Consulting"},
            "seller": {"name": "ACME", "city": ""},
        }))
        .expect("object");

        assert_eq!(input.invoice_number, "Invoice");
        assert_eq!(input.unit, "h");
        assert_eq!(input.description, "Consulting");
        assert_eq!(input.seller.name.as_deref(), Some("ACME"));
        assert_eq!(input.seller.city, None);
    }

    #[test]
    fn numeric_invoice_number_is_rendered_as_text() {
        let input = InvoiceInput::from_value(&json!({"invoiceNumber": 42})).expect("object");
        assert_eq!(input.invoice_number, "42");
    }

    #[test]
    fn buyer_never_carries_bank_details() {
        let input = InvoiceInput::from_value(&json!({
            "seller": {"account": "PL61 1090", "bank": "Bank A"},
            "buyer": {"account": "DE89 3704", "bank": "Bank B"},
        }))
        .expect("object");

        assert_eq!(input.seller.account.as_deref(), Some("PL61 1090"));
        assert_eq!(input.seller.bank.as_deref(), Some("Bank A"));
        assert_eq!(input.buyer.account, None);
        assert_eq!(input.buyer.bank, None);
    }

    #[test]
    fn extra_item_requires_a_description() {
        let missing = InvoiceInput::from_value(&json!({"extra": {"net": 20}})).expect("object");
        assert_eq!(missing.extra, None);

        let empty =
            InvoiceInput::from_value(&json!({"extra": {"desc": "", "net": 20}})).expect("object");
        assert_eq!(empty.extra, None);

        let present = InvoiceInput::from_value(&json!({"extra": {"desc": "Travel", "net": "oops"}}))
            .expect("object");
        assert_eq!(
            present.extra,
            Some(ExtraItem {
                description: "Travel".to_owned(),
                net: 0.0,
            })
        );
    }

    #[test]
    fn rejects_malformed_and_non_object_documents() {
        assert!(matches!(
            InvoiceInput::from_json_str("{not json"),
            Err(InputError::Parse(_))
        ));
        assert!(matches!(
            InvoiceInput::from_json_str(""),
            Err(InputError::Parse(_))
        ));
        assert!(matches!(
            InvoiceInput::from_json_str("[1, 2]"),
            Err(InputError::NotAnObject { found: "an array" })
        ));
    }

    #[test]
    fn reads_from_any_reader() {
        let input = InvoiceInput::from_reader(r#"{"currency":"EUR"}"#.as_bytes()).expect("valid");
        assert_eq!(input.currency, "EUR");
    }
}
