use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::ToSchema;

use super::{FileMetadata, ProcessingStatus};
use crate::shared::types::{de_id, de_null_default, de_opt_id};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceItem {
    #[serde(default, deserialize_with = "de_opt_id")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "de_null_default")]
    pub quantity: Decimal,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "de_null_default")]
    pub price: Decimal,
    #[serde(default, deserialize_with = "de_null_default")]
    pub tax: Decimal,
    #[serde(default, deserialize_with = "de_opt_id")]
    pub invoice_id: Option<String>,
}

/// Invoice extracted by the backend from an uploaded file.
///
/// Decoding accepts the legacy snake_case spellings of a few fields; the
/// camelCase value wins when both are present. Serialization is camelCase only.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", from = "RawInvoice")]
pub struct Invoice {
    pub id: String,
    pub invoice_date: Option<String>,
    pub company_name: Option<String>,
    pub address: Option<String>,
    pub tax_number: Option<String>,
    pub invoice_no: Option<String>,
    pub branch: Option<String>,
    pub subtotal: Option<Decimal>,
    pub total_tax: Option<Decimal>,
    pub total: Option<Decimal>,
    pub payment_method: Option<String>,
    /// 1 or 2
    pub invoice_type: Option<i32>,
    pub items: Vec<InvoiceItem>,
    pub created_date: Option<String>,
    pub modified_date: Option<String>,
    pub file: Option<FileMetadata>,
    pub file_id: Option<String>,
    pub cost_center_name: Option<String>,
    pub cost_center_id: Option<String>,
    pub expense_type_id: Option<String>,
    #[schema(value_type = Option<Object>)]
    pub extra_data: Option<Map<String, Value>>,
    pub genuinity_rank: Option<f64>,
    pub client_id: Option<String>,
}

impl Invoice {
    /// Status of the attached file, if any
    pub fn status(&self) -> Option<ProcessingStatus> {
        self.file.as_ref()?.status
    }

    pub fn has_file_id(&self, file_id: &str) -> bool {
        self.file_id.as_deref() == Some(file_id)
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawInvoice {
    #[serde(default, deserialize_with = "de_id")]
    id: String,
    invoice_date: Option<String>,
    #[serde(rename = "invoice_date")]
    legacy_invoice_date: Option<String>,
    company_name: Option<String>,
    #[serde(rename = "company_name")]
    legacy_company_name: Option<String>,
    address: Option<String>,
    tax_number: Option<String>,
    #[serde(rename = "tax_number")]
    legacy_tax_number: Option<String>,
    invoice_no: Option<String>,
    #[serde(rename = "invoice_no")]
    legacy_invoice_no: Option<String>,
    branch: Option<String>,
    subtotal: Option<Decimal>,
    total_tax: Option<Decimal>,
    #[serde(rename = "total_tax")]
    legacy_total_tax: Option<Decimal>,
    total: Option<Decimal>,
    payment_method: Option<String>,
    #[serde(rename = "payment_method")]
    legacy_payment_method: Option<String>,
    invoice_type: Option<i32>,
    #[serde(default, deserialize_with = "de_null_default")]
    items: Vec<InvoiceItem>,
    created_date: Option<String>,
    modified_date: Option<String>,
    file: Option<FileMetadata>,
    #[serde(default, deserialize_with = "de_opt_id")]
    file_id: Option<String>,
    cost_center_name: Option<String>,
    #[serde(default, deserialize_with = "de_opt_id")]
    cost_center_id: Option<String>,
    #[serde(default, deserialize_with = "de_opt_id")]
    expense_type_id: Option<String>,
    extra_data: Option<Map<String, Value>>,
    genuinity_rank: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_id")]
    client_id: Option<String>,
}

impl From<RawInvoice> for Invoice {
    fn from(raw: RawInvoice) -> Self {
        // Fall back to the nested file when the flat id is missing
        let file_id = raw
            .file_id
            .or_else(|| raw.file.as_ref().map(|f| f.id.clone()).filter(|id| !id.is_empty()));

        Invoice {
            id: raw.id,
            invoice_date: raw.invoice_date.or(raw.legacy_invoice_date),
            company_name: raw.company_name.or(raw.legacy_company_name),
            address: raw.address,
            tax_number: raw.tax_number.or(raw.legacy_tax_number),
            invoice_no: raw.invoice_no.or(raw.legacy_invoice_no),
            branch: raw.branch,
            subtotal: raw.subtotal,
            total_tax: raw.total_tax.or(raw.legacy_total_tax),
            total: raw.total,
            payment_method: raw.payment_method.or(raw.legacy_payment_method),
            invoice_type: raw.invoice_type,
            items: raw.items,
            created_date: raw.created_date,
            modified_date: raw.modified_date,
            file: raw.file,
            file_id,
            cost_center_name: raw.cost_center_name,
            cost_center_id: raw.cost_center_id,
            expense_type_id: raw.expense_type_id,
            extra_data: raw.extra_data,
            genuinity_rank: raw.genuinity_rank,
            client_id: raw.client_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::str::FromStr;

    #[test]
    fn test_legacy_snake_case_fields_are_accepted() {
        let invoice: Invoice = serde_json::from_value(json!({
            "id": 7,
            "company_name": "Acme",
            "invoice_no": "INV-1",
            "total_tax": 1.5,
            "payment_method": "Cash",
            "items": null
        }))
        .unwrap();

        assert_eq!(invoice.id, "7");
        assert_eq!(invoice.company_name.as_deref(), Some("Acme"));
        assert_eq!(invoice.invoice_no.as_deref(), Some("INV-1"));
        assert_eq!(invoice.total_tax, Some(Decimal::from_str("1.5").unwrap()));
        assert_eq!(invoice.payment_method.as_deref(), Some("Cash"));
        assert!(invoice.items.is_empty());
    }

    #[test]
    fn test_camel_case_wins_over_legacy() {
        let invoice: Invoice = serde_json::from_value(json!({
            "id": "a",
            "companyName": "New Name",
            "company_name": "Old Name"
        }))
        .unwrap();
        assert_eq!(invoice.company_name.as_deref(), Some("New Name"));

        let out = serde_json::to_value(&invoice).unwrap();
        assert_eq!(out["companyName"], json!("New Name"));
        assert!(out.get("company_name").is_none());
    }

    #[test]
    fn test_status_and_file_id_come_from_nested_file() {
        let invoice: Invoice = serde_json::from_value(json!({
            "id": 1,
            "file": {"id": 55, "status": 3, "invoice": {"id": 1}},
            "items": [{"quantity": 2, "description": "Paper", "price": "10.00", "tax": null}],
            "extraData": {"currency": "IDR"}
        }))
        .unwrap();

        assert_eq!(invoice.status(), Some(ProcessingStatus::Completed));
        assert!(invoice.has_file_id("55"));
        assert_eq!(invoice.items[0].quantity, Decimal::from(2));
        assert_eq!(invoice.items[0].tax, Decimal::ZERO);
        assert_eq!(
            invoice.extra_data.as_ref().and_then(|m| m.get("currency")),
            Some(&json!("IDR"))
        );
    }
}
