//! Invoice domain entity, form parsing and money helpers.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::validation::FieldErrors;
use crate::config::{
    MSG_AMOUNT_INVALID, MSG_AMOUNT_POSITIVE, MSG_AMOUNT_TOO_LARGE, MSG_DATE_INVALID,
    MSG_SELECT_CUSTOMER, MSG_SELECT_STATUS,
};

/// Form field names as submitted by the dashboard.
pub const FIELD_CUSTOMER_ID: &str = "customerId";
pub const FIELD_AMOUNT: &str = "amount";
pub const FIELD_STATUS: &str = "status";
pub const FIELD_DATE: &str = "date";

/// Invoice payment status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    Pending,
    Paid,
}

impl InvoiceStatus {
    /// Parse the stored/submitted representation. Unknown values yield `None`.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(InvoiceStatus::Pending),
            "paid" => Some(InvoiceStatus::Paid),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceStatus::Pending => "pending",
            InvoiceStatus::Paid => "paid",
        }
    }
}

impl std::fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Invoice domain entity. `amount` is stored in cents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct Invoice {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub amount: i32,
    pub status: InvoiceStatus,
    pub date: NaiveDate,
}

/// Raw invoice form as posted. Every field is optional so that missing
/// inputs become field errors instead of extractor rejections.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceForm {
    #[schema(example = "3958dc9e-712f-4377-85e9-fec4b6a6442a")]
    pub customer_id: Option<String>,
    /// Amount in dollars
    #[schema(example = "157.95")]
    pub amount: Option<String>,
    #[schema(example = "pending")]
    pub status: Option<String>,
    /// `YYYY-MM-DD`, only honoured by updates
    #[schema(example = "2024-06-05")]
    pub date: Option<String>,
}

/// Validated invoice fields ready to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceDraft {
    pub customer_id: Uuid,
    pub amount_cents: i32,
    pub status: InvoiceStatus,
    pub date: Option<NaiveDate>,
}

impl InvoiceForm {
    /// Validate the fields used when creating an invoice. `date` is ignored.
    pub fn parse_for_create(&self) -> Result<InvoiceDraft, FieldErrors> {
        self.parse(false)
    }

    /// Validate the fields used when updating an invoice, including an
    /// optional `date`.
    pub fn parse_for_update(&self) -> Result<InvoiceDraft, FieldErrors> {
        self.parse(true)
    }

    fn parse(&self, with_date: bool) -> Result<InvoiceDraft, FieldErrors> {
        let mut errors = FieldErrors::new();

        let customer_id = self
            .customer_id
            .as_deref()
            .map(str::trim)
            .and_then(|id| Uuid::parse_str(id).ok());
        if customer_id.is_none() {
            errors.add(FIELD_CUSTOMER_ID, MSG_SELECT_CUSTOMER);
        }

        let amount_cents = match parse_amount_cents(self.amount.as_deref().unwrap_or_default()) {
            Ok(cents) => Some(cents),
            Err(message) => {
                errors.add(FIELD_AMOUNT, message);
                None
            }
        };

        let status = self.status.as_deref().and_then(InvoiceStatus::parse);
        if status.is_none() {
            errors.add(FIELD_STATUS, MSG_SELECT_STATUS);
        }

        let date = match self.date.as_deref().map(str::trim) {
            Some(raw) if with_date && !raw.is_empty() => {
                match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
                    Ok(date) => Some(date),
                    Err(_) => {
                        errors.add(FIELD_DATE, MSG_DATE_INVALID);
                        None
                    }
                }
            }
            _ => None,
        };

        match (customer_id, amount_cents, status) {
            (Some(customer_id), Some(amount_cents), Some(status)) if errors.is_empty() => {
                Ok(InvoiceDraft {
                    customer_id,
                    amount_cents,
                    status,
                    date,
                })
            }
            _ => Err(errors),
        }
    }
}

/// Coerce a submitted dollar amount to whole cents.
///
/// Blank input counts as zero, mirroring numeric coercion of form values,
/// and therefore fails the positivity check rather than the format check.
pub fn parse_amount_cents(raw: &str) -> Result<i32, &'static str> {
    let trimmed = raw.trim();
    let dollars = if trimmed.is_empty() {
        0.0
    } else {
        trimmed.parse::<f64>().map_err(|_| MSG_AMOUNT_INVALID)?
    };

    if !dollars.is_finite() {
        return Err(MSG_AMOUNT_INVALID);
    }
    if dollars <= 0.0 {
        return Err(MSG_AMOUNT_POSITIVE);
    }

    let cents = (dollars * 100.0).round();
    if cents > i32::MAX as f64 {
        return Err(MSG_AMOUNT_TOO_LARGE);
    }
    Ok(cents as i32)
}

/// Cents to dollars for pre-filling the edit form.
pub fn cents_to_dollars(cents: i32) -> f64 {
    f64::from(cents) / 100.0
}

/// Format cents as US dollars, e.g. `$1,234.56`.
pub fn format_currency(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let cents = cents.unsigned_abs();
    let dollars = (cents / 100).to_string();

    let mut grouped = String::with_capacity(dollars.len() + dollars.len() / 3);
    for (i, digit) in dollars.chars().enumerate() {
        if i > 0 && (dollars.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    format!("{}${}.{:02}", sign, grouped, cents % 100)
}

/// Invoice row of the invoices table, joined with its customer.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct InvoiceListItem {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub name: String,
    pub email: String,
    pub image_url: String,
    pub date: NaiveDate,
    /// Cents
    pub amount: i32,
    pub status: InvoiceStatus,
}

/// One page of the invoices table.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct InvoicePage {
    pub invoices: Vec<InvoiceListItem>,
    pub query: String,
    pub page: u64,
    pub total_pages: u64,
}

/// Invoice shown on the dashboard overview.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LatestInvoice {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub image_url: String,
    /// Formatted currency
    #[schema(example = "$1,234.56")]
    pub amount: String,
}

/// Invoice values used to pre-fill the edit form.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct InvoiceFormValues {
    pub id: Uuid,
    pub customer_id: Uuid,
    /// Dollars
    pub amount: f64,
    pub status: InvoiceStatus,
    pub date: NaiveDate,
}

impl From<Invoice> for InvoiceFormValues {
    fn from(invoice: Invoice) -> Self {
        Self {
            id: invoice.id,
            customer_id: invoice.customer_id,
            amount: cents_to_dollars(invoice.amount),
            status: invoice.status,
            date: invoice.date,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CUSTOMER: &str = "3958dc9e-712f-4377-85e9-fec4b6a6442a";

    fn form(customer_id: Option<&str>, amount: Option<&str>, status: Option<&str>) -> InvoiceForm {
        InvoiceForm {
            customer_id: customer_id.map(String::from),
            amount: amount.map(String::from),
            status: status.map(String::from),
            date: None,
        }
    }

    #[test]
    fn test_valid_form_rounds_to_cents() {
        let draft = form(Some(CUSTOMER), Some("157.95"), Some("paid"))
            .parse_for_create()
            .unwrap();

        assert_eq!(draft.customer_id, Uuid::parse_str(CUSTOMER).unwrap());
        assert_eq!(draft.amount_cents, 15795);
        assert_eq!(draft.status, InvoiceStatus::Paid);
        assert_eq!(draft.date, None);
    }

    #[test]
    fn test_empty_form_reports_every_field() {
        let errors = InvoiceForm::default().parse_for_create().unwrap_err();

        assert_eq!(errors.get(FIELD_CUSTOMER_ID), [MSG_SELECT_CUSTOMER]);
        assert_eq!(errors.get(FIELD_AMOUNT), [MSG_AMOUNT_POSITIVE]);
        assert_eq!(errors.get(FIELD_STATUS), [MSG_SELECT_STATUS]);
        assert!(!errors.contains(FIELD_DATE));
    }

    #[test]
    fn test_unknown_status_rejected() {
        let errors = form(Some(CUSTOMER), Some("10"), Some("overdue"))
            .parse_for_create()
            .unwrap_err();
        assert_eq!(errors.get(FIELD_STATUS), [MSG_SELECT_STATUS]);
        assert!(!errors.contains(FIELD_AMOUNT));
    }

    #[test]
    fn test_malformed_customer_rejected() {
        let errors = form(Some("not-a-uuid"), Some("10"), Some("pending"))
            .parse_for_create()
            .unwrap_err();
        assert_eq!(errors.get(FIELD_CUSTOMER_ID), [MSG_SELECT_CUSTOMER]);
    }

    #[test]
    fn test_amount_coercion() {
        assert_eq!(parse_amount_cents(" 12.5 "), Ok(1250));
        assert_eq!(parse_amount_cents("1e2"), Ok(10000));
        assert_eq!(parse_amount_cents("0.005"), Ok(1));
        assert_eq!(parse_amount_cents(""), Err(MSG_AMOUNT_POSITIVE));
        assert_eq!(parse_amount_cents("0"), Err(MSG_AMOUNT_POSITIVE));
        assert_eq!(parse_amount_cents("-4"), Err(MSG_AMOUNT_POSITIVE));
        assert_eq!(parse_amount_cents("abc"), Err(MSG_AMOUNT_INVALID));
        assert_eq!(parse_amount_cents("NaN"), Err(MSG_AMOUNT_INVALID));
        assert_eq!(parse_amount_cents("inf"), Err(MSG_AMOUNT_INVALID));
        assert_eq!(parse_amount_cents("99999999999"), Err(MSG_AMOUNT_TOO_LARGE));
    }

    #[test]
    fn test_create_ignores_date() {
        let mut input = form(Some(CUSTOMER), Some("1"), Some("pending"));
        input.date = Some("garbage".to_string());
        assert_eq!(input.parse_for_create().unwrap().date, None);
    }

    #[test]
    fn test_update_parses_date() {
        let mut input = form(Some(CUSTOMER), Some("1"), Some("pending"));
        input.date = Some("2024-06-05".to_string());
        assert_eq!(
            input.parse_for_update().unwrap().date,
            NaiveDate::from_ymd_opt(2024, 6, 5)
        );

        input.date = Some(String::new());
        assert_eq!(input.parse_for_update().unwrap().date, None);

        input.date = Some("05/06/2024".to_string());
        let errors = input.parse_for_update().unwrap_err();
        assert_eq!(errors.get(FIELD_DATE), [MSG_DATE_INVALID]);
    }

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(0), "$0.00");
        assert_eq!(format_currency(15795), "$157.95");
        assert_eq!(format_currency(123456789), "$1,234,567.89");
        assert_eq!(format_currency(100000), "$1,000.00");
        assert_eq!(format_currency(-2550), "-$25.50");
    }

    #[test]
    fn test_status_round_trip() {
        for status in [InvoiceStatus::Pending, InvoiceStatus::Paid] {
            assert_eq!(InvoiceStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(InvoiceStatus::parse("PAID"), None);
    }
}
