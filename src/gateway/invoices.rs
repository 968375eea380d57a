// --- File: src/gateway/invoices.rs ---

use serde::{Deserialize, Serialize};

use crate::utils::string_or_number;

/// Part of a payment applied to one invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceAmount {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(deserialize_with = "string_or_number")]
    pub amount: String,
}

impl InvoiceAmount {
    pub fn new(id: impl Into<String>, amount: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            amount: amount.into(),
        }
    }
}

/// `id=amount|id=amount` form carried inside the order identifier.
pub fn serialize_invoices(invoices: &[InvoiceAmount]) -> String {
    invoices
        .iter()
        .map(|invoice| format!("{}={}", invoice.id, invoice.amount))
        .collect::<Vec<_>>()
        .join("|")
}

/// Inverse of [`serialize_invoices`]; pairs without `=` are dropped.
pub fn unserialize_invoices(serialized: Option<&str>) -> Vec<InvoiceAmount> {
    serialized
        .unwrap_or_default()
        .split('|')
        .filter_map(|pair| pair.split_once('='))
        .map(|(id, amount)| InvoiceAmount::new(id, amount))
        .collect()
}

/// The two halves of an `out_trade_no`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderId {
    pub client_id: String,
    /// Serialized invoices, `None` when the order was not tied to invoices.
    pub invoices: Option<String>,
}

impl OrderId {
    /// `client_id@invoices`, or `client_id@timestamp` when there are no invoices.
    pub fn build(client_id: &str, invoices: &[InvoiceAmount], timestamp: i64) -> String {
        let serialized = serialize_invoices(invoices);
        if serialized.is_empty() {
            format!("{client_id}@{timestamp}")
        } else {
            format!("{client_id}@{serialized}")
        }
    }

    /// Splits on the first `@`. A numeric suffix is the timestamp placeholder
    /// written by [`OrderId::build`], so it yields no invoices.
    pub fn parse(out_trade_no: &str) -> Self {
        let (client_id, suffix) = match out_trade_no.split_once('@') {
            Some((client_id, suffix)) => (client_id, Some(suffix)),
            None => (out_trade_no, None),
        };

        Self {
            client_id: client_id.to_string(),
            invoices: suffix
                .filter(|suffix| !is_numeric(suffix))
                .map(str::to_string),
        }
    }

    pub fn invoice_amounts(&self) -> Vec<InvoiceAmount> {
        unserialize_invoices(self.invoices.as_deref())
    }
}

// Decimal, signed, fractional and exponent notations all count as numeric.
fn is_numeric(value: &str) -> bool {
    let value = value.trim();
    !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '.' | '+' | '-' | 'e' | 'E'))
        && value.parse::<f64>().is_ok()
}
