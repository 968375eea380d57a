// --- File: src/gateway/alipay_gateway.rs ---

use std::sync::Arc;

use chrono::Utc;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, warn};

use super::audit::{payload, AuditEntry, AuditLog, Direction, TracingAuditLog};
use super::form::render_form;
use super::invoices::{InvoiceAmount, OrderId};
use crate::alipay::{format_amount, AlipayApi, PaymentRequest};
use crate::config::GatewaySettings;
use crate::lang;
use crate::utils::string_or_number;

/// Body Alipay expects back from a notification it may consider delivered.
pub const NOTIFY_ACKNOWLEDGEMENT: &str = "Success";

/// Errors the adapter hands back to the billing platform.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The gateway call failed; the message is meant for the operator.
    #[error("{0}")]
    Internal(String),

    #[error("{}", lang::ERROR_UNSUPPORTED)]
    Unsupported,
}

/// Platform transaction statuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Approved,
    Declined,
    Void,
    Pending,
    Reconciled,
    Refunded,
    Returned,
    Error,
}

impl TransactionStatus {
    /// Maps Alipay's `trade_status`. Unknown or missing tokens are errors.
    pub fn from_trade_status(trade_status: Option<&str>) -> Self {
        match trade_status {
            Some("TRADE_FINISHED") => Self::Approved,
            Some("TRADE_REFUSE") => Self::Declined,
            Some("TRADE_CANCEL") => Self::Void,
            Some("TRADE_PENDING") => Self::Pending,
            _ => Self::Error,
        }
    }
}

/// Transaction data returned to the billing platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransactionRecord {
    pub client_id: String,
    pub amount: Option<String>,
    pub currency: Option<String>,
    pub status: TransactionStatus,
    pub reference_id: Option<String>,
    pub transaction_id: Option<String>,
    pub invoices: Vec<InvoiceAmount>,
}

/// Outcome of an asynchronous notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub transaction: TransactionRecord,
    /// Set to [`NOTIFY_ACKNOWLEDGEMENT`] once Alipay confirmed the notification.
    pub acknowledgement: Option<&'static str>,
}

/// Fields Alipay sends to the notify (POST) and return (GET) URLs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CallbackParams {
    pub out_trade_no: Option<String>,
    pub trade_status: Option<String>,
    pub notify_id: Option<String>,
    pub trade_no: Option<String>,
    pub total_fee: Option<String>,
    pub currency: Option<String>,
}

/// The paying contact; only `client_id` reaches Alipay.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContactInfo {
    #[serde(default, deserialize_with = "string_or_number")]
    pub client_id: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessOptions {
    pub description: Option<String>,
    pub return_url: Option<String>,
}

/// Platform details the adapter needs besides the settings.
#[derive(Debug, Clone, Default)]
pub struct GatewayContext {
    pub company_name: Option<String>,
    pub notify_url: String,
}

/// Bridges the billing platform's non-merchant gateway calls to [`AlipayApi`].
#[derive(Clone)]
pub struct AlipayGateway {
    api: AlipayApi,
    context: GatewayContext,
    currency: Option<String>,
    request_path: Option<String>,
    audit: Arc<dyn AuditLog>,
}

impl AlipayGateway {
    pub fn new(settings: &GatewaySettings, context: GatewayContext, client: Client) -> Self {
        Self {
            api: AlipayApi::new(settings.credentials(), client),
            context,
            currency: None,
            request_path: None,
            audit: Arc::new(TracingAuditLog),
        }
    }

    /// ISO 4217 code used for subsequent payments.
    pub fn with_currency(mut self, currency: Option<String>) -> Self {
        self.currency = currency;
        self
    }

    /// Path of the current platform request, recorded with every audit entry.
    pub fn with_request_path(mut self, path: impl Into<String>) -> Self {
        self.request_path = Some(path.into());
        self
    }

    pub fn with_audit_log(mut self, audit: Arc<dyn AuditLog>) -> Self {
        self.audit = audit;
        self
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.api = self.api.with_endpoint(endpoint);
        self
    }

    pub fn api(&self) -> &AlipayApi {
        &self.api
    }

    /// Starts a payment and renders the form that forwards the client to Alipay.
    ///
    /// Returns `Ok(None)` when Alipay did not offer a redirect.
    pub async fn build_process(
        &self,
        contact: &ContactInfo,
        amount: Decimal,
        invoice_amounts: Option<&[InvoiceAmount]>,
        options: &ProcessOptions,
    ) -> Result<Option<String>, GatewayError> {
        let fields = PaymentRequest {
            subject: options.description.clone(),
            out_trade_no: OrderId::build(
                &contact.client_id,
                invoice_amounts.unwrap_or_default(),
                Utc::now().timestamp(),
            ),
            currency: self.currency.clone(),
            total_fee: format_amount(amount),
            supplier: self.context.company_name.clone(),
            notify_url: Some(self.context.notify_url.clone()),
            return_url: options.return_url.clone(),
        };
        self.log(Direction::Input, payload(&fields), true);

        let outcome = match self.api.request_payment(fields).await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(client_id = %contact.client_id, error = %e, "Alipay payment request failed");
                self.log(Direction::Output, payload(&e.to_string()), false);
                return Err(GatewayError::Internal(e.to_string()));
            }
        };

        let redirected = outcome.header("location").is_some();
        self.log(Direction::Output, payload(&outcome), redirected);
        if !redirected {
            warn!(client_id = %contact.client_id, "Alipay did not offer a payment redirect");
            return Ok(None);
        }

        Ok(Some(render_form(&outcome.url, &outcome.params)))
    }

    /// Handles the asynchronous notification. The payload is trusted only
    /// after Alipay confirms its `notify_id`.
    pub async fn validate(&self, _get: &CallbackParams, post: &CallbackParams) -> Notification {
        let order = OrderId::parse(post.out_trade_no.as_deref().unwrap_or_default());

        let verified = match post.notify_id.as_deref() {
            Some(notify_id) => self
                .api
                .verify_notification(notify_id)
                .await
                .unwrap_or_else(|e| {
                    warn!(error = %e, "Alipay notification verification failed");
                    false
                }),
            None => {
                warn!("Alipay notification without notify_id");
                false
            }
        };

        let status = if verified {
            TransactionStatus::from_trade_status(post.trade_status.as_deref())
        } else {
            TransactionStatus::Error
        };
        self.log(
            Direction::Output,
            payload(post),
            status != TransactionStatus::Error,
        );

        Notification {
            transaction: TransactionRecord {
                client_id: order.client_id.clone(),
                amount: post.total_fee.clone(),
                currency: post.currency.clone(),
                status,
                reference_id: None,
                transaction_id: post.trade_no.clone(),
                invoices: order.invoice_amounts(),
            },
            acknowledgement: verified.then_some(NOTIFY_ACKNOWLEDGEMENT),
        }
    }

    /// Handles the client's browser returning from Alipay.
    pub fn success(&self, get: &CallbackParams, _post: &CallbackParams) -> TransactionRecord {
        let order = OrderId::parse(get.out_trade_no.as_deref().unwrap_or_default());
        let status = TransactionStatus::from_trade_status(get.trade_status.as_deref());
        self.log(
            Direction::Output,
            payload(get),
            status != TransactionStatus::Error,
        );

        TransactionRecord {
            client_id: order.client_id.clone(),
            amount: get.total_fee.clone(),
            currency: get.currency.clone(),
            status,
            reference_id: None,
            transaction_id: get.trade_no.clone(),
            invoices: order.invoice_amounts(),
        }
    }

    /// Not offered by Alipay.
    pub fn capture(
        &self,
        _reference_id: &str,
        _transaction_id: &str,
        _amount: Decimal,
        _invoice_amounts: Option<&[InvoiceAmount]>,
    ) -> Result<TransactionRecord, GatewayError> {
        Err(GatewayError::Unsupported)
    }

    /// Not offered by Alipay.
    pub fn void(
        &self,
        _reference_id: &str,
        _transaction_id: &str,
        _notes: Option<&str>,
    ) -> Result<TransactionRecord, GatewayError> {
        Err(GatewayError::Unsupported)
    }

    // TODO: wire to `AlipayApi::request_refund`; the platform's refund call
    // lacks the original `out_trade_no` and currency that `forex_refund` needs.
    pub fn refund(
        &self,
        _reference_id: &str,
        _transaction_id: &str,
        _amount: Decimal,
        _notes: Option<&str>,
    ) -> Result<TransactionRecord, GatewayError> {
        Err(GatewayError::Unsupported)
    }

    fn log(&self, direction: Direction, payload: String, success: bool) {
        self.audit.record(AuditEntry {
            request_path: self.request_path.clone(),
            direction,
            success,
            payload,
        });
    }
}
