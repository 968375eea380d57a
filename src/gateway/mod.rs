//! # Gateway Module
//!
//! The billing-platform side: turns "charge this contact" into an Alipay
//! payment form, and Alipay's notifications and return redirects into
//! platform transaction records.
pub mod alipay_gateway;
pub mod audit;
pub mod form;
pub mod gateway_handlers;
pub mod invoices;

pub use alipay_gateway::{
    AlipayGateway, CallbackParams, ContactInfo, GatewayContext, GatewayError, Notification,
    ProcessOptions, TransactionRecord, TransactionStatus, NOTIFY_ACKNOWLEDGEMENT,
};
pub use audit::{AuditEntry, AuditLog, Direction, TracingAuditLog};
pub use invoices::{InvoiceAmount, OrderId};
