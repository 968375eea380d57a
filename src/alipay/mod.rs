//! # Alipay Module
//!
//! Client for the Alipay cross-border (forex) MAPI gateway: signed requests,
//! the `ILLEGAL_*` error vocabulary and XML / plain-text reply parsing.
pub mod alipay_api;
pub mod errors;
pub mod response;
pub mod signature;

pub use alipay_api::{
    format_amount, http_client, AlipayApi, ApiOutcome, Credentials, PaymentRequest, RefundRequest,
};
pub use errors::{error_message, ApiError, ErrorCode};
pub use response::{ApiResponse, XmlResult};
