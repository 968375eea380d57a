// --- File: src/alipay/errors.rs ---

use thiserror::Error;

/// Message used for any gateway error code that is not in the table.
pub const GENERIC_ERROR_MESSAGE: &str =
    "An internal error occurred, or the server did not respond to the request.";

/// Error codes the Alipay gateway reports, either as a bare `ILLEGAL_*` token in
/// the response body or in the `<error>` field of an XML reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    IllegalSign,
    IllegalService,
    IllegalPartner,
    IllegalSignType,
    IllegalPartnerExterface,
    IllegalDynMd5Key,
    IllegalEncrypt,
    IllegalUser,
    IllegalExterface,
    IllegalAgent,
    IllegalArgument,
    IllegalCurrency,
    IllegalTimeoutRule,
    IllegalSecurityProfile,
    RefundmentValidDateExceed,
    RepeatedRefundmentRequest,
    ReturnAmountExceed,
    CurrencyNotSame,
    PurchaseTradeNotExist,
}

impl ErrorCode {
    /// Looks up a gateway code such as `ILLEGAL_SIGN`.
    pub fn from_code(code: &str) -> Option<Self> {
        let code = match code {
            "ILLEGAL_SIGN" => Self::IllegalSign,
            "ILLEGAL_SERVICE" => Self::IllegalService,
            "ILLEGAL_PARTNER" => Self::IllegalPartner,
            "ILLEGAL_SIGN_TYPE" => Self::IllegalSignType,
            "ILLEGAL_PARTNER_EXTERFACE" => Self::IllegalPartnerExterface,
            "ILLEGAL_DYN_MD5_KEY" => Self::IllegalDynMd5Key,
            "ILLEGAL_ENCRYPT" => Self::IllegalEncrypt,
            "ILLEGAL_USER" => Self::IllegalUser,
            "ILLEGAL_EXTERFACE" => Self::IllegalExterface,
            "ILLEGAL_AGENT" => Self::IllegalAgent,
            "ILLEGAL_ARGUMENT" => Self::IllegalArgument,
            "ILLEGAL_CURRENCY" => Self::IllegalCurrency,
            "ILLEGAL_TIMEOUT_RULE" => Self::IllegalTimeoutRule,
            "ILLEGAL_SECURITY_PROFILE" => Self::IllegalSecurityProfile,
            "REFUNDMENT_VALID_DATE_EXCEED" => Self::RefundmentValidDateExceed,
            "REPEATED_REFUNDMENT_REQUEST" => Self::RepeatedRefundmentRequest,
            "RETURN_AMOUNT_EXCEED" => Self::ReturnAmountExceed,
            "CURRENCY_NOT_SAME" => Self::CurrencyNotSame,
            "PURCHASE_TRADE_NOT_EXIST" => Self::PurchaseTradeNotExist,
            _ => return None,
        };
        Some(code)
    }

    pub fn message(self) -> &'static str {
        match self {
            Self::IllegalSign => "Illegal signature",
            Self::IllegalService => "Service Parameter is incorrect",
            Self::IllegalPartner => "Incorrect Partner ID",
            Self::IllegalSignType => "Signature is of wrong type",
            Self::IllegalPartnerExterface => "Service is not activated for this account",
            Self::IllegalDynMd5Key => "Dynamic key information is incorrect",
            Self::IllegalEncrypt => "Encryption is incorrect",
            Self::IllegalUser => "User ID is incorrect",
            Self::IllegalExterface => "Interface configuration is incorrect",
            Self::IllegalAgent => "Agency ID is incorrect",
            Self::IllegalArgument => "Incorrect parameter",
            Self::IllegalCurrency => "Currency parameter is incorrect",
            Self::IllegalTimeoutRule => "Timeout_rule parameter is incorrect",
            Self::IllegalSecurityProfile => "Cannot support this kind of encryption",
            Self::RefundmentValidDateExceed => {
                "Could not refund after the specified refund timeframe."
            }
            Self::RepeatedRefundmentRequest => "Duplicated refund request",
            Self::ReturnAmountExceed => "Refund amount is over the payment amount",
            Self::CurrencyNotSame => "Different currency from the payment currency",
            Self::PurchaseTradeNotExist => "The payment transaction does not exist",
        }
    }
}

/// Resolves any gateway error code to its human-readable message.
///
/// Both the raw-body `ILLEGAL_*` scan and the XML `error` field go through here.
pub fn error_message(code: &str) -> &'static str {
    ErrorCode::from_code(code.trim()).map_or(GENERIC_ERROR_MESSAGE, ErrorCode::message)
}

/// Failures of a single Alipay API call.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Network or TLS failure, including the request timeout.
    #[error("An internal error occurred, or the server did not respond to the request.")]
    Transport(#[from] reqwest::Error),

    /// The gateway rejected the request with an `ILLEGAL_*` code.
    #[error("{message}")]
    Rejected { code: String, message: &'static str },

    /// An amount that has to be rounded could not be read as a number.
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
}

impl ApiError {
    pub fn rejected(code: &str) -> Self {
        Self::Rejected {
            code: code.to_string(),
            message: error_message(code),
        }
    }
}
