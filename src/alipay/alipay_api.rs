// --- File: src/alipay/alipay_api.rs ---

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::{redirect::Policy, Client};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use tracing::{debug, warn};

use super::errors::ApiError;
use super::response::{check_rejection, parse_headers, ApiResponse};
use super::signature;

pub const PRODUCTION_URL: &str = "https://mapi.alipay.com/gateway.do";
pub const SANDBOX_URL: &str = "https://openapi.alipaydev.com/gateway.do";

const INPUT_CHARSET: &str = "UTF-8";
const SIGN_TYPE: &str = "MD5";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);
const ZERO_DECIMAL_CURRENCIES: [&str; 2] = ["KRW", "JPY"];
const HONG_KONG_UTC_OFFSET_HOURS: i64 = 8;

/// Merchant credentials for the Alipay API.
///
/// - `partner`: the merchant UID/PID, 16 digits beginning with 2088.
/// - `sign_key`: the MD5 signature key of the merchant account.
/// - `dev_mode`: send requests to the Alipay sandbox instead of production.
#[derive(Clone)]
pub struct Credentials {
    pub partner: String,
    pub sign_key: String,
    pub dev_mode: bool,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("partner", &self.partner)
            .field("sign_key", &"***")
            .field("dev_mode", &self.dev_mode)
            .finish()
    }
}

/// Arguments of the `create_forex_trade` service.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PaymentRequest {
    /// Name of the items, without special symbols.
    pub subject: Option<String>,
    /// Unique transaction ID chosen by the merchant.
    pub out_trade_no: String,
    /// Settlement currency from the merchant contract.
    pub currency: Option<String>,
    pub total_fee: String,
    /// Supplier name shown on the payment page.
    pub supplier: Option<String>,
    /// Receives the asynchronous notification.
    pub notify_url: Option<String>,
    /// Browser redirect after the payment.
    pub return_url: Option<String>,
}

/// Arguments of the `forex_refund` service.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RefundRequest {
    /// Unique ID of this refund request.
    pub out_return_no: String,
    /// `out_trade_no` of the original payment.
    pub out_trade_no: String,
    pub return_amount: String,
    pub currency: String,
    pub reason: String,
}

/// Everything one API call produced.
#[derive(Debug, Clone, Serialize)]
pub struct ApiOutcome {
    pub url: String,
    /// Full outbound parameter set, `sign` included.
    pub params: BTreeMap<String, String>,
    pub headers: BTreeMap<String, String>,
    pub body: String,
    pub response: ApiResponse,
}

impl ApiOutcome {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }
}

/// Builds the HTTP client the API expects: 20 second timeout and no redirect
/// following, since the payment service answers with a `Location` header.
pub fn http_client() -> reqwest::Result<Client> {
    Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .redirect(Policy::none())
        .build()
}

/// Client for the Alipay cross-border MAPI gateway.
#[derive(Debug, Clone)]
pub struct AlipayApi {
    credentials: Credentials,
    endpoint: String,
    client: Client,
}

impl AlipayApi {
    /// `client` should come from [`http_client`].
    pub fn new(credentials: Credentials, client: Client) -> Self {
        let endpoint = if credentials.dev_mode {
            SANDBOX_URL
        } else {
            PRODUCTION_URL
        };
        Self {
            credentials,
            endpoint: endpoint.to_string(),
            client,
        }
    }

    /// Points the client at another gateway URL (a local stub, a proxy).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Requests a payment. KRW and JPY amounts are rounded to whole units.
    pub async fn request_payment(&self, request: PaymentRequest) -> Result<ApiOutcome, ApiError> {
        let total_fee = normalize_amount(request.currency.as_deref(), &request.total_fee)?;

        self.api_request(
            "create_forex_trade",
            vec![
                ("subject", request.subject),
                ("out_trade_no", Some(request.out_trade_no)),
                ("currency", request.currency),
                ("total_fee", Some(total_fee)),
                ("supplier", request.supplier),
                ("notify_url", request.notify_url),
                ("return_url", request.return_url),
            ],
        )
        .await
    }

    /// Requests a refund of an earlier payment, stamped with Hong Kong local time.
    pub async fn request_refund(&self, request: RefundRequest) -> Result<ApiOutcome, ApiError> {
        let return_amount = normalize_amount(Some(request.currency.as_str()), &request.return_amount)?;

        self.api_request(
            "forex_refund",
            vec![
                ("out_return_no", Some(request.out_return_no)),
                ("out_trade_no", Some(request.out_trade_no)),
                ("return_amount", Some(return_amount)),
                ("currency", Some(request.currency)),
                ("reason", Some(request.reason)),
                ("gmt_return", Some(refund_timestamp(Utc::now()))),
            ],
        )
        .await
    }

    /// Asks Alipay whether a notification really came from it.
    pub async fn verify_notification(&self, notify_id: &str) -> Result<bool, ApiError> {
        let outcome = self
            .api_request("notify_verify", vec![("notify_id", Some(notify_id.to_string()))])
            .await?;

        Ok(outcome.body.contains("true"))
    }

    /// Signed parameter set for `service`; absent values are left out.
    pub fn signed_params(
        &self,
        service: &str,
        fields: Vec<(&str, Option<String>)>,
    ) -> BTreeMap<String, String> {
        let mut params = BTreeMap::from([
            ("_input_charset".to_string(), INPUT_CHARSET.to_string()),
            ("service".to_string(), service.to_string()),
            ("partner".to_string(), self.credentials.partner.clone()),
            ("sign_type".to_string(), SIGN_TYPE.to_string()),
        ]);
        for (key, value) in fields {
            if let Some(value) = value {
                params.insert(key.to_string(), value);
            }
        }

        let sign = signature::sign(&params, &self.credentials.sign_key);
        params.insert("sign".to_string(), sign);
        params
    }

    async fn api_request(
        &self,
        service: &str,
        fields: Vec<(&str, Option<String>)>,
    ) -> Result<ApiOutcome, ApiError> {
        let params = self.signed_params(service, fields);
        debug!(service, endpoint = %self.endpoint, "sending Alipay request");

        let response = self
            .client
            .get(&self.endpoint)
            .query(&params)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .map_err(|e| {
                warn!(service, error = %e, "Alipay request failed");
                ApiError::Transport(e)
            })?;

        let status = response.status();
        let headers = parse_headers(response.headers());
        let body = response.text().await?;
        debug!(service, %status, bytes = body.len(), "Alipay response received");

        if let Err(e) = check_rejection(&body) {
            warn!(service, error = %e, "Alipay rejected the request");
            return Err(e);
        }

        let parsed = ApiResponse::parse(headers.get("content-type").map(String::as_str), &body);

        Ok(ApiOutcome {
            url: self.endpoint.clone(),
            params,
            headers,
            body,
            response: parsed,
        })
    }
}

/// Two-decimal amount string, midpoints rounded away from zero.
pub fn format_amount(amount: Decimal) -> String {
    let mut rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    rounded.to_string()
}

/// Rounds KRW and JPY amounts to whole units; other currencies pass through.
pub fn normalize_amount(currency: Option<&str>, amount: &str) -> Result<String, ApiError> {
    let zero_decimal = currency.is_some_and(|c| ZERO_DECIMAL_CURRENCIES.contains(&c));
    if !zero_decimal {
        return Ok(amount.to_string());
    }

    let value = Decimal::from_str(amount.trim())
        .map_err(|_| ApiError::InvalidAmount(amount.to_string()))?;
    let rounded = value.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    Ok(rounded.normalize().to_string())
}

/// `gmt_return` value: Hong Kong local time (UTC+8, no daylight saving) as
/// `YYYYMMDDHHMMSS`, with the ISO week-numbering year.
pub fn refund_timestamp(now: DateTime<Utc>) -> String {
    (now.naive_utc() + chrono::Duration::hours(HONG_KONG_UTC_OFFSET_HOURS))
        .format("%G%m%d%H%M%S")
        .to_string()
}
