// --- File: src/gateway/gateway_handlers.rs ---

use actix_web::{get, post, web, HttpRequest, HttpResponse, Responder};
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::info;

use super::alipay_gateway::{
    AlipayGateway, CallbackParams, ContactInfo, GatewayContext, ProcessOptions,
};
use super::invoices::InvoiceAmount;
use crate::config::AppConfig;
use crate::utils::decimal_from_string_or_number;

/// Body of a "start payment" request from the billing platform.
#[derive(Debug, Deserialize)]
pub struct ProcessPayload {
    pub contact: ContactInfo,
    #[serde(deserialize_with = "decimal_from_string_or_number")]
    pub amount: Decimal,
    #[serde(default)]
    pub invoices: Option<Vec<InvoiceAmount>>,
    #[serde(default)]
    pub options: ProcessOptions,
}

/// Builds the adapter for one platform request.
pub fn gateway_for(config: &AppConfig, client: &Client, req: &HttpRequest) -> AlipayGateway {
    let context = GatewayContext {
        company_name: config.company_name.clone(),
        notify_url: config.notify_url(),
    };
    let gateway = AlipayGateway::new(&config.settings, context, client.clone())
        .with_currency(Some(config.currency.clone()))
        .with_request_path(req.uri().to_string());

    match &config.gateway_endpoint {
        Some(endpoint) => gateway.with_endpoint(endpoint.clone()),
        None => gateway,
    }
}

/// Starts an Alipay payment and returns the auto-submitting payment form.
///
/// This handler builds the adapter for the configured company, sends a signed
/// `create_forex_trade` request to Alipay and, when Alipay answers with a
/// redirect, renders the form that forwards the client's browser to the
/// cashier. The amount is rounded to cents (half up) before it is signed.
///
/// # Parameters
///
/// * `req`: The incoming request; its path is recorded with every audit entry.
/// * `payload`: A JSON `ProcessPayload` which includes:
///   - `contact`: The paying contact, of which only `client_id` reaches Alipay.
///   - `amount`: The total to charge, as a JSON number or string.
///   - `invoices`: Optional invoice ids and amounts, encoded into the order id.
///   - `options`: Optional `description` (the Alipay subject) and `return_url`.
/// * `config`: The application configuration with the merchant settings.
/// * `client`: The shared `reqwest::Client` built by `http_client()`.
///
/// # Returns
///
/// Returns an `impl Responder`: `200` with the HTML form when Alipay offered a
/// redirect, `204 No Content` when it did not, and `502 Bad Gateway` with the
/// gateway's error message when the call failed or was rejected.
#[post("/api/alipay/process")]
pub async fn build_process_handler(
    req: HttpRequest,
    payload: web::Json<ProcessPayload>,
    config: web::Data<AppConfig>,
    client: web::Data<Client>,
) -> impl Responder {
    let gateway = gateway_for(&config, &client, &req);
    let payload = payload.into_inner();

    match gateway
        .build_process(
            &payload.contact,
            payload.amount,
            payload.invoices.as_deref(),
            &payload.options,
        )
        .await
    {
        Ok(Some(form)) => HttpResponse::Ok()
            .content_type("text/html; charset=utf-8")
            .body(form),
        Ok(None) => HttpResponse::NoContent().finish(),
        Err(e) => HttpResponse::BadGateway().body(e.to_string()),
    }
}

/// Receives Alipay's asynchronous payment notification.
///
/// The posted fields are only trusted after Alipay confirms the `notify_id`
/// through `notify_verify`. The resulting transaction record is logged.
///
/// # Parameters
///
/// * `company_id`: The company segment of the callback URL; must match `COMPANY_ID`.
/// * `query` / `form`: The notification fields (`out_trade_no`, `trade_status`,
///   `notify_id`, `trade_no`, `total_fee`, `currency`).
///
/// # Returns
///
/// `404` for another company's callback. Otherwise `200` with the body
/// `Success` when the notification was verified, and an empty body when it
/// was not.
#[post("/callback/{company_id}/alipay/")]
pub async fn notification_handler(
    req: HttpRequest,
    company_id: web::Path<String>,
    query: web::Query<CallbackParams>,
    form: web::Form<CallbackParams>,
    config: web::Data<AppConfig>,
    client: web::Data<Client>,
) -> impl Responder {
    if company_id.as_str() != config.company_id {
        return HttpResponse::NotFound().finish();
    }

    let gateway = gateway_for(&config, &client, &req);
    let notification = gateway.validate(&query, &form).await;
    info!(
        client_id = %notification.transaction.client_id,
        status = ?notification.transaction.status,
        transaction_id = notification.transaction.transaction_id.as_deref().unwrap_or("-"),
        "Alipay notification processed"
    );

    HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .body(notification.acknowledgement.unwrap_or_default())
}

/// The client's browser coming back from Alipay; answers with the transaction
/// record as JSON. Nothing is verified with Alipay here.
#[get("/return/alipay")]
pub async fn return_handler(
    req: HttpRequest,
    query: web::Query<CallbackParams>,
    config: web::Data<AppConfig>,
    client: web::Data<Client>,
) -> impl Responder {
    let gateway = gateway_for(&config, &client, &req);
    let record = gateway.success(&query, &CallbackParams::default());
    HttpResponse::Ok().json(record)
}
