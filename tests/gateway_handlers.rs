// tests/gateway_handlers.rs

mod common;

use actix_web::{http::StatusCode, test, web, App};
use common::test_config;
use serde_json::Value;
use tiny_alipay_gateway::alipay::http_client;
use tiny_alipay_gateway::gateway::gateway_handlers::{
    build_process_handler, notification_handler, return_handler,
};
use wiremock::matchers::{method, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

macro_rules! init_app {
    ($server:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new(test_config($server)))
                .app_data(web::Data::new(http_client().expect("http client")))
                .service(build_process_handler)
                .service(notification_handler)
                .service(return_handler),
        )
        .await
    };
}

async fn mount_verify(server: &MockServer, notify_id: &str, answer: &str) {
    Mock::given(method("GET"))
        .and(query_param("service", "notify_verify"))
        .and(query_param("notify_id", notify_id))
        .respond_with(ResponseTemplate::new(200).set_body_raw(answer.to_string(), "text/plain"))
        .mount(server)
        .await;
}

const NOTIFICATION: &str = "out_trade_no=42%407%3D10.00&trade_status=TRADE_FINISHED&trade_no=2024030521001004&total_fee=10.00&currency=USD";

#[actix_web::test]
async fn verified_notification_is_acknowledged() {
    let server = MockServer::start().await;
    mount_verify(&server, "n-1", "true").await;
    let app = init_app!(&server);

    let req = test::TestRequest::post()
        .uri("/callback/1/alipay/")
        .insert_header(("content-type", "application/x-www-form-urlencoded"))
        .set_payload(format!("{NOTIFICATION}&notify_id=n-1"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = test::read_body(resp).await;
    assert_eq!(body.as_ref(), b"Success");
}

#[actix_web::test]
async fn unverified_notification_gets_no_acknowledgement() {
    let server = MockServer::start().await;
    mount_verify(&server, "n-2", "false").await;
    let app = init_app!(&server);

    let req = test::TestRequest::post()
        .uri("/callback/1/alipay/")
        .insert_header(("content-type", "application/x-www-form-urlencoded"))
        .set_payload(format!("{NOTIFICATION}&notify_id=n-2"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(test::read_body(resp).await.is_empty());
}

#[actix_web::test]
async fn notification_for_another_company_is_not_found() {
    let server = MockServer::start().await;
    let app = init_app!(&server);

    let req = test::TestRequest::post()
        .uri("/callback/2/alipay/")
        .insert_header(("content-type", "application/x-www-form-urlencoded"))
        .set_payload(format!("{NOTIFICATION}&notify_id=n-3"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn return_redirect_yields_transaction_record() {
    let server = MockServer::start().await;
    let app = init_app!(&server);

    let req = test::TestRequest::get()
        .uri(&format!("/return/alipay?{NOTIFICATION}"))
        .to_request();
    let record: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(record["client_id"], "42");
    assert_eq!(record["status"], "approved");
    assert_eq!(record["amount"], "10.00");
    assert_eq!(record["transaction_id"], "2024030521001004");
    assert_eq!(record["invoices"][0]["id"], "7");
    assert_eq!(record["invoices"][0]["amount"], "10.00");
    // nothing was sent to Alipay
    assert!(server.received_requests().await.unwrap_or_default().is_empty());
}

#[actix_web::test]
async fn process_renders_payment_form() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("service", "create_forex_trade"))
        .and(query_param("out_trade_no", "42@12=10.00|13=5.50"))
        .and(query_param("total_fee", "15.50"))
        .and(query_param("currency", "USD"))
        .and(query_param("supplier", "Example Ltd."))
        .and(query_param("notify_url", "https://billing.example.com/callback/gw/1/alipay/"))
        .respond_with(
            ResponseTemplate::new(302).insert_header("Location", "https://mapi.alipay.com/cashier"),
        )
        .expect(1)
        .mount(&server)
        .await;
    let app = init_app!(&server);

    let req = test::TestRequest::post()
        .uri("/api/alipay/process")
        .set_json(serde_json::json!({
            "contact": { "client_id": 42 },
            "amount": 15.5,
            "invoices": [ { "id": 12, "amount": "10.00" }, { "id": 13, "amount": "5.50" } ],
            "options": { "description": "Invoice #12" }
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let html = String::from_utf8(test::read_body(resp).await.to_vec()).expect("utf-8 form");

    assert!(html.contains("/gateway.do\""));
    assert!(html.contains("name=\"out_trade_no\" value=\"42@12=10.00|13=5.50\""));
    assert!(html.contains("name=\"subject\" value=\"Invoice #12\""));
    assert!(html.contains("name=\"sign\""));
    assert!(html.contains("Pay with Alipay"));
}

#[actix_web::test]
async fn process_without_redirect_returns_no_content() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("<html>busy</html>", "text/html"))
        .mount(&server)
        .await;
    let app = init_app!(&server);

    let req = test::TestRequest::post()
        .uri("/api/alipay/process")
        .set_json(serde_json::json!({ "contact": { "client_id": "7" }, "amount": 3.0 }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
}

#[actix_web::test]
async fn process_rejected_by_alipay_reports_the_message() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("ILLEGAL_PARTNER", "text/html"))
        .mount(&server)
        .await;
    let app = init_app!(&server);

    let req = test::TestRequest::post()
        .uri("/api/alipay/process")
        .set_json(serde_json::json!({ "contact": { "client_id": "7" }, "amount": 3.0 }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
    let body = test::read_body(resp).await;
    assert_eq!(body.as_ref(), b"Incorrect Partner ID");
}

#[actix_web::test]
async fn process_rounds_half_cents_up() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("total_fee", "10.13"))
        .respond_with(
            ResponseTemplate::new(302).insert_header("Location", "https://mapi.alipay.com/cashier"),
        )
        .expect(1)
        .mount(&server)
        .await;
    let app = init_app!(&server);

    let req = test::TestRequest::post()
        .uri("/api/alipay/process")
        .set_json(serde_json::json!({ "contact": { "client_id": "7" }, "amount": 10.125 }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_web::test]
async fn process_with_unreadable_amount_is_a_bad_request() {
    let server = MockServer::start().await;
    let app = init_app!(&server);

    let req = test::TestRequest::post()
        .uri("/api/alipay/process")
        .set_json(serde_json::json!({ "contact": { "client_id": "7" }, "amount": "ten" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(server.received_requests().await.unwrap_or_default().is_empty());
}
