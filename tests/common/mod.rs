#![allow(dead_code)]

use tiny_alipay_gateway::{
    alipay::{http_client, AlipayApi},
    config::{AppConfig, GatewaySettings},
};
use wiremock::MockServer;

pub const PARTNER: &str = "2088101122136241";
pub const SIGN_KEY: &str = "760bdzec6y9goq7ctyx96ezkz78287de";

pub fn test_settings() -> GatewaySettings {
    GatewaySettings {
        merchant_email: "billing@example.com".to_string(),
        merchant_uid: PARTNER.to_string(),
        signature_key: SIGN_KEY.to_string(),
        dev_mode: true,
    }
}

pub fn gateway_url(server: &MockServer) -> String {
    format!("{}/gateway.do", server.uri())
}

pub fn test_api(server: &MockServer) -> AlipayApi {
    AlipayApi::new(test_settings().credentials(), http_client().expect("http client"))
        .with_endpoint(gateway_url(server))
}

pub fn test_config(server: &MockServer) -> AppConfig {
    AppConfig {
        server_port: 6666,
        settings: test_settings(),
        company_id: "1".to_string(),
        company_name: Some("Example Ltd.".to_string()),
        callback_base_url: "https://billing.example.com/callback/gw/".to_string(),
        currency: "USD".to_string(),
        gateway_endpoint: Some(gateway_url(server)),
        governor_burst: 5,
        governor_per_second: 2,
    }
}
