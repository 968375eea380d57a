// --- File: src/config.rs ---

use std::collections::BTreeMap;
use std::env;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use validator::ValidateEmail;

use crate::alipay::Credentials;
use crate::lang;

/// Payment currency when `ALIPAY_CURRENCY` is not set.
pub const DEFAULT_CURRENCY: &str = "USD";

/// Settings fields the host platform stores encrypted at rest.
pub const ENCRYPTABLE_FIELDS: [&str; 2] = ["merchant_uid", "signature_key"];

/// A rejected settings field, carrying the message shown on the settings form.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettingsError {
    #[error("{}", lang::ERROR_MERCHANT_EMAIL)]
    MerchantEmail,
    #[error("{}", lang::ERROR_MERCHANT_UID)]
    MerchantUid,
    #[error("{}", lang::ERROR_SIGNATURE_KEY)]
    SignatureKey,
}

impl SettingsError {
    pub fn field(&self) -> &'static str {
        match self {
            Self::MerchantEmail => "merchant_email",
            Self::MerchantUid => "merchant_uid",
            Self::SignatureKey => "signature_key",
        }
    }
}

/// The gateway's settings ("meta") as the billing platform stores them.
#[derive(Clone, Default, Deserialize, Serialize)]
pub struct GatewaySettings {
    #[serde(default)]
    pub merchant_email: String,
    #[serde(default)]
    pub merchant_uid: String,
    #[serde(default)]
    pub signature_key: String,
    #[serde(default)]
    pub dev_mode: bool,
}

impl std::fmt::Debug for GatewaySettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewaySettings")
            .field("merchant_email", &self.merchant_email)
            .field("merchant_uid", &"***")
            .field("signature_key", &"***")
            .field("dev_mode", &self.dev_mode)
            .finish()
    }
}

impl GatewaySettings {
    /// Reads settings from the platform's string key/value meta data.
    pub fn from_meta(meta: &BTreeMap<String, String>) -> Self {
        let field = |key: &str| meta.get(key).cloned().unwrap_or_default();
        Self {
            merchant_email: field("merchant_email"),
            merchant_uid: field("merchant_uid"),
            signature_key: field("signature_key"),
            dev_mode: meta
                .get("dev_mode")
                .is_some_and(|flag| flag.eq_ignore_ascii_case("true")),
        }
    }

    /// Checks every field and reports all failures at once.
    pub fn validate(&self) -> Result<(), Vec<SettingsError>> {
        let mut errors = Vec::new();
        if !self.merchant_email.validate_email() {
            errors.push(SettingsError::MerchantEmail);
        }
        if self.merchant_uid.trim().is_empty() {
            errors.push(SettingsError::MerchantUid);
        }
        if self.signature_key.trim().is_empty() {
            errors.push(SettingsError::SignatureKey);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    pub fn credentials(&self) -> Credentials {
        Credentials {
            partner: self.merchant_uid.clone(),
            sign_key: self.signature_key.clone(),
            dev_mode: self.dev_mode,
        }
    }
}

/// Validates settings submitted from the settings form.
///
/// The meta data comes back unchanged apart from an unchecked `dev_mode`
/// checkbox, which is stored as `"false"`, whatever the validation outcome.
pub fn edit_settings(
    mut meta: BTreeMap<String, String>,
) -> (BTreeMap<String, String>, Vec<SettingsError>) {
    meta.entry("dev_mode".to_string())
        .or_insert_with(|| "false".to_string());

    let errors = GatewaySettings::from_meta(&meta)
        .validate()
        .err()
        .unwrap_or_default();
    (meta, errors)
}

fn currency_or_default(value: Option<String>) -> String {
    value
        .map(|c| c.trim().to_ascii_uppercase())
        .filter(|c| !c.is_empty())
        .unwrap_or_else(|| DEFAULT_CURRENCY.to_string())
}

// --- Unified Configuration Struct ---
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub server_port: u16,
    pub settings: GatewaySettings,

    // --- Host platform context ---
    pub company_id: String,
    pub company_name: Option<String>,
    /// Base of the platform's gateway callback URLs; the notify URL is
    /// `{base}{company_id}/alipay/`.
    pub callback_base_url: String,
    /// Currency used for payments started through the HTTP surface.
    pub currency: String,
    /// Overrides the sandbox/production gateway URL (local stubs, proxies).
    pub gateway_endpoint: Option<String>,

    // --- Rate limiting ---
    pub governor_burst: u32,
    pub governor_per_second: u64,
}

impl AppConfig {
    // Load configuration from environment variables
    pub fn load() -> Result<Self, String> {
        crate::utils::ensure_dotenv_loaded();

        let server_port = env::var("SERVER_PORT")
            .unwrap_or_else(|_| "6666".into())
            .parse::<u16>()
            .map_err(|_| "Invalid SERVER_PORT".to_string())?;

        let settings = GatewaySettings {
            merchant_email: env::var("ALIPAY_MERCHANT_EMAIL").unwrap_or_default(),
            merchant_uid: env::var("ALIPAY_MERCHANT_UID")
                .map_err(|_| "Missing ALIPAY_MERCHANT_UID env var".to_string())?,
            signature_key: env::var("ALIPAY_SIGNATURE_KEY")
                .map_err(|_| "Missing ALIPAY_SIGNATURE_KEY env var".to_string())?,
            dev_mode: env::var("ALIPAY_DEV_MODE")
                .unwrap_or_else(|_| "false".to_string())
                .eq_ignore_ascii_case("true"),
        };
        if let Err(errors) = settings.validate() {
            let messages: Vec<String> = errors.iter().map(ToString::to_string).collect();
            return Err(messages.join(" "));
        }

        let callback_base_url = env::var("GATEWAY_CALLBACK_URL")
            .unwrap_or_else(|_| format!("http://127.0.0.1:{server_port}/callback/"));

        let governor_burst = env::var("GOVERNOR_BURST")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(5);
        let governor_per_second = env::var("GOVERNOR_PER_SECOND")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(2);

        Ok(AppConfig {
            server_port,
            settings,
            company_id: env::var("COMPANY_ID").unwrap_or_else(|_| "1".to_string()),
            company_name: env::var("COMPANY_NAME").ok(),
            callback_base_url,
            currency: currency_or_default(env::var("ALIPAY_CURRENCY").ok()),
            gateway_endpoint: env::var("ALIPAY_GATEWAY_URL").ok(),
            governor_burst,
            governor_per_second,
        })
    }

    /// URL Alipay posts its asynchronous notifications to.
    pub fn notify_url(&self) -> String {
        format!("{}{}/alipay/", self.callback_base_url, self.company_id)
    }
}
