//! # tiny_alipay_gateway
//!
//! `tiny_alipay_gateway` connects a billing platform to the
//! [Alipay](https://global.alipay.com/) cross-border payment API, with a small
//! Actix-Web server for the payment, notification and return endpoints.
//!
//! ## ✅ Features
//!
//! - 🔏 MD5-signed requests against the Alipay MAPI gateway (sandbox or production)
//! - 🧾 XML / plain-text reply parsing with the full `ILLEGAL_*` error vocabulary
//! - 🔔 Notification verification with the `Success` acknowledgement Alipay expects
//! - 🔐 Rate limiting with `actix-governor`
//! - 🧪 Environment file support (`.env`, `.env.production`, etc.)
//!
//! ## 🔧 Configuration
//!
//! Start the app like this:
//!
//! ```bash
//! cargo run -- .env.production
//! ```
//!
//! ### Required `.env` values
//!
//! - `ALIPAY_MERCHANT_EMAIL`
//! - `ALIPAY_MERCHANT_UID` (16 digits beginning with 2088)
//! - `ALIPAY_SIGNATURE_KEY`
//!
//! ### Optional
//!
//! - `ALIPAY_DEV_MODE=true` to use the Alipay sandbox
//! - `ALIPAY_CURRENCY=USD`
//! - `ALIPAY_GATEWAY_URL` to point at another gateway URL
//! - `COMPANY_ID=1`, `COMPANY_NAME=Example Ltd.`
//! - `GATEWAY_CALLBACK_URL=https://billing.example.com/callback/gw/`
//! - `SERVER_PORT=6666`
//!
//! ### Rate Limiting
//!
//! - `GOVERNOR_BURST=5`
//! - `GOVERNOR_PER_SECOND=2`
//!
//! ## 📚 Modules
//!
//! - [`alipay`](crate::alipay) — API client, signatures, reply parsing
//! - [`gateway`](crate::gateway) — billing adapter and HTTP handlers
//! - [`config`](crate::config) — settings validation and environment loading
//! - [`lang`](crate::lang) — user-facing strings
//! - [`utils`](crate::utils) — environment loader
//!
//! ## 📄 License
//!
//! MIT License © [Holger Trahe](https://github.com/holg)

pub mod alipay;
pub mod config;
pub mod gateway;
pub mod lang;
pub mod utils;
