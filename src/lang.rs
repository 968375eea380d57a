//! English strings shown by the billing platform for this gateway.

pub const NAME: &str = "Alipay";
pub const DESCRIPTION: &str = "One of the worlds largest third-party mobile and online payment platform. Primary market is mainland China";

pub const MERCHANT_EMAIL: &str = "Merchant Email";
pub const MERCHANT_UID: &str = "Merchant UID/PID";
pub const SIGNATURE_KEY: &str = "Signature Key";
pub const DEV_MODE: &str = "Developer Mode";
pub const DEV_MODE_NOTE: &str = "Enabling this option will post transactions to the Alipay Sandbox environment. Only enable this option if you are testing with a Alipay Sandbox account.";

pub const BUILDPROCESS_SUBMIT: &str = "Pay with Alipay";

pub const ERROR_MERCHANT_EMAIL: &str = "You must enter a valid email address.";
pub const ERROR_MERCHANT_UID: &str = "You must enter a valid Merchant UID/PID.";
pub const ERROR_SIGNATURE_KEY: &str = "You must enter a valid signature key.";
pub const ERROR_UNSUPPORTED: &str = "This gateway does not support the requested operation.";
