// --- File: src/gateway/audit.rs ---

use serde::Serialize;
use tracing::info;

/// Which way the logged data travelled, seen from the billing platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Input,
    Output,
}

/// One entry of the gateway audit trail.
#[derive(Debug, Clone, Serialize)]
pub struct AuditEntry {
    /// Path of the platform request that triggered the exchange.
    pub request_path: Option<String>,
    pub direction: Direction,
    pub success: bool,
    /// JSON rendering of the fields that were sent or received.
    pub payload: String,
}

/// Sink for the gateway audit trail. The billing platform usually keeps its own
/// gateway log table; [`TracingAuditLog`] is the default.
pub trait AuditLog: Send + Sync {
    fn record(&self, entry: AuditEntry);
}

/// Writes audit entries as `tracing` events under the `alipay::audit` target.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingAuditLog;

impl AuditLog for TracingAuditLog {
    fn record(&self, entry: AuditEntry) {
        info!(
            target: "alipay::audit",
            request_path = entry.request_path.as_deref().unwrap_or("-"),
            direction = ?entry.direction,
            success = entry.success,
            payload = %entry.payload,
            "gateway exchange"
        );
    }
}

/// JSON payload for an audit entry; never fails the caller.
pub(crate) fn payload<T: Serialize + ?Sized>(data: &T) -> String {
    serde_json::to_string(data).unwrap_or_default()
}
