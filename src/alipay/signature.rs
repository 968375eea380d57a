// --- File: src/alipay/signature.rs ---

use std::collections::BTreeMap;

/// Fields that never take part in the signed payload.
pub const UNSIGNED_FIELDS: [&str; 2] = ["sign", "sign_type"];

/// Builds the canonical `key=value&key=value` string Alipay signs.
///
/// Keys come out in byte order because of the `BTreeMap`. Values are not
/// escaped: the gateway signs the url-decoded form of the query string.
pub fn canonical_query(params: &BTreeMap<String, String>) -> String {
    params
        .iter()
        .filter(|(key, _)| !UNSIGNED_FIELDS.contains(&key.as_str()))
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join("&")
}

/// MD5 signature (lowercase hex) of the canonical query followed by the key.
pub fn sign(params: &BTreeMap<String, String>, sign_key: &str) -> String {
    let payload = format!("{}{}", canonical_query(params), sign_key);
    format!("{:x}", md5::compute(payload.as_bytes()))
}

/// Recomputes the signature of `params` and compares it with their `sign` field.
#[cfg(test)]
pub(crate) fn verify(params: &BTreeMap<String, String>, sign_key: &str) -> bool {
    params
        .get("sign")
        .is_some_and(|received| received.eq_ignore_ascii_case(&sign(params, sign_key)))
}
