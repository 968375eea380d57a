// --- File: src/alipay/response.rs ---

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::header::HeaderMap;
use serde::Serialize;

use super::errors::{error_message, ApiError};

// `<tag>value</tag>`; the closing tag is compared separately because `regex`
// has no backreferences.
static TAG_PAIR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"<([^<>\n]+?)>([^<]+)</([^<>\n]+)>").expect("tag pattern is valid")
});

static ILLEGAL_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"ILLEGAL_[A-Z0-9_]*").expect("illegal token pattern is valid"));

const PLAIN_MARKER: &str = "secure;";

/// Tag/value pairs scanned out of an XML reply.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct XmlResult {
    /// Every scanned pair, `is_success` and `error` included as sent.
    pub fields: BTreeMap<String, String>,
    pub is_success: Option<bool>,
    pub error: Option<String>,
    pub error_msg: Option<&'static str>,
}

impl XmlResult {
    pub fn get(&self, tag: &str) -> Option<&str> {
        self.fields.get(tag).map(String::as_str)
    }
}

/// Normalized body of an Alipay reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum ApiResponse {
    Xml(XmlResult),
    Plain(String),
    Empty,
}

impl ApiResponse {
    /// Dispatches on the reply's content-type.
    pub fn parse(content_type: Option<&str>, body: &str) -> Self {
        match content_type {
            Some(ct) if ct.contains("text/xml") || ct.contains("application/xml") => {
                Self::Xml(parse_xml(body))
            }
            Some(ct) if ct.contains("text/plain") => Self::Plain(parse_plain(body)),
            _ => Self::Empty,
        }
    }

    pub fn as_xml(&self) -> Option<&XmlResult> {
        match self {
            Self::Xml(xml) => Some(xml),
            _ => None,
        }
    }

    pub fn as_plain(&self) -> Option<&str> {
        match self {
            Self::Plain(text) => Some(text),
            _ => None,
        }
    }
}

fn parse_xml(body: &str) -> XmlResult {
    let mut fields = BTreeMap::new();
    for caps in TAG_PAIR.captures_iter(body) {
        let (open, value, close) = (&caps[1], &caps[2], &caps[3]);
        if open.eq_ignore_ascii_case(close) {
            fields.insert(open.to_string(), value.to_string());
        }
    }

    let error = fields.get("error").cloned();
    let error_msg = error.as_deref().map(error_message);
    let is_success = fields.get("is_success").map(|flag| flag == "T");

    XmlResult {
        fields,
        is_success,
        error,
        error_msg,
    }
}

fn parse_plain(body: &str) -> String {
    body.split_once(PLAIN_MARKER)
        .map_or(body, |(_, rest)| rest)
        .trim()
        .to_string()
}

/// Fails when the raw body carries an `ILLEGAL_*` code anywhere.
pub fn check_rejection(body: &str) -> Result<(), ApiError> {
    if !body.contains("ILLEGAL_") {
        return Ok(());
    }
    let code = ILLEGAL_TOKEN
        .find(body)
        .map_or("ILLEGAL_", |token| token.as_str());
    Err(ApiError::rejected(code))
}

/// Lower-cased header names mapped to their (last) value.
pub fn parse_headers(headers: &HeaderMap) -> BTreeMap<String, String> {
    headers
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_ascii_lowercase(),
                String::from_utf8_lossy(value.as_bytes()).trim().to_string(),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::{HeaderValue, CONTENT_TYPE, LOCATION};

    const XML_OK: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<alipay>
  <is_success>T</is_success>
  <request>
    <param name="service">forex_refund</param>
  </request>
  <sign>4f7c</sign>
</alipay>"#;

    #[test]
    fn xml_is_success_t_is_true() {
        let parsed = ApiResponse::parse(Some("text/xml; charset=GBK"), XML_OK);
        let xml = parsed.as_xml().unwrap();
        assert_eq!(xml.is_success, Some(true));
        assert_eq!(xml.get("sign"), Some("4f7c"));
        assert!(xml.error.is_none());
    }

    #[test]
    fn xml_other_success_tokens_are_false() {
        for token in ["F", "t", "TRUE", "yes"] {
            let body = format!("<alipay><is_success>{token}</is_success></alipay>");
            let parsed = ApiResponse::parse(Some("text/xml"), &body);
            assert_eq!(parsed.as_xml().unwrap().is_success, Some(false), "{token}");
        }
    }

    #[test]
    fn xml_error_field_resolves_message() {
        let body = "<alipay><is_success>F</is_success><error>RETURN_AMOUNT_EXCEED</error></alipay>";
        let parsed = ApiResponse::parse(Some("text/xml"), body);
        let xml = parsed.as_xml().unwrap();
        assert_eq!(xml.error.as_deref(), Some("RETURN_AMOUNT_EXCEED"));
        assert_eq!(xml.error_msg, Some("Refund amount is over the payment amount"));
    }

    #[test]
    fn xml_unknown_error_uses_generic_message() {
        let body = "<alipay><error>SYSTEM_BUSY</error></alipay>";
        let parsed = ApiResponse::parse(Some("text/xml"), body);
        assert_eq!(
            parsed.as_xml().unwrap().error_msg,
            Some(crate::alipay::errors::GENERIC_ERROR_MESSAGE)
        );
    }

    #[test]
    fn xml_keeps_unknown_and_repeated_tags() {
        let body = "<r><foo>1</foo><bar>2</bar><foo>3</foo><Mixed>x</mixed></r>";
        let parsed = ApiResponse::parse(Some("text/xml"), body);
        let xml = parsed.as_xml().unwrap();
        assert_eq!(xml.get("foo"), Some("3"));
        assert_eq!(xml.get("bar"), Some("2"));
        assert_eq!(xml.get("Mixed"), Some("x"));
        assert!(xml.is_success.is_none());
    }

    #[test]
    fn plain_body_takes_text_after_marker() {
        let parsed = ApiResponse::parse(Some("text/plain;charset=utf-8"), "path=/; secure;\n true \n");
        assert_eq!(parsed.as_plain(), Some("true"));
    }

    #[test]
    fn plain_body_without_marker_is_trimmed_whole() {
        let parsed = ApiResponse::parse(Some("text/plain"), "  false\n");
        assert_eq!(parsed, ApiResponse::Plain("false".to_string()));
    }

    #[test]
    fn application_xml_is_parsed_as_xml() {
        let parsed = ApiResponse::parse(Some("application/xml; charset=UTF-8"), XML_OK);
        assert_eq!(parsed.as_xml().map(|xml| xml.is_success), Some(Some(true)));
    }

    #[test]
    fn other_content_types_are_empty() {
        assert_eq!(ApiResponse::parse(Some("text/html"), "<html/>"), ApiResponse::Empty);
        assert_eq!(ApiResponse::parse(None, "true"), ApiResponse::Empty);
    }

    #[test]
    fn illegal_sign_anywhere_is_rejected() {
        for body in [
            "ILLEGAL_SIGN",
            "<alipay><is_success>F</is_success><error>ILLEGAL_SIGN</error></alipay>",
            "<html><body>error: ILLEGAL_SIGN, please check</body></html>",
        ] {
            let err = check_rejection(body).unwrap_err();
            assert_eq!(err.to_string(), "Illegal signature", "{body}");
        }
    }

    #[test]
    fn longest_illegal_code_wins() {
        let err = check_rejection("<error>ILLEGAL_SIGN_TYPE</error>").unwrap_err();
        assert_eq!(err.to_string(), "Signature is of wrong type");
    }

    #[test]
    fn clean_body_passes_rejection_check() {
        assert!(check_rejection(XML_OK).is_ok());
    }

    #[test]
    fn headers_are_lowercased() {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("text/xml"));
        headers.insert(LOCATION, HeaderValue::from_static("https://example.com/pay"));
        let parsed = parse_headers(&headers);
        assert_eq!(parsed.get("content-type").map(String::as_str), Some("text/xml"));
        assert_eq!(
            parsed.get("location").map(String::as_str),
            Some("https://example.com/pay")
        );
    }
}
