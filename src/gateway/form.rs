// --- File: src/gateway/form.rs ---

use std::collections::BTreeMap;

use html_escape::{encode_double_quoted_attribute, encode_text};

use crate::lang;

/// Renders the auto-submitting form that sends the client to Alipay.
///
/// Every field except `sign` becomes a hidden input; the signature is written
/// last, on its own.
pub fn render_form(post_to: &str, fields: &BTreeMap<String, String>) -> String {
    let mut html = String::new();
    html.push_str(&format!(
        "<form name=\"alipay_form\" id=\"alipay_form\" action=\"{}\" method=\"post\" accept-charset=\"UTF-8\">\n",
        encode_double_quoted_attribute(post_to)
    ));
    for (name, value) in fields.iter().filter(|(name, _)| name.as_str() != "sign") {
        html.push_str(&hidden_input(name, value));
    }
    if let Some(signature) = fields.get("sign") {
        html.push_str(&hidden_input("sign", signature));
    }
    html.push_str(&format!(
        "  <button type=\"submit\" class=\"btn btn-default\">{}</button>\n",
        encode_text(lang::BUILDPROCESS_SUBMIT)
    ));
    html.push_str("</form>\n");
    html.push_str("<script type=\"text/javascript\">document.getElementById('alipay_form').submit();</script>\n");
    html
}

fn hidden_input(name: &str, value: &str) -> String {
    format!(
        "  <input type=\"hidden\" name=\"{}\" value=\"{}\" />\n",
        encode_double_quoted_attribute(name),
        encode_double_quoted_attribute(value)
    )
}
