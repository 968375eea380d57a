use once_cell::sync::OnceCell;
use rust_decimal::Decimal;
use serde::{de::Error as _, Deserialize, Deserializer};
use std::env;
use std::str::FromStr;

static INIT_DOTENV: OnceCell<()> = OnceCell::new();

/// Ensures that the dotenv file is loaded into the environment variables.
///
/// The file is the first command line argument, or `.env` when none is given.
/// Loading happens once per process; later calls only report the path.
/// A missing file is not an error, the process environment is used as is.
pub fn ensure_dotenv_loaded() -> String {
    let dotenv_path = env::args().nth(1).unwrap_or_else(|| ".env".to_string());
    INIT_DOTENV.get_or_init(|| {
        dotenv::from_filename(&dotenv_path).ok();
    });
    dotenv_path
}

/// Accepts either a JSON string or a JSON number and keeps its text.
///
/// Billing platforms send invoice and client ids both ways.
pub fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrNumber {
        String(String),
        Number(serde_json::Number),
    }

    Ok(match StringOrNumber::deserialize(deserializer)? {
        StringOrNumber::String(s) => s,
        StringOrNumber::Number(n) => n.to_string(),
    })
}

/// Reads an amount sent as a JSON string or number without going through `f64`.
pub fn decimal_from_string_or_number<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    let text = string_or_number(deserializer)?;
    Decimal::from_str(text.trim())
        .map_err(|e| D::Error::custom(format!("invalid amount {text:?}: {e}")))
}
