//! Field selection, provider reply parsing, and theme resolution.

use crate::models::{FieldMapping, PosterField};
use crate::{Error, Result};
use serde_json::{Map, Value};

/// Background used when neither the model nor the user supplied a theme.
pub const FALLBACK_THEME: &str = "A modern, professional tech-themed poster background with subtle digital code and soft gradients.";

/// Loose truthiness for flags arriving from clients: `true` or any
/// capitalisation of the string `"true"`. Everything else is false.
pub fn coerce_flag(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(flag)) => *flag,
        Some(Value::String(text)) => text.to_lowercase() == "true",
        _ => false,
    }
}

/// Fields whose `include_<field>` flag is set, in canonical order.
pub fn select_fields(flags: &Map<String, Value>) -> Vec<PosterField> {
    PosterField::ALL
        .into_iter()
        .filter(|field| coerce_flag(flags.get(&field.flag_key())))
        .collect()
}

/// Parse the text model's reply as a flat JSON object.
///
/// Strings are kept verbatim, numbers and booleans are stringified and
/// `null` entries are dropped. Nested values, prose, and markdown fences
/// are rejected.
pub fn parse_fields(raw: &str) -> Result<FieldMapping> {
    let object: Map<String, Value> = serde_json::from_str(raw.trim()).map_err(|e| {
        tracing::error!("Text model reply is not a JSON object: {}\nReply: {}", e, raw);
        Error::MalformedResponse(e.to_string())
    })?;

    let mut mapping = FieldMapping::new();
    for (key, value) in object {
        let text = match value {
            Value::String(text) => text,
            Value::Number(number) => number.to_string(),
            Value::Bool(flag) => flag.to_string(),
            Value::Null => continue,
            Value::Array(_) | Value::Object(_) => {
                tracing::error!("Text model reply has nested value for key '{}'", key);
                return Err(Error::MalformedResponse(format!(
                    "value for '{}' is not a flat string",
                    key
                )));
            }
        };
        mapping.insert(key, text);
    }

    Ok(mapping)
}

/// Requested fields the model left out of its reply.
pub fn missing_fields(requested: &[PosterField], mapping: &FieldMapping) -> Vec<PosterField> {
    requested
        .iter()
        .copied()
        .filter(|field| mapping.field(*field).is_none())
        .collect()
}

/// Pick the single theme for the image stage: the model's suggestion, then
/// the caller's theme, then [`FALLBACK_THEME`].
pub fn resolve_theme(fields: &FieldMapping, explicit: Option<&str>) -> String {
    let non_blank = |theme: &&str| !theme.trim().is_empty();

    fields
        .suggested_theme()
        .filter(non_blank)
        .or_else(|| explicit.filter(non_blank))
        .unwrap_or(FALLBACK_THEME)
        .to_string()
}
