//! Recovering JSON from free-form model output.
//!
//! Models asked for "strict JSON" still wrap it in code fences or prose. The
//! helpers here strip fences and cut the outermost `[...]` or `{...}` span
//! before handing it to `serde_json`.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Deserializer};

use venuescout_shared::{Result, VenueScoutError};

/// Matches an opening fence with an optional language tag, or a bare fence.
static FENCE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"```(?:json|JSON)?\s*").expect("fence regex"));

/// Remove Markdown code-fence markers and trim the result.
pub fn strip_fences(content: &str) -> String {
    FENCE_RE.replace_all(content, "").trim().to_string()
}

/// The substring from the first `open` to the last `close`, inclusive.
pub fn outer_span(content: &str, open: char, close: char) -> Option<&str> {
    let start = content.find(open)?;
    let end = content.rfind(close)?;
    (end > start).then(|| &content[start..=end])
}

/// Extract and parse the outermost JSON array in model output.
pub fn json_array(content: &str) -> Result<Vec<serde_json::Value>> {
    let cleaned = strip_fences(content);
    let span = outer_span(&cleaned, '[', ']')
        .ok_or_else(|| VenueScoutError::parse("no JSON array in model output"))?;
    serde_json::from_str(span)
        .map_err(|e| VenueScoutError::parse(format!("invalid JSON array in model output: {e}")))
}

/// Extract and parse the outermost JSON object in model output.
pub fn json_object(content: &str) -> Result<serde_json::Map<String, serde_json::Value>> {
    let cleaned = strip_fences(content);
    let span = outer_span(&cleaned, '{', '}')
        .ok_or_else(|| VenueScoutError::parse("no JSON object in model output"))?;
    serde_json::from_str(span)
        .map_err(|e| VenueScoutError::parse(format!("invalid JSON object in model output: {e}")))
}

/// Deserialize a number that a model may have written as a string.
///
/// Anything that is not a finite number becomes `None`.
pub(crate) fn lenient_f64<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    let number = match value {
        Some(serde_json::Value::Number(n)) => n.as_f64(),
        Some(serde_json::Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    Ok(number.filter(|n| n.is_finite()))
}

/// Deserialize an optional string, treating blanks and non-strings as absent.
pub(crate) fn lenient_string<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}
