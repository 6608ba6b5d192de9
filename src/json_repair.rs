//! Locate the JSON payload inside a free-form model response.
//!
//! Models often wrap their answer in a fenced block, prepend a sentence, or
//! append an explanation. Extraction works in three steps: take the interior
//! of a ```` ```json ```` fence if there is one, strip known boilerplate
//! prefixes, then try to decode a complete JSON value at every `[`/`{`
//! position and keep the first span that decodes.

use crate::error::NutritionError;
use log::debug;
use serde_json::{Deserializer, Value};

const JSON_FENCE: &str = "```json";
const FENCE: &str = "```";

/// Sentences models like to put in front of the payload.
const BOILERPLATE_PREFIXES: &[&str] = &[
    "Aquí está el JSON solicitado:",
    "Aquí está el JSON:",
    "Aquí tienes el JSON:",
    "Here is the JSON:",
    "Here's the JSON:",
    "JSON:",
];

/// Return the smallest substring of `raw` that holds the JSON array or object.
///
/// Fails with [`NutritionError::NoJsonFound`] when the text contains no
/// opening bracket at all. When no candidate decodes, the span from the first
/// opening bracket to the last closing bracket is returned so the caller can
/// report it as malformed.
pub fn extract_json(raw: &str) -> Result<String, NutritionError> {
    let body = fenced_json(raw).unwrap_or(raw);
    let cleaned = strip_boilerplate(body.trim());

    let starts: Vec<usize> = cleaned
        .char_indices()
        .filter(|(_, c)| *c == '[' || *c == '{')
        .map(|(i, _)| i)
        .collect();

    let first = *starts.first().ok_or(NutritionError::NoJsonFound)?;

    for &start in &starts {
        if let Some(len) = decoded_len(&cleaned[start..]) {
            return Ok(cleaned[start..start + len].to_string());
        }
    }

    debug!("No candidate span decoded, falling back to bracket bounds");
    let last_close = cleaned.rfind(']').max(cleaned.rfind('}'));
    let span = match last_close {
        Some(end) if end > first => &cleaned[first..=end],
        _ => &cleaned[first..],
    };
    Ok(span.trim().to_string())
}

/// Interior of the first ```` ```json ```` fenced block, trimmed.
fn fenced_json(raw: &str) -> Option<&str> {
    let start = find_ignore_ascii_case(raw, JSON_FENCE)?;
    let after_fence = &raw[start + JSON_FENCE.len()..];
    let interior = match after_fence.find(FENCE) {
        Some(end) => &after_fence[..end],
        None => after_fence,
    };
    Some(interior.trim())
}

fn strip_boilerplate(text: &str) -> &str {
    for prefix in BOILERPLATE_PREFIXES {
        let matches = text
            .get(..prefix.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(prefix));
        if matches {
            return text[prefix.len()..].trim_start();
        }
    }
    text
}

/// Byte length of the JSON value at the start of `text`, if one decodes.
fn decoded_len(text: &str) -> Option<usize> {
    let mut stream = Deserializer::from_str(text).into_iter::<Value>();
    match stream.next() {
        Some(Ok(_)) => Some(stream.byte_offset()),
        _ => None,
    }
}

fn find_ignore_ascii_case(haystack: &str, needle: &str) -> Option<usize> {
    haystack
        .to_ascii_lowercase()
        .find(&needle.to_ascii_lowercase())
}
