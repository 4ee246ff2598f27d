//! Generated-Output Parsing
//!
//! Text-generation replies are free text that is supposed to contain JSON.
//! `parse_generated` pulls the JSON out and deserializes it, reporting anything
//! unusable as a plain error string for the caller to log before falling back.

use serde::de::DeserializeOwned;

/// Parse a JSON object out of a generated reply.
///
/// A fenced block wins when present; otherwise the span from the first `{`
/// to the last `}` is used.
pub fn parse_generated<T: DeserializeOwned>(text: &str) -> Result<T, String> {
    if text.trim().is_empty() {
        return Err("generated output was empty".to_string());
    }
    let json = json_candidate(text).ok_or("generated output contains no JSON object")?;
    serde_json::from_str(json).map_err(|e| format!("generated output is not valid JSON: {}", e))
}

fn json_candidate(text: &str) -> Option<&str> {
    let text = text.trim();

    if let Some((_, opened)) = text.split_once("```") {
        // drop the info string (`json`) on the opening line
        let body = opened.split_once('\n').map_or(opened, |(_, body)| body);
        if let Some((inner, _)) = body.split_once("```") {
            return Some(inner.trim());
        }
    }

    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (start < end).then(|| &text[start..=end])
}
