use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;

use super::providers::base::ProviderError;

lazy_static! {
    static ref FENCE_MARKER: Regex = Regex::new(r"```[A-Za-z0-9_-]*").unwrap();
}


/// Pulls a JSON object out of a model response.
///
/// Fence markers are dropped, then everything from the first `{` to the last
/// `}` is parsed. This is brace-matching, not tokenizing: two separate
/// objects in one response, or a stray `}` in trailing prose, make the span
/// invalid and the call fails.
pub fn extract_json(text: &str) -> Result<Value, ProviderError> {
    let cleaned = FENCE_MARKER.replace_all(text, "");

    let (Some(start), Some(end)) = (cleaned.find('{'), cleaned.rfind('}')) else {
        return Err(ProviderError::MalformedResponse(format!(
            "no JSON object in response: {}",
            crate::safe_truncate_ellipsis(text.trim(), 80)
        )));
    };
    if end < start {
        return Err(ProviderError::MalformedResponse(
            "closing brace precedes opening brace".to_string(),
        ));
    }

    serde_json::from_str::<Value>(&cleaned[start..=end])
        .map_err(|e| ProviderError::MalformedResponse(format!("invalid JSON object: {e}")))
}


pub fn json_prompt(prompt: &str, schema: Option<&Value>) -> String {
    match schema {
        Some(schema) => format!(
            "{prompt}\n\nRespond with a single valid JSON object only, no prose, matching this JSON schema:\n{}",
            serde_json::to_string_pretty(schema).unwrap_or_else(|_| schema.to_string())
        ),
        None => format!("{prompt}\n\nRespond with a single valid JSON object only, no prose."),
    }
}
