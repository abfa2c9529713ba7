//! Rich-text run handling.
//!
//! Title and rich-text payloads arrive as arrays of formatting runs. Only
//! the plain text survives the mapping: decoding concatenates the runs,
//! encoding produces a single unformatted run. Formatting is lost on
//! round-trip.

use serde_json::{json, Value};

/// Concatenate the text of every run into one string.
///
/// Server runs carry a computed `plain_text`; runs encoded locally only
/// have `text.content`, so that is the fallback. Returns `None` if the
/// payload is not an array of runs or a run carries neither key.
pub fn runs_to_plain(payload: &Value) -> Option<String> {
    let runs = payload.as_array()?;
    let mut text = String::new();
    for run in runs {
        let content = run
            .get("plain_text")
            .or_else(|| run.get("text").and_then(|inner| inner.get("content")))
            .and_then(Value::as_str)?;
        text.push_str(content);
    }
    Some(text)
}

/// Wrap a string as a single unformatted run.
pub fn plain_to_runs(text: &str) -> Value {
    json!([
        {
            "text": {
                "content": text,
            },
        },
    ])
}
