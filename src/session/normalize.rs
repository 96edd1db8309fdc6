//! Reply text extraction from inference responses.
//!
//! Response shapes vary by model. Precedence:
//! 1. a non-empty string `response` field;
//! 2. the concatenated `content` (else `text`) of each `output` item;
//! 3. the compact JSON dump of the whole response.
//!
//! The result is never an error: worst case the caller gets the raw dump.

use serde_json::Value;

/// Extract reply text from an inference response.
#[must_use]
pub fn extract_reply_text(response: &Value) -> String {
    if let Some(text) = response
        .get("response")
        .and_then(Value::as_str)
        .filter(|text| !text.is_empty())
    {
        return text.to_string();
    }

    if let Some(items) = response.get("output").and_then(Value::as_array) {
        let joined: String = items.iter().map(output_item_text).collect();
        if !joined.is_empty() {
            return joined;
        }
    }

    response.to_string()
}

fn output_item_text(item: &Value) -> String {
    let content = match item.get("content") {
        Some(Value::String(text)) => text.clone(),
        Some(Value::Array(parts)) => parts
            .iter()
            .filter_map(|part| part.get("text").and_then(Value::as_str))
            .collect(),
        _ => String::new(),
    };
    if !content.is_empty() {
        return content;
    }

    item.get("text")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}
