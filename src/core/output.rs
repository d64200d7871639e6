//! Compact output rendering helpers for CLI surfaces.

use serde_json::Value;

/// Collapse newlines/extra whitespace and bound length for terminal display.
pub fn compact_line(input: &str, max_chars: usize) -> String {
    let collapsed = input.split_whitespace().collect::<Vec<_>>().join(" ");
    let mut chars = collapsed.chars();
    let preview: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        format!("{}...", preview)
    } else {
        preview
    }
}

/// Strings print bare; anything else prints as compact JSON.
pub fn render_value(value: &Value, max_chars: usize) -> String {
    match value {
        Value::String(s) => compact_line(s, max_chars),
        other => compact_line(&other.to_string(), max_chars),
    }
}
