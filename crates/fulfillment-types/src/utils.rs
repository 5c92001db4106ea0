//! Helpers shared by the backend crates and log statements.

use serde_json::Value;

/// Extracts the error marker of a backend reply body.
///
/// Backends flag refused operations with `_ERROR_MESSAGE_` (a string) or
/// `_ERROR_MESSAGE_LIST_` (an array of strings or `{ "message": .. }`
/// objects), usually alongside a successful HTTP status.
pub fn error_marker(body: &Value) -> Option<String> {
	if let Some(message) = body.get("_ERROR_MESSAGE_").and_then(Value::as_str) {
		return Some(message.to_string());
	}

	let list = body.get("_ERROR_MESSAGE_LIST_")?.as_array()?;
	let messages: Vec<&str> = list
		.iter()
		.filter_map(|entry| {
			entry
				.as_str()
				.or_else(|| entry.get("message").and_then(Value::as_str))
		})
		.collect();

	if list.is_empty() {
		None
	} else if messages.is_empty() {
		Some("Unknown backend error".to_string())
	} else {
		Some(messages.join("; "))
	}
}

/// Truncates an identifier for display in logs.
///
/// Shows the first 8 characters followed by ".." for longer identifiers.
pub fn truncate_id(id: &str) -> String {
	match id.char_indices().nth(8) {
		Some((cut, _)) => format!("{}..", &id[..cut]),
		None => id.to_string(),
	}
}
