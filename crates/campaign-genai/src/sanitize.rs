//! Defensive extraction of a JSON object from free-form model output.

/// Strips a surrounding Markdown code fence, then returns the slice from the
/// first `{` to the last `}`.
///
/// Returns `None` when no brace pair exists. The slice is not validated as
/// JSON; the caller parses it.
#[must_use]
pub fn extract_json_object(raw: &str) -> Option<&str> {
    let text = strip_code_fence(raw.trim());
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    // Optional info string, e.g. ```json
    let rest = rest
        .strip_prefix("json")
        .or_else(|| rest.strip_prefix("JSON"))
        .unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}
