//! Pulling a JSON object out of free-form model output.
//!
//! Analysis prompts ask for JSON, but models wrap it in markdown fences or
//! add a sentence before and after. Callers go through
//! [`crate::CallResult::parse_json`] rather than using this directly.

/// Best-effort extraction of a JSON object from `response`.
///
/// Tries a ` ```json ` fence, then a bare fence whose body starts with `{`,
/// then the first `{` that begins a valid object. Falls back to the
/// trimmed input.
pub fn extract_json(response: &str) -> String {
    let trimmed = response.trim();

    if let Some(start) = trimmed.find("```json")
        && let Some(end) = trimmed[start + 7..].find("```")
    {
        return trimmed[start + 7..start + 7 + end].trim().to_string();
    }

    if let Some(start) = trimmed.find("```")
        && let Some(end) = trimmed[start + 3..].find("```")
    {
        let inner = trimmed[start + 3..start + 3 + end].trim();
        if inner.starts_with('{') {
            return inner.to_string();
        }
    }

    find_object(trimmed).unwrap_or_else(|| trimmed.to_string())
}

/// First `{` in `text` that opens a complete, valid JSON object.
fn find_object(text: &str) -> Option<String> {
    text.match_indices('{').find_map(|(start, _)| {
        let candidate = balanced_prefix(&text[start..])?;
        serde_json::from_str::<serde_json::Value>(candidate)
            .is_ok()
            .then(|| candidate.to_string())
    })
}

/// The prefix of `text` up to the brace closing its opening `{`.
///
/// Braces inside JSON strings (escapes included) are not counted.
fn balanced_prefix(text: &str) -> Option<&str> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escape_next = false;

    for (idx, ch) in text.char_indices() {
        if escape_next {
            escape_next = false;
            continue;
        }

        match ch {
            '\\' if in_string => escape_next = true,
            '"' => in_string = !in_string,
            '{' if !in_string => depth += 1,
            '}' if !in_string => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(&text[..=idx]);
                }
            }
            _ => {}
        }
    }

    None
}
