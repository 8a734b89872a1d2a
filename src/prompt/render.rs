//! Strict placeholder substitution for prompt templates.
//!
//! Placeholders are `{name}` where `name` is an identifier. `{{` and `}}`
//! produce literal braces. Any placeholder without a matching variable is
//! an error; nothing is ever left half-filled.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::error::{AiError, RenderError};

use super::template::{PromptTemplate, TemplateStore};

/// Caller-supplied values for a template's placeholders.
pub type Variables = BTreeMap<String, Value>;

/// A task's prompts with every placeholder filled in.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedPrompt {
    pub system: String,
    pub user: String,
    pub template: PromptTemplate,
}

/// Loads a task's template and fills in its placeholders.
#[derive(Debug, Clone)]
pub struct PromptRenderer {
    store: TemplateStore,
}

impl PromptRenderer {
    pub fn new(store: TemplateStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &TemplateStore {
        &self.store
    }

    pub fn render(&self, task: &str, variables: &Variables) -> Result<RenderedPrompt, AiError> {
        let template = self.store.load(task)?;
        let system = substitute(task, &template.system_prompt, variables)?;
        let user = substitute(task, &template.user_prompt, variables)?;

        Ok(RenderedPrompt {
            system,
            user,
            template,
        })
    }
}

/// Replace every `{name}` in `text` with the matching variable.
pub fn substitute(task: &str, text: &str, variables: &Variables) -> Result<String, RenderError> {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.char_indices().peekable();

    while let Some((idx, ch)) = chars.next() {
        match ch {
            '{' => {
                if let Some((_, '{')) = chars.peek() {
                    chars.next();
                    out.push('{');
                    continue;
                }

                let rest = &text[idx + 1..];
                let Some(len) = rest.find('}') else {
                    return Err(malformed(task, idx, "unclosed '{'"));
                };
                let name = &rest[..len];

                if !is_identifier(name) {
                    return Err(malformed(
                        task,
                        idx,
                        &format!("'{{{name}}}' is not a named placeholder"),
                    ));
                }

                let value = variables
                    .get(name)
                    .ok_or_else(|| RenderError::MissingVariable {
                        task: task.to_string(),
                        variable: name.to_string(),
                    })?;
                out.push_str(&display_value(value));

                // Skip the name and the closing brace.
                for _ in 0..name.chars().count() + 1 {
                    chars.next();
                }
            }
            '}' => {
                if let Some((_, '}')) = chars.peek() {
                    chars.next();
                    out.push('}');
                } else {
                    return Err(malformed(task, idx, "single '}' must be written as '}}'"));
                }
            }
            _ => out.push(ch),
        }
    }

    Ok(out)
}

/// Names of all placeholders in `text`, in order of first appearance.
///
/// Escaped braces are skipped; malformed sections are ignored here and
/// reported by [`substitute`].
pub fn placeholders(text: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    let mut chars = text.char_indices().peekable();

    while let Some((idx, ch)) = chars.next() {
        match ch {
            '{' | '}' if chars.peek().map(|(_, c)| *c) == Some(ch) => {
                chars.next();
            }
            '{' => {
                if let Some(len) = text[idx + 1..].find('}') {
                    let name = &text[idx + 1..idx + 1 + len];
                    if is_identifier(name) && !names.iter().any(|n| n == name) {
                        names.push(name.to_string());
                    }
                }
            }
            _ => {}
        }
    }

    names
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Strings are inserted verbatim; other JSON values in compact JSON form.
fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn malformed(task: &str, position: usize, reason: &str) -> RenderError {
    RenderError::MalformedTemplate {
        task: task.to_string(),
        position,
        reason: reason.to_string(),
    }
}
