//! `{{key}}` prompt templates.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde_json::Value;

static PLACEHOLDER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{\s*([A-Za-z0-9_.-]+)\s*\}\}").expect("placeholder regex must compile")
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    source: String,
}

impl PromptTemplate {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Substitute every placeholder. Unknown keys render as empty text.
    pub fn render(&self, values: &HashMap<String, Value>) -> String {
        render(&self.source, values)
    }

    /// Placeholder keys in order of first appearance.
    pub fn placeholders(&self) -> Vec<String> {
        let mut keys: Vec<String> = Vec::new();
        for caps in PLACEHOLDER_RE.captures_iter(&self.source) {
            let key = &caps[1];
            if !keys.iter().any(|existing| existing == key) {
                keys.push(key.to_string());
            }
        }
        keys
    }
}

pub fn render(source: &str, values: &HashMap<String, Value>) -> String {
    PLACEHOLDER_RE
        .replace_all(source, |caps: &Captures<'_>| match values.get(&caps[1]) {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(text)) => text.clone(),
            Some(other) => other.to_string(),
        })
        .into_owned()
}
