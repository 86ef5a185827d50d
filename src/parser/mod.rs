//! Extraction of pseudo-markup tags (`<name key="value">content</name>`)
//! from free-form model output.

use std::collections::{BTreeMap, HashSet};
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

static OPEN_TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<([A-Za-z_][A-Za-z0-9_.-]*)((?:\s+[A-Za-z_][A-Za-z0-9_.:-]*\s*=\s*"[^"]*")*)\s*>"#)
        .expect("open tag regex must compile")
});

static ATTRIBUTE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"([A-Za-z_][A-Za-z0-9_.:-]*)\s*=\s*"([^"]*)""#).expect("attribute regex must compile")
});

/// One extracted tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
    /// Raw text between the opening and closing tag, untrimmed.
    pub content: String,
    pub params: BTreeMap<String, String>,
}

impl Tag {
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }
}

/// Residual text plus the tags pulled out of it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedContent {
    /// Input with each extracted tag replaced by `<name />`.
    pub text: String,
    pub tags: Vec<Tag>,
}

impl ParsedContent {
    pub fn tag(&self, name: &str) -> Option<&Tag> {
        self.tags.iter().find(|tag| tag.name == name)
    }
}

#[derive(Debug, Clone, Default)]
pub struct TagParser {
    allowed: Option<HashSet<String>>,
}

impl TagParser {
    /// Extract every tag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Extract only the named tags; others stay in the text untouched.
    pub fn with_allowed<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            allowed: Some(names.into_iter().map(Into::into).collect()),
        }
    }

    fn allows(&self, name: &str) -> bool {
        self.allowed.as_ref().map_or(true, |allowed| allowed.contains(name))
    }

    /// A tag's content runs to the first matching `</name>`, or to the end of
    /// the input when there is none. Tags nested inside an extracted tag are
    /// kept verbatim in its content.
    pub fn parse(&self, input: &str) -> ParsedContent {
        let mut text = String::with_capacity(input.len());
        let mut tags = Vec::new();
        let mut copied = 0;
        let mut search = 0;

        while let Some(caps) = OPEN_TAG_RE.captures_at(input, search) {
            let Some(open) = caps.get(0) else { break };
            let name = &caps[1];
            if !self.allows(name) {
                search = open.end();
                continue;
            }

            let closing = format!("</{name}>");
            let body = &input[open.end()..];
            let (content, end) = match body.find(&closing) {
                Some(offset) => (&body[..offset], open.end() + offset + closing.len()),
                None => (body, input.len()),
            };

            text.push_str(&input[copied..open.start()]);
            text.push('<');
            text.push_str(name);
            text.push_str(" />");
            tags.push(Tag {
                name: name.to_string(),
                content: content.to_string(),
                params: parse_params(caps.get(2).map_or("", |m| m.as_str())),
            });
            copied = end;
            search = end;
        }

        text.push_str(&input[copied..]);
        ParsedContent { text, tags }
    }
}

fn parse_params(raw: &str) -> BTreeMap<String, String> {
    ATTRIBUTE_RE
        .captures_iter(raw)
        .map(|caps| (caps[1].to_string(), caps[2].to_string()))
        .collect()
}
