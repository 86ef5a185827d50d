//! Tests for tag extraction and prompt templates.

use std::collections::HashMap;

use pretty_assertions::assert_eq;
use serde_json::json;

use palaver::parser::TagParser;
use palaver::template::{self, PromptTemplate};

#[test]
fn extracts_tag_content() {
    let parsed = TagParser::new().parse("<tag>content</tag>");
    assert_eq!(parsed.tags.len(), 1);
    assert_eq!(parsed.tags[0].name, "tag");
    assert_eq!(parsed.tags[0].content, "content");
}

#[test]
fn inner_tags_are_not_extracted_separately() {
    let parsed = TagParser::new().parse("<outer><inner>Nested content</inner></outer>");
    assert_eq!(parsed.tags.len(), 1);
    assert_eq!(parsed.tags[0].name, "outer");
    assert_eq!(parsed.tags[0].content, "<inner>Nested content</inner>");
}

#[test]
fn allow_list_limits_extraction() {
    let parsed = TagParser::with_allowed(vec!["keep".to_string()])
        .parse("<keep>Keep this</keep> <ignore>Ignore this</ignore>");
    assert_eq!(parsed.tags.len(), 1);
    assert_eq!(parsed.tags[0].name, "keep");
    assert!(parsed.text.contains("<ignore>Ignore this</ignore>"));
}

#[test]
fn repeated_tags_each_extracted() {
    let input = "Plan:\n<step n=\"1\">fetch</step>\n<step n=\"2\">parse</step>\nDone.";
    let parsed = TagParser::new().parse(input);
    assert_eq!(parsed.text, "Plan:\n<step />\n<step />\nDone.");
    let steps: Vec<(&str, &str)> = parsed
        .tags
        .iter()
        .map(|t| (t.param("n").unwrap(), t.content.as_str()))
        .collect();
    assert_eq!(steps, vec![("1", "fetch"), ("2", "parse")]);
}

#[test]
fn template_renders_values_and_blanks_missing() {
    let values: HashMap<String, serde_json::Value> = HashMap::from([
        ("user".to_string(), json!("Ada")),
        ("turns".to_string(), json!(2)),
    ]);
    let template = PromptTemplate::new("Hello {{user}} ({{turns}} turns, {{ tier }})");
    assert_eq!(template.render(&values), "Hello Ada (2 turns, )");
    assert_eq!(template::render("{{user}}!", &values), "Ada!");
    assert_eq!(template.placeholders(), vec!["user", "turns", "tier"]);
}
