//! Tests for folding stream deltas into messages.

use pretty_assertions::assert_eq;

use palaver::aggregate;
use palaver::types::*;

#[test]
fn text_fragments_concatenate_and_empty_ones_are_ignored() {
    let fragments = ["The ", "", "quick ", "brown", "", " fox"];
    let mut message = Message::new(Role::Assistant);
    for fragment in fragments {
        message.apply(MessageDelta::text(fragment));
    }
    assert_eq!(message.text(), "The quick brown fox");
    assert_eq!(message.contents.len(), 1);
}

#[test]
fn interleaved_tool_call_fragments_merge_per_index() {
    let mut message = Message::new(Role::Assistant);
    let deltas = vec![
        MessageDelta::tool_call(ToolCallDelta::start(0, "call_a", "search").with_fragment("{\"q\":")),
        MessageDelta::tool_call(ToolCallDelta::start(1, "call_b", "fetch")),
        MessageDelta::tool_call(ToolCallDelta::fragment(1, "{\"url\":\"x\"}")),
        MessageDelta::tool_call(ToolCallDelta::fragment(0, "\"rust\"")),
        MessageDelta::tool_call(ToolCallDelta::fragment(0, "}")),
    ];
    for delta in deltas {
        aggregate::apply(&mut message, delta);
    }

    assert_eq!(message.tool_calls.len(), 2);
    assert_eq!(message.tool_calls[0].id, "call_a");
    assert_eq!(message.tool_calls[0].input(), "{\"q\":\"rust\"}");
    assert_eq!(message.tool_calls[1].name(), "fetch");
    assert_eq!(message.tool_calls[1].input(), "{\"url\":\"x\"}");
}

#[test]
fn custom_tool_call_accumulates_input() {
    let mut message = Message::new(Role::Assistant);
    message.apply(MessageDelta::tool_call(
        ToolCallDelta::start(0, "call_1", "apply_patch")
            .with_kind(ToolCallType::Custom)
            .with_fragment("*** Begin"),
    ));
    message.apply(MessageDelta::tool_call(ToolCallDelta::fragment(0, " Patch")));

    let call = &message.tool_calls[0];
    assert_eq!(call.kind(), ToolCallType::Custom);
    assert_eq!(call.input(), "*** Begin Patch");
}

#[test]
fn late_finish_reason_and_metadata_are_applied() {
    let mut message = Message::new(Role::Assistant);
    message.apply(MessageDelta::text("hi"));
    assert!(!message.is_finalized());

    let mut last = MessageDelta::finish(FinishReason::Length);
    last.metadata.set_reference_id("resp_123");
    message.apply(last);

    assert!(message.is_finalized());
    assert_eq!(message.finish_reason, Some(FinishReason::Length));
    assert_eq!(message.metadata.reference_id(), Some("resp_123"));
    assert_eq!(message.text(), "hi");
}

#[test]
fn merge_text_is_pure_append() {
    assert_eq!(aggregate::merge_text(None, "a"), "a");
    assert_eq!(aggregate::merge_text(Some("ab"), "c"), "abc");
    assert_eq!(aggregate::merge_text(Some("ab"), ""), "ab");
}
