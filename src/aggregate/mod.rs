//! Folding of streamed fragments into an in-progress [`Message`].
//!
//! Every function here is total: an empty or unexpected fragment leaves the
//! affected field untouched and never fails, so partial progress elsewhere in
//! the message survives.
//!
//! Text follows the append rule: the first non-empty fragment creates a text
//! content item, later fragments are appended to it, and empty fragments are
//! no-ops. Backends that resend cumulative text must be normalized by their
//! adapter before fragments reach this module.
//!
//! A message is sealed by its first finish reason. Later fragments still
//! merge their metadata, but their text, tool calls and finish reason are
//! dropped.

use crate::types::{
    Content, CustomCall, FunctionCall, Message, MessageDelta, ToolCall, ToolCallDelta,
    ToolCallPayload, ToolCallType,
};

/// Merge `fragment` onto `existing`.
///
/// Returns the new value: `fragment` if there was nothing yet, `existing`
/// unchanged if the fragment is empty, otherwise the concatenation.
pub fn merge_text(existing: Option<&str>, fragment: &str) -> String {
    match existing {
        None => fragment.to_string(),
        Some(current) if fragment.is_empty() => current.to_string(),
        Some(current) => {
            let mut merged = String::with_capacity(current.len() + fragment.len());
            merged.push_str(current);
            merged.push_str(fragment);
            merged
        }
    }
}

/// Fold one fragment into `message` and bump its `modified` timestamp.
pub fn apply(message: &mut Message, delta: MessageDelta) {
    if !message.is_finalized() {
        if let Some(text) = delta.text.as_deref() {
            apply_text(message, text);
        }
        for tool_call in delta.tool_calls {
            apply_tool_call(message, tool_call);
        }
        message.finish_reason = delta.finish_reason;
    }
    if !delta.metadata.is_empty() {
        message.metadata.extend(&delta.metadata);
    }
    message.touch();
}

/// Append a text fragment to the message's trailing text content.
///
/// Only the last content item is ever mutated; if it is not text, a new text
/// item is pushed.
pub fn apply_text(message: &mut Message, fragment: &str) {
    if fragment.is_empty() {
        return;
    }
    match message.contents.last_mut() {
        Some(Content::Text(current)) => current.push_str(fragment),
        Some(Content::Image { .. }) | Some(Content::Audio { .. }) | None => {
            message.contents.push(Content::Text(merge_text(None, fragment)));
        }
    }
}

/// Merge a tool-call fragment into the call sharing its index, or start a
/// new call at the end of the list.
pub fn apply_tool_call(message: &mut Message, delta: ToolCallDelta) {
    let existing = message
        .tool_calls
        .iter_mut()
        .find(|call| call.index == Some(delta.index));

    match existing {
        Some(call) => merge_into_call(call, delta),
        None => message.tool_calls.push(start_call(delta)),
    }
}

fn start_call(delta: ToolCallDelta) -> ToolCall {
    let name = delta.name.unwrap_or_default();
    let seed = merge_text(None, delta.fragment.as_deref().unwrap_or_default());
    let payload = match delta.kind.unwrap_or_default() {
        ToolCallType::Function => ToolCallPayload::Function(FunctionCall {
            name,
            arguments: seed,
        }),
        ToolCallType::Custom => ToolCallPayload::Custom(CustomCall { name, input: seed }),
    };
    ToolCall {
        index: Some(delta.index),
        id: delta.id.unwrap_or_default(),
        payload,
    }
}

fn merge_into_call(call: &mut ToolCall, delta: ToolCallDelta) {
    if call.id.is_empty() {
        if let Some(id) = delta.id.filter(|id| !id.is_empty()) {
            call.id = id;
        }
    }

    // A kind that disagrees with the existing payload is ignored; the
    // fragment still lands on the call that owns this index.
    let (name, body) = match &mut call.payload {
        ToolCallPayload::Function(function) => (&mut function.name, &mut function.arguments),
        ToolCallPayload::Custom(custom) => (&mut custom.name, &mut custom.input),
    };

    if name.is_empty() {
        if let Some(incoming) = delta.name {
            *name = incoming;
        }
    }

    if let Some(fragment) = delta.fragment.as_deref() {
        if !fragment.is_empty() {
            *body = merge_text(Some(body.as_str()), fragment);
        }
    }
}

impl Message {
    /// Fold a streamed fragment into this message. See [`apply`].
    pub fn apply(&mut self, delta: MessageDelta) {
        apply(self, delta);
    }
}
