//! Conversation list upkeep.

use crate::types::Message;

/// Insert `message`, replacing any message with the same id in place.
///
/// Lets a message act as a slot: stream snapshots, or a tool message that is
/// later finalized, overwrite their earlier versions without reordering.
pub fn merge_message(messages: &mut Vec<Message>, message: Message) {
    match messages.iter_mut().find(|existing| existing.id() == message.id()) {
        Some(existing) => *existing = message,
        None => messages.push(message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Role;

    #[test]
    fn appends_new_and_replaces_known_ids() {
        let mut messages = vec![Message::user("q")];
        let mut slot = Message::with_id("slot", Role::Tool).with_text("pending");
        merge_message(&mut messages, slot.clone());
        merge_message(&mut messages, Message::assistant("other"));

        slot.contents.clear();
        slot = slot.with_text("done");
        merge_message(&mut messages, slot);

        assert_eq!(messages.len(), 3);
        assert_eq!(messages[1].id(), "slot");
        assert_eq!(messages[1].text(), "done");
    }
}
