//! Ledger mutations: post, pin, react.
//!
//! Every check runs before anything is touched, so a rejected command leaves
//! the ledger, the member table and the event feed exactly as they were.

use crate::error::{ChatError, ChatResult};
use crate::state::id::MessageId;
use crate::state::ledger::validate_text;
use crate::state::message::{Message, MessageKind, ReactionAction};
use crate::state::notifier::RoomEvent;
use crate::state::room::{RoomActor, now_ms};
use tracing::debug;

impl RoomActor {
    pub(crate) fn handle_post(
        &mut self,
        sender: &str,
        text: String,
        kind: MessageKind,
        reply_to: Option<MessageId>,
    ) -> ChatResult<Message> {
        validate_text(&text, self.max_message_len)?;
        if let Some(parent) = reply_to.as_deref()
            && !self.ledger.contains(parent)
        {
            return Err(ChatError::MessageNotFound(parent.to_string()));
        }

        let now = now_ms();
        let (member, joined) = self.members.upsert_on_post(sender, now);
        let timestamp = self.ledger.stamp(now);
        let message = Message::new(
            self.ids.next(),
            sender,
            text,
            timestamp,
            kind,
            reply_to,
            Some(member.role),
        );

        let trimmed = self.ledger.append(message.clone());
        crate::metrics::record_message_posted();
        if trimmed > 0 {
            debug!(room = %self.id, trimmed, "retention cap reached, dropped oldest messages");
            crate::metrics::record_messages_trimmed(trimmed);
        }
        debug!(room = %self.id, message_id = %message.id, sender = %sender, "message posted");

        self.publish(RoomEvent::Message(message.clone()));
        self.publish(RoomEvent::MessagesUpdated {
            total: self.ledger.len(),
        });
        if joined {
            self.publish(RoomEvent::MembersUpdated(self.members.counts()));
        }

        Ok(message)
    }

    /// Set the pinned flag. Setting the current value again still publishes.
    pub(crate) fn handle_set_pinned(
        &mut self,
        message_id: &str,
        pinned: bool,
    ) -> ChatResult<Message> {
        let message = self
            .ledger
            .get_mut(message_id)
            .ok_or_else(|| ChatError::MessageNotFound(message_id.to_string()))?;
        message.pinned = pinned;
        let message = message.clone();

        debug!(room = %self.id, message_id = %message_id, pinned, "pin updated");
        self.publish(RoomEvent::Pin(message.clone()));
        Ok(message)
    }

    /// Add or remove one reactor. Publishes even when nothing changed.
    pub(crate) fn handle_react(
        &mut self,
        message_id: &str,
        symbol: &str,
        identity: &str,
        action: ReactionAction,
    ) -> ChatResult<Message> {
        let message = self
            .ledger
            .get_mut(message_id)
            .ok_or_else(|| ChatError::MessageNotFound(message_id.to_string()))?;
        let changed = message.reactions.apply(action, symbol, identity);
        let message = message.clone();

        debug!(room = %self.id, message_id = %message_id, symbol = %symbol, changed, "reaction");
        self.publish(RoomEvent::Reaction(message.clone()));
        Ok(message)
    }
}

#[cfg(test)]
mod tests {
    use crate::error::ChatError;
    use crate::state::id::MessageIdGenerator;
    use crate::state::member::Role;
    use crate::state::message::{MessageKind, ReactionAction};
    use crate::state::notifier::{ChangeNotifier, EventKind, RoomEvent};
    use crate::state::room::{RoomActor, RoomContext, RoomLimits};
    use std::sync::Arc;

    fn create_test_room(retention_cap: usize) -> (RoomActor, Arc<ChangeNotifier>) {
        let notifier = Arc::new(ChangeNotifier::new(64));
        let ctx = RoomContext {
            notifier: notifier.clone(),
            ids: Arc::new(MessageIdGenerator::new()),
            limits: RoomLimits {
                retention_cap,
                ..RoomLimits::default()
            },
        };
        (RoomActor::new("r1".into(), ctx), notifier)
    }

    #[test]
    fn test_post_creates_member_and_snapshots_role() {
        let (mut room, _) = create_test_room(10);
        room.members.set_role("boss", Role::Manager, 0);

        let msg = room
            .handle_post("boss", "welcome".into(), MessageKind::Announcement, None)
            .unwrap();
        assert_eq!(msg.sender_role, Some(Role::Manager));
        assert_eq!(msg.kind, MessageKind::Announcement);

        let msg = room
            .handle_post("alice", "hi".into(), MessageKind::Message, None)
            .unwrap();
        assert_eq!(msg.sender_role, Some(Role::Member));
        assert!(room.members.get("alice").unwrap().online);
    }

    #[test]
    fn test_rejected_post_has_no_side_effects() {
        let (mut room, notifier) = create_test_room(10);
        let mut sub = notifier.subscribe("r1", &[]);

        let err = room
            .handle_post("alice", "x".repeat(501), MessageKind::Message, None)
            .unwrap_err();
        assert!(matches!(err, ChatError::MessageTooLong { len: 501, .. }));

        let err = room
            .handle_post("alice", "reply".into(), MessageKind::Message, Some("nope".into()))
            .unwrap_err();
        assert_eq!(err, ChatError::MessageNotFound("nope".into()));

        assert!(room.ledger.is_empty());
        assert!(room.members.is_empty());
        assert!(sub.try_recv().is_none());
    }

    #[test]
    fn test_post_events_in_order() {
        let (mut room, notifier) = create_test_room(10);
        let mut sub = notifier.subscribe("r1", &[]);

        let msg = room
            .handle_post("alice", "hi".into(), MessageKind::Message, None)
            .unwrap();

        assert_eq!(sub.try_recv(), Some(RoomEvent::Message(msg)));
        assert_eq!(sub.try_recv(), Some(RoomEvent::MessagesUpdated { total: 1 }));
        assert_eq!(
            sub.try_recv().map(|e| e.kind()),
            Some(EventKind::MembersUpdated)
        );

        // Second post by a known member: no roster event.
        room.handle_post("alice", "again".into(), MessageKind::Message, None)
            .unwrap();
        assert_eq!(sub.try_recv().map(|e| e.kind()), Some(EventKind::Message));
        assert_eq!(
            sub.try_recv().map(|e| e.kind()),
            Some(EventKind::MessagesUpdated)
        );
        assert!(sub.try_recv().is_none());
    }

    #[test]
    fn test_reply_to_existing_message() {
        let (mut room, _) = create_test_room(10);
        let parent = room
            .handle_post("alice", "q?".into(), MessageKind::Message, None)
            .unwrap();
        let reply = room
            .handle_post("bob", "a!".into(), MessageKind::Message, Some(parent.id.clone()))
            .unwrap();
        assert_eq!(reply.reply_to, Some(parent.id));
    }

    #[test]
    fn test_react_toggle_and_prune() {
        let (mut room, _) = create_test_room(10);
        let msg = room
            .handle_post("alice", "hi".into(), MessageKind::Message, None)
            .unwrap();

        room.handle_react(&msg.id, "🔥", "bob", ReactionAction::Add).unwrap();
        let after = room
            .handle_react(&msg.id, "🔥", "bob", ReactionAction::Add)
            .unwrap();
        assert_eq!(after.reactions.count("🔥"), 1);

        let after = room
            .handle_react(&msg.id, "🔥", "bob", ReactionAction::Remove)
            .unwrap();
        assert!(after.reactions.get("🔥").is_none());
        assert!(after.reactions.is_empty());
    }

    #[test]
    fn test_react_publishes_even_without_change() {
        let (mut room, notifier) = create_test_room(10);
        let msg = room
            .handle_post("alice", "hi".into(), MessageKind::Message, None)
            .unwrap();
        let mut sub = notifier.subscribe("r1", &[EventKind::Reaction]);

        room.handle_react(&msg.id, "👍", "bob", ReactionAction::Remove)
            .unwrap();
        assert_eq!(sub.try_recv().map(|e| e.kind()), Some(EventKind::Reaction));
    }

    #[test]
    fn test_unknown_message_not_found() {
        let (mut room, _) = create_test_room(10);
        assert_eq!(
            room.handle_react("m404", "👍", "bob", ReactionAction::Add),
            Err(ChatError::MessageNotFound("m404".into()))
        );
        assert_eq!(
            room.handle_set_pinned("m404", true),
            Err(ChatError::MessageNotFound("m404".into()))
        );
    }

    #[test]
    fn test_pin_is_idempotent_but_publishes() {
        let (mut room, notifier) = create_test_room(10);
        let msg = room
            .handle_post("alice", "rules".into(), MessageKind::Message, None)
            .unwrap();
        let mut sub = notifier.subscribe("r1", &[EventKind::Pin]);

        assert!(room.handle_set_pinned(&msg.id, true).unwrap().pinned);
        assert!(room.handle_set_pinned(&msg.id, true).unwrap().pinned);
        assert_eq!(room.ledger.pinned_count(), 1);
        assert!(sub.try_recv().is_some());
        assert!(sub.try_recv().is_some());

        assert!(!room.handle_set_pinned(&msg.id, false).unwrap().pinned);
        assert_eq!(room.ledger.pinned_count(), 0);
    }

    #[test]
    fn test_trimmed_ids_are_not_reused() {
        let (mut room, _) = create_test_room(2);
        let first = room
            .handle_post("alice", "1".into(), MessageKind::Message, None)
            .unwrap();
        for i in 0..4 {
            let msg = room
                .handle_post("alice", format!("n{i}"), MessageKind::Message, None)
                .unwrap();
            assert_ne!(msg.id, first.id);
        }
        assert_eq!(room.ledger.len(), 2);
        assert!(!room.ledger.contains(&first.id));
    }
}
