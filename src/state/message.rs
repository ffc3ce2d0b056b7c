//! Chat message and reaction types.

use super::id::MessageId;
use super::member::{Role, shorten_identity};
use serde::Serialize;
use std::collections::{HashMap, HashSet};

/// What produced a message.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    #[default]
    Message,
    System,
    Announcement,
}

/// Whether a reaction call adds or removes the reactor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReactionAction {
    Add,
    Remove,
}

/// Reactions on one message: symbol -> set of reacting identities.
///
/// A symbol key is present only while at least one identity holds it, so
/// `is_empty()` answers "has any reaction".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Reactions(HashMap<String, HashSet<String>>);

impl Reactions {
    /// Add `identity` under `symbol`. Returns `true` if it was not present.
    pub fn add(&mut self, symbol: &str, identity: &str) -> bool {
        if let Some(set) = self.0.get_mut(symbol) {
            return set.insert(identity.to_string());
        }
        self.0
            .insert(symbol.to_string(), HashSet::from([identity.to_string()]));
        true
    }

    /// Remove `identity` from `symbol`, pruning the symbol when it empties.
    /// Returns `true` if the identity was present.
    pub fn remove(&mut self, symbol: &str, identity: &str) -> bool {
        let Some(set) = self.0.get_mut(symbol) else {
            return false;
        };
        let removed = set.remove(identity);
        if set.is_empty() {
            self.0.remove(symbol);
        }
        removed
    }

    pub fn apply(&mut self, action: ReactionAction, symbol: &str, identity: &str) -> bool {
        match action {
            ReactionAction::Add => self.add(symbol, identity),
            ReactionAction::Remove => self.remove(symbol, identity),
        }
    }

    pub fn get(&self, symbol: &str) -> Option<&HashSet<String>> {
        self.0.get(symbol)
    }

    pub fn count(&self, symbol: &str) -> usize {
        self.0.get(symbol).map_or(0, HashSet::len)
    }

    pub fn contains(&self, symbol: &str, identity: &str) -> bool {
        self.0.get(symbol).is_some_and(|set| set.contains(identity))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A message in a room's ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: MessageId,
    pub sender: String,
    pub sender_short: String,
    pub text: String,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
    pub kind: MessageKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<MessageId>,
    #[serde(skip_serializing_if = "Reactions::is_empty")]
    pub reactions: Reactions,
    /// Sender's role at the time of posting.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sender_role: Option<Role>,
    pub pinned: bool,
}

impl Message {
    pub(crate) fn new(
        id: MessageId,
        sender: &str,
        text: String,
        timestamp: i64,
        kind: MessageKind,
        reply_to: Option<MessageId>,
        sender_role: Option<Role>,
    ) -> Self {
        Self {
            id,
            sender: sender.to_string(),
            sender_short: shorten_identity(sender),
            text,
            timestamp,
            kind,
            reply_to,
            reactions: Reactions::default(),
            sender_role,
            pinned: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_is_idempotent() {
        let mut r = Reactions::default();
        assert!(r.add("🔥", "alice"));
        assert!(!r.add("🔥", "alice"));
        assert_eq!(r.count("🔥"), 1);
    }

    #[test]
    fn remove_prunes_empty_symbol() {
        let mut r = Reactions::default();
        r.add("👍", "alice");
        r.add("👍", "bob");
        assert!(r.remove("👍", "alice"));
        assert_eq!(r.count("👍"), 1);
        assert!(r.remove("👍", "bob"));
        assert!(r.get("👍").is_none());
        assert!(r.is_empty());
    }

    #[test]
    fn remove_unknown_is_noop() {
        let mut r = Reactions::default();
        assert!(!r.remove("👍", "alice"));
        r.add("👍", "bob");
        assert!(!r.remove("👍", "alice"));
        assert!(r.contains("👍", "bob"));
    }

    #[test]
    fn message_serializes_camel_case() {
        let mut msg = Message::new(
            "m00000001".into(),
            "0x1234567890abcdef",
            "hi".into(),
            1_700_000_000_000,
            MessageKind::Announcement,
            None,
            Some(Role::Manager),
        );
        msg.reactions.add("🎉", "bob");
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["senderShort"], "0x1234...cdef");
        assert_eq!(json["kind"], "announcement");
        assert_eq!(json["senderRole"], "manager");
        assert_eq!(json["reactions"]["🎉"][0], "bob");
        assert!(json.get("replyTo").is_none());
    }
}
