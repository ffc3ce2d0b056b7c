//! Room-scoped change notification.
//!
//! Each room that has ever been subscribed to gets one `tokio::sync::broadcast`
//! channel. Publishing never waits: the channel is a fixed-size ring, and a
//! subscriber that falls behind loses its oldest undelivered events (it sees
//! `Lagged`, which is counted and skipped). Other subscribers and the
//! publishing room are unaffected. A room's channel is removed once its last
//! subscriber is dropped.

use super::dashmap_ext::DashMapExt;
use super::member::{Member, MemberCounts};
use super::message::Message;
use dashmap::DashMap;
use futures_util::Stream;
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tracing::debug;

/// Event categories a subscriber can filter on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum EventKind {
    Message,
    MessagesUpdated,
    Reaction,
    MemberStatus,
    MembersUpdated,
    Pin,
}

impl EventKind {
    pub const ALL: [EventKind; 6] = [
        EventKind::Message,
        EventKind::MessagesUpdated,
        EventKind::Reaction,
        EventKind::MemberStatus,
        EventKind::MembersUpdated,
        EventKind::Pin,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Message => "message",
            Self::MessagesUpdated => "messagesUpdated",
            Self::Reaction => "reaction",
            Self::MemberStatus => "memberStatus",
            Self::MembersUpdated => "membersUpdated",
            Self::Pin => "pin",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| format!("unknown event kind: {s}"))
    }
}

/// A change published by a room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum RoomEvent {
    /// A new message was posted.
    Message(Message),
    /// The retained message count changed.
    MessagesUpdated { total: usize },
    /// A message's reactions were touched.
    Reaction(Message),
    /// One member's presence changed.
    MemberStatus(Member),
    /// Membership roster changed.
    MembersUpdated(MemberCounts),
    /// A message's pinned flag was set.
    Pin(Message),
}

impl RoomEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            Self::Message(_) => EventKind::Message,
            Self::MessagesUpdated { .. } => EventKind::MessagesUpdated,
            Self::Reaction(_) => EventKind::Reaction,
            Self::MemberStatus(_) => EventKind::MemberStatus,
            Self::MembersUpdated(_) => EventKind::MembersUpdated,
            Self::Pin(_) => EventKind::Pin,
        }
    }
}

type Channels = DashMap<String, broadcast::Sender<RoomEvent>>;

/// Process-wide publish/subscribe bus keyed by room id.
#[derive(Debug)]
pub struct ChangeNotifier {
    channels: Arc<Channels>,
    /// Events buffered per room before the slowest subscriber starts losing
    /// its oldest ones.
    capacity: usize,
}

impl ChangeNotifier {
    pub fn new(capacity: usize) -> Self {
        Self {
            channels: Arc::new(DashMap::new()),
            capacity: capacity.max(1),
        }
    }

    /// Fire-and-forget publish. Never blocks and never fails.
    pub fn publish(&self, room: &str, event: RoomEvent) {
        crate::metrics::record_event_published(event.kind().as_str());

        let Some(tx) = self.channels.get_cloned(room) else {
            return;
        };
        if tx.send(event).is_err() {
            // Every subscriber went away; drop the idle channel.
            self.channels
                .remove_if(room, |_, tx| tx.receiver_count() == 0);
        }
    }

    /// Subscribe to `kinds` in `room`. An empty slice means every kind.
    pub fn subscribe(&self, room: &str, kinds: &[EventKind]) -> Subscription {
        // Subscribe while the shard guard is held so a concurrent prune in
        // `publish` cannot remove the channel underneath us.
        let rx = self
            .channels
            .entry(room.to_string())
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .subscribe();

        let kinds = if kinds.is_empty() {
            EventKind::ALL.into_iter().collect()
        } else {
            kinds.iter().copied().collect()
        };

        debug!(room = %room, "subscriber attached");
        Subscription {
            room: room.to_string(),
            kinds,
            rx: Some(rx),
            channels: Arc::clone(&self.channels),
        }
    }

    /// Live subscriber count for a room.
    pub fn subscriber_count(&self, room: &str) -> usize {
        self.channels
            .get(room)
            .map_or(0, |tx| tx.receiver_count())
    }

    /// Close every channel. Subscribers drain what is buffered, then end.
    pub fn close_all(&self) {
        self.channels.clear();
    }
}

/// A live, cancellable feed of one room's events. Dropping it unsubscribes.
#[derive(Debug)]
pub struct Subscription {
    room: String,
    kinds: HashSet<EventKind>,
    /// Always `Some` until `drop`, which releases it before pruning.
    rx: Option<broadcast::Receiver<RoomEvent>>,
    channels: Arc<Channels>,
}

impl Subscription {
    pub fn room(&self) -> &str {
        &self.room
    }

    /// Wait for the next matching event. Returns `None` once the room's
    /// channel is closed.
    pub async fn recv(&mut self) -> Option<RoomEvent> {
        let rx = self.rx.as_mut()?;
        loop {
            match rx.recv().await {
                Ok(event) if self.kinds.contains(&event.kind()) => return Some(event),
                Ok(_) => continue,
                Err(RecvError::Lagged(skipped)) => {
                    debug!(room = %self.room, skipped, "subscriber lagged, dropped oldest events");
                    crate::metrics::record_events_dropped(skipped);
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Non-waiting variant of [`recv`](Self::recv): `None` if nothing matching
    /// is buffered right now.
    pub fn try_recv(&mut self) -> Option<RoomEvent> {
        use broadcast::error::TryRecvError;
        let rx = self.rx.as_mut()?;
        loop {
            match rx.try_recv() {
                Ok(event) if self.kinds.contains(&event.kind()) => return Some(event),
                Ok(_) => continue,
                Err(TryRecvError::Lagged(skipped)) => {
                    crate::metrics::record_events_dropped(skipped);
                }
                Err(TryRecvError::Empty | TryRecvError::Closed) => return None,
            }
        }
    }

    /// Turn the subscription into a `Stream` for transports that want one.
    pub fn into_stream(self) -> impl Stream<Item = RoomEvent> + Send {
        futures_util::stream::unfold(self, |mut sub| async move {
            sub.recv().await.map(|event| (event, sub))
        })
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        drop(self.rx.take());
        // Same shard lock as `subscribe`, so a subscriber attaching right now
        // either keeps the channel alive or gets a fresh one.
        if self
            .channels
            .remove_if(&self.room, |_, tx| tx.receiver_count() == 0)
            .is_some()
        {
            debug!(room = %self.room, "last subscriber left, channel removed");
        }
    }
}
