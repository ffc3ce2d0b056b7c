//! Chat service facade.
//!
//! [`ChatService`] is the operation surface a transport (WebSocket gateway,
//! HTTP API, tests) calls into. It resolves rooms through the registry, checks
//! request-shape limits, and wraps every call with timing, error metrics and a
//! tracing span. All room state lives behind the room actors.

use crate::config::{Config, LimitsConfig};
use crate::error::{ChatError, ChatResult, ErrorKind};
use crate::state::ledger::validate_text;
use crate::state::{
    ChangeNotifier, EventKind, Member, MemberList, Message, MessageKind, Page, ReactionAction,
    Role, RoomHandle, RoomRegistry, RoomStats, Subscription,
};
use crate::telemetry::{OperationTimer, spans};
use futures_util::future::try_join_all;
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use tracing::{Instrument, debug, error};

/// Per-room line in [`GlobalStats`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyndicateSummary {
    pub id: String,
    #[serde(flatten)]
    pub stats: RoomStats,
}

/// Totals across every room in the registry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalStats {
    pub total_syndicates: usize,
    pub total_messages: usize,
    pub total_members: usize,
    /// Sorted by room id.
    pub per_syndicate: Vec<SyndicateSummary>,
}

/// Result of [`ChatService::stats`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Stats {
    Room(RoomStats),
    Global(GlobalStats),
}

/// The syndicate chat service.
pub struct ChatService {
    registry: RoomRegistry,
    limits: LimitsConfig,
}

impl ChatService {
    pub fn new(limits: LimitsConfig) -> Self {
        let notifier = Arc::new(ChangeNotifier::new(limits.subscriber_buffer));
        Self {
            registry: RoomRegistry::new(notifier, limits.room_limits()),
            limits,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.limits.clone())
    }

    pub fn registry(&self) -> &RoomRegistry {
        &self.registry
    }

    pub fn limits(&self) -> &LimitsConfig {
        &self.limits
    }

    fn room(&self, room: &str) -> RoomHandle {
        self.registry.get_or_create(room)
    }

    /// Resolve the room holding `message_id`. A room that does not exist holds
    /// no messages, so it is reported as a missing message and not created.
    fn room_with_message(&self, room: &str, message_id: &str) -> ChatResult<RoomHandle> {
        self.registry
            .get(room)
            .ok_or_else(|| ChatError::MessageNotFound(message_id.to_string()))
    }

    async fn run<T>(
        &self,
        operation: &'static str,
        room: &str,
        fut: impl Future<Output = ChatResult<T>>,
    ) -> ChatResult<T> {
        let _timer = OperationTimer::new(operation);
        let result = fut.instrument(spans::room_operation(operation, room)).await;
        if let Err(e) = &result {
            crate::metrics::record_operation_error(operation, e.error_code());
            match e.kind() {
                ErrorKind::Internal => {
                    error!(operation, room = %room, error = %e, "room operation failed")
                }
                _ => debug!(operation, room = %room, error = %e, "room operation rejected"),
            }
        }
        result
    }

    // ========================================================================
    // Messages
    // ========================================================================

    /// Post a message. `kind` defaults to [`MessageKind::Message`].
    ///
    /// The text is checked before the room is resolved, and a reply into a
    /// room that does not exist yet fails without creating it.
    pub async fn post_message(
        &self,
        room: &str,
        sender: &str,
        text: &str,
        kind: Option<MessageKind>,
        reply_to: Option<&str>,
    ) -> ChatResult<Message> {
        self.run("post_message", room, async {
            validate_text(text, self.limits.max_message_len)?;
            let handle = match reply_to {
                Some(parent) => self.room_with_message(room, parent)?,
                None => self.room(room),
            };
            handle
                .post(sender, text, kind.unwrap_or_default(), reply_to)
                .await
        })
        .await
    }

    /// One page of history, newest first. `limit` defaults to the configured
    /// page size and must be within `1..=max_page_size`.
    pub async fn get_messages(
        &self,
        room: &str,
        limit: Option<usize>,
        cursor: Option<&str>,
    ) -> ChatResult<Page> {
        self.run("get_messages", room, async {
            let limit = limit.unwrap_or(self.limits.default_page_size);
            if limit == 0 || limit > self.limits.max_page_size {
                return Err(ChatError::InvalidPageSize {
                    requested: limit,
                    max: self.limits.max_page_size,
                });
            }
            self.room(room).page(limit, cursor).await
        })
        .await
    }

    pub async fn react_to_message(
        &self,
        room: &str,
        message_id: &str,
        symbol: &str,
        reactor: &str,
        action: ReactionAction,
    ) -> ChatResult<Message> {
        self.run("react_to_message", room, async {
            self.room_with_message(room, message_id)?
                .react(message_id, symbol, reactor, action)
                .await
        })
        .await
    }

    pub async fn toggle_pin(
        &self,
        room: &str,
        message_id: &str,
        pinned: bool,
    ) -> ChatResult<Message> {
        self.run("toggle_pin", room, async {
            self.room_with_message(room, message_id)?
                .set_pinned(message_id, pinned)
                .await
        })
        .await
    }

    /// Pinned messages, newest first. An unknown room has none and is not
    /// created.
    pub async fn get_pinned_messages(&self, room: &str) -> ChatResult<Vec<Message>> {
        self.run("get_pinned_messages", room, async {
            match self.registry.get(room) {
                Some(handle) => handle.pinned().await,
                None => Ok(Vec::new()),
            }
        })
        .await
    }

    // ========================================================================
    // Members
    // ========================================================================

    pub async fn get_members(&self, room: &str, online_only: bool) -> ChatResult<MemberList> {
        self.run("get_members", room, async {
            self.room(room).members(online_only).await
        })
        .await
    }

    pub async fn set_member_presence(
        &self,
        room: &str,
        identity: &str,
        online: bool,
    ) -> ChatResult<Member> {
        self.run("set_member_presence", room, async {
            self.room(room).set_presence(identity, online).await
        })
        .await
    }

    pub async fn set_member_role(
        &self,
        room: &str,
        identity: &str,
        role: Role,
    ) -> ChatResult<Member> {
        self.run("set_member_role", room, async {
            self.room(room).set_role(identity, role).await
        })
        .await
    }

    /// Credit `tickets` to a member's contribution counter.
    pub async fn record_contribution(
        &self,
        room: &str,
        identity: &str,
        tickets: u64,
    ) -> ChatResult<Member> {
        self.run("record_contribution", room, async {
            self.room(room).add_contribution(identity, tickets).await
        })
        .await
    }

    // ========================================================================
    // Stats
    // ========================================================================

    /// Room stats when `room` is given, registry-wide stats otherwise.
    pub async fn stats(&self, room: Option<&str>) -> ChatResult<Stats> {
        match room {
            Some(room) => self.room_stats(room).await.map(Stats::Room),
            None => self.global_stats().await.map(Stats::Global),
        }
    }

    /// Counters for one room. An unknown room reads as empty and is not created.
    pub async fn room_stats(&self, room: &str) -> ChatResult<RoomStats> {
        self.run("room_stats", room, async {
            match self.registry.get(room) {
                Some(handle) => handle.stats().await,
                None => Ok(RoomStats::default()),
            }
        })
        .await
    }

    pub async fn global_stats(&self) -> ChatResult<GlobalStats> {
        let _timer = OperationTimer::new("global_stats");
        let handles = self.registry.handles();

        let collected = try_join_all(handles.iter().map(|h| async move {
            h.stats()
                .await
                .map(|stats| SyndicateSummary {
                    id: h.id().to_string(),
                    stats,
                })
        }))
        .instrument(spans::global_operation("global_stats"))
        .await;

        let mut per_syndicate = match collected {
            Ok(v) => v,
            Err(e) => {
                crate::metrics::record_operation_error("global_stats", e.error_code());
                error!(error = %e, "global stats failed");
                return Err(e);
            }
        };
        per_syndicate.sort_by(|a, b| a.id.cmp(&b.id));

        Ok(GlobalStats {
            total_syndicates: per_syndicate.len(),
            total_messages: per_syndicate.iter().map(|s| s.stats.message_count).sum(),
            total_members: per_syndicate.iter().map(|s| s.stats.member_count).sum(),
            per_syndicate,
        })
    }

    // ========================================================================
    // Live events and lifecycle
    // ========================================================================

    /// Live feed of `kinds` events in `room` (every kind if empty). Drop the
    /// subscription to cancel it.
    pub fn subscribe(&self, room: &str, kinds: &[EventKind]) -> Subscription {
        self.registry.notifier().subscribe(room, kinds)
    }

    pub fn shutdown(&self) {
        self.registry.shutdown();
    }
}
