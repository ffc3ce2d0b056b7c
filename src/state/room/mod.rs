//! Actor model for room state.
//!
//! Each syndicate room runs a `RoomActor` in its own Tokio task. The actor owns
//! the room's [`Ledger`] and [`MembershipTable`] outright and applies
//! [`RoomCommand`]s strictly in arrival order, so every read-modify-write
//! (find-or-create member, append with retention trim, reaction toggle) is
//! atomic with respect to the room without any lock. Rooms never share an
//! actor, so a busy room cannot stall another.
//!
//! Callers talk to the actor through a cloneable [`RoomHandle`]; each call is
//! an mpsc send plus a oneshot reply, and reads reply with owned snapshots.

use crate::error::{ChatError, ChatResult};
use crate::state::id::{MessageId, MessageIdGenerator};
use crate::state::ledger::{Ledger, Page};
use crate::state::member::{Member, MembershipTable, Role};
use crate::state::message::{Message, MessageKind, ReactionAction};
use crate::state::notifier::{ChangeNotifier, RoomEvent};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tracing::debug;

mod handlers;
mod types;

pub use types::*;

/// Shared collaborators handed to every room actor.
#[derive(Debug, Clone)]
pub struct RoomContext {
    pub notifier: Arc<ChangeNotifier>,
    pub ids: Arc<MessageIdGenerator>,
    pub limits: RoomLimits,
}

/// The Room Actor.
///
/// Owns the state of a single room and processes commands sequentially.
pub struct RoomActor {
    pub id: String,
    pub ledger: Ledger,
    pub members: MembershipTable,
    notifier: Arc<ChangeNotifier>,
    ids: Arc<MessageIdGenerator>,
    max_message_len: usize,
}

impl RoomActor {
    fn new(id: String, ctx: RoomContext) -> Self {
        Self {
            id,
            ledger: Ledger::new(ctx.limits.retention_cap),
            members: MembershipTable::new(),
            notifier: ctx.notifier,
            ids: ctx.ids,
            max_message_len: ctx.limits.max_message_len,
        }
    }

    /// Create a new Room Actor and spawn it.
    pub fn spawn(id: String, ctx: RoomContext) -> RoomHandle {
        let (tx, rx) = mpsc::channel(ctx.limits.mailbox_capacity.max(1));
        let handle = RoomHandle {
            id: id.clone(),
            tx,
        };
        let actor = Self::new(id, ctx);

        tokio::spawn(async move {
            actor.run(rx).await;
        });

        handle
    }

    /// The main actor loop. Ends once every handle has been dropped.
    pub async fn run(mut self, mut rx: mpsc::Receiver<RoomCommand>) {
        while let Some(command) = rx.recv().await {
            self.handle_command(command);
        }
        debug!(room = %self.id, "room actor stopped");
    }

    fn handle_command(&mut self, command: RoomCommand) {
        // A dropped reply receiver means the caller gave up; the mutation
        // itself has already been applied, so the send result is ignored.
        match command {
            RoomCommand::Post {
                sender,
                text,
                kind,
                reply_to,
                reply_tx,
            } => {
                let _ = reply_tx.send(self.handle_post(&sender, text, kind, reply_to));
            }
            RoomCommand::GetPage {
                limit,
                cursor,
                reply_tx,
            } => {
                let _ = reply_tx.send(self.ledger.page(limit, cursor.as_deref()));
            }
            RoomCommand::GetPinned { reply_tx } => {
                let _ = reply_tx.send(self.ledger.pinned());
            }
            RoomCommand::SetPinned {
                message_id,
                pinned,
                reply_tx,
            } => {
                let _ = reply_tx.send(self.handle_set_pinned(&message_id, pinned));
            }
            RoomCommand::React {
                message_id,
                symbol,
                identity,
                action,
                reply_tx,
            } => {
                let _ = reply_tx.send(self.handle_react(&message_id, &symbol, &identity, action));
            }
            RoomCommand::SetPresence {
                identity,
                online,
                reply_tx,
            } => {
                let _ = reply_tx.send(self.handle_set_presence(&identity, online));
            }
            RoomCommand::SetRole {
                identity,
                role,
                reply_tx,
            } => {
                let _ = reply_tx.send(self.handle_set_role(&identity, role));
            }
            RoomCommand::AddContribution {
                identity,
                tickets,
                reply_tx,
            } => {
                let _ = reply_tx.send(self.handle_add_contribution(&identity, tickets));
            }
            RoomCommand::GetMembers {
                online_only,
                reply_tx,
            } => {
                let _ = reply_tx.send(self.member_list(online_only));
            }
            RoomCommand::GetStats { reply_tx } => {
                let _ = reply_tx.send(self.stats());
            }
        }
    }

    fn publish(&self, event: RoomEvent) {
        self.notifier.publish(&self.id, event);
    }

    pub fn stats(&self) -> RoomStats {
        let counts = self.members.counts();
        RoomStats {
            message_count: self.ledger.len(),
            member_count: counts.total,
            online_count: counts.online,
            pinned_count: self.ledger.pinned_count(),
        }
    }
}

fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Cloneable handle to a running room actor.
#[derive(Debug, Clone)]
pub struct RoomHandle {
    id: String,
    tx: mpsc::Sender<RoomCommand>,
}

impl RoomHandle {
    pub fn id(&self) -> &str {
        &self.id
    }

    async fn request<T>(
        &self,
        make: impl FnOnce(oneshot::Sender<T>) -> RoomCommand,
    ) -> ChatResult<T> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(make(reply_tx))
            .await
            .map_err(|_| ChatError::RoomUnavailable(self.id.clone()))?;
        reply_rx
            .await
            .map_err(|_| ChatError::RoomUnavailable(self.id.clone()))
    }

    pub async fn post(
        &self,
        sender: &str,
        text: &str,
        kind: MessageKind,
        reply_to: Option<&str>,
    ) -> ChatResult<Message> {
        self.request(|reply_tx| RoomCommand::Post {
            sender: sender.to_string(),
            text: text.to_string(),
            kind,
            reply_to: reply_to.map(str::to_string),
            reply_tx,
        })
        .await?
    }

    pub async fn page(&self, limit: usize, cursor: Option<&str>) -> ChatResult<Page> {
        self.request(|reply_tx| RoomCommand::GetPage {
            limit,
            cursor: cursor.map(str::to_string),
            reply_tx,
        })
        .await
    }

    pub async fn pinned(&self) -> ChatResult<Vec<Message>> {
        self.request(|reply_tx| RoomCommand::GetPinned { reply_tx })
            .await
    }

    pub async fn set_pinned(&self, message_id: &str, pinned: bool) -> ChatResult<Message> {
        self.request(|reply_tx| RoomCommand::SetPinned {
            message_id: MessageId::from(message_id),
            pinned,
            reply_tx,
        })
        .await?
    }

    pub async fn react(
        &self,
        message_id: &str,
        symbol: &str,
        identity: &str,
        action: ReactionAction,
    ) -> ChatResult<Message> {
        self.request(|reply_tx| RoomCommand::React {
            message_id: MessageId::from(message_id),
            symbol: symbol.to_string(),
            identity: identity.to_string(),
            action,
            reply_tx,
        })
        .await?
    }

    pub async fn set_presence(&self, identity: &str, online: bool) -> ChatResult<Member> {
        self.request(|reply_tx| RoomCommand::SetPresence {
            identity: identity.to_string(),
            online,
            reply_tx,
        })
        .await
    }

    pub async fn set_role(&self, identity: &str, role: Role) -> ChatResult<Member> {
        self.request(|reply_tx| RoomCommand::SetRole {
            identity: identity.to_string(),
            role,
            reply_tx,
        })
        .await
    }

    pub async fn add_contribution(&self, identity: &str, tickets: u64) -> ChatResult<Member> {
        self.request(|reply_tx| RoomCommand::AddContribution {
            identity: identity.to_string(),
            tickets,
            reply_tx,
        })
        .await
    }

    pub async fn members(&self, online_only: bool) -> ChatResult<MemberList> {
        self.request(|reply_tx| RoomCommand::GetMembers {
            online_only,
            reply_tx,
        })
        .await
    }

    pub async fn stats(&self) -> ChatResult<RoomStats> {
        self.request(|reply_tx| RoomCommand::GetStats { reply_tx })
            .await
    }
}
