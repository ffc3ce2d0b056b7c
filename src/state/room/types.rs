use crate::error::ChatResult;
use crate::state::id::MessageId;
use crate::state::ledger::Page;
use crate::state::member::{Member, Role};
use crate::state::message::{Message, MessageKind, ReactionAction};
use serde::Serialize;
use tokio::sync::oneshot;

/// Commands processed by a Room Actor, one at a time.
#[derive(Debug)]
pub enum RoomCommand {
    /// Append a message to the ledger.
    Post {
        sender: String,
        text: String,
        kind: MessageKind,
        reply_to: Option<MessageId>,
        reply_tx: oneshot::Sender<ChatResult<Message>>,
    },
    /// Read one page of history.
    GetPage {
        limit: usize,
        cursor: Option<MessageId>,
        reply_tx: oneshot::Sender<Page>,
    },
    GetPinned {
        reply_tx: oneshot::Sender<Vec<Message>>,
    },
    SetPinned {
        message_id: MessageId,
        pinned: bool,
        reply_tx: oneshot::Sender<ChatResult<Message>>,
    },
    React {
        message_id: MessageId,
        symbol: String,
        identity: String,
        action: ReactionAction,
        reply_tx: oneshot::Sender<ChatResult<Message>>,
    },
    SetPresence {
        identity: String,
        online: bool,
        reply_tx: oneshot::Sender<Member>,
    },
    SetRole {
        identity: String,
        role: Role,
        reply_tx: oneshot::Sender<Member>,
    },
    /// Credit tickets bought on behalf of the syndicate.
    AddContribution {
        identity: String,
        tickets: u64,
        reply_tx: oneshot::Sender<Member>,
    },
    GetMembers {
        online_only: bool,
        reply_tx: oneshot::Sender<MemberList>,
    },
    GetStats {
        reply_tx: oneshot::Sender<RoomStats>,
    },
}

/// Sorted member listing plus counts taken in the same snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberList {
    pub members: Vec<Member>,
    pub online_count: usize,
    pub total_count: usize,
}

/// Aggregate counters for one room.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomStats {
    pub message_count: usize,
    pub member_count: usize,
    pub online_count: usize,
    pub pinned_count: usize,
}

/// Limits a room actor enforces.
#[derive(Debug, Clone, Copy)]
pub struct RoomLimits {
    pub retention_cap: usize,
    pub max_message_len: usize,
    pub mailbox_capacity: usize,
}

impl Default for RoomLimits {
    fn default() -> Self {
        Self {
            retention_cap: 1000,
            max_message_len: 500,
            mailbox_capacity: 100,
        }
    }
}
