//! State management module.
//!
//! Contains the room registry, the per-room actors and the change notifier.

mod dashmap_ext;
pub mod id;
pub mod ledger;
pub mod member;
pub mod message;
pub mod notifier;
pub mod registry;
pub mod room;

pub use id::{MessageId, MessageIdGenerator};
pub use ledger::Page;
pub use member::{Member, MemberCounts, Role};
pub use message::{Message, MessageKind, ReactionAction, Reactions};
pub use notifier::{ChangeNotifier, EventKind, RoomEvent, Subscription};
pub use registry::RoomRegistry;
pub use room::{MemberList, RoomHandle, RoomLimits, RoomStats};
