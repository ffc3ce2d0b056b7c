//! syndicate-chat - per-syndicate chat rooms.
//!
//! Message history with retention, cursor pagination, reactions, pins, member
//! presence and contribution rankings, plus a room-scoped live event feed.
//! Each room is an actor; [`ChatService`] is the entry point.

pub mod config;
pub mod error;
pub mod http;
pub mod metrics;
pub mod service;
pub mod state;
pub mod telemetry;

pub use error::{ChatError, ChatResult, ErrorKind};
pub use service::{ChatService, GlobalStats, Stats, SyndicateSummary};
