//! Room limits configuration.

use crate::state::RoomLimits;
use serde::Deserialize;

/// Room limits configuration.
///
/// These bound per-room memory (retention), per-request work (page sizes) and
/// how far a slow subscriber may fall behind before it loses events.
#[derive(Debug, Clone, Deserialize)]
pub struct LimitsConfig {
    /// Messages retained per room; older ones are discarded (default: 1000).
    #[serde(default = "default_retention_cap")]
    pub retention_cap: usize,
    /// Maximum message length in characters (default: 500).
    #[serde(default = "default_max_message_len")]
    pub max_message_len: usize,
    /// Page size used when the caller does not pass one (default: 50).
    #[serde(default = "default_page_size")]
    pub default_page_size: usize,
    /// Largest page a caller may request (default: 100).
    #[serde(default = "default_max_page_size")]
    pub max_page_size: usize,
    /// Events buffered per room for subscribers (default: 256).
    #[serde(default = "default_subscriber_buffer")]
    pub subscriber_buffer: usize,
    /// Room actor mailbox capacity (default: 100).
    #[serde(default = "default_room_mailbox_capacity")]
    pub room_mailbox_capacity: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            retention_cap: default_retention_cap(),
            max_message_len: default_max_message_len(),
            default_page_size: default_page_size(),
            max_page_size: default_max_page_size(),
            subscriber_buffer: default_subscriber_buffer(),
            room_mailbox_capacity: default_room_mailbox_capacity(),
        }
    }
}

impl LimitsConfig {
    /// The subset each room actor enforces.
    pub fn room_limits(&self) -> RoomLimits {
        RoomLimits {
            retention_cap: self.retention_cap,
            max_message_len: self.max_message_len,
            mailbox_capacity: self.room_mailbox_capacity,
        }
    }
}

fn default_retention_cap() -> usize {
    1000
}

fn default_max_message_len() -> usize {
    500
}

fn default_page_size() -> usize {
    50
}

fn default_max_page_size() -> usize {
    100
}

fn default_subscriber_buffer() -> usize {
    256
}

fn default_room_mailbox_capacity() -> usize {
    100
}
