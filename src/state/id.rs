//! Message id generation.

use std::sync::atomic::{AtomicU64, Ordering};

/// Unique identifier for a chat message.
pub type MessageId = String;

/// Generates process-unique message ids.
///
/// Format: `m` + 8 chars base36 counter, e.g. `m0000000a`. The counter is
/// shared by every room, so an id is never handed out twice even after the
/// message it named has been trimmed from its ledger.
#[derive(Debug, Default)]
pub struct MessageIdGenerator {
    counter: AtomicU64,
}

impl MessageIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Generate the next unique id.
    pub fn next(&self) -> MessageId {
        let n = self.counter.fetch_add(1, Ordering::Relaxed);
        format!("m{}", base36_encode(n))
    }
}

/// Encode a number as base36, zero-padded to 8 characters.
fn base36_encode(mut n: u64) -> String {
    const CHARS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    let mut digits = Vec::with_capacity(13);

    loop {
        digits.push(CHARS[(n % 36) as usize]);
        n /= 36;
        if n == 0 {
            break;
        }
    }
    while digits.len() < 8 {
        digits.push(b'0');
    }
    digits.reverse();

    String::from_utf8_lossy(&digits).into_owned()
}
