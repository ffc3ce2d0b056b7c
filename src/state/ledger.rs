//! Per-room message ledger.
//!
//! Messages are kept oldest-first in a ring buffer. Every append gets the next
//! sequence number, and trimming only ever pops from the front, so sequence
//! numbers in the buffer are contiguous and `seq - front_seq` is a message's
//! position. That keeps cursor lookup O(1).

use super::id::MessageId;
use super::message::Message;
use crate::error::{ChatError, ChatResult};
use serde::Serialize;
use std::collections::{HashMap, VecDeque};

/// One page of messages, newest first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub messages: Vec<Message>,
    /// Id of the last message in `messages`; `None` when the page is empty.
    pub next_cursor: Option<MessageId>,
    /// Messages currently retained in the room.
    pub total: usize,
}

#[derive(Debug)]
struct Entry {
    seq: u64,
    message: Message,
}

/// Ordered, retention-capped message store for one room.
#[derive(Debug)]
pub struct Ledger {
    entries: VecDeque<Entry>,
    index: HashMap<MessageId, u64>,
    next_seq: u64,
    retention_cap: usize,
    last_timestamp: i64,
}

/// Check message text against the length limit (in code points).
pub fn validate_text(text: &str, max_len: usize) -> ChatResult<()> {
    if text.trim().is_empty() {
        return Err(ChatError::EmptyMessage);
    }
    let len = text.chars().count();
    if len > max_len {
        return Err(ChatError::MessageTooLong { len, max: max_len });
    }
    Ok(())
}

impl Ledger {
    pub fn new(retention_cap: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            index: HashMap::new(),
            next_seq: 0,
            retention_cap: retention_cap.max(1),
            last_timestamp: i64::MIN,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Timestamp for a new message: wall clock, never earlier than the
    /// previous message in this room.
    pub fn stamp(&mut self, now_ms: i64) -> i64 {
        let ts = now_ms.max(self.last_timestamp);
        self.last_timestamp = ts;
        ts
    }

    /// Append at the tail, then trim the head down to the retention cap.
    /// Returns how many old messages were discarded.
    pub fn append(&mut self, message: Message) -> usize {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.last_timestamp = self.last_timestamp.max(message.timestamp);
        self.index.insert(message.id.clone(), seq);
        self.entries.push_back(Entry { seq, message });

        let mut trimmed = 0;
        while self.entries.len() > self.retention_cap {
            if let Some(old) = self.entries.pop_front() {
                self.index.remove(&old.message.id);
                trimmed += 1;
            }
        }
        trimmed
    }

    fn position(&self, id: &str) -> Option<usize> {
        let seq = *self.index.get(id)?;
        let front = self.entries.front()?.seq;
        Some((seq - front) as usize)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Message> {
        let pos = self.position(id)?;
        self.entries.get_mut(pos).map(|e| &mut e.message)
    }

    /// Up to `limit` messages newest-first, resuming after `cursor` when it is
    /// still retained and from the newest message otherwise.
    pub fn page(&self, limit: usize, cursor: Option<&str>) -> Page {
        let end = match cursor.and_then(|c| self.position(c)) {
            Some(pos) => pos,
            None => self.entries.len(),
        };

        let messages: Vec<Message> = self
            .entries
            .range(..end)
            .rev()
            .take(limit)
            .map(|e| e.message.clone())
            .collect();
        let next_cursor = messages.last().map(|m| m.id.clone());

        Page {
            messages,
            next_cursor,
            total: self.entries.len(),
        }
    }

    /// Every pinned message, newest first.
    pub fn pinned(&self) -> Vec<Message> {
        self.entries
            .iter()
            .rev()
            .filter(|e| e.message.pinned)
            .map(|e| e.message.clone())
            .collect()
    }

    pub fn pinned_count(&self) -> usize {
        self.entries.iter().filter(|e| e.message.pinned).count()
    }
}
