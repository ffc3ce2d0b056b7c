//! Integration test common infrastructure.
//!
//! Builds in-process chat services and provides small helpers for posting
//! batches and walking pagination.

#![allow(dead_code)]

use syndicate_chat::ChatService;
use syndicate_chat::config::LimitsConfig;
use syndicate_chat::state::Message;

/// A service with default limits.
pub fn service() -> ChatService {
    ChatService::new(LimitsConfig::default())
}

/// A service with a custom retention cap.
pub fn service_with_cap(retention_cap: usize) -> ChatService {
    ChatService::new(LimitsConfig {
        retention_cap,
        ..LimitsConfig::default()
    })
}

/// Post `count` messages from `sender`, texts `"msg 0"`, `"msg 1"`, ...
pub async fn post_many(svc: &ChatService, room: &str, sender: &str, count: usize) -> Vec<Message> {
    let mut out = Vec::with_capacity(count);
    for i in 0..count {
        let msg = svc
            .post_message(room, sender, &format!("msg {i}"), None, None)
            .await
            .expect("post failed");
        out.push(msg);
    }
    out
}

/// Follow `next_cursor` until it runs out, returning every message seen.
pub async fn drain_pages(svc: &ChatService, room: &str, limit: usize) -> Vec<Message> {
    let mut all = Vec::new();
    let mut cursor: Option<String> = None;
    loop {
        let page = svc
            .get_messages(room, Some(limit), cursor.as_deref())
            .await
            .expect("page failed");
        all.extend(page.messages);
        match page.next_cursor {
            Some(next) => cursor = Some(next),
            None => break,
        }
    }
    all
}
