//! Room registry.
//!
//! Maps syndicate ids to running room actors. Rooms are created lazily on first
//! reference and live until [`RoomRegistry::shutdown`].

use super::dashmap_ext::DashMapExt;
use super::id::MessageIdGenerator;
use super::notifier::ChangeNotifier;
use super::room::{RoomActor, RoomContext, RoomHandle, RoomLimits};
use dashmap::DashMap;
use std::sync::Arc;
use tracing::info;

/// Owns every room in the process.
pub struct RoomRegistry {
    rooms: DashMap<String, RoomHandle>,
    ctx: RoomContext,
}

impl RoomRegistry {
    pub fn new(notifier: Arc<ChangeNotifier>, limits: RoomLimits) -> Self {
        Self {
            rooms: DashMap::new(),
            ctx: RoomContext {
                notifier,
                ids: Arc::new(MessageIdGenerator::new()),
                limits,
            },
        }
    }

    pub fn notifier(&self) -> &Arc<ChangeNotifier> {
        &self.ctx.notifier
    }

    /// Get an existing room or spawn an empty one.
    ///
    /// The lookup and insert happen under the same shard lock, so concurrent
    /// first references to one id observe a single actor. Must be called from
    /// within a Tokio runtime.
    pub fn get_or_create(&self, id: &str) -> RoomHandle {
        if let Some(handle) = self.rooms.get_cloned(id) {
            return handle;
        }

        self.rooms
            .entry(id.to_string())
            .or_insert_with(|| {
                info!(room = %id, "room created");
                crate::metrics::record_room_created();
                RoomActor::spawn(id.to_string(), self.ctx.clone())
            })
            .clone()
    }

    /// Look up a room without creating it.
    pub fn get(&self, id: &str) -> Option<RoomHandle> {
        self.rooms.get_cloned(id)
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }

    /// Snapshot of every room handle, safe to await on.
    pub fn handles(&self) -> Vec<RoomHandle> {
        self.rooms.values_cloned()
    }

    /// Drop every room and close every event channel.
    ///
    /// Room actors exit once outstanding handle clones are gone; subscribers
    /// see their streams end.
    pub fn shutdown(&self) {
        let count = self.rooms.len();
        self.rooms.clear();
        self.ctx.notifier.close_all();
        crate::metrics::reset_active_rooms();
        info!(rooms = count, "room registry shut down");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> RoomRegistry {
        RoomRegistry::new(Arc::new(ChangeNotifier::new(16)), RoomLimits::default())
    }

    #[tokio::test]
    async fn test_get_or_create_is_lazy_and_stable() {
        let reg = registry();
        assert!(reg.get("r1").is_none());

        let a = reg.get_or_create("r1");
        let b = reg.get_or_create("r1");
        assert_eq!(reg.len(), 1);

        a.set_presence("alice", true).await.unwrap();
        assert_eq!(b.stats().await.unwrap().member_count, 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_first_access_creates_one_room() {
        let reg = Arc::new(registry());
        let tasks: Vec<_> = (0..32)
            .map(|i| {
                let reg = reg.clone();
                tokio::spawn(async move {
                    let room = reg.get_or_create("contested");
                    room.set_presence(&format!("user{i}"), true).await.unwrap();
                })
            })
            .collect();
        for t in tasks {
            t.await.unwrap();
        }

        assert_eq!(reg.len(), 1);
        let stats = reg.get_or_create("contested").stats().await.unwrap();
        assert_eq!(stats.member_count, 32);
    }

    #[tokio::test]
    async fn test_shutdown_clears_rooms() {
        let reg = registry();
        reg.get_or_create("a");
        reg.get_or_create("b");
        assert_eq!(reg.handles().len(), 2);

        reg.shutdown();
        assert!(reg.is_empty());
    }
}
