//! InMemory Presence Registry 実装
//!
//! ユーザー ID → 接続 ID 集合 のマップを Mutex で保護して保持する。
//! 接続集合が空になったユーザーのエントリは即座に削除し、空集合を残さない。

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{ConnectionId, PresenceRegistry, UserId};

/// インメモリ Presence Registry 実装
#[derive(Default)]
pub struct InMemoryPresenceRegistry {
    /// Key: ユーザー ID, Value: 接続 ID の集合（常に 1 件以上）
    entries: Mutex<HashMap<UserId, HashSet<ConnectionId>>>,
}

impl InMemoryPresenceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// エントリが存在するか（空集合を持つエントリが無いことの確認用）
    pub async fn contains_user(&self, user_id: &UserId) -> bool {
        self.entries.lock().await.contains_key(user_id)
    }
}

#[async_trait]
impl PresenceRegistry for InMemoryPresenceRegistry {
    async fn register(&self, user_id: UserId, connection_id: ConnectionId) {
        let mut entries = self.entries.lock().await;
        entries.entry(user_id).or_default().insert(connection_id);
    }

    async fn unregister(&self, user_id: &UserId, connection_id: &ConnectionId) {
        let mut entries = self.entries.lock().await;
        let Some(connections) = entries.get_mut(user_id) else {
            return;
        };

        connections.remove(connection_id);
        if connections.is_empty() {
            entries.remove(user_id);
            tracing::debug!("User '{}' went offline", user_id);
        }
    }

    async fn connections_for(&self, user_id: &UserId) -> Vec<ConnectionId> {
        let entries = self.entries.lock().await;
        entries
            .get(user_id)
            .map(|connections| connections.iter().copied().collect())
            .unwrap_or_default()
    }

    async fn online_user_count(&self) -> usize {
        self.entries.lock().await.len()
    }
}
