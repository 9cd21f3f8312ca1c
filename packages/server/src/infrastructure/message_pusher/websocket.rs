//! WebSocket を使った MessagePusher 実装
//!
//! ## 責務
//!
//! - 接続 ID ごとの `UnboundedSender` を管理
//! - 永続化済みメッセージを `message_received` フレームにして各接続へ送信
//!
//! ## 設計ノート
//!
//! WebSocket の生成は UI 層（`src/ui/handler/websocket.rs`）で行われます。
//! この実装は生成された `UnboundedSender` を受け取り、メッセージ送信に使用します。
//! 接続ごとの送信タスクが実際のソケット書き込みを担当します。

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::{
    domain::{ChatMessage, ConnectionId, MessagePushError, MessagePusher, PusherChannel},
    infrastructure::dto::websocket::{MessageDto, MessageReceivedEvent},
};

/// WebSocket を使った MessagePusher 実装
#[derive(Default)]
pub struct WebSocketMessagePusher {
    /// 接続中の WebSocket sender
    ///
    /// Key: 接続 ID
    /// Value: PusherChannel
    connections: Mutex<HashMap<ConnectionId, PusherChannel>>,
}

impl WebSocketMessagePusher {
    /// 新しい WebSocketMessagePusher を作成
    pub fn new() -> Self {
        Self::default()
    }

    /// 登録中の接続数
    pub async fn connection_count(&self) -> usize {
        self.connections.lock().await.len()
    }
}

#[async_trait]
impl MessagePusher for WebSocketMessagePusher {
    async fn register_connection(&self, connection_id: ConnectionId, sender: PusherChannel) {
        let mut connections = self.connections.lock().await;
        connections.insert(connection_id, sender);
        tracing::debug!("Connection '{}' registered to MessagePusher", connection_id);
    }

    async fn unregister_connection(&self, connection_id: &ConnectionId) {
        let mut connections = self.connections.lock().await;
        if connections.remove(connection_id).is_some() {
            tracing::debug!(
                "Connection '{}' unregistered from MessagePusher",
                connection_id
            );
        }
    }

    async fn broadcast(
        &self,
        targets: Vec<ConnectionId>,
        message: &ChatMessage,
    ) -> Result<usize, MessagePushError> {
        let frame = serde_json::to_string(&MessageReceivedEvent::new(MessageDto::from(message)))
            .map_err(|e| MessagePushError::Encode(e.to_string()))?;

        let connections = self.connections.lock().await;
        let mut delivered = 0;

        for target in targets {
            let Some(sender) = connections.get(&target) else {
                tracing::warn!("Connection '{}' not found during broadcast, skipping", target);
                continue;
            };

            // ブロードキャストでは一部の送信失敗を許容
            match sender.send(frame.clone()) {
                Ok(()) => {
                    delivered += 1;
                    tracing::debug!("Pushed message '{}' to connection '{}'", message.id, target);
                }
                Err(e) => {
                    tracing::warn!("Failed to push message to connection '{}': {}", target, e)
                }
            }
        }

        Ok(delivered)
    }
}
