//! MessagePusher trait 定義
//!
//! 接続ごとの送信チャンネルを管理し、接続単位でメッセージを届ける。

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::{entity::ChatMessage, error::MessagePushError, value_object::ConnectionId};

/// 接続の送信タスクへ JSON 文字列を渡すチャンネル
pub type PusherChannel = mpsc::UnboundedSender<String>;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessagePusher: Send + Sync {
    /// 接続の送信チャンネルを登録
    async fn register_connection(&self, connection_id: ConnectionId, sender: PusherChannel);

    /// 接続の送信チャンネルを削除（未登録でもエラーにしない）
    async fn unregister_connection(&self, connection_id: &ConnectionId);

    /// 永続化済みメッセージを複数の接続に配信する
    ///
    /// 一部の接続への送信失敗は許容する。
    ///
    /// # Returns
    ///
    /// * `Ok(usize)` - 実際に配信できた接続数
    /// * `Err(MessagePushError)` - メッセージのエンコードに失敗
    async fn broadcast(
        &self,
        targets: Vec<ConnectionId>,
        message: &ChatMessage,
    ) -> Result<usize, MessagePushError>;
}
