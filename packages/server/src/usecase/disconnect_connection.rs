//! UseCase: 切断処理（Lifecycle Handler）
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - DisconnectConnectionUseCase::execute() メソッド
//!
//! ### なぜこのテストが必要か
//! - 切断後に空の接続集合が残らないことを保証する
//! - 認証途中で閉じられた（未登録の）接続に対しても安全に呼べることを確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：最後の接続の切断
//! - エッジケース：他の接続が残っている場合、未登録接続の切断、二重呼び出し

use std::sync::Arc;

use crate::domain::{ConnectionId, MessagePusher, PresenceRegistry, UserId};

/// 切断処理のユースケース
pub struct DisconnectConnectionUseCase {
    /// PresenceRegistry（ユーザー → 接続集合）
    presence: Arc<dyn PresenceRegistry>,
    /// MessagePusher（接続 → 送信チャンネル）
    message_pusher: Arc<dyn MessagePusher>,
}

impl DisconnectConnectionUseCase {
    /// 新しい DisconnectConnectionUseCase を作成
    pub fn new(presence: Arc<dyn PresenceRegistry>, message_pusher: Arc<dyn MessagePusher>) -> Self {
        Self {
            presence,
            message_pusher,
        }
    }

    /// 切断処理を実行（冪等）
    ///
    /// # Arguments
    ///
    /// * `user_id` - 接続を所有するユーザー ID
    /// * `connection_id` - 閉じられた接続の ID
    pub async fn execute(&self, user_id: &UserId, connection_id: &ConnectionId) {
        self.presence.unregister(user_id, connection_id).await;
        self.message_pusher
            .unregister_connection(connection_id)
            .await;

        tracing::info!(
            "Connection '{}' of user '{}' removed ({} users online)",
            connection_id,
            user_id,
            self.presence.online_user_count().await
        );
    }
}
