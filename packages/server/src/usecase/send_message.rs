//! UseCase: メッセージ送信処理（Message Pipeline）
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - SendMessageUseCase::execute() メソッド
//! - 検証 → 採番 → 永続化 → メンバー取得 → ファンアウト の一連の流れ
//!
//! ### なぜこのテストが必要か
//! - 不正なリクエストでは永続化を一切呼ばないことを保証する
//! - オンラインのメンバーの全接続に配信され、オフラインのメンバーは読み飛ばされることを確認
//! - 永続化後の配信失敗が送信者へのエラーにならないことを確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：複数接続を持つメンバーへの配信、添付のみのメッセージ
//! - 異常系：会話 ID なし、本文・添付なし、永続化失敗、永続化タイムアウト
//! - エッジケース：メンバー取得の失敗、同一会話への同時送信

use std::{collections::HashSet, future::Future, sync::Arc, time::Duration};

use bazaar_shared::time::{Clock, SystemClock};
use serde_json::Value;

use crate::domain::{
    ChatMessage, ChatRepository, ConversationId, MessageIdFactory, MessagePusher, MessageType,
    NewMessage, PresenceRegistry, RepositoryError, Timestamp, UserId,
};

use super::error::{DeliveryGap, SendMessageError};

/// メッセージ送信リクエスト
///
/// 送信者はリクエストに含めない（接続の検証済みセッションから取る）。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SendMessageRequest {
    pub conversation_id: Option<String>,
    pub body: Option<String>,
    pub message_type: Option<String>,
    pub attachments: Option<Vec<Value>>,
}

/// メッセージ送信のユースケース
pub struct SendMessageUseCase {
    /// Repository（永続化サービスの抽象化）
    repository: Arc<dyn ChatRepository>,
    /// PresenceRegistry（ユーザー → 接続集合）
    presence: Arc<dyn PresenceRegistry>,
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
    /// 作成時刻の取得元
    clock: Arc<dyn Clock>,
    /// 永続化サービス呼び出しの上限時間
    store_timeout: Duration,
}

impl SendMessageUseCase {
    pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(5);

    /// 新しい SendMessageUseCase を作成
    pub fn new(
        repository: Arc<dyn ChatRepository>,
        presence: Arc<dyn PresenceRegistry>,
        message_pusher: Arc<dyn MessagePusher>,
    ) -> Self {
        Self {
            repository,
            presence,
            message_pusher,
            clock: Arc::new(SystemClock),
            store_timeout: Self::DEFAULT_STORE_TIMEOUT,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_store_timeout(mut self, store_timeout: Duration) -> Self {
        self.store_timeout = store_timeout;
        self
    }

    /// メッセージ送信を実行
    ///
    /// # Arguments
    ///
    /// * `sender_id` - 送信者のユーザー ID（接続のセッションから取得したもの）
    /// * `request` - 送信リクエスト
    ///
    /// # Returns
    ///
    /// * `Ok(ChatMessage)` - 永続化されたメッセージ（サーバー採番の ID と作成時刻を含む）
    /// * `Err(SendMessageError)` - 検証または永続化の失敗
    pub async fn execute(
        &self,
        sender_id: UserId,
        request: SendMessageRequest,
    ) -> Result<ChatMessage, SendMessageError> {
        // 1. 検証（永続化の前に行う）
        let draft = validate(sender_id, request)?;

        // 2. 採番して永続化
        let now = self.clock.now_millis();
        let message = draft.into_sent(MessageIdFactory::generate(now), Timestamp::new(now));
        self.bounded(self.repository.insert_message(&message))
            .await
            .map_err(|e| {
                tracing::error!("Failed to persist message '{}': {}", message.id, e);
                SendMessageError::PersistenceFailure
            })?;

        // 3. ファンアウト（失敗しても送信自体は成功扱い）
        match self.fan_out(&message).await {
            Ok(delivered) => tracing::debug!(
                "Message '{}' delivered to {} connection(s)",
                message.id,
                delivered
            ),
            Err(gap) => tracing::warn!(
                "Message '{}' persisted but not pushed: {}",
                message.id,
                gap
            ),
        }

        Ok(message)
    }

    /// 会話メンバーのオンライン接続すべてにメッセージを配信する
    ///
    /// オフラインのメンバーは読み飛ばす（キューイングはしない）。
    async fn fan_out(&self, message: &ChatMessage) -> Result<usize, DeliveryGap> {
        let members: HashSet<UserId> = self
            .bounded(self.repository.conversation_members(&message.conversation_id))
            .await
            .map_err(DeliveryGap::Membership)?
            .into_iter()
            .collect();

        let mut targets = Vec::new();
        for member in &members {
            targets.extend(self.presence.connections_for(member).await);
        }

        if targets.is_empty() {
            return Ok(0);
        }

        self.message_pusher
            .broadcast(targets, message)
            .await
            .map_err(DeliveryGap::Push)
    }

    async fn bounded<T, F>(&self, call: F) -> Result<T, RepositoryError>
    where
        F: Future<Output = Result<T, RepositoryError>>,
    {
        tokio::time::timeout(self.store_timeout, call)
            .await
            .map_err(|_| RepositoryError::Timeout)?
    }
}

fn validate(sender_id: UserId, request: SendMessageRequest) -> Result<NewMessage, SendMessageError> {
    let conversation_id = request
        .conversation_id
        .ok_or_else(|| SendMessageError::InvalidPayload("conversationId is required".to_string()))
        .and_then(|id| {
            ConversationId::new(id).map_err(|e| SendMessageError::InvalidPayload(e.to_string()))
        })?;

    NewMessage::new(
        conversation_id,
        sender_id,
        request.body,
        request.attachments.unwrap_or_default(),
        MessageType::or_default(request.message_type),
    )
    .map_err(|e| SendMessageError::InvalidPayload(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{
            ConnectionId, MessageStatus, MockChatRepository, MockMessagePusher, PusherChannel,
        },
        infrastructure::{
            message_pusher::WebSocketMessagePusher, presence::InMemoryPresenceRegistry,
            repository::InMemoryChatRepository,
        },
    };
    use async_trait::async_trait;
    use bazaar_shared::time::FixedClock;
    use serde_json::json;
    use tokio::sync::mpsc;

    struct Fixture {
        repository: Arc<InMemoryChatRepository>,
        presence: Arc<InMemoryPresenceRegistry>,
        pusher: Arc<WebSocketMessagePusher>,
        usecase: SendMessageUseCase,
    }

    fn fixture() -> Fixture {
        let repository = Arc::new(InMemoryChatRepository::new());
        let presence = Arc::new(InMemoryPresenceRegistry::new());
        let pusher = Arc::new(WebSocketMessagePusher::new());
        let usecase = SendMessageUseCase::new(repository.clone(), presence.clone(), pusher.clone());
        Fixture {
            repository,
            presence,
            pusher,
            usecase,
        }
    }

    fn user(id: &str) -> UserId {
        UserId::new(id.to_string()).unwrap()
    }

    fn conversation(id: &str) -> ConversationId {
        ConversationId::new(id.to_string()).unwrap()
    }

    fn text_request(conversation_id: &str, body: &str) -> SendMessageRequest {
        SendMessageRequest {
            conversation_id: Some(conversation_id.to_string()),
            body: Some(body.to_string()),
            ..Default::default()
        }
    }

    async fn connect(
        f: &Fixture,
        user_id: &UserId,
    ) -> (ConnectionId, mpsc::UnboundedReceiver<String>) {
        let (tx, rx): (PusherChannel, _) = mpsc::unbounded_channel();
        let connection_id = ConnectionId::generate();
        f.pusher.register_connection(connection_id, tx).await;
        f.presence.register(user_id.clone(), connection_id).await;
        (connection_id, rx)
    }

    fn drain(rx: &mut mpsc::UnboundedReceiver<String>) -> Vec<serde_json::Value> {
        let mut frames = Vec::new();
        while let Ok(frame) = rx.try_recv() {
            frames.push(serde_json::from_str(&frame).unwrap());
        }
        frames
    }

    #[tokio::test]
    async fn test_send_message_persists_and_fans_out_to_online_members() {
        // テスト項目: オンラインのメンバー A（2 接続）に 2 件配信され、オフラインの B には配信されない
        // given (前提条件):
        let f = fixture();
        let (alice, bob, seller) = (user("alice"), user("bob"), user("seller"));
        for member in [&alice, &bob, &seller] {
            f.repository.add_member(conversation("conv_1"), member.clone()).await;
        }
        let (_, mut alice_rx1) = connect(&f, &alice).await;
        let (_, mut alice_rx2) = connect(&f, &alice).await;

        // when (操作): seller（未接続）がメッセージを送信
        let result = f
            .usecase
            .execute(seller.clone(), text_request("conv_1", "Is this still available?"))
            .await;

        // then (期待する結果):
        let message = result.unwrap();
        assert_eq!(message.status, MessageStatus::Sent);
        assert_eq!(message.sender_id, seller);
        assert!(message.id.as_str().starts_with("msg_"));

        let stored = f.repository.messages().await;
        assert_eq!(stored, vec![message.clone()]);

        let frames1 = drain(&mut alice_rx1);
        let frames2 = drain(&mut alice_rx2);
        assert_eq!(frames1.len() + frames2.len(), 2);
        for frame in frames1.iter().chain(frames2.iter()) {
            assert_eq!(frame["event"], "message_received");
            assert_eq!(frame["data"]["id"], message.id.as_str());
            assert_eq!(frame["data"]["status"], "sent");
        }
        assert!(f.presence.connections_for(&bob).await.is_empty());
    }

    #[tokio::test]
    async fn test_send_message_includes_sender_connections() {
        // テスト項目: 送信者自身も会話メンバーであれば、送信者の接続にも配信される
        // given (前提条件):
        let f = fixture();
        let alice = user("alice");
        f.repository.add_member(conversation("conv_1"), alice.clone()).await;
        let (_, mut rx) = connect(&f, &alice).await;

        // when (操作):
        let message = f
            .usecase
            .execute(alice.clone(), text_request("conv_1", "hello"))
            .await
            .unwrap();

        // then (期待する結果):
        let frames = drain(&mut rx);
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0]["data"]["id"], message.id.as_str());
    }

    #[tokio::test]
    async fn test_send_message_uses_clock_and_default_type() {
        // テスト項目: 作成時刻は Clock から取られ、種別未指定なら "text" になる
        // given (前提条件):
        let f = fixture();
        let usecase = SendMessageUseCase::new(f.repository.clone(), f.presence.clone(), f.pusher.clone())
            .with_clock(Arc::new(FixedClock::new(1_700_000_000_000)));

        // when (操作):
        let message = usecase
            .execute(user("alice"), text_request("conv_1", "hi"))
            .await
            .unwrap();

        // then (期待する結果):
        assert_eq!(message.created_at, Timestamp::new(1_700_000_000_000));
        assert_eq!(message.message_type.as_str(), "text");
        assert!(message.id.as_str().starts_with("msg_1700000000000_"));
    }

    #[tokio::test]
    async fn test_send_message_attachments_only() {
        // テスト項目: 本文が無くても添付があれば送信できる
        // given (前提条件):
        let f = fixture();
        let request = SendMessageRequest {
            conversation_id: Some("conv_1".to_string()),
            body: None,
            message_type: Some("image".to_string()),
            attachments: Some(vec![json!({"url": "uploads/p1.png"})]),
        };

        // when (操作):
        let message = f.usecase.execute(user("alice"), request).await.unwrap();

        // then (期待する結果):
        assert_eq!(message.body, None);
        assert_eq!(message.attachments.len(), 1);
        assert_eq!(message.message_type.as_str(), "image");
    }

    #[tokio::test]
    async fn test_send_message_invalid_payload_never_persists() {
        // テスト項目: 会話 ID なし・本文も添付も無いリクエストは永続化を呼ばずに失敗する
        // given (前提条件):
        let mut repository = MockChatRepository::new();
        repository.expect_insert_message().never();
        repository.expect_conversation_members().never();
        let mut pusher = MockMessagePusher::new();
        pusher.expect_broadcast().never();
        let usecase = SendMessageUseCase::new(
            Arc::new(repository),
            Arc::new(InMemoryPresenceRegistry::new()),
            Arc::new(pusher),
        );

        let requests = [
            SendMessageRequest {
                conversation_id: None,
                body: Some("hi".to_string()),
                ..Default::default()
            },
            SendMessageRequest {
                conversation_id: Some("   ".to_string()),
                body: Some("hi".to_string()),
                ..Default::default()
            },
            SendMessageRequest {
                conversation_id: Some("conv_1".to_string()),
                body: Some(String::new()),
                attachments: Some(vec![]),
                ..Default::default()
            },
            SendMessageRequest {
                conversation_id: Some("conv_1".to_string()),
                ..Default::default()
            },
        ];

        for request in requests {
            // when (操作):
            let result = usecase.execute(user("alice"), request).await;

            // then (期待する結果):
            assert!(matches!(result, Err(SendMessageError::InvalidPayload(_))));
        }
    }

    #[tokio::test]
    async fn test_send_message_persistence_failure_is_generic() {
        // テスト項目: 永続化失敗は詳細を含まない PersistenceFailure になり、配信もされない
        // given (前提条件):
        let mut repository = MockChatRepository::new();
        repository
            .expect_insert_message()
            .times(1)
            .returning(|_| Err(RepositoryError::Database("relation \"message\" does not exist".to_string())));
        repository.expect_conversation_members().never();
        let mut pusher = MockMessagePusher::new();
        pusher.expect_broadcast().never();
        let usecase = SendMessageUseCase::new(
            Arc::new(repository),
            Arc::new(InMemoryPresenceRegistry::new()),
            Arc::new(pusher),
        );

        // when (操作):
        let result = usecase.execute(user("alice"), text_request("conv_1", "hi")).await;

        // then (期待する結果):
        assert_eq!(result, Err(SendMessageError::PersistenceFailure));
        assert_eq!(
            SendMessageError::PersistenceFailure.to_string(),
            "failed to send message"
        );
    }

    #[tokio::test]
    async fn test_send_message_membership_failure_still_succeeds() {
        // テスト項目: 永続化後のメンバー取得失敗は送信者へのエラーにならない
        // given (前提条件):
        let mut repository = MockChatRepository::new();
        repository.expect_insert_message().times(1).returning(|_| Ok(()));
        repository
            .expect_conversation_members()
            .times(1)
            .returning(|_| Err(RepositoryError::Database("connection reset".to_string())));
        let mut pusher = MockMessagePusher::new();
        pusher.expect_broadcast().never();
        let usecase = SendMessageUseCase::new(
            Arc::new(repository),
            Arc::new(InMemoryPresenceRegistry::new()),
            Arc::new(pusher),
        );

        // when (操作):
        let result = usecase.execute(user("alice"), text_request("conv_1", "hi")).await;

        // then (期待する結果):
        assert!(result.is_ok());
    }

    struct SlowRepository;

    #[async_trait]
    impl ChatRepository for SlowRepository {
        async fn insert_message(&self, _message: &ChatMessage) -> Result<(), RepositoryError> {
            tokio::time::sleep(Duration::from_millis(500)).await;
            Ok(())
        }

        async fn conversation_members(
            &self,
            _conversation_id: &ConversationId,
        ) -> Result<Vec<UserId>, RepositoryError> {
            Ok(vec![])
        }
    }

    #[tokio::test]
    async fn test_send_message_persistence_timeout() {
        // テスト項目: 永続化が上限時間を超えた場合は PersistenceFailure になる
        // given (前提条件):
        let usecase = SendMessageUseCase::new(
            Arc::new(SlowRepository),
            Arc::new(InMemoryPresenceRegistry::new()),
            Arc::new(WebSocketMessagePusher::new()),
        )
        .with_store_timeout(Duration::from_millis(20));

        // when (操作):
        let result = usecase.execute(user("alice"), text_request("conv_1", "hi")).await;

        // then (期待する結果):
        assert_eq!(result, Err(SendMessageError::PersistenceFailure));
    }

    #[tokio::test]
    async fn test_concurrent_sends_in_same_conversation() {
        // テスト項目: 同一会話への同時送信が両方とも永続化され、全メンバーに届く
        // given (前提条件):
        let f = fixture();
        let (alice, bob, carol) = (user("alice"), user("bob"), user("carol"));
        for member in [&alice, &bob, &carol] {
            f.repository.add_member(conversation("conv_1"), member.clone()).await;
        }
        let (_, mut carol_rx) = connect(&f, &carol).await;

        // when (操作): alice と bob が同時に送信
        let (a, b) = tokio::join!(
            f.usecase.execute(alice.clone(), text_request("conv_1", "from alice")),
            f.usecase.execute(bob.clone(), text_request("conv_1", "from bob")),
        );

        // then (期待する結果):
        let (a, b) = (a.unwrap(), b.unwrap());
        assert_ne!(a.id, b.id);
        assert_eq!(f.repository.messages().await.len(), 2);

        let received: Vec<String> = drain(&mut carol_rx)
            .iter()
            .map(|frame| frame["data"]["id"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(received.len(), 2);
        assert!(received.contains(&a.id.as_str().to_string()));
        assert!(received.contains(&b.id.as_str().to_string()));
    }
}
