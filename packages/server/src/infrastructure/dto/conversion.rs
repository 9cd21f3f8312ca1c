//! Conversion logic between DTOs and domain / use case types.

use bazaar_shared::time::timestamp_to_rfc3339;

use crate::domain::ChatMessage;
use crate::infrastructure::dto::websocket as dto;
use crate::usecase::SendMessageRequest;

// ========================================
// DTO → UseCase input
// ========================================

impl From<dto::SendMessagePayload> for SendMessageRequest {
    fn from(payload: dto::SendMessagePayload) -> Self {
        Self {
            conversation_id: payload.conversation_id,
            body: payload.body,
            message_type: payload.message_type,
            attachments: payload.attachments,
        }
    }
}

// ========================================
// Domain Entity → DTO
// ========================================

impl From<&ChatMessage> for dto::MessageDto {
    fn from(model: &ChatMessage) -> Self {
        Self {
            id: model.id.as_str().to_string(),
            conversation_id: model.conversation_id.as_str().to_string(),
            sender_id: model.sender_id.as_str().to_string(),
            body: model.body.clone(),
            attachments: model.attachments.clone(),
            message_type: model.message_type.as_str().to_string(),
            status: model.status.as_str().to_string(),
            created_at: timestamp_to_rfc3339(model.created_at.value()),
        }
    }
}

impl From<ChatMessage> for dto::MessageDto {
    fn from(model: ChatMessage) -> Self {
        Self::from(&model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        ConversationId, MessageId, MessageStatus, MessageType, Timestamp, UserId,
    };
    use serde_json::json;

    #[test]
    fn test_domain_message_to_dto() {
        // テスト項目: ドメインの ChatMessage が送信用 DTO に変換される
        // given (前提条件):
        let message = ChatMessage {
            id: MessageId::from_persisted("msg_1672531200000_abcdefghij".to_string()),
            conversation_id: ConversationId::new("conv_1".to_string()).unwrap(),
            sender_id: UserId::new("u1".to_string()).unwrap(),
            body: Some("hello".to_string()),
            attachments: vec![json!("a.png")],
            message_type: MessageType::default(),
            status: MessageStatus::Sent,
            created_at: Timestamp::new(1672531200000),
        };

        // when (操作):
        let value = serde_json::to_value(dto::MessageDto::from(&message)).unwrap();

        // then (期待する結果):
        assert_eq!(
            value,
            json!({
                "id": "msg_1672531200000_abcdefghij",
                "conversationId": "conv_1",
                "senderId": "u1",
                "body": "hello",
                "attachments": ["a.png"],
                "type": "text",
                "status": "sent",
                "createdAt": "2023-01-01T00:00:00.000Z"
            })
        );
    }

    #[test]
    fn test_payload_to_request() {
        // テスト項目: 受信ペイロードがユースケースの入力に変換される
        // given (前提条件):
        let payload = dto::SendMessagePayload {
            conversation_id: Some("conv_1".to_string()),
            body: None,
            message_type: Some("image".to_string()),
            attachments: Some(vec![json!({"url": "p.png"})]),
        };

        // when (操作):
        let request: SendMessageRequest = payload.into();

        // then (期待する結果):
        assert_eq!(request.conversation_id.as_deref(), Some("conv_1"));
        assert_eq!(request.body, None);
        assert_eq!(request.message_type.as_deref(), Some("image"));
        assert_eq!(request.attachments.map(|a| a.len()), Some(1));
    }
}
