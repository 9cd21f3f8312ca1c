//! Domain layer: value objects, entities, errors and the trait seams the
//! use cases depend on.

pub mod credential;
pub mod entity;
pub mod error;
pub mod message_pusher;
pub mod presence;
pub mod repository;
pub mod value_object;

pub use credential::{CredentialVerifier, Identity};
pub use entity::{ChatMessage, NewMessage};
pub use error::{CredentialError, MessagePushError, RepositoryError, ValueObjectError};
pub use message_pusher::{MessagePusher, PusherChannel};
pub use presence::PresenceRegistry;
pub use repository::ChatRepository;
pub use value_object::{
    ConnectionId, ConversationId, MessageId, MessageIdFactory, MessageStatus, MessageType,
    Timestamp, UserId,
};

#[cfg(test)]
pub use credential::MockCredentialVerifier;
#[cfg(test)]
pub use message_pusher::MockMessagePusher;
#[cfg(test)]
pub use presence::MockPresenceRegistry;
#[cfg(test)]
pub use repository::MockChatRepository;
