//! Real-time messaging and presence core for the Bazaar marketplace.
//!
//! Authenticated WebSocket connections are tracked per user, and chat
//! messages are persisted then fanned out to every online member of a
//! conversation.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;
