//! Data Transfer Objects (DTOs) for the messaging server.
//!
//! - `websocket`: WebSocket frame DTOs
//! - `conversion`: conversions between DTOs and domain / use case types

pub mod conversion;
pub mod websocket;
