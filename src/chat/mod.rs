//! Chat rooms and message history.
//!
//! Rooms are identified by the caller-supplied numeric id and created on
//! first touch. History is a bounded "latest N" read; there is no cursor
//! and no real-time delivery channel.

/// Room and message persistence
pub mod db;

/// HTTP handlers for chat endpoints
pub mod handlers;

pub use db::{latest_messages, save_message, ChatMessage};
