//! Client-facing chat types
//!
//! These are the shapes the chat UI sends and receives. The upstream wire
//! format lives in [`crate::payload`] and [`crate::protocol`].

pub mod event;
pub mod message;
pub mod request;

pub use event::NormalizedEvent;
pub use message::{ChatMessage, Role};
pub use request::CompletionRequest;
