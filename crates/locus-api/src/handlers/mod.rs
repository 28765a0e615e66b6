//! HTTP request handlers.

pub mod chats;
pub mod content;
pub mod documents;
pub mod highlights;
pub mod sync;
pub mod users;
