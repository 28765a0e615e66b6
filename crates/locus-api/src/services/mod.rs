//! Business logic shared by handlers.

pub mod chat_service;
