//! # locus-inference
//!
//! Streaming LLM chat backend abstraction for locus.
//!
//! This crate provides:
//! - Pluggable streaming chat backend trait
//! - OpenAI-compatible implementation
//! - SSE token stream parsing
//! - Mock backend for tests

pub mod mock;
pub mod openai;
pub mod streaming;
pub mod types;

pub use mock::MockChatBackend;
pub use openai::{OpenAIBackend, OpenAIConfig, ACADEMIC_ASSISTANT_PROMPT};
pub use streaming::{parse_sse_stream, ChatBackend, TokenStream};
pub use types::{ChatCompletionChunk, ChatCompletionRequest, ChatMessage};
