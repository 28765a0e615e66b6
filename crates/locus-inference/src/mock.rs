//! Mock chat backend for tests.

use async_trait::async_trait;

use locus_core::{Error, Result};

use crate::streaming::{ChatBackend, TokenStream};
use crate::types::ChatMessage;

/// Chat backend replaying scripted fragments.
#[derive(Debug, Clone, Default)]
pub struct MockChatBackend {
    fragments: Vec<String>,
    fail: bool,
}

impl MockChatBackend {
    /// Backend that streams the given fragments in order.
    pub fn scripted(fragments: &[&str]) -> Self {
        Self {
            fragments: fragments.iter().map(|s| s.to_string()).collect(),
            fail: false,
        }
    }

    /// Backend whose stream yields one error.
    pub fn failing() -> Self {
        Self {
            fragments: Vec::new(),
            fail: true,
        }
    }
}

#[async_trait]
impl ChatBackend for MockChatBackend {
    async fn stream_chat(&self, _messages: &[ChatMessage]) -> Result<TokenStream> {
        if self.fail {
            let stream = futures::stream::iter(vec![Err(Error::Inference(
                "mock backend failure".to_string(),
            ))]);
            return Ok(Box::pin(stream));
        }
        let stream = futures::stream::iter(self.fragments.clone().into_iter().map(Ok));
        Ok(Box::pin(stream))
    }
}
