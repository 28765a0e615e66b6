//! SSE token stream parsing for OpenAI-compatible completion endpoints.

use futures::{Stream, StreamExt};
use std::pin::Pin;

use locus_core::{Error, Result};

use crate::types::{ChatCompletionChunk, ChatMessage};

/// Stream of generation tokens.
pub type TokenStream = Pin<Box<dyn Stream<Item = Result<String>> + Send>>;

/// Backend producing streamed chat completions.
#[async_trait::async_trait]
pub trait ChatBackend: Send + Sync {
    /// Run a chat turn over the given history, streaming response tokens.
    async fn stream_chat(&self, messages: &[ChatMessage]) -> Result<TokenStream>;
}

/// Turn a raw SSE byte stream into a [`TokenStream`] of content deltas.
///
/// Each network read may carry several `data:` events; the deltas within one
/// read are concatenated into a single token item.
pub fn parse_sse_stream(
    stream: impl Stream<Item = std::result::Result<bytes::Bytes, reqwest::Error>> + Send + 'static,
) -> TokenStream {
    Box::pin(stream.filter_map(|read| async move {
        match read {
            Ok(bytes) => extract_deltas(&String::from_utf8_lossy(&bytes)),
            Err(e) => Some(Err(Error::Inference(format!("stream read failed: {e}")))),
        }
    }))
}

/// Collect the content deltas from one network read's worth of SSE lines.
///
/// The `[DONE]` marker ends parsing but does not discard deltas read earlier
/// from the same buffer: the final delta and the marker routinely arrive
/// coalesced in a single read.
fn extract_deltas(buffer: &str) -> Option<Result<String>> {
    let mut content = String::new();

    for line in buffer.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with(':') {
            continue;
        }
        let Some(data) = line.strip_prefix("data:") else {
            continue;
        };
        let data = data.trim_start();

        if data == "[DONE]" {
            break;
        }

        match serde_json::from_str::<ChatCompletionChunk>(data) {
            Ok(chunk) => {
                for choice in chunk.choices {
                    if let Some(delta) = choice.delta.content {
                        content.push_str(&delta);
                    }
                }
            }
            Err(e) => {
                return Some(Err(Error::Inference(format!(
                    "malformed completion chunk: {e}"
                ))));
            }
        }
    }

    if content.is_empty() {
        None
    } else {
        Some(Ok(content))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;

    fn delta_event(content: &str) -> String {
        format!(
            "data: {{\"id\":\"c1\",\"choices\":[{{\"index\":0,\"delta\":{{\"content\":\"{content}\"}},\"finish_reason\":null}}]}}\n\n"
        )
    }

    #[test]
    fn test_single_delta_extracted() {
        let token = extract_deltas(&delta_event("Hello")).unwrap().unwrap();
        assert_eq!(token, "Hello");
    }

    #[test]
    fn test_deltas_within_one_read_concatenate() {
        let buffer = format!("{}{}", delta_event("Hel"), delta_event("lo"));
        let token = extract_deltas(&buffer).unwrap().unwrap();
        assert_eq!(token, "Hello");
    }

    #[test]
    fn test_final_delta_coalesced_with_done_marker_is_kept() {
        // The closing delta and the terminal marker often share one TCP
        // read; the tail of the reply must not be dropped.
        let buffer = format!("{}data: [DONE]\n\n", delta_event("lo"));
        let token = extract_deltas(&buffer).unwrap().unwrap();
        assert_eq!(token, "lo");
    }

    #[test]
    fn test_done_marker_alone_yields_nothing() {
        assert!(extract_deltas("data: [DONE]\n\n").is_none());
    }

    #[test]
    fn test_role_only_delta_yields_nothing() {
        let buffer = "data: {\"id\":\"c1\",\"choices\":[{\"index\":0,\"delta\":{\"role\":\"assistant\"},\"finish_reason\":null}]}\n\n";
        assert!(extract_deltas(buffer).is_none());
    }

    #[test]
    fn test_comments_and_blank_lines_skipped() {
        let buffer = format!(": keep-alive\n\n{}", delta_event("x"));
        assert_eq!(extract_deltas(&buffer).unwrap().unwrap(), "x");
    }

    #[test]
    fn test_delta_with_stop_finish_reason_still_counts() {
        let buffer = "data: {\"id\":\"c1\",\"choices\":[{\"index\":0,\"delta\":{\"content\":\"!\"},\"finish_reason\":\"stop\"}]}\n\n";
        assert_eq!(extract_deltas(buffer).unwrap().unwrap(), "!");
    }

    #[test]
    fn test_malformed_payload_surfaces_error() {
        let result = extract_deltas("data: {not json}\n\n").unwrap();
        assert!(matches!(result, Err(Error::Inference(_))));
    }

    #[tokio::test]
    async fn test_stream_reassembles_reply_across_reads() {
        let reads = vec![
            Ok(bytes::Bytes::from(delta_event("Hel"))),
            Ok(bytes::Bytes::from(format!(
                "{}data: [DONE]\n\n",
                delta_event("lo")
            ))),
        ];
        let mut tokens = parse_sse_stream(stream::iter(reads));

        let mut reply = String::new();
        while let Some(token) = tokens.next().await {
            reply.push_str(&token.unwrap());
        }
        assert_eq!(reply, "Hello");
    }
}
