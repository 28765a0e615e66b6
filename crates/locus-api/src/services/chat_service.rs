//! Chat turn execution: streams backend tokens to the caller while
//! accumulating the reply for persistence.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::{json, Value as JsonValue};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{error, warn};

use locus_core::{AuthorName, ContentKind, ContentPatch, ContentRepository, Error, Result};
use locus_db::Database;
use locus_inference::{ChatBackend, ChatMessage};

use futures::StreamExt;

/// Document context sent along with a highlighted passage.
#[derive(Debug, Clone, Deserialize)]
pub struct DocContext {
    pub title: String,
    #[serde(default)]
    pub authors: Vec<AuthorName>,
    #[serde(default)]
    pub summary: Option<String>,
}

/// One user turn in a chat.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatTurnRequest {
    pub content: String,
    #[serde(default)]
    pub highlight: Option<String>,
    #[serde(default)]
    pub doc: Option<DocContext>,
}

/// A running chat turn: the token channel plus the completion handle.
///
/// Tokens arrive as the backend produces them. The turn persists the
/// assistant reply once the stream ends, whether or not the receiver is
/// still listening.
pub struct ChatTurn {
    pub tokens: mpsc::Receiver<String>,
    pub done: JoinHandle<()>,
}

/// Build the explanation request for a highlighted passage.
fn explanation_request(doc: &DocContext, highlight: &str) -> String {
    let authors = doc
        .authors
        .iter()
        .map(|a| format!("{} {}", a.first_name, a.last_name))
        .collect::<Vec<_>>()
        .join(",");

    match doc.summary.as_deref().filter(|s| !s.is_empty()) {
        Some(summary) => format!(
            "Please explain the following text {highlight} in a few sentences using \
             extremely simple but precise terms within the context of a document \
             entitled {}, written by {authors} with summary {summary}.",
            doc.title
        ),
        None => format!(
            "Please explain the following text {highlight} in a few sentences using \
             extremely simple but precise terms within the context of a document \
             entitled {}, written by {authors}.",
            doc.title
        ),
    }
}

fn parse_messages(metadata: Option<&JsonValue>) -> Vec<ChatMessage> {
    metadata
        .and_then(|m| m.pointer("/chat/messages"))
        .and_then(|v| serde_json::from_value(v.clone()).ok())
        .unwrap_or_default()
}

fn parse_highlights(metadata: Option<&JsonValue>) -> Vec<JsonValue> {
    metadata
        .and_then(|m| m.pointer("/chat/highlights"))
        .and_then(JsonValue::as_array)
        .cloned()
        .unwrap_or_default()
}

/// Run one chat turn against the given chat row.
///
/// Loads the chat history, appends the user message (expanded with the
/// highlight explanation request when one is attached), streams the backend
/// reply through the returned channel, and persists the updated transcript
/// when the stream ends. A vanished receiver stops forwarding but the reply
/// accumulated so far is still persisted.
pub async fn run_chat_turn(
    db: Database,
    backend: Arc<dyn ChatBackend>,
    chat_id: i64,
    request: ChatTurnRequest,
) -> Result<ChatTurn> {
    let chat = db
        .content
        .get(chat_id)
        .await?
        .filter(|row| row.kind == ContentKind::Chat)
        .ok_or_else(|| Error::NotFound(format!("chat {chat_id} not found")))?;

    let mut messages = parse_messages(chat.metadata.as_ref());
    let mut highlights = parse_highlights(chat.metadata.as_ref());

    let mut text = request.content.clone();
    if let Some(highlight) = request.highlight.as_deref().filter(|h| !h.is_empty()) {
        let doc = request.doc.as_ref().ok_or_else(|| {
            Error::Validation("highlight requires its document context".to_string())
        })?;
        text.push_str(&explanation_request(doc, highlight));
        highlights.push(JsonValue::String(highlight.to_string()));
    }
    messages.push(ChatMessage::user(text));

    let mut stream = backend.stream_chat(&messages).await?;
    let (tx, rx) = mpsc::channel::<String>(32);

    let done = tokio::spawn(async move {
        let mut reply = String::new();
        while let Some(token) = stream.next().await {
            match token {
                Ok(fragment) => {
                    reply.push_str(&fragment);
                    if tx.send(fragment).await.is_err() {
                        // Receiver is gone; keep what we have and persist it.
                        warn!(
                            subsystem = "api",
                            component = "chat",
                            op = "run_chat_turn",
                            chat_id,
                            "Client disconnected mid-stream, persisting partial reply"
                        );
                        break;
                    }
                }
                Err(e) => {
                    warn!(
                        subsystem = "api",
                        component = "chat",
                        op = "run_chat_turn",
                        chat_id,
                        error = %e,
                        "Backend stream failed mid-turn"
                    );
                    break;
                }
            }
        }

        messages.push(ChatMessage::assistant(reply));
        let metadata = json!({
            "chat": {
                "messages": messages,
                "highlights": highlights,
            }
        });

        let patch = ContentPatch {
            metadata: Some(metadata),
            ..Default::default()
        };
        if let Err(e) = db.content.update(chat_id, patch).await {
            error!(
                subsystem = "api",
                component = "chat",
                op = "run_chat_turn",
                chat_id,
                error = %e,
                "Failed to persist chat transcript"
            );
        }
    });

    Ok(ChatTurn { tokens: rx, done })
}
