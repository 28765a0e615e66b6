//! Chat listing, creation, and the streamed continuation endpoint.

use std::convert::Infallible;

use axum::extract::{Path, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::Json;
use futures::Stream;
use serde::Deserialize;
use serde_json::{json, Value as JsonValue};
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::StreamExt;

use locus_core::{Content, ContentKind, ContentRepository, NormalizedItem};

use crate::error::ApiError;
use crate::services::chat_service::{run_chat_turn, ChatTurnRequest};
use crate::state::AppState;

/// GET /chats
pub async fn list_chats(State(state): State<AppState>) -> Result<Json<Vec<Content>>, ApiError> {
    let rows = state.db.content.list_by_kind(ContentKind::Chat).await?;
    Ok(Json(rows))
}

#[derive(Debug, Default, Deserialize)]
pub struct CreateChatRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub messages: Vec<JsonValue>,
    #[serde(default)]
    pub highlights: Vec<JsonValue>,
}

/// POST /chats
pub async fn create_chat(
    State(state): State<AppState>,
    Json(request): Json<CreateChatRequest>,
) -> Result<Json<Content>, ApiError> {
    let mut item = NormalizedItem::of_kind(ContentKind::Chat);
    item.title = Some(request.title.unwrap_or_else(|| "Chat Session".to_string()));
    item.metadata = Some(json!({
        "chat": {
            "messages": request.messages,
            "highlights": request.highlights,
        }
    }));

    let mut rows = state.db.content.create_batch(vec![item]).await?;
    let row = rows.pop().ok_or_else(|| {
        ApiError::Internal(locus_core::Error::Internal(
            "chat row missing from batch result".to_string(),
        ))
    })?;
    Ok(Json(row))
}

/// POST /chats/:id/messages
///
/// Runs one chat turn, streaming the assistant reply as SSE events. The
/// transcript persists server-side once the stream ends.
pub async fn continue_chat(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<ChatTurnRequest>,
) -> Result<Sse<impl Stream<Item = std::result::Result<Event, Infallible>>>, ApiError> {
    let turn = run_chat_turn(state.db.clone(), state.chat.clone(), id, request).await?;

    let stream = ReceiverStream::new(turn.tokens)
        .map(|fragment| Ok(Event::default().event("token").data(fragment)));

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}
