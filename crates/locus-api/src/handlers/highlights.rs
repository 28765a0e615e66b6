//! Highlight listing and creation.

use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use serde_json::Value as JsonValue;

use locus_core::{Content, ContentKind, ContentRepository, NormalizedItem};

use crate::error::ApiError;
use crate::state::AppState;

/// GET /highlights
pub async fn list_highlights(
    State(state): State<AppState>,
) -> Result<Json<Vec<Content>>, ApiError> {
    let rows = state.db.content.list_by_kind(ContentKind::Highlight).await?;
    Ok(Json(rows))
}

#[derive(Debug, Deserialize)]
pub struct CreateHighlightRequest {
    /// Title of the highlighted document, stored as the highlight title.
    #[serde(default)]
    pub title: Option<String>,
    /// Reader comment attached to the highlight.
    #[serde(default)]
    pub comment: Option<String>,
    /// Kind-specific payload (position, source id, ...).
    #[serde(default)]
    pub metadata: Option<JsonValue>,
    /// The highlighted passage itself.
    pub highlight_text: String,
    /// Id of the content row the highlight was taken from, when known.
    #[serde(default)]
    pub content_id: Option<i64>,
}

/// POST /highlights
pub async fn create_highlight(
    State(state): State<AppState>,
    Json(request): Json<CreateHighlightRequest>,
) -> Result<Json<Content>, ApiError> {
    if request.highlight_text.is_empty() {
        return Err(ApiError::BadRequest(
            "highlight_text must not be empty".to_string(),
        ));
    }

    let mut metadata = request.metadata.unwrap_or_else(|| serde_json::json!({}));
    if let Some(obj) = metadata.as_object_mut() {
        obj.insert(
            "highlight_text".to_string(),
            JsonValue::String(request.highlight_text.clone()),
        );
    }

    let mut item = NormalizedItem::of_kind(ContentKind::Highlight);
    item.title = Some(request.title.unwrap_or_else(|| "Highlight".to_string()));
    item.summary = request.comment;
    item.metadata = Some(metadata);
    item.related_ids = request.content_id.into_iter().collect();

    let mut rows = state.db.content.create_batch(vec![item]).await?;
    // create_batch returns exactly one row per input item.
    let row = rows
        .pop()
        .ok_or_else(|| ApiError::Internal(locus_core::Error::Internal(
            "highlight row missing from batch result".to_string(),
        )))?;
    Ok(Json(row))
}
