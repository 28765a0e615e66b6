//! Content listing, lookup, update, and file download.

use axum::extract::{Path, Query, State};
use axum::http::header;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use locus_core::{Content, ContentKind, ContentPatch, ContentRepository};

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ListContentQuery {
    #[serde(default)]
    pub include_deleted: bool,
    /// Restrict the listing to one content kind.
    pub kind: Option<String>,
}

/// GET /content
pub async fn list_content(
    State(state): State<AppState>,
    Query(query): Query<ListContentQuery>,
) -> Result<Json<Vec<Content>>, ApiError> {
    let rows = match query.kind.as_deref() {
        Some(kind) => {
            let kind = ContentKind::parse(kind)?;
            state.db.content.list_by_kind(kind).await?
        }
        None => state.db.content.list(query.include_deleted).await?,
    };
    Ok(Json(rows))
}

/// GET /content/:id
pub async fn get_content(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Content>, ApiError> {
    let row = state
        .db
        .content
        .get(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("content {id} not found")))?;
    Ok(Json(row))
}

/// PUT /content/:id
pub async fn update_content(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(patch): Json<ContentPatch>,
) -> Result<Json<Content>, ApiError> {
    if patch.is_empty() {
        return Err(ApiError::BadRequest("patch carries no fields".to_string()));
    }
    let row = state
        .db
        .content
        .update(id, patch)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("content {id} not found")))?;
    Ok(Json(row))
}

/// GET /content/:id/file
///
/// Serves the stored file associated with a content row.
pub async fn download_file(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let row = state
        .db
        .content
        .get(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("content {id} not found")))?;
    let filename = row
        .filename
        .ok_or_else(|| ApiError::NotFound(format!("content {id} has no stored file")))?;

    // Stored filenames are single path components; reject anything else.
    if filename.contains('/') || filename.contains("..") {
        return Err(ApiError::BadRequest("invalid stored filename".to_string()));
    }

    let bytes = tokio::fs::read(state.files_dir.join(&filename))
        .await
        .map_err(|_| ApiError::NotFound(format!("file {filename} not found")))?;

    Ok((
        [
            (header::CONTENT_TYPE, "application/octet-stream".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        bytes,
    ))
}

#[derive(Debug, Deserialize)]
pub struct DownloadAttachmentRequest {
    pub id: i64,
}

/// POST /content/attachment
///
/// Locate and download the PDF attachment for a bibliographic entry, storing
/// it locally and recording the attachment row.
pub async fn download_attachment(
    State(state): State<AppState>,
    Json(request): Json<DownloadAttachmentRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let row = state
        .db
        .content
        .get(request.id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("content {} not found", request.id)))?;

    if row.kind != ContentKind::ZoteroEntry {
        return Err(ApiError::BadRequest("Not a zotero entry".to_string()));
    }
    let key = row
        .zotero_key
        .ok_or_else(|| ApiError::BadRequest("entry has no zotero key".to_string()))?;

    let downloaded = state.sync.store_attachment_for_item(&key).await?;
    Ok(Json(json!({ "downloaded": downloaded })))
}
