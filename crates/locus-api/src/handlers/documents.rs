//! Locally authored document save (editor payloads).

use axum::extract::State;
use axum::Json;
use serde::Deserialize;

use locus_core::{AuthorName, Content, ContentKind, ContentRepository, MatchKey};
use locus_sync::{normalize_document, LocalDocument, Reconciler, StorageFormat};

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SaveDocumentRequest {
    /// Existing row id; absent for a brand-new document.
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub kind: Option<ContentKind>,
    pub title: String,
    /// Rendered HTML body.
    #[serde(default)]
    pub content: Option<String>,
    /// Editor delta source.
    #[serde(default)]
    pub delta: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub authors: Vec<AuthorName>,
}

/// POST /documents
///
/// Persists the rendered payload to the files dir and upserts the content
/// row: by id when one is given, as a new row otherwise.
pub async fn save_document(
    State(state): State<AppState>,
    Json(request): Json<SaveDocumentRequest>,
) -> Result<Json<Vec<Content>>, ApiError> {
    let doc = LocalDocument {
        id: request.id,
        kind: request.kind,
        title: request.title,
        content: request.content,
        delta: request.delta,
        tags: request.tags,
        authors: request.authors,
    };

    let item = normalize_document(&doc, Some((&state.files_dir, StorageFormat::Html)))?;

    if item.id.is_some() {
        let reconciler = Reconciler::new(state.db.clone());
        reconciler.reconcile(&[item], &[], MatchKey::Id).await?;
    } else {
        state.db.content.create_batch(vec![item]).await?;
    }

    let rows = state.db.content.list(false).await?;
    Ok(Json(rows))
}
