//! Remote sync orchestrator: decides between a full and an incremental pull
//! and drives the reconciler, advancing the watermark only on success.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use serde_json::Value as JsonValue;
use tokio::sync::Mutex;
use tracing::{debug, info};

use locus_core::{
    ContentRepository, Error, GroupKind, MatchKey, NormalizedItem, Result, VersionLedger,
};
use locus_db::Database;

use crate::adapter::{normalize_library_item, sanitize_filename};
use crate::reconciler::Reconciler;
use crate::remote::{RemoteItem, RemoteLibrary};

/// Raw item types excluded from the first full pull; incremental pulls
/// already exclude attachments server-side.
const FULL_PULL_EXCLUDED_TYPES: &[&str] = &["note", "attachment"];

/// Drives reconcile cycles against one remote collection.
///
/// At most one cycle is in flight at a time: concurrent callers serialize on
/// an internal lock before reading the watermark, since two cycles reading
/// the same stale watermark would race on the ledger append.
pub struct SyncOrchestrator {
    db: Database,
    remote: Arc<dyn RemoteLibrary>,
    reconciler: Reconciler,
    collection: String,
    files_dir: PathBuf,
    cycle_gate: Mutex<()>,
}

impl SyncOrchestrator {
    /// Create an orchestrator for the named remote collection.
    pub fn new(
        db: Database,
        remote: Arc<dyn RemoteLibrary>,
        collection: impl Into<String>,
        files_dir: impl Into<PathBuf>,
    ) -> Self {
        let reconciler = Reconciler::new(db.clone());
        Self {
            db,
            remote,
            reconciler,
            collection: collection.into(),
            files_dir: files_dir.into(),
            cycle_gate: Mutex::new(()),
        }
    }

    async fn collection_id(&self) -> Result<String> {
        self.remote
            .resolve_collection_id(&self.collection)
            .await?
            .ok_or_else(|| Error::NotFound(format!("collection {} not found", self.collection)))
    }

    /// Run one reconcile cycle; returns the new watermark.
    ///
    /// With an empty ledger this is a full pull inserted as new content;
    /// otherwise the delta since the watermark is fetched and reconciled.
    /// Either way the watermark is recorded only after the store mutation
    /// succeeds, so a failed or interrupted cycle re-fetches the same range
    /// on the next invocation (upserts and soft-deletes are idempotent).
    pub async fn sync(&self) -> Result<i64> {
        let _guard = self.cycle_gate.lock().await;
        let start = Instant::now();
        let collection_id = self.collection_id().await?;

        let watermark = self.db.versions.latest().await?;
        let new_version = match watermark {
            Some(mark) => {
                debug!(
                    subsystem = "sync",
                    component = "orchestrator",
                    op = "sync",
                    version = mark.version,
                    "Incremental pull since watermark"
                );
                let delta = self
                    .remote
                    .fetch_changed_since(&collection_id, mark.version, true)
                    .await?;

                let upserts: Vec<NormalizedItem> =
                    delta.items.iter().map(normalize_library_item).collect();
                let deletions: Vec<NormalizedItem> = delta
                    .deleted_keys
                    .unwrap_or_default()
                    .into_iter()
                    .map(NormalizedItem::deleted_key)
                    .collect();

                self.reconciler
                    .reconcile(&upserts, &deletions, MatchKey::ZoteroKey)
                    .await?;
                delta.version
            }
            None => {
                debug!(
                    subsystem = "sync",
                    component = "orchestrator",
                    op = "sync",
                    "No watermark recorded, performing full pull"
                );
                let (version, items) = self.remote.fetch_all(&collection_id).await?;

                // Nothing can match on first sync, so everything goes
                // through the creation path.
                let new_items: Vec<NormalizedItem> = items
                    .iter()
                    .filter(|item| !Self::is_excluded_from_full_pull(item))
                    .map(normalize_library_item)
                    .collect();
                self.db.content.create_batch(new_items).await?;
                version
            }
        };

        self.db.versions.record(new_version).await?;
        info!(
            subsystem = "sync",
            component = "orchestrator",
            op = "sync",
            version = new_version,
            duration_ms = start.elapsed().as_millis() as u64,
            "Sync cycle complete"
        );
        Ok(new_version)
    }

    fn is_excluded_from_full_pull(item: &RemoteItem) -> bool {
        item.data
            .get("itemType")
            .and_then(JsonValue::as_str)
            .map(|t| FULL_PULL_EXCLUDED_TYPES.contains(&t))
            .unwrap_or(false)
    }

    /// Push one locally authored item into the remote collection.
    pub async fn push_item(&self, data: JsonValue) -> Result<Option<String>> {
        let collection_id = self.collection_id().await?;
        self.remote.create_item(&collection_id, data).await
    }

    /// Locate a PDF attachment among an item's children, download it into
    /// the files dir, store an attachment content row, and group it with
    /// its parent entry. Returns false when the item has no PDF attachment.
    pub async fn store_attachment_for_item(&self, item_key: &str) -> Result<bool> {
        let children = self.remote.child_items(item_key).await?;
        let Some(attachment) = children.iter().find(|child| {
            child
                .data
                .get("contentType")
                .and_then(JsonValue::as_str)
                .map(|ct| ct == "application/pdf")
                .unwrap_or(false)
        }) else {
            return Ok(false);
        };

        let Some(bytes) = self.remote.fetch_attachment(&attachment.key).await? else {
            return Ok(false);
        };

        // The remote filename is untrusted input; keep it to one component.
        let filename = attachment
            .data
            .get("filename")
            .and_then(JsonValue::as_str)
            .map(sanitize_filename)
            .unwrap_or_else(|| format!("{}.pdf", attachment.key));
        tokio::fs::write(self.files_dir.join(&filename), &bytes).await?;

        let mut item = normalize_library_item(attachment);
        item.filename = Some(filename);
        // Merge rather than insert so a re-download stays idempotent.
        self.reconciler
            .reconcile(&[item], &[], MatchKey::ZoteroKey)
            .await?;

        let parent_key = attachment
            .data
            .get("parentItem")
            .and_then(JsonValue::as_str)
            .unwrap_or(item_key)
            .to_string();
        self.db
            .content
            .create_group(
                &parent_key,
                GroupKind::BaseGroup,
                &[parent_key.clone(), attachment.key.clone()],
            )
            .await?;
        Ok(true)
    }
}
