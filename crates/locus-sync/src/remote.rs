//! The remote bibliographic library collaborator, as a narrow trait.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use locus_core::Result;

/// A raw item as reported by the remote library.
///
/// `data` is the heterogeneous per-item payload (inspected by the item
/// adapter); `links` carries the API link objects the adapter folds into the
/// stored metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteItem {
    pub key: String,
    pub version: i64,
    pub data: JsonValue,
    #[serde(default)]
    pub links: JsonValue,
}

/// Result of an incremental fetch: the remote collection version the
/// response was served at, the changed items, and (when requested) the keys
/// deleted since the given version.
#[derive(Debug, Clone, Default)]
pub struct ChangeSet {
    pub version: i64,
    pub items: Vec<RemoteItem>,
    pub deleted_keys: Option<Vec<String>>,
}

/// Remote library operations the sync engine consumes.
///
/// The remote is assumed to report a monotonically increasing version
/// counter with every response.
#[async_trait]
pub trait RemoteLibrary: Send + Sync {
    /// Resolve a collection id by its display name.
    async fn resolve_collection_id(&self, name: &str) -> Result<Option<String>>;

    /// Items added or modified in the collection since `version`, plus the
    /// deleted keys when `include_deleted` is set.
    async fn fetch_changed_since(
        &self,
        collection_id: &str,
        version: i64,
        include_deleted: bool,
    ) -> Result<ChangeSet>;

    /// Every item in the collection (attachments excluded server-side),
    /// with the version the listing was served at.
    async fn fetch_all(&self, collection_id: &str) -> Result<(i64, Vec<RemoteItem>)>;

    /// Create an item in the collection, returning its key.
    async fn create_item(&self, collection_id: &str, data: JsonValue) -> Result<Option<String>>;

    /// Child items (attachments) of an item.
    async fn child_items(&self, item_key: &str) -> Result<Vec<RemoteItem>>;

    /// Raw bytes of an attachment item's file, or `None` when the file is
    /// not available through the API.
    async fn fetch_attachment(&self, item_key: &str) -> Result<Option<Vec<u8>>>;
}
