//! Core traits for locus abstractions.
//!
//! These traits define the interfaces that concrete implementations must
//! satisfy, enabling pluggable backends and testability.

use async_trait::async_trait;

use crate::error::Result;
use crate::models::*;

/// Repository for the unified content table.
///
/// All mutating operations refresh `updated_at`. Authors are created lazily
/// on first encounter and reused afterward (case-sensitive exact match).
#[async_trait]
pub trait ContentRepository: Send + Sync {
    /// List content rows; soft-deleted rows are excluded unless requested.
    async fn list(&self, include_deleted: bool) -> Result<Vec<Content>>;

    /// List non-deleted content of one kind (highlights, chats, ...).
    async fn list_by_kind(&self, kind: ContentKind) -> Result<Vec<Content>>;

    /// Point lookup by local id. Finds soft-deleted rows too.
    async fn get(&self, id: i64) -> Result<Option<Content>>;

    /// Point lookup by remote key. Finds soft-deleted rows too.
    async fn get_by_zotero_key(&self, key: &str) -> Result<Option<Content>>;

    /// Insert a batch of new rows in a single transaction.
    ///
    /// All-or-nothing: any item failing validation (or a duplicate zotero
    /// key) rolls back the entire batch and surfaces the error.
    async fn create_batch(&self, items: Vec<NormalizedItem>) -> Result<Vec<Content>>;

    /// Apply an explicit field-list patch to an existing row.
    ///
    /// Returns `None` when the id is unknown (no-op, not an error).
    async fn update(&self, id: i64, patch: ContentPatch) -> Result<Option<Content>>;

    /// Mark matching rows deleted. Unknown selectors are silent no-ops.
    async fn soft_delete(&self, selectors: &[DeleteSelector]) -> Result<()>;

    /// Remove matching rows permanently. Administrative operation only —
    /// sync never hard-deletes.
    async fn hard_delete(&self, selectors: &[DeleteSelector]) -> Result<()>;

    /// Clear the deleted flag on a row.
    async fn restore(&self, id: i64) -> Result<()>;

    /// Create a group and associate the content rows matching the keys.
    async fn create_group(
        &self,
        name: &str,
        kind: GroupKind,
        zotero_keys: &[String],
    ) -> Result<Group>;

    /// Authors associated with a content row.
    async fn authors_for(&self, content_id: i64) -> Result<Vec<Author>>;
}

/// Append-only ledger of remote collection versions.
#[async_trait]
pub trait VersionLedger: Send + Sync {
    /// Append a watermark row with the current time. Never mutates prior rows.
    async fn record(&self, version: i64) -> Result<()>;

    /// The most recently recorded row, or `None` if never synced.
    async fn latest(&self) -> Result<Option<VersionRecord>>;
}

/// Repository for user accounts.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Register a new user, creating its backing author row.
    async fn create(&self, user: NewUser) -> Result<User>;

    /// Lookup by id.
    async fn get(&self, id: i64) -> Result<Option<User>>;

    /// Lookup by username.
    async fn get_by_username(&self, username: &str) -> Result<Option<User>>;

    /// Check a password against the stored hash; `None` when the user does
    /// not exist or the password does not match.
    async fn verify_password(&self, username: &str, password: &str) -> Result<Option<User>>;
}
