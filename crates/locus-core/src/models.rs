//! Canonical data model for locus.
//!
//! Every piece of user-facing material (paper, note, chat transcript,
//! highlight, imported bibliographic entry, attachment record) lives in one
//! `content` table, discriminated by [`ContentKind`]. Authors and groups are
//! independently owned and associated many-to-many.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::error::{Error, Result};

// =============================================================================
// CONTENT
// =============================================================================

/// Discriminator tag for rows in the content table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    Paper,
    Note,
    Summary,
    Chat,
    Highlight,
    ZoteroEntry,
    ZoteroAttachment,
}

impl ContentKind {
    /// Stable string form used in the database column.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Paper => "paper",
            Self::Note => "note",
            Self::Summary => "summary",
            Self::Chat => "chat",
            Self::Highlight => "highlight",
            Self::ZoteroEntry => "zotero_entry",
            Self::ZoteroAttachment => "zotero_attachment",
        }
    }

    /// Parse the database string form.
    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "paper" => Ok(Self::Paper),
            "note" => Ok(Self::Note),
            "summary" => Ok(Self::Summary),
            "chat" => Ok(Self::Chat),
            "highlight" => Ok(Self::Highlight),
            "zotero_entry" => Ok(Self::ZoteroEntry),
            "zotero_attachment" => Ok(Self::ZoteroAttachment),
            other => Err(Error::Validation(format!(
                "unknown content kind: {other}"
            ))),
        }
    }
}

impl std::fmt::Display for ContentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A row in the content table.
///
/// `zotero_key`, when present, is unique across all rows including
/// soft-deleted ones — it is the natural key for bibliographic-sourced
/// content. `deleted` rows are excluded from default listings but remain
/// addressable by id or key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Content {
    pub id: i64,
    pub zotero_key: Option<String>,
    pub zotero_version: Option<i64>,
    pub title: String,
    pub kind: ContentKind,
    /// Kind-specific payload, opaque to the store (schema-on-read).
    pub metadata: Option<JsonValue>,
    /// Path (relative to the files dir) of an associated stored file.
    pub filename: Option<String>,
    pub summary: Option<String>,
    /// Comma-joined tag list.
    pub tags: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted: bool,
    pub authors: Vec<Author>,
}

/// Explicit field-list patch for updating a content row.
///
/// `None` fields are left untouched; `updated_at` refreshes on every apply.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContentPatch {
    pub title: Option<String>,
    pub metadata: Option<JsonValue>,
    pub filename: Option<String>,
    pub summary: Option<String>,
    pub tags: Option<String>,
}

impl ContentPatch {
    /// True when the patch carries no changes.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.metadata.is_none()
            && self.filename.is_none()
            && self.summary.is_none()
            && self.tags.is_none()
    }
}

// =============================================================================
// NORMALIZED ITEMS (adapter output, reconciler input)
// =============================================================================

/// An author name pair as it appears on incoming items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorName {
    pub first_name: String,
    pub last_name: String,
}

/// Canonical shape for incoming content, produced by the item adapter.
///
/// All columns are optional: the reconciler merges non-`None` fields onto an
/// existing row, and creation validates the required ones (`title`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NormalizedItem {
    pub id: Option<i64>,
    pub zotero_key: Option<String>,
    pub zotero_version: Option<i64>,
    pub title: Option<String>,
    pub kind: Option<ContentKind>,
    pub metadata: Option<JsonValue>,
    pub filename: Option<String>,
    pub summary: Option<String>,
    pub tags: Option<String>,
    pub deleted: Option<bool>,
    pub authors: Vec<AuthorName>,
    /// Ids of already-stored related content to associate when resolvable.
    pub related_ids: Vec<i64>,
}

impl NormalizedItem {
    /// Empty item of the given kind.
    pub fn of_kind(kind: ContentKind) -> Self {
        Self {
            kind: Some(kind),
            ..Default::default()
        }
    }

    /// Deletion marker addressing a row by its zotero key.
    pub fn deleted_key(key: impl Into<String>) -> Self {
        Self {
            zotero_key: Some(key.into()),
            ..Default::default()
        }
    }
}

/// Field used to match incoming items against existing rows during a
/// reconcile pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKey {
    /// Match on the remote natural key (bibliographic sync).
    ZoteroKey,
    /// Match on the local identifier (locally authored content).
    Id,
}

/// Selector for delete operations: zotero key preferred, id fallback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteSelector {
    ZoteroKey(String),
    Id(i64),
}

impl DeleteSelector {
    /// Build the selector a sync deletion uses for the given item, or `None`
    /// when the item carries neither key.
    pub fn for_item(item: &NormalizedItem) -> Option<Self> {
        if let Some(key) = &item.zotero_key {
            Some(Self::ZoteroKey(key.clone()))
        } else {
            item.id.map(Self::Id)
        }
    }
}

// =============================================================================
// AUTHORS, GROUPS, USERS
// =============================================================================

/// An author, deduplicated by exact (first, last) name match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Author {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
}

/// Group discriminator: plain group vs curated folio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupKind {
    BaseGroup,
    Folio,
}

impl GroupKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BaseGroup => "base_group",
            Self::Folio => "folio",
        }
    }

    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "base_group" => Ok(Self::BaseGroup),
            "folio" => Ok(Self::Folio),
            other => Err(Error::Validation(format!("unknown group kind: {other}"))),
        }
    }
}

/// A named collection of content items.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Group {
    pub id: i64,
    pub name: String,
    pub kind: GroupKind,
}

/// A user account, one-to-one with an [`Author`].
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub active: bool,
    pub author_id: i64,
}

/// Registration request for a new user account.
#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    pub username: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

// =============================================================================
// VERSION LEDGER
// =============================================================================

/// Append-only record of a remote collection version; the latest row (by
/// recorded_at) is the synchronization watermark.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct VersionRecord {
    pub id: i64,
    pub version: i64,
    pub recorded_at: DateTime<Utc>,
}
