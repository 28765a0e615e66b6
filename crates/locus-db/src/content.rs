//! Content repository implementation.
//!
//! One table holds every kind of user-facing material; this module provides
//! the CRUD, soft-delete, and batch operations on it, plus the
//! transaction-level helpers the sync reconciler composes into its own
//! failure-atomic unit.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, Sqlite, SqlitePool, Transaction};

use locus_core::{
    Author, AuthorName, Content, ContentKind, ContentPatch, ContentRepository, DeleteSelector,
    Error, Group, GroupKind, MatchKey, NormalizedItem, Result,
};

/// SQLite implementation of [`ContentRepository`].
#[derive(Clone)]
pub struct SqliteContentRepository {
    pool: SqlitePool,
}

/// Convert a low-level database error, surfacing unique-key violations
/// (duplicate zotero key) as conflicts.
pub(crate) fn map_db_err(e: sqlx::Error) -> Error {
    if let sqlx::Error::Database(ref db) = e {
        if db.is_unique_violation() {
            return Error::Conflict(db.message().to_string());
        }
    }
    Error::Database(e)
}

/// Map a database row to a [`Content`] (authors attached separately).
fn map_row_to_content(row: &SqliteRow) -> Result<Content> {
    let kind_str: String = row.get("kind");
    let metadata: Option<String> = row.get("metadata");
    let metadata = match metadata {
        Some(raw) => Some(serde_json::from_str(&raw)?),
        None => None,
    };

    Ok(Content {
        id: row.get("id"),
        zotero_key: row.get("zotero_key"),
        zotero_version: row.get("zotero_version"),
        title: row.get("title"),
        kind: ContentKind::parse(&kind_str)?,
        metadata,
        filename: row.get("filename"),
        summary: row.get("summary"),
        tags: row.get("tags"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
        deleted: row.get("deleted"),
        authors: Vec::new(),
    })
}

// =============================================================================
// TRANSACTION-LEVEL HELPERS
//
// The reconciler wraps a whole sync round in one transaction, so every
// operation it needs is available against a `Transaction` as well as through
// the repository methods below.
// =============================================================================

/// Resolve an author by exact (first, last) match, creating it on first
/// encounter.
pub async fn resolve_author_tx(
    tx: &mut Transaction<'_, Sqlite>,
    name: &AuthorName,
) -> Result<i64> {
    let existing: Option<i64> =
        sqlx::query_scalar("SELECT id FROM authors WHERE first_name = ? AND last_name = ?")
            .bind(&name.first_name)
            .bind(&name.last_name)
            .fetch_optional(&mut **tx)
            .await
            .map_err(Error::Database)?;

    if let Some(id) = existing {
        return Ok(id);
    }

    let res = sqlx::query("INSERT INTO authors (first_name, last_name) VALUES (?, ?)")
        .bind(&name.first_name)
        .bind(&name.last_name)
        .execute(&mut **tx)
        .await
        .map_err(Error::Database)?;
    Ok(res.last_insert_rowid())
}

async fn link_authors_tx(
    tx: &mut Transaction<'_, Sqlite>,
    content_id: i64,
    authors: &[AuthorName],
) -> Result<()> {
    for name in authors {
        let author_id = resolve_author_tx(tx, name).await?;
        sqlx::query("INSERT OR IGNORE INTO content_authors (content_id, author_id) VALUES (?, ?)")
            .bind(content_id)
            .bind(author_id)
            .execute(&mut **tx)
            .await
            .map_err(Error::Database)?;
    }
    Ok(())
}

/// Associate related content rows that actually exist; unresolvable ids are
/// ignored.
async fn link_related_tx(
    tx: &mut Transaction<'_, Sqlite>,
    content_id: i64,
    related_ids: &[i64],
) -> Result<()> {
    for rid in related_ids {
        let exists: Option<i64> = sqlx::query_scalar("SELECT id FROM content WHERE id = ?")
            .bind(rid)
            .fetch_optional(&mut **tx)
            .await
            .map_err(Error::Database)?;
        if exists.is_some() {
            sqlx::query(
                "INSERT OR IGNORE INTO content_association (content_id1, content_id2) VALUES (?, ?)",
            )
            .bind(content_id)
            .bind(rid)
            .execute(&mut **tx)
            .await
            .map_err(Error::Database)?;
        }
    }
    Ok(())
}

/// Insert a brand-new content row from its canonical shape.
///
/// Title and kind are required here; everything else defaults to null.
pub async fn insert_item_tx(
    tx: &mut Transaction<'_, Sqlite>,
    item: &NormalizedItem,
) -> Result<i64> {
    let title = item
        .title
        .as_deref()
        .filter(|t| !t.is_empty())
        .ok_or_else(|| Error::Validation("content item is missing a title".to_string()))?;
    let kind = item
        .kind
        .ok_or_else(|| Error::Validation("content item is missing a kind".to_string()))?;

    let now = Utc::now();
    let metadata = item.metadata.as_ref().map(|m| m.to_string());

    let res = sqlx::query(
        "INSERT INTO content \
         (zotero_key, zotero_version, title, kind, metadata, filename, summary, tags, \
          created_at, updated_at, deleted) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&item.zotero_key)
    .bind(item.zotero_version)
    .bind(title)
    .bind(kind.as_str())
    .bind(metadata)
    .bind(&item.filename)
    .bind(&item.summary)
    .bind(&item.tags)
    .bind(now)
    .bind(now)
    .bind(item.deleted.unwrap_or(false))
    .execute(&mut **tx)
    .await
    .map_err(map_db_err)?;

    let id = res.last_insert_rowid();
    link_authors_tx(tx, id, &item.authors).await?;
    link_related_tx(tx, id, &item.related_ids).await?;
    Ok(id)
}

/// Upsert one item keyed by `match_key`.
///
/// When a row matches, non-null incoming fields are assigned onto it
/// (last-writer-wins per field, no deep merge of metadata); otherwise the
/// item is inserted as a new row. Returns the affected row id.
pub async fn merge_item_tx(
    tx: &mut Transaction<'_, Sqlite>,
    item: &NormalizedItem,
    match_key: MatchKey,
) -> Result<i64> {
    let existing: Option<i64> = match match_key {
        MatchKey::ZoteroKey => {
            let key = item.zotero_key.as_deref().ok_or_else(|| {
                Error::Validation("upsert item is missing its zotero key".to_string())
            })?;
            sqlx::query_scalar("SELECT id FROM content WHERE zotero_key = ?")
                .bind(key)
                .fetch_optional(&mut **tx)
                .await
                .map_err(Error::Database)?
        }
        MatchKey::Id => {
            let id = item
                .id
                .ok_or_else(|| Error::Validation("upsert item is missing its id".to_string()))?;
            sqlx::query_scalar("SELECT id FROM content WHERE id = ?")
                .bind(id)
                .fetch_optional(&mut **tx)
                .await
                .map_err(Error::Database)?
        }
    };

    let Some(id) = existing else {
        return insert_item_tx(tx, item).await;
    };

    // Explicit field-list merge; clause order and bind order must match.
    let mut sets = vec!["updated_at = ?"];
    if item.title.is_some() {
        sets.push("title = ?");
    }
    if item.zotero_version.is_some() {
        sets.push("zotero_version = ?");
    }
    if item.kind.is_some() {
        sets.push("kind = ?");
    }
    if item.metadata.is_some() {
        sets.push("metadata = ?");
    }
    if item.filename.is_some() {
        sets.push("filename = ?");
    }
    if item.summary.is_some() {
        sets.push("summary = ?");
    }
    if item.tags.is_some() {
        sets.push("tags = ?");
    }
    if item.deleted.is_some() {
        sets.push("deleted = ?");
    }

    let sql = format!("UPDATE content SET {} WHERE id = ?", sets.join(", "));
    let mut q = sqlx::query(&sql).bind(Utc::now());
    if let Some(v) = &item.title {
        q = q.bind(v);
    }
    if let Some(v) = item.zotero_version {
        q = q.bind(v);
    }
    if let Some(v) = item.kind {
        q = q.bind(v.as_str());
    }
    if let Some(v) = &item.metadata {
        q = q.bind(v.to_string());
    }
    if let Some(v) = &item.filename {
        q = q.bind(v);
    }
    if let Some(v) = &item.summary {
        q = q.bind(v);
    }
    if let Some(v) = &item.tags {
        q = q.bind(v);
    }
    if let Some(v) = item.deleted {
        q = q.bind(v);
    }
    q.bind(id).execute(&mut **tx).await.map_err(map_db_err)?;

    link_authors_tx(tx, id, &item.authors).await?;
    link_related_tx(tx, id, &item.related_ids).await?;
    Ok(id)
}

/// Mark a matching row deleted. Zero matched rows is a silent no-op.
pub async fn soft_delete_tx(
    tx: &mut Transaction<'_, Sqlite>,
    selector: &DeleteSelector,
) -> Result<()> {
    let now = Utc::now();
    match selector {
        DeleteSelector::ZoteroKey(key) => {
            sqlx::query("UPDATE content SET deleted = 1, updated_at = ? WHERE zotero_key = ?")
                .bind(now)
                .bind(key)
                .execute(&mut **tx)
                .await
                .map_err(Error::Database)?;
        }
        DeleteSelector::Id(id) => {
            sqlx::query("UPDATE content SET deleted = 1, updated_at = ? WHERE id = ?")
                .bind(now)
                .bind(id)
                .execute(&mut **tx)
                .await
                .map_err(Error::Database)?;
        }
    }
    Ok(())
}

async fn hard_delete_tx(
    tx: &mut Transaction<'_, Sqlite>,
    selector: &DeleteSelector,
) -> Result<()> {
    let id: Option<i64> = match selector {
        DeleteSelector::ZoteroKey(key) => {
            sqlx::query_scalar("SELECT id FROM content WHERE zotero_key = ?")
                .bind(key)
                .fetch_optional(&mut **tx)
                .await
                .map_err(Error::Database)?
        }
        DeleteSelector::Id(id) => Some(*id),
    };
    let Some(id) = id else {
        return Ok(());
    };

    sqlx::query("DELETE FROM content_authors WHERE content_id = ?")
        .bind(id)
        .execute(&mut **tx)
        .await
        .map_err(Error::Database)?;
    sqlx::query("DELETE FROM group_content WHERE content_id = ?")
        .bind(id)
        .execute(&mut **tx)
        .await
        .map_err(Error::Database)?;
    sqlx::query("DELETE FROM content_association WHERE content_id1 = ? OR content_id2 = ?")
        .bind(id)
        .bind(id)
        .execute(&mut **tx)
        .await
        .map_err(Error::Database)?;
    sqlx::query("DELETE FROM content WHERE id = ?")
        .bind(id)
        .execute(&mut **tx)
        .await
        .map_err(Error::Database)?;
    Ok(())
}

impl SqliteContentRepository {
    /// Create a new repository over the given connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn fetch_one(&self, sql: &str, bind: &str) -> Result<Option<Content>> {
        let row = sqlx::query(sql)
            .bind(bind)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?;
        match row {
            Some(row) => {
                let mut content = map_row_to_content(&row)?;
                content.authors = self.authors_for(content.id).await?;
                Ok(Some(content))
            }
            None => Ok(None),
        }
    }
}

#[async_trait]
impl ContentRepository for SqliteContentRepository {
    async fn list(&self, include_deleted: bool) -> Result<Vec<Content>> {
        let sql = if include_deleted {
            "SELECT * FROM content ORDER BY id"
        } else {
            "SELECT * FROM content WHERE deleted = 0 ORDER BY id"
        };
        let rows = sqlx::query(sql)
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)?;

        let mut out = Vec::with_capacity(rows.len());
        for row in &rows {
            let mut content = map_row_to_content(row)?;
            content.authors = self.authors_for(content.id).await?;
            out.push(content);
        }
        Ok(out)
    }

    async fn list_by_kind(&self, kind: ContentKind) -> Result<Vec<Content>> {
        let rows = sqlx::query("SELECT * FROM content WHERE kind = ? AND deleted = 0 ORDER BY id")
            .bind(kind.as_str())
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)?;

        let mut out = Vec::with_capacity(rows.len());
        for row in &rows {
            let mut content = map_row_to_content(row)?;
            content.authors = self.authors_for(content.id).await?;
            out.push(content);
        }
        Ok(out)
    }

    async fn get(&self, id: i64) -> Result<Option<Content>> {
        let row = sqlx::query("SELECT * FROM content WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?;
        match row {
            Some(row) => {
                let mut content = map_row_to_content(&row)?;
                content.authors = self.authors_for(content.id).await?;
                Ok(Some(content))
            }
            None => Ok(None),
        }
    }

    async fn get_by_zotero_key(&self, key: &str) -> Result<Option<Content>> {
        self.fetch_one("SELECT * FROM content WHERE zotero_key = ?", key)
            .await
    }

    async fn create_batch(&self, items: Vec<NormalizedItem>) -> Result<Vec<Content>> {
        let mut tx = self.pool.begin().await.map_err(Error::Database)?;

        let mut ids = Vec::with_capacity(items.len());
        for item in &items {
            match insert_item_tx(&mut tx, item).await {
                Ok(id) => ids.push(id),
                Err(e) => {
                    tx.rollback().await.map_err(Error::Database)?;
                    return Err(e);
                }
            }
        }
        tx.commit().await.map_err(Error::Database)?;

        let mut created = Vec::with_capacity(ids.len());
        for id in ids {
            let content = self
                .get(id)
                .await?
                .ok_or_else(|| Error::Internal(format!("created row {id} vanished")))?;
            created.push(content);
        }
        Ok(created)
    }

    async fn update(&self, id: i64, patch: ContentPatch) -> Result<Option<Content>> {
        let existing = self.get(id).await?;
        if existing.is_none() || patch.is_empty() {
            return Ok(existing);
        }

        let mut sets = vec!["updated_at = ?"];
        if patch.title.is_some() {
            sets.push("title = ?");
        }
        if patch.metadata.is_some() {
            sets.push("metadata = ?");
        }
        if patch.filename.is_some() {
            sets.push("filename = ?");
        }
        if patch.summary.is_some() {
            sets.push("summary = ?");
        }
        if patch.tags.is_some() {
            sets.push("tags = ?");
        }

        let sql = format!("UPDATE content SET {} WHERE id = ?", sets.join(", "));
        let mut q = sqlx::query(&sql).bind(Utc::now());
        if let Some(v) = &patch.title {
            q = q.bind(v);
        }
        if let Some(v) = &patch.metadata {
            q = q.bind(v.to_string());
        }
        if let Some(v) = &patch.filename {
            q = q.bind(v);
        }
        if let Some(v) = &patch.summary {
            q = q.bind(v);
        }
        if let Some(v) = &patch.tags {
            q = q.bind(v);
        }
        q.bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_db_err)?;

        self.get(id).await
    }

    async fn soft_delete(&self, selectors: &[DeleteSelector]) -> Result<()> {
        let mut tx = self.pool.begin().await.map_err(Error::Database)?;
        for selector in selectors {
            soft_delete_tx(&mut tx, selector).await?;
        }
        tx.commit().await.map_err(Error::Database)?;
        Ok(())
    }

    async fn hard_delete(&self, selectors: &[DeleteSelector]) -> Result<()> {
        let mut tx = self.pool.begin().await.map_err(Error::Database)?;
        for selector in selectors {
            hard_delete_tx(&mut tx, selector).await?;
        }
        tx.commit().await.map_err(Error::Database)?;
        Ok(())
    }

    async fn restore(&self, id: i64) -> Result<()> {
        sqlx::query("UPDATE content SET deleted = 0, updated_at = ? WHERE id = ?")
            .bind(Utc::now())
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(())
    }

    async fn create_group(
        &self,
        name: &str,
        kind: GroupKind,
        zotero_keys: &[String],
    ) -> Result<Group> {
        let mut tx = self.pool.begin().await.map_err(Error::Database)?;

        let res = sqlx::query("INSERT INTO groups (name, kind) VALUES (?, ?)")
            .bind(name)
            .bind(kind.as_str())
            .execute(&mut *tx)
            .await
            .map_err(Error::Database)?;
        let group_id = res.last_insert_rowid();

        for key in zotero_keys {
            let content_id: Option<i64> =
                sqlx::query_scalar("SELECT id FROM content WHERE zotero_key = ?")
                    .bind(key)
                    .fetch_optional(&mut *tx)
                    .await
                    .map_err(Error::Database)?;
            if let Some(content_id) = content_id {
                sqlx::query(
                    "INSERT OR IGNORE INTO group_content (group_id, content_id) VALUES (?, ?)",
                )
                .bind(group_id)
                .bind(content_id)
                .execute(&mut *tx)
                .await
                .map_err(Error::Database)?;
            }
        }
        tx.commit().await.map_err(Error::Database)?;

        Ok(Group {
            id: group_id,
            name: name.to_string(),
            kind,
        })
    }

    async fn authors_for(&self, content_id: i64) -> Result<Vec<Author>> {
        let authors = sqlx::query_as::<_, Author>(
            "SELECT a.id, a.first_name, a.last_name FROM authors a \
             JOIN content_authors ca ON ca.author_id = a.id \
             WHERE ca.content_id = ? ORDER BY a.id",
        )
        .bind(content_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;
        Ok(authors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::memory_db;
    use locus_core::ContentRepository;

    fn paper(title: &str, key: &str) -> NormalizedItem {
        NormalizedItem {
            zotero_key: Some(key.to_string()),
            zotero_version: Some(1),
            title: Some(title.to_string()),
            kind: Some(ContentKind::ZoteroEntry),
            authors: vec![AuthorName {
                first_name: "Jane".to_string(),
                last_name: "Doe".to_string(),
            }],
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_batch_and_list() {
        let db = memory_db().await;
        let created = db
            .content
            .create_batch(vec![paper("One", "K1"), paper("Two", "K2")])
            .await
            .unwrap();
        assert_eq!(created.len(), 2);
        assert_eq!(created[0].title, "One");
        assert_eq!(created[0].authors.len(), 1);

        let listed = db.content.list(false).await.unwrap();
        assert_eq!(listed.len(), 2);
    }

    #[tokio::test]
    async fn test_create_batch_is_all_or_nothing() {
        let db = memory_db().await;
        let mut bad = paper("", "K2");
        bad.title = None;

        let result = db
            .content
            .create_batch(vec![paper("One", "K1"), bad, paper("Three", "K3")])
            .await;
        assert!(matches!(result, Err(Error::Validation(_))));

        // Nothing from the failed batch persisted.
        assert!(db.content.list(true).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_batch_duplicate_key_conflict() {
        let db = memory_db().await;
        db.content
            .create_batch(vec![paper("One", "K1")])
            .await
            .unwrap();

        let result = db.content.create_batch(vec![paper("Again", "K1")]).await;
        assert!(matches!(result, Err(Error::Conflict(_))));
        assert_eq!(db.content.list(true).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_author_dedup_across_rows() {
        let db = memory_db().await;
        let created = db
            .content
            .create_batch(vec![paper("One", "K1"), paper("Two", "K2")])
            .await
            .unwrap();

        let a1 = db.content.authors_for(created[0].id).await.unwrap();
        let a2 = db.content.authors_for(created[1].id).await.unwrap();
        assert_eq!(a1.len(), 1);
        assert_eq!(a1[0].id, a2[0].id);

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM authors")
            .fetch_one(&db.pool)
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn test_soft_delete_filters_and_is_reversible() {
        let db = memory_db().await;
        let created = db
            .content
            .create_batch(vec![paper("One", "K1")])
            .await
            .unwrap();
        let id = created[0].id;

        db.content
            .soft_delete(&[DeleteSelector::ZoteroKey("K1".to_string())])
            .await
            .unwrap();

        assert!(db.content.list(false).await.unwrap().is_empty());

        // Still addressable by id and by key, flagged deleted.
        let row = db.content.get(id).await.unwrap().unwrap();
        assert!(row.deleted);
        let row = db.content.get_by_zotero_key("K1").await.unwrap().unwrap();
        assert!(row.deleted);

        db.content.restore(id).await.unwrap();
        assert_eq!(db.content.list(false).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_soft_delete_unknown_key_is_noop() {
        let db = memory_db().await;
        db.content
            .soft_delete(&[DeleteSelector::ZoteroKey("NOPE".to_string())])
            .await
            .unwrap();
        assert!(db.content.list(true).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_hard_delete_removes_row_and_links() {
        let db = memory_db().await;
        let created = db
            .content
            .create_batch(vec![paper("One", "K1")])
            .await
            .unwrap();
        let id = created[0].id;

        db.content
            .hard_delete(&[DeleteSelector::Id(id)])
            .await
            .unwrap();

        assert!(db.content.get(id).await.unwrap().is_none());
        let links: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM content_authors WHERE content_id = ?")
                .bind(id)
                .fetch_one(&db.pool)
                .await
                .unwrap();
        assert_eq!(links, 0);
    }

    #[tokio::test]
    async fn test_update_applies_patch_and_bumps_timestamp() {
        let db = memory_db().await;
        let created = db
            .content
            .create_batch(vec![paper("One", "K1")])
            .await
            .unwrap();
        let id = created[0].id;

        let updated = db
            .content
            .update(
                id,
                ContentPatch {
                    title: Some("Renamed".to_string()),
                    summary: Some("short".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.title, "Renamed");
        assert_eq!(updated.summary.as_deref(), Some("short"));
        // Untouched fields survive.
        assert_eq!(updated.zotero_key.as_deref(), Some("K1"));
        assert!(updated.updated_at >= updated.created_at);
    }

    #[tokio::test]
    async fn test_update_unknown_id_returns_none() {
        let db = memory_db().await;
        let result = db
            .content
            .update(
                999,
                ContentPatch {
                    title: Some("x".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_list_by_kind() {
        let db = memory_db().await;
        let mut highlight = NormalizedItem::of_kind(ContentKind::Highlight);
        highlight.title = Some("H".to_string());
        db.content
            .create_batch(vec![paper("One", "K1"), highlight])
            .await
            .unwrap();

        let highlights = db.content.list_by_kind(ContentKind::Highlight).await.unwrap();
        assert_eq!(highlights.len(), 1);
        assert_eq!(highlights[0].kind, ContentKind::Highlight);
    }

    #[tokio::test]
    async fn test_create_group_resolves_members_by_key() {
        let db = memory_db().await;
        db.content
            .create_batch(vec![paper("One", "K1"), paper("Two", "K2")])
            .await
            .unwrap();

        let group = db
            .content
            .create_group(
                "reading list",
                GroupKind::Folio,
                &["K1".to_string(), "K2".to_string(), "MISSING".to_string()],
            )
            .await
            .unwrap();
        assert_eq!(group.kind, GroupKind::Folio);

        let members: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM group_content WHERE group_id = ?")
                .bind(group.id)
                .fetch_one(&db.pool)
                .await
                .unwrap();
        assert_eq!(members, 2);
    }

    #[tokio::test]
    async fn test_related_content_links_resolvable_ids_only() {
        let db = memory_db().await;
        let base = db
            .content
            .create_batch(vec![paper("One", "K1")])
            .await
            .unwrap();

        let mut note = NormalizedItem::of_kind(ContentKind::Note);
        note.title = Some("N".to_string());
        note.related_ids = vec![base[0].id, 9999];
        let created = db.content.create_batch(vec![note]).await.unwrap();

        let links: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM content_association WHERE content_id1 = ?")
                .bind(created[0].id)
                .fetch_one(&db.pool)
                .await
                .unwrap();
        assert_eq!(links, 1);
    }
}
