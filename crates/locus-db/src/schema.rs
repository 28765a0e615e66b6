//! Embedded database schema, applied idempotently at connect time.

use sqlx::SqlitePool;

use locus_core::{Error, Result};

/// DDL for every table, executed with `CREATE TABLE IF NOT EXISTS` so that
/// connecting to an existing database is a no-op.
const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS content (
        id              INTEGER PRIMARY KEY AUTOINCREMENT,
        zotero_key      TEXT UNIQUE,
        zotero_version  INTEGER,
        title           TEXT NOT NULL,
        kind            TEXT NOT NULL,
        metadata        TEXT,
        filename        TEXT,
        summary         TEXT,
        tags            TEXT,
        created_at      TEXT NOT NULL,
        updated_at      TEXT NOT NULL,
        deleted         INTEGER NOT NULL DEFAULT 0
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS authors (
        id          INTEGER PRIMARY KEY AUTOINCREMENT,
        first_name  TEXT NOT NULL,
        last_name   TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS content_authors (
        content_id  INTEGER NOT NULL REFERENCES content(id),
        author_id   INTEGER NOT NULL REFERENCES authors(id),
        PRIMARY KEY (content_id, author_id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS content_association (
        content_id1 INTEGER NOT NULL REFERENCES content(id),
        content_id2 INTEGER NOT NULL REFERENCES content(id),
        PRIMARY KEY (content_id1, content_id2)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS groups (
        id      INTEGER PRIMARY KEY AUTOINCREMENT,
        name    TEXT NOT NULL,
        kind    TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS group_content (
        group_id    INTEGER NOT NULL REFERENCES groups(id),
        content_id  INTEGER NOT NULL REFERENCES content(id),
        PRIMARY KEY (group_id, content_id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id              INTEGER PRIMARY KEY AUTOINCREMENT,
        username        TEXT NOT NULL UNIQUE,
        password_hash   TEXT NOT NULL,
        active          INTEGER NOT NULL DEFAULT 1,
        author_id       INTEGER NOT NULL REFERENCES authors(id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS zotero_version (
        id          INTEGER PRIMARY KEY AUTOINCREMENT,
        version     INTEGER NOT NULL,
        recorded_at TEXT NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_content_kind ON content(kind)",
    "CREATE INDEX IF NOT EXISTS idx_content_deleted ON content(deleted)",
];

/// Apply the embedded schema to the given pool.
pub async fn init_schema(pool: &SqlitePool) -> Result<()> {
    for ddl in SCHEMA {
        sqlx::query(ddl)
            .execute(pool)
            .await
            .map_err(Error::Database)?;
    }
    Ok(())
}
