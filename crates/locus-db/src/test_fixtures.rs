//! Shared test fixtures.
//!
//! Always compiled so integration tests in dependent crates can use the
//! in-memory database helper.

use std::time::Duration;

use sqlx::sqlite::SqlitePoolOptions;

use crate::Database;

/// Open a fresh in-memory database with the schema applied.
///
/// The pool is pinned to a single connection: every SQLite `:memory:`
/// connection is its own database, so a second connection would see empty
/// tables.
pub async fn memory_db() -> Database {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .acquire_timeout(Duration::from_secs(5))
        .connect("sqlite::memory:")
        .await
        .expect("open in-memory sqlite");

    Database::from_pool(pool)
        .await
        .expect("apply schema to in-memory sqlite")
}
