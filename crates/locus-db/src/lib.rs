//! # locus-db
//!
//! SQLite database layer for locus.
//!
//! This crate provides:
//! - Connection pool management
//! - An embedded, idempotent schema
//! - Repository implementations for content, users, and the version ledger
//! - Transaction-level helpers the sync reconciler composes
//!
//! ## Example
//!
//! ```rust,ignore
//! use locus_db::Database;
//! use locus_core::ContentRepository;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::connect("sqlite://locus.db").await?;
//!     let papers = db.content.list(false).await?;
//!     println!("{} content rows", papers.len());
//!     Ok(())
//! }
//! ```

pub mod content;
pub mod pool;
pub mod schema;
pub mod users;
pub mod versions;

// Test fixtures for integration tests in dependent crates.
pub mod test_fixtures;

// Re-export core types
pub use locus_core::*;

pub use content::{
    insert_item_tx, merge_item_tx, resolve_author_tx, soft_delete_tx, SqliteContentRepository,
};
pub use pool::{create_pool, create_pool_with_config, PoolConfig};
pub use schema::init_schema;
pub use users::SqliteUserRepository;
pub use versions::SqliteVersionLedger;

/// Combined database context with all repositories.
#[derive(Clone)]
pub struct Database {
    /// The underlying connection pool.
    pub pool: sqlx::SqlitePool,
    /// Content repository for CRUD, batch, and delete operations.
    pub content: SqliteContentRepository,
    /// Append-only remote-version ledger (the sync watermark).
    pub versions: SqliteVersionLedger,
    /// User account repository.
    pub users: SqliteUserRepository,
}

impl Database {
    /// Build a Database from an existing pool, applying the schema.
    pub async fn from_pool(pool: sqlx::SqlitePool) -> Result<Self> {
        schema::init_schema(&pool).await?;
        Ok(Self {
            content: SqliteContentRepository::new(pool.clone()),
            versions: SqliteVersionLedger::new(pool.clone()),
            users: SqliteUserRepository::new(pool.clone()),
            pool,
        })
    }

    /// Connect to the given database URL and apply the schema.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = create_pool(database_url).await?;
        Self::from_pool(pool).await
    }
}
