//! # locus-sync
//!
//! Incremental library synchronization engine for locus.
//!
//! This crate provides:
//! - Remote library abstraction and the Zotero Web API v3 client
//! - Item adapter normalizing remote and locally authored items
//! - Reconciler applying upsert/delete batches as one transaction
//! - Sync orchestrator driving full and incremental pull cycles

pub mod adapter;
pub mod orchestrator;
pub mod reconciler;
pub mod remote;
pub mod zotero;

pub use adapter::{normalize_document, normalize_library_item, LocalDocument, StorageFormat};
pub use orchestrator::SyncOrchestrator;
pub use reconciler::Reconciler;
pub use remote::{ChangeSet, RemoteItem, RemoteLibrary};
pub use zotero::{ZoteroClient, ZoteroConfig};
