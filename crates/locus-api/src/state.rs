//! Application state shared across handlers.

use std::path::PathBuf;
use std::sync::Arc;

use locus_db::Database;
use locus_inference::ChatBackend;
use locus_sync::SyncOrchestrator;

/// State handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    /// Streaming chat backend.
    pub chat: Arc<dyn ChatBackend>,
    /// Remote library sync driver.
    pub sync: Arc<SyncOrchestrator>,
    /// Directory holding stored attachment and document files.
    pub files_dir: PathBuf,
}
