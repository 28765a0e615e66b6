//! The merge algorithm: apply a batch of upserts and deletions to the
//! content store as one failure-atomic unit.

use std::time::Instant;

use tracing::{info, warn};

use locus_core::{DeleteSelector, Error, MatchKey, NormalizedItem, Result};
use locus_db::{content, Database};

/// Applies normalized item batches against the content store.
///
/// One reconcile call maps to one database transaction: any error rolls
/// back every change from the call before it is returned, so no partial
/// application of a sync round is ever observable.
#[derive(Clone)]
pub struct Reconciler {
    db: Database,
}

impl Reconciler {
    /// Create a new reconciler over the given database.
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Upsert `upserts` and soft-delete `deletions`, matching rows on
    /// `match_key`.
    ///
    /// Upserts apply in batch order, so a key appearing twice resolves to
    /// the later occurrence's fields. Deletions for keys unknown locally
    /// are silent no-ops. Sync never hard-deletes.
    pub async fn reconcile(
        &self,
        upserts: &[NormalizedItem],
        deletions: &[NormalizedItem],
        match_key: MatchKey,
    ) -> Result<()> {
        let start = Instant::now();
        let mut tx = self.db.pool.begin().await.map_err(Error::Database)?;

        for item in upserts {
            if let Err(e) = content::merge_item_tx(&mut tx, item, match_key).await {
                warn!(
                    subsystem = "sync",
                    component = "reconciler",
                    op = "reconcile",
                    zotero_key = item.zotero_key.as_deref().unwrap_or(""),
                    error = %e,
                    "Upsert failed, rolling back reconcile batch"
                );
                tx.rollback().await.map_err(Error::Database)?;
                return Err(e);
            }
        }

        for item in deletions {
            let Some(selector) = DeleteSelector::for_item(item) else {
                continue;
            };
            if let Err(e) = content::soft_delete_tx(&mut tx, &selector).await {
                tx.rollback().await.map_err(Error::Database)?;
                return Err(e);
            }
        }

        tx.commit().await.map_err(Error::Database)?;

        info!(
            subsystem = "sync",
            component = "reconciler",
            op = "reconcile",
            item_count = upserts.len(),
            deleted_count = deletions.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Reconcile batch applied"
        );
        Ok(())
    }
}
