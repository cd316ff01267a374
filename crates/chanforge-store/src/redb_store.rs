use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use chanforge_domain::{ChannelMetadata, ChannelStatus};
use redb::{Database, ReadableTable, TableDefinition};

use crate::error::RepositoryError;
use crate::store::MetadataRepository;

const CHANNELS: TableDefinition<&str, &[u8]> = TableDefinition::new("channels");

/// Persistent repository backed by a redb database file.
///
/// All channel metadata survives process restarts. Suitable for single-node
/// production use.
#[derive(Clone)]
pub struct RedbRepository {
    db: Arc<Database>,
}

impl RedbRepository {
    /// Open (or create) a redb database at `path`.
    ///
    /// Parent directories are created automatically.
    pub fn open(path: &Path) -> Result<Self, RepositoryError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| RepositoryError::Internal(e.to_string()))?;
        }
        let db = Database::create(path).map_err(|e| RepositoryError::Internal(e.to_string()))?;

        {
            let wtxn = db.begin_write().map_err(|e| RepositoryError::Internal(e.to_string()))?;
            wtxn.open_table(CHANNELS).map_err(|e| RepositoryError::Internal(e.to_string()))?;
            wtxn.commit().map_err(|e| RepositoryError::Internal(e.to_string()))?;
        }

        Ok(Self { db: Arc::new(db) })
    }
}

#[async_trait]
impl MetadataRepository for RedbRepository {
    async fn find_by_content_id(
        &self,
        content_id: &str,
    ) -> Result<Option<ChannelMetadata>, RepositoryError> {
        let rtxn = self.db.begin_read().map_err(|e| RepositoryError::Internal(e.to_string()))?;
        let table = rtxn.open_table(CHANNELS).map_err(|e| RepositoryError::Internal(e.to_string()))?;
        match table.get(content_id).map_err(|e| RepositoryError::Internal(e.to_string()))? {
            Some(guard) => Ok(Some(serde_json::from_slice(guard.value())?)),
            None => Ok(None),
        }
    }

    async fn upsert(&self, record: &ChannelMetadata) -> Result<(), RepositoryError> {
        let bytes = serde_json::to_vec(record)?;
        let wtxn = self.db.begin_write().map_err(|e| RepositoryError::Internal(e.to_string()))?;
        {
            let mut table = wtxn.open_table(CHANNELS).map_err(|e| RepositoryError::Internal(e.to_string()))?;
            table
                .insert(record.content_id.as_str(), bytes.as_slice())
                .map_err(|e| RepositoryError::Internal(e.to_string()))?;
        }
        wtxn.commit().map_err(|e| RepositoryError::Internal(e.to_string()))?;
        Ok(())
    }

    async fn list_failed(&self, limit: u32) -> Result<Vec<ChannelMetadata>, RepositoryError> {
        let rtxn = self.db.begin_read().map_err(|e| RepositoryError::Internal(e.to_string()))?;
        let table = rtxn.open_table(CHANNELS).map_err(|e| RepositoryError::Internal(e.to_string()))?;
        let mut failed = Vec::new();
        for entry in table.iter().map_err(|e| RepositoryError::Internal(e.to_string()))? {
            let (_k, v) = entry.map_err(|e| RepositoryError::Internal(e.to_string()))?;
            let record: ChannelMetadata = serde_json::from_slice(v.value())?;
            if record.status == ChannelStatus::Failed {
                failed.push(record);
            }
        }
        failed.sort_by_key(|m| m.last_provisioned_at);
        failed.truncate(limit as usize);
        Ok(failed)
    }
}
