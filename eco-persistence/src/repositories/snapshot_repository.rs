use anyhow::Result;
use async_trait::async_trait;
use eco_core::{LedgerStorage, StorageError};
use eco_types::LedgerSnapshot;
use sea_orm::{ActiveValue, DatabaseConnection, EntityTrait, QueryOrder};
use tracing::debug;

use crate::entities::{ledger_snapshots, prelude::*};

/// Ledger snapshots stored one row per storage key.
#[derive(Clone)]
pub struct SnapshotRepository {
    db: DatabaseConnection,
}

impl SnapshotRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn find_snapshot(&self, storage_key: &str) -> Result<Option<LedgerSnapshot>> {
        let model = LedgerSnapshots::find_by_id(storage_key.to_string())
            .one(&self.db)
            .await?;

        match model {
            Some(model) => Ok(Some(serde_json::from_str(&model.payload)?)),
            None => Ok(None),
        }
    }

    pub async fn save_snapshot(&self, storage_key: &str, snapshot: &LedgerSnapshot) -> Result<()> {
        let payload = serde_json::to_string(snapshot)?;
        self.save_payload(storage_key, payload).await
    }

    /// Write a raw payload, replacing whatever the key held before.
    pub async fn save_payload(&self, storage_key: &str, payload: String) -> Result<()> {
        let now = chrono::Utc::now().into();
        let existing = LedgerSnapshots::find_by_id(storage_key.to_string())
            .one(&self.db)
            .await?;

        match existing {
            Some(model) => {
                let updated = ledger_snapshots::ActiveModel {
                    storage_key: ActiveValue::Unchanged(model.storage_key),
                    payload: ActiveValue::Set(payload),
                    updated_at: ActiveValue::Set(now),
                };
                LedgerSnapshots::update(updated).exec(&self.db).await?;
            }
            None => {
                let created = ledger_snapshots::ActiveModel {
                    storage_key: ActiveValue::Set(storage_key.to_string()),
                    payload: ActiveValue::Set(payload),
                    updated_at: ActiveValue::Set(now),
                };
                LedgerSnapshots::insert(created).exec(&self.db).await?;
            }
        }

        debug!("Saved ledger snapshot {}", storage_key);
        Ok(())
    }

    pub async fn list_keys(&self) -> Result<Vec<String>> {
        let models = LedgerSnapshots::find()
            .order_by_asc(ledger_snapshots::Column::StorageKey)
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(|m| m.storage_key).collect())
    }
}

fn storage_error(error: anyhow::Error) -> StorageError {
    match error.downcast::<serde_json::Error>() {
        Ok(json) => StorageError::Encoding(json),
        Err(other) => StorageError::Backend(other.to_string()),
    }
}

#[async_trait]
impl LedgerStorage for SnapshotRepository {
    async fn load(&self, key: &str) -> Result<Option<LedgerSnapshot>, StorageError> {
        self.find_snapshot(key).await.map_err(storage_error)
    }

    async fn save(&self, key: &str, snapshot: &LedgerSnapshot) -> Result<(), StorageError> {
        self.save_snapshot(key, snapshot).await.map_err(storage_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::connect_to_memory_database;
    use eco_core::RewardCalculator;
    use eco_types::NewDetection;
    use uuid::Uuid;

    async fn setup_test_db() -> SnapshotRepository {
        let db = connect_to_memory_database().await.unwrap();
        SnapshotRepository::new(db)
    }

    fn snapshot_with(bottles: &[u32]) -> LedgerSnapshot {
        let records = bottles
            .iter()
            .enumerate()
            .map(|(i, b)| {
                RewardCalculator::create_record(NewDetection::manual(*b), Uuid::new_v4(), i as i64)
            })
            .collect();

        LedgerSnapshot {
            records,
            ..LedgerSnapshot::default()
        }
    }

    #[tokio::test]
    async fn test_missing_key_is_none() {
        let repo = setup_test_db().await;
        assert!(repo.find_snapshot("nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_then_replace() {
        let repo = setup_test_db().await;

        let first = snapshot_with(&[1, 2]);
        repo.save_snapshot("ecotrack-storage:a", &first).await.unwrap();
        assert_eq!(
            repo.find_snapshot("ecotrack-storage:a").await.unwrap(),
            Some(first)
        );

        let second = snapshot_with(&[1, 2, 3]);
        repo.save_snapshot("ecotrack-storage:a", &second).await.unwrap();
        let found = repo.find_snapshot("ecotrack-storage:a").await.unwrap().unwrap();
        assert_eq!(found.records.len(), 3);

        assert_eq!(repo.list_keys().await.unwrap(), vec!["ecotrack-storage:a"]);
    }

    #[tokio::test]
    async fn test_keys_are_isolated() {
        let repo = setup_test_db().await;

        repo.save_snapshot("ecotrack-storage:b", &snapshot_with(&[5]))
            .await
            .unwrap();
        repo.save_snapshot("ecotrack-storage:a", &snapshot_with(&[1, 1]))
            .await
            .unwrap();

        let a = repo.find_snapshot("ecotrack-storage:a").await.unwrap().unwrap();
        let b = repo.find_snapshot("ecotrack-storage:b").await.unwrap().unwrap();
        assert_eq!(a.records.len(), 2);
        assert_eq!(b.records[0].bottles, 5);
        assert_eq!(
            repo.list_keys().await.unwrap(),
            vec!["ecotrack-storage:a", "ecotrack-storage:b"]
        );
    }

    #[tokio::test]
    async fn test_corrupt_payload_maps_to_encoding_error() {
        let repo = setup_test_db().await;
        repo.save_payload("broken", "{\"records\": 12".to_string())
            .await
            .unwrap();

        let result = LedgerStorage::load(&repo, "broken").await;
        assert!(matches!(result, Err(StorageError::Encoding(_))));
    }
}
