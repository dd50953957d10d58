// src/session/score_ledger.rs

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::{
    error::AppError,
    models::score_record::ScoreRecord,
    store::{KvStore, SCORES_SLOT},
};

/// Append-only history of confirmed results, kept in the `scores` slot.
pub struct ScoreLedger {
    kv: Arc<dyn KvStore>,
    lock: Mutex<()>,
}

impl ScoreLedger {
    pub fn new(kv: Arc<dyn KvStore>) -> Self {
        Self {
            kv,
            lock: Mutex::new(()),
        }
    }

    pub async fn append(&self, record: ScoreRecord) -> Result<(), AppError> {
        let _guard = self.lock.lock().await;

        let mut records = self.load().await?;
        records.push(record);

        let raw = serde_json::to_string(&records)?;
        self.kv.set(SCORES_SLOT, &raw).await
    }

    /// All records, oldest first.
    pub async fn all(&self) -> Result<Vec<ScoreRecord>, AppError> {
        let _guard = self.lock.lock().await;
        self.load().await
    }

    async fn load(&self) -> Result<Vec<ScoreRecord>, AppError> {
        match self.kv.get(SCORES_SLOT).await? {
            Some(raw) => serde_json::from_str(&raw).map_err(|e| {
                tracing::error!("Slot '{}' is corrupt: {:?}", SCORES_SLOT, e);
                AppError::from(e)
            }),
            None => Ok(Vec::new()),
        }
    }
}
