// src/session/ticket_store.rs

use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::{
    error::AppError,
    models::ticket::Ticket,
    store::{KvStore, PENDING_SESSIONS_SLOT},
};

/// In-memory view of the `pendingSessions` slot for the duration of one
/// transaction. Tracks whether anything changed so read-only transactions
/// skip the write-back.
#[derive(Debug, Default)]
pub struct Tickets {
    map: BTreeMap<String, Ticket>,
    dirty: bool,
}

impl Tickets {
    pub fn get(&self, id: &str) -> Option<&Ticket> {
        self.map.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Ticket> {
        let ticket = self.map.get_mut(id);
        if ticket.is_some() {
            self.dirty = true;
        }
        ticket
    }

    pub fn contains(&self, id: &str) -> bool {
        self.map.contains_key(id)
    }

    pub fn insert(&mut self, ticket: Ticket) {
        self.map.insert(ticket.id.clone(), ticket);
        self.dirty = true;
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Keeps at most `cap` tickets and drops the rest, whatever their state.
    /// `keep` always survives; the remaining places go to the most recently
    /// created tickets, ties on `created_at` keeping the larger id.
    /// Returns the number of tickets removed.
    pub fn prune(&mut self, cap: usize, keep: &str) -> usize {
        if self.map.len() <= cap {
            return 0;
        }

        let mut by_age: Vec<(i64, String)> = self
            .map
            .values()
            .filter(|t| t.id != keep)
            .map(|t| (t.created_at, t.id.clone()))
            .collect();
        by_age.sort_unstable_by(|a, b| b.cmp(a));

        let others_kept = if self.map.contains_key(keep) {
            cap.saturating_sub(1)
        } else {
            cap
        };

        let mut removed = 0;
        for (_, id) in by_age.into_iter().skip(others_kept) {
            self.map.remove(&id);
            removed += 1;
        }
        self.dirty = true;
        removed
    }
}

/// Persistent ticket id → ticket mapping.
///
/// All access goes through [`TicketStore::transaction`], which holds a lock
/// across load, mutation and save so concurrent callers never overwrite each
/// other's changes to the shared slot.
pub struct TicketStore {
    kv: Arc<dyn KvStore>,
    lock: Mutex<()>,
}

impl TicketStore {
    pub fn new(kv: Arc<dyn KvStore>) -> Self {
        Self {
            kv,
            lock: Mutex::new(()),
        }
    }

    /// Runs `f` against the current tickets. Changes are persisted only when
    /// `f` succeeds and touched something.
    pub async fn transaction<R, F>(&self, f: F) -> Result<R, AppError>
    where
        F: FnOnce(&mut Tickets) -> Result<R, AppError>,
    {
        let _guard = self.lock.lock().await;

        let mut tickets = self.load().await?;
        let result = f(&mut tickets)?;

        if tickets.dirty {
            self.save(&tickets).await?;
        }
        Ok(result)
    }

    pub async fn get(&self, id: &str) -> Result<Option<Ticket>, AppError> {
        self.transaction(|tickets| Ok(tickets.get(id).cloned())).await
    }

    pub async fn len(&self) -> Result<usize, AppError> {
        self.transaction(|tickets| Ok(tickets.len())).await
    }

    async fn load(&self) -> Result<Tickets, AppError> {
        let map = match self.kv.get(PENDING_SESSIONS_SLOT).await? {
            Some(raw) => serde_json::from_str(&raw).map_err(|e| {
                tracing::error!("Slot '{}' is corrupt: {:?}", PENDING_SESSIONS_SLOT, e);
                AppError::from(e)
            })?,
            None => BTreeMap::new(),
        };
        Ok(Tickets { map, dirty: false })
    }

    async fn save(&self, tickets: &Tickets) -> Result<(), AppError> {
        let raw = serde_json::to_string(&tickets.map)?;
        self.kv.set(PENDING_SESSIONS_SLOT, &raw).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryKvStore;

    fn ticket(id: &str, created_at: i64) -> Ticket {
        Ticket {
            id: id.to_string(),
            created_at,
            expected_total: 10,
            final_score: None,
            completed: false,
            used: false,
        }
    }

    #[test]
    fn test_prune_keeps_newest() {
        let mut tickets = Tickets::default();
        for i in 0..5 {
            tickets.insert(ticket(&format!("t{}", i), i));
        }

        assert_eq!(tickets.prune(3, "t4"), 2);
        assert_eq!(tickets.len(), 3);
        assert!(!tickets.contains("t0"));
        assert!(!tickets.contains("t1"));
        assert!(tickets.contains("t4"));
    }

    #[test]
    fn test_prune_spares_kept_ticket_on_tied_timestamps() {
        let mut tickets = Tickets::default();
        for id in ["m", "n", "o", "p"] {
            tickets.insert(ticket(id, 5));
        }
        tickets.insert(ticket("a", 5));

        assert_eq!(tickets.prune(3, "a"), 2);
        assert!(tickets.contains("a"));
        assert!(tickets.contains("p"));
        assert!(tickets.contains("o"));
    }

    #[test]
    fn test_prune_spares_kept_ticket_with_older_timestamp() {
        let mut tickets = Tickets::default();
        for i in 0..4 {
            tickets.insert(ticket(&format!("t{}", i), 100 + i));
        }
        tickets.insert(ticket("rewound", 1));

        assert_eq!(tickets.prune(2, "rewound"), 3);
        assert!(tickets.contains("rewound"));
        assert!(tickets.contains("t3"));
    }

    #[test]
    fn test_prune_under_cap_is_noop() {
        let mut tickets = Tickets::default();
        tickets.insert(ticket("a", 1));
        tickets.dirty = false;

        assert_eq!(tickets.prune(20, "a"), 0);
        assert!(!tickets.dirty);
    }

    #[tokio::test]
    async fn test_absent_slot_is_empty() {
        let store = TicketStore::new(Arc::new(MemoryKvStore::new()));
        assert_eq!(store.len().await.unwrap(), 0);
        assert_eq!(store.get("nope").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_failed_transaction_is_not_persisted() {
        let store = TicketStore::new(Arc::new(MemoryKvStore::new()));

        let result: Result<(), AppError> = store
            .transaction(|tickets| {
                tickets.insert(ticket("a", 1));
                Err(AppError::InvalidScore("nope".to_string()))
            })
            .await;

        assert!(result.is_err());
        assert_eq!(store.get("a").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_slot_uses_camel_case_layout() {
        let kv = Arc::new(MemoryKvStore::new());
        let store = TicketStore::new(kv.clone());

        store
            .transaction(|tickets| {
                tickets.insert(ticket("a", 42));
                Ok(())
            })
            .await
            .unwrap();

        let raw = kv.get(PENDING_SESSIONS_SLOT).await.unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["a"]["createdAt"], 42);
        assert_eq!(value["a"]["expectedTotal"], 10);
        assert_eq!(value["a"]["used"], false);
    }

    #[tokio::test]
    async fn test_corrupt_slot_is_storage_failure() {
        let kv = Arc::new(MemoryKvStore::new());
        kv.set(PENDING_SESSIONS_SLOT, "{not json").await.unwrap();
        let store = TicketStore::new(kv);

        let err = store.get("a").await.unwrap_err();
        assert!(matches!(err, AppError::StorageFailure(_)));
    }
}
