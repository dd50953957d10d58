// src/session/lifecycle.rs

use std::sync::Arc;

use super::{SessionSettings, ticket_store::TicketStore};
use crate::{
    error::AppError,
    models::ticket::Ticket,
    utils::{clock::Clock, ticket_id},
};

/// Regenerating on collision is bounded; two clashes in a row means the
/// id source is broken.
const MAX_ID_ATTEMPTS: usize = 3;

/// Opens tickets when a quiz starts and records the real score when it ends.
pub struct TicketLifecycle {
    tickets: Arc<TicketStore>,
    clock: Arc<dyn Clock>,
    settings: SessionSettings,
}

impl TicketLifecycle {
    pub fn new(tickets: Arc<TicketStore>, clock: Arc<dyn Clock>, settings: SessionSettings) -> Self {
        Self {
            tickets,
            clock,
            settings,
        }
    }

    /// Issues a fresh ticket and prunes the store back to the retention cap.
    pub async fn open(&self) -> Result<String, AppError> {
        let now = self.clock.now();
        let expected_total = self.settings.questions_per_quiz;
        let retention = self.settings.retention;

        let (id, pruned) = self
            .tickets
            .transaction(|tickets| {
                let id = (0..MAX_ID_ATTEMPTS)
                    .map(|_| ticket_id::generate(now))
                    .find(|id| !tickets.contains(id))
                    .ok_or_else(|| {
                        AppError::StorageFailure("could not allocate a unique ticket id".to_string())
                    })?;

                tickets.insert(Ticket::new(id.clone(), now, expected_total));
                let pruned = tickets.prune(retention, &id);
                Ok((id, pruned))
            })
            .await
            .map_err(|e| {
                tracing::error!("Failed to open ticket: {:?}", e);
                e
            })?;

        if pruned > 0 {
            tracing::debug!("Pruned {} stale ticket(s)", pruned);
        }
        tracing::info!("Opened ticket {}", id);
        Ok(id)
    }

    /// Records the true final score of a finished quiz.
    ///
    /// * `TicketNotFound` if the ticket was pruned or never issued.
    /// * `InvalidScore` if the score is outside `[0, expected_total]`, or the
    ///   ticket was already completed with a different score.
    ///
    /// Completing again with the same score changes nothing.
    pub async fn complete(&self, id: &str, final_score: i64) -> Result<(), AppError> {
        self.tickets
            .transaction(|tickets| {
                let current = tickets
                    .get(id)
                    .ok_or_else(|| AppError::TicketNotFound(id.to_string()))?;

                if !(0..=current.expected_total).contains(&final_score) {
                    return Err(AppError::InvalidScore(format!(
                        "score {} is outside 0..={}",
                        final_score, current.expected_total
                    )));
                }

                match current.final_score {
                    Some(recorded) if current.completed && recorded == final_score => {
                        return Ok(());
                    }
                    Some(recorded) if current.completed => {
                        return Err(AppError::InvalidScore(format!(
                            "ticket already completed with score {}",
                            recorded
                        )));
                    }
                    _ => {}
                }

                if let Some(ticket) = tickets.get_mut(id) {
                    ticket.final_score = Some(final_score);
                    ticket.completed = true;
                }
                Ok(())
            })
            .await
            .map_err(|e| {
                tracing::warn!("Failed to complete ticket {}: {:?}", id, e);
                e
            })?;

        tracing::info!("Completed ticket {} with score {}", id, final_score);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{store::MemoryKvStore, utils::clock::ManualClock};
    use chrono::{DateTime, Duration};

    fn lifecycle() -> (TicketLifecycle, Arc<TicketStore>, Arc<ManualClock>) {
        let store = Arc::new(TicketStore::new(Arc::new(MemoryKvStore::new())));
        let clock = Arc::new(ManualClock::new(
            DateTime::from_timestamp_millis(1_700_000_000_000).unwrap(),
        ));
        let lifecycle = TicketLifecycle::new(store.clone(), clock.clone(), SessionSettings::default());
        (lifecycle, store, clock)
    }

    #[tokio::test]
    async fn test_open_inserts_fresh_ticket() {
        let (lifecycle, store, clock) = lifecycle();

        let id = lifecycle.open().await.unwrap();
        let ticket = store.get(&id).await.unwrap().unwrap();

        assert_eq!(ticket.created_at, clock.now().timestamp_millis());
        assert_eq!(ticket.expected_total, 10);
        assert_eq!(ticket.final_score, None);
        assert!(!ticket.completed);
        assert!(!ticket.used);
    }

    #[tokio::test]
    async fn test_open_prunes_to_retention_cap() {
        let (lifecycle, store, clock) = lifecycle();

        let mut ids = Vec::new();
        for _ in 0..25 {
            ids.push(lifecycle.open().await.unwrap());
            clock.advance(Duration::milliseconds(1));
        }

        assert_eq!(store.len().await.unwrap(), 20);
        for id in &ids[..5] {
            assert_eq!(store.get(id).await.unwrap(), None);
        }
        for id in &ids[5..] {
            assert!(store.get(id).await.unwrap().is_some());
        }
    }

    #[tokio::test]
    async fn test_open_within_one_millisecond_keeps_every_new_ticket() {
        let (lifecycle, store, _) = lifecycle();

        for _ in 0..200 {
            let id = lifecycle.open().await.unwrap();
            assert!(
                store.get(&id).await.unwrap().is_some(),
                "freshly opened ticket {} was pruned",
                id
            );
        }
        assert_eq!(store.len().await.unwrap(), 20);
    }

    #[tokio::test]
    async fn test_open_after_clock_step_back_keeps_new_ticket() {
        let (lifecycle, store, clock) = lifecycle();
        for _ in 0..20 {
            lifecycle.open().await.unwrap();
            clock.advance(Duration::seconds(1));
        }

        clock.advance(Duration::hours(-1));
        let id = lifecycle.open().await.unwrap();

        assert!(store.get(&id).await.unwrap().is_some());
        assert_eq!(store.len().await.unwrap(), 20);
    }

    #[tokio::test]
    async fn test_complete_records_score() {
        let (lifecycle, store, _) = lifecycle();
        let id = lifecycle.open().await.unwrap();

        lifecycle.complete(&id, 7).await.unwrap();

        let ticket = store.get(&id).await.unwrap().unwrap();
        assert_eq!(ticket.final_score, Some(7));
        assert!(ticket.completed);
        assert!(!ticket.used);
    }

    #[tokio::test]
    async fn test_complete_unknown_ticket() {
        let (lifecycle, _, _) = lifecycle();

        let err = lifecycle.complete("missing", 3).await.unwrap_err();
        assert!(matches!(err, AppError::TicketNotFound(id) if id == "missing"));
    }

    #[tokio::test]
    async fn test_complete_rejects_out_of_range_score() {
        let (lifecycle, store, _) = lifecycle();
        let id = lifecycle.open().await.unwrap();

        assert!(matches!(
            lifecycle.complete(&id, 11).await,
            Err(AppError::InvalidScore(_))
        ));
        assert!(matches!(
            lifecycle.complete(&id, -1).await,
            Err(AppError::InvalidScore(_))
        ));
        assert!(!store.get(&id).await.unwrap().unwrap().completed);
    }

    #[tokio::test]
    async fn test_complete_twice() {
        let (lifecycle, store, _) = lifecycle();
        let id = lifecycle.open().await.unwrap();

        lifecycle.complete(&id, 4).await.unwrap();
        lifecycle.complete(&id, 4).await.unwrap();
        assert!(matches!(
            lifecycle.complete(&id, 9).await,
            Err(AppError::InvalidScore(_))
        ));

        assert_eq!(store.get(&id).await.unwrap().unwrap().final_score, Some(4));
    }
}
