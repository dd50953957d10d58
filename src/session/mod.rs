// src/session/mod.rs

//! Session-ticket hand-off between "quiz finished" and "results shown".
//!
//! A ticket is opened when a quiz starts, completed with the true score when
//! it ends, and redeemed exactly once by the results screen. Redemption
//! only confirms the score the caller claims against the one recorded at
//! completion; on success the confirmed score is appended to the history.

pub mod lifecycle;
pub mod score_ledger;
pub mod ticket_store;
pub mod validator;

use std::sync::Arc;
use std::time::Duration;

use crate::{
    config::{DEFAULT_QUESTIONS_PER_QUIZ, DEFAULT_TICKET_RETENTION, DEFAULT_TICKET_TTL_SECS},
    error::AppError,
    models::{
        redemption::{Redemption, ResultsClaim},
        score_record::ScoreRecord,
        ticket::Ticket,
    },
    store::KvStore,
    utils::clock::Clock,
};

use lifecycle::TicketLifecycle;
use score_ledger::ScoreLedger;
use ticket_store::TicketStore;
use validator::RedemptionValidator;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSettings {
    /// How long after opening a ticket may still be redeemed.
    pub ticket_ttl: Duration,
    /// Tickets kept before the oldest are discarded.
    pub retention: usize,
    pub questions_per_quiz: i64,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            ticket_ttl: Duration::from_secs(DEFAULT_TICKET_TTL_SECS),
            retention: DEFAULT_TICKET_RETENTION,
            questions_per_quiz: DEFAULT_QUESTIONS_PER_QUIZ,
        }
    }
}

/// Entry point for the quiz and results flows.
pub struct SessionService {
    tickets: Arc<TicketStore>,
    ledger: Arc<ScoreLedger>,
    lifecycle: TicketLifecycle,
    validator: RedemptionValidator,
    settings: SessionSettings,
}

impl SessionService {
    pub fn new(kv: Arc<dyn KvStore>, clock: Arc<dyn Clock>, settings: SessionSettings) -> Self {
        let tickets = Arc::new(TicketStore::new(kv.clone()));
        let ledger = Arc::new(ScoreLedger::new(kv));

        Self {
            lifecycle: TicketLifecycle::new(tickets.clone(), clock.clone(), settings),
            validator: RedemptionValidator::new(tickets.clone(), ledger.clone(), clock, settings),
            tickets,
            ledger,
            settings,
        }
    }

    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    /// Called when a quiz starts.
    pub async fn open(&self) -> Result<String, AppError> {
        self.lifecycle.open().await
    }

    /// Called when a quiz ends, with the score the quiz itself computed.
    pub async fn complete(&self, id: &str, final_score: i64) -> Result<(), AppError> {
        self.lifecycle.complete(id, final_score).await
    }

    /// Called by the results screen with whatever parameters it was given.
    pub async fn redeem(&self, claim: &ResultsClaim) -> Result<Redemption, AppError> {
        self.validator.redeem(claim).await
    }

    /// Score history, oldest first.
    pub async fn history(&self) -> Result<Vec<ScoreRecord>, AppError> {
        self.ledger.all().await
    }

    pub async fn ticket(&self, id: &str) -> Result<Option<Ticket>, AppError> {
        self.tickets.get(id).await
    }
}
