// src/session/validator.rs

use std::sync::Arc;

use chrono::{DateTime, Utc};

use super::{SessionSettings, score_ledger::ScoreLedger, ticket_store::TicketStore};
use crate::{
    error::AppError,
    models::{
        redemption::{Redemption, RejectionReason, ResultsClaim},
        score_record::ScoreRecord,
        ticket::Ticket,
    },
    utils::clock::Clock,
};

/// Decides whether a results-screen request may see its score.
///
/// The caller's score and total are never displayed as given: they are only
/// compared against the values recorded at completion.
pub struct RedemptionValidator {
    tickets: Arc<TicketStore>,
    ledger: Arc<ScoreLedger>,
    clock: Arc<dyn Clock>,
    settings: SessionSettings,
}

impl RedemptionValidator {
    pub fn new(
        tickets: Arc<TicketStore>,
        ledger: Arc<ScoreLedger>,
        clock: Arc<dyn Clock>,
        settings: SessionSettings,
    ) -> Self {
        Self {
            tickets,
            ledger,
            clock,
            settings,
        }
    }

    /// Consumes the ticket named in `claim` if every check passes.
    ///
    /// `Err` means storage could not be read or the ticket could not be
    /// marked used; callers must treat it as a rejection. A failed ledger
    /// append after a successful mark is logged and does not undo acceptance.
    pub async fn redeem(&self, claim: &ResultsClaim) -> Result<Redemption, AppError> {
        let Some(id) = claim.ticket.as_deref() else {
            tracing::warn!("Rejected results access without a ticket");
            return Ok(Redemption::Rejected(RejectionReason::SessionMissing));
        };

        let now = self.clock.now();
        let ttl_millis = i64::try_from(self.settings.ticket_ttl.as_millis()).unwrap_or(i64::MAX);

        let verdict = self
            .tickets
            .transaction(|tickets| {
                let verdict = match tickets.get(id) {
                    Some(ticket) => check(ticket, claim, now, ttl_millis),
                    None => Err(RejectionReason::SessionMissing),
                };
                if verdict.is_ok() {
                    if let Some(ticket) = tickets.get_mut(id) {
                        ticket.used = true;
                    }
                }
                Ok(verdict)
            })
            .await
            .map_err(|e| {
                tracing::error!("Redemption of ticket {} failed in storage: {:?}", id, e);
                e
            })?;

        let (score, total_questions) = match verdict {
            Ok(confirmed) => confirmed,
            Err(reason) => {
                tracing::warn!("Rejected ticket {}: {}", id, reason);
                return Ok(Redemption::Rejected(reason));
            }
        };

        let record = ScoreRecord {
            score,
            total_questions,
            timestamp: now,
        };
        if let Err(e) = self.ledger.append(record.clone()).await {
            tracing::error!("Ticket {} redeemed but score history append failed: {:?}", id, e);
        }

        tracing::info!("Redeemed ticket {} ({}/{})", id, score, total_questions);
        Ok(Redemption::Accepted(record))
    }
}

/// Runs the redemption checks in order and returns the stored
/// `(final_score, expected_total)` when all of them hold.
fn check(
    ticket: &Ticket,
    claim: &ResultsClaim,
    now: DateTime<Utc>,
    ttl_millis: i64,
) -> Result<(i64, i64), RejectionReason> {
    if ticket.used {
        return Err(RejectionReason::AlreadyUsed);
    }
    if !ticket.completed {
        return Err(RejectionReason::NotCompleted);
    }

    let final_score = match (ticket.final_score, claim.score, claim.total) {
        (Some(recorded), Some(score), Some(total))
            if recorded == score && ticket.expected_total == total =>
        {
            recorded
        }
        _ => return Err(RejectionReason::ParamsTampered),
    };

    if ticket.age_millis(now) > ttl_millis {
        return Err(RejectionReason::Expired);
    }

    Ok((final_score, ticket.expected_total))
}
