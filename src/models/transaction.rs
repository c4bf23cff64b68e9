use chrono::NaiveDateTime;

use crate::models::{Verdict, WorldRegion};
use crate::types::{Amount, CardNumber, TransactionId};

/// An admission request before evaluation.
///
/// This struct captures the raw payment data handed to the rule pipeline.
/// Amount, origin and timestamp are already validated at the ingestion
/// boundary; the engine only decides.
#[derive(Debug, Clone)]
pub struct TransactionRequest {
    /// Monetary amount of the attempted payment.
    pub amount: Amount,
    /// Originating address in dotted-quad form.
    pub ip: String,
    /// The card the payment is drawn against.
    pub card_number: CardNumber,
    /// World region the payment originates from.
    pub region: WorldRegion,
    /// Wall-clock time of the attempt.
    pub timestamp: NaiveDateTime
}

/// A decided transaction as persisted in the transaction log.
#[derive(Debug, Clone)]
pub struct Transaction {
    /// Store-assigned identity; `None` until first persisted.
    pub id: Option<TransactionId>,
    pub amount: Amount,
    pub ip: String,
    pub card_number: CardNumber,
    pub region: WorldRegion,
    pub timestamp: NaiveDateTime,
    /// Outcome of the rule pipeline.
    pub verdict: Verdict,
    /// Reason tokens behind the verdict, `none` when no rule fired.
    pub explanation: String,
    /// Analyst correction. Set at most once and never equal to the verdict.
    pub feedback: Option<Verdict>
}

impl Transaction {
    /// Builds the record to persist for an evaluated request.
    pub fn evaluated(request: TransactionRequest, verdict: Verdict, explanation: String) -> Self {
        Self {
            id: None,
            amount: request.amount,
            ip: request.ip,
            card_number: request.card_number,
            region: request.region,
            timestamp: request.timestamp,
            verdict,
            explanation,
            feedback: None
        }
    }
}
