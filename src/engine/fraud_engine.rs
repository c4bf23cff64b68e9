use std::collections::{BTreeSet, HashSet};
use std::str::FromStr;
use std::sync::Arc;

use chrono::Duration;

use crate::config::TransactionPolicy;
use crate::models::{RegularCard, Transaction, TransactionError, TransactionRequest, Verdict, WorldRegion};
use crate::storage::{RegularCardStore, StolenCardRegistry, SuspiciousIpRegistry, TransactionStore};
use crate::types::{CardNumber, TransactionId};

/// Reason tokens reported in a transaction's explanation.
///
/// The derived ordering matches the alphabetical order of the wire
/// spellings, which fixes the rendering order of combined explanations.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd)]
enum Reason {
    Amount,
    CardNumber,
    Ip,
    Region
}

impl Reason {
    fn token(self) -> &'static str {
        match self {
            Reason::Amount => "amount",
            Reason::CardNumber => "card-number",
            Reason::Ip => "ip",
            Reason::Region => "region"
        }
    }
}

/// Verdict plus the deduplicated set of reasons that produced it.
struct Decision {
    verdict: Verdict,
    reasons: BTreeSet<Reason>
}

impl Decision {
    fn clear(verdict: Verdict) -> Self {
        Self {
            verdict,
            reasons: BTreeSet::new()
        }
    }

    fn flagged(verdict: Verdict, reason: Reason) -> Self {
        Self {
            verdict,
            reasons: BTreeSet::from([reason])
        }
    }

    fn explanation(&self) -> String {
        if self.reasons.is_empty() {
            return "none".to_string();
        }

        self.reasons.iter()
            .map(|reason| reason.token())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// The admission-control engine.
///
/// Holds the read-only policy and the collaborator stores; every call is
/// request-scoped and keeps no state of its own between calls.
pub struct FraudEngine {
    policy: TransactionPolicy,
    transactions: Arc<dyn TransactionStore>,
    cards: Arc<dyn RegularCardStore>,
    stolen_cards: Arc<dyn StolenCardRegistry>,
    suspicious_ips: Arc<dyn SuspiciousIpRegistry>
}

impl FraudEngine {
    /// Creates an engine over the provided policy and collaborators.
    pub fn new(
        policy: TransactionPolicy,
        transactions: Arc<dyn TransactionStore>,
        cards: Arc<dyn RegularCardStore>,
        stolen_cards: Arc<dyn StolenCardRegistry>,
        suspicious_ips: Arc<dyn SuspiciousIpRegistry>
    ) -> Self {
        Self {
            policy,
            transactions,
            cards,
            stolen_cards,
            suspicious_ips
        }
    }

    /// Runs the rule pipeline over a request and persists the decided
    /// transaction.
    ///
    /// # Errors
    /// Only infrastructure failures from the collaborator stores; a
    /// prohibited payment is a verdict, not an error.
    pub fn process(&self, request: TransactionRequest) -> Result<Transaction, TransactionError> {
        let decision = self.decide(&request)?;
        let explanation = decision.explanation();
        let transaction = Transaction::evaluated(request, decision.verdict, explanation);

        Ok(self.transactions.save(transaction)?)
    }

    /// Applies an analyst correction to a stored transaction and
    /// recalibrates the card's limits.
    ///
    /// # Errors
    /// Returns `TransactionNotFound` for an unknown id,
    /// `FeedbackAlreadyProvided` when the transaction was corrected before,
    /// and `FeedbackMatchesVerdict` for a no-op correction.
    pub fn give_feedback(&self, transaction_id: TransactionId, proposed: Verdict) -> Result<Transaction, TransactionError> {
        let mut transaction = self.transactions.find_by_id(transaction_id)?
            .ok_or_else(|| TransactionError::transaction_not_found(transaction_id))?;

        if transaction.feedback.is_some() {
            return Err(TransactionError::feedback_already_provided(transaction_id));
        }

        if proposed == transaction.verdict {
            return Err(TransactionError::feedback_matches_verdict(transaction_id, proposed));
        }

        let mut card = self.card_for(&transaction.card_number)?;
        card.register_feedback(transaction.verdict, proposed, &self.policy)?;
        self.cards.save(card)?;

        transaction.feedback = Some(proposed);

        Ok(self.transactions.save(transaction)?)
    }

    /// Stored transactions for one card, insertion order.
    ///
    /// # Errors
    /// `TransactionsNotFound` for a blank number or a card without
    /// transactions; a malformed number is `InvalidCardNumber`.
    pub fn history_for_card(&self, card_number: &str) -> Result<Vec<Transaction>, TransactionError> {
        if card_number.trim().is_empty() {
            return Err(TransactionError::transactions_not_found(card_number));
        }

        let card_number = CardNumber::from_str(card_number)?;
        let transactions = self.transactions.find_by_card(&card_number)?;

        if transactions.is_empty() {
            return Err(TransactionError::transactions_not_found(card_number.as_str()));
        }

        Ok(transactions)
    }

    /// Every stored transaction, insertion order. Empty stores yield an
    /// empty list.
    pub fn history(&self) -> Result<Vec<Transaction>, TransactionError> {
        Ok(self.transactions.find_all()?)
    }

    fn decide(&self, request: &TransactionRequest) -> Result<Decision, TransactionError> {
        if self.stolen_cards.exists(&request.card_number)? {
            return Ok(Decision::flagged(Verdict::Prohibited, Reason::CardNumber));
        }

        let mut reasons = BTreeSet::new();

        let window = self.transactions.find_by_card_in_window(
            &request.card_number,
            request.timestamp - Duration::hours(1),
            request.timestamp
        )?;

        let mut origins: HashSet<&str> = window.iter().map(|transaction| transaction.ip.as_str()).collect();
        origins.insert(request.ip.as_str());

        let mut regions: HashSet<WorldRegion> = window.iter().map(|transaction| transaction.region).collect();
        regions.insert(request.region);

        if origins.len() > self.policy.correlation_threshold {
            reasons.insert(Reason::Ip);
        }

        if regions.len() > self.policy.correlation_threshold {
            reasons.insert(Reason::Region);
        }

        if self.suspicious_ips.exists(&request.ip)? {
            reasons.insert(Reason::Ip);
        }

        if !reasons.is_empty() {
            return Ok(Decision {
                verdict: Verdict::Prohibited,
                reasons
            });
        }

        let card = self.card_for(&request.card_number)?;

        if request.amount <= card.allowed_limit {
            Ok(Decision::clear(Verdict::Allowed))
        } else if request.amount <= card.manual_processing_limit {
            Ok(Decision::flagged(Verdict::ManualProcessing, Reason::Amount))
        } else {
            Ok(Decision::flagged(Verdict::Prohibited, Reason::Amount))
        }
    }

    /// Limit row for a card, provisioned with policy defaults on first
    /// reference.
    fn card_for(&self, card_number: &CardNumber) -> Result<RegularCard, TransactionError> {
        match self.cards.find_by_number(card_number)? {
            Some(card) => Ok(card),
            None => Ok(self.cards.save(RegularCard::new(card_number.clone(), &self.policy))?)
        }
    }
}
