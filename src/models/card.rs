use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::config::TransactionPolicy;
use crate::models::errors::TransactionError;
use crate::models::Verdict;
use crate::types::{Amount, CardNumber};

/// Per-card admission thresholds.
///
/// Rows are provisioned with policy defaults the first time a card is seen
/// and afterwards mutated exclusively through `register_feedback`. The
/// invariant `manual_processing_limit > allowed_limit` holds after every
/// adjustment.
#[derive(Debug, Clone)]
pub struct RegularCard {
    /// The card this row belongs to.
    pub number: CardNumber,
    /// Amounts at or below this limit pass without review.
    pub allowed_limit: Amount,
    /// Amounts above `allowed_limit` but at or below this limit go to
    /// manual review; anything above is prohibited.
    pub manual_processing_limit: Amount
}

impl RegularCard {
    /// Provisions a fresh row with the process-wide default limits.
    pub fn new(number: CardNumber, policy: &TransactionPolicy) -> Self {
        Self {
            number,
            allowed_limit: policy.allowed_limit,
            manual_processing_limit: policy.manual_processing_limit
        }
    }

    /// Moves the limits toward the analyst's judgment.
    ///
    /// A correction toward a stricter verdict tightens, toward a laxer one
    /// loosens. `allowed_limit` moves when ALLOWED is an endpoint of the
    /// correction, `manual_processing_limit` when PROHIBITED is. Deltas are
    /// the limit's own value scaled by the configured ratio, rounded up.
    ///
    /// # Errors
    /// Returns `TransactionError::LimitOverflow` when a checked adjustment
    /// leaves the representable range.
    pub fn register_feedback(&mut self, verdict: Verdict, feedback: Verdict, policy: &TransactionPolicy) -> Result<(), TransactionError> {
        if feedback > verdict {
            if verdict == Verdict::Allowed {
                self.allowed_limit = self.decreased(self.allowed_limit, policy.decrease_ratio)?;
            }

            if feedback == Verdict::Prohibited {
                self.manual_processing_limit = self.decreased(self.manual_processing_limit, policy.decrease_ratio)?;
            }
        } else {
            if feedback == Verdict::Allowed {
                self.allowed_limit = self.increased(self.allowed_limit, policy.increase_ratio)?;
            }

            if verdict == Verdict::Prohibited {
                self.manual_processing_limit = self.increased(self.manual_processing_limit, policy.increase_ratio)?;
            }
        }

        if self.manual_processing_limit <= self.allowed_limit {
            self.manual_processing_limit = self.allowed_limit.checked_add(1)
                .ok_or_else(|| TransactionError::limit_overflow(&self.number))?;
        }

        Ok(())
    }

    fn increased(&self, limit: Amount, ratio: Decimal) -> Result<Amount, TransactionError> {
        limit.checked_add(self.delta(limit, ratio)?)
            .ok_or_else(|| TransactionError::limit_overflow(&self.number))
    }

    fn decreased(&self, limit: Amount, ratio: Decimal) -> Result<Amount, TransactionError> {
        limit.checked_sub(self.delta(limit, ratio)?)
            .ok_or_else(|| TransactionError::limit_overflow(&self.number))
    }

    fn delta(&self, limit: Amount, ratio: Decimal) -> Result<Amount, TransactionError> {
        (Decimal::from(limit) * ratio)
            .ceil()
            .to_u64()
            .ok_or_else(|| TransactionError::limit_overflow(&self.number))
    }
}
