use thiserror::Error;

use crate::models::Verdict;
use crate::storage::StorageError;
use crate::types::{CardNumber, CardNumberError, TransactionId};

/// Coarse failure classes callers branch on when shaping a response.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Conflict,
    Infrastructure
}

#[derive(Debug, Error)]
pub enum TransactionError {
    #[error("Transaction [{transaction_id}] was not found")]
    TransactionNotFound {
        transaction_id: TransactionId
    },
    #[error("Feedback already provided for transaction [{transaction_id}]")]
    FeedbackAlreadyProvided {
        transaction_id: TransactionId
    },
    #[error("Feedback for transaction [{transaction_id}] matches the existing verdict [{verdict}]")]
    FeedbackMatchesVerdict {
        transaction_id: TransactionId,
        verdict: Verdict
    },
    #[error("No transactions found for card number [{card_number}]")]
    TransactionsNotFound {
        card_number: String
    },
    #[error("Limit adjustment left the representable range for card number [{card_number}]")]
    LimitOverflow {
        card_number: CardNumber
    },
    #[error(transparent)]
    InvalidCardNumber(#[from] CardNumberError),
    #[error(transparent)]
    Storage(#[from] StorageError)
}

impl TransactionError {
    //NOTE: I know this is not seen in Rust as often but I did not like seeing every call site
    //      rebuild the same context-carrying variants; these factories keep the construction in
    //      one place.

    pub fn transaction_not_found(transaction_id: TransactionId) -> Self {
        Self::TransactionNotFound { transaction_id }
    }

    pub fn feedback_already_provided(transaction_id: TransactionId) -> Self {
        Self::FeedbackAlreadyProvided { transaction_id }
    }

    pub fn feedback_matches_verdict(transaction_id: TransactionId, verdict: Verdict) -> Self {
        Self::FeedbackMatchesVerdict {
            transaction_id,
            verdict
        }
    }

    pub fn transactions_not_found(card_number: &str) -> Self {
        Self::TransactionsNotFound {
            card_number: card_number.to_string()
        }
    }

    pub fn limit_overflow(card_number: &CardNumber) -> Self {
        Self::LimitOverflow {
            card_number: card_number.clone()
        }
    }

    /// Maps the failure onto the taxonomy callers use to pick a response.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::TransactionNotFound { .. } | Self::TransactionsNotFound { .. } => ErrorKind::NotFound,
            Self::FeedbackAlreadyProvided { .. } | Self::FeedbackMatchesVerdict { .. } => ErrorKind::Conflict,
            Self::InvalidCardNumber(_) => ErrorKind::Validation,
            Self::LimitOverflow { .. } | Self::Storage(_) => ErrorKind::Infrastructure
        }
    }
}
