mod card_storage;
mod registry;
mod transaction_storage;

use chrono::NaiveDateTime;
use thiserror::Error;

use crate::models::{RegularCard, Transaction};
use crate::types::{CardNumber, TransactionId};

pub use card_storage::CardStorage;
pub use registry::{StolenCardStorage, SuspiciousIpStorage};
pub use transaction_storage::TransactionStorage;

/// Raised when a backing store is unreachable. The engine propagates these
/// untouched; retry policy belongs to the caller.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage error: {0}")]
    Unavailable(String)
}

/// Cards reported stolen. Existence alone means "reject everything".
///
/// `add` and `remove` belong to the administrative surface; the engine only
/// calls `exists`.
pub trait StolenCardRegistry: Send + Sync + 'static {
    fn exists(&self, card_number: &CardNumber) -> Result<bool, StorageError>;
    /// Registers a card; false when it was already present.
    fn add(&self, card_number: CardNumber) -> Result<bool, StorageError>;
    /// Removes a card; false when it was absent.
    fn remove(&self, card_number: &CardNumber) -> Result<bool, StorageError>;
}

/// Addresses flagged as elevated risk. Same ownership split as the stolen
/// card registry.
pub trait SuspiciousIpRegistry: Send + Sync + 'static {
    fn exists(&self, ip: &str) -> Result<bool, StorageError>;
    /// Flags an address; false when it was already present.
    fn add(&self, ip: String) -> Result<bool, StorageError>;
    /// Clears an address; false when it was absent.
    fn remove(&self, ip: &str) -> Result<bool, StorageError>;
}

/// Per-card limit rows.
pub trait RegularCardStore: Send + Sync + 'static {
    fn find_by_number(&self, card_number: &CardNumber) -> Result<Option<RegularCard>, StorageError>;
    fn save(&self, card: RegularCard) -> Result<RegularCard, StorageError>;
}

/// The append-mostly transaction log.
pub trait TransactionStore: Send + Sync + 'static {
    /// Persists the transaction, assigning an id when it has none yet.
    fn save(&self, transaction: Transaction) -> Result<Transaction, StorageError>;
    fn find_by_id(&self, transaction_id: TransactionId) -> Result<Option<Transaction>, StorageError>;
    /// Transactions for a card with timestamps inside `[from, to]`, both
    /// bounds inclusive, in insertion order.
    fn find_by_card_in_window(&self, card_number: &CardNumber, from: NaiveDateTime, to: NaiveDateTime) -> Result<Vec<Transaction>, StorageError>;
    fn find_by_card(&self, card_number: &CardNumber) -> Result<Vec<Transaction>, StorageError>;
    fn find_all(&self) -> Result<Vec<Transaction>, StorageError>;
}
