use std::sync::atomic::{AtomicU64, Ordering};

use chrono::NaiveDateTime;
use dashmap::DashMap;

use crate::models::Transaction;
use crate::storage::{StorageError, TransactionStore};
use crate::types::{CardNumber, TransactionId};

/// In-memory transaction log keyed by id.
///
/// Ids come from a monotonic counter, so sorting by id recovers insertion
/// order for the history operations.
pub struct TransactionStorage {
    cache: DashMap<TransactionId, Transaction>,
    next_id: AtomicU64
}

impl TransactionStorage {
    pub fn new() -> Self {
        Self {
            cache: DashMap::new(),
            next_id: AtomicU64::new(1)
        }
    }

    fn collect_sorted<F>(&self, filter: F) -> Vec<Transaction>
    where
        F: Fn(&Transaction) -> bool,
    {
        let mut matches: Vec<Transaction> = self.cache.iter()
            .filter(|entry| filter(entry.value()))
            .map(|entry| entry.value().clone())
            .collect();

        matches.sort_by_key(|transaction| transaction.id);

        matches
    }
}

impl TransactionStore for TransactionStorage {
    fn save(&self, mut transaction: Transaction) -> Result<Transaction, StorageError> {
        let id = match transaction.id {
            Some(id) => id,
            None => {
                let id = self.next_id.fetch_add(1, Ordering::Relaxed);
                transaction.id = Some(id);
                id
            }
        };

        self.cache.insert(id, transaction.clone());

        Ok(transaction)
    }

    fn find_by_id(&self, transaction_id: TransactionId) -> Result<Option<Transaction>, StorageError> {
        Ok(self.cache.get(&transaction_id).map(|entry| entry.value().clone()))
    }

    fn find_by_card_in_window(&self, card_number: &CardNumber, from: NaiveDateTime, to: NaiveDateTime) -> Result<Vec<Transaction>, StorageError> {
        Ok(self.collect_sorted(|transaction| {
            transaction.card_number == *card_number
                && transaction.timestamp >= from
                && transaction.timestamp <= to
        }))
    }

    fn find_by_card(&self, card_number: &CardNumber) -> Result<Vec<Transaction>, StorageError> {
        Ok(self.collect_sorted(|transaction| transaction.card_number == *card_number))
    }

    fn find_all(&self) -> Result<Vec<Transaction>, StorageError> {
        Ok(self.collect_sorted(|_| true))
    }
}
