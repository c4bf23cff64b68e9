use dashmap::DashMap;

use crate::models::RegularCard;
use crate::storage::{RegularCardStore, StorageError};
use crate::types::CardNumber;

/// In-memory per-card limit rows keyed by card number.
pub struct CardStorage {
    cache: DashMap<CardNumber, RegularCard>
}

impl CardStorage {
    pub fn new() -> Self {
        Self {
            cache: DashMap::new()
        }
    }
}

impl RegularCardStore for CardStorage {
    fn find_by_number(&self, card_number: &CardNumber) -> Result<Option<RegularCard>, StorageError> {
        Ok(self.cache.get(card_number).map(|entry| entry.value().clone()))
    }

    fn save(&self, card: RegularCard) -> Result<RegularCard, StorageError> {
        self.cache.insert(card.number.clone(), card.clone());

        Ok(card)
    }
}
