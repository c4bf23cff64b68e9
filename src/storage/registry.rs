use dashmap::DashSet;

use crate::storage::{StolenCardRegistry, StorageError, SuspiciousIpRegistry};
use crate::types::CardNumber;

/// Membership set for cards reported stolen.
pub struct StolenCardStorage {
    cache: DashSet<CardNumber>
}

impl StolenCardStorage {
    pub fn new() -> Self {
        Self {
            cache: DashSet::new()
        }
    }
}

impl StolenCardRegistry for StolenCardStorage {
    fn exists(&self, card_number: &CardNumber) -> Result<bool, StorageError> {
        Ok(self.cache.contains(card_number))
    }

    fn add(&self, card_number: CardNumber) -> Result<bool, StorageError> {
        Ok(self.cache.insert(card_number))
    }

    fn remove(&self, card_number: &CardNumber) -> Result<bool, StorageError> {
        Ok(self.cache.remove(card_number).is_some())
    }
}

/// Membership set for addresses flagged as elevated risk.
pub struct SuspiciousIpStorage {
    cache: DashSet<String>
}

impl SuspiciousIpStorage {
    pub fn new() -> Self {
        Self {
            cache: DashSet::new()
        }
    }
}

impl SuspiciousIpRegistry for SuspiciousIpStorage {
    fn exists(&self, ip: &str) -> Result<bool, StorageError> {
        Ok(self.cache.contains(ip))
    }

    fn add(&self, ip: String) -> Result<bool, StorageError> {
        Ok(self.cache.insert(ip))
    }

    fn remove(&self, ip: &str) -> Result<bool, StorageError> {
        Ok(self.cache.remove(ip).is_some())
    }
}
