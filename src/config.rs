use rust_decimal::Decimal;
use serde::Deserialize;

use crate::types::Amount;

/// Process-wide tuning for the rule pipeline and feedback adjustment.
///
/// Built once at startup and read-only afterwards; the engine never mutates
/// it.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TransactionPolicy {
    /// Allowed limit given to newly provisioned cards.
    pub allowed_limit: Amount,
    /// Manual-processing limit given to newly provisioned cards.
    pub manual_processing_limit: Amount,
    /// Distinct IPs or regions tolerated inside the correlation window.
    pub correlation_threshold: usize,
    /// Ratio applied when feedback loosens a limit.
    pub increase_ratio: Decimal,
    /// Ratio applied when feedback tightens a limit.
    pub decrease_ratio: Decimal
}

impl Default for TransactionPolicy {
    fn default() -> Self {
        Self {
            allowed_limit: 200,
            manual_processing_limit: 1500,
            correlation_threshold: 3,
            increase_ratio: Decimal::new(8, 1),
            decrease_ratio: Decimal::new(2, 1)
        }
    }
}
