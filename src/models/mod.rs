mod card;
mod errors;
#[cfg(test)]
mod tests;
mod transaction;

use serde::Deserialize;
use std::fmt;
use std::fmt::{Display, Formatter};

pub use card::RegularCard;
pub use errors::{ErrorKind, TransactionError};
pub use transaction::{Transaction, TransactionRequest};

/// Outcome of the rule pipeline, ordered by strictness. The derived `Ord`
/// is the ordinal scale feedback corrections are measured on.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Verdict {
    Allowed,
    ManualProcessing,
    Prohibited
}

impl Display for Verdict {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        let label = match self {
            Verdict::Allowed => "ALLOWED",
            Verdict::ManualProcessing => "MANUAL_PROCESSING",
            Verdict::Prohibited => "PROHIBITED"
        };

        write!(formatter, "{label}")
    }
}

/// World Bank region codes carried by every transaction.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum WorldRegion {
    /// East Asia and Pacific
    Eap,
    /// Europe and Central Asia
    Eca,
    /// High-income countries
    Hic,
    /// Latin America and the Caribbean
    Lac,
    /// Middle East and North Africa
    Mena,
    /// South Asia
    Sa,
    /// Sub-Saharan Africa
    Ssa
}
