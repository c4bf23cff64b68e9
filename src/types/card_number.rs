use crate::types::errors::CardNumberError;
use serde::{de, Deserialize, Deserializer};
use std::fmt;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

const MIN_DIGITS: usize = 13;
const MAX_DIGITS: usize = 19;

/// A validated payment card number.
///
/// Construction goes through `FromStr`, which enforces the 13 to 19 digit
/// length, digits-only content, and the Luhn checksum. Once built, the value
/// is immutable and safe to use as a store key.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct CardNumber(String);

impl CardNumber {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for CardNumber {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

impl FromStr for CardNumber {
    type Err = CardNumberError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let value = value.trim();

        if value.len() < MIN_DIGITS || value.len() > MAX_DIGITS {
            return Err(CardNumberError::InvalidLength(value.len()));
        }

        if !value.bytes().all(|byte| byte.is_ascii_digit()) {
            return Err(CardNumberError::InvalidCharacter);
        }

        if luhn_checksum(value) != 0 {
            return Err(CardNumberError::ChecksumMismatch);
        }

        Ok(CardNumber(value.to_string()))
    }
}

impl<'de> Deserialize<'de> for CardNumber {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        CardNumber::from_str(&value).map_err(de::Error::custom)
    }
}

/// Standard Luhn mod-10: every second digit from the right is doubled and
/// folded back into a single digit before summing. A valid number sums to 0.
fn luhn_checksum(digits: &str) -> u32 {
    let sum: u32 = digits
        .bytes()
        .rev()
        .enumerate()
        .map(|(index, byte)| {
            let mut digit = u32::from(byte - b'0');
            if index % 2 == 1 {
                digit *= 2;
                if digit > 9 {
                    digit -= 9;
                }
            }
            digit
        })
        .sum();

    sum % 10
}
