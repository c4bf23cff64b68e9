use thiserror::Error;

#[derive(Debug, Error)]
pub enum CardNumberError {
    #[error("Card number error: expected 13 to 19 digits, found {0} characters")]
    InvalidLength(usize),
    #[error("Card number error: contains a non-digit character")]
    InvalidCharacter,
    #[error("Card number error: Luhn checksum mismatch")]
    ChecksumMismatch
}
