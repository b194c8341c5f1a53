//! Error types for the registry.

use hapi_core::{Amount, CoreError, EntityAddress};
use thiserror::Error;

/// Registry error type.
///
/// Every failing check aborts the whole operation; no variant is ever
/// returned after a state mutation has been observed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// Malformed UUID, or a UUID that is not version 4.
    #[error("Invalid UUID: {0}")]
    InvalidUuid(String),

    /// Risk score outside of `0..=10`.
    #[error("Risk score must be in 0..10 range (got {0})")]
    RiskOutOfRange(u8),

    /// Mutation attempted against a closed case.
    #[error("Case closed")]
    CaseClosed,

    /// Confirmation names a case other than the record's own.
    #[error("Case mismatch")]
    CaseMismatch,

    /// Role or ownership check failed.
    #[error("Unauthorized access")]
    Unauthorized,

    /// Caller is not the network or program authority.
    #[error("Authority mismatched")]
    AuthorityMismatch,

    /// Signer is not the reporter's account.
    #[error("Invalid reporter")]
    InvalidReporter,

    /// Lifecycle transition attempted from the wrong state.
    #[error("Invalid reporter status")]
    InvalidReporterStatus,

    /// Unstake attempted before the unlock time.
    #[error("Release epoch is in future (unlocks at {unlock_time}, now {now})")]
    ReleaseEpochInFuture {
        /// When the stake unlocks.
        unlock_time: u64,
        /// Time of the attempt.
        now: u64,
    },

    /// Reporter is frozen by the network authority.
    #[error("Reporter is frozen")]
    FrozenReporter,

    /// A token transfer exceeds the source balance.
    #[error("Insufficient funds: required {required}, available {available}")]
    InsufficientFunds {
        /// Amount the operation needs.
        required: Amount,
        /// Amount held by the source account.
        available: Amount,
    },

    /// Token account holds a different token than the network expects.
    #[error("Invalid token account")]
    InvalidToken,

    /// Token account is not owned by the expected key.
    #[error("Illegal owner")]
    IllegalOwner,

    /// Derived address is already occupied.
    #[error("Account already in use: {0}")]
    DuplicateEntity(EntityAddress),

    /// String exceeds its fixed field width.
    #[error("Buffer too small: {len} bytes do not fit into a {capacity}-byte field")]
    BufferTooSmall {
        /// Length of the rejected input.
        len: usize,
        /// Width of the target field.
        capacity: usize,
    },

    /// Entity does not exist.
    #[error("{0} not found")]
    NotFound(String),

    /// Counter or amount arithmetic overflowed.
    #[error("Arithmetic overflow")]
    ArithmeticOverflow,

    /// Wire enumeration value has no matching variant.
    #[error("Unknown {kind}: {value}")]
    UnknownVariant {
        /// Enumeration name.
        kind: &'static str,
        /// The rejected wire value.
        value: String,
    },

    /// Stored bytes do not decode as the expected record.
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

impl From<CoreError> for RegistryError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InvalidUuid(msg) => RegistryError::InvalidUuid(msg),
            CoreError::BufferTooSmall { len, capacity } => {
                RegistryError::BufferTooSmall { len, capacity }
            }
            CoreError::RiskOutOfRange(risk) => RegistryError::RiskOutOfRange(risk),
            CoreError::UnknownVariant { kind, value } => {
                RegistryError::UnknownVariant { kind, value }
            }
            CoreError::InvalidData(msg) => RegistryError::InvalidData(msg),
            CoreError::InvalidHex => RegistryError::InvalidData("invalid hex encoding".to_string()),
        }
    }
}

/// Result type alias for RegistryError.
pub type Result<T> = std::result::Result<T, RegistryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_errors_keep_their_kind() {
        assert_eq!(
            RegistryError::from(CoreError::RiskOutOfRange(11)),
            RegistryError::RiskOutOfRange(11)
        );
        assert_eq!(
            RegistryError::from(CoreError::BufferTooSmall { len: 33, capacity: 32 }),
            RegistryError::BufferTooSmall { len: 33, capacity: 32 }
        );
        assert!(matches!(
            RegistryError::from(CoreError::InvalidUuid("x".into())),
            RegistryError::InvalidUuid(_)
        ));
    }
}
