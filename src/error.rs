use crate::domain::account::{Balance, Principal};
use crate::domain::clock::Timestamp;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TestamentError {
    #[error("The account {0} is already registered")]
    AlreadyRegistered(Principal),
    #[error("The account {0} is not registered")]
    NotRegistered(Principal),
    #[error("Subscription of {owner} still valid until {expires_at}")]
    SubscriptionStillValid {
        owner: Principal,
        expires_at: Timestamp,
    },
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error("Transfer of {amount} from {from} to {to} rejected: {reason}")]
    TransferRejected {
        from: Principal,
        to: Principal,
        amount: Balance,
        reason: String,
    },
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[cfg(feature = "storage-rocksdb")]
    #[error("Storage error: {0}")]
    StorageError(#[from] rocksdb::Error),
    #[error("Internal error: {0}")]
    InternalError(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl TestamentError {
    /// Expected, non-fatal refusals. State is untouched when these are returned.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            Self::AlreadyRegistered(_)
                | Self::NotRegistered(_)
                | Self::SubscriptionStillValid { .. }
                | Self::ValidationError(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, TestamentError>;
