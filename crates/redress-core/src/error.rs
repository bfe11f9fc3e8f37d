use thiserror::Error;

#[derive(Debug, Error)]
pub enum RedressError {
    #[error("wave {wave} for {bureau} mixes furnishers: expected '{expected}', found '{found}'")]
    MixedFurnisherBatch {
        bureau: String,
        wave: u32,
        expected: String,
        found: String,
    },

    #[error("cannot materialize a batch with no actions")]
    EmptyBatch,

    #[error("invalid evidence kind: {0}")]
    InvalidEvidenceKind(String),

    #[error("invalid risk level: {0}")]
    InvalidRiskLevel(String),

    #[error("invalid lock reason: {0}")]
    InvalidLockReason(String),

    #[error("invalid unlock reason: {0}")]
    InvalidUnlockReason(String),
}

pub type Result<T> = std::result::Result<T, RedressError>;
