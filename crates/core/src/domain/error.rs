// Domain Error Types

use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum DomainError {
    #[error("Invalid print job state transition: {from} -> {to}")]
    InvalidStateTransition { from: String, to: String },

    #[error("Print job {0} has already been redeemed")]
    AlreadyRedeemed(String),

    #[error("Print job {job_id} is not assigned to shop {shop_id}")]
    ShopMismatch { job_id: i64, shop_id: i64 },

    #[error("location not found")]
    LocationUnavailable,

    #[error("Validation error: {0}")]
    ValidationError(String),
}

pub type Result<T> = std::result::Result<T, DomainError>;
