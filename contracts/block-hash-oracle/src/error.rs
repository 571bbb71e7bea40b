use cosmwasm_std::StdError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ContractError {
    #[error("{0}")]
    Std(#[from] StdError),

    #[error("unauthorized: {reason}")]
    Unauthorized { reason: String },

    #[error("hash for block {height} already recorded")]
    HashAlreadyRecorded { height: u64 },

    #[error("block {height} is not in the past (current height {current})")]
    BlockNotFinal { height: u64, current: u64 },

    #[error("invalid hex input: {field}")]
    InvalidHex { field: String },

    #[error("invalid hash length: expected 32 bytes, got {got}")]
    InvalidHashLength { got: usize },

    #[error("hash for block {height} must not be zero")]
    ZeroHash { height: u64 },
}
