use cosmwasm_std::{OverflowError, StdError, Uint128};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ContractError {
    #[error("{0}")]
    Std(#[from] StdError),

    #[error("{0}")]
    Overflow(#[from] OverflowError),

    #[error("unauthorized: {reason}")]
    Unauthorized { reason: String },

    #[error("game {game_id} does not exist")]
    InvalidGameId { game_id: u64 },

    #[error("flow denominator must be non-zero")]
    ZeroDenominator,

    #[error("flow numerator and denominator must not exceed {max}")]
    PrecisionOverflow { max: u128 },

    #[error("prize length mismatch: {types} types, {weights} weights")]
    PrizeLengthMismatch { types: usize, weights: usize },

    #[error("token type {token_type} does not exist (type count: {count})")]
    NonexistentTokenType { token_type: u64, count: u64 },

    #[error("prize weight for token type {token_type} must be non-zero")]
    ZeroPrizeWeight { token_type: u64 },

    #[error("blocks to reveal must be at least 1")]
    InvalidRevealDelay,

    #[error("game {game_id} is already activated")]
    GameActivated { game_id: u64 },

    #[error("game {game_id} is not activated")]
    GameNotActivated { game_id: u64 },

    #[error("draw count {count} must be between 1 and {max}")]
    InvalidDrawCount { count: u64, max: u64 },

    #[error("at most {max} draws can be revealed per call, got {count}")]
    TooManyDraws { count: u64, max: u64 },

    #[error("draw {draw_id} not found")]
    DrawNotFound { draw_id: u64 },

    #[error("draw {draw_id} is not revealable until block {revealable_block} (current: {current})")]
    NotRevealable {
        draw_id: u64,
        revealable_block: u64,
        current: u64,
    },

    #[error("draw {draw_id} is already revealed")]
    AlreadyRevealed { draw_id: u64 },

    #[error("draw {draw_id} does not belong to {buyer}")]
    NotDrawOwner { draw_id: u64, buyer: String },

    #[error("insufficient supply: requested {requested}, available {available}")]
    InsufficientSupply {
        requested: u64,
        available: Uint128,
    },

    #[error("draw price {price} is above the limit {limit}")]
    PriceAboveLimit { price: Uint128, limit: Uint128 },

    #[error("game {game_id} has no prize weight to draw from")]
    ZeroTotalWeight { game_id: u64 },

    #[error("token id already recorded for draw {draw_id}")]
    TokenIdAlreadyRecorded { draw_id: u64 },

    #[error("insufficient funds: need {needed}, sent {sent}")]
    InsufficientFunds { needed: Uint128, sent: Uint128 },

    #[error("unexpected funds in denom {denom}")]
    UnexpectedFunds { denom: String },

    #[error("no entropy available for block {height}")]
    EntropyUnavailable { height: u64 },

    #[error("invalid mint reply: {reason}")]
    InvalidMintReply { reason: String },

    #[error("unknown reply id {id}")]
    UnknownReplyId { id: u64 },
}

/// Coarse classification of failures, useful to callers deciding whether
/// a retry can succeed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Caller lacks the management capability
    Authorization,
    /// Malformed or out-of-range input
    Validation,
    /// Well-formed input rejected by the current state
    State,
    /// A collaborator (bank, oracle, collectible, host) failed
    Collaborator,
}

impl ContractError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ContractError::Unauthorized { .. } => ErrorKind::Authorization,

            ContractError::InvalidGameId { .. }
            | ContractError::ZeroDenominator
            | ContractError::PrecisionOverflow { .. }
            | ContractError::PrizeLengthMismatch { .. }
            | ContractError::NonexistentTokenType { .. }
            | ContractError::ZeroPrizeWeight { .. }
            | ContractError::InvalidRevealDelay
            | ContractError::GameActivated { .. }
            | ContractError::InvalidDrawCount { .. }
            | ContractError::TooManyDraws { .. }
            | ContractError::DrawNotFound { .. } => ErrorKind::Validation,

            ContractError::NotRevealable { .. }
            | ContractError::AlreadyRevealed { .. }
            | ContractError::NotDrawOwner { .. }
            | ContractError::InsufficientSupply { .. }
            | ContractError::PriceAboveLimit { .. }
            | ContractError::ZeroTotalWeight { .. }
            | ContractError::GameNotActivated { .. }
            | ContractError::TokenIdAlreadyRecorded { .. } => ErrorKind::State,

            ContractError::InsufficientFunds { .. }
            | ContractError::UnexpectedFunds { .. }
            | ContractError::EntropyUnavailable { .. }
            | ContractError::InvalidMintReply { .. }
            | ContractError::UnknownReplyId { .. }
            | ContractError::Std(_)
            | ContractError::Overflow(_) => ErrorKind::Collaborator,
        }
    }
}
