//! Message shapes for the contracts the rack talks to.

use cosmwasm_schema::cw_serde;
use cosmwasm_std::{Addr, Binary};

/// Execute interface expected from the collectible (prize token) contract.
#[cw_serde]
pub enum CollectibleExecuteMsg {
    /// Mint one item of `token_type` to `owner`. The new item id must be
    /// reported as a `token_id` attribute on the `wasm` event.
    Mint { owner: String, token_type: u64 },
}

/// Query interface expected from the collectible (prize token) contract.
#[cw_serde]
pub enum CollectibleQueryMsg {
    /// Number of registered item types; valid types are `0..count`.
    TokenTypeCount {},
}

/// Query interface of the block hash oracle.
#[cw_serde]
pub enum OracleQueryMsg {
    BlockHash { height: u64 },
}

/// Mirrors the oracle's stored record for a block.
#[cw_serde]
pub struct BlockHashResponse {
    pub height: u64,
    pub hash: Binary,
    pub recorded_at_height: u64,
    pub recorded_by: Addr,
}

impl BlockHashResponse {
    pub fn hash_hex(&self) -> String {
        hex::encode(self.hash.as_slice())
    }
}
