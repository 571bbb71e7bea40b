use cosmwasm_schema::cw_serde;
use cosmwasm_std::{Addr, Binary};
use cw_storage_plus::{Item, Map};

pub const CONFIG: Item<OracleConfig> = Item::new("config");
pub const HASHES: Map<u64, StoredBlockHash> = Map::new("hashes");
pub const LATEST_HEIGHT: Item<u64> = Item::new("latest_height");

#[cw_serde]
pub struct OracleConfig {
    pub admin: Addr,
    pub operators: Vec<Addr>,
}

/// Field layout matches `gacha_common::BlockHashResponse`.
#[cw_serde]
pub struct StoredBlockHash {
    pub height: u64,
    /// 32-byte block hash
    pub hash: Binary,
    pub recorded_at_height: u64,
    pub recorded_by: Addr,
}
