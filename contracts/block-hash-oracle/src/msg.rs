use cosmwasm_schema::{cw_serde, QueryResponses};

use crate::state::{OracleConfig, StoredBlockHash};

#[cw_serde]
pub struct InstantiateMsg {
    pub operators: Vec<String>,
}

#[cw_serde]
pub enum ExecuteMsg {
    /// Record the hash of a block that is already behind the chain head.
    RecordBlockHash {
        height: u64,
        /// Hex-encoded 32-byte hash
        hash_hex: String,
    },
    /// Update operator list (admin only).
    UpdateOperators {
        add: Vec<String>,
        remove: Vec<String>,
    },
}

#[cw_serde]
pub struct MigrateMsg {}

#[cw_serde]
#[derive(QueryResponses)]
pub enum QueryMsg {
    #[returns(OracleConfig)]
    Config {},

    #[returns(Option<StoredBlockHash>)]
    BlockHash { height: u64 },

    #[returns(u64)]
    LatestHeight {},
}
