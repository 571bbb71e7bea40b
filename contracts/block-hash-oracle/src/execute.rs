use cosmwasm_std::{Binary, DepsMut, Env, Event, MessageInfo, Response};

use crate::error::ContractError;
use crate::state::{StoredBlockHash, CONFIG, HASHES, LATEST_HEIGHT};

/// Record the hash of a past block. Only operators can call this.
/// A recorded hash is never overwritten.
pub fn record_block_hash(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    height: u64,
    hash_hex: String,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;

    if !config.operators.contains(&info.sender) {
        return Err(ContractError::Unauthorized {
            reason: "only operators can record block hashes".to_string(),
        });
    }

    // The current block's hash is not known while it executes
    if height >= env.block.height {
        return Err(ContractError::BlockNotFinal {
            height,
            current: env.block.height,
        });
    }

    if HASHES.has(deps.storage, height) {
        return Err(ContractError::HashAlreadyRecorded { height });
    }

    let hash = hex::decode(&hash_hex).map_err(|_| ContractError::InvalidHex {
        field: "hash_hex".to_string(),
    })?;
    if hash.len() != 32 {
        return Err(ContractError::InvalidHashLength { got: hash.len() });
    }
    if hash.iter().all(|b| *b == 0) {
        return Err(ContractError::ZeroHash { height });
    }

    let stored = StoredBlockHash {
        height,
        hash: Binary::from(hash),
        recorded_at_height: env.block.height,
        recorded_by: info.sender.clone(),
    };
    HASHES.save(deps.storage, height, &stored)?;

    let current_latest = LATEST_HEIGHT.may_load(deps.storage)?.unwrap_or(0);
    if height > current_latest {
        LATEST_HEIGHT.save(deps.storage, &height)?;
    }

    Ok(Response::new()
        .add_attribute("action", "record_block_hash")
        .add_attribute("height", height.to_string())
        .add_attribute("recorded_by", info.sender.to_string())
        .add_event(
            Event::new("gacha_block_hash_recorded")
                .add_attribute("height", height.to_string())
                .add_attribute("hash", hash_hex.to_lowercase())
                .add_attribute("recorded_by", info.sender.to_string())
                .add_attribute("recorded_at_height", env.block.height.to_string()),
        ))
}

/// Update the operator list. Admin only.
pub fn update_operators(
    deps: DepsMut,
    _env: Env,
    info: MessageInfo,
    add: Vec<String>,
    remove: Vec<String>,
) -> Result<Response, ContractError> {
    let mut config = CONFIG.load(deps.storage)?;

    if info.sender != config.admin {
        return Err(ContractError::Unauthorized {
            reason: "only admin can update operators".to_string(),
        });
    }

    for addr_str in &remove {
        let addr = deps.api.addr_validate(addr_str)?;
        config.operators.retain(|a| a != &addr);
    }

    for addr_str in &add {
        let addr = deps.api.addr_validate(addr_str)?;
        if !config.operators.contains(&addr) {
            config.operators.push(addr);
        }
    }

    CONFIG.save(deps.storage, &config)?;

    Ok(Response::new()
        .add_attribute("action", "update_operators")
        .add_attribute("added", add.join(","))
        .add_attribute("removed", remove.join(",")))
}
