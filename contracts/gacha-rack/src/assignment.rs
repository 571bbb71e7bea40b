use cosmwasm_std::{Addr, StdResult, Storage};

use crate::state::{GameAssignment, ASSIGNMENTS, ASSIGNMENT_COUNT, ASSIGNMENT_INDEX, RACK_STATE};

/// The game `user` buys from: their explicit assignment, else the default.
pub fn current_game_for(storage: &dyn Storage, user: &Addr) -> StdResult<u64> {
    match ASSIGNMENT_INDEX.may_load(storage, user)? {
        Some(index) => Ok(ASSIGNMENTS.load(storage, index)?.game_id),
        None => Ok(RACK_STATE.load(storage)?.default_game_id),
    }
}

pub fn assignment_count(storage: &dyn Storage) -> StdResult<u64> {
    Ok(ASSIGNMENT_COUNT.may_load(storage)?.unwrap_or(0))
}

/// Insert or overwrite the assignment for `user`. Returns the slot used.
pub fn assign(storage: &mut dyn Storage, user: &Addr, game_id: u64) -> StdResult<u64> {
    let entry = GameAssignment {
        user: user.clone(),
        game_id,
    };
    if let Some(index) = ASSIGNMENT_INDEX.may_load(storage, user)? {
        ASSIGNMENTS.save(storage, index, &entry)?;
        return Ok(index);
    }

    let index = assignment_count(storage)?;
    ASSIGNMENTS.save(storage, index, &entry)?;
    ASSIGNMENT_INDEX.save(storage, user, &index)?;
    ASSIGNMENT_COUNT.save(storage, &(index + 1))?;
    Ok(index)
}

/// Remove the assignment for `user`, moving the last entry into its slot.
/// Returns false when the user had none.
pub fn clear(storage: &mut dyn Storage, user: &Addr) -> StdResult<bool> {
    let Some(index) = ASSIGNMENT_INDEX.may_load(storage, user)? else {
        return Ok(false);
    };

    let last = assignment_count(storage)?.saturating_sub(1);
    if index != last {
        let moved = ASSIGNMENTS.load(storage, last)?;
        ASSIGNMENT_INDEX.save(storage, &moved.user, &index)?;
        ASSIGNMENTS.save(storage, index, &moved)?;
    }
    ASSIGNMENTS.remove(storage, last);
    ASSIGNMENT_INDEX.remove(storage, user);
    ASSIGNMENT_COUNT.save(storage, &last)?;
    Ok(true)
}
