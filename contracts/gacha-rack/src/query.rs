use cosmwasm_std::{to_json_binary, Binary, Deps, Env, Order, StdResult, Uint128};
use cw_storage_plus::Bound;

use crate::assignment::{assignment_count, current_game_for};
use crate::msg::{
    AssignmentEntry, DrawResponse, GameInfoResponse, PrizesResponse, UserDrawsResponse,
};
use crate::state::{
    Game, ASSIGNMENTS, ASSIGNMENT_INDEX, CONFIG, DRAWS, GAMES, RACK_STATE, USER_DRAWS,
    USER_DRAW_COUNT,
};

fn game_info(game: &Game, height: u64) -> GameInfoResponse {
    GameInfoResponse {
        game_id: game.id,
        draw_price: game.draw_price,
        blocks_to_reveal: game.blocks_to_reveal,
        activated: game.activated,
        total_weight: game.total_weight,
        prize_count: game.prizes.len() as u64,
        draw_count: game.draw_count,
        available_supply: game.available_supply(height),
    }
}

/// Supply of a game that may not exist yet; missing games have none.
fn available_for_game(deps: Deps, env: &Env, game_id: u64) -> StdResult<Uint128> {
    Ok(GAMES
        .may_load(deps.storage, game_id)?
        .map(|game| game.available_supply(env.block.height))
        .unwrap_or_default())
}

pub fn query_config(deps: Deps) -> StdResult<Binary> {
    let config = CONFIG.load(deps.storage)?;
    to_json_binary(&config)
}

pub fn query_rack_state(deps: Deps) -> StdResult<Binary> {
    let state = RACK_STATE.load(deps.storage)?;
    to_json_binary(&state)
}

pub fn query_game_count(deps: Deps) -> StdResult<Binary> {
    let state = RACK_STATE.load(deps.storage)?;
    to_json_binary(&state.game_count)
}

pub fn query_current_game(deps: Deps) -> StdResult<Binary> {
    let state = RACK_STATE.load(deps.storage)?;
    to_json_binary(&state.default_game_id)
}

pub fn query_current_game_for(deps: Deps, user: String) -> StdResult<Binary> {
    let user = deps.api.addr_validate(&user)?;
    to_json_binary(&current_game_for(deps.storage, &user)?)
}

pub fn query_draw_price(deps: Deps, user: Option<String>) -> StdResult<Binary> {
    let game_id = match user {
        Some(user) => current_game_for(deps.storage, &deps.api.addr_validate(&user)?)?,
        None => RACK_STATE.load(deps.storage)?.default_game_id,
    };
    let game = GAMES.load(deps.storage, game_id)?;
    to_json_binary(&game.draw_price)
}

pub fn query_available_supply(deps: Deps, env: Env) -> StdResult<Binary> {
    let game_id = RACK_STATE.load(deps.storage)?.default_game_id;
    to_json_binary(&available_for_game(deps, &env, game_id)?)
}

pub fn query_available_supply_for_user(deps: Deps, env: Env, user: String) -> StdResult<Binary> {
    let user = deps.api.addr_validate(&user)?;
    let game_id = current_game_for(deps.storage, &user)?;
    to_json_binary(&available_for_game(deps, &env, game_id)?)
}

pub fn query_available_supply_for_game(deps: Deps, env: Env, game_id: u64) -> StdResult<Binary> {
    to_json_binary(&available_for_game(deps, &env, game_id)?)
}

pub fn query_game_info(deps: Deps, env: Env, game_id: u64) -> StdResult<Binary> {
    let game = GAMES.load(deps.storage, game_id)?;
    to_json_binary(&game_info(&game, env.block.height))
}

pub fn query_game_flow(deps: Deps, game_id: u64) -> StdResult<Binary> {
    let game = GAMES.load(deps.storage, game_id)?;
    to_json_binary(&game.flow)
}

pub fn query_prizes(deps: Deps, game_id: u64) -> StdResult<Binary> {
    let game = GAMES.load(deps.storage, game_id)?;
    to_json_binary(&PrizesResponse {
        game_id,
        prizes: game.prizes,
        total_weight: game.total_weight,
    })
}

pub fn query_games(
    deps: Deps,
    env: Env,
    start_after: Option<u64>,
    limit: Option<u32>,
) -> StdResult<Binary> {
    let limit = limit.unwrap_or(20).min(100) as usize;
    let start = start_after.map(Bound::exclusive);

    let games: Vec<GameInfoResponse> = GAMES
        .range(deps.storage, start, None, Order::Ascending)
        .take(limit)
        .filter_map(|r| r.ok())
        .map(|(_, game)| game_info(&game, env.block.height))
        .collect();

    to_json_binary(&games)
}

pub fn query_draw(deps: Deps, env: Env, draw_id: u64) -> StdResult<Binary> {
    let draw = DRAWS.load(deps.storage, draw_id)?;
    let revealable = draw.is_revealable(env.block.height);
    to_json_binary(&DrawResponse { draw, revealable })
}

pub fn query_draw_id_by_user(deps: Deps, user: String, index: u64) -> StdResult<Binary> {
    let user = deps.api.addr_validate(&user)?;
    let draw_id = USER_DRAWS.load(deps.storage, (&user, index))?;
    to_json_binary(&draw_id)
}

pub fn query_user_draws(
    deps: Deps,
    user: String,
    start_after: Option<u64>,
    limit: Option<u32>,
) -> StdResult<Binary> {
    let addr = deps.api.addr_validate(&user)?;
    let limit = limit.unwrap_or(30).min(100) as usize;
    let start = start_after.map(Bound::exclusive);

    let draw_count = USER_DRAW_COUNT
        .may_load(deps.storage, &addr)?
        .unwrap_or(0);

    let draws = USER_DRAWS
        .prefix(&addr)
        .range(deps.storage, start, None, Order::Ascending)
        .take(limit)
        .filter_map(|r| r.ok())
        .filter_map(|(_, draw_id)| DRAWS.load(deps.storage, draw_id).ok())
        .collect();

    to_json_binary(&UserDrawsResponse {
        user,
        draw_count,
        draws,
    })
}

pub fn query_draw_count_by(deps: Deps, user: String) -> StdResult<Binary> {
    let user = deps.api.addr_validate(&user)?;
    let count = USER_DRAW_COUNT.may_load(deps.storage, &user)?.unwrap_or(0);
    to_json_binary(&count)
}

pub fn query_assignment(deps: Deps, index: u64) -> StdResult<Binary> {
    let entry = ASSIGNMENTS.load(deps.storage, index)?;
    to_json_binary(&entry)
}

pub fn query_assignment_index(deps: Deps, user: String) -> StdResult<Binary> {
    let user = deps.api.addr_validate(&user)?;
    to_json_binary(&ASSIGNMENT_INDEX.may_load(deps.storage, &user)?)
}

pub fn query_assignment_count(deps: Deps) -> StdResult<Binary> {
    to_json_binary(&assignment_count(deps.storage)?)
}

pub fn query_assignments(
    deps: Deps,
    start_after: Option<u64>,
    limit: Option<u32>,
) -> StdResult<Binary> {
    let limit = limit.unwrap_or(30).min(100) as usize;
    let start = start_after.map(Bound::exclusive);

    let entries: Vec<AssignmentEntry> = ASSIGNMENTS
        .range(deps.storage, start, None, Order::Ascending)
        .take(limit)
        .filter_map(|r| r.ok())
        .map(|(index, entry)| AssignmentEntry {
            index,
            user: entry.user,
            game_id: entry.game_id,
        })
        .collect();

    to_json_binary(&entries)
}

pub fn query_is_manager(deps: Deps, address: String) -> StdResult<Binary> {
    let address = deps.api.addr_validate(&address)?;
    let config = CONFIG.load(deps.storage)?;
    to_json_binary(&config.is_manager(&address))
}
