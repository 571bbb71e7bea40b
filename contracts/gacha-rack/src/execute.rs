use cosmwasm_std::{Addr, Deps, DepsMut, Env, Event, MessageInfo, Response, Uint128};
use gacha_common::CollectibleQueryMsg;

use crate::assignment;
use crate::error::ContractError;
use crate::flow::{resolve_effective_block, DrawFlow};
use crate::msg::{CreateGameParams, UpdateConfigParams};
use crate::state::{load_game, Config, Game, Prize, CONFIG, GAMES, RACK_STATE};

pub fn ensure_manager(config: &Config, sender: &Addr, action: &str) -> Result<(), ContractError> {
    if !config.is_manager(sender) {
        return Err(ContractError::Unauthorized {
            reason: format!("only managers can {action}"),
        });
    }
    Ok(())
}

fn ensure_admin(config: &Config, sender: &Addr, action: &str) -> Result<(), ContractError> {
    if *sender != config.admin {
        return Err(ContractError::Unauthorized {
            reason: format!("only admin can {action}"),
        });
    }
    Ok(())
}

/// Pair up types and weights, checking every type against the collectible
/// contract's registered type count.
fn build_prizes(
    deps: Deps,
    config: &Config,
    prize_types: Vec<u64>,
    prize_weights: Vec<Uint128>,
) -> Result<Vec<Prize>, ContractError> {
    if prize_types.len() != prize_weights.len() {
        return Err(ContractError::PrizeLengthMismatch {
            types: prize_types.len(),
            weights: prize_weights.len(),
        });
    }
    if prize_types.is_empty() {
        return Ok(vec![]);
    }

    let count: u64 = deps.querier.query_wasm_smart(
        config.prize_token.to_string(),
        &CollectibleQueryMsg::TokenTypeCount {},
    )?;

    prize_types
        .into_iter()
        .zip(prize_weights)
        .map(|(token_type, weight)| {
            if token_type >= count {
                return Err(ContractError::NonexistentTokenType { token_type, count });
            }
            if weight.is_zero() {
                return Err(ContractError::ZeroPrizeWeight { token_type });
            }
            Ok(Prize { token_type, weight })
        })
        .collect()
}

fn flow_event(game: &Game, height: u64) -> Event {
    Event::new("gacha_flow_updated")
        .add_attribute("game_id", game.id.to_string())
        .add_attribute("numerator", game.flow.numerator.to_string())
        .add_attribute("denominator", game.flow.denominator.to_string())
        .add_attribute("checkpoint_block", game.flow.checkpoint_block.to_string())
        .add_attribute("checkpoint_supply", game.flow.checkpoint_supply.to_string())
        .add_attribute("available_supply", game.available_supply(height).to_string())
}

fn default_game_event(previous: u64, game_id: u64) -> Event {
    Event::new("gacha_default_game_changed")
        .add_attribute("previous_game_id", previous.to_string())
        .add_attribute("game_id", game_id.to_string())
}

fn join_types(prizes: &[Prize]) -> String {
    prizes
        .iter()
        .map(|p| p.token_type.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

fn join_weights(prizes: &[Prize]) -> String {
    prizes
        .iter()
        .map(|p| p.weight.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

/// Create a game. Manager only.
pub fn create_game(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    params: CreateGameParams,
) -> Result<Response, ContractError> {
    let CreateGameParams {
        draw_price,
        blocks_to_reveal,
        initial_supply,
        flow_numerator,
        flow_denominator,
        start_block,
        prize_types,
        prize_weights,
        activated,
        make_current,
    } = params;

    let config = CONFIG.load(deps.storage)?;
    ensure_manager(&config, &info.sender, "create games")?;

    let height = env.block.height;
    let flow = DrawFlow::new(
        flow_numerator,
        flow_denominator,
        resolve_effective_block(start_block, height),
        initial_supply,
    )?;
    let prizes = build_prizes(deps.as_ref(), &config, prize_types, prize_weights)?;
    if blocks_to_reveal == 0 {
        return Err(ContractError::InvalidRevealDelay);
    }

    let mut state = RACK_STATE.load(deps.storage)?;
    let game_id = state.game_count;

    let mut game = Game {
        id: game_id,
        draw_price,
        blocks_to_reveal,
        activated: false,
        prizes: vec![],
        total_weight: Uint128::zero(),
        draw_count: 0,
        flow,
    };
    game.append_prizes(prizes)?;
    if activated {
        game.ensure_drawable()?;
    }
    game.activated = activated;
    GAMES.save(deps.storage, game_id, &game)?;

    let previous_default = state.default_game_id;
    let make_current = activated && make_current.unwrap_or(true);
    state.game_count += 1;
    if make_current {
        state.default_game_id = game_id;
    }
    RACK_STATE.save(deps.storage, &state)?;

    let mut response = Response::new()
        .add_attribute("action", "create_game")
        .add_attribute("game_id", game_id.to_string())
        .add_event(
            Event::new("gacha_game_created")
                .add_attribute("game_id", game_id.to_string())
                .add_attribute("draw_price", draw_price.to_string())
                .add_attribute("blocks_to_reveal", blocks_to_reveal.to_string())
                .add_attribute("activated", activated.to_string())
                .add_attribute("prize_types", join_types(&game.prizes))
                .add_attribute("prize_weights", join_weights(&game.prizes))
                .add_attribute("total_weight", game.total_weight.to_string()),
        )
        .add_event(flow_event(&game, height));
    if make_current {
        response = response.add_event(default_game_event(previous_default, game_id));
    }
    Ok(response)
}

/// Append prizes to a game that has not been activated. Manager only.
pub fn add_prizes(
    deps: DepsMut,
    _env: Env,
    info: MessageInfo,
    game_id: u64,
    prize_types: Vec<u64>,
    prize_weights: Vec<Uint128>,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    ensure_manager(&config, &info.sender, "add prizes")?;

    let mut game = load_game(deps.storage, game_id)?;
    if game.activated {
        return Err(ContractError::GameActivated { game_id });
    }
    let prizes = build_prizes(deps.as_ref(), &config, prize_types, prize_weights)?;
    let added_types = join_types(&prizes);
    let added_weights = join_weights(&prizes);
    game.append_prizes(prizes)?;
    GAMES.save(deps.storage, game_id, &game)?;

    Ok(Response::new()
        .add_attribute("action", "add_prizes")
        .add_attribute("game_id", game_id.to_string())
        .add_event(
            Event::new("gacha_prizes_added")
                .add_attribute("game_id", game_id.to_string())
                .add_attribute("prize_types", added_types)
                .add_attribute("prize_weights", added_weights)
                .add_attribute("prize_count", game.prizes.len().to_string())
                .add_attribute("total_weight", game.total_weight.to_string()),
        ))
}

/// Open a game for purchases. Re-activating is a no-op apart from the
/// optional pointer move. Manager only.
pub fn activate_game(
    deps: DepsMut,
    _env: Env,
    info: MessageInfo,
    game_id: u64,
    make_current: bool,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    ensure_manager(&config, &info.sender, "activate games")?;

    let mut game = load_game(deps.storage, game_id)?;
    game.ensure_drawable()?;
    game.activated = true;
    GAMES.save(deps.storage, game_id, &game)?;

    let mut response = Response::new()
        .add_attribute("action", "activate_game")
        .add_attribute("game_id", game_id.to_string())
        .add_event(
            Event::new("gacha_game_updated")
                .add_attribute("game_id", game_id.to_string())
                .add_attribute("draw_price", game.draw_price.to_string())
                .add_attribute("blocks_to_reveal", game.blocks_to_reveal.to_string())
                .add_attribute("activated", "true"),
        );

    if make_current {
        let mut state = RACK_STATE.load(deps.storage)?;
        let previous = state.default_game_id;
        state.default_game_id = game_id;
        RACK_STATE.save(deps.storage, &state)?;
        response = response.add_event(default_game_event(previous, game_id));
    }
    Ok(response)
}

/// Change the flow rate from `effective_block` on. The supply available
/// right now is carried over unchanged. Manager only.
pub fn set_game_flow(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    game_id: u64,
    numerator: Uint128,
    denominator: Uint128,
    effective_block: u64,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    ensure_manager(&config, &info.sender, "set game flow")?;

    let height = env.block.height;
    let mut game = load_game(deps.storage, game_id)?;
    game.flow = game.flow.with_rate(
        height,
        game.draw_count,
        numerator,
        denominator,
        effective_block,
    )?;
    GAMES.save(deps.storage, game_id, &game)?;

    Ok(Response::new()
        .add_attribute("action", "set_game_flow")
        .add_attribute("game_id", game_id.to_string())
        .add_event(flow_event(&game, height)))
}

/// Set the supply available now, keeping the rate. Manager only.
pub fn set_game_supply(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    game_id: u64,
    supply: Uint128,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    ensure_manager(&config, &info.sender, "set game supply")?;

    let height = env.block.height;
    let mut game = load_game(deps.storage, game_id)?;
    game.flow = game.flow.with_supply(height, game.draw_count, supply)?;
    GAMES.save(deps.storage, game_id, &game)?;

    Ok(Response::new()
        .add_attribute("action", "set_game_supply")
        .add_attribute("game_id", game_id.to_string())
        .add_event(flow_event(&game, height)))
}

/// Replace both supply and rate. Manager only.
#[allow(clippy::too_many_arguments)]
pub fn set_game_flow_and_supply(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    game_id: u64,
    supply: Uint128,
    numerator: Uint128,
    denominator: Uint128,
    effective_block: u64,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    ensure_manager(&config, &info.sender, "set game flow and supply")?;

    let height = env.block.height;
    let mut game = load_game(deps.storage, game_id)?;
    game.flow = DrawFlow::reset(
        height,
        game.draw_count,
        supply,
        numerator,
        denominator,
        effective_block,
    )?;
    GAMES.save(deps.storage, game_id, &game)?;

    Ok(Response::new()
        .add_attribute("action", "set_game_flow_and_supply")
        .add_attribute("game_id", game_id.to_string())
        .add_event(flow_event(&game, height)))
}

/// Route each user to `game_id`. Manager only.
pub fn assign_game(
    deps: DepsMut,
    _env: Env,
    info: MessageInfo,
    game_id: u64,
    users: Vec<String>,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    ensure_manager(&config, &info.sender, "assign games")?;
    load_game(deps.storage, game_id)?;

    let mut response = Response::new()
        .add_attribute("action", "assign_game")
        .add_attribute("game_id", game_id.to_string())
        .add_attribute("user_count", users.len().to_string());

    for user in &users {
        let user = deps.api.addr_validate(user)?;
        let index = assignment::assign(deps.storage, &user, game_id)?;
        response = response.add_event(
            Event::new("gacha_assignment_changed")
                .add_attribute("user", user.to_string())
                .add_attribute("game_id", game_id.to_string())
                .add_attribute("index", index.to_string()),
        );
    }
    Ok(response)
}

/// Remove assignments; users without one are skipped. Manager only.
pub fn clear_assigned_game(
    deps: DepsMut,
    _env: Env,
    info: MessageInfo,
    users: Vec<String>,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    ensure_manager(&config, &info.sender, "clear assigned games")?;

    let mut response = Response::new().add_attribute("action", "clear_assigned_game");
    let mut cleared = 0u64;
    for user in &users {
        let user = deps.api.addr_validate(user)?;
        if assignment::clear(deps.storage, &user)? {
            cleared += 1;
            response = response.add_event(
                Event::new("gacha_assignment_changed")
                    .add_attribute("user", user.to_string())
                    .add_attribute("cleared", "true"),
            );
        }
    }
    Ok(response.add_attribute("cleared", cleared.to_string()))
}

/// Manager only.
pub fn set_default_game(
    deps: DepsMut,
    _env: Env,
    info: MessageInfo,
    game_id: u64,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    ensure_manager(&config, &info.sender, "set the default game")?;
    load_game(deps.storage, game_id)?;

    let mut state = RACK_STATE.load(deps.storage)?;
    let previous = state.default_game_id;
    state.default_game_id = game_id;
    RACK_STATE.save(deps.storage, &state)?;

    Ok(Response::new()
        .add_attribute("action", "set_default_game")
        .add_attribute("game_id", game_id.to_string())
        .add_event(default_game_event(previous, game_id)))
}

/// Manager only.
pub fn set_recipient(
    deps: DepsMut,
    _env: Env,
    info: MessageInfo,
    recipient: Option<String>,
) -> Result<Response, ContractError> {
    let mut config = CONFIG.load(deps.storage)?;
    ensure_manager(&config, &info.sender, "set the recipient")?;

    config.recipient = recipient
        .map(|r| deps.api.addr_validate(&r))
        .transpose()?;
    CONFIG.save(deps.storage, &config)?;

    let recipient = config
        .recipient
        .as_ref()
        .map(|r| r.to_string())
        .unwrap_or_else(|| "none".to_string());
    Ok(Response::new()
        .add_attribute("action", "set_recipient")
        .add_attribute("recipient", recipient.clone())
        .add_event(Event::new("gacha_recipient_changed").add_attribute("recipient", recipient)))
}

/// Update the manager list. Admin only.
pub fn update_managers(
    deps: DepsMut,
    _env: Env,
    info: MessageInfo,
    add: Vec<String>,
    remove: Vec<String>,
) -> Result<Response, ContractError> {
    let mut config = CONFIG.load(deps.storage)?;
    ensure_admin(&config, &info.sender, "update managers")?;

    for addr_str in &remove {
        let addr = deps.api.addr_validate(addr_str)?;
        config.managers.retain(|a| a != &addr);
    }

    for addr_str in &add {
        let addr = deps.api.addr_validate(addr_str)?;
        if !config.managers.contains(&addr) {
            config.managers.push(addr);
        }
    }

    CONFIG.save(deps.storage, &config)?;

    Ok(Response::new()
        .add_attribute("action", "update_managers")
        .add_attribute("added", add.join(","))
        .add_attribute("removed", remove.join(",")))
}

/// Admin only.
pub fn update_config(
    deps: DepsMut,
    _env: Env,
    info: MessageInfo,
    params: UpdateConfigParams,
) -> Result<Response, ContractError> {
    let UpdateConfigParams {
        admin,
        prize_token,
        entropy_oracle,
        payment_denom,
    } = params;

    let mut config = CONFIG.load(deps.storage)?;
    ensure_admin(&config, &info.sender, "update config")?;

    if let Some(admin) = admin {
        config.admin = deps.api.addr_validate(&admin)?;
    }
    if let Some(token) = prize_token {
        config.prize_token = deps.api.addr_validate(&token)?;
    }
    if let Some(oracle) = entropy_oracle {
        config.entropy_oracle = deps.api.addr_validate(&oracle)?;
    }
    if let Some(denom) = payment_denom {
        config.payment_denom = denom;
    }

    CONFIG.save(deps.storage, &config)?;

    Ok(Response::new().add_attribute("action", "update_config"))
}
