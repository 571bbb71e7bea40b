use cosmwasm_std::{
    entry_point, Binary, Deps, DepsMut, Env, MessageInfo, Reply, Response, StdResult,
};
use cw2::{get_contract_version, set_contract_version};

use crate::error::ContractError;
use crate::execute;
use crate::ledger::{self, MINT_REPLY_ID};
use crate::msg::{
    CreateGameParams, ExecuteMsg, InstantiateMsg, MigrateMsg, QueryMsg, UpdateConfigParams,
};
use crate::query;
use crate::state::{Config, RackState, ASSIGNMENT_COUNT, CONFIG, RACK_STATE};

const CONTRACT_NAME: &str = "crates.io:gacha-rack";
const CONTRACT_VERSION: &str = env!("CARGO_PKG_VERSION");

#[entry_point]
pub fn instantiate(
    deps: DepsMut,
    _env: Env,
    info: MessageInfo,
    msg: InstantiateMsg,
) -> Result<Response, ContractError> {
    set_contract_version(deps.storage, CONTRACT_NAME, CONTRACT_VERSION)?;

    let mut managers = Vec::new();
    for manager in &msg.managers {
        let addr = deps.api.addr_validate(manager)?;
        if !managers.contains(&addr) {
            managers.push(addr);
        }
    }

    let config = Config {
        admin: info.sender.clone(),
        managers,
        prize_token: deps.api.addr_validate(&msg.prize_token)?,
        entropy_oracle: deps.api.addr_validate(&msg.entropy_oracle)?,
        payment_denom: msg.payment_denom,
        recipient: msg
            .recipient
            .map(|r| deps.api.addr_validate(&r))
            .transpose()?,
    };
    CONFIG.save(deps.storage, &config)?;

    RACK_STATE.save(
        deps.storage,
        &RackState {
            game_count: 0,
            total_draws: 0,
            default_game_id: 0,
        },
    )?;
    ASSIGNMENT_COUNT.save(deps.storage, &0u64)?;

    Ok(Response::new()
        .add_attribute("action", "instantiate")
        .add_attribute("contract", "gacha-rack")
        .add_attribute("admin", info.sender.to_string()))
}

#[entry_point]
pub fn execute(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    msg: ExecuteMsg,
) -> Result<Response, ContractError> {
    match msg {
        ExecuteMsg::CreateGame {
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
        } => execute::create_game(
            deps,
            env,
            info,
            CreateGameParams {
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
            },
        ),
        ExecuteMsg::AddPrizes {
            game_id,
            prize_types,
            prize_weights,
        } => execute::add_prizes(deps, env, info, game_id, prize_types, prize_weights),
        ExecuteMsg::ActivateGame {
            game_id,
            make_current,
        } => execute::activate_game(deps, env, info, game_id, make_current),
        ExecuteMsg::SetGameFlow {
            game_id,
            numerator,
            denominator,
            effective_block,
        } => execute::set_game_flow(
            deps,
            env,
            info,
            game_id,
            numerator,
            denominator,
            effective_block,
        ),
        ExecuteMsg::SetGameSupply { game_id, supply } => {
            execute::set_game_supply(deps, env, info, game_id, supply)
        }
        ExecuteMsg::SetGameFlowAndSupply {
            game_id,
            supply,
            numerator,
            denominator,
            effective_block,
        } => execute::set_game_flow_and_supply(
            deps,
            env,
            info,
            game_id,
            supply,
            numerator,
            denominator,
            effective_block,
        ),
        ExecuteMsg::AssignGame { game_id, users } => {
            execute::assign_game(deps, env, info, game_id, users)
        }
        ExecuteMsg::ClearAssignedGame { users } => {
            execute::clear_assigned_game(deps, env, info, users)
        }
        ExecuteMsg::SetDefaultGame { game_id } => {
            execute::set_default_game(deps, env, info, game_id)
        }
        ExecuteMsg::SetRecipient { recipient } => {
            execute::set_recipient(deps, env, info, recipient)
        }
        ExecuteMsg::PurchaseDraws {
            buyer,
            count,
            max_unit_price,
        } => ledger::purchase_draws(deps, env, info, buyer, count, max_unit_price),
        ExecuteMsg::RevealDraws { buyer, draw_ids } => {
            ledger::reveal_draws(deps, env, info, buyer, draw_ids)
        }
        ExecuteMsg::UpdateManagers { add, remove } => {
            execute::update_managers(deps, env, info, add, remove)
        }
        ExecuteMsg::UpdateConfig {
            admin,
            prize_token,
            entropy_oracle,
            payment_denom,
        } => execute::update_config(
            deps,
            env,
            info,
            UpdateConfigParams {
                admin,
                prize_token,
                entropy_oracle,
                payment_denom,
            },
        ),
    }
}

#[entry_point]
pub fn reply(deps: DepsMut, env: Env, msg: Reply) -> Result<Response, ContractError> {
    match msg.id {
        MINT_REPLY_ID => ledger::handle_mint_reply(deps, env, msg),
        id => Err(ContractError::UnknownReplyId { id }),
    }
}

#[entry_point]
pub fn query(deps: Deps, env: Env, msg: QueryMsg) -> StdResult<Binary> {
    match msg {
        QueryMsg::Config {} => query::query_config(deps),
        QueryMsg::RackState {} => query::query_rack_state(deps),
        QueryMsg::GameCount {} => query::query_game_count(deps),
        QueryMsg::CurrentGame {} => query::query_current_game(deps),
        QueryMsg::CurrentGameFor { user } => query::query_current_game_for(deps, user),
        QueryMsg::DrawPrice { user } => query::query_draw_price(deps, user),
        QueryMsg::AvailableSupply {} => query::query_available_supply(deps, env),
        QueryMsg::AvailableSupplyForUser { user } => {
            query::query_available_supply_for_user(deps, env, user)
        }
        QueryMsg::AvailableSupplyForGame { game_id } => {
            query::query_available_supply_for_game(deps, env, game_id)
        }
        QueryMsg::GameInfo { game_id } => query::query_game_info(deps, env, game_id),
        QueryMsg::GameFlow { game_id } => query::query_game_flow(deps, game_id),
        QueryMsg::Prizes { game_id } => query::query_prizes(deps, game_id),
        QueryMsg::Games { start_after, limit } => {
            query::query_games(deps, env, start_after, limit)
        }
        QueryMsg::Draw { draw_id } => query::query_draw(deps, env, draw_id),
        QueryMsg::DrawIdByUser { user, index } => query::query_draw_id_by_user(deps, user, index),
        QueryMsg::UserDraws {
            user,
            start_after,
            limit,
        } => query::query_user_draws(deps, user, start_after, limit),
        QueryMsg::DrawCountBy { user } => query::query_draw_count_by(deps, user),
        QueryMsg::Assignment { index } => query::query_assignment(deps, index),
        QueryMsg::AssignmentIndex { user } => query::query_assignment_index(deps, user),
        QueryMsg::AssignmentCount {} => query::query_assignment_count(deps),
        QueryMsg::Assignments { start_after, limit } => {
            query::query_assignments(deps, start_after, limit)
        }
        QueryMsg::IsManager { address } => query::query_is_manager(deps, address),
    }
}

#[entry_point]
pub fn migrate(deps: DepsMut, _env: Env, _msg: MigrateMsg) -> Result<Response, ContractError> {
    let stored = get_contract_version(deps.storage)?;
    if stored.contract != CONTRACT_NAME {
        return Err(ContractError::Unauthorized {
            reason: "Cannot migrate from different contract type".to_string(),
        });
    }

    set_contract_version(deps.storage, CONTRACT_NAME, CONTRACT_VERSION)?;

    Ok(Response::new()
        .add_attribute("action", "migrate")
        .add_attribute("from_version", stored.version)
        .add_attribute("to_version", CONTRACT_VERSION))
}
