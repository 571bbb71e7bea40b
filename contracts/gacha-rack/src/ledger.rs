//! Draw lifecycle: purchase, reveal, and recording of minted items.

use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet};

use cosmwasm_std::{
    coins, from_json, to_json_binary, Addr, BankMsg, Deps, DepsMut, Env, Event, MessageInfo,
    Reply, Response, SubMsg, Uint128, WasmMsg,
};
use gacha_common::{BlockHashResponse, CollectibleExecuteMsg, DrawStatus, OracleQueryMsg};

use crate::assignment::current_game_for;
use crate::error::ContractError;
use crate::selector::select_prize;
use crate::state::{
    load_game, Config, Draw, Game, CONFIG, DRAWS, GAMES, RACK_STATE, USER_DRAWS, USER_DRAW_COUNT,
};

/// Upper bound on draws purchased or revealed in one call.
pub const MAX_DRAWS_PER_CALL: u64 = 100;

pub const MINT_REPLY_ID: u64 = 1;

/// Sum of attached funds in `denom`. Any other denom is rejected.
fn collect_payment(
    info: &MessageInfo,
    denom: &str,
    cost: Uint128,
) -> Result<Uint128, ContractError> {
    if let Some(coin) = info.funds.iter().find(|c| c.denom != denom) {
        return Err(ContractError::UnexpectedFunds {
            denom: coin.denom.clone(),
        });
    }
    let sent = info
        .funds
        .iter()
        .try_fold(Uint128::zero(), |acc, c| acc.checked_add(c.amount))?;
    if sent < cost {
        return Err(ContractError::InsufficientFunds { needed: cost, sent });
    }
    Ok(sent)
}

/// Buy `count` draws from the buyer's current game.
pub fn purchase_draws(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    buyer: Option<String>,
    count: u64,
    max_unit_price: Uint128,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    let buyer = match buyer {
        Some(b) => deps.api.addr_validate(&b)?,
        None => info.sender.clone(),
    };

    if count == 0 || count > MAX_DRAWS_PER_CALL {
        return Err(ContractError::InvalidDrawCount {
            count,
            max: MAX_DRAWS_PER_CALL,
        });
    }

    let game_id = current_game_for(deps.storage, &buyer)?;
    let mut game = load_game(deps.storage, game_id)?;
    if !game.activated {
        return Err(ContractError::GameNotActivated { game_id });
    }
    game.ensure_drawable()?;
    if game.draw_price > max_unit_price {
        return Err(ContractError::PriceAboveLimit {
            price: game.draw_price,
            limit: max_unit_price,
        });
    }

    let height = env.block.height;
    let available = game.available_supply(height);
    if available < Uint128::from(count) {
        return Err(ContractError::InsufficientSupply {
            requested: count,
            available,
        });
    }

    let cost = game.draw_price.checked_mul(Uint128::from(count))?;
    let paid = collect_payment(&info, &config.payment_denom, cost)?;

    let mut state = RACK_STATE.load(deps.storage)?;
    let first_draw_id = state.total_draws;
    let revealable_block = height.saturating_add(game.blocks_to_reveal);
    let mut user_count = USER_DRAW_COUNT.may_load(deps.storage, &buyer)?.unwrap_or(0);

    for draw_id in first_draw_id..first_draw_id + count {
        let draw = Draw {
            id: draw_id,
            buyer: buyer.clone(),
            game_id,
            purchase_block: height,
            revealable_block,
            status: DrawStatus::Purchased,
            token_type: None,
            token_id: None,
            revealed_block: None,
        };
        DRAWS.save(deps.storage, draw_id, &draw)?;
        USER_DRAWS.save(deps.storage, (&buyer, user_count), &draw_id)?;
        user_count += 1;
    }
    USER_DRAW_COUNT.save(deps.storage, &buyer, &user_count)?;

    game.draw_count += count;
    GAMES.save(deps.storage, game_id, &game)?;

    state.total_draws += count;
    RACK_STATE.save(deps.storage, &state)?;

    // Funds move only after all bookkeeping is saved
    let mut response = Response::new();
    let refund = paid - cost;
    if !refund.is_zero() {
        response = response.add_message(BankMsg::Send {
            to_address: info.sender.to_string(),
            amount: coins(refund.u128(), &config.payment_denom),
        });
    }
    if let Some(recipient) = &config.recipient {
        if !cost.is_zero() {
            response = response.add_message(BankMsg::Send {
                to_address: recipient.to_string(),
                amount: coins(cost.u128(), &config.payment_denom),
            });
        }
    }

    let last_draw_id = first_draw_id + count - 1;
    Ok(response
        .add_attribute("action", "purchase_draws")
        .add_attribute("buyer", buyer.to_string())
        .add_attribute("game_id", game_id.to_string())
        .add_attribute("first_draw_id", first_draw_id.to_string())
        .add_attribute("count", count.to_string())
        .add_event(
            Event::new("gacha_draw_purchased")
                .add_attribute("buyer", buyer.to_string())
                .add_attribute("payer", info.sender.to_string())
                .add_attribute("game_id", game_id.to_string())
                .add_attribute("first_draw_id", first_draw_id.to_string())
                .add_attribute("last_draw_id", last_draw_id.to_string())
                .add_attribute("count", count.to_string())
                .add_attribute("draw_price", game.draw_price.to_string())
                .add_attribute("cost", cost.to_string())
                .add_attribute("refund", refund.to_string())
                .add_attribute("purchase_block", height.to_string())
                .add_attribute("revealable_block", revealable_block.to_string())
                .add_attribute(
                    "available_supply",
                    game.available_supply(height).to_string(),
                ),
        ))
}

/// Fetch the recorded hash of `height`. A missing or all-zero hash means
/// the oracle has not caught up yet.
fn fetch_entropy(
    deps: Deps,
    config: &Config,
    height: u64,
) -> Result<BlockHashResponse, ContractError> {
    let recorded: Option<BlockHashResponse> = deps.querier.query_wasm_smart(
        config.entropy_oracle.to_string(),
        &OracleQueryMsg::BlockHash { height },
    )?;
    match recorded {
        Some(block) if block.hash.iter().any(|b| *b != 0) => Ok(block),
        _ => Err(ContractError::EntropyUnavailable { height }),
    }
}

/// Reveal draws owned by `buyer` and mint one prize per draw.
///
/// The whole batch is checked before anything is written, and any failure
/// aborts it. Outcomes are fixed by the revealable block's hash, so anyone
/// may trigger the reveal.
pub fn reveal_draws(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    buyer: Option<String>,
    draw_ids: Vec<u64>,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    let buyer = match buyer {
        Some(b) => deps.api.addr_validate(&b)?,
        None => info.sender.clone(),
    };

    let requested = draw_ids.len() as u64;
    if requested > MAX_DRAWS_PER_CALL {
        return Err(ContractError::TooManyDraws {
            count: requested,
            max: MAX_DRAWS_PER_CALL,
        });
    }

    let height = env.block.height;
    let mut seen = BTreeSet::new();
    let mut draws = Vec::with_capacity(draw_ids.len());
    for draw_id in draw_ids {
        let draw = DRAWS
            .may_load(deps.storage, draw_id)?
            .ok_or(ContractError::DrawNotFound { draw_id })?;
        check_revealable(&draw, &buyer, height)?;
        if !seen.insert(draw_id) {
            return Err(ContractError::AlreadyRevealed { draw_id });
        }
        draws.push(draw);
    }

    let mut games: BTreeMap<u64, Game> = BTreeMap::new();
    let mut entropy: BTreeMap<u64, BlockHashResponse> = BTreeMap::new();
    let mut response = Response::new()
        .add_attribute("action", "reveal_draws")
        .add_attribute("buyer", buyer.to_string())
        .add_attribute("count", draws.len().to_string());

    for mut draw in draws {
        let block = match entropy.entry(draw.revealable_block) {
            Entry::Occupied(e) => e.into_mut(),
            Entry::Vacant(e) => {
                e.insert(fetch_entropy(deps.as_ref(), &config, draw.revealable_block)?)
            }
        };
        let game = match games.entry(draw.game_id) {
            Entry::Occupied(e) => e.into_mut(),
            Entry::Vacant(e) => e.insert(load_game(deps.storage, draw.game_id)?),
        };

        let token_type = select_prize(game, block.hash.as_slice(), draw.id)?.token_type;
        draw.status = DrawStatus::Revealed;
        draw.token_type = Some(token_type);
        draw.revealed_block = Some(height);
        DRAWS.save(deps.storage, draw.id, &draw)?;

        let mint = WasmMsg::Execute {
            contract_addr: config.prize_token.to_string(),
            msg: to_json_binary(&CollectibleExecuteMsg::Mint {
                owner: buyer.to_string(),
                token_type,
            })?,
            funds: vec![],
        };
        response = response
            .add_submessage(
                SubMsg::reply_on_success(mint, MINT_REPLY_ID)
                    .with_payload(to_json_binary(&draw.id)?),
            )
            .add_event(
                Event::new("gacha_draw_revealed")
                    .add_attribute("draw_id", draw.id.to_string())
                    .add_attribute("buyer", buyer.to_string())
                    .add_attribute("game_id", draw.game_id.to_string())
                    .add_attribute("token_type", token_type.to_string())
                    .add_attribute("entropy_block", draw.revealable_block.to_string())
                    .add_attribute("entropy", block.hash_hex())
                    .add_attribute("revealed_block", height.to_string()),
            );
    }

    Ok(response)
}

fn check_revealable(draw: &Draw, buyer: &Addr, height: u64) -> Result<(), ContractError> {
    if draw.buyer != *buyer {
        return Err(ContractError::NotDrawOwner {
            draw_id: draw.id,
            buyer: buyer.to_string(),
        });
    }
    if draw.status == DrawStatus::Revealed {
        return Err(ContractError::AlreadyRevealed { draw_id: draw.id });
    }
    if !draw.is_revealable(height) {
        return Err(ContractError::NotRevealable {
            draw_id: draw.id,
            revealable_block: draw.revealable_block,
            current: height,
        });
    }
    Ok(())
}

/// Record the item id minted for a revealed draw. The collectible reports
/// it as a `token_id` attribute on its `wasm` event.
pub fn handle_mint_reply(deps: DepsMut, _env: Env, msg: Reply) -> Result<Response, ContractError> {
    let draw_id: u64 = from_json(&msg.payload)?;
    let result = msg
        .result
        .into_result()
        .map_err(|reason| ContractError::InvalidMintReply { reason })?;

    let token_id = result
        .events
        .iter()
        .filter(|e| e.ty == "wasm")
        .flat_map(|e| e.attributes.iter())
        .find(|a| a.key == "token_id")
        .map(|a| a.value.clone())
        .ok_or_else(|| ContractError::InvalidMintReply {
            reason: "missing token_id attribute".to_string(),
        })?;

    let mut draw = DRAWS
        .may_load(deps.storage, draw_id)?
        .ok_or(ContractError::DrawNotFound { draw_id })?;
    if draw.token_id.is_some() {
        return Err(ContractError::TokenIdAlreadyRecorded { draw_id });
    }
    draw.token_id = Some(token_id.clone());
    DRAWS.save(deps.storage, draw_id, &draw)?;

    let token_type = draw
        .token_type
        .map(|t| t.to_string())
        .unwrap_or_default();
    Ok(Response::new()
        .add_attribute("action", "record_mint")
        .add_attribute("draw_id", draw_id.to_string())
        .add_attribute("token_id", token_id.clone())
        .add_event(
            Event::new("gacha_prize_minted")
                .add_attribute("draw_id", draw_id.to_string())
                .add_attribute("owner", draw.buyer.to_string())
                .add_attribute("token_type", token_type)
                .add_attribute("token_id", token_id),
        ))
}
