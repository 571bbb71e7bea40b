use cosmwasm_schema::cw_serde;
use cosmwasm_std::{Addr, Storage, Uint128};
use cw_storage_plus::{Item, Map};
use gacha_common::types::DrawStatus;

use crate::error::ContractError;
use crate::flow::DrawFlow;

pub const CONFIG: Item<Config> = Item::new("config");
pub const RACK_STATE: Item<RackState> = Item::new("rack_state");
pub const GAMES: Map<u64, Game> = Map::new("games");
pub const DRAWS: Map<u64, Draw> = Map::new("draws");

/// (buyer, user-local index) -> global draw id, in purchase order.
pub const USER_DRAWS: Map<(&Addr, u64), u64> = Map::new("user_draws");
pub const USER_DRAW_COUNT: Map<&Addr, u64> = Map::new("user_draw_count");

/// Enumerable assignment set. Slots `0..ASSIGNMENT_COUNT` are always
/// occupied; removal moves the last entry into the freed slot.
pub const ASSIGNMENTS: Map<u64, GameAssignment> = Map::new("assignments");
pub const ASSIGNMENT_INDEX: Map<&Addr, u64> = Map::new("assignment_index");
pub const ASSIGNMENT_COUNT: Item<u64> = Item::new("assignment_count");

#[cw_serde]
pub struct Config {
    pub admin: Addr,
    pub managers: Vec<Addr>,
    /// Collectible contract that mints prizes
    pub prize_token: Addr,
    /// Block hash oracle supplying reveal entropy
    pub entropy_oracle: Addr,
    /// Native denom draws are paid in
    pub payment_denom: String,
    /// Receives purchase proceeds; `None` keeps them in the contract
    pub recipient: Option<Addr>,
}

impl Config {
    /// The admin always holds the management capability.
    pub fn is_manager(&self, addr: &Addr) -> bool {
        *addr == self.admin || self.managers.contains(addr)
    }
}

#[cw_serde]
pub struct RackState {
    pub game_count: u64,
    pub total_draws: u64,
    /// Game for every user without an explicit assignment
    pub default_game_id: u64,
}

#[cw_serde]
pub struct Prize {
    pub token_type: u64,
    pub weight: Uint128,
}

#[cw_serde]
pub struct Game {
    pub id: u64,
    pub draw_price: Uint128,
    pub blocks_to_reveal: u64,
    pub activated: bool,
    pub prizes: Vec<Prize>,
    pub total_weight: Uint128,
    /// Draws ever purchased against this game
    pub draw_count: u64,
    pub flow: DrawFlow,
}

impl Game {
    /// Append prizes, keeping `total_weight` equal to the sum of weights.
    pub fn append_prizes(&mut self, prizes: Vec<Prize>) -> Result<(), ContractError> {
        if self.activated {
            return Err(ContractError::GameActivated { game_id: self.id });
        }
        let mut total_weight = self.total_weight;
        for prize in &prizes {
            total_weight = total_weight.checked_add(prize.weight)?;
        }
        self.prizes.extend(prizes);
        self.total_weight = total_weight;
        Ok(())
    }

    /// A game can only be opened for purchases with prize weight to draw from.
    pub fn ensure_drawable(&self) -> Result<(), ContractError> {
        if self.total_weight.is_zero() {
            return Err(ContractError::ZeroTotalWeight { game_id: self.id });
        }
        Ok(())
    }

    pub fn available_supply(&self, height: u64) -> Uint128 {
        self.flow.available_at(height, self.draw_count)
    }
}

#[cw_serde]
pub struct Draw {
    pub id: u64,
    pub buyer: Addr,
    pub game_id: u64,
    pub purchase_block: u64,
    pub revealable_block: u64,
    pub status: DrawStatus,
    /// Prize type chosen at reveal
    pub token_type: Option<u64>,
    /// Item id reported by the collectible contract after minting
    pub token_id: Option<String>,
    pub revealed_block: Option<u64>,
}

impl Draw {
    pub fn is_revealable(&self, height: u64) -> bool {
        height >= self.revealable_block
    }
}

#[cw_serde]
pub struct GameAssignment {
    pub user: Addr,
    pub game_id: u64,
}

pub fn load_game(storage: &dyn Storage, game_id: u64) -> Result<Game, ContractError> {
    GAMES
        .may_load(storage, game_id)?
        .ok_or(ContractError::InvalidGameId { game_id })
}
