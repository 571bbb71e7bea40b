use cosmwasm_schema::{cw_serde, QueryResponses};
use cosmwasm_std::{Addr, Uint128};

use crate::flow::DrawFlow;
use crate::state::{Config, Draw, GameAssignment, Prize, RackState};

#[cw_serde]
pub struct InstantiateMsg {
    /// Addresses allowed to manage games. The instantiator becomes admin.
    pub managers: Vec<String>,
    pub prize_token: String,
    pub entropy_oracle: String,
    pub payment_denom: String,
    pub recipient: Option<String>,
}

#[cw_serde]
pub enum ExecuteMsg {
    /// Create a game. Manager only.
    CreateGame {
        draw_price: Uint128,
        blocks_to_reveal: u64,
        initial_supply: Uint128,
        flow_numerator: Uint128,
        flow_denominator: Uint128,
        /// Block the flow starts accruing from; 0 means the next block
        start_block: u64,
        prize_types: Vec<u64>,
        prize_weights: Vec<Uint128>,
        activated: bool,
        /// Move the default game pointer; defaults to `activated`
        make_current: Option<bool>,
    },
    /// Append prizes to a game that is not yet activated. Manager only.
    AddPrizes {
        game_id: u64,
        prize_types: Vec<u64>,
        prize_weights: Vec<Uint128>,
    },
    /// Activate a game for purchases. Manager only.
    ActivateGame { game_id: u64, make_current: bool },
    /// Change a game's flow rate, keeping the available supply. Manager only.
    SetGameFlow {
        game_id: u64,
        numerator: Uint128,
        denominator: Uint128,
        effective_block: u64,
    },
    /// Set a game's available supply, keeping the rate. Manager only.
    SetGameSupply { game_id: u64, supply: Uint128 },
    /// Set supply and rate together. Manager only.
    SetGameFlowAndSupply {
        game_id: u64,
        supply: Uint128,
        numerator: Uint128,
        denominator: Uint128,
        effective_block: u64,
    },
    /// Route `users` to `game_id`. Manager only.
    AssignGame { game_id: u64, users: Vec<String> },
    /// Send `users` back to the default game. Manager only.
    ClearAssignedGame { users: Vec<String> },
    /// Manager only.
    SetDefaultGame { game_id: u64 },
    /// Where purchase proceeds go; `None` keeps them here. Manager only.
    SetRecipient { recipient: Option<String> },
    /// Buy `count` draws from the buyer's current game. Pay with funds.
    PurchaseDraws {
        /// Owner of the draws; defaults to the sender
        buyer: Option<String>,
        count: u64,
        /// Reject if the game's price is above this
        max_unit_price: Uint128,
    },
    /// Reveal revealable draws of `buyer` and mint their prizes. Anyone can call.
    RevealDraws {
        buyer: Option<String>,
        draw_ids: Vec<u64>,
    },
    /// Admin only.
    UpdateManagers {
        add: Vec<String>,
        remove: Vec<String>,
    },
    /// Admin only.
    UpdateConfig {
        admin: Option<String>,
        prize_token: Option<String>,
        entropy_oracle: Option<String>,
        payment_denom: Option<String>,
    },
}

/// Game creation arguments, unpacked from `ExecuteMsg::CreateGame`.
#[cw_serde]
pub struct CreateGameParams {
    pub draw_price: Uint128,
    pub blocks_to_reveal: u64,
    pub initial_supply: Uint128,
    pub flow_numerator: Uint128,
    pub flow_denominator: Uint128,
    pub start_block: u64,
    pub prize_types: Vec<u64>,
    pub prize_weights: Vec<Uint128>,
    pub activated: bool,
    pub make_current: Option<bool>,
}

#[cw_serde]
pub struct UpdateConfigParams {
    pub admin: Option<String>,
    pub prize_token: Option<String>,
    pub entropy_oracle: Option<String>,
    pub payment_denom: Option<String>,
}

#[cw_serde]
#[derive(QueryResponses)]
pub enum QueryMsg {
    #[returns(Config)]
    Config {},
    #[returns(RackState)]
    RackState {},
    #[returns(u64)]
    GameCount {},
    /// The default game
    #[returns(u64)]
    CurrentGame {},
    #[returns(u64)]
    CurrentGameFor { user: String },
    /// Price in the game `user` buys from, or the default game
    #[returns(Uint128)]
    DrawPrice { user: Option<String> },
    #[returns(Uint128)]
    AvailableSupply {},
    #[returns(Uint128)]
    AvailableSupplyForUser { user: String },
    #[returns(Uint128)]
    AvailableSupplyForGame { game_id: u64 },
    #[returns(GameInfoResponse)]
    GameInfo { game_id: u64 },
    #[returns(DrawFlow)]
    GameFlow { game_id: u64 },
    #[returns(PrizesResponse)]
    Prizes { game_id: u64 },
    #[returns(Vec<GameInfoResponse>)]
    Games {
        start_after: Option<u64>,
        limit: Option<u32>,
    },
    #[returns(DrawResponse)]
    Draw { draw_id: u64 },
    /// Global id of the user's `index`-th draw
    #[returns(u64)]
    DrawIdByUser { user: String, index: u64 },
    #[returns(UserDrawsResponse)]
    UserDraws {
        user: String,
        /// User-local index to start after
        start_after: Option<u64>,
        limit: Option<u32>,
    },
    #[returns(u64)]
    DrawCountBy { user: String },
    #[returns(GameAssignment)]
    Assignment { index: u64 },
    #[returns(Option<u64>)]
    AssignmentIndex { user: String },
    #[returns(u64)]
    AssignmentCount {},
    #[returns(Vec<AssignmentEntry>)]
    Assignments {
        start_after: Option<u64>,
        limit: Option<u32>,
    },
    #[returns(bool)]
    IsManager { address: String },
}

#[cw_serde]
pub struct MigrateMsg {}

#[cw_serde]
pub struct GameInfoResponse {
    pub game_id: u64,
    pub draw_price: Uint128,
    pub blocks_to_reveal: u64,
    pub activated: bool,
    pub total_weight: Uint128,
    pub prize_count: u64,
    pub draw_count: u64,
    pub available_supply: Uint128,
}

#[cw_serde]
pub struct PrizesResponse {
    pub game_id: u64,
    pub prizes: Vec<Prize>,
    pub total_weight: Uint128,
}

#[cw_serde]
pub struct DrawResponse {
    pub draw: Draw,
    /// Whether the draw's revealable block has been reached. A reveal also
    /// needs the oracle to have recorded that block's hash, which can only
    /// happen from the following block on.
    pub revealable: bool,
}

#[cw_serde]
pub struct UserDrawsResponse {
    pub user: String,
    pub draw_count: u64,
    pub draws: Vec<Draw>,
}

#[cw_serde]
pub struct AssignmentEntry {
    pub index: u64,
    pub user: Addr,
    pub game_id: u64,
}
