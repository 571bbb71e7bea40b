//! Integration tests for the gacha rack and its block hash oracle.
//!
//! Each contract runs through its `instantiate` / `execute` / `query` /
//! `reply` entry points using `cosmwasm_std::testing` mocks. The rack's
//! cross-contract queries are answered with `MockQuerier::update_wasm`:
//! block hash queries are answered from a real oracle instance, and the
//! collectible contract is reduced to its `TokenTypeCount` answer.
//!
//! Run:
//! ```bash
//! cargo test -p gacha-integration-tests
//! ```

use std::collections::BTreeMap;

use cosmwasm_std::testing::{
    message_info, mock_dependencies, mock_env, MockApi, MockQuerier, MockStorage,
};
use cosmwasm_std::{
    coins, from_json, to_json_binary, Binary, ContractResult, CosmosMsg, Env, Event, OwnedDeps,
    Reply, Response, SubMsgResponse, SubMsgResult, SystemError, SystemResult, Uint128, WasmMsg,
    WasmQuery,
};
use gacha_common::{BlockHashResponse, CollectibleExecuteMsg, CollectibleQueryMsg, OracleQueryMsg};
use gacha_rack::msg::{
    AssignmentEntry, DrawResponse, ExecuteMsg as RackExecuteMsg, InstantiateMsg as RackInstantiateMsg,
    QueryMsg as RackQueryMsg, UserDrawsResponse,
};
use gacha_rack::ContractError;
use sha2::{Digest, Sha256};

type TestDeps = OwnedDeps<MockStorage, MockApi, MockQuerier>;

// ─── Constants ───

const DENOM: &str = "ugacha";
const TYPE_COUNT: u64 = 10;
const PRIZE_A: u64 = 2;
const PRIZE_B: u64 = 3;

// ─── Oracle helpers ───

/// Stand-in for the chain's hash of `height`.
fn chain_hash_hex(height: u64) -> String {
    let mut hasher = Sha256::new();
    hasher.update(b"block");
    hasher.update(height.to_be_bytes());
    hex::encode(hasher.finalize())
}

fn setup_oracle() -> TestDeps {
    let mut deps = mock_dependencies();
    let admin = deps.api.addr_make("admin");
    let operator = deps.api.addr_make("operator");
    let msg = gacha_block_hash_oracle::msg::InstantiateMsg {
        operators: vec![operator.to_string()],
    };
    gacha_block_hash_oracle::contract::instantiate(
        deps.as_mut(),
        mock_env(),
        message_info(&admin, &[]),
        msg,
    )
    .unwrap();
    deps
}

/// Record the hash of `height` one block after it was produced.
fn record_hash(oracle: &mut TestDeps, height: u64) {
    let operator = oracle.api.addr_make("operator");
    let mut env = mock_env();
    env.block.height = height + 1;
    gacha_block_hash_oracle::contract::execute(
        oracle.as_mut(),
        env,
        message_info(&operator, &[]),
        gacha_block_hash_oracle::msg::ExecuteMsg::RecordBlockHash {
            height,
            hash_hex: chain_hash_hex(height),
        },
    )
    .unwrap();
}

/// Raw oracle answers for `heights`, as the rack would receive them.
fn oracle_answers(oracle: &TestDeps, heights: impl Iterator<Item = u64>) -> BTreeMap<u64, Binary> {
    heights
        .map(|height| {
            let res = gacha_block_hash_oracle::contract::query(
                oracle.as_ref(),
                mock_env(),
                gacha_block_hash_oracle::msg::QueryMsg::BlockHash { height },
            )
            .unwrap();
            (height, res)
        })
        .collect()
}

// ─── Rack helpers ───

/// Answer the rack's queries: the collectible reports `TYPE_COUNT` types,
/// the oracle replies from `answers` (unknown heights have no hash).
fn wire_rack(rack: &mut TestDeps, answers: BTreeMap<u64, Binary>) {
    let collectible = rack.api.addr_make("collectible").to_string();
    let oracle = rack.api.addr_make("oracle").to_string();
    rack.querier.update_wasm(move |query| match query {
        WasmQuery::Smart { contract_addr, msg } if *contract_addr == collectible => {
            let CollectibleQueryMsg::TokenTypeCount {} = from_json(msg).unwrap();
            SystemResult::Ok(ContractResult::Ok(to_json_binary(&TYPE_COUNT).unwrap()))
        }
        WasmQuery::Smart { contract_addr, msg } if *contract_addr == oracle => {
            let OracleQueryMsg::BlockHash { height } = from_json(msg).unwrap();
            let answer = answers
                .get(&height)
                .cloned()
                .unwrap_or_else(|| to_json_binary(&None::<BlockHashResponse>).unwrap());
            SystemResult::Ok(ContractResult::Ok(answer))
        }
        _ => SystemResult::Err(SystemError::InvalidRequest {
            error: "Unknown query".to_string(),
            request: Default::default(),
        }),
    });
}

fn setup_rack() -> TestDeps {
    let mut deps = mock_dependencies();
    wire_rack(&mut deps, BTreeMap::new());

    let admin = deps.api.addr_make("admin");
    let msg = RackInstantiateMsg {
        managers: vec![deps.api.addr_make("manager").to_string()],
        prize_token: deps.api.addr_make("collectible").to_string(),
        entropy_oracle: deps.api.addr_make("oracle").to_string(),
        payment_denom: DENOM.to_string(),
        recipient: None,
    };
    gacha_rack::contract::instantiate(deps.as_mut(), mock_env(), message_info(&admin, &[]), msg)
        .unwrap();
    deps
}

fn env_at(height: u64) -> Env {
    let mut env = mock_env();
    env.block.height = height;
    env
}

fn rack_manage(rack: &mut TestDeps, msg: RackExecuteMsg) -> Result<Response, ContractError> {
    let manager = rack.api.addr_make("manager");
    gacha_rack::contract::execute(rack.as_mut(), mock_env(), message_info(&manager, &[]), msg)
}

fn create_game(rack: &mut TestDeps, price: u128, delay: u64, supply: u128, prizes: &[(u64, u128)]) {
    rack_manage(
        rack,
        RackExecuteMsg::CreateGame {
            draw_price: Uint128::new(price),
            blocks_to_reveal: delay,
            initial_supply: Uint128::new(supply),
            flow_numerator: Uint128::zero(),
            flow_denominator: Uint128::one(),
            start_block: 0,
            prize_types: prizes.iter().map(|(t, _)| *t).collect(),
            prize_weights: prizes.iter().map(|(_, w)| Uint128::new(*w)).collect(),
            activated: true,
            make_current: Some(false),
        },
    )
    .unwrap();
}

fn purchase(
    rack: &mut TestDeps,
    env: Env,
    buyer: &str,
    count: u64,
    price: u128,
) -> Result<Response, ContractError> {
    let buyer = rack.api.addr_make(buyer);
    gacha_rack::contract::execute(
        rack.as_mut(),
        env,
        message_info(&buyer, &coins(price * count as u128, DENOM)),
        RackExecuteMsg::PurchaseDraws {
            buyer: None,
            count,
            max_unit_price: Uint128::new(price),
        },
    )
}

fn reveal(
    rack: &mut TestDeps,
    env: Env,
    buyer: &str,
    draw_ids: Vec<u64>,
) -> Result<Response, ContractError> {
    let buyer = rack.api.addr_make(buyer);
    gacha_rack::contract::execute(
        rack.as_mut(),
        env,
        message_info(&buyer, &[]),
        RackExecuteMsg::RevealDraws {
            buyer: None,
            draw_ids,
        },
    )
}

/// Play the collectible's part: execute each mint and feed the reply back.
/// Returns the minted (owner, token_type) pairs.
#[allow(deprecated)]
fn deliver_mints(rack: &mut TestDeps, res: &Response, next_token_id: &mut u64) -> Vec<(String, u64)> {
    let mut minted = Vec::new();
    for sub in &res.messages {
        let CosmosMsg::Wasm(WasmMsg::Execute { msg, .. }) = &sub.msg else {
            panic!("unexpected message {:?}", sub.msg);
        };
        let CollectibleExecuteMsg::Mint { owner, token_type } = from_json(msg).unwrap();
        minted.push((owner, token_type));

        let reply = Reply {
            id: sub.id,
            payload: sub.payload.clone(),
            gas_used: 0,
            result: SubMsgResult::Ok(SubMsgResponse {
                events: vec![Event::new("wasm")
                    .add_attribute("action", "mint")
                    .add_attribute("token_id", next_token_id.to_string())],
                data: None,
                msg_responses: vec![],
            }),
        };
        gacha_rack::contract::reply(rack.as_mut(), mock_env(), reply).unwrap();
        *next_token_id += 1;
    }
    minted
}

fn query_rack<T: serde::de::DeserializeOwned>(rack: &TestDeps, env: Env, msg: RackQueryMsg) -> T {
    from_json(gacha_rack::contract::query(rack.as_ref(), env, msg).unwrap()).unwrap()
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[test]
fn test_purchase_reveal_and_mint() {
    let mut rack = setup_rack();
    let mut oracle = setup_oracle();
    create_game(&mut rack, 100, 15, 50, &[(PRIZE_A, 10), (PRIZE_B, 30)]);

    // 1. Five draws at block N
    let n = mock_env().block.height;
    purchase(&mut rack, env_at(n), "alice", 5, 100).unwrap();
    let available: Uint128 =
        query_rack(&rack, env_at(n), RackQueryMsg::AvailableSupplyForGame { game_id: 0 });
    assert_eq!(available, Uint128::new(45));

    // 2. Too early, at N + 14
    let err = reveal(&mut rack, env_at(n + 14), "alice", (0..5).collect()).unwrap_err();
    assert!(matches!(err, ContractError::NotRevealable { .. }));

    // 3. Oracle records block N + 15, rack reveals at N + 16
    record_hash(&mut oracle, n + 15);
    wire_rack(&mut rack, oracle_answers(&oracle, n..n + 30));
    let res = reveal(&mut rack, env_at(n + 16), "alice", (0..5).collect()).unwrap();
    let entropy_attr = res
        .events
        .iter()
        .find(|e| e.ty == "gacha_draw_revealed")
        .and_then(|e| e.attributes.iter().find(|a| a.key == "entropy"))
        .unwrap();
    assert_eq!(entropy_attr.value, chain_hash_hex(n + 15));

    // 4. Collectible mints and reports ids back
    let mut next_token_id = 1;
    let minted = deliver_mints(&mut rack, &res, &mut next_token_id);
    assert_eq!(minted.len(), 5);
    let alice = rack.api.addr_make("alice");
    for (owner, token_type) in &minted {
        assert_eq!(*owner, alice.to_string());
        assert!(*token_type == PRIZE_A || *token_type == PRIZE_B);
    }

    let draws: UserDrawsResponse = query_rack(
        &rack,
        env_at(n + 16),
        RackQueryMsg::UserDraws {
            user: alice.to_string(),
            start_after: None,
            limit: None,
        },
    );
    assert_eq!(draws.draw_count, 5);
    for (i, draw) in draws.draws.iter().enumerate() {
        assert_eq!(draw.token_id, Some((i + 1).to_string()));
        assert_eq!(draw.token_type, Some(minted[i].1));
    }

    // 5. Double reveal is rejected
    let err = reveal(&mut rack, env_at(n + 17), "alice", vec![0]).unwrap_err();
    assert!(matches!(err, ContractError::AlreadyRevealed { draw_id: 0 }));
}

#[test]
fn test_reveal_waits_for_oracle() {
    let mut rack = setup_rack();
    let mut oracle = setup_oracle();
    create_game(&mut rack, 100, 15, 50, &[(PRIZE_A, 10), (PRIZE_B, 30)]);

    let n = mock_env().block.height;
    purchase(&mut rack, env_at(n), "alice", 1, 100).unwrap();

    // Revealable, but the oracle has not recorded the block yet
    let draw: DrawResponse = query_rack(&rack, env_at(n + 15), RackQueryMsg::Draw { draw_id: 0 });
    assert!(draw.revealable);
    let err = reveal(&mut rack, env_at(n + 15), "alice", vec![0]).unwrap_err();
    assert!(matches!(err, ContractError::EntropyUnavailable { height } if height == n + 15));

    // A hash for a different block does not help
    record_hash(&mut oracle, n + 14);
    wire_rack(&mut rack, oracle_answers(&oracle, n..n + 30));
    let err = reveal(&mut rack, env_at(n + 16), "alice", vec![0]).unwrap_err();
    assert!(matches!(err, ContractError::EntropyUnavailable { .. }));

    record_hash(&mut oracle, n + 15);
    wire_rack(&mut rack, oracle_answers(&oracle, n..n + 30));
    let res = reveal(&mut rack, env_at(n + 16), "alice", vec![0]).unwrap();
    assert_eq!(res.messages.len(), 1);
}

#[test]
fn test_oracle_hash_cannot_be_replaced() {
    let mut oracle = setup_oracle();
    let n = mock_env().block.height;
    record_hash(&mut oracle, n);

    let operator = oracle.api.addr_make("operator");
    let err = gacha_block_hash_oracle::contract::execute(
        oracle.as_mut(),
        env_at(n + 5),
        message_info(&operator, &[]),
        gacha_block_hash_oracle::msg::ExecuteMsg::RecordBlockHash {
            height: n,
            hash_hex: chain_hash_hex(n + 1),
        },
    )
    .unwrap_err();
    assert!(matches!(
        err,
        gacha_block_hash_oracle::ContractError::HashAlreadyRecorded { .. }
    ));

    let answers = oracle_answers(&oracle, n..n + 1);
    let recorded: Option<BlockHashResponse> = from_json(&answers[&n]).unwrap();
    assert_eq!(recorded.unwrap().hash_hex(), chain_hash_hex(n));
}

#[test]
fn test_weighted_selection_end_to_end() {
    let mut rack = setup_rack();
    let mut oracle = setup_oracle();
    create_game(&mut rack, 1, 15, 1_000, &[(PRIZE_A, 10), (PRIZE_B, 30)]);

    // One draw per block over 200 blocks
    let n = mock_env().block.height;
    let blocks = 200u64;
    for offset in 0..blocks {
        purchase(&mut rack, env_at(n + offset), "alice", 1, 1).unwrap();
        record_hash(&mut oracle, n + offset + 15);
    }
    wire_rack(&mut rack, oracle_answers(&oracle, n + 15..n + 15 + blocks));

    let reveal_env = env_at(n + blocks + 20);
    let mut next_token_id = 1;
    let mut wins_a = 0u64;
    for batch in (0..blocks).collect::<Vec<_>>().chunks(100) {
        let res = reveal(&mut rack, reveal_env.clone(), "alice", batch.to_vec()).unwrap();
        let minted = deliver_mints(&mut rack, &res, &mut next_token_id);
        wins_a += minted.iter().filter(|(_, t)| *t == PRIZE_A).count() as u64;
    }

    // expected 50, standard deviation ~6
    assert!((25..=75).contains(&wins_a), "wins_a = {wins_a}");
}

#[test]
fn test_supply_is_tracked_per_game() {
    let mut rack = setup_rack();
    create_game(&mut rack, 100, 15, 50, &[(PRIZE_A, 10), (PRIZE_B, 30)]);
    create_game(&mut rack, 120, 10, 20, &[(5, 5), (6, 2), (7, 1)]);
    create_game(&mut rack, 25, 5, 0, &[(8, 100), (1, 1)]);

    let alice = rack.api.addr_make("alice");
    let bob = rack.api.addr_make("bob");
    let carol = rack.api.addr_make("carol");
    for (game_id, user) in [(0, &alice), (1, &bob), (2, &carol)] {
        rack_manage(
            &mut rack,
            RackExecuteMsg::AssignGame {
                game_id,
                users: vec![user.to_string()],
            },
        )
        .unwrap();
    }

    let env = mock_env();
    let supply = |rack: &TestDeps, user: &str| -> u128 {
        query_rack::<Uint128>(
            rack,
            mock_env(),
            RackQueryMsg::AvailableSupplyForUser {
                user: rack.api.addr_make(user).to_string(),
            },
        )
        .u128()
    };
    assert_eq!(supply(&rack, "alice"), 50);
    assert_eq!(supply(&rack, "bob"), 20);
    assert_eq!(supply(&rack, "carol"), 0);

    purchase(&mut rack, env.clone(), "alice", 10, 100).unwrap();
    purchase(&mut rack, env.clone(), "bob", 5, 120).unwrap();
    let err = purchase(&mut rack, env.clone(), "carol", 1, 25).unwrap_err();
    assert!(matches!(err, ContractError::InsufficientSupply { .. }));

    // Bob's price limit is checked against his own game
    let err = purchase(&mut rack, env.clone(), "bob", 1, 100).unwrap_err();
    assert!(matches!(err, ContractError::PriceAboveLimit { .. }));

    assert_eq!(supply(&rack, "alice"), 40);
    assert_eq!(supply(&rack, "bob"), 15);

    rack_manage(
        &mut rack,
        RackExecuteMsg::SetGameSupply {
            game_id: 2,
            supply: Uint128::new(3),
        },
    )
    .unwrap();
    purchase(&mut rack, env, "carol", 3, 25).unwrap();
    assert_eq!(supply(&rack, "carol"), 0);

    let state: gacha_rack::state::RackState =
        query_rack(&rack, mock_env(), RackQueryMsg::RackState {});
    assert_eq!(state.total_draws, 18);
}

#[test]
fn test_assignment_scenario() {
    let mut rack = setup_rack();
    create_game(&mut rack, 100, 15, 50, &[(PRIZE_A, 10)]);
    create_game(&mut rack, 120, 10, 20, &[(5, 5)]);
    create_game(&mut rack, 25, 5, 80, &[(8, 100)]);

    let names = ["alice", "bob", "carol", "dave", "edith"];
    let mut game_for: BTreeMap<&'static str, Option<u64>> = names.iter().map(|n| (*n, None)).collect();

    let check = |rack: &TestDeps, game_for: &BTreeMap<&'static str, Option<u64>>| {
        let default: u64 = query_rack(rack, mock_env(), RackQueryMsg::CurrentGame {});
        for (name, assigned) in game_for {
            let user = rack.api.addr_make(name).to_string();
            let current: u64 =
                query_rack(rack, mock_env(), RackQueryMsg::CurrentGameFor { user: user.clone() });
            assert_eq!(current, assigned.unwrap_or(default), "{name}");
            let index: Option<u64> =
                query_rack(rack, mock_env(), RackQueryMsg::AssignmentIndex { user });
            assert_eq!(index.is_some(), assigned.is_some(), "{name}");
        }

        let count: u64 = query_rack(rack, mock_env(), RackQueryMsg::AssignmentCount {});
        let expected = game_for.values().filter(|g| g.is_some()).count() as u64;
        assert_eq!(count, expected);

        let entries: Vec<AssignmentEntry> = query_rack(
            rack,
            mock_env(),
            RackQueryMsg::Assignments {
                start_after: None,
                limit: None,
            },
        );
        assert_eq!(entries.len() as u64, count);
        for (i, entry) in entries.iter().enumerate() {
            assert_eq!(entry.index, i as u64);
            let index: Option<u64> = query_rack(
                rack,
                mock_env(),
                RackQueryMsg::AssignmentIndex {
                    user: entry.user.to_string(),
                },
            );
            assert_eq!(index, Some(entry.index));
        }
    };

    let assign = |rack: &mut TestDeps, game_id: u64, users: &[&str]| {
        let users = users.iter().map(|u| rack.api.addr_make(u).to_string()).collect();
        rack_manage(rack, RackExecuteMsg::AssignGame { game_id, users }).unwrap();
    };
    let clear = |rack: &mut TestDeps, users: &[&str]| {
        let users = users.iter().map(|u| rack.api.addr_make(u).to_string()).collect();
        rack_manage(rack, RackExecuteMsg::ClearAssignedGame { users }).unwrap();
    };

    check(&rack, &game_for);

    assign(&mut rack, 1, &["alice", "bob"]);
    game_for.insert("alice", Some(1));
    game_for.insert("bob", Some(1));
    check(&rack, &game_for);

    assign(&mut rack, 2, &["carol", "dave", "edith"]);
    for name in ["carol", "dave", "edith"] {
        game_for.insert(name, Some(2));
    }
    check(&rack, &game_for);

    assign(&mut rack, 0, &["alice", "dave"]);
    game_for.insert("alice", Some(0));
    game_for.insert("dave", Some(0));
    check(&rack, &game_for);

    rack_manage(&mut rack, RackExecuteMsg::SetDefaultGame { game_id: 1 }).unwrap();
    check(&rack, &game_for);

    clear(&mut rack, &[]);
    check(&rack, &game_for);

    clear(&mut rack, &["alice", "carol"]);
    game_for.insert("alice", None);
    game_for.insert("carol", None);
    check(&rack, &game_for);

    clear(&mut rack, &["edith", "manager", "alice"]);
    game_for.insert("edith", None);
    check(&rack, &game_for);

    let carol = rack.api.addr_make("carol");
    let err = rack_manage(
        &mut rack,
        RackExecuteMsg::AssignGame {
            game_id: 3,
            users: vec![carol.to_string()],
        },
    )
    .unwrap_err();
    assert!(matches!(err, ContractError::InvalidGameId { game_id: 3 }));
}

#[test]
fn test_payment_flows_to_recipient() {
    let mut rack = setup_rack();
    create_game(&mut rack, 100, 15, 50, &[(PRIZE_A, 10)]);

    let treasury = rack.api.addr_make("treasury");
    rack_manage(
        &mut rack,
        RackExecuteMsg::SetRecipient {
            recipient: Some(treasury.to_string()),
        },
    )
    .unwrap();

    let alice = rack.api.addr_make("alice");
    let res = gacha_rack::contract::execute(
        rack.as_mut(),
        mock_env(),
        message_info(&alice, &coins(450, DENOM)),
        RackExecuteMsg::PurchaseDraws {
            buyer: None,
            count: 4,
            max_unit_price: Uint128::new(100),
        },
    )
    .unwrap();

    let sends: Vec<(String, u128)> = res
        .messages
        .iter()
        .map(|sub| match &sub.msg {
            CosmosMsg::Bank(cosmwasm_std::BankMsg::Send { to_address, amount }) => {
                (to_address.clone(), amount[0].amount.u128())
            }
            other => panic!("unexpected message {other:?}"),
        })
        .collect();
    assert_eq!(
        sends,
        vec![(alice.to_string(), 50), (treasury.to_string(), 400)]
    );

    // Clearing the recipient keeps proceeds in the contract
    rack_manage(&mut rack, RackExecuteMsg::SetRecipient { recipient: None }).unwrap();
    let res = purchase(&mut rack, mock_env(), "alice", 1, 100).unwrap();
    assert!(res.messages.is_empty());
}
