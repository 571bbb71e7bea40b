use gacha_common::{mix_entropy, winning_ticket};

use crate::error::ContractError;
use crate::state::{Game, Prize};

/// Pick a prize from `game` for `draw_id` using the entropy of the draw's
/// revealable block.
///
/// The ticket falls into the half-open range `[cumulative_before,
/// cumulative_before + weight)` of exactly one prize, so each prize wins
/// with probability `weight / total_weight`.
pub fn select_prize<'a>(
    game: &'a Game,
    entropy: &[u8],
    draw_id: u64,
) -> Result<&'a Prize, ContractError> {
    let mixed = mix_entropy(entropy, draw_id);
    let ticket = winning_ticket(&mixed, game.total_weight.u128())
        .ok_or(ContractError::ZeroTotalWeight { game_id: game.id })?;
    prize_for_ticket(&game.prizes, ticket).ok_or(ContractError::ZeroTotalWeight { game_id: game.id })
}

pub fn prize_for_ticket(prizes: &[Prize], ticket: u128) -> Option<&Prize> {
    let mut cumulative = 0u128;
    for prize in prizes {
        cumulative += prize.weight.u128();
        if ticket < cumulative {
            return Some(prize);
        }
    }
    None
}
