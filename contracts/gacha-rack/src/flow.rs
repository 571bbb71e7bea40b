//! Draw supply that grows linearly with block height.
//!
//! A game's supply is described by a checkpoint: at `checkpoint_block` the
//! cumulative supply is `checkpoint_supply`, and every block after it adds
//! `numerator / denominator` draws. Values are always recomputed from the
//! checkpoint, so rate changes never accumulate rounding drift.

use cosmwasm_schema::cw_serde;
use cosmwasm_std::Uint128;

use crate::error::ContractError;

/// Upper bound for both flow numerator and denominator. Together with a
/// `u64` block delta the product stays below `2^128`.
pub const MAX_FLOW_PRECISION: u128 = 1_000_000_000_000_000_000;

#[cw_serde]
pub struct DrawFlow {
    pub numerator: Uint128,
    pub denominator: Uint128,
    pub checkpoint_block: u64,
    /// Cumulative supply (drawn + available) at `checkpoint_block`
    pub checkpoint_supply: Uint128,
}

impl DrawFlow {
    pub fn new(
        numerator: Uint128,
        denominator: Uint128,
        checkpoint_block: u64,
        checkpoint_supply: Uint128,
    ) -> Result<Self, ContractError> {
        validate_rate(numerator, denominator)?;
        Ok(DrawFlow {
            numerator,
            denominator,
            checkpoint_block,
            checkpoint_supply,
        })
    }

    /// Cumulative supply at `height`. Heights before the checkpoint see the
    /// checkpoint value unchanged.
    pub fn value_at(&self, height: u64) -> Uint128 {
        if height < self.checkpoint_block {
            return self.checkpoint_supply;
        }
        let elapsed = Uint128::from(height - self.checkpoint_block);
        let accrued = elapsed.multiply_ratio(self.numerator, self.denominator);
        self.checkpoint_supply.saturating_add(accrued)
    }

    /// Supply still purchasable at `height` after `drawn` draws.
    pub fn available_at(&self, height: u64, drawn: u64) -> Uint128 {
        self.value_at(height).saturating_sub(Uint128::from(drawn))
    }

    /// New rate from `effective_block` on, continuing from what is
    /// available now.
    pub fn with_rate(
        &self,
        height: u64,
        drawn: u64,
        numerator: Uint128,
        denominator: Uint128,
        effective_block: u64,
    ) -> Result<Self, ContractError> {
        let available = self.available_at(height, drawn);
        DrawFlow::new(
            numerator,
            denominator,
            resolve_effective_block(effective_block, height),
            available.checked_add(Uint128::from(drawn))?,
        )
    }

    /// Set the available supply to `supply`, keeping the rate. A start block
    /// still in the future is preserved.
    pub fn with_supply(
        &self,
        height: u64,
        drawn: u64,
        supply: Uint128,
    ) -> Result<Self, ContractError> {
        Ok(DrawFlow {
            numerator: self.numerator,
            denominator: self.denominator,
            checkpoint_block: self.checkpoint_block.max(height),
            checkpoint_supply: supply.checked_add(Uint128::from(drawn))?,
        })
    }

    /// Replace rate and supply together.
    pub fn reset(
        height: u64,
        drawn: u64,
        supply: Uint128,
        numerator: Uint128,
        denominator: Uint128,
        effective_block: u64,
    ) -> Result<Self, ContractError> {
        DrawFlow::new(
            numerator,
            denominator,
            resolve_effective_block(effective_block, height),
            supply.checked_add(Uint128::from(drawn))?,
        )
    }
}

pub fn validate_rate(numerator: Uint128, denominator: Uint128) -> Result<(), ContractError> {
    if denominator.is_zero() {
        return Err(ContractError::ZeroDenominator);
    }
    if numerator.u128() > MAX_FLOW_PRECISION || denominator.u128() > MAX_FLOW_PRECISION {
        return Err(ContractError::PrecisionOverflow {
            max: MAX_FLOW_PRECISION,
        });
    }
    Ok(())
}

/// Requested blocks in the past (including 0) resolve to the current block,
/// so the first increment lands at `height + 1`.
pub fn resolve_effective_block(requested: u64, height: u64) -> u64 {
    requested.max(height)
}
