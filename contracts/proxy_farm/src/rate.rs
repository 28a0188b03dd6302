use soroban_sdk::Env;

use crate::accrual::GlobalState;
use crate::adapters::IncentiveProgramClient;
use crate::storage::FarmConfig;
use crate::ContractError;

/// This deployment earns half of what its incentive pool's weight implies;
/// the other half stays with the pool's other consumers.
pub const PROXY_SHARE_DIVISOR: i128 = 2;

/// The incentive program's emission schedule as seen from one pool.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct IncentiveSchedule {
    pub rewards_per_second: i128,
    pub pool_alloc_weight: u64,
    pub total_alloc_weight: u64,
}

/// Derives this deployment's emission rate from the incentive schedule.
///
/// A pool without weight (or a program without any weight at all) parks
/// accrual: the rate drops to zero and `rewards_active` is cleared. Nothing
/// here turns accrual back on.
pub fn recompute_rate(
    state: &mut GlobalState,
    schedule: &IncentiveSchedule,
) -> Result<(), ContractError> {
    if schedule.pool_alloc_weight == 0 || schedule.total_alloc_weight == 0 {
        state.rewards_active = false;
        state.rate_per_second = 0;
        return Ok(());
    }

    let pool_rate = schedule
        .rewards_per_second
        .max(0)
        .checked_mul(i128::from(schedule.pool_alloc_weight))
        .ok_or(ContractError::ArithmeticOverflow)?
        / i128::from(schedule.total_alloc_weight);

    state.rate_per_second = pool_rate / PROXY_SHARE_DIVISOR;
    Ok(())
}

/// Reads the bound pool's schedule from the incentive program.
pub fn read_schedule(env: &Env, cfg: &FarmConfig, pool_id: u32) -> IncentiveSchedule {
    let program = IncentiveProgramClient::new(env, &cfg.incentive_program);
    IncentiveSchedule {
        rewards_per_second: program.rewards_per_second(),
        pool_alloc_weight: program.pool_info(&pool_id).alloc_weight,
        total_alloc_weight: program.total_alloc_weight(),
    }
}

/// Re-reads the schedule and recomputes the rate when accrual is running.
///
/// Must be called after [`crate::accrual::advance`] so the elapsed window is
/// credited at the old rate. Returns `true` when the rate or the active flag
/// changed.
pub fn refresh(env: &Env, cfg: &FarmConfig, state: &mut GlobalState) -> Result<bool, ContractError> {
    let pool_id = match state.incentive_pool_id {
        Some(pool_id) if state.rewards_active => pool_id,
        _ => return Ok(false),
    };

    let before = (state.rate_per_second, state.rewards_active);
    let schedule = read_schedule(env, cfg, pool_id);
    recompute_rate(state, &schedule)?;
    Ok(before != (state.rate_per_second, state.rewards_active))
}
