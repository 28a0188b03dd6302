use soroban_sdk::{contracttype, Env, I256};

use crate::ContractError;

/// Fixed-point scaling factor of the reward-per-share accumulator.
///
/// Reward-per-share values are stored multiplied by this constant so that
/// integer division by `total_staked` keeps twelve decimal places.
pub const SCALE: i128 = 1_000_000_000_000;

/// Contract-wide accrual state, one instance per deployment.
#[contracttype]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct GlobalState {
    /// Whether the accumulator is currently advancing.
    pub rewards_active: bool,
    /// Incentive-program pool this deployment is bound to. Set exactly once.
    pub incentive_pool_id: Option<u32>,
    /// Last ledger timestamp the accumulator was advanced to.
    pub last_update_time: u64,
    /// Reward tokens emitted per second across all depositors.
    pub rate_per_second: i128,
    /// Cumulative reward per staked unit, scaled by [`SCALE`].
    pub reward_per_share: i128,
    /// Sum of every depositor's stake.
    pub total_staked: i128,
}

/// `a × b / denominator` through a 256-bit intermediate, narrowed back to
/// `i128` only once the division is done.
pub fn mul_div(env: &Env, a: i128, b: i128, denominator: i128) -> Result<i128, ContractError> {
    if denominator == 0 {
        return Err(ContractError::ArithmeticOverflow);
    }
    I256::from_i128(env, a)
        .mul(&I256::from_i128(env, b))
        .div(&I256::from_i128(env, denominator))
        .to_i128()
        .ok_or(ContractError::ArithmeticOverflow)
}

/// Reward per staked unit (scaled) produced by `rate` over `elapsed` seconds.
///
/// ```text
/// Δacc = elapsed × rate × SCALE / total_staked
/// ```
pub fn reward_per_share_delta(
    env: &Env,
    elapsed: u64,
    rate: i128,
    total_staked: i128,
) -> Result<i128, ContractError> {
    if total_staked <= 0 {
        return Ok(0);
    }
    I256::from_i128(env, i128::from(elapsed))
        .mul(&I256::from_i128(env, rate))
        .mul(&I256::from_i128(env, SCALE))
        .div(&I256::from_i128(env, total_staked))
        .to_i128()
        .ok_or(ContractError::ArithmeticOverflow)
}

/// Moves the accumulator forward to `now` at the stored rate.
///
/// Same-instant calls, calls that go back in time, and calls while accrual
/// is parked leave the state untouched. With nothing staked the elapsed
/// window is skipped: the timestamp moves but nothing is banked.
pub fn advance(env: &Env, state: &mut GlobalState, now: u64) -> Result<(), ContractError> {
    if !state.rewards_active || now <= state.last_update_time {
        return Ok(());
    }

    if state.total_staked > 0 {
        let elapsed = now - state.last_update_time;
        let delta = reward_per_share_delta(env, elapsed, state.rate_per_second, state.total_staked)?;
        state.reward_per_share = state
            .reward_per_share
            .checked_add(delta)
            .ok_or(ContractError::ArithmeticOverflow)?;
    }

    state.last_update_time = now;
    Ok(())
}
