use soroban_sdk::{contracttype, Env};

use crate::accrual::{self, SCALE};
use crate::ContractError;

/// One depositor's stake and the part of the accumulator already paid to it.
#[contracttype]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct UserPosition {
    pub staked: i128,
    /// `staked × reward_per_share / SCALE` at the last settlement.
    pub reward_debt: i128,
}

/// How a settlement changes the stake.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum StakeChange {
    Increase(i128),
    Decrease(i128),
    Unchanged,
}

/// Result of settling a position against the accumulator.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Settlement {
    pub position: UserPosition,
    pub payout: i128,
}

/// Reward owed to `staked` units since inception at `reward_per_share`.
///
/// The product is taken at 256 bits; only the quotient has to fit in `i128`.
pub fn accrued(env: &Env, staked: i128, reward_per_share: i128) -> Result<i128, ContractError> {
    accrual::mul_div(env, staked, reward_per_share, SCALE)
}

/// Reward the position can claim right now.
///
/// A negative value means the stored debt is ahead of the accumulator, which
/// cannot happen while the accumulator only grows.
pub fn pending(
    env: &Env,
    position: &UserPosition,
    reward_per_share: i128,
) -> Result<i128, ContractError> {
    let owed = accrued(env, position.staked, reward_per_share)?
        .checked_sub(position.reward_debt)
        .ok_or(ContractError::ArithmeticOverflow)?;
    if owed < 0 {
        return Err(ContractError::InvariantViolation);
    }
    Ok(owed)
}

/// Pays out the pending reward and applies `change` to the stake.
///
/// The debt is reset to the fully caught-up value at the new stake rather than
/// adjusted incrementally, so repeated partial operations cannot drift.
pub fn settle(
    env: &Env,
    position: &UserPosition,
    reward_per_share: i128,
    change: StakeChange,
) -> Result<Settlement, ContractError> {
    let staked = match change {
        StakeChange::Increase(amount) => position
            .staked
            .checked_add(amount)
            .ok_or(ContractError::ArithmeticOverflow)?,
        StakeChange::Decrease(amount) => {
            if amount > position.staked {
                return Err(ContractError::InsufficientStake);
            }
            position.staked - amount
        }
        StakeChange::Unchanged => position.staked,
    };

    let payout = pending(env, position, reward_per_share)?;
    let reward_debt = accrued(env, staked, reward_per_share)?;

    Ok(Settlement {
        position: UserPosition {
            staked,
            reward_debt,
        },
        payout,
    })
}
