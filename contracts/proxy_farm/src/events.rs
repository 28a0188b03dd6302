#![allow(deprecated)] // events().publish migration tracked separately

use soroban_sdk::{symbol_short, Address, Env};

// ── Event payloads ──────────────────────────────────────────────────────────

/// Fired once when the contract is bootstrapped.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct InitializedEvent {
    pub admin: Address,
    pub stake_token: Address,
    pub reward_token: Address,
    pub upstream_pool_id: u32,
    pub timestamp: u64,
}

/// Fired when the incentive-program binding is set.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PoolBoundEvent {
    pub pool_id: u32,
    pub rate_per_second: i128,
    pub rewards_active: bool,
    pub timestamp: u64,
}

/// Fired after a deposit has been persisted and forwarded upstream.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DepositEvent {
    pub depositor: Address,
    pub amount: i128,
    pub new_total_staked: i128,
    pub timestamp: u64,
}

/// Fired after a withdrawal has been persisted and paid out.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct WithdrawalEvent {
    pub depositor: Address,
    pub amount: i128,
    pub new_total_staked: i128,
    pub timestamp: u64,
}

/// Fired when a depositor abandons pending rewards to pull their whole stake.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EmergencyWithdrawalEvent {
    pub depositor: Address,
    pub amount: i128,
    pub timestamp: u64,
}

/// Fired whenever a non-zero reward is paid to a depositor.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RewardPaidEvent {
    pub depositor: Address,
    pub amount: i128,
    pub timestamp: u64,
}

/// Fired when the recomputed emission rate or the active flag changes.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RateUpdatedEvent {
    pub rate_per_second: i128,
    pub rewards_active: bool,
    pub timestamp: u64,
}

/// Fired when the normal upstream withdrawal failed and the emergency path ran.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct UpstreamFallbackEvent {
    pub requested: i128,
    pub recovered: i128,
    pub timestamp: u64,
}

/// Fired when the admin forces the upstream position into local custody.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EmergencyExitEvent {
    pub recovered: i128,
    pub timestamp: u64,
}

/// Fired when the placeholder stake leaves the incentive program.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct IncentiveRetiredEvent {
    pub pool_id: u32,
    pub timestamp: u64,
}

/// Fired when an unrelated asset is swept out.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SweptEvent {
    pub token: Address,
    pub to: Address,
    pub amount: i128,
    pub timestamp: u64,
}

// ── Publishers ──────────────────────────────────────────────────────────────

pub fn publish_initialized(
    env: &Env,
    admin: Address,
    stake_token: Address,
    reward_token: Address,
    upstream_pool_id: u32,
) {
    env.events().publish(
        (symbol_short!("INIT"),),
        InitializedEvent {
            admin,
            stake_token,
            reward_token,
            upstream_pool_id,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_pool_bound(env: &Env, pool_id: u32, rate_per_second: i128, rewards_active: bool) {
    env.events().publish(
        (symbol_short!("BOUND"),),
        PoolBoundEvent {
            pool_id,
            rate_per_second,
            rewards_active,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_deposit(env: &Env, depositor: Address, amount: i128, new_total_staked: i128) {
    env.events().publish(
        (symbol_short!("DEPOSIT"), depositor.clone()),
        DepositEvent {
            depositor,
            amount,
            new_total_staked,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_withdrawal(env: &Env, depositor: Address, amount: i128, new_total_staked: i128) {
    env.events().publish(
        (symbol_short!("WITHDRAW"), depositor.clone()),
        WithdrawalEvent {
            depositor,
            amount,
            new_total_staked,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_emergency_withdrawal(env: &Env, depositor: Address, amount: i128) {
    env.events().publish(
        (symbol_short!("EMRG_WD"), depositor.clone()),
        EmergencyWithdrawalEvent {
            depositor,
            amount,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_reward_paid(env: &Env, depositor: Address, amount: i128) {
    env.events().publish(
        (symbol_short!("RWD_PAID"), depositor.clone()),
        RewardPaidEvent {
            depositor,
            amount,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_rate_updated(env: &Env, rate_per_second: i128, rewards_active: bool) {
    env.events().publish(
        (symbol_short!("RATE_UPD"),),
        RateUpdatedEvent {
            rate_per_second,
            rewards_active,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_upstream_fallback(env: &Env, requested: i128, recovered: i128) {
    env.events().publish(
        (symbol_short!("FALLBACK"),),
        UpstreamFallbackEvent {
            requested,
            recovered,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_emergency_exit(env: &Env, recovered: i128) {
    env.events().publish(
        (symbol_short!("EMRG_EXIT"),),
        EmergencyExitEvent {
            recovered,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_incentive_retired(env: &Env, pool_id: u32) {
    env.events().publish(
        (symbol_short!("RETIRED"),),
        IncentiveRetiredEvent {
            pool_id,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_upstream_harvested(env: &Env, pool_id: u32) {
    env.events().publish(
        (symbol_short!("HARVEST"),),
        (pool_id, env.ledger().timestamp()),
    );
}

pub fn publish_swept(env: &Env, token: Address, to: Address, amount: i128) {
    env.events().publish(
        (symbol_short!("SWEPT"), token.clone()),
        SweptEvent {
            token,
            to,
            amount,
            timestamp: env.ledger().timestamp(),
        },
    );
}
