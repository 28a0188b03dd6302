//! In-process stand-ins for the upstream farm and the incentive program.
//!
//! Both follow the interfaces in [`crate::adapters`] closely enough for the
//! proxy farm to drive them, and expose a few knobs (freezing, schedule
//! changes, call counters) for tests.

use soroban_sdk::{
    contract, contracterror, contractimpl, symbol_short, token, Address, Env, Symbol, Vec,
};

use crate::adapters::IncentivePoolInfo;

const TOKEN: Symbol = symbol_short!("TOKEN");
const FROZEN: Symbol = symbol_short!("FROZEN");
const HARVESTS: Symbol = symbol_short!("HARVESTS");
const POSITION: Symbol = symbol_short!("POS");

const REWARD: Symbol = symbol_short!("REWARD");
const RPS: Symbol = symbol_short!("RPS");
const TOTAL_ALLOC: Symbol = symbol_short!("TOT_ALLOC");
const POOL_ALLOC: Symbol = symbol_short!("POOL_ALOC");
const CLAIMS: Symbol = symbol_short!("CLAIMS");
const EXITS: Symbol = symbol_short!("EXITS");

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum MockError {
    Frozen = 1,
    InsufficientPosition = 2,
}

fn bump(env: &Env, key: &Symbol) {
    let count: u32 = env.storage().instance().get(key).unwrap_or(0);
    env.storage().instance().set(key, &(count + 1));
}

fn position_of(env: &Env, owner: &Address) -> i128 {
    env.storage()
        .instance()
        .get(&(POSITION, owner.clone()))
        .unwrap_or(0)
}

fn set_position(env: &Env, owner: &Address, amount: i128) {
    env.storage()
        .instance()
        .set(&(POSITION, owner.clone()), &amount);
}

fn is_frozen(env: &Env) -> bool {
    env.storage().instance().get(&FROZEN).unwrap_or(false)
}

fn token_client<'a>(env: &'a Env, key: &Symbol) -> token::Client<'a> {
    let address: Address = env.storage().instance().get(key).unwrap();
    token::Client::new(env, &address)
}

// ── Upstream farm ────────────────────────────────────────────────────────────

#[contract]
pub struct MockUpstreamFarm;

#[contractimpl]
impl MockUpstreamFarm {
    pub fn init(env: Env, lp_token: Address) {
        env.storage().instance().set(&TOKEN, &lp_token);
    }

    /// While frozen, `withdraw_and_harvest` fails.
    pub fn set_frozen(env: Env, frozen: bool) {
        env.storage().instance().set(&FROZEN, &frozen);
    }

    pub fn position(env: Env, owner: Address) -> i128 {
        position_of(&env, &owner)
    }

    pub fn harvest_count(env: Env) -> u32 {
        env.storage().instance().get(&HARVESTS).unwrap_or(0)
    }

    pub fn deposit(env: Env, pool_id: u32, amount: i128, to: Address) {
        let _ = pool_id;
        let this = env.current_contract_address();
        token_client(&env, &TOKEN).transfer_from(&this, &to, &this, &amount);
        set_position(&env, &to, position_of(&env, &to) + amount);
    }

    pub fn withdraw_and_harvest(
        env: Env,
        pool_id: u32,
        amount: i128,
        to: Address,
    ) -> Result<(), MockError> {
        let _ = pool_id;
        to.require_auth();
        if is_frozen(&env) {
            return Err(MockError::Frozen);
        }
        let held = position_of(&env, &to);
        if held < amount {
            return Err(MockError::InsufficientPosition);
        }
        set_position(&env, &to, held - amount);
        token_client(&env, &TOKEN).transfer(&env.current_contract_address(), &to, &amount);
        bump(&env, &HARVESTS);
        Ok(())
    }

    pub fn emergency_withdraw(env: Env, pool_id: u32, to: Address) {
        let _ = pool_id;
        to.require_auth();
        let held = position_of(&env, &to);
        set_position(&env, &to, 0);
        if held > 0 {
            token_client(&env, &TOKEN).transfer(&env.current_contract_address(), &to, &held);
        }
    }

    pub fn harvest(env: Env, pool_id: u32, to: Address) {
        let _ = (pool_id, to);
        bump(&env, &HARVESTS);
    }
}

// ── Incentive program ────────────────────────────────────────────────────────

#[contract]
pub struct MockIncentiveProgram;

#[contractimpl]
impl MockIncentiveProgram {
    /// `claim` hands over the program's whole reward-token balance, so tests
    /// fund harvests by minting to the program.
    pub fn init(
        env: Env,
        reward_token: Address,
        placeholder_token: Address,
        rewards_per_second: i128,
        total_alloc_weight: u64,
    ) {
        let storage = env.storage().instance();
        storage.set(&REWARD, &reward_token);
        storage.set(&TOKEN, &placeholder_token);
        storage.set(&RPS, &rewards_per_second);
        storage.set(&TOTAL_ALLOC, &total_alloc_weight);
    }

    pub fn set_pool_alloc(env: Env, pool_id: u32, alloc_weight: u64) {
        env.storage()
            .instance()
            .set(&(POOL_ALLOC, pool_id), &alloc_weight);
    }

    pub fn set_total_alloc(env: Env, total_alloc_weight: u64) {
        env.storage().instance().set(&TOTAL_ALLOC, &total_alloc_weight);
    }

    pub fn set_rewards_per_second(env: Env, rewards_per_second: i128) {
        env.storage().instance().set(&RPS, &rewards_per_second);
    }

    /// While frozen, `claim` fails.
    pub fn set_frozen(env: Env, frozen: bool) {
        env.storage().instance().set(&FROZEN, &frozen);
    }

    pub fn staked(env: Env, owner: Address) -> i128 {
        position_of(&env, &owner)
    }

    pub fn claim_count(env: Env) -> u32 {
        env.storage().instance().get(&CLAIMS).unwrap_or(0)
    }

    pub fn exit_count(env: Env) -> u32 {
        env.storage().instance().get(&EXITS).unwrap_or(0)
    }

    pub fn deposit(env: Env, pool_id: u32, amount: i128, from: Address) {
        let _ = pool_id;
        let this = env.current_contract_address();
        token_client(&env, &TOKEN).transfer_from(&this, &from, &this, &amount);
        set_position(&env, &from, position_of(&env, &from) + amount);
    }

    pub fn claim(env: Env, pool_ids: Vec<u32>, to: Address) -> Result<(), MockError> {
        let _ = pool_ids;
        if is_frozen(&env) {
            return Err(MockError::Frozen);
        }
        bump(&env, &CLAIMS);
        Self::pay_out(&env, &to);
        Ok(())
    }

    pub fn exit(env: Env, to: Address) {
        to.require_auth();
        let held = position_of(&env, &to);
        set_position(&env, &to, 0);
        if held > 0 {
            token_client(&env, &TOKEN).transfer(&env.current_contract_address(), &to, &held);
        }
        Self::pay_out(&env, &to);
        bump(&env, &EXITS);
    }

    pub fn pool_info(env: Env, pool_id: u32) -> IncentivePoolInfo {
        IncentivePoolInfo {
            alloc_weight: env
                .storage()
                .instance()
                .get(&(POOL_ALLOC, pool_id))
                .unwrap_or(0),
        }
    }

    pub fn rewards_per_second(env: Env) -> i128 {
        env.storage().instance().get(&RPS).unwrap_or(0)
    }

    pub fn total_alloc_weight(env: Env) -> u64 {
        env.storage().instance().get(&TOTAL_ALLOC).unwrap_or(0)
    }

    fn pay_out(env: &Env, to: &Address) {
        let reward = token_client(env, &REWARD);
        let this = env.current_contract_address();
        let balance = reward.balance(&this);
        if balance > 0 {
            reward.transfer(&this, to, &balance);
        }
    }
}
