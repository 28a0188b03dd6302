use common::ttl;
use soroban_sdk::{contracttype, symbol_short, Address, Env, Symbol};

use crate::accrual::GlobalState;
use crate::ledger::UserPosition;
use crate::shadow::ShadowBalance;
use crate::ContractError;

// ── Storage keys ─────────────────────────────────────────────────────────────

const CONFIG: Symbol = symbol_short!("CONFIG");
const STATE: Symbol = symbol_short!("STATE");
const SHADOW: Symbol = symbol_short!("SHADOW");

// Per-user persistent storage uses tuple keys:  (prefix, user_address)
const POSITION: Symbol = symbol_short!("POS");

/// Deployment wiring, fixed at `initialize`.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FarmConfig {
    /// Holder of the administrative hooks.
    pub admin: Address,
    /// The single asset depositors stake.
    pub stake_token: Address,
    /// Asset paid out to depositors, emitted by the incentive program.
    pub reward_token: Address,
    /// Mintable asset that occupies the incentive-program slot.
    pub placeholder_token: Address,
    pub upstream_farm: Address,
    pub upstream_pool_id: u32,
    pub incentive_program: Address,
}

fn position_key(user: &Address) -> (Symbol, Address) {
    (POSITION, user.clone())
}

pub fn has_config(env: &Env) -> bool {
    env.storage().instance().has(&CONFIG)
}

pub fn load_config(env: &Env) -> Result<FarmConfig, ContractError> {
    env.storage()
        .instance()
        .get(&CONFIG)
        .ok_or(ContractError::NotInitialized)
}

pub fn save_config(env: &Env, cfg: &FarmConfig) {
    env.storage().instance().set(&CONFIG, cfg);
}

pub fn load_state(env: &Env) -> Result<GlobalState, ContractError> {
    env.storage()
        .instance()
        .get(&STATE)
        .ok_or(ContractError::NotInitialized)
}

pub fn save_state(env: &Env, state: &GlobalState) {
    env.storage().instance().set(&STATE, state);
}

pub fn load_shadow(env: &Env) -> Result<ShadowBalance, ContractError> {
    env.storage()
        .instance()
        .get(&SHADOW)
        .ok_or(ContractError::NotInitialized)
}

pub fn save_shadow(env: &Env, shadow: &ShadowBalance) {
    env.storage().instance().set(&SHADOW, shadow);
}

/// Returns the stored position, or an empty one for unknown depositors.
pub fn load_position(env: &Env, user: &Address) -> UserPosition {
    let key = position_key(user);
    let position: Option<UserPosition> = env.storage().persistent().get(&key);
    match position {
        Some(position) => {
            ttl::extend_persistent(env, &key);
            position
        }
        None => UserPosition::default(),
    }
}

pub fn save_position(env: &Env, user: &Address, position: &UserPosition) {
    let key = position_key(user);
    env.storage().persistent().set(&key, position);
    ttl::extend_persistent(env, &key);
}

pub fn remove_position(env: &Env, user: &Address) {
    env.storage().persistent().remove(&position_key(user));
}
