#![no_std]

pub mod accrual;
pub mod adapters;
pub mod events;
pub mod ledger;
pub mod rate;
pub mod shadow;
pub mod storage;

#[cfg(any(test, feature = "testutils"))]
pub mod testutils;

use common::{ttl, ReentrancyGuard};
use soroban_sdk::{contract, contractimpl, log, vec, Address, Env};

use adapters::{IncentiveProgramClient, UpstreamFarmClient};
use ledger::StakeChange;

pub use accrual::{GlobalState, SCALE};
pub use adapters::IncentivePoolInfo;
pub use ledger::UserPosition;
pub use shadow::ShadowBalance;
pub use storage::FarmConfig;

/// Units of the placeholder asset minted and staked in the incentive program.
pub const PLACEHOLDER_STAKE: i128 = 1;

// ── Contract errors ──────────────────────────────────────────────────────────

#[soroban_sdk::contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum ContractError {
    NotInitialized = 1,
    AlreadyInitialized = 2,
    Unauthorized = 3,
    InvalidInput = 4,
    InsufficientStake = 5,
    AlreadyBound = 6,
    NotBound = 7,
    InvariantViolation = 8,
    AssetTransferFailure = 9,
    ProtectedAsset = 10,
    TokensIdentical = 11,
    Reentrant = 12,
    ArithmeticOverflow = 13,
}

// ── Contract ─────────────────────────────────────────────────────────────────

#[contract]
pub struct ProxyFarmContract;

#[contractimpl]
impl ProxyFarmContract {
    // ── Initialisation ──────────────────────────────────────────────────────

    /// Bootstrap the contract.
    ///
    /// * `stake_token`       – the single asset depositors stake.
    /// * `reward_token`      – asset paid out to depositors.
    /// * `placeholder_token` – mintable asset administered by this contract,
    ///                         used only to occupy the incentive-program slot.
    /// * `upstream_farm` / `upstream_pool_id` – where deposits are forwarded.
    /// * `incentive_program` – source of the emission schedule.
    #[allow(clippy::too_many_arguments)]
    pub fn initialize(
        env: Env,
        admin: Address,
        stake_token: Address,
        reward_token: Address,
        placeholder_token: Address,
        upstream_farm: Address,
        upstream_pool_id: u32,
        incentive_program: Address,
    ) -> Result<(), ContractError> {
        if storage::has_config(&env) {
            return Err(ContractError::AlreadyInitialized);
        }
        if stake_token == reward_token
            || stake_token == placeholder_token
            || reward_token == placeholder_token
        {
            return Err(ContractError::TokensIdentical);
        }

        let cfg = FarmConfig {
            admin: admin.clone(),
            stake_token: stake_token.clone(),
            reward_token: reward_token.clone(),
            placeholder_token,
            upstream_farm,
            upstream_pool_id,
            incentive_program,
        };
        storage::save_config(&env, &cfg);
        storage::save_state(&env, &GlobalState::default());
        storage::save_shadow(&env, &ShadowBalance::default());
        ttl::extend_instance(&env);

        events::publish_initialized(&env, admin, stake_token, reward_token, upstream_pool_id);

        Ok(())
    }

    /// Bind the deployment to an incentive-program pool and start accrual.
    ///
    /// Mints the placeholder stake, lets the program pull it, and deposits it
    /// into `pool_id`. The binding can be set only once.
    pub fn bind_incentive_pool(env: Env, admin: Address, pool_id: u32) -> Result<(), ContractError> {
        let _guard = Self::enter(&env)?;
        let cfg = Self::require_admin(&env, &admin)?;

        let mut state = storage::load_state(&env)?;
        if state.incentive_pool_id.is_some() {
            return Err(ContractError::AlreadyBound);
        }

        let now = env.ledger().timestamp();
        accrual::advance(&env, &mut state, now)?;
        state.incentive_pool_id = Some(pool_id);
        state.rewards_active = true;
        state.last_update_time = now;
        rate::refresh(&env, &cfg, &mut state)?;
        storage::save_state(&env, &state);

        let this = env.current_contract_address();
        adapters::mint_to_self(&env, &cfg.placeholder_token, PLACEHOLDER_STAKE)?;
        adapters::approve(
            &env,
            &cfg.placeholder_token,
            &cfg.incentive_program,
            PLACEHOLDER_STAKE,
        )?;
        IncentiveProgramClient::new(&env, &cfg.incentive_program).deposit(
            &pool_id,
            &PLACEHOLDER_STAKE,
            &this,
        );

        ttl::extend_instance(&env);
        events::publish_pool_bound(&env, pool_id, state.rate_per_second, state.rewards_active);

        Ok(())
    }

    // ── Depositor entry points ──────────────────────────────────────────────

    /// Stake `amount` and forward it to the upstream farm.
    ///
    /// Any reward pending on the existing stake is paid out first.
    pub fn deposit(env: Env, depositor: Address, amount: i128) -> Result<(), ContractError> {
        let _guard = Self::enter(&env)?;
        let cfg = storage::load_config(&env)?;
        depositor.require_auth();

        if amount <= 0 {
            return Err(ContractError::InvalidInput);
        }

        // 1. Advance the index at the old rate, then refresh the rate.
        let mut state = Self::sync(&env, &cfg)?;
        let position = storage::load_position(&env, &depositor);
        if position.staked > 0 {
            Self::harvest_incentive(&env, &cfg, &state);
        }

        // 2. Settle against the advanced index and grow the stake.
        let settlement = ledger::settle(
            &env,
            &position,
            state.reward_per_share,
            StakeChange::Increase(amount),
        )?;
        state.total_staked = state
            .total_staked
            .checked_add(amount)
            .ok_or(ContractError::ArithmeticOverflow)?;

        let mut shadow = storage::load_shadow(&env)?;
        shadow.record_deposit(amount)?;
        shadow::check_conservation(&shadow, state.total_staked)?;

        // 3. Persist before any external call.
        storage::save_position(&env, &depositor, &settlement.position);
        storage::save_state(&env, &state);
        storage::save_shadow(&env, &shadow);

        // 4. Move funds.
        Self::pay_reward(&env, &cfg, &depositor, settlement.payout)?;
        let this = env.current_contract_address();
        adapters::transfer(&env, &cfg.stake_token, &depositor, &this, amount)?;
        adapters::approve(&env, &cfg.stake_token, &cfg.upstream_farm, amount)?;
        UpstreamFarmClient::new(&env, &cfg.upstream_farm).deposit(
            &cfg.upstream_pool_id,
            &amount,
            &this,
        );

        ttl::extend_instance(&env);
        events::publish_deposit(&env, depositor, amount, state.total_staked);

        Ok(())
    }

    /// Withdraw `amount` of stake, paying any pending reward.
    ///
    /// The stake is served from local custody when it fits, otherwise from the
    /// upstream farm, falling back to the farm's emergency path if the normal
    /// path fails.
    pub fn withdraw(env: Env, depositor: Address, amount: i128) -> Result<(), ContractError> {
        let _guard = Self::enter(&env)?;
        let cfg = storage::load_config(&env)?;
        depositor.require_auth();

        if amount <= 0 {
            return Err(ContractError::InvalidInput);
        }
        let position = storage::load_position(&env, &depositor);
        if amount > position.staked {
            return Err(ContractError::InsufficientStake);
        }

        let mut state = Self::sync(&env, &cfg)?;
        Self::harvest_incentive(&env, &cfg, &state);

        let settlement = ledger::settle(
            &env,
            &position,
            state.reward_per_share,
            StakeChange::Decrease(amount),
        )?;
        state.total_staked = state
            .total_staked
            .checked_sub(amount)
            .ok_or(ContractError::InvariantViolation)?;

        storage::save_position(&env, &depositor, &settlement.position);
        storage::save_state(&env, &state);

        Self::pay_reward(&env, &cfg, &depositor, settlement.payout)?;

        let mut shadow = storage::load_shadow(&env)?;
        shadow::release(&env, &cfg, &mut shadow, &depositor, amount)?;
        shadow::check_conservation(&shadow, state.total_staked)?;
        storage::save_shadow(&env, &shadow);

        ttl::extend_instance(&env);
        events::publish_withdrawal(&env, depositor, amount, state.total_staked);

        Ok(())
    }

    /// Pay out the reward accrued on the caller's stake.
    ///
    /// Returns the amount paid; nothing pending is not an error.
    pub fn claim(env: Env, depositor: Address) -> Result<i128, ContractError> {
        let _guard = Self::enter(&env)?;
        let cfg = storage::load_config(&env)?;
        depositor.require_auth();

        let state = Self::sync(&env, &cfg)?;
        let position = storage::load_position(&env, &depositor);
        if position.staked > 0 {
            Self::harvest_incentive(&env, &cfg, &state);
        }

        let settlement =
            ledger::settle(&env, &position, state.reward_per_share, StakeChange::Unchanged)?;
        if settlement.position != position {
            storage::save_position(&env, &depositor, &settlement.position);
        }
        storage::save_state(&env, &state);

        Self::pay_reward(&env, &cfg, &depositor, settlement.payout)?;
        ttl::extend_instance(&env);

        Ok(settlement.payout)
    }

    /// Pull the caller's entire stake, forfeiting any pending reward.
    ///
    /// The position is removed outright. Returns the amount released.
    pub fn emergency_withdraw(env: Env, depositor: Address) -> Result<i128, ContractError> {
        let _guard = Self::enter(&env)?;
        let cfg = storage::load_config(&env)?;
        depositor.require_auth();

        let position = storage::load_position(&env, &depositor);
        if position.staked == 0 {
            return Ok(0);
        }

        let mut state = Self::sync(&env, &cfg)?;
        state.total_staked = state
            .total_staked
            .checked_sub(position.staked)
            .ok_or(ContractError::InvariantViolation)?;

        storage::remove_position(&env, &depositor);
        storage::save_state(&env, &state);

        let mut shadow = storage::load_shadow(&env)?;
        shadow::release(&env, &cfg, &mut shadow, &depositor, position.staked)?;
        shadow::check_conservation(&shadow, state.total_staked)?;
        storage::save_shadow(&env, &shadow);

        ttl::extend_instance(&env);
        events::publish_emergency_withdrawal(&env, depositor, position.staked);

        Ok(position.staked)
    }

    // ── Admin hooks ─────────────────────────────────────────────────────────

    /// Move the whole upstream position into local custody without serving
    /// any withdrawal. Returns the amount recovered.
    pub fn emergency_exit(env: Env, admin: Address) -> Result<i128, ContractError> {
        let _guard = Self::enter(&env)?;
        let cfg = Self::require_admin(&env, &admin)?;

        let mut shadow = storage::load_shadow(&env)?;
        let recovered = shadow::force_exit(&env, &cfg, &mut shadow)?;
        storage::save_shadow(&env, &shadow);

        ttl::extend_instance(&env);
        events::publish_emergency_exit(&env, recovered);

        Ok(recovered)
    }

    /// Advance the index at the current rate and re-read the emission
    /// schedule. Returns the rate now in force.
    pub fn refresh_rate(env: Env, admin: Address) -> Result<i128, ContractError> {
        let _guard = Self::enter(&env)?;
        let cfg = Self::require_admin(&env, &admin)?;

        let state = Self::sync(&env, &cfg)?;
        storage::save_state(&env, &state);
        ttl::extend_instance(&env);

        Ok(state.rate_per_second)
    }

    /// Collect the upstream farm's own rewards on this contract's position.
    ///
    /// They land in this contract and leave through `sweep`.
    pub fn harvest_upstream(env: Env, admin: Address) -> Result<(), ContractError> {
        let _guard = Self::enter(&env)?;
        let cfg = Self::require_admin(&env, &admin)?;

        UpstreamFarmClient::new(&env, &cfg.upstream_farm)
            .harvest(&cfg.upstream_pool_id, &env.current_contract_address());

        ttl::extend_instance(&env);
        events::publish_upstream_harvested(&env, cfg.upstream_pool_id);

        Ok(())
    }

    /// Withdraw the placeholder stake from the incentive program and park
    /// accrual for good. Rewards accrued up to now stay claimable.
    pub fn retire_incentive_stake(env: Env, admin: Address) -> Result<(), ContractError> {
        let _guard = Self::enter(&env)?;
        let cfg = Self::require_admin(&env, &admin)?;

        let mut state = Self::sync(&env, &cfg)?;
        let pool_id = state.incentive_pool_id.ok_or(ContractError::NotBound)?;
        state.rewards_active = false;
        state.rate_per_second = 0;
        storage::save_state(&env, &state);

        IncentiveProgramClient::new(&env, &cfg.incentive_program)
            .exit(&env.current_contract_address());

        ttl::extend_instance(&env);
        events::publish_rate_updated(&env, 0, false);
        events::publish_incentive_retired(&env, pool_id);

        Ok(())
    }

    /// Send an unrelated asset held by this contract to `to`.
    ///
    /// The staked and reward assets back depositors and cannot be swept.
    pub fn sweep(
        env: Env,
        admin: Address,
        token: Address,
        to: Address,
        amount: i128,
    ) -> Result<(), ContractError> {
        let _guard = Self::enter(&env)?;
        let cfg = Self::require_admin(&env, &admin)?;

        if token == cfg.stake_token || token == cfg.reward_token {
            return Err(ContractError::ProtectedAsset);
        }
        if amount <= 0 {
            return Err(ContractError::InvalidInput);
        }

        adapters::transfer(&env, &token, &env.current_contract_address(), &to, amount)?;
        ttl::extend_instance(&env);
        events::publish_swept(&env, token, to, amount);

        Ok(())
    }

    // ── View functions ───────────────────────────────────────────────────────

    /// Reward `depositor` would receive from `claim` now, at the stored rate.
    pub fn pending_reward(env: Env, depositor: Address) -> Result<i128, ContractError> {
        let mut state = storage::load_state(&env)?;
        accrual::advance(&env, &mut state, env.ledger().timestamp())?;
        let position = storage::load_position(&env, &depositor);
        ledger::pending(&env, &position, state.reward_per_share)
    }

    pub fn get_position(env: Env, depositor: Address) -> UserPosition {
        storage::load_position(&env, &depositor)
    }

    pub fn get_state(env: Env) -> Result<GlobalState, ContractError> {
        storage::load_state(&env)
    }

    pub fn get_shadow_balance(env: Env) -> Result<ShadowBalance, ContractError> {
        storage::load_shadow(&env)
    }

    pub fn get_config(env: Env) -> Result<FarmConfig, ContractError> {
        storage::load_config(&env)
    }

    pub fn is_initialized(env: Env) -> bool {
        storage::has_config(&env)
    }

    pub fn get_admin(env: Env) -> Result<Address, ContractError> {
        storage::load_config(&env).map(|cfg| cfg.admin)
    }

    // ── Internal helpers ─────────────────────────────────────────────────────

    /// Take the re-entrancy lock for the rest of the calling entry point.
    fn enter(env: &Env) -> Result<ReentrancyGuard<'_>, ContractError> {
        ReentrancyGuard::acquire(env).ok_or(ContractError::Reentrant)
    }

    /// Guard: revert unless `caller` is the configured admin.
    fn require_admin(env: &Env, caller: &Address) -> Result<FarmConfig, ContractError> {
        let cfg = storage::load_config(env)?;
        caller.require_auth();
        if *caller != cfg.admin {
            return Err(ContractError::Unauthorized);
        }
        Ok(cfg)
    }

    /// Load the global state, advance it to now at the stored rate, then
    /// recompute the rate. The order matters: time already elapsed is always
    /// credited at the rate that was in force during it.
    fn sync(env: &Env, cfg: &FarmConfig) -> Result<GlobalState, ContractError> {
        let mut state = storage::load_state(env)?;
        accrual::advance(env, &mut state, env.ledger().timestamp())?;
        if rate::refresh(env, cfg, &mut state)? {
            events::publish_rate_updated(env, state.rate_per_second, state.rewards_active);
        }
        Ok(state)
    }

    /// Best-effort claim of the incentive program's emissions so payouts in
    /// this call are funded. A failing claim is logged and ignored.
    fn harvest_incentive(env: &Env, cfg: &FarmConfig, state: &GlobalState) {
        let pool_id = match state.incentive_pool_id {
            Some(pool_id) if state.rewards_active => pool_id,
            _ => return,
        };

        let program = IncentiveProgramClient::new(env, &cfg.incentive_program);
        let claimed = program.try_claim(&vec![env, pool_id], &env.current_contract_address());
        if !matches!(claimed, Ok(Ok(()))) {
            log!(env, "incentive harvest failed", pool_id);
        }
    }

    fn pay_reward(
        env: &Env,
        cfg: &FarmConfig,
        depositor: &Address,
        amount: i128,
    ) -> Result<(), ContractError> {
        if amount == 0 {
            return Ok(());
        }
        adapters::transfer(
            env,
            &cfg.reward_token,
            &env.current_contract_address(),
            depositor,
            amount,
        )?;
        events::publish_reward_paid(env, depositor.clone(), amount);
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────


#[cfg(test)]
mod test_admin;

#[cfg(test)]
mod test_properties;
