//! Shadow bookkeeping of where the staked asset physically sits.
//!
//! Deposits are forwarded to the upstream farm. After a forced exit the
//! recovered stake sits in this contract's own balance (`local_held`) and
//! later withdrawals are served from there first. Nothing moves recovered
//! stake back upstream.

use soroban_sdk::{contracttype, log, Address, Env};

use crate::adapters::{self, UpstreamFarmClient};
use crate::events;
use crate::storage::FarmConfig;
use crate::ContractError;

#[contracttype]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ShadowBalance {
    /// Stake held directly by this contract.
    pub local_held: i128,
    /// Stake believed to be custodied by the upstream farm.
    pub upstream_staked: i128,
}

/// Where a withdrawal of a given size is served from.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum WithdrawalRoute {
    Local,
    Upstream,
}

impl ShadowBalance {
    pub fn total(&self) -> Result<i128, ContractError> {
        self.local_held
            .checked_add(self.upstream_staked)
            .ok_or(ContractError::ArithmeticOverflow)
    }

    pub fn route(&self, amount: i128) -> WithdrawalRoute {
        if amount <= self.local_held {
            WithdrawalRoute::Local
        } else {
            WithdrawalRoute::Upstream
        }
    }

    pub fn record_deposit(&mut self, amount: i128) -> Result<(), ContractError> {
        self.upstream_staked = self
            .upstream_staked
            .checked_add(amount)
            .ok_or(ContractError::ArithmeticOverflow)?;
        Ok(())
    }

    pub fn record_local_release(&mut self, amount: i128) -> Result<(), ContractError> {
        if amount > self.local_held {
            return Err(ContractError::InvariantViolation);
        }
        self.local_held -= amount;
        Ok(())
    }

    pub fn record_upstream_release(&mut self, amount: i128) -> Result<(), ContractError> {
        if amount > self.upstream_staked {
            return Err(ContractError::InvariantViolation);
        }
        self.upstream_staked -= amount;
        Ok(())
    }

    /// Moves the whole upstream position into local custody and serves
    /// `served` out of the combined local balance.
    ///
    /// Returns the amount that was recovered from upstream.
    pub fn record_forced_exit(&mut self, served: i128) -> Result<i128, ContractError> {
        let recovered = self.upstream_staked;
        let available = self.total()?;
        if served > available {
            return Err(ContractError::InvariantViolation);
        }
        self.local_held = available - served;
        self.upstream_staked = 0;
        Ok(recovered)
    }
}

/// Fails unless the shadow balance accounts for exactly `total_staked`.
pub fn check_conservation(shadow: &ShadowBalance, total_staked: i128) -> Result<(), ContractError> {
    if shadow.total()? != total_staked {
        return Err(ContractError::InvariantViolation);
    }
    Ok(())
}

/// Sends `amount` of the staked asset to `to`, choosing the custody path.
///
/// Withdrawals that fit in `local_held` never touch the upstream farm. Larger
/// ones go through the farm's normal withdraw-and-harvest; if that call fails
/// for any reason, the farm's emergency path pulls the entire upstream
/// position here and the withdrawal is served from it.
pub fn release(
    env: &Env,
    cfg: &FarmConfig,
    shadow: &mut ShadowBalance,
    to: &Address,
    amount: i128,
) -> Result<(), ContractError> {
    let this = env.current_contract_address();

    match shadow.route(amount) {
        WithdrawalRoute::Local => {
            shadow.record_local_release(amount)?;
        }
        WithdrawalRoute::Upstream => {
            let farm = UpstreamFarmClient::new(env, &cfg.upstream_farm);
            match farm.try_withdraw_and_harvest(&cfg.upstream_pool_id, &amount, &this) {
                Ok(Ok(())) => shadow.record_upstream_release(amount)?,
                _ => {
                    farm.emergency_withdraw(&cfg.upstream_pool_id, &this);
                    let recovered = shadow.record_forced_exit(amount)?;
                    log!(env, "upstream withdraw failed, recovered locally", amount, recovered);
                    events::publish_upstream_fallback(env, amount, recovered);
                }
            }
        }
    }

    adapters::transfer(env, &cfg.stake_token, &this, to, amount)
}

/// Pulls the entire upstream position into local custody without serving
/// anyone. Returns the amount recovered.
pub fn force_exit(
    env: &Env,
    cfg: &FarmConfig,
    shadow: &mut ShadowBalance,
) -> Result<i128, ContractError> {
    if shadow.upstream_staked == 0 {
        return Ok(0);
    }

    UpstreamFarmClient::new(env, &cfg.upstream_farm)
        .emergency_withdraw(&cfg.upstream_pool_id, &env.current_contract_address());
    let recovered = shadow.record_forced_exit(0)?;
    log!(env, "forced exit to local custody", recovered);
    Ok(recovered)
}
