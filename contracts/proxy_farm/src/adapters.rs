//! Interfaces of the contracts this farm drives, plus token movement helpers
//! that turn a failed transfer into [`ContractError::AssetTransferFailure`].

use soroban_sdk::{contractclient, contracttype, token, Address, Env, Vec};

use crate::ContractError;

/// Allowances granted to collaborators only need to outlive the current call.
const ALLOWANCE_LEDGERS: u32 = 100;

/// Pool data exposed by the incentive program.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct IncentivePoolInfo {
    pub alloc_weight: u64,
}

/// Upstream yield farm that custodies the staked asset.
///
/// Positions are owned by `to`; `deposit` pulls from `to` through an
/// allowance, the withdraw paths pay out to `to`.
#[contractclient(name = "UpstreamFarmClient")]
pub trait UpstreamFarm {
    fn deposit(env: Env, pool_id: u32, amount: i128, to: Address);
    /// May fail; callers must be ready for an error.
    fn withdraw_and_harvest(env: Env, pool_id: u32, amount: i128, to: Address);
    /// Returns the entire position of `to`. Never fails.
    fn emergency_withdraw(env: Env, pool_id: u32, to: Address);
    fn harvest(env: Env, pool_id: u32, to: Address);
}

/// Incentive program whose allocation schedule drives the reward rate and
/// which emits the reward asset against the placeholder stake.
#[contractclient(name = "IncentiveProgramClient")]
pub trait IncentiveProgram {
    fn deposit(env: Env, pool_id: u32, amount: i128, from: Address);
    fn claim(env: Env, pool_ids: Vec<u32>, to: Address);
    /// Harvests and withdraws everything `to` holds in the program.
    fn exit(env: Env, to: Address);
    fn pool_info(env: Env, pool_id: u32) -> IncentivePoolInfo;
    fn rewards_per_second(env: Env) -> i128;
    fn total_alloc_weight(env: Env) -> u64;
}

pub fn transfer(
    env: &Env,
    token: &Address,
    from: &Address,
    to: &Address,
    amount: i128,
) -> Result<(), ContractError> {
    match token::Client::new(env, token).try_transfer(from, to, &amount) {
        Ok(Ok(())) => Ok(()),
        _ => Err(ContractError::AssetTransferFailure),
    }
}

/// Lets `spender` pull `amount` of `token` from this contract.
pub fn approve(
    env: &Env,
    token: &Address,
    spender: &Address,
    amount: i128,
) -> Result<(), ContractError> {
    let expiration_ledger = env.ledger().sequence().saturating_add(ALLOWANCE_LEDGERS);
    match token::Client::new(env, token).try_approve(
        &env.current_contract_address(),
        spender,
        &amount,
        &expiration_ledger,
    ) {
        Ok(Ok(())) => Ok(()),
        _ => Err(ContractError::AssetTransferFailure),
    }
}

/// Mints `amount` of a token administered by this contract to itself.
pub fn mint_to_self(env: &Env, token: &Address, amount: i128) -> Result<(), ContractError> {
    match token::StellarAssetClient::new(env, token)
        .try_mint(&env.current_contract_address(), &amount)
    {
        Ok(Ok(())) => Ok(()),
        _ => Err(ContractError::AssetTransferFailure),
    }
}
