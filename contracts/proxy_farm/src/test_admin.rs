extern crate std;

use soroban_sdk::{
    testutils::Address as _,
    token::{Client as TokenClient, StellarAssetClient},
    Address,
};

use crate::test::{expect_error, Farm, INCENTIVE_POOL, RATE};
use crate::{ContractError, ShadowBalance, PLACEHOLDER_STAKE};

// ── Emergency exit ────────────────────────────────────────────────────────────

#[test]
fn test_emergency_exit_moves_upstream_position_local() {
    let f = Farm::bound();
    let alice = f.depositor(1_000);
    f.client.deposit(&alice, &1_000);

    let recovered = f.client.emergency_exit(&f.admin);

    assert_eq!(recovered, 1_000);
    assert_eq!(
        f.client.get_shadow_balance(),
        ShadowBalance {
            local_held: 1_000,
            upstream_staked: 0
        }
    );
    assert_eq!(f.upstream.position(&f.contract_id), 0);
    assert_eq!(f.stake_balance(&f.contract_id), 1_000);
    // Stake and rewards are untouched.
    assert_eq!(f.client.get_position(&alice).staked, 1_000);
    f.assert_conserved(&[alice.clone()]);

    // With the farm frozen, withdrawals are still served from local custody.
    f.upstream.set_frozen(&true);
    f.client.withdraw(&alice, &1_000);
    assert_eq!(f.stake_balance(&alice), 1_000);
    f.assert_conserved(&[alice]);
}

#[test]
fn test_emergency_exit_with_nothing_upstream() {
    let f = Farm::bound();
    assert_eq!(f.client.emergency_exit(&f.admin), 0);
    assert_eq!(f.client.get_shadow_balance(), ShadowBalance::default());
}

#[test]
fn test_emergency_exit_by_non_admin_fails() {
    let f = Farm::bound();
    let alice = f.depositor(1_000);
    f.client.deposit(&alice, &1_000);

    let intruder = Address::generate(&f.env);
    expect_error(
        f.client.try_emergency_exit(&intruder),
        ContractError::Unauthorized,
    );
    assert_eq!(f.client.get_shadow_balance().upstream_staked, 1_000);
}

#[test]
fn test_degraded_custody_mixes_with_new_deposits() {
    let f = Farm::bound();
    let alice = f.depositor(1_000);
    let bob = f.depositor(500);

    f.client.deposit(&alice, &1_000);
    f.client.emergency_exit(&f.admin);

    // New stake still goes upstream.
    f.client.deposit(&bob, &500);
    assert_eq!(
        f.client.get_shadow_balance(),
        ShadowBalance {
            local_held: 1_000,
            upstream_staked: 500
        }
    );
    f.assert_conserved(&[alice.clone(), bob.clone()]);

    // Alice fits in local custody; Bob's stake comes back from upstream.
    f.client.withdraw(&alice, &1_000);
    f.client.withdraw(&bob, &300);
    assert_eq!(
        f.client.get_shadow_balance(),
        ShadowBalance {
            local_held: 0,
            upstream_staked: 200
        }
    );
    assert_eq!(f.stake_balance(&alice), 1_000);
    assert_eq!(f.stake_balance(&bob), 300);
    f.assert_conserved(&[alice, bob]);
}

#[test]
fn test_oversized_withdrawal_from_mixed_custody_uses_fallback() {
    let f = Farm::bound();
    let alice = f.depositor(2_000);

    f.client.deposit(&alice, &1_000);
    f.client.emergency_exit(&f.admin);
    f.client.deposit(&alice, &500);

    // 1_200 exceeds the 1_000 held locally and the 500 upstream.
    f.client.withdraw(&alice, &1_200);

    assert_eq!(
        f.client.get_shadow_balance(),
        ShadowBalance {
            local_held: 300,
            upstream_staked: 0
        }
    );
    assert_eq!(f.stake_balance(&alice), 1_700);
    f.assert_conserved(&[alice]);
}

// ── Rate refresh ──────────────────────────────────────────────────────────────

#[test]
fn test_refresh_rate_by_admin() {
    let f = Farm::bound();
    let alice = f.depositor(1_000);
    f.client.deposit(&alice, &1_000);

    f.at(50);
    f.program.set_pool_alloc(&INCENTIVE_POOL, &100);
    f.program.set_total_alloc(&200);
    f.program.set_rewards_per_second(&120);

    // 120 × 100 / 200 / 2 = 30
    assert_eq!(f.client.refresh_rate(&f.admin), 30);

    f.at(150);
    assert_eq!(f.client.pending_reward(&alice), RATE * 50 + 30 * 100);
}

#[test]
fn test_refresh_rate_by_non_admin_fails() {
    let f = Farm::bound();
    let intruder = Address::generate(&f.env);

    expect_error(
        f.client.try_refresh_rate(&intruder),
        ContractError::Unauthorized,
    );
}

#[test]
fn test_unweighted_pool_parks_accrual_for_good() {
    let f = Farm::bound();
    let alice = f.depositor(1_000);
    f.client.deposit(&alice, &1_000);

    f.at(50);
    f.program.set_pool_alloc(&INCENTIVE_POOL, &0);
    assert_eq!(f.client.refresh_rate(&f.admin), 0);

    let state = f.client.get_state();
    assert!(!state.rewards_active);
    assert_eq!(state.last_update_time, 50);

    f.at(500);
    assert_eq!(f.client.pending_reward(&alice), RATE * 50);

    // Restoring the weight does not restart accrual.
    f.program.set_pool_alloc(&INCENTIVE_POOL, &50);
    assert_eq!(f.client.refresh_rate(&f.admin), 0);
    assert_eq!(f.client.claim(&alice), RATE * 50);
}

// ── Upstream harvest ──────────────────────────────────────────────────────────

#[test]
fn test_harvest_upstream() {
    let f = Farm::bound();
    f.client.harvest_upstream(&f.admin);
    assert_eq!(f.upstream.harvest_count(), 1);

    let intruder = Address::generate(&f.env);
    expect_error(
        f.client.try_harvest_upstream(&intruder),
        ContractError::Unauthorized,
    );
}

// ── Retiring the incentive stake ──────────────────────────────────────────────

#[test]
fn test_retire_incentive_stake() {
    let f = Farm::bound();
    let alice = f.depositor(1_000);
    f.client.deposit(&alice, &1_000);

    f.at(100);
    f.client.retire_incentive_stake(&f.admin);

    assert_eq!(f.program.exit_count(), 1);
    assert_eq!(f.program.staked(&f.contract_id), 0);
    assert_eq!(
        TokenClient::new(&f.env, &f.placeholder_token).balance(&f.contract_id),
        PLACEHOLDER_STAKE
    );

    let state = f.client.get_state();
    assert!(!state.rewards_active);
    assert_eq!(state.rate_per_second, 0);

    // Rewards accrued before retiring stay claimable; nothing accrues after.
    f.at(300);
    assert_eq!(f.client.claim(&alice), RATE * 100);
}

#[test]
fn test_retire_before_binding_fails() {
    let f = Farm::new();
    expect_error(
        f.client.try_retire_incentive_stake(&f.admin),
        ContractError::NotBound,
    );
}

// ── Sweep ─────────────────────────────────────────────────────────────────────

#[test]
fn test_sweep_rejects_protected_assets() {
    let f = Farm::bound();
    let to = Address::generate(&f.env);

    expect_error(
        f.client.try_sweep(&f.admin, &f.stake_token, &to, &1),
        ContractError::ProtectedAsset,
    );
    expect_error(
        f.client.try_sweep(&f.admin, &f.reward_token, &to, &1),
        ContractError::ProtectedAsset,
    );
}

#[test]
fn test_sweep_moves_unrelated_asset() {
    let f = Farm::bound();
    let stray = f
        .env
        .register_stellar_asset_contract_v2(Address::generate(&f.env))
        .address();
    StellarAssetClient::new(&f.env, &stray).mint(&f.contract_id, &75);

    let to = Address::generate(&f.env);
    f.client.sweep(&f.admin, &stray, &to, &75);

    assert_eq!(TokenClient::new(&f.env, &stray).balance(&to), 75);
    assert_eq!(TokenClient::new(&f.env, &stray).balance(&f.contract_id), 0);
}

#[test]
fn test_sweep_by_non_admin_fails() {
    let f = Farm::bound();
    let stray = f
        .env
        .register_stellar_asset_contract_v2(Address::generate(&f.env))
        .address();
    let intruder = Address::generate(&f.env);

    expect_error(
        f.client.try_sweep(&intruder, &stray, &intruder, &1),
        ContractError::Unauthorized,
    );
}
