#![allow(clippy::unwrap_used, clippy::expect_used, clippy::arithmetic_side_effects)]
//! Property-based tests for the accounting core.
//!
//! Invariants tested:
//! - Positions, the global total, the shadow balance and real token custody
//!   agree after every operation, whatever the upstream farm does
//! - The reward accumulator never decreases
//! - An over-sized withdrawal fails with `InsufficientStake` and changes nothing
//! - A sole depositor is paid `rate × elapsed` give or take one unit
//! - Settling twice against the same index never pays twice, even for
//!   stake × index products wider than `i128`

extern crate std;

use proptest::prelude::*;
use soroban_sdk::{Address, Env};
use std::vec::Vec;

use crate::accrual::{self, GlobalState};
use crate::ledger::{self, StakeChange, UserPosition};
use crate::test::{Farm, INCENTIVE_POOL};
use crate::ContractError;

const USERS: usize = 3;
const USER_BALANCE: i128 = 1_000_000_000;

// ── Helpers ───────────────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
enum Op {
    Deposit { user: usize, amount: i128 },
    Withdraw { user: usize, fraction: u8 },
    OverWithdraw { user: usize },
    Claim { user: usize },
    EmergencyWithdraw { user: usize },
    ToggleUpstreamFreeze,
    EmergencyExit,
    Wait { seconds: u64 },
}

fn op_strategy() -> impl Strategy<Value = Op> {
    let user = 0..USERS;
    prop_oneof![
        3 => (user.clone(), 1i128..=5_000).prop_map(|(user, amount)| Op::Deposit { user, amount }),
        2 => (user.clone(), 1u8..=100).prop_map(|(user, fraction)| Op::Withdraw { user, fraction }),
        1 => user.clone().prop_map(|user| Op::OverWithdraw { user }),
        2 => user.clone().prop_map(|user| Op::Claim { user }),
        1 => user.prop_map(|user| Op::EmergencyWithdraw { user }),
        1 => Just(Op::ToggleUpstreamFreeze),
        1 => Just(Op::EmergencyExit),
        3 => (1u64..=1_000).prop_map(|seconds| Op::Wait { seconds }),
    ]
}

fn apply(f: &Farm, users: &[Address], frozen: &mut bool, now: &mut u64, op: &Op) {
    match *op {
        Op::Deposit { user, amount } => f.client.deposit(&users[user], &amount),
        Op::Withdraw { user, fraction } => {
            let staked = f.client.get_position(&users[user]).staked;
            if staked > 0 {
                let amount = (staked * i128::from(fraction) / 100).max(1);
                f.client.withdraw(&users[user], &amount);
            }
        }
        Op::OverWithdraw { user } => {
            let before = (
                f.client.get_position(&users[user]),
                f.client.get_state().total_staked,
                f.client.get_shadow_balance(),
            );
            let staked = before.0.staked;
            match f.client.try_withdraw(&users[user], &(staked + 1)) {
                Err(Ok(e)) => assert_eq!(e, ContractError::InsufficientStake),
                other => unreachable!("expected InsufficientStake, got {:?}", other),
            }
            let after = (
                f.client.get_position(&users[user]),
                f.client.get_state().total_staked,
                f.client.get_shadow_balance(),
            );
            assert_eq!(before, after);
        }
        Op::Claim { user } => {
            f.client.claim(&users[user]);
        }
        Op::EmergencyWithdraw { user } => {
            f.client.emergency_withdraw(&users[user]);
        }
        Op::ToggleUpstreamFreeze => {
            *frozen = !*frozen;
            f.upstream.set_frozen(&*frozen);
        }
        Op::EmergencyExit => {
            f.client.emergency_exit(&f.admin);
        }
        Op::Wait { seconds } => {
            *now += seconds;
            f.at(*now);
        }
    }
}

// ── proptest! blocks ──────────────────────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    /// Any sequence of depositor and admin actions keeps custody conserved
    /// and the accumulator monotone.
    #[test]
    fn prop_operation_sequences_conserve_stake(ops in prop::collection::vec(op_strategy(), 1..40)) {
        let f = Farm::bound();
        let users: Vec<Address> = (0..USERS).map(|_| f.depositor(USER_BALANCE)).collect();
        let mut frozen = false;
        let mut now = 0u64;
        let mut last_index = f.client.get_state().reward_per_share;

        for op in &ops {
            apply(&f, &users, &mut frozen, &mut now, op);

            f.assert_conserved(&users);
            let index = f.client.get_state().reward_per_share;
            prop_assert!(index >= last_index);
            last_index = index;
        }

        let state = f.client.get_state();
        prop_assert!(state.rewards_active);
        prop_assert_eq!(state.incentive_pool_id, Some(INCENTIVE_POOL));
    }

    /// Advancing in two steps never lands the accumulator above one step,
    /// and never below the starting value.
    #[test]
    fn prop_accumulator_advance_is_monotone(
        rate in 0i128..=1_000_000,
        total in 1i128..=1_000_000_000,
        first in 0u64..=100_000,
        second in 0u64..=100_000,
    ) {
        let env = Env::default();
        let start = GlobalState {
            rewards_active: true,
            incentive_pool_id: Some(0),
            rate_per_second: rate,
            total_staked: total,
            ..GlobalState::default()
        };

        let mut stepped = start.clone();
        accrual::advance(&env, &mut stepped, first).unwrap();
        let midway = stepped.reward_per_share;
        accrual::advance(&env, &mut stepped, first + second).unwrap();

        let mut direct = start;
        accrual::advance(&env, &mut direct, first + second).unwrap();

        prop_assert!(midway >= 0);
        prop_assert!(stepped.reward_per_share >= midway);
        prop_assert!(stepped.reward_per_share <= direct.reward_per_share);
    }

    /// A sole depositor's pending reward is `rate × elapsed`, rounded down by
    /// at most one unit.
    #[test]
    fn prop_sole_depositor_rounding(
        rate in 0i128..=1_000_000,
        staked in 1i128..=1_000_000_000,
        elapsed in 0u64..=1_000_000,
    ) {
        let env = Env::default();
        let mut state = GlobalState {
            rewards_active: true,
            incentive_pool_id: Some(0),
            rate_per_second: rate,
            total_staked: staked,
            ..GlobalState::default()
        };
        accrual::advance(&env, &mut state, elapsed).unwrap();

        let position = UserPosition { staked, reward_debt: 0 };
        let owed = ledger::pending(&env, &position, state.reward_per_share).unwrap();
        let emitted = rate * i128::from(elapsed);

        prop_assert!(owed <= emitted);
        prop_assert!(emitted - owed <= 1);
    }

    /// Once settled, the same index owes nothing more. Stakes and indices
    /// whose product exceeds `i128` still settle.
    #[test]
    fn prop_settlement_never_pays_twice(
        staked in 0i128..=1_000_000_000_000_000_000,
        debt_index in 0i128..=1_000_000_000_000_000_000_000_000_000,
        growth in 0i128..=1_000_000_000_000_000_000_000_000_000,
    ) {
        let env = Env::default();
        let index = debt_index + growth;
        let position = UserPosition {
            staked,
            reward_debt: ledger::accrued(&env, staked, debt_index).unwrap(),
        };

        let first = ledger::settle(&env, &position, index, StakeChange::Unchanged).unwrap();
        let second = ledger::settle(&env, &first.position, index, StakeChange::Unchanged).unwrap();

        prop_assert!(first.payout >= 0);
        prop_assert_eq!(second.payout, 0);
        prop_assert_eq!(ledger::pending(&env, &first.position, index).unwrap(), 0);
    }
}
