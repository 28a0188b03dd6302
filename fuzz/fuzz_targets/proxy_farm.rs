#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use proxy_farm::testutils::{
    MockIncentiveProgram, MockIncentiveProgramClient, MockUpstreamFarm, MockUpstreamFarmClient,
};
use proxy_farm::{ProxyFarmContract, ProxyFarmContractClient};
use soroban_sdk::{
    testutils::{Address as _, Ledger as _},
    token::{Client as TokenClient, StellarAssetClient},
    Address, Env,
};

#[derive(Arbitrary, Debug)]
pub enum FuzzAction {
    Deposit { user: u8, amount: u32 },
    Withdraw { user: u8, amount: u32 },
    Claim { user: u8 },
    EmergencyWithdraw { user: u8 },
    FreezeUpstream { frozen: bool },
    EmergencyExit,
    SetPoolWeight { weight: u16 },
    RefreshRate,
    Wait { seconds: u16 },
}

fuzz_target!(|actions: Vec<FuzzAction>| {
    let env = Env::default();
    env.mock_all_auths();

    let admin = Address::generate(&env);
    let stake_token = env
        .register_stellar_asset_contract_v2(Address::generate(&env))
        .address();
    let reward_token = env
        .register_stellar_asset_contract_v2(Address::generate(&env))
        .address();

    let contract_id = env.register(ProxyFarmContract, ());
    let placeholder_token = env
        .register_stellar_asset_contract_v2(contract_id.clone())
        .address();

    let upstream_id = env.register(MockUpstreamFarm, ());
    let upstream = MockUpstreamFarmClient::new(&env, &upstream_id);
    upstream.init(&stake_token);

    let program_id = env.register(MockIncentiveProgram, ());
    let program = MockIncentiveProgramClient::new(&env, &program_id);
    program.init(&reward_token, &placeholder_token, &40, &100);
    program.set_pool_alloc(&3, &50);

    let client = ProxyFarmContractClient::new(&env, &contract_id);
    client.initialize(
        &admin,
        &stake_token,
        &reward_token,
        &placeholder_token,
        &upstream_id,
        &7,
        &program_id,
    );
    client.bind_incentive_pool(&admin, &3);
    StellarAssetClient::new(&env, &reward_token).mint(&contract_id, &1_000_000_000_000_000_000_000_000);

    let users: Vec<Address> = (0..4).map(|_| Address::generate(&env)).collect();
    for user in &users {
        StellarAssetClient::new(&env, &stake_token).mint(user, &(u32::MAX as i128 * 64));
    }

    let mut now = 0u64;
    let mut last_index = 0i128;

    for action in actions {
        match action {
            FuzzAction::Deposit { user, amount } => {
                let _ = client.try_deposit(&users[user as usize % users.len()], &(amount as i128));
            }
            FuzzAction::Withdraw { user, amount } => {
                let _ = client.try_withdraw(&users[user as usize % users.len()], &(amount as i128));
            }
            FuzzAction::Claim { user } => {
                let _ = client.try_claim(&users[user as usize % users.len()]);
            }
            FuzzAction::EmergencyWithdraw { user } => {
                let _ = client.try_emergency_withdraw(&users[user as usize % users.len()]);
            }
            FuzzAction::FreezeUpstream { frozen } => upstream.set_frozen(&frozen),
            FuzzAction::EmergencyExit => {
                let _ = client.try_emergency_exit(&admin);
            }
            FuzzAction::SetPoolWeight { weight } => program.set_pool_alloc(&3, &(weight as u64)),
            FuzzAction::RefreshRate => {
                let _ = client.try_refresh_rate(&admin);
            }
            FuzzAction::Wait { seconds } => {
                now += seconds as u64;
                env.ledger().set_timestamp(now);
            }
        }

        // Custody must always match the books, and the index only grows.
        let state = client.get_state();
        let shadow = client.get_shadow_balance();
        let staked: i128 = users.iter().map(|u| client.get_position(u).staked).sum();
        assert_eq!(staked, state.total_staked);
        assert_eq!(shadow.local_held + shadow.upstream_staked, state.total_staked);
        assert_eq!(upstream.position(&contract_id), shadow.upstream_staked);
        assert_eq!(
            TokenClient::new(&env, &stake_token).balance(&contract_id),
            shadow.local_held
        );
        assert!(state.reward_per_share >= last_index);
        last_index = state.reward_per_share;
    }
});
