//! Concurrency test
//!
//! Independent engines run in parallel and stay deterministic, and a
//! shared vault driven from several threads stays consistent.

use custody::{CustodyVault, NativeBank, SharedVault, TokenLedger};
use simulation::config::SimConfig;
use simulation::engine::SimEngine;
use simulation::replay::capture_snapshot;
use std::thread;
use types::ids::{Address, TokenId};
use types::numeric::Amount;

#[test]
fn test_parallel_engines_are_deterministic() {
    let seeds = [1u64, 2, 3, 4];

    let handles: Vec<_> = seeds
        .iter()
        .map(|&seed| {
            thread::spawn(move || {
                let mut engine = SimEngine::new(SimConfig {
                    seed,
                    steps: 2_000,
                    ..SimConfig::default()
                })
                .unwrap();
                engine.run_configured();
                assert!(engine.mismatches.is_empty());
                capture_snapshot(&engine)
            })
        })
        .collect();
    let parallel: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    for (seed, snapshot) in seeds.iter().zip(&parallel) {
        let mut engine = SimEngine::new(SimConfig {
            seed: *seed,
            steps: 2_000,
            ..SimConfig::default()
        })
        .unwrap();
        engine.run_configured();
        assert_eq!(&capture_snapshot(&engine), snapshot);
    }
}

#[test]
fn test_shared_vault_mixed_traffic() {
    const OWNER: Address = Address::repeat(0x0c);
    const TOKEN: TokenId = TokenId::new(Address::repeat(0x7c));

    let vault = SharedVault::new(
        CustodyVault::new(OWNER, NativeBank::new(), TokenLedger::new()).unwrap(),
    );
    let holder = vault.with(|v| v.address());
    vault
        .with(|v| v.ledger_mut().mint(TOKEN, holder, Amount::new(400)))
        .unwrap();

    let depositors: Vec<_> = (0..4u8)
        .map(|i| {
            let vault = vault.clone();
            thread::spawn(move || {
                for _ in 0..250 {
                    vault
                        .deposit_native(Address::repeat(0x20 + i), Amount::new(2))
                        .unwrap();
                }
            })
        })
        .collect();
    let withdrawers: Vec<_> = (0..4u8)
        .map(|i| {
            let vault = vault.clone();
            thread::spawn(move || {
                for _ in 0..100 {
                    vault
                        .withdraw_token(&OWNER, TOKEN, Address::repeat(0x30 + i), Amount::new(1))
                        .unwrap();
                }
            })
        })
        .collect();
    for handle in depositors.into_iter().chain(withdrawers) {
        handle.join().unwrap();
    }

    assert_eq!(vault.native_balance(), Amount::new(2_000));
    assert_eq!(vault.token_balance(&TOKEN), Amount::ZERO);

    let events = vault.events();
    assert_eq!(events.len(), 1_400);
    assert!(events
        .windows(2)
        .all(|pair| pair[1].sequence == pair[0].sequence + 1));
}
