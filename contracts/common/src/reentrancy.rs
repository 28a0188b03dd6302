//! Scoped re-entrancy lock for mutating contract entry points.
//!
//! The lock lives in instance storage, so a call that fails rolls the flag
//! back together with every other write it made. On success the guard clears
//! the flag when it goes out of scope, on every return path.

use soroban_sdk::{symbol_short, Env, Symbol};

const LOCKED: Symbol = symbol_short!("LOCKED");

/// Holds the contract-wide lock until dropped.
pub struct ReentrancyGuard<'a> {
    env: &'a Env,
}

impl<'a> ReentrancyGuard<'a> {
    /// Takes the lock, or returns `None` if another frame of this contract
    /// already holds it.
    pub fn acquire(env: &'a Env) -> Option<Self> {
        let storage = env.storage().instance();
        if storage.get::<_, bool>(&LOCKED).unwrap_or(false) {
            return None;
        }
        storage.set(&LOCKED, &true);
        Some(Self { env })
    }
}

impl Drop for ReentrancyGuard<'_> {
    fn drop(&mut self) {
        self.env.storage().instance().remove(&LOCKED);
    }
}
