//! Shared helpers for the proxy farm contracts.
//!
//! - [`reentrancy::ReentrancyGuard`]: scoped lock held across a mutating entry point.
//! - [`ttl`]: storage TTL bumps with shared thresholds.

#![no_std]

pub mod reentrancy;
pub mod ttl;

pub use reentrancy::ReentrancyGuard;
