use soroban_sdk::{Env, IntoVal, Val};

/// Ledgers left before an entry's TTL is bumped.
pub const TTL_THRESHOLD: u32 = 17_280; // ~1 day
/// Ledgers an entry lives for after a bump.
pub const TTL_EXTEND_TO: u32 = 518_400; // ~30 days

/// Extends the TTL shared by every instance-storage key.
pub fn extend_instance(env: &Env) {
    env.storage()
        .instance()
        .extend_ttl(TTL_THRESHOLD, TTL_EXTEND_TO);
}

/// Extends the TTL of a single persistent entry.
pub fn extend_persistent<K>(env: &Env, key: &K)
where
    K: IntoVal<Env, Val>,
{
    env.storage()
        .persistent()
        .extend_ttl(key, TTL_THRESHOLD, TTL_EXTEND_TO);
}
