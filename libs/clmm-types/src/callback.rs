use soroban_sdk::{contractclient, Bytes, Env};

/// Implemented by whoever calls `swap` or adds liquidity.
///
/// The pool invokes the callback on the `sender` after it has paid out and
/// then checks its own balances. Positive amounts are owed to the pool.
#[contractclient(name = "PoolCallbackClient")]
pub trait PoolCallback {
    fn swap_callback(env: Env, amount0: i128, amount1: i128, data: Bytes);

    fn modify_position_callback(env: Env, amount0: i128, amount1: i128, data: Bytes);
}

/// Oracle hook notified once per swap and once per liquidity change.
/// Returns the new (index, cardinality) cursor, which the pool stores untouched.
#[contractclient(name = "ObserverClient")]
pub trait Observer {
    fn record(
        env: Env,
        index: u32,
        cardinality: u32,
        timestamp: u64,
        tick: i32,
        liquidity: u128,
    ) -> (u32, u32);
}
