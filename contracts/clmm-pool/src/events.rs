use soroban_sdk::{Address, Env, Symbol};

// ============================================================
// EVENT NAMES
// ============================================================

/// Event name constants
pub struct EventName;

impl EventName {
    pub fn initialize(env: &Env) -> Symbol {
        Symbol::new(env, "initialize")
    }

    pub fn swap(env: &Env) -> Symbol {
        Symbol::new(env, "swap")
    }

    pub fn modify_position(env: &Env) -> Symbol {
        Symbol::new(env, "modify_position")
    }

    pub fn collect(env: &Env) -> Symbol {
        Symbol::new(env, "collect")
    }
}

// ============================================================
// EVENT EMITTERS
// ============================================================

/// Emit pool initialized event
pub fn emit_initialize(env: &Env, sqrt_price_x96: u128, tick: i32) {
    env.events()
        .publish((EventName::initialize(env),), (sqrt_price_x96, tick));
}

/// Emit swap event
#[allow(clippy::too_many_arguments)]
pub fn emit_swap(
    env: &Env,
    sender: &Address,
    recipient: &Address,
    amount0: i128,
    amount1: i128,
    sqrt_price_x96: u128,
    liquidity: u128,
    tick: i32,
) {
    env.events().publish(
        (EventName::swap(env), sender.clone(), recipient.clone()),
        (amount0, amount1, sqrt_price_x96, liquidity, tick),
    );
}

/// Emit position change event; zero deltas (fee polls) included
pub fn emit_modify_position(
    env: &Env,
    owner: &Address,
    tick_lower: i32,
    tick_upper: i32,
    liquidity_delta: i128,
    amount0: i128,
    amount1: i128,
) {
    env.events().publish(
        (EventName::modify_position(env), owner.clone()),
        (tick_lower, tick_upper, liquidity_delta, amount0, amount1),
    );
}

/// Emit collect event
pub fn emit_collect(
    env: &Env,
    owner: &Address,
    recipient: &Address,
    tick_lower: i32,
    tick_upper: i32,
    amount0: u128,
    amount1: u128,
) {
    env.events().publish(
        (EventName::collect(env), owner.clone(), recipient.clone()),
        (tick_lower, tick_upper, amount0, amount1),
    );
}
