// ============================================================================
// INVARIANTS MODULE
// ============================================================================
//
// Checks over the stored pool that must hold between any two calls.
//
// 1. PRICE INVARIANTS
//    - Price is strictly inside the representable range
//    - Tick is the floor tick of the price (or the tick just below a
//      boundary the price rests on after a downward cross)
//
// 2. LIQUIDITY INVARIANTS
//    - Active liquidity equals the net liquidity of every initialized tick
//      at or below the current tick
//    - Net liquidity over all initialized ticks sums to zero
//
// 3. TICK INVARIANTS
//    - A tick's bitmap bit is set iff it holds liquidity
//
// ============================================================================

use crate::storage::{get_state, get_tick, get_tick_bitmap_word};
use clmm_math::sqrt_price_at_tick;
use clmm_types::{PoolError, PoolState, MAX_SQRT_PRICE, MAX_TICK, MIN_SQRT_PRICE, MIN_TICK};
use soroban_sdk::{Env, Vec};

// ============================================================================
// PRICE INVARIANTS
// ============================================================================

/// MIN_SQRT_PRICE <= sqrt_price_x96 < MAX_SQRT_PRICE
pub fn price_in_bounds(state: &PoolState) -> bool {
    state.sqrt_price_x96 >= MIN_SQRT_PRICE && state.sqrt_price_x96 < MAX_SQRT_PRICE
}

/// MIN_TICK - 1 <= tick <= MAX_TICK
pub fn tick_in_bounds(state: &PoolState) -> bool {
    state.tick >= MIN_TICK - 1 && state.tick <= MAX_TICK
}

/// sqrt_price_at_tick(tick) <= sqrt_price_x96 <= sqrt_price_at_tick(tick + 1)
pub fn tick_matches_price(env: &Env, state: &PoolState) -> Result<bool, PoolError> {
    let lower = sqrt_price_at_tick(env, state.tick)?;
    let upper = sqrt_price_at_tick(env, state.tick + 1)?;
    Ok(lower <= state.sqrt_price_x96 && state.sqrt_price_x96 <= upper)
}

// ============================================================================
// TICK SCANS
// ============================================================================

/// Every tick with its bitmap bit set, ascending
pub fn initialized_ticks(env: &Env, tick_spacing: i32) -> Vec<i32> {
    let first_word = MIN_TICK.div_euclid(tick_spacing) >> 7;
    let last_word = MAX_TICK.div_euclid(tick_spacing) >> 7;

    let mut ticks = Vec::new(env);
    for word_pos in first_word..=last_word {
        let mut word = get_tick_bitmap_word(env, word_pos);
        while word != 0 {
            let bit = word.trailing_zeros() as i32;
            ticks.push_back((word_pos * 128 + bit) * tick_spacing);
            word &= word - 1;
        }
    }
    ticks
}

// ============================================================================
// LIQUIDITY INVARIANTS
// ============================================================================

/// Active liquidity rebuilt from the ticks at or below the current tick
pub fn active_liquidity_from_ticks(env: &Env, tick_spacing: i32) -> Result<u128, PoolError> {
    let state = get_state(env)?;
    let mut liquidity: i128 = 0;
    for tick in initialized_ticks(env, tick_spacing).iter() {
        if tick <= state.tick {
            liquidity += get_tick(env, tick).liquidity_net;
        }
    }
    u128::try_from(liquidity).map_err(|_| PoolError::LiquidityUnderflow)
}

/// Sum of liquidity_net over all initialized ticks
pub fn liquidity_net_sum(env: &Env, tick_spacing: i32) -> i128 {
    initialized_ticks(env, tick_spacing)
        .iter()
        .map(|tick| get_tick(env, tick).liquidity_net)
        .sum()
}

// ============================================================================
// TICK INVARIANTS
// ============================================================================

/// Every bitmap bit points at a tick that holds liquidity
pub fn bitmap_matches_ticks(env: &Env, tick_spacing: i32) -> bool {
    initialized_ticks(env, tick_spacing).iter().all(|tick| {
        let info = get_tick(env, tick);
        info.initialized && info.liquidity_gross > 0
    })
}

/// All of the above against the stored pool
pub fn check_all(env: &Env, tick_spacing: i32) -> Result<bool, PoolError> {
    let state = get_state(env)?;
    Ok(price_in_bounds(&state)
        && tick_in_bounds(&state)
        && tick_matches_price(env, &state)?
        && active_liquidity_from_ticks(env, tick_spacing)? == state.liquidity
        && liquidity_net_sum(env, tick_spacing) == 0
        && bitmap_matches_ticks(env, tick_spacing))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clmm_types::Q96;

    #[test]
    fn test_price_in_bounds() {
        assert!(price_in_bounds(&PoolState::new(Q96, 0)));
        assert!(price_in_bounds(&PoolState::new(MIN_SQRT_PRICE, MIN_TICK)));
        assert!(!price_in_bounds(&PoolState::new(MAX_SQRT_PRICE, MAX_TICK)));
        assert!(!price_in_bounds(&PoolState::new(0, MIN_TICK)));
    }

    #[test]
    fn test_tick_in_bounds() {
        assert!(tick_in_bounds(&PoolState::new(Q96, 0)));
        assert!(tick_in_bounds(&PoolState::new(Q96, MAX_TICK)));
        assert!(!tick_in_bounds(&PoolState::new(Q96, MAX_TICK + 1)));
        assert!(!tick_in_bounds(&PoolState::new(Q96, MIN_TICK - 2)));
    }

    #[test]
    fn test_tick_matches_price() {
        let env = Env::default();
        let at_60 = sqrt_price_at_tick(&env, 60).unwrap();
        assert_eq!(tick_matches_price(&env, &PoolState::new(Q96, 0)), Ok(true));
        assert_eq!(tick_matches_price(&env, &PoolState::new(at_60, 60)), Ok(true));
        // Resting on tick 60 after crossing it downward
        assert_eq!(tick_matches_price(&env, &PoolState::new(at_60, 59)), Ok(true));
        assert_eq!(tick_matches_price(&env, &PoolState::new(at_60, 0)), Ok(false));
    }
}
