use crate::storage::{get_tick, get_tick_bitmap_word, remove_tick, set_tick, set_tick_bitmap_word};
use clmm_math::add_delta;
use clmm_types::{PoolError, PoolState};
use soroban_sdk::Env;

/// Apply a liquidity delta to one bound of a range.
/// Returns true if the tick was flipped (initialized or emptied).
///
/// Outside accumulators of a newly initialized tick assume all past growth
/// happened below it when the current tick is at or above it.
pub fn update(
    env: &Env,
    tick: i32,
    state: &PoolState,
    liquidity_delta: i128,
    upper: bool,
    max_liquidity: u128,
) -> Result<bool, PoolError> {
    let mut info = get_tick(env, tick);

    let liquidity_gross_before = info.liquidity_gross;
    let liquidity_gross_after = add_delta(liquidity_gross_before, liquidity_delta)?;

    if liquidity_gross_after > max_liquidity {
        return Err(PoolError::LiquidityOverflow);
    }

    let flipped = (liquidity_gross_after == 0) != (liquidity_gross_before == 0);

    if liquidity_gross_before == 0 {
        if tick <= state.tick {
            info.fee_growth_outside_0_x64 = state.fee_growth_global_0_x64;
            info.fee_growth_outside_1_x64 = state.fee_growth_global_1_x64;
            info.seconds_outside = env.ledger().timestamp();
        }
        info.initialized = true;
    }

    info.liquidity_gross = liquidity_gross_after;

    // Crossing up enters a range at its lower tick and leaves it at the upper one
    info.liquidity_net = if upper {
        info.liquidity_net.checked_sub(liquidity_delta)
    } else {
        info.liquidity_net.checked_add(liquidity_delta)
    }
    .ok_or(PoolError::LiquidityOverflow)?;

    set_tick(env, tick, &info);

    Ok(flipped)
}

/// Delete a tick whose liquidity_gross dropped to zero
pub fn clear(env: &Env, tick: i32) {
    remove_tick(env, tick);
}

/// Cross a tick during a swap.
/// Returns the liquidity_net of the tick; the caller negates it when moving down.
pub fn cross(
    env: &Env,
    tick: i32,
    fee_growth_global_0_x64: u128,
    fee_growth_global_1_x64: u128,
    time: u64,
) -> i128 {
    let mut info = get_tick(env, tick);

    info.fee_growth_outside_0_x64 = fee_growth_global_0_x64.wrapping_sub(info.fee_growth_outside_0_x64);
    info.fee_growth_outside_1_x64 = fee_growth_global_1_x64.wrapping_sub(info.fee_growth_outside_1_x64);
    info.seconds_outside = time.wrapping_sub(info.seconds_outside);

    set_tick(env, tick, &info);

    info.liquidity_net
}

/// Fee growth per unit of liquidity inside [tick_lower, tick_upper).
/// All differences are modulo 2^128.
pub fn get_fee_growth_inside(
    env: &Env,
    tick_lower: i32,
    tick_upper: i32,
    tick_current: i32,
    fee_growth_global_0_x64: u128,
    fee_growth_global_1_x64: u128,
) -> (u128, u128) {
    let lower = get_tick(env, tick_lower);
    let upper = get_tick(env, tick_upper);

    let (below_0, below_1) = if tick_current >= tick_lower {
        (lower.fee_growth_outside_0_x64, lower.fee_growth_outside_1_x64)
    } else {
        (
            fee_growth_global_0_x64.wrapping_sub(lower.fee_growth_outside_0_x64),
            fee_growth_global_1_x64.wrapping_sub(lower.fee_growth_outside_1_x64),
        )
    };

    let (above_0, above_1) = if tick_current < tick_upper {
        (upper.fee_growth_outside_0_x64, upper.fee_growth_outside_1_x64)
    } else {
        (
            fee_growth_global_0_x64.wrapping_sub(upper.fee_growth_outside_0_x64),
            fee_growth_global_1_x64.wrapping_sub(upper.fee_growth_outside_1_x64),
        )
    };

    (
        fee_growth_global_0_x64.wrapping_sub(below_0).wrapping_sub(above_0),
        fee_growth_global_1_x64.wrapping_sub(below_1).wrapping_sub(above_1),
    )
}

/// Seconds the price spent inside [tick_lower, tick_upper) while both ticks were initialized
pub fn get_seconds_inside(
    env: &Env,
    tick_lower: i32,
    tick_upper: i32,
    tick_current: i32,
    time: u64,
) -> u64 {
    let lower = get_tick(env, tick_lower);
    let upper = get_tick(env, tick_upper);

    let below = if tick_current >= tick_lower {
        lower.seconds_outside
    } else {
        time.wrapping_sub(lower.seconds_outside)
    };
    let above = if tick_current < tick_upper {
        upper.seconds_outside
    } else {
        time.wrapping_sub(upper.seconds_outside)
    };

    time.wrapping_sub(below).wrapping_sub(above)
}

// === Tick Bitmap Operations ===
// Using u128 per word (128 ticks per word)

/// Word index and bit index of a compressed tick
fn bitmap_position(compressed: i32) -> (i32, u32) {
    (compressed >> 7, compressed.rem_euclid(128) as u32)
}

/// Flip a tick in the bitmap
pub fn flip_tick(env: &Env, tick: i32, tick_spacing: i32) -> Result<(), PoolError> {
    if tick % tick_spacing != 0 {
        return Err(PoolError::TickMisaligned);
    }

    let (word_pos, bit_pos) = bitmap_position(tick / tick_spacing);

    let mask = 1u128 << bit_pos;
    let word = get_tick_bitmap_word(env, word_pos);
    set_tick_bitmap_word(env, word_pos, word ^ mask);
    Ok(())
}

/// Find the next initialized tick within one word
/// Returns (tick, initialized)
///
/// With `lte` the search covers the tick itself and everything below it in
/// the same word; otherwise it covers everything strictly above it. When
/// nothing is found the word boundary in the search direction is returned.
pub fn next_initialized_tick_within_one_word(
    env: &Env,
    tick: i32,
    tick_spacing: i32,
    lte: bool, // less than or equal (searching left)
) -> (i32, bool) {
    // Round toward negative infinity so -1 with spacing 60 compresses to -1, not 0
    let compressed = tick.div_euclid(tick_spacing);

    if lte {
        let (word_pos, bit_pos) = bitmap_position(compressed);

        // Create mask for bits at or below current position
        let mask = (1u128 << bit_pos) - 1 + (1u128 << bit_pos);
        let masked = get_tick_bitmap_word(env, word_pos) & mask;

        let initialized = masked != 0;
        let next = if initialized {
            let msb = 127 - masked.leading_zeros() as i32;
            ((word_pos * 128) + msb) * tick_spacing
        } else {
            (word_pos * 128) * tick_spacing
        };

        (next, initialized)
    } else {
        // Search right (greater than)
        let (word_pos, bit_pos) = bitmap_position(compressed + 1);

        // Create mask for bits at or above current position
        let mask = !((1u128 << bit_pos) - 1);
        let masked = get_tick_bitmap_word(env, word_pos) & mask;

        let initialized = masked != 0;
        let next = if initialized {
            let lsb = masked.trailing_zeros() as i32;
            ((word_pos * 128) + lsb) * tick_spacing
        } else {
            ((word_pos * 128) + 127) * tick_spacing
        };

        (next, initialized)
    }
}
