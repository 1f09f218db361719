use crate::events::emit_modify_position;
use crate::position;
use crate::settlement::{notify_observer, request_payment, Callback};
use crate::storage::{set_state, unlock};
use crate::tick::{self, clear, flip_tick, get_fee_growth_inside};
use clmm_math::{add_delta, get_amount0_delta_signed, get_amount1_delta_signed, sqrt_price_at_tick};
use clmm_types::{PoolConfig, PoolError, PoolState, PositionKey, MAX_TICK, MIN_TICK};
use soroban_sdk::{Address, Bytes, Env};

/// Check that a range is ordered, in bounds and on the pool's spacing
pub fn validate_ticks(tick_lower: i32, tick_upper: i32, tick_spacing: i32) -> Result<(), PoolError> {
    if tick_lower >= tick_upper || tick_lower < MIN_TICK || tick_upper > MAX_TICK {
        return Err(PoolError::InvalidRange);
    }
    if tick_lower % tick_spacing != 0 || tick_upper % tick_spacing != 0 {
        return Err(PoolError::TickMisaligned);
    }
    Ok(())
}

/// Apply a liquidity delta to a position and its bounding ticks.
///
/// Returns the signed token amounts the change is worth: positive amounts are
/// owed to the pool (rounded up), negative amounts are released (rounded down).
/// Active liquidity moves only when the range contains the current tick.
pub fn modify_position(
    env: &Env,
    config: &PoolConfig,
    state: &mut PoolState,
    key: &PositionKey,
    liquidity_delta: i128,
) -> Result<(i128, i128), PoolError> {
    validate_ticks(key.tick_lower, key.tick_upper, config.tick_spacing)?;

    update_position(env, config, state, key, liquidity_delta)?;

    if liquidity_delta == 0 {
        return Ok((0, 0));
    }

    let sqrt_price_lower = sqrt_price_at_tick(env, key.tick_lower)?;
    let sqrt_price_upper = sqrt_price_at_tick(env, key.tick_upper)?;

    if state.tick < key.tick_lower {
        // Range is above the price: all token0
        let amount0 =
            get_amount0_delta_signed(env, sqrt_price_lower, sqrt_price_upper, liquidity_delta)?;
        Ok((amount0, 0))
    } else if state.tick < key.tick_upper {
        let amount0 = get_amount0_delta_signed(
            env,
            state.sqrt_price_x96,
            sqrt_price_upper,
            liquidity_delta,
        )?;
        let amount1 = get_amount1_delta_signed(
            env,
            sqrt_price_lower,
            state.sqrt_price_x96,
            liquidity_delta,
        )?;
        state.liquidity = add_delta(state.liquidity, liquidity_delta)?;
        Ok((amount0, amount1))
    } else {
        // Range is below the price: all token1
        let amount1 =
            get_amount1_delta_signed(env, sqrt_price_lower, sqrt_price_upper, liquidity_delta)?;
        Ok((0, amount1))
    }
}

fn update_position(
    env: &Env,
    config: &PoolConfig,
    state: &PoolState,
    key: &PositionKey,
    liquidity_delta: i128,
) -> Result<(), PoolError> {
    let mut flipped_lower = false;
    let mut flipped_upper = false;

    if liquidity_delta != 0 {
        flipped_lower = tick::update(
            env,
            key.tick_lower,
            state,
            liquidity_delta,
            false,
            config.max_liquidity_per_tick,
        )?;
        flipped_upper = tick::update(
            env,
            key.tick_upper,
            state,
            liquidity_delta,
            true,
            config.max_liquidity_per_tick,
        )?;

        if flipped_lower {
            flip_tick(env, key.tick_lower, config.tick_spacing)?;
        }
        if flipped_upper {
            flip_tick(env, key.tick_upper, config.tick_spacing)?;
        }
    }

    let (fee_growth_inside_0_x64, fee_growth_inside_1_x64) = get_fee_growth_inside(
        env,
        key.tick_lower,
        key.tick_upper,
        state.tick,
        state.fee_growth_global_0_x64,
        state.fee_growth_global_1_x64,
    );

    position::update(
        env,
        key,
        liquidity_delta,
        fee_growth_inside_0_x64,
        fee_growth_inside_1_x64,
    )?;

    // Ticks are only emptied by a withdrawal; their data was needed for the fee snapshot above
    if liquidity_delta < 0 {
        if flipped_lower {
            clear(env, key.tick_lower);
        }
        if flipped_upper {
            clear(env, key.tick_upper);
        }
    }

    Ok(())
}

/// Run a position change on the locked pool state.
///
/// Withdrawn principal is credited to the position's tokens owed for a later
/// `collect`. Deposits are settled through the sender's callback.
#[allow(clippy::too_many_arguments)]
pub fn execute_modify_position(
    env: &Env,
    config: &PoolConfig,
    mut state: PoolState,
    sender: &Address,
    owner: Address,
    tick_lower: i32,
    tick_upper: i32,
    liquidity_delta: i128,
    data: &Bytes,
) -> Result<(i128, i128), PoolError> {
    let key = PositionKey {
        owner,
        tick_lower,
        tick_upper,
    };
    let tick_before = state.tick;
    let liquidity_before = state.liquidity;

    let (amount0, amount1) = modify_position(env, config, &mut state, &key, liquidity_delta)?;

    if liquidity_delta != 0 {
        notify_observer(env, config, &mut state, tick_before, liquidity_before);
    }
    set_state(env, &state);

    if liquidity_delta < 0 {
        position::credit_withdrawal(
            env,
            &key,
            amount0.unsigned_abs(),
            amount1.unsigned_abs(),
        )?;
    } else if liquidity_delta > 0 {
        request_payment(
            env,
            config,
            sender,
            amount0,
            amount1,
            data,
            Callback::ModifyPosition,
        )?;
    }

    emit_modify_position(
        env,
        &key.owner,
        tick_lower,
        tick_upper,
        liquidity_delta,
        amount0,
        amount1,
    );

    unlock(env)?;
    Ok((amount0, amount1))
}
