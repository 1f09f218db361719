use crate::storage::{get_position, set_position};
use clmm_math::{add_delta, mul_div};
use clmm_types::{PoolError, PositionInfo, PositionKey, Q64};
use soroban_sdk::Env;

/// Credit fees earned since the last snapshot, then apply the liquidity delta.
///
/// A zero delta only settles fees and requires the position to hold liquidity.
pub fn update(
    env: &Env,
    key: &PositionKey,
    liquidity_delta: i128,
    fee_growth_inside_0_x64: u128,
    fee_growth_inside_1_x64: u128,
) -> Result<PositionInfo, PoolError> {
    let mut info = get_position(env, key);

    let liquidity_next = if liquidity_delta == 0 {
        if info.liquidity == 0 {
            return Err(PoolError::NoPosition);
        }
        info.liquidity
    } else {
        add_delta(info.liquidity, liquidity_delta)?
    };

    // Growth differences wrap; only the distance since the snapshot matters
    let tokens_owed_0 = mul_div(
        env,
        fee_growth_inside_0_x64.wrapping_sub(info.fee_growth_inside_0_last_x64),
        info.liquidity,
        Q64,
        false,
    )?;
    let tokens_owed_1 = mul_div(
        env,
        fee_growth_inside_1_x64.wrapping_sub(info.fee_growth_inside_1_last_x64),
        info.liquidity,
        Q64,
        false,
    )?;

    info.liquidity = liquidity_next;
    info.fee_growth_inside_0_last_x64 = fee_growth_inside_0_x64;
    info.fee_growth_inside_1_last_x64 = fee_growth_inside_1_x64;
    credit(&mut info, tokens_owed_0, tokens_owed_1)?;

    set_position(env, key, &info);
    Ok(info)
}

/// Add withdrawn principal to what the owner can collect
pub fn credit_withdrawal(
    env: &Env,
    key: &PositionKey,
    amount0: u128,
    amount1: u128,
) -> Result<(), PoolError> {
    let mut info = get_position(env, key);
    credit(&mut info, amount0, amount1)?;
    set_position(env, key, &info);
    Ok(())
}

/// Pay out up to the requested amounts from tokens owed.
/// Returns the amounts actually taken.
pub fn collect(
    env: &Env,
    key: &PositionKey,
    amount0_requested: u128,
    amount1_requested: u128,
) -> Result<(u128, u128), PoolError> {
    let mut info = get_position(env, key);

    let amount0 = amount0_requested.min(info.tokens_owed_0);
    let amount1 = amount1_requested.min(info.tokens_owed_1);

    if amount0 > 0 || amount1 > 0 {
        info.tokens_owed_0 -= amount0;
        info.tokens_owed_1 -= amount1;
        set_position(env, key, &info);
    }

    Ok((amount0, amount1))
}

fn credit(info: &mut PositionInfo, amount0: u128, amount1: u128) -> Result<(), PoolError> {
    info.tokens_owed_0 = info
        .tokens_owed_0
        .checked_add(amount0)
        .ok_or(PoolError::Overflow)?;
    info.tokens_owed_1 = info
        .tokens_owed_1
        .checked_add(amount1)
        .ok_or(PoolError::Overflow)?;
    Ok(())
}
