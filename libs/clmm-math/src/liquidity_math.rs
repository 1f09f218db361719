use crate::full_math::mul_div;
use crate::sqrt_price_math::{get_amount0_delta, get_amount1_delta};
use clmm_types::{PoolError, Q96};
use soroban_sdk::Env;

/// Largest liquidity the given token amounts fully fund for a price range
pub fn get_liquidity_for_amounts(
    env: &Env,
    sqrt_ratio_x96: u128,
    sqrt_ratio_a_x96: u128,
    sqrt_ratio_b_x96: u128,
    amount0: u128,
    amount1: u128,
) -> Result<u128, PoolError> {
    let (sqrt_ratio_lower, sqrt_ratio_upper) = sort(sqrt_ratio_a_x96, sqrt_ratio_b_x96);

    if sqrt_ratio_x96 <= sqrt_ratio_lower {
        get_liquidity_for_amount0(env, sqrt_ratio_lower, sqrt_ratio_upper, amount0)
    } else if sqrt_ratio_x96 < sqrt_ratio_upper {
        let liquidity0 = get_liquidity_for_amount0(env, sqrt_ratio_x96, sqrt_ratio_upper, amount0)?;
        let liquidity1 = get_liquidity_for_amount1(env, sqrt_ratio_lower, sqrt_ratio_x96, amount1)?;
        Ok(liquidity0.min(liquidity1))
    } else {
        get_liquidity_for_amount1(env, sqrt_ratio_lower, sqrt_ratio_upper, amount1)
    }
}

/// L = amount0 * sqrt_pa * sqrt_pb / (sqrt_pb - sqrt_pa)
pub fn get_liquidity_for_amount0(
    env: &Env,
    sqrt_ratio_a_x96: u128,
    sqrt_ratio_b_x96: u128,
    amount0: u128,
) -> Result<u128, PoolError> {
    let (sqrt_ratio_lower, sqrt_ratio_upper) = sort(sqrt_ratio_a_x96, sqrt_ratio_b_x96);
    let intermediate = mul_div(env, sqrt_ratio_lower, sqrt_ratio_upper, Q96, false)?;
    mul_div(
        env,
        amount0,
        intermediate,
        sqrt_ratio_upper - sqrt_ratio_lower,
        false,
    )
}

/// L = amount1 / (sqrt_pb - sqrt_pa)
pub fn get_liquidity_for_amount1(
    env: &Env,
    sqrt_ratio_a_x96: u128,
    sqrt_ratio_b_x96: u128,
    amount1: u128,
) -> Result<u128, PoolError> {
    let (sqrt_ratio_lower, sqrt_ratio_upper) = sort(sqrt_ratio_a_x96, sqrt_ratio_b_x96);
    mul_div(env, amount1, Q96, sqrt_ratio_upper - sqrt_ratio_lower, false)
}

/// Token amounts represented by a liquidity for a price range, rounded down
pub fn get_amounts_for_liquidity(
    env: &Env,
    sqrt_ratio_x96: u128,
    sqrt_ratio_a_x96: u128,
    sqrt_ratio_b_x96: u128,
    liquidity: u128,
) -> Result<(u128, u128), PoolError> {
    let (sqrt_ratio_lower, sqrt_ratio_upper) = sort(sqrt_ratio_a_x96, sqrt_ratio_b_x96);

    if sqrt_ratio_x96 <= sqrt_ratio_lower {
        let amount0 = get_amount0_delta(env, sqrt_ratio_lower, sqrt_ratio_upper, liquidity, false)?;
        Ok((amount0, 0))
    } else if sqrt_ratio_x96 < sqrt_ratio_upper {
        let amount0 = get_amount0_delta(env, sqrt_ratio_x96, sqrt_ratio_upper, liquidity, false)?;
        let amount1 = get_amount1_delta(env, sqrt_ratio_lower, sqrt_ratio_x96, liquidity, false)?;
        Ok((amount0, amount1))
    } else {
        let amount1 = get_amount1_delta(env, sqrt_ratio_lower, sqrt_ratio_upper, liquidity, false)?;
        Ok((0, amount1))
    }
}

/// Add signed liquidity delta to unsigned liquidity
pub fn add_delta(liquidity: u128, delta: i128) -> Result<u128, PoolError> {
    if delta < 0 {
        liquidity
            .checked_sub(delta.unsigned_abs())
            .ok_or(PoolError::LiquidityUnderflow)
    } else {
        liquidity
            .checked_add(delta as u128)
            .ok_or(PoolError::LiquidityOverflow)
    }
}

fn sort(a: u128, b: u128) -> (u128, u128) {
    if a > b {
        (b, a)
    } else {
        (a, b)
    }
}
