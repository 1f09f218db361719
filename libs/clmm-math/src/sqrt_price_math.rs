use crate::full_math::{bit_length, mul_div, u256_to_u128};
use clmm_types::{PoolError, Q96};
use soroban_sdk::{Env, U256};

/// Amount of token0 between two sqrt prices for a liquidity
/// delta_x = L * 2^96 * (sqrt_upper - sqrt_lower) / (sqrt_upper * sqrt_lower)
///
/// Evaluated in two exact U256 divisions: first by sqrt_upper keeping the
/// remainder as a Q96 fraction, then by sqrt_lower. Both rounding directions
/// are exact.
pub fn get_amount0_delta(
    env: &Env,
    sqrt_ratio_a_x96: u128,
    sqrt_ratio_b_x96: u128,
    liquidity: u128,
    round_up: bool,
) -> Result<u128, PoolError> {
    let (sqrt_ratio_lower, sqrt_ratio_upper) = sort(sqrt_ratio_a_x96, sqrt_ratio_b_x96);
    if sqrt_ratio_lower == 0 {
        return Err(PoolError::PriceOutOfRange);
    }

    let zero = U256::from_u32(env, 0);
    let q96 = U256::from_u128(env, Q96);
    let upper = U256::from_u128(env, sqrt_ratio_upper);
    let lower = U256::from_u128(env, sqrt_ratio_lower);

    // L * (upper - lower) / upper = whole + remainder / upper, whole < L
    let numerator = U256::from_u128(env, liquidity)
        .mul(&U256::from_u128(env, sqrt_ratio_upper - sqrt_ratio_lower));
    let whole = numerator.div(&upper);
    let remainder = numerator.rem_euclid(&upper);

    let fraction_x96 = remainder.mul(&q96);
    let fraction = fraction_x96.div(&upper);
    let fraction_inexact = fraction_x96.rem_euclid(&upper) != zero;

    let scaled = whole.mul(&q96).add(&fraction);
    let mut amount = u256_to_u128(&scaled.div(&lower))?;
    if round_up && (fraction_inexact || scaled.rem_euclid(&lower) != zero) {
        amount = amount.checked_add(1).ok_or(PoolError::Overflow)?;
    }
    Ok(amount)
}

/// Amount of token1 between two sqrt prices for a liquidity
/// delta_y = L * (sqrt_upper - sqrt_lower) / 2^96
pub fn get_amount1_delta(
    env: &Env,
    sqrt_ratio_a_x96: u128,
    sqrt_ratio_b_x96: u128,
    liquidity: u128,
    round_up: bool,
) -> Result<u128, PoolError> {
    let (sqrt_ratio_lower, sqrt_ratio_upper) = sort(sqrt_ratio_a_x96, sqrt_ratio_b_x96);
    mul_div(
        env,
        liquidity,
        sqrt_ratio_upper - sqrt_ratio_lower,
        Q96,
        round_up,
    )
}

/// Signed token0 amount for a liquidity change.
/// Adding liquidity rounds up (owed to the pool), removing rounds down and is negative.
pub fn get_amount0_delta_signed(
    env: &Env,
    sqrt_ratio_a_x96: u128,
    sqrt_ratio_b_x96: u128,
    liquidity_delta: i128,
) -> Result<i128, PoolError> {
    let amount = get_amount0_delta(
        env,
        sqrt_ratio_a_x96,
        sqrt_ratio_b_x96,
        liquidity_delta.unsigned_abs(),
        liquidity_delta > 0,
    )?;
    signed(amount, liquidity_delta < 0)
}

/// Signed token1 amount for a liquidity change
pub fn get_amount1_delta_signed(
    env: &Env,
    sqrt_ratio_a_x96: u128,
    sqrt_ratio_b_x96: u128,
    liquidity_delta: i128,
) -> Result<i128, PoolError> {
    let amount = get_amount1_delta(
        env,
        sqrt_ratio_a_x96,
        sqrt_ratio_b_x96,
        liquidity_delta.unsigned_abs(),
        liquidity_delta > 0,
    )?;
    signed(amount, liquidity_delta < 0)
}

/// Next sqrt price after `amount_in` enters the pool.
/// Rounds so the price never moves further than the input pays for.
pub fn get_next_sqrt_price_from_input(
    env: &Env,
    sqrt_price_x96: u128,
    liquidity: u128,
    amount_in: u128,
    zero_for_one: bool,
) -> Result<u128, PoolError> {
    if sqrt_price_x96 == 0 || liquidity == 0 {
        return Err(PoolError::Overflow);
    }

    if zero_for_one {
        get_next_sqrt_price_from_amount0_rounding_up(env, sqrt_price_x96, liquidity, amount_in, true)
    } else {
        get_next_sqrt_price_from_amount1_rounding_down(env, sqrt_price_x96, liquidity, amount_in, true)
    }
}

/// Next sqrt price after `amount_out` leaves the pool.
/// Rounds so the price moves at least as far as the output requires.
pub fn get_next_sqrt_price_from_output(
    env: &Env,
    sqrt_price_x96: u128,
    liquidity: u128,
    amount_out: u128,
    zero_for_one: bool,
) -> Result<u128, PoolError> {
    if sqrt_price_x96 == 0 || liquidity == 0 {
        return Err(PoolError::Overflow);
    }

    if zero_for_one {
        get_next_sqrt_price_from_amount1_rounding_down(env, sqrt_price_x96, liquidity, amount_out, false)
    } else {
        get_next_sqrt_price_from_amount0_rounding_up(env, sqrt_price_x96, liquidity, amount_out, false)
    }
}

/// sqrt_price_next = L * 2^96 * sqrt_price / (L * 2^96 +- amount * sqrt_price), rounded up.
///
/// The exact form needs (L * 2^96) * sqrt_price within 256 bits. Past that the
/// equivalent L * 2^96 / (L * 2^96 / sqrt_price +- amount) is used; its inner
/// floor only pushes the result further up.
pub fn get_next_sqrt_price_from_amount0_rounding_up(
    env: &Env,
    sqrt_price_x96: u128,
    liquidity: u128,
    amount: u128,
    add: bool,
) -> Result<u128, PoolError> {
    if amount == 0 {
        return Ok(sqrt_price_x96);
    }

    let numerator1 = U256::from_u128(env, liquidity).shl(96);
    let sqrt_price = U256::from_u128(env, sqrt_price_x96);
    let amount_256 = U256::from_u128(env, amount);
    let product = amount_256.mul(&sqrt_price);
    let exact_fits = bit_length(liquidity) + 96 + bit_length(sqrt_price_x96) <= 256;

    if add {
        if exact_fits && bit_length(amount) + bit_length(sqrt_price_x96) <= 255 {
            let denominator = numerator1.add(&product);
            return u256_to_u128(&div_ceil(env, &numerator1.mul(&sqrt_price), &denominator));
        }
        let denominator = numerator1.div(&sqrt_price).add(&amount_256);
        u256_to_u128(&div_ceil(env, &numerator1, &denominator))
    } else {
        if numerator1 <= product {
            return Err(PoolError::Overflow);
        }
        if exact_fits {
            let denominator = numerator1.sub(&product);
            return u256_to_u128(&div_ceil(env, &numerator1.mul(&sqrt_price), &denominator));
        }
        let reciprocal = numerator1.div(&sqrt_price);
        if reciprocal <= amount_256 {
            return Err(PoolError::Overflow);
        }
        u256_to_u128(&div_ceil(env, &numerator1, &reciprocal.sub(&amount_256)))
    }
}

/// sqrt_price_next = sqrt_price +- amount * 2^96 / L, rounded down
pub fn get_next_sqrt_price_from_amount1_rounding_down(
    env: &Env,
    sqrt_price_x96: u128,
    liquidity: u128,
    amount: u128,
    add: bool,
) -> Result<u128, PoolError> {
    if add {
        let quotient = mul_div(env, amount, Q96, liquidity, false)?;
        sqrt_price_x96
            .checked_add(quotient)
            .ok_or(PoolError::Overflow)
    } else {
        let quotient = mul_div(env, amount, Q96, liquidity, true)?;
        if sqrt_price_x96 <= quotient {
            return Err(PoolError::Overflow);
        }
        Ok(sqrt_price_x96 - quotient)
    }
}

fn sort(a: u128, b: u128) -> (u128, u128) {
    if a > b {
        (b, a)
    } else {
        (a, b)
    }
}

fn signed(amount: u128, negative: bool) -> Result<i128, PoolError> {
    let amount = i128::try_from(amount).map_err(|_| PoolError::Overflow)?;
    Ok(if negative { -amount } else { amount })
}

fn div_ceil(env: &Env, numerator: &U256, denominator: &U256) -> U256 {
    let quotient = numerator.div(denominator);
    if numerator.rem_euclid(denominator) != U256::from_u32(env, 0) {
        quotient.add(&U256::from_u32(env, 1))
    } else {
        quotient
    }
}
