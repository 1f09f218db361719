use clmm_types::{PoolError, MAX_SQRT_PRICE, MAX_TICK, MIN_SQRT_PRICE, MIN_TICK};
use soroban_sdk::{Env, U256};

use crate::full_math::u256_to_u128;

/// 1/sqrt(1.0001)^(2^i) in Q128, for i in 0..19
const SQRT_RATIO_CONSTANTS: [u128; 19] = [
    0xfffcb933bd6fad37aa2d162d1a594001,
    0xfff97272373d413259a46990580e213a,
    0xfff2e50f5f656932ef12357cf3c7fdcc,
    0xffe5caca7e10e4e61c3624eaa0941cd0,
    0xffcb9843d60f6159c9db58835c926644,
    0xff973b41fa98c081472e6896dfb254c0,
    0xff2ea16466c96a3843ec78b326b52861,
    0xfe5dee046a99a2a811c461f1969c3053,
    0xfcbe86c7900a88aedcffc83b479aa3a4,
    0xf987a7253ac413176f2b074cf7815e54,
    0xf3392b0822b70005940c7a398e4b70f3,
    0xe7159475a2c29b7443b29c7fa6e889d9,
    0xd097f3bdfd2022b8845ad8f792aa5825,
    0xa9f746462d870fdf8a65dc1f90e061e5,
    0x70d869a156d2a1b890bb3df62baf32f7,
    0x31be135f97d08fd981231505542fcfa6,
    0x9aa508b5b7a84e1c677de54f3e99bc9,
    0x5d6af8dedb81196699c329225ee604,
    0x2216e584f5fa1ea926041bedfe98,
];

/// 1 / log2(sqrt(1.0001)) in Q32
const LOG_SQRT_10001_INV_X32: i128 = 59543866431248;

/// Half-width of the candidate window around the estimated tick, ~0.01 tick in Q64
const TICK_ESTIMATE_ERROR_X64: i128 = 184467440737095516;

/// Fractional bits of log2 resolved by repeated squaring
const LOG2_FRACTION_BITS: u32 = 24;

/// Calculate sqrt(1.0001^tick) * 2^96.
///
/// The product is accumulated in Q128 for |tick| and inverted for positive ticks.
/// The Q128 -> Q96 conversion rounds up, so `tick_at_sqrt_price` of the result
/// always lands back on `tick`.
pub fn sqrt_price_at_tick(env: &Env, tick: i32) -> Result<u128, PoolError> {
    if !(MIN_TICK..=MAX_TICK).contains(&tick) {
        return Err(PoolError::TickOutOfRange);
    }

    let abs_tick = tick.unsigned_abs();
    let q128 = U256::from_u32(env, 1).shl(128);

    let mut ratio = q128.clone();
    for (bit, constant) in SQRT_RATIO_CONSTANTS.iter().enumerate() {
        if abs_tick & (1 << bit) != 0 {
            ratio = ratio.mul(&U256::from_u128(env, *constant)).shr(128);
        }
    }

    if tick > 0 {
        ratio = u256_max(env).div(&ratio);
    }

    let shift = U256::from_u128(env, 1u128 << 32);
    let mut sqrt_price = u256_to_u128(&ratio.div(&shift))?;
    if ratio.rem_euclid(&shift) != U256::from_u32(env, 0) {
        sqrt_price = sqrt_price.checked_add(1).ok_or(PoolError::Overflow)?;
    }
    Ok(sqrt_price)
}

/// Greatest tick whose sqrt price does not exceed `sqrt_price_x96`.
///
/// log2 of the price is estimated from its most significant bit plus fractional
/// bits from repeated squaring of the normalized mantissa. The estimate is
/// narrowed to two adjacent candidates and the upper one is checked against
/// `sqrt_price_at_tick`.
pub fn tick_at_sqrt_price(env: &Env, sqrt_price_x96: u128) -> Result<i32, PoolError> {
    if !(MIN_SQRT_PRICE..MAX_SQRT_PRICE).contains(&sqrt_price_x96) {
        return Err(PoolError::PriceOutOfRange);
    }

    let msb = 127 - sqrt_price_x96.leading_zeros();

    // Mantissa in [2^63, 2^64), i.e. [1, 2) with 63 fractional bits
    let mut mantissa = if msb >= 63 {
        sqrt_price_x96 >> (msb - 63)
    } else {
        sqrt_price_x96 << (63 - msb)
    };

    // log2(sqrt_price) as Q64.64
    let mut log_2: i128 = (msb as i128 - 96) << 64;
    for k in 1..=LOG2_FRACTION_BITS {
        mantissa = (mantissa * mantissa) >> 63;
        let carry = mantissa >> 64;
        log_2 |= (carry as i128) << (64 - k);
        mantissa >>= carry;
    }

    // Q32.32 * Q32 -> Q64 in units of ticks
    let log_sqrt_10001 = (log_2 >> 32) * LOG_SQRT_10001_INV_X32;

    let tick_low = ((log_sqrt_10001 - TICK_ESTIMATE_ERROR_X64) >> 64) as i32;
    let tick_high = (((log_sqrt_10001 + TICK_ESTIMATE_ERROR_X64) >> 64) as i32).min(MAX_TICK);

    if tick_low == tick_high {
        Ok(tick_low)
    } else if sqrt_price_at_tick(env, tick_high)? <= sqrt_price_x96 {
        Ok(tick_high)
    } else {
        Ok(tick_low)
    }
}

/// 2^256 - 1
fn u256_max(env: &Env) -> U256 {
    U256::from_parts(env, u64::MAX, u64::MAX, u64::MAX, u64::MAX)
}
