use clmm_types::PoolError;
use soroban_sdk::{Env, U256};

/// Multiply and divide with 256-bit intermediate precision.
/// Returns floor or ceil of (a * b) / denominator depending on `round_up`.
///
/// Fails with `Overflow` when the denominator is zero or the result does not
/// fit in a u128.
pub fn mul_div(
    env: &Env,
    a: u128,
    b: u128,
    denominator: u128,
    round_up: bool,
) -> Result<u128, PoolError> {
    if denominator == 0 {
        return Err(PoolError::Overflow);
    }

    let product = U256::from_u128(env, a).mul(&U256::from_u128(env, b));
    let denom_256 = U256::from_u128(env, denominator);

    let mut result = u256_to_u128(&product.div(&denom_256))?;
    if round_up && product.rem_euclid(&denom_256) != U256::from_u32(env, 0) {
        result = result.checked_add(1).ok_or(PoolError::Overflow)?;
    }
    Ok(result)
}

/// ceil((a * b) / denominator)
pub fn mul_div_rounding_up(
    env: &Env,
    a: u128,
    b: u128,
    denominator: u128,
) -> Result<u128, PoolError> {
    mul_div(env, a, b, denominator, true)
}

/// Unsigned division with rounding up
pub fn div_rounding_up(a: u128, b: u128) -> Result<u128, PoolError> {
    if b == 0 {
        return Err(PoolError::Overflow);
    }
    let quotient = a / b;
    if a % b == 0 {
        Ok(quotient)
    } else {
        Ok(quotient + 1)
    }
}

/// Narrow a U256 to u128
pub(crate) fn u256_to_u128(value: &U256) -> Result<u128, PoolError> {
    value.to_u128().ok_or(PoolError::Overflow)
}

/// Number of significant bits in `value`
pub(crate) fn bit_length(value: u128) -> u32 {
    128 - value.leading_zeros()
}
