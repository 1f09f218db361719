#![no_std]

mod callback;
mod error;
mod pool;
mod position;
mod tick;

pub use callback::*;
pub use error::*;
pub use pool::*;
pub use position::*;
pub use tick::*;

/// Q96 constant (2^96), the fractional scale of sqrt prices
pub const Q96: u128 = 1 << 96;

/// Q64 constant (2^64), the fractional scale of fee growth per unit of liquidity
pub const Q64: u128 = 1 << 64;

/// Minimum tick index
/// Largest magnitude whose Q64.96 sqrt price still fits in a u128
pub const MIN_TICK: i32 = -443636;

/// Maximum tick index
pub const MAX_TICK: i32 = 443636;

/// Sqrt price at MIN_TICK, the lowest representable price
pub const MIN_SQRT_PRICE: u128 = 18447090764788882728;

/// Sqrt price at MAX_TICK, an exclusive upper bound for pool prices
pub const MAX_SQRT_PRICE: u128 = 340275971719517849884101479065584693834;

/// Fee denominator: fees are expressed in pips (hundredths of a basis point)
pub const FEE_DENOMINATOR: u32 = 1_000_000;

/// Largest tick spacing a pool may use
pub const MAX_TICK_SPACING: i32 = 16384;

/// Fee amount in pips (1e-6)
/// 500 = 0.05%, 3000 = 0.3%, 10000 = 1%
pub type Fee = u32;

/// Number of usable ticks for a spacing within [MIN_TICK, MAX_TICK]
pub fn num_valid_ticks(tick_spacing: i32) -> u128 {
    let min_tick = (MIN_TICK / tick_spacing) * tick_spacing;
    let max_tick = (MAX_TICK / tick_spacing) * tick_spacing;
    ((max_tick - min_tick) / tick_spacing) as u128 + 1
}

/// Maximum liquidity_gross any single tick may reference.
/// Keeps the sum over every usable tick within u128.
pub fn max_liquidity_per_tick(tick_spacing: i32) -> u128 {
    u128::MAX / num_valid_ticks(tick_spacing)
}

/// Whether a fee/spacing pair can configure a pool
pub fn is_valid_fee_config(fee: Fee, tick_spacing: i32) -> bool {
    fee < FEE_DENOMINATOR && tick_spacing > 0 && tick_spacing <= MAX_TICK_SPACING
}
