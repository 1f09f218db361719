#![no_std]

mod events;
#[cfg(test)]
mod invariants;
mod liquidity;
mod position;
mod settlement;
mod storage;
mod swap;
mod tick;

use clmm_types::{
    is_valid_fee_config, max_liquidity_per_tick, PoolConfig, PoolError, PoolState, PositionInfo,
    PositionKey, SwapResult, TickInfo,
};
use soroban_sdk::{contract, contractimpl, Address, Bytes, Env};
use storage::{get_config, get_position, get_state, get_tick, has_config, lock, set_config, set_state};

#[contract]
pub struct ClmmPool;

#[contractimpl]
impl ClmmPool {
    /// Initialize a new pool at a starting price
    pub fn initialize(
        env: Env,
        token0: Address,
        token1: Address,
        fee: u32,
        tick_spacing: i32,
        observer: Option<Address>,
        sqrt_price_x96: u128,
    ) -> Result<(), PoolError> {
        if has_config(&env) {
            return Err(PoolError::AlreadyInitialized);
        }

        if token0 >= token1 || !is_valid_fee_config(fee, tick_spacing) {
            return Err(PoolError::InvalidConfig);
        }

        // Calculate initial tick from sqrt price
        let tick = clmm_math::tick_at_sqrt_price(&env, sqrt_price_x96)?;

        let config = PoolConfig {
            token0,
            token1,
            fee,
            tick_spacing,
            max_liquidity_per_tick: max_liquidity_per_tick(tick_spacing),
            observer,
        };
        set_config(&env, &config);
        set_state(&env, &PoolState::new(sqrt_price_x96, tick));

        events::emit_initialize(&env, sqrt_price_x96, tick);
        Ok(())
    }

    /// Execute a swap
    ///
    /// # Arguments
    /// * `sender` - Pays the input through its `swap_callback`
    /// * `recipient` - Address to receive output tokens
    /// * `zero_for_one` - True if swapping token0 for token1
    /// * `amount_specified` - Positive for exact input, negative for exact output
    /// * `sqrt_price_limit_x96` - Price limit for the swap, 0 for none
    /// * `data` - Passed through to the callback
    pub fn swap(
        env: Env,
        sender: Address,
        recipient: Address,
        zero_for_one: bool,
        amount_specified: i128,
        sqrt_price_limit_x96: u128,
        data: Bytes,
    ) -> Result<SwapResult, PoolError> {
        sender.require_auth();
        let config = get_config(&env)?;
        let state = lock(&env)?;
        swap::execute_swap(
            &env,
            &config,
            state,
            &sender,
            &recipient,
            zero_for_one,
            amount_specified,
            sqrt_price_limit_x96,
            &data,
        )
    }

    /// Add (positive delta), remove (negative) or poke (zero) liquidity of a position.
    ///
    /// Deposits are paid by `sender` through `modify_position_callback`.
    /// Removed amounts become collectable by `owner`.
    pub fn modify_position(
        env: Env,
        sender: Address,
        owner: Address,
        tick_lower: i32,
        tick_upper: i32,
        liquidity_delta: i128,
        data: Bytes,
    ) -> Result<(i128, i128), PoolError> {
        if liquidity_delta > 0 {
            sender.require_auth();
        } else {
            owner.require_auth();
        }
        let config = get_config(&env)?;
        let state = lock(&env)?;
        liquidity::execute_modify_position(
            &env,
            &config,
            state,
            &sender,
            owner,
            tick_lower,
            tick_upper,
            liquidity_delta,
            &data,
        )
    }

    /// Collect up to the requested amounts of tokens owed to a position
    pub fn collect(
        env: Env,
        owner: Address,
        recipient: Address,
        tick_lower: i32,
        tick_upper: i32,
        amount0_requested: u128,
        amount1_requested: u128,
    ) -> Result<(u128, u128), PoolError> {
        owner.require_auth();
        let config = get_config(&env)?;
        lock(&env)?;

        let key = PositionKey {
            owner,
            tick_lower,
            tick_upper,
        };
        let (amount0, amount1) =
            position::collect(&env, &key, amount0_requested, amount1_requested)?;

        settlement::pay_out(&env, &config.token0, &recipient, amount0)?;
        settlement::pay_out(&env, &config.token1, &recipient, amount1)?;

        events::emit_collect(
            &env,
            &key.owner,
            &recipient,
            tick_lower,
            tick_upper,
            amount0,
            amount1,
        );

        storage::unlock(&env)?;
        Ok((amount0, amount1))
    }

    /// Simulate a swap against current state without changing anything
    pub fn quote(
        env: Env,
        zero_for_one: bool,
        amount_specified: i128,
        sqrt_price_limit_x96: u128,
    ) -> Result<SwapResult, PoolError> {
        let config = get_config(&env)?;
        let mut state = get_state(&env)?;
        swap::compute_swap(
            &env,
            &config,
            &mut state,
            zero_for_one,
            amount_specified,
            sqrt_price_limit_x96,
            false,
        )
    }

    // === View Functions ===

    pub fn get_state(env: Env) -> Result<PoolState, PoolError> {
        get_state(&env)
    }

    pub fn get_config(env: Env) -> Result<PoolConfig, PoolError> {
        get_config(&env)
    }

    /// Tick data; all zero for an uninitialized tick
    pub fn get_tick(env: Env, tick: i32) -> TickInfo {
        get_tick(&env, tick)
    }

    pub fn get_tick_bitmap_word(env: Env, word_pos: i32) -> u128 {
        storage::get_tick_bitmap_word(&env, word_pos)
    }

    pub fn get_position(
        env: Env,
        owner: Address,
        tick_lower: i32,
        tick_upper: i32,
    ) -> PositionInfo {
        get_position(
            &env,
            &PositionKey {
                owner,
                tick_lower,
                tick_upper,
            },
        )
    }

    /// Current fee growth per unit of liquidity inside a range (Q64.64, wrapping)
    pub fn fee_growth_inside(
        env: Env,
        tick_lower: i32,
        tick_upper: i32,
    ) -> Result<(u128, u128), PoolError> {
        let config = get_config(&env)?;
        liquidity::validate_ticks(tick_lower, tick_upper, config.tick_spacing)?;
        let state = get_state(&env)?;
        Ok(tick::get_fee_growth_inside(
            &env,
            tick_lower,
            tick_upper,
            state.tick,
            state.fee_growth_global_0_x64,
            state.fee_growth_global_1_x64,
        ))
    }

    /// Seconds the price has spent inside a range. Only differences between
    /// two readings taken while the range's ticks stayed initialized are meaningful.
    pub fn seconds_inside(env: Env, tick_lower: i32, tick_upper: i32) -> Result<u64, PoolError> {
        let config = get_config(&env)?;
        liquidity::validate_ticks(tick_lower, tick_upper, config.tick_spacing)?;
        let state = get_state(&env)?;
        Ok(tick::get_seconds_inside(
            &env,
            tick_lower,
            tick_upper,
            state.tick,
            env.ledger().timestamp(),
        ))
    }

    pub fn sqrt_price_x96(env: Env) -> Result<u128, PoolError> {
        Ok(get_state(&env)?.sqrt_price_x96)
    }

    pub fn tick(env: Env) -> Result<i32, PoolError> {
        Ok(get_state(&env)?.tick)
    }

    pub fn liquidity(env: Env) -> Result<u128, PoolError> {
        Ok(get_state(&env)?.liquidity)
    }

    pub fn token0(env: Env) -> Result<Address, PoolError> {
        Ok(get_config(&env)?.token0)
    }

    pub fn token1(env: Env) -> Result<Address, PoolError> {
        Ok(get_config(&env)?.token1)
    }

    pub fn fee(env: Env) -> Result<u32, PoolError> {
        Ok(get_config(&env)?.fee)
    }

    pub fn tick_spacing(env: Env) -> Result<i32, PoolError> {
        Ok(get_config(&env)?.tick_spacing)
    }

    pub fn max_liquidity_per_tick(env: Env) -> Result<u128, PoolError> {
        Ok(get_config(&env)?.max_liquidity_per_tick)
    }
}
