use crate::events::emit_swap;
use crate::settlement::{notify_observer, pay_out, request_payment, Callback};
use crate::storage::{get_tick, set_state, unlock};
use crate::tick::{cross, next_initialized_tick_within_one_word};
use clmm_math::{add_delta, compute_swap_step, mul_div, sqrt_price_at_tick, tick_at_sqrt_price};
use clmm_types::{
    PoolConfig, PoolError, PoolState, SwapResult, MAX_SQRT_PRICE, MAX_TICK, MIN_SQRT_PRICE,
    MIN_TICK, Q64,
};
use soroban_sdk::{log, Address, Bytes, Env};

/// Resolve and validate a swap's price limit. Zero selects the extreme
/// price in the swap direction.
pub fn resolve_price_limit(
    sqrt_price_x96: u128,
    zero_for_one: bool,
    sqrt_price_limit_x96: u128,
) -> Result<u128, PoolError> {
    let sqrt_price_limit = if sqrt_price_limit_x96 == 0 {
        if zero_for_one {
            MIN_SQRT_PRICE + 1
        } else {
            MAX_SQRT_PRICE - 1
        }
    } else {
        sqrt_price_limit_x96
    };

    let valid = if zero_for_one {
        sqrt_price_limit < sqrt_price_x96 && sqrt_price_limit > MIN_SQRT_PRICE
    } else {
        sqrt_price_limit > sqrt_price_x96 && sqrt_price_limit < MAX_SQRT_PRICE
    };

    if valid {
        Ok(sqrt_price_limit)
    } else {
        Err(PoolError::InvalidPriceLimit)
    }
}

/// Walk the price across initialized ticks until the specified amount is
/// used up or the price limit is reached.
///
/// `state` is advanced in place. Ticks are crossed in storage only when
/// `commit` is set; a dry run reads their liquidity_net and leaves them untouched.
pub fn compute_swap(
    env: &Env,
    config: &PoolConfig,
    state: &mut PoolState,
    zero_for_one: bool,
    amount_specified: i128,
    sqrt_price_limit_x96: u128,
    commit: bool,
) -> Result<SwapResult, PoolError> {
    if amount_specified == 0 {
        return Err(PoolError::ZeroAmount);
    }

    let sqrt_price_limit =
        resolve_price_limit(state.sqrt_price_x96, zero_for_one, sqrt_price_limit_x96)?;

    let exact_input = amount_specified > 0;
    let time = env.ledger().timestamp();

    // Swap state
    let mut amount_remaining = amount_specified;
    let mut amount_calculated: i128 = 0;
    let mut fee_growth_global_x64 = if zero_for_one {
        state.fee_growth_global_0_x64
    } else {
        state.fee_growth_global_1_x64
    };

    while amount_remaining != 0 && state.sqrt_price_x96 != sqrt_price_limit {
        let sqrt_price_start_x96 = state.sqrt_price_x96;

        // Find next initialized tick
        let (tick_next, initialized) = next_initialized_tick_within_one_word(
            env,
            state.tick,
            config.tick_spacing,
            zero_for_one,
        );

        // The bitmap knows nothing of the tick bounds
        let tick_next = tick_next.clamp(MIN_TICK, MAX_TICK);
        let sqrt_price_next_x96 = sqrt_price_at_tick(env, tick_next)?;

        // Stop at the limit if it comes before the next tick
        let sqrt_ratio_target_x96 = if zero_for_one {
            sqrt_price_next_x96.max(sqrt_price_limit)
        } else {
            sqrt_price_next_x96.min(sqrt_price_limit)
        };

        let step = compute_swap_step(
            env,
            state.sqrt_price_x96,
            sqrt_ratio_target_x96,
            state.liquidity,
            amount_remaining,
            config.fee,
        )?;

        let amount_paid = step
            .amount_in
            .checked_add(step.fee_amount)
            .and_then(|paid| i128::try_from(paid).ok())
            .ok_or(PoolError::Overflow)?;
        let amount_out = i128::try_from(step.amount_out).map_err(|_| PoolError::Overflow)?;

        if exact_input {
            amount_remaining = amount_remaining
                .checked_sub(amount_paid)
                .ok_or(PoolError::Overflow)?;
            amount_calculated = amount_calculated
                .checked_sub(amount_out)
                .ok_or(PoolError::Overflow)?;
        } else {
            amount_remaining = amount_remaining
                .checked_add(amount_out)
                .ok_or(PoolError::Overflow)?;
            amount_calculated = amount_calculated
                .checked_add(amount_paid)
                .ok_or(PoolError::Overflow)?;
        }

        // Fees are credited to the liquidity active during this step only
        if state.liquidity > 0 {
            let fee_growth_delta = mul_div(env, step.fee_amount, Q64, state.liquidity, false)?;
            fee_growth_global_x64 = fee_growth_global_x64.wrapping_add(fee_growth_delta);
        }

        state.sqrt_price_x96 = step.sqrt_ratio_next_x96;

        if state.sqrt_price_x96 == sqrt_price_next_x96 {
            if initialized {
                let (fee_growth_0, fee_growth_1) = if zero_for_one {
                    (fee_growth_global_x64, state.fee_growth_global_1_x64)
                } else {
                    (state.fee_growth_global_0_x64, fee_growth_global_x64)
                };

                let liquidity_net = if commit {
                    log!(env, "cross tick", tick_next);
                    cross(env, tick_next, fee_growth_0, fee_growth_1, time)
                } else {
                    get_tick(env, tick_next).liquidity_net
                };

                // Moving down leaves ranges through their lower tick
                let liquidity_net = if zero_for_one {
                    liquidity_net.checked_neg().ok_or(PoolError::Overflow)?
                } else {
                    liquidity_net
                };
                state.liquidity = add_delta(state.liquidity, liquidity_net)?;
            }

            state.tick = if zero_for_one { tick_next - 1 } else { tick_next };
        } else if state.sqrt_price_x96 != sqrt_price_start_x96 {
            // Price changed but didn't reach next tick
            state.tick = tick_at_sqrt_price(env, state.sqrt_price_x96)?;
        }
    }

    if zero_for_one {
        state.fee_growth_global_0_x64 = fee_growth_global_x64;
    } else {
        state.fee_growth_global_1_x64 = fee_growth_global_x64;
    }

    let amount_consumed = amount_specified
        .checked_sub(amount_remaining)
        .ok_or(PoolError::Overflow)?;
    let (amount0, amount1) = if zero_for_one == exact_input {
        (amount_consumed, amount_calculated)
    } else {
        (amount_calculated, amount_consumed)
    };

    let (amount_in, amount_out) = if zero_for_one {
        (amount0, amount1)
    } else {
        (amount1, amount0)
    };

    Ok(SwapResult {
        amount0,
        amount1,
        amount_in: amount_in.unsigned_abs(),
        amount_out: amount_out.unsigned_abs(),
        sqrt_price_x96: state.sqrt_price_x96,
        tick: state.tick,
        liquidity: state.liquidity,
    })
}

/// Execute a swap on the locked pool state.
///
/// The output is sent to `recipient` before `sender` is asked to pay for
/// the input; the call fails with InsufficientPayment if it doesn't.
#[allow(clippy::too_many_arguments)]
pub fn execute_swap(
    env: &Env,
    config: &PoolConfig,
    mut state: PoolState,
    sender: &Address,
    recipient: &Address,
    zero_for_one: bool,
    amount_specified: i128,
    sqrt_price_limit_x96: u128,
    data: &Bytes,
) -> Result<SwapResult, PoolError> {
    let tick_before = state.tick;
    let liquidity_before = state.liquidity;

    let result = compute_swap(
        env,
        config,
        &mut state,
        zero_for_one,
        amount_specified,
        sqrt_price_limit_x96,
        true,
    )?;

    notify_observer(env, config, &mut state, tick_before, liquidity_before);
    set_state(env, &state);

    let token_out = if zero_for_one {
        &config.token1
    } else {
        &config.token0
    };
    pay_out(env, token_out, recipient, result.amount_out)?;

    request_payment(
        env,
        config,
        sender,
        result.amount0,
        result.amount1,
        data,
        Callback::Swap,
    )?;

    emit_swap(
        env,
        sender,
        recipient,
        result.amount0,
        result.amount1,
        result.sqrt_price_x96,
        result.liquidity,
        result.tick,
    );

    unlock(env)?;
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::set_tick;
    use crate::tick::flip_tick;
    use clmm_types::Q96;
    use soroban_sdk::testutils::Address as _;
    use soroban_sdk::Env;

    fn with_contract<F, R>(env: &Env, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        let contract_id = env.register(crate::ClmmPool, ());
        env.as_contract(&contract_id, f)
    }

    fn config(env: &Env, fee: u32, tick_spacing: i32) -> PoolConfig {
        PoolConfig {
            token0: Address::generate(env),
            token1: Address::generate(env),
            fee,
            tick_spacing,
            max_liquidity_per_tick: clmm_types::max_liquidity_per_tick(tick_spacing),
            observer: None,
        }
    }

    /// Seed a [tick_lower, tick_upper) range holding `liquidity` around the current price
    fn seed_range(
        env: &Env,
        state: &mut PoolState,
        tick_lower: i32,
        tick_upper: i32,
        liquidity: u128,
        spacing: i32,
    ) {
        for (tick, net) in [(tick_lower, liquidity as i128), (tick_upper, -(liquidity as i128))] {
            let mut info = get_tick(env, tick);
            if !info.initialized {
                flip_tick(env, tick, spacing).unwrap();
            }
            info.liquidity_gross += liquidity;
            info.liquidity_net += net;
            info.initialized = true;
            set_tick(env, tick, &info);
        }
        if state.tick >= tick_lower && state.tick < tick_upper {
            state.liquidity += liquidity;
        }
    }

    // === resolve_price_limit tests ===

    #[test]
    fn test_price_limit_defaults() {
        assert_eq!(resolve_price_limit(Q96, true, 0), Ok(MIN_SQRT_PRICE + 1));
        assert_eq!(resolve_price_limit(Q96, false, 0), Ok(MAX_SQRT_PRICE - 1));
    }

    #[test]
    fn test_price_limit_must_be_beyond_current() {
        assert_eq!(resolve_price_limit(Q96, true, Q96), Err(PoolError::InvalidPriceLimit));
        assert_eq!(resolve_price_limit(Q96, false, Q96), Err(PoolError::InvalidPriceLimit));
        assert_eq!(resolve_price_limit(Q96, true, Q96 + 1), Err(PoolError::InvalidPriceLimit));
        assert_eq!(resolve_price_limit(Q96, false, Q96 - 1), Err(PoolError::InvalidPriceLimit));
        assert_eq!(resolve_price_limit(Q96, true, Q96 - 1), Ok(Q96 - 1));
    }

    #[test]
    fn test_price_limit_must_be_inside_bounds() {
        assert_eq!(
            resolve_price_limit(Q96, true, MIN_SQRT_PRICE),
            Err(PoolError::InvalidPriceLimit)
        );
        assert_eq!(
            resolve_price_limit(Q96, false, MAX_SQRT_PRICE),
            Err(PoolError::InvalidPriceLimit)
        );
    }

    // === compute_swap tests ===

    #[test]
    fn test_zero_amount_rejected() {
        let env = Env::default();
        let config = config(&env, 3000, 60);
        with_contract(&env, || {
            let mut state = PoolState::new(Q96, 0);
            assert_eq!(
                compute_swap(&env, &config, &mut state, true, 0, 0, true),
                Err(PoolError::ZeroAmount)
            );
        });
    }

    #[test]
    fn test_single_range_exact_input() {
        let env = Env::default();
        let config = config(&env, 3000, 60);
        with_contract(&env, || {
            let mut state = PoolState::new(Q96, 0);
            seed_range(&env, &mut state, -60, 60, 1_000_000, 60);

            let result = compute_swap(&env, &config, &mut state, true, 1000, 0, true).unwrap();
            assert_eq!(result.amount0, 1000);
            assert_eq!(result.amount1, -996);
            assert_eq!(result.amount_in, 1000);
            assert_eq!(result.amount_out, 996);
            assert_eq!(state.sqrt_price_x96, 79149250711305166342700278159);
            assert_eq!(state.tick, -20);
            assert_eq!(state.liquidity, 1_000_000);
            // 3 units of fee over 1e6 liquidity, Q64.64
            assert_eq!(state.fee_growth_global_0_x64, 55340232221128);
            assert_eq!(state.fee_growth_global_1_x64, 0);
        });
    }

    #[test]
    fn test_no_liquidity_runs_to_limit() {
        let env = Env::default();
        let config = config(&env, 3000, 60);
        with_contract(&env, || {
            let mut state = PoolState::new(Q96, 0);
            let limit = sqrt_price_at_tick(&env, -6000).unwrap();

            let result = compute_swap(&env, &config, &mut state, true, 1000, limit, true).unwrap();
            assert_eq!(result.amount0, 0);
            assert_eq!(result.amount1, 0);
            assert_eq!(state.sqrt_price_x96, limit);
            assert_eq!(state.tick, -6000);
            assert_eq!(state.fee_growth_global_0_x64, 0);
        });
    }

    #[test]
    fn test_crossing_out_of_range_drops_liquidity() {
        let env = Env::default();
        let config = config(&env, 3000, 60);
        with_contract(&env, || {
            let mut state = PoolState::new(Q96, 0);
            seed_range(&env, &mut state, -60, 60, 1_000_000, 60);
            let limit = sqrt_price_at_tick(&env, -120).unwrap();

            let result = compute_swap(&env, &config, &mut state, true, 1_000_000, limit, true).unwrap();
            assert_eq!(state.sqrt_price_x96, limit);
            assert_eq!(state.tick, -120);
            assert_eq!(state.liquidity, 0);
            // Input stopped at the range edge; the rest stays unspent
            assert!(result.amount0 > 0 && result.amount0 < 1_000_000);

            // The crossed tick has its outside growth flipped to the global value
            let lower = get_tick(&env, -60);
            assert_eq!(lower.fee_growth_outside_0_x64, state.fee_growth_global_0_x64);
        });
    }

    #[test]
    fn test_dry_run_leaves_ticks_untouched() {
        let env = Env::default();
        let config = config(&env, 3000, 60);
        with_contract(&env, || {
            let mut state = PoolState::new(Q96, 0);
            seed_range(&env, &mut state, -60, 60, 1_000_000, 60);
            seed_range(&env, &mut state, -240, 240, 2_000_000, 60);
            let before = get_tick(&env, -60);

            let mut quoted = state.clone();
            let quote = compute_swap(&env, &config, &mut quoted, true, 50_000, 0, false).unwrap();
            assert_eq!(get_tick(&env, -60), before);

            let mut executed = state.clone();
            let result = compute_swap(&env, &config, &mut executed, true, 50_000, 0, true).unwrap();
            assert_eq!(quote, result);
            assert_eq!(quoted, executed);
            assert_ne!(get_tick(&env, -60), before);
        });
    }

    #[test]
    fn test_exact_output_never_exceeds_request() {
        let env = Env::default();
        let config = config(&env, 3000, 60);
        with_contract(&env, || {
            let mut state = PoolState::new(Q96, 0);
            seed_range(&env, &mut state, -600, 600, 10_000_000, 60);

            let result = compute_swap(&env, &config, &mut state, false, -5_000, 0, true).unwrap();
            assert_eq!(result.amount0, -5_000);
            assert_eq!(result.amount_out, 5_000);
            assert!(result.amount1 > 5_000);
            assert!(state.tick >= 0);
        });
    }

    #[test]
    fn test_walks_empty_words_to_distant_liquidity() {
        let env = Env::default();
        let config = config(&env, 500, 10);
        with_contract(&env, || {
            let mut state = PoolState::new(Q96, 0);
            // Far enough away that the search spans several bitmap words
            seed_range(&env, &mut state, 5_000, 6_000, 1_000_000_000, 10);

            let result = compute_swap(&env, &config, &mut state, false, 10_000_000, 0, true).unwrap();
            assert_eq!(result.amount1, 10_000_000);
            assert!(result.amount0 < 0);
            assert!(state.tick >= 5_000 && state.tick < 6_000);
            assert_eq!(state.liquidity, 1_000_000_000);
        });
    }
}
