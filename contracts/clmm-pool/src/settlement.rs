use clmm_types::{ObserverClient, PoolCallbackClient, PoolConfig, PoolError, PoolState};
use soroban_sdk::{log, token, Address, Bytes, Env};

/// Which callback the payer is asked to run
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Callback {
    Swap,
    ModifyPosition,
}

/// Transfer `amount` of `token` from the pool to `to`
pub fn pay_out(env: &Env, token: &Address, to: &Address, amount: u128) -> Result<(), PoolError> {
    if amount == 0 {
        return Ok(());
    }
    let amount = i128::try_from(amount).map_err(|_| PoolError::Overflow)?;
    token::Client::new(env, token).transfer(&env.current_contract_address(), to, &amount);
    Ok(())
}

/// Ask `payer` to deliver the positive amounts, then verify the pool's balances grew by them.
///
/// Nothing is pulled from the payer; its callback must transfer the tokens itself.
pub fn request_payment(
    env: &Env,
    config: &PoolConfig,
    payer: &Address,
    amount0: i128,
    amount1: i128,
    data: &Bytes,
    callback: Callback,
) -> Result<(), PoolError> {
    let pool = env.current_contract_address();
    let token0 = token::Client::new(env, &config.token0);
    let token1 = token::Client::new(env, &config.token1);

    let balance0_before = if amount0 > 0 { token0.balance(&pool) } else { 0 };
    let balance1_before = if amount1 > 0 { token1.balance(&pool) } else { 0 };

    let client = PoolCallbackClient::new(env, payer);
    match callback {
        Callback::Swap => client.swap_callback(&amount0, &amount1, data),
        Callback::ModifyPosition => client.modify_position_callback(&amount0, &amount1, data),
    }

    if amount0 > 0 {
        let required = balance0_before
            .checked_add(amount0)
            .ok_or(PoolError::Overflow)?;
        if token0.balance(&pool) < required {
            log!(env, "token0 payment short", amount0);
            return Err(PoolError::InsufficientPayment);
        }
    }
    if amount1 > 0 {
        let required = balance1_before
            .checked_add(amount1)
            .ok_or(PoolError::Overflow)?;
        if token1.balance(&pool) < required {
            log!(env, "token1 payment short", amount1);
            return Err(PoolError::InsufficientPayment);
        }
    }

    Ok(())
}

/// Report the pre-operation tick and liquidity to the observer, if any, and
/// store the cursor it hands back
pub fn notify_observer(
    env: &Env,
    config: &PoolConfig,
    state: &mut PoolState,
    tick: i32,
    liquidity: u128,
) {
    if let Some(observer) = &config.observer {
        let (index, cardinality) = ObserverClient::new(env, observer).record(
            &state.observation_index,
            &state.observation_cardinality,
            &env.ledger().timestamp(),
            &tick,
            &liquidity,
        );
        state.observation_index = index;
        state.observation_cardinality = cardinality;
    }
}
