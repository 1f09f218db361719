use soroban_sdk::{contracttype, Address};

/// Current pool state - stored in Instance storage for frequent access
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PoolState {
    /// Current sqrt(price) as Q64.96
    pub sqrt_price_x96: u128,
    /// Current tick index, floor(log_1.0001(price))
    pub tick: i32,
    /// Total liquidity currently in range
    pub liquidity: u128,
    /// Fee growth global for token0 (Q64.64, wrapping)
    pub fee_growth_global_0_x64: u128,
    /// Fee growth global for token1 (Q64.64, wrapping)
    pub fee_growth_global_1_x64: u128,
    /// Observer cursor, opaque to the pool
    pub observation_index: u32,
    pub observation_cardinality: u32,
    /// False while a mutating call holds the pool
    pub unlocked: bool,
}

impl PoolState {
    pub fn new(sqrt_price_x96: u128, tick: i32) -> Self {
        Self {
            sqrt_price_x96,
            tick,
            liquidity: 0,
            fee_growth_global_0_x64: 0,
            fee_growth_global_1_x64: 0,
            observation_index: 0,
            observation_cardinality: 0,
            unlocked: true,
        }
    }
}

/// Pool configuration - immutable after initialization
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PoolConfig {
    /// Token0 address (lower address)
    pub token0: Address,
    /// Token1 address (higher address)
    pub token1: Address,
    /// Fee in pips
    pub fee: u32,
    /// Tick spacing for this pool
    pub tick_spacing: i32,
    /// Maximum liquidity per tick, derived from the spacing
    pub max_liquidity_per_tick: u128,
    /// Contract notified of every mutating operation
    pub observer: Option<Address>,
}

/// Outcome of a swap or a quote.
/// amount0/amount1 are pool deltas: positive is owed to the pool, negative is paid out.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SwapResult {
    pub amount0: i128,
    pub amount1: i128,
    /// Input paid by the trader, fee included
    pub amount_in: u128,
    pub amount_out: u128,
    pub sqrt_price_x96: u128,
    pub tick: i32,
    pub liquidity: u128,
}
