use soroban_sdk::contracterror;

/// Errors surfaced by the pool and the math it is built on
#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum PoolError {
    // Lifecycle (1-9)
    /// `initialize` was already called
    AlreadyInitialized = 1,
    /// The pool has no price yet
    NotInitialized = 2,
    /// A mutating call is already in flight
    ReentrancyLocked = 3,

    // Input validation (10-29)
    ZeroAmount = 10,
    /// tick_lower >= tick_upper, or a bound outside [MIN_TICK, MAX_TICK]
    InvalidRange = 11,
    /// Price limit not strictly beyond the current price, or outside the price bounds
    InvalidPriceLimit = 12,
    TickOutOfRange = 13,
    PriceOutOfRange = 14,
    /// Tick is not a multiple of the pool's spacing
    TickMisaligned = 15,
    /// Token ordering, fee or spacing rejected at initialization
    InvalidConfig = 16,
    /// Fee poll on a position holding no liquidity
    NoPosition = 17,

    // Numerical (30-39)
    Overflow = 30,
    LiquidityOverflow = 31,
    LiquidityUnderflow = 32,

    // Settlement (40-49)
    /// The payer's callback did not deliver what the pool is owed
    InsufficientPayment = 40,
}
