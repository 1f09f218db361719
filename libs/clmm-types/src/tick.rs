use soroban_sdk::contracttype;

/// Boundary data stored for each initialized tick
#[contracttype]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct TickInfo {
    /// Total liquidity referencing this tick
    pub liquidity_gross: u128,
    /// Net liquidity change when the tick is crossed moving up
    pub liquidity_net: i128,
    /// Token0 fee growth per unit liquidity on the other side of this tick (Q64.64)
    pub fee_growth_outside_0_x64: u128,
    /// Token1 fee growth per unit liquidity on the other side of this tick (Q64.64)
    pub fee_growth_outside_1_x64: u128,
    /// Seconds spent on the other side of this tick
    pub seconds_outside: u64,
    pub initialized: bool,
}
