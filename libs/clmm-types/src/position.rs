use soroban_sdk::{contracttype, Address};

/// Identifies a position: one owner, one price range
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PositionKey {
    pub owner: Address,
    pub tick_lower: i32,
    pub tick_upper: i32,
}

/// Position info stored in the pool contract
#[contracttype]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct PositionInfo {
    /// Liquidity in this position
    pub liquidity: u128,
    /// Fee growth inside the range at last settlement (token0)
    pub fee_growth_inside_0_last_x64: u128,
    /// Fee growth inside the range at last settlement (token1)
    pub fee_growth_inside_1_last_x64: u128,
    /// Settled, uncollected token0
    pub tokens_owed_0: u128,
    /// Settled, uncollected token1
    pub tokens_owed_1: u128,
}

impl PositionInfo {
    pub fn is_empty(&self) -> bool {
        self.liquidity == 0 && self.tokens_owed_0 == 0 && self.tokens_owed_1 == 0
    }
}
