use clmm_types::{PoolConfig, PoolError, PoolState, PositionInfo, PositionKey, TickInfo};
use soroban_sdk::{contracttype, Env};

// ============================================================================
// Storage layout
// ============================================================================
// - Config and State live in Instance storage: read on every call.
// - Ticks, bitmap words and positions are separate Persistent entries so a
//   swap only pays for the boundaries it actually touches.
// - Empty entries are removed rather than stored as zero.
// ============================================================================

/// Storage keys for the pool contract
#[contracttype]
#[derive(Clone)]
pub enum DataKey {
    /// Pool configuration (Instance storage)
    Config,
    /// Current pool state (Instance storage)
    State,
    /// Tick data: tick_index -> TickInfo (Persistent storage)
    Tick(i32),
    /// Tick bitmap: word_position -> u128 bitmap (Persistent storage)
    TickBitmap(i32),
    /// Position data: PositionKey -> PositionInfo (Persistent storage)
    Position(PositionKey),
}

// TTL constants
const INSTANCE_TTL_THRESHOLD: u32 = 17280; // ~1 day
const INSTANCE_TTL_EXTEND: u32 = 518400; // ~30 days
const PERSISTENT_TTL_THRESHOLD: u32 = 17280;
const PERSISTENT_TTL_EXTEND: u32 = 518400;

/// Extend instance storage TTL
pub fn extend_instance_ttl(env: &Env) {
    env.storage()
        .instance()
        .extend_ttl(INSTANCE_TTL_THRESHOLD, INSTANCE_TTL_EXTEND);
}

/// Extend persistent storage TTL for a key
pub fn extend_persistent_ttl(env: &Env, key: &DataKey) {
    env.storage()
        .persistent()
        .extend_ttl(key, PERSISTENT_TTL_THRESHOLD, PERSISTENT_TTL_EXTEND);
}

// === Config ===

pub fn has_config(env: &Env) -> bool {
    env.storage().instance().has(&DataKey::Config)
}

pub fn get_config(env: &Env) -> Result<PoolConfig, PoolError> {
    extend_instance_ttl(env);
    env.storage()
        .instance()
        .get(&DataKey::Config)
        .ok_or(PoolError::NotInitialized)
}

pub fn set_config(env: &Env, config: &PoolConfig) {
    env.storage().instance().set(&DataKey::Config, config);
    extend_instance_ttl(env);
}

// === State ===

pub fn get_state(env: &Env) -> Result<PoolState, PoolError> {
    extend_instance_ttl(env);
    env.storage()
        .instance()
        .get(&DataKey::State)
        .ok_or(PoolError::NotInitialized)
}

pub fn set_state(env: &Env, state: &PoolState) {
    env.storage().instance().set(&DataKey::State, state);
    extend_instance_ttl(env);
}

/// Take the pool lock for a mutating call and return the state it guards
pub fn lock(env: &Env) -> Result<PoolState, PoolError> {
    let mut state = get_state(env)?;
    if !state.unlocked {
        return Err(PoolError::ReentrancyLocked);
    }
    state.unlocked = false;
    set_state(env, &state);
    Ok(state)
}

/// Release the pool lock taken by `lock`
pub fn unlock(env: &Env) -> Result<(), PoolError> {
    let mut state = get_state(env)?;
    state.unlocked = true;
    set_state(env, &state);
    Ok(())
}

// === Tick ===

pub fn get_tick(env: &Env, tick: i32) -> TickInfo {
    let key = DataKey::Tick(tick);
    env.storage()
        .persistent()
        .get(&key)
        .unwrap_or_default()
}

pub fn set_tick(env: &Env, tick: i32, info: &TickInfo) {
    let key = DataKey::Tick(tick);
    env.storage().persistent().set(&key, info);
    extend_persistent_ttl(env, &key);
}

pub fn remove_tick(env: &Env, tick: i32) {
    env.storage().persistent().remove(&DataKey::Tick(tick));
}

#[cfg(test)]
pub fn has_tick(env: &Env, tick: i32) -> bool {
    env.storage().persistent().has(&DataKey::Tick(tick))
}

// === Tick Bitmap ===

pub fn get_tick_bitmap_word(env: &Env, word_pos: i32) -> u128 {
    let key = DataKey::TickBitmap(word_pos);
    env.storage().persistent().get(&key).unwrap_or(0u128)
}

pub fn set_tick_bitmap_word(env: &Env, word_pos: i32, bitmap: u128) {
    let key = DataKey::TickBitmap(word_pos);
    if bitmap == 0 {
        env.storage().persistent().remove(&key);
    } else {
        env.storage().persistent().set(&key, &bitmap);
        extend_persistent_ttl(env, &key);
    }
}

// === Position ===

pub fn get_position(env: &Env, key: &PositionKey) -> PositionInfo {
    let data_key = DataKey::Position(key.clone());
    env.storage()
        .persistent()
        .get(&data_key)
        .unwrap_or_default()
}

#[cfg(test)]
pub fn has_position(env: &Env, key: &PositionKey) -> bool {
    env.storage()
        .persistent()
        .has(&DataKey::Position(key.clone()))
}

pub fn set_position(env: &Env, key: &PositionKey, info: &PositionInfo) {
    let data_key = DataKey::Position(key.clone());
    if info.is_empty() {
        env.storage().persistent().remove(&data_key);
    } else {
        env.storage().persistent().set(&data_key, info);
        extend_persistent_ttl(env, &data_key);
    }
}
