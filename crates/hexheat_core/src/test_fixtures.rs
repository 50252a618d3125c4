//! Shared test fixtures for hexheat_core and downstream crates.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::hex::Hex;
use crate::types::{Entity, SimConfig, SimState};

/// Deterministic RNG seeded with 42.
pub fn make_rng() -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(42)
}

/// Zeroed board with standard physics (alpha 0.1, base conductivity 1.0).
pub fn small_state(board_radius: i32) -> SimState {
    SimState::new(SimConfig {
        diffusion_alpha: 0.1,
        base_conductivity: 1.0,
        board_radius,
    })
}

/// Place an entity and return its position.
pub fn place(state: &mut SimState, entity: Entity) -> Hex {
    let pos = entity.pos;
    state.entities.insert(pos, entity);
    pos
}

/// Set a field cell, asserting it is in the domain.
pub fn set_energy(state: &mut SimState, pos: Hex, value: f64) {
    let cell = state
        .field
        .get_mut(&pos)
        .unwrap_or_else(|| panic!("cell {pos} is outside the board"));
    *cell = value;
}

/// Total energy in the field.
pub fn field_total(state: &SimState) -> f64 {
    state.field.values().sum()
}
