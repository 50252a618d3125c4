//! Symmetric, conservative diffusion over heterogeneous conductivity.
//!
//! Two-phase: accumulate a delta per cell over every undirected edge, then
//! let the orchestrator apply the deltas. Each edge contributes to exactly
//! two accumulators with opposite sign, so total field energy is unchanged
//! regardless of traversal order. Cells iterate in sorted order so float
//! summation is reproducible across runs.

use ahash::AHashMap;

use crate::hex::{Hex, HALF_DIRECTIONS};
use crate::types::{EnergyField, EntityKind, SimState};

/// Per-cell conductivity for this tick.
///
/// Every in-domain cell starts at the base conductivity. Each live shield
/// whose group is enabled min-clamps its cell; a disabled shield group
/// conducts as if the shields were absent. Sinks with a declared override
/// min-clamp their cell as well (the hardware stays in the cell even when
/// the sink is destroyed).
pub(crate) fn conductivity_map(state: &SimState) -> AHashMap<Hex, f64> {
    let mut map: AHashMap<Hex, f64> = state
        .field
        .keys()
        .map(|&cell| (cell, state.config.base_conductivity))
        .collect();
    for entity in state.entities.values() {
        let clamp = match entity.kind {
            EntityKind::Shield {
                conductivity,
                group,
                ..
            } if entity.is_live() && !state.disabled_shield_groups.contains(&group) => conductivity,
            EntityKind::Sink {
                conductivity: Some(conductivity),
                ..
            } if !entity.disabled => conductivity,
            _ => continue,
        };
        if let Some(cell) = map.get_mut(&entity.pos) {
            *cell = cell.min(clamp);
        }
    }
    map
}

/// Flux accumulation pass.
///
/// For each cell, exactly the three `HALF_DIRECTIONS` neighbors are examined
/// so every undirected edge is visited once. Edge conductivity is the min of
/// the two endpoint conductivities; flux is `k * alpha * (E(a) - E(b))`.
pub(crate) fn diffusion_deltas(
    field: &EnergyField,
    conductivity: &AHashMap<Hex, f64>,
    alpha: f64,
) -> AHashMap<Hex, f64> {
    let mut deltas: AHashMap<Hex, f64> = field.keys().map(|&cell| (cell, 0.0)).collect();
    let mut cells: Vec<Hex> = field.keys().copied().collect();
    cells.sort_unstable();
    for a in cells {
        let energy_a = field.get(&a).copied().unwrap_or(0.0);
        let cond_a = conductivity.get(&a).copied().unwrap_or(0.0);
        for direction in HALF_DIRECTIONS {
            let b = a + direction;
            let Some(&energy_b) = field.get(&b) else {
                continue;
            };
            let cond_b = conductivity.get(&b).copied().unwrap_or(0.0);
            let flux = cond_a.min(cond_b) * alpha * (energy_a - energy_b);
            *deltas.entry(a).or_insert(0.0) -= flux;
            *deltas.entry(b).or_insert(0.0) += flux;
        }
    }
    deltas
}
