//! Tick orchestrator.
//!
//! One tick is a pure function from the prior state to the next; the prior
//! state is never mutated. All randomness comes from the passed-in Rng.

use std::collections::BTreeMap;

use ahash::AHashMap;
use rand::Rng;

use crate::hex::Hex;
use crate::types::{EntityKind, GroupId, SimState, NOISE_FLOOR};
use crate::{diffusion, extraction, lifecycle, storage};

/// Advance the simulation by one tick.
///
/// Order of operations:
/// 1. Overheat destruction checks (shields, sinks, probes).
/// 2. Probe line-of-sight destruction against the surviving shield set.
/// 3. Capacitor full-stop check and drain; effective probe throttles.
/// 4. Snap sink cells to their reservoir temperature.
/// 5. Source injection (sink-cell input routed into reservoirs).
/// 6. Diffusion deltas; sink-cell deltas routed into reservoirs.
/// 7. Radiator loss; re-snap sink cells.
/// 8. Probe extraction against capacitor headroom.
/// 9. Numeric noise cleanup and diagnostics.
pub fn tick(prev: &SimState, rng: &mut impl Rng) -> SimState {
    let mut state = prev.clone();

    lifecycle::run_overheat_checks(&mut state, rng);
    lifecycle::run_los_checks(&mut state);

    let effective_throttles = storage::drain_and_throttle(&mut state);

    storage::snap_sink_cells(&mut state);
    let sink_cells = storage::live_sink_cells(&state);
    inject_sources(&mut state, &sink_cells);

    let conductivity = diffusion::conductivity_map(&state);
    let deltas =
        diffusion::diffusion_deltas(&state.field, &conductivity, state.config.diffusion_alpha);
    apply_deltas(&mut state, &deltas, &sink_cells);

    storage::apply_radiators(&mut state);
    storage::snap_sink_cells(&mut state);

    let collected = extraction::run_extraction(&mut state, &effective_throttles);

    clean_noise(&mut state);
    finish_diagnostics(&mut state, prev, collected);

    state.tick += 1;
    state
}

/// Inject power for every active, live, in-domain source, scaled by its
/// group throttle. Input on a live sink cell goes to the reservoir instead.
fn inject_sources(state: &mut SimState, sink_cells: &AHashMap<Hex, GroupId>) {
    let mut inputs: Vec<(Hex, f64)> = state
        .entities
        .values()
        .filter_map(|entity| {
            let EntityKind::Source {
                power,
                active,
                group,
                ..
            } = entity.kind
            else {
                return None;
            };
            if !active || !entity.is_live() || !state.in_domain(entity.pos) {
                return None;
            }
            Some((entity.pos, power * state.source_throttle(group)))
        })
        .collect();
    // Sorted application keeps reservoir float accumulation reproducible.
    inputs.sort_unstable_by_key(|&(pos, _)| pos);
    for (pos, amount) in inputs {
        route_energy(state, sink_cells, pos, amount);
    }
}

/// Apply diffusion deltas, redirecting sink-cell deltas into reservoirs.
fn apply_deltas(
    state: &mut SimState,
    deltas: &AHashMap<Hex, f64>,
    sink_cells: &AHashMap<Hex, GroupId>,
) {
    let mut cells: Vec<Hex> = deltas.keys().copied().collect();
    cells.sort_unstable();
    for pos in cells {
        let delta = deltas.get(&pos).copied().unwrap_or(0.0);
        route_energy(state, sink_cells, pos, delta);
    }
}

fn route_energy(
    state: &mut SimState,
    sink_cells: &AHashMap<Hex, GroupId>,
    pos: Hex,
    amount: f64,
) {
    match sink_cells.get(&pos) {
        Some(group) => {
            if let Some(reservoir) = state.reservoirs.get_mut(group) {
                reservoir.heat += amount;
            }
        }
        None => {
            if let Some(cell) = state.field.get_mut(&pos) {
                *cell += amount;
            }
        }
    }
}

/// Snap sub-noise magnitudes to exactly 0 so negative zero and float dust
/// cannot accumulate into falsely non-equilibrium states.
fn clean_noise(state: &mut SimState) {
    for value in state.field.values_mut() {
        if value.abs() < NOISE_FLOOR {
            *value = 0.0;
        }
    }
}

fn finish_diagnostics(state: &mut SimState, prev: &SimState, collected: BTreeMap<GroupId, f64>) {
    let mut field_delta = AHashMap::with_capacity(state.field.len());
    for (&pos, &value) in &state.field {
        let before = prev.field.get(&pos).copied().unwrap_or(0.0);
        field_delta.insert(pos, value - before);
    }

    let mut capacitor_delta = BTreeMap::new();
    for (&group, capacitor) in &state.capacitors {
        let before = prev.capacitors.get(&group).map_or(0.0, |c| c.stored);
        capacitor_delta.insert(group, capacitor.stored - before);
    }

    for (&group, &work) in &collected {
        *state
            .diagnostics
            .total_collected
            .entry(group)
            .or_insert(0.0) += work;
    }

    state.diagnostics.perimeter_energy = Hex::ORIGIN
        .ring(state.config.board_radius)
        .iter()
        .map(|cell| state.field.get(cell).copied().unwrap_or(0.0))
        .sum();
    state.diagnostics.collected = collected;
    state.diagnostics.field_delta = field_delta;
    state.diagnostics.capacitor_delta = capacitor_delta;
}
