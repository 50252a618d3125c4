//! Reservoirs and capacitors.
//!
//! A live sink cell is a transparent window onto its reservoir: its field
//! value is forced to the reservoir surface temperature at the start of the
//! tick, and anything that would have landed on the cell (source input,
//! diffusion delta) is routed into the reservoir instead. Capacitors drain
//! before extraction; a bank already full at tick start stops its probe
//! group for the whole tick.

use std::collections::BTreeMap;

use ahash::AHashMap;

use crate::hex::Hex;
use crate::types::{EntityKind, GroupId, SimState};

/// Cells owned by live sinks whose reservoir exists, with the fed group.
/// Source injection and delta application consult this to redirect energy.
pub(crate) fn live_sink_cells(state: &SimState) -> AHashMap<Hex, GroupId> {
    let mut cells = AHashMap::new();
    for entity in state.entities.values() {
        let EntityKind::Sink { group, .. } = entity.kind else {
            continue;
        };
        if entity.is_live()
            && state.in_domain(entity.pos)
            && state.reservoirs.contains_key(&group)
        {
            cells.insert(entity.pos, group);
        }
    }
    cells
}

/// Overwrite every live sink cell with its reservoir's surface temperature.
/// Destroyed and disabled sinks are skipped: their cell keeps whatever value
/// it last had and rejoins ordinary diffusion.
pub(crate) fn snap_sink_cells(state: &mut SimState) {
    let snaps: Vec<(Hex, f64)> = live_sink_cells(state)
        .iter()
        .filter_map(|(&pos, group)| {
            state
                .reservoirs
                .get(group)
                .map(|reservoir| (pos, reservoir.surface_temperature()))
        })
        .collect();
    for (pos, temperature) in snaps {
        if let Some(cell) = state.field.get_mut(&pos) {
            *cell = temperature;
        }
    }
}

/// Deployed radiators shed up to `strength` heat per tick, never driving a
/// reservoir's heat negative.
pub(crate) fn apply_radiators(state: &mut SimState) {
    for reservoir in state.reservoirs.values_mut() {
        if reservoir.radiator.deployed {
            let loss = reservoir.radiator.strength.min(reservoir.heat).max(0.0);
            reservoir.heat -= loss;
        }
    }
}

/// Capacitor phase: full-stop check, then drain.
///
/// Returns the effective probe throttle per capacitor group for this tick.
/// A bank at or above capacity *before* the drain forces its group to 0,
/// independent of the caller-supplied throttle.
pub(crate) fn drain_and_throttle(state: &mut SimState) -> BTreeMap<GroupId, f64> {
    let mut effective = BTreeMap::new();
    for (&group, capacitor) in &state.capacitors {
        let throttle = if capacitor.is_full() {
            0.0
        } else {
            state.probe_throttle(group)
        };
        effective.insert(group, throttle);
    }
    for capacitor in state.capacitors.values_mut() {
        capacitor.stored = (capacitor.stored - capacitor.drain_rate).clamp(0.0, capacitor.capacity);
    }
    effective
}
