//! Probe heat engine.
//!
//! Per probe group, energy moves from above-mean member cells to below-mean
//! member cells; a fixed fraction of the moved quantity becomes collected
//! work in the group's capacitor, the rest lands on the cold probes as waste
//! heat. Collected work is the only energy that permanently leaves the
//! thermal field.

use std::collections::BTreeMap;

use crate::hex::Hex;
use crate::types::{
    EntityKind, GroupId, SimState, EFFICIENCY, EQUILIBRIUM_EPSILON, TRANSFER_RATE,
};

/// Run extraction for every probe group; returns work collected per group.
///
/// `effective_throttles` comes from the capacitor phase (full banks already
/// forced to 0 there); groups without a capacitor fall back to the
/// caller-supplied throttle and skip the headroom clamp.
pub(crate) fn run_extraction(
    state: &mut SimState,
    effective_throttles: &BTreeMap<GroupId, f64>,
) -> BTreeMap<GroupId, f64> {
    let mut collected = BTreeMap::new();
    for (group, cells) in probe_members(state) {
        let throttle = effective_throttles
            .get(&group)
            .copied()
            .unwrap_or_else(|| state.probe_throttle(group));
        if throttle <= 0.0 || cells.len() < 2 {
            continue;
        }
        if let Some(work) = extract_group(state, group, &cells, throttle) {
            collected.insert(group, work);
        }
    }
    collected
}

/// Live in-domain probe cells per group, sorted within each group.
fn probe_members(state: &SimState) -> BTreeMap<GroupId, Vec<Hex>> {
    let mut members: BTreeMap<GroupId, Vec<Hex>> = BTreeMap::new();
    for entity in state.entities.values() {
        if let EntityKind::Probe { group } = entity.kind {
            if entity.is_live() && state.in_domain(entity.pos) {
                members.entry(group).or_default().push(entity.pos);
            }
        }
    }
    for cells in members.values_mut() {
        cells.sort_unstable();
    }
    members
}

fn extract_group(
    state: &mut SimState,
    group: GroupId,
    cells: &[Hex],
    throttle: f64,
) -> Option<f64> {
    let values: Vec<f64> = cells
        .iter()
        .map(|cell| state.field.get(cell).copied().unwrap_or(0.0))
        .collect();
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    let total_excess: f64 = values.iter().map(|v| (v - mean).max(0.0)).sum();
    let total_deficit: f64 = values.iter().map(|v| (mean - v).max(0.0)).sum();
    if total_excess < EQUILIBRIUM_EPSILON {
        return None;
    }

    let mut q_move = total_excess * throttle * TRANSFER_RATE;
    if let Some(capacitor) = state.capacitors.get(&group) {
        let headroom = capacitor.headroom();
        if headroom <= 0.0 {
            return None;
        }
        q_move = q_move.min(headroom / EFFICIENCY);
    }
    let work = q_move * EFFICIENCY;
    let dump = q_move - work;

    for (cell, value) in cells.iter().zip(&values) {
        let adjustment = if *value > mean {
            -q_move * (value - mean) / total_excess
        } else if *value < mean {
            dump * (mean - value) / total_deficit
        } else {
            continue;
        };
        if let Some(entry) = state.field.get_mut(cell) {
            *entry += adjustment;
        }
    }

    if let Some(capacitor) = state.capacitors.get_mut(&group) {
        capacitor.stored = (capacitor.stored + work).min(capacitor.capacity);
    }
    Some(work)
}
