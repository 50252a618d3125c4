//! Entity failure state machine: `alive -> destroyed` (terminal).
//!
//! Overheat is a Bernoulli trial per tick over tolerance, not a hard
//! threshold. Phases run in a fixed order — shields, sinks, probes by
//! overheat, probes by line of sight — and each phase walks positions in
//! ascending order so RNG consumption is deterministic for a given seed.

use rand::Rng;

use crate::hex::Hex;
use crate::los::line_of_sight;
use crate::types::{EntityKind, SimState, P_FAIL};

pub(crate) fn run_overheat_checks(state: &mut SimState, rng: &mut impl Rng) {
    overheat_pass(state, rng, |kind| matches!(kind, EntityKind::Shield { .. }));
    overheat_pass(state, rng, |kind| matches!(kind, EntityKind::Sink { .. }));
    overheat_pass(state, rng, |kind| matches!(kind, EntityKind::Probe { .. }));
}

fn overheat_pass(state: &mut SimState, rng: &mut impl Rng, selects: fn(&EntityKind) -> bool) {
    for pos in state.sorted_entity_positions() {
        let Some(entity) = state.entities.get(&pos) else {
            continue;
        };
        if entity.destroyed || !selects(&entity.kind) {
            continue;
        }
        let Some(&energy) = state.field.get(&pos) else {
            continue;
        };
        if energy > entity.heat_tolerance() && rng.gen_bool(P_FAIL) {
            if let Some(entity) = state.entities.get_mut(&pos) {
                entity.destroyed = true;
            }
        }
    }
}

/// Destroy every live probe that has an unobstructed sight line to any
/// active, live source. Runs after the overheat phases, so shields destroyed
/// earlier this tick no longer block. Multiple exposures do not compound.
pub(crate) fn run_los_checks(state: &mut SimState) {
    let obstacles = shield_obstacles(state);
    let mut sources: Vec<Hex> = state
        .entities
        .values()
        .filter(|entity| {
            matches!(entity.kind, EntityKind::Source { active, .. } if active)
                && entity.is_live()
                && state.in_domain(entity.pos)
        })
        .map(|entity| entity.pos)
        .collect();
    sources.sort_unstable();
    if sources.is_empty() {
        return;
    }

    let mut hit: Vec<Hex> = Vec::new();
    for pos in state.sorted_entity_positions() {
        let Some(entity) = state.entities.get(&pos) else {
            continue;
        };
        if !matches!(entity.kind, EntityKind::Probe { .. })
            || !entity.is_live()
            || !state.in_domain(pos)
        {
            continue;
        }
        let exposed = sources
            .iter()
            .any(|&source| line_of_sight(pos, source, &obstacles).is_some());
        if exposed {
            hit.push(pos);
        }
    }
    for pos in hit {
        if let Some(entity) = state.entities.get_mut(&pos) {
            entity.destroyed = true;
        }
    }
}

/// Current blocking set: live shields in enabled groups, in the domain.
fn shield_obstacles(state: &SimState) -> Vec<Hex> {
    let mut obstacles: Vec<Hex> = state
        .entities
        .values()
        .filter(|entity| {
            matches!(entity.kind, EntityKind::Shield { group, .. }
                if !state.disabled_shield_groups.contains(&group))
                && entity.is_live()
                && state.in_domain(entity.pos)
        })
        .map(|entity| entity.pos)
        .collect();
    obstacles.sort_unstable();
    obstacles
}
