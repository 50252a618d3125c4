//! Board construction and snapshot persistence shared by the outer layers
//! (editor, GUI). The tick engine itself lives in `hexheat_core` and stays
//! IO-free; everything that touches a disk or a clock lives here.

use std::collections::HashSet;

use hexheat_core::{
    Entity, EntityKind, GroupId, Hex, SimConfig, SimState, CAPACITOR_GROUPS, RESERVOIR_GROUPS,
};

mod snapshot;

pub use snapshot::{load_snapshot, save_snapshot, Snapshot, SNAPSHOT_SCHEMA_VERSION};

/// Build an empty board for the given physics parameters.
pub fn build_board(config: SimConfig) -> SimState {
    SimState::new(config)
}

/// Build the standard starter scenario: one powered source, a sink feeding
/// reservoir 1, a two-shield screen in front of a probe pair on bank 1.
pub fn build_initial_board(config: SimConfig) -> SimState {
    let mut state = SimState::new(config);
    let placements = [
        Entity::source(Hex::new(4, -4, 0), 6.0, 1),
        Entity::sink(Hex::new(-4, 4, 0), 0.5, 1),
        Entity::shield(Hex::new(2, -2, 0), 0.3, 1),
        Entity::shield(Hex::new(2, -1, -1), 0.3, 1),
        Entity::probe(Hex::new(0, 1, -1), 1),
        Entity::probe(Hex::new(0, -1, 1), 1),
    ];
    for entity in placements {
        state.entities.insert(entity.pos, entity);
    }
    validate_state(&state);
    state
}

/// Validates a hand-authored board, panicking on any authoring error.
///
/// Catches mistakes like: an entity keyed under the wrong cell, a sink
/// feeding a reservoir that does not exist, or a shield with a conductivity
/// outside (0, 1]. Runtime states produced by the tick are valid by
/// construction and never need this.
pub fn validate_state(state: &SimState) {
    let capacitor_groups: HashSet<GroupId> = state.capacitors.keys().copied().collect();
    let reservoir_groups: HashSet<GroupId> = state.reservoirs.keys().copied().collect();

    for (pos, entity) in &state.entities {
        assert!(
            *pos == entity.pos,
            "entity at key {pos} carries position {}",
            entity.pos,
        );
        match entity.kind {
            EntityKind::Sink { group, .. } => {
                assert!(
                    reservoir_groups.contains(&group),
                    "sink at {pos} feeds unknown reservoir group {group}",
                );
            }
            EntityKind::Probe { group } => {
                assert!(
                    capacitor_groups.contains(&group),
                    "probe at {pos} feeds unknown capacitor group {group}",
                );
            }
            EntityKind::Shield { conductivity, .. } => {
                assert!(
                    conductivity > 0.0 && conductivity <= 1.0,
                    "shield at {pos} has conductivity {conductivity} outside (0, 1]",
                );
            }
            EntityKind::Source { power, .. } => {
                assert!(
                    power.is_finite() && power >= 0.0,
                    "source at {pos} has power {power}",
                );
            }
        }
    }

    for (group, value) in state
        .source_throttles
        .iter()
        .chain(&state.probe_throttles)
    {
        assert!(
            (0.0..=1.0).contains(value),
            "throttle for group {group} is {value}, outside [0, 1]",
        );
    }

    for group in CAPACITOR_GROUPS {
        assert!(
            capacitor_groups.contains(&group),
            "capacitor group {group} missing from the fixed range",
        );
    }
    for group in RESERVOIR_GROUPS {
        assert!(
            reservoir_groups.contains(&group),
            "reservoir group {group} missing from the fixed range",
        );
    }
}
