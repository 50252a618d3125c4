//! External edit operations.
//!
//! The GUI/editor layer mutates the board between ticks through these
//! commands. Invalid or no-op edits are dropped (returning `false`) rather
//! than erroring; the tick itself never issues commands.

use serde::{Deserialize, Serialize};

use crate::hex::Hex;
use crate::types::{Capacitor, Entity, EntityKind, GroupId, Reservoir, SimState};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Command {
    /// Insert or replace the entity at its position (one entity per cell).
    PlaceEntity(Entity),
    RemoveEntity {
        pos: Hex,
    },
    SetEntityDisabled {
        pos: Hex,
        disabled: bool,
    },
    SetSourceActive {
        pos: Hex,
        active: bool,
    },
    /// Throttles are clamped into [0, 1]; non-finite values are rejected.
    SetSourceThrottle {
        group: GroupId,
        value: f64,
    },
    SetProbeThrottle {
        group: GroupId,
        value: f64,
    },
    /// Disabling parks each member shield's field energy in its `retained`
    /// slot and zeroes the cell; enabling writes the parked value back over
    /// whatever accrued in the meantime and clears the slot.
    SetShieldGroupDisabled {
        group: GroupId,
        disabled: bool,
    },
    /// Spend the capacitor's surcharge cost; atomic, fails on insufficient charge.
    DischargeCapacitor {
        group: GroupId,
    },
    SetRadiatorDeployed {
        group: GroupId,
        deployed: bool,
    },
    ConfigureCapacitor {
        group: GroupId,
        capacity: f64,
        drain_rate: f64,
        surcharge_cost: f64,
    },
    ConfigureReservoir {
        group: GroupId,
        volume: f64,
        radiator_strength: f64,
    },
}

/// Apply one command. Returns `false` when the command was rejected or had
/// nothing to do; the state is untouched in that case.
pub fn apply_command(state: &mut SimState, command: &Command) -> bool {
    match *command {
        Command::PlaceEntity(ref entity) => {
            state.entities.insert(entity.pos, entity.clone());
            true
        }
        Command::RemoveEntity { pos } => state.entities.remove(&pos).is_some(),
        Command::SetEntityDisabled { pos, disabled } => {
            match state.entities.get_mut(&pos) {
                Some(entity) => {
                    entity.disabled = disabled;
                    true
                }
                None => false,
            }
        }
        Command::SetSourceActive { pos, active } => match state.entities.get_mut(&pos) {
            Some(Entity {
                kind: EntityKind::Source { active: ref mut a, .. },
                ..
            }) => {
                *a = active;
                true
            }
            _ => false,
        },
        Command::SetSourceThrottle { group, value } => {
            set_throttle(&mut state.source_throttles, group, value)
        }
        Command::SetProbeThrottle { group, value } => {
            set_throttle(&mut state.probe_throttles, group, value)
        }
        Command::SetShieldGroupDisabled { group, disabled } => {
            set_shield_group_disabled(state, group, disabled)
        }
        Command::DischargeCapacitor { group } => state
            .capacitors
            .get_mut(&group)
            .is_some_and(Capacitor::discharge),
        Command::SetRadiatorDeployed { group, deployed } => {
            match state.reservoirs.get_mut(&group) {
                Some(reservoir) => {
                    reservoir.radiator.deployed = deployed;
                    true
                }
                None => false,
            }
        }
        Command::ConfigureCapacitor {
            group,
            capacity,
            drain_rate,
            surcharge_cost,
        } => match state.capacitors.get_mut(&group) {
            Some(capacitor) => {
                capacitor.capacity = capacity;
                capacitor.drain_rate = drain_rate;
                capacitor.surcharge_cost = surcharge_cost;
                capacitor.stored = capacitor.stored.min(capacity);
                true
            }
            None => false,
        },
        Command::ConfigureReservoir {
            group,
            volume,
            radiator_strength,
        } => match state.reservoirs.get_mut(&group) {
            Some(reservoir) => {
                reservoir.volume = volume;
                reservoir.radiator.strength = radiator_strength;
                true
            }
            None => false,
        },
    }
}

fn set_throttle(throttles: &mut std::collections::BTreeMap<GroupId, f64>, group: GroupId, value: f64) -> bool {
    if !value.is_finite() {
        return false;
    }
    throttles.insert(group, value.clamp(0.0, 1.0));
    true
}

/// Toggle a shield group, with retained-energy bookkeeping on each
/// non-destroyed member shield that sits in the domain. A toggle to the
/// current state is a no-op.
fn set_shield_group_disabled(state: &mut SimState, group: GroupId, disabled: bool) -> bool {
    let changed = if disabled {
        state.disabled_shield_groups.insert(group)
    } else {
        state.disabled_shield_groups.remove(&group)
    };
    if !changed {
        return false;
    }
    for pos in state.sorted_entity_positions() {
        let Some(entity) = state.entities.get_mut(&pos) else {
            continue;
        };
        let EntityKind::Shield {
            group: shield_group,
            ref mut retained,
            ..
        } = entity.kind
        else {
            continue;
        };
        if shield_group != group || entity.destroyed {
            continue;
        }
        if disabled {
            let Some(cell) = state.field.get_mut(&pos) else {
                continue;
            };
            *retained = Some(*cell);
            *cell = 0.0;
        } else if let Some(saved) = retained.take() {
            if let Some(cell) = state.field.get_mut(&pos) {
                *cell = saved;
            }
        }
    }
    true
}
