//! Engine-level tests, split by subsystem. Leaf geometry tests live next to
//! their modules; everything here goes through `tick` or the command layer
//! unless exact phase arithmetic demands a direct call.

use std::collections::BTreeMap;

use crate::test_fixtures::{field_total, make_rng, place, set_energy, small_state};
use crate::*;

mod extraction;
mod storage;

/// Structural equality for two states, ignoring hash-map iteration order.
fn assert_states_equal(a: &SimState, b: &SimState) {
    assert_eq!(a.tick, b.tick);

    let mut field_a: Vec<(Hex, f64)> = a.field.iter().map(|(&k, &v)| (k, v)).collect();
    let mut field_b: Vec<(Hex, f64)> = b.field.iter().map(|(&k, &v)| (k, v)).collect();
    field_a.sort_by_key(|&(k, _)| k);
    field_b.sort_by_key(|&(k, _)| k);
    assert_eq!(field_a.len(), field_b.len());
    for ((pos_a, val_a), (pos_b, val_b)) in field_a.iter().zip(&field_b) {
        assert_eq!(pos_a, pos_b);
        assert!(
            val_a.to_bits() == val_b.to_bits(),
            "field mismatch at {pos_a}: {val_a} vs {val_b}"
        );
    }

    for (pos, entity_a) in &a.entities {
        let entity_b = &b.entities[pos];
        assert_eq!(entity_a.destroyed, entity_b.destroyed, "destroyed at {pos}");
        assert_eq!(entity_a.disabled, entity_b.disabled, "disabled at {pos}");
    }
    assert_eq!(a.entities.len(), b.entities.len());

    for (group, cap_a) in &a.capacitors {
        let cap_b = &b.capacitors[group];
        assert!(cap_a.stored.to_bits() == cap_b.stored.to_bits());
    }
    for (group, res_a) in &a.reservoirs {
        let res_b = &b.reservoirs[group];
        assert!(res_a.heat.to_bits() == res_b.heat.to_bits());
    }
}
