use super::*;

use crate::extraction::run_extraction;

/// Direct-phase harness: exact arithmetic without diffusion in the way.
fn run(state: &mut SimState, throttles: &[(GroupId, f64)]) -> BTreeMap<GroupId, f64> {
    let map: BTreeMap<GroupId, f64> = throttles.iter().copied().collect();
    run_extraction(state, &map)
}

#[test]
fn hot_and_cold_probe_split() {
    let mut state = small_state(4);
    let hot = place(&mut state, Entity::probe(Hex::new(3, -3, 0), 1));
    let cold = place(&mut state, Entity::probe(Hex::new(-3, 3, 0), 1));
    set_energy(&mut state, hot, 100.0);
    let collected = run(&mut state, &[]);

    // mean 50, excess 50, q_move 45: 30% becomes work, 70% waste heat.
    assert!((collected[&1] - 13.5).abs() < 1e-9);
    assert!((state.field[&hot] - 55.0).abs() < 1e-9);
    assert!((state.field[&cold] - 31.5).abs() < 1e-9);
    assert!((state.capacitors[&1].stored - 13.5).abs() < 1e-9);
}

#[test]
fn throttle_scales_the_move() {
    let mut state = small_state(4);
    let hot = place(&mut state, Entity::probe(Hex::new(3, -3, 0), 1));
    let cold = place(&mut state, Entity::probe(Hex::new(-3, 3, 0), 1));
    set_energy(&mut state, hot, 100.0);
    let collected = run(&mut state, &[(1, 0.5)]);
    assert!((collected[&1] - 6.75).abs() < 1e-9);
    assert!((state.field[&hot] - 77.5).abs() < 1e-9);
    assert!((state.field[&cold] - 15.75).abs() < 1e-9);
}

#[test]
fn headroom_clamps_the_move() {
    let mut state = small_state(4);
    let hot = place(&mut state, Entity::probe(Hex::new(3, -3, 0), 1));
    let cold = place(&mut state, Entity::probe(Hex::new(-3, 3, 0), 1));
    set_energy(&mut state, hot, 100.0);
    state.capacitors.get_mut(&1).unwrap().stored = 97.0;
    let collected = run(&mut state, &[]);

    // Only 3 units of headroom: q_move caps at 3 / 0.3 = 10.
    assert!((collected[&1] - 3.0).abs() < 1e-9);
    assert!((state.field[&hot] - 90.0).abs() < 1e-9);
    assert!((state.field[&cold] - 7.0).abs() < 1e-9);
    assert!((state.capacitors[&1].stored - 100.0).abs() < 1e-9);
}

#[test]
fn waste_heat_is_shared_by_deficit() {
    let mut state = small_state(4);
    let a = place(&mut state, Entity::probe(Hex::new(3, -3, 0), 2));
    let b = place(&mut state, Entity::probe(Hex::ORIGIN, 2));
    let c = place(&mut state, Entity::probe(Hex::new(-3, 3, 0), 2));
    set_energy(&mut state, a, 90.0);
    set_energy(&mut state, b, 30.0);
    let collected = run(&mut state, &[]);

    // mean 40; the sole hot cell funds the whole move, the two cold cells
    // split the dump by how far below the mean they sit (10 vs 40).
    assert!((collected[&2] - 13.5).abs() < 1e-9);
    assert!((state.field[&a] - 45.0).abs() < 1e-9);
    assert!((state.field[&b] - 36.3).abs() < 1e-9);
    assert!((state.field[&c] - 25.2).abs() < 1e-9);
}

#[test]
fn equilibrium_group_is_left_alone() {
    let mut state = small_state(4);
    let a = place(&mut state, Entity::probe(Hex::new(3, -3, 0), 1));
    let b = place(&mut state, Entity::probe(Hex::new(-3, 3, 0), 1));
    set_energy(&mut state, a, 10.0);
    set_energy(&mut state, b, 10.0);
    let collected = run(&mut state, &[]);
    assert!(collected.is_empty());
    assert!((state.field[&a] - 10.0).abs() < 1e-9);
    assert!((state.field[&b] - 10.0).abs() < 1e-9);
}

#[test]
fn lone_probe_extracts_nothing() {
    let mut state = small_state(2);
    let pos = place(&mut state, Entity::probe(Hex::ORIGIN, 1));
    set_energy(&mut state, pos, 100.0);
    let collected = run(&mut state, &[]);
    assert!(collected.is_empty());
    assert!((state.field[&pos] - 100.0).abs() < 1e-9);
}

#[test]
fn dead_probe_drops_out_of_its_group() {
    let mut state = small_state(4);
    let hot = place(&mut state, Entity::probe(Hex::new(3, -3, 0), 1));
    let mut broken = Entity::probe(Hex::new(-3, 3, 0), 1);
    broken.destroyed = true;
    place(&mut state, broken);
    set_energy(&mut state, hot, 100.0);
    let collected = run(&mut state, &[]);
    assert!(collected.is_empty(), "one live member is no engine");
}

#[test]
fn zero_throttle_is_a_full_stop() {
    let mut state = small_state(4);
    let hot = place(&mut state, Entity::probe(Hex::new(3, -3, 0), 1));
    place(&mut state, Entity::probe(Hex::new(-3, 3, 0), 1));
    set_energy(&mut state, hot, 100.0);
    let collected = run(&mut state, &[(1, 0.0)]);
    assert!(collected.is_empty());
    assert!((state.field[&hot] - 100.0).abs() < 1e-9);
}

#[test]
fn tick_ledger_balances_work_against_field_loss() {
    let mut state = small_state(4);
    let hot = place(&mut state, Entity::probe(Hex::new(3, -3, 0), 1));
    place(&mut state, Entity::probe(Hex::new(-3, 3, 0), 1));
    set_energy(&mut state, hot, 400.0);
    state.capacitors.get_mut(&1).unwrap().drain_rate = 0.0;
    let before = field_total(&state);
    let mut rng = make_rng();
    let next = tick(&state, &mut rng);

    let work = next.diagnostics.collected[&1];
    assert!(work > 0.0);
    let after = field_total(&next);
    assert!(
        (before - after - work).abs() < 1e-9,
        "collected work is the only field loss: {before} -> {after}, work {work}"
    );
    assert!((next.capacitors[&1].stored - work).abs() < 1e-9);
    assert!((next.diagnostics.total_collected[&1] - work).abs() < 1e-9);
}
