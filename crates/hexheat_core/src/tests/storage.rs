use super::*;

#[test]
fn sink_cell_tracks_reservoir_temperature() {
    let mut state = small_state(2);
    let pos = place(&mut state, Entity::sink(Hex::new(1, -1, 0), 0.5, 1));
    state.reservoirs.get_mut(&1).unwrap().heat = 500.0; // volume 100 → temp 5
    set_energy(&mut state, pos, 99.0); // stale value, must be overwritten
    let mut rng = make_rng();
    let next = tick(&state, &mut rng);

    // Snapped to 5, then the cell's outflow (6 edges × 0.1 × 5) is charged
    // to the reservoir, and the cell re-snaps to the new temperature.
    let reservoir = &next.reservoirs[&1];
    assert!((reservoir.heat - 497.0).abs() < 1e-9);
    assert!((next.field[&pos] - 4.97).abs() < 1e-9);
    for n in pos.neighbors() {
        assert!((next.field[&n] - 0.5).abs() < 1e-9);
    }
}

#[test]
fn sink_absorbs_neighboring_heat_into_reservoir() {
    let mut state = small_state(2);
    let pos = place(&mut state, Entity::sink(Hex::new(1, -1, 0), 0.5, 2));
    set_energy(&mut state, Hex::ORIGIN, 100.0);
    let mut rng = make_rng();
    let next = tick(&state, &mut rng);
    // The flux from the hot neighbor lands in the reservoir, not on the
    // cell; the cell re-snaps to the new temperature 10 / 100.
    assert!((next.reservoirs[&2].heat - 10.0).abs() < 1e-9);
    assert!((next.field[&pos] - 0.1).abs() < 1e-9);
}

#[test]
fn destroyed_sink_is_inert() {
    let mut state = small_state(1);
    let mut sink = Entity::sink(Hex::ORIGIN, 0.5, 1);
    sink.destroyed = true;
    let pos = place(&mut state, sink);
    state.reservoirs.get_mut(&1).unwrap().heat = 500.0;
    set_energy(&mut state, pos, 7.0);
    let mut rng = make_rng();
    let next = tick(&state, &mut rng);

    // No snap, no routing: the cell just diffuses like any other.
    assert!((next.reservoirs[&1].heat - 500.0).abs() < 1e-9);
    assert!((next.field[&pos] - 2.8).abs() < 1e-9);
}

#[test]
fn disabled_sink_is_inert() {
    let mut state = small_state(1);
    let mut sink = Entity::sink(Hex::ORIGIN, 0.5, 1);
    sink.disabled = true;
    let pos = place(&mut state, sink);
    state.reservoirs.get_mut(&1).unwrap().heat = 500.0;
    set_energy(&mut state, pos, 7.0);
    let mut rng = make_rng();
    let next = tick(&state, &mut rng);
    assert!((next.reservoirs[&1].heat - 500.0).abs() < 1e-9);
    assert!((next.field[&pos] - 2.8).abs() < 1e-9);
}

#[test]
fn deployed_radiator_sheds_capped_heat() {
    let mut state = small_state(1);
    {
        let reservoir = state.reservoirs.get_mut(&3).unwrap();
        reservoir.heat = 500.0;
        reservoir.radiator.deployed = true; // default strength 5
    }
    let mut rng = make_rng();
    let next = tick(&state, &mut rng);
    assert!((next.reservoirs[&3].heat - 495.0).abs() < 1e-9);
}

#[test]
fn radiator_never_drives_heat_negative() {
    let mut state = small_state(1);
    {
        let reservoir = state.reservoirs.get_mut(&3).unwrap();
        reservoir.heat = 3.0;
        reservoir.radiator.deployed = true;
    }
    let mut rng = make_rng();
    let next = tick(&state, &mut rng);
    assert!(next.reservoirs[&3].heat.abs() < 1e-9);
}

#[test]
fn stowed_radiator_holds_heat() {
    let mut state = small_state(1);
    state.reservoirs.get_mut(&3).unwrap().heat = 500.0;
    let mut rng = make_rng();
    let next = tick(&state, &mut rng);
    assert!((next.reservoirs[&3].heat - 500.0).abs() < 1e-9);
}

// --- Capacitors ---------------------------------------------------------

#[test]
fn capacitor_drains_and_floors_at_zero() {
    let mut state = small_state(0);
    state.capacitors.get_mut(&1).unwrap().stored = 10.0;
    state.capacitors.get_mut(&2).unwrap().stored = 0.2;
    let mut rng = make_rng();
    let next = tick(&state, &mut rng);
    assert!((next.capacitors[&1].stored - 9.5).abs() < 1e-9);
    assert!(next.capacitors[&2].stored.abs() < 1e-9);
}

#[test]
fn full_capacitor_stops_its_group_for_the_tick() {
    let mut state = small_state(2);
    let hot = place(&mut state, Entity::probe(Hex::new(2, -2, 0), 1));
    place(&mut state, Entity::probe(Hex::new(-2, 2, 0), 1));
    set_energy(&mut state, hot, 100.0);
    state.capacitors.get_mut(&1).unwrap().stored = 100.0; // at capacity
    let mut rng = make_rng();
    let next = tick(&state, &mut rng);

    // No collection despite the default throttle of 1.0; the bank only
    // drained. The field keeps its total (diffusion alone ran).
    assert!(next.diagnostics.collected.is_empty());
    assert!((next.capacitors[&1].stored - 99.5).abs() < 1e-9);
    assert!((field_total(&next) - 100.0).abs() < 1e-9);
}

#[test]
fn refilled_bank_collects_again_next_tick() {
    let mut state = small_state(2);
    let hot = place(&mut state, Entity::probe(Hex::new(2, -2, 0), 1));
    place(&mut state, Entity::probe(Hex::new(-2, 2, 0), 1));
    set_energy(&mut state, hot, 400.0);
    state.capacitors.get_mut(&1).unwrap().stored = 100.0;
    let mut rng = make_rng();
    let stopped = tick(&state, &mut rng);
    assert!(stopped.diagnostics.collected.is_empty());
    // Below capacity now (the drain ran), so the next tick extracts.
    let flowing = tick(&stopped, &mut rng);
    assert!(flowing.diagnostics.collected.contains_key(&1));
}

#[test]
fn discharge_is_atomic() {
    let mut capacitor = Capacitor::new(100.0, 0.5, 25.0);
    capacitor.stored = 30.0;
    assert!(capacitor.discharge());
    assert!((capacitor.stored - 5.0).abs() < 1e-9);
    // Not enough left: nothing changes.
    assert!(!capacitor.discharge());
    assert!((capacitor.stored - 5.0).abs() < 1e-9);
}
