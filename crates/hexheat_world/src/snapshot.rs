//! Snapshot save/restore.
//!
//! A snapshot is the full authored board in a stable on-disk form: every
//! map is written as pairs sorted by key, so saving the same board twice
//! produces byte-identical files regardless of hash-map iteration order.
//!
//! Restore is a cold start, not a resume: field energy and reservoir heat
//! come back as zero while placement, configuration, throttles, disabled
//! groups, banked capacitor charge and the tick counter survive. The board
//! re-heats from its sources; stale per-tick diagnostics are dropped.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use hexheat_core::{
    Capacitor, Diagnostics, Entity, GroupId, Hex, Reservoir, SimConfig, SimState,
};

pub const SNAPSHOT_SCHEMA_VERSION: u32 = 1;

#[derive(Serialize, Deserialize)]
pub struct Snapshot {
    pub schema_version: u32,
    /// RFC 3339 save timestamp; informational only.
    pub saved_at: String,
    pub config: SimConfig,
    pub tick: u64,
    pub field: Vec<(Hex, f64)>,
    pub entities: Vec<Entity>,
    pub capacitors: BTreeMap<GroupId, Capacitor>,
    pub reservoirs: BTreeMap<GroupId, Reservoir>,
    pub source_throttles: BTreeMap<GroupId, f64>,
    pub probe_throttles: BTreeMap<GroupId, f64>,
    pub disabled_shield_groups: BTreeSet<GroupId>,
}

impl Snapshot {
    pub fn capture(state: &SimState) -> Self {
        let mut field: Vec<(Hex, f64)> = state.field.iter().map(|(&k, &v)| (k, v)).collect();
        field.sort_unstable_by_key(|&(pos, _)| pos);
        let mut entities: Vec<Entity> = state.entities.values().cloned().collect();
        entities.sort_unstable_by_key(|entity| entity.pos);
        Self {
            schema_version: SNAPSHOT_SCHEMA_VERSION,
            saved_at: chrono::Utc::now().to_rfc3339(),
            config: state.config,
            tick: state.tick,
            field,
            entities,
            capacitors: state.capacitors.clone(),
            reservoirs: state.reservoirs.clone(),
            source_throttles: state.source_throttles.clone(),
            probe_throttles: state.probe_throttles.clone(),
            disabled_shield_groups: state.disabled_shield_groups.clone(),
        }
    }

    /// Rebuild a runnable state under the cold-start policy.
    pub fn restore(self) -> SimState {
        let mut reservoirs = self.reservoirs;
        for reservoir in reservoirs.values_mut() {
            reservoir.heat = 0.0;
        }
        SimState {
            field: self.field.into_iter().map(|(pos, _)| (pos, 0.0)).collect(),
            entities: self
                .entities
                .into_iter()
                .map(|entity| (entity.pos, entity))
                .collect(),
            capacitors: self.capacitors,
            reservoirs,
            source_throttles: self.source_throttles,
            probe_throttles: self.probe_throttles,
            disabled_shield_groups: self.disabled_shield_groups,
            diagnostics: Diagnostics::default(),
            tick: self.tick,
            config: self.config,
        }
    }
}

/// Write the board to `path` as pretty JSON.
pub fn save_snapshot(state: &SimState, path: &Path) -> Result<()> {
    let snapshot = Snapshot::capture(state);
    let text = serde_json::to_string_pretty(&snapshot).context("serializing snapshot")?;
    fs::write(path, text).with_context(|| format!("writing snapshot to {}", path.display()))
}

/// Load a board saved by [`save_snapshot`], applying the cold-start policy.
/// Any failure (missing file, malformed JSON, wrong schema) yields `Err`
/// with context and no partial state.
pub fn load_snapshot(path: &Path) -> Result<SimState> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading snapshot from {}", path.display()))?;
    let snapshot: Snapshot = serde_json::from_str(&text)
        .with_context(|| format!("parsing snapshot {}", path.display()))?;
    if snapshot.schema_version != SNAPSHOT_SCHEMA_VERSION {
        bail!(
            "snapshot {} has schema version {}, expected {SNAPSHOT_SCHEMA_VERSION}",
            path.display(),
            snapshot.schema_version,
        );
    }
    Ok(snapshot.restore())
}
