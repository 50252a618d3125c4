//! Type definitions for `hexheat_core`.
//!
//! All public state types plus the fixed engine constants. The whole
//! simulation state is one serde-friendly value; a tick replaces it
//! wholesale rather than mutating it in place.

use std::collections::{BTreeMap, BTreeSet};

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::hex::Hex;

// ---------------------------------------------------------------------------
// Engine constants
// ---------------------------------------------------------------------------

/// Per-tick destruction probability for an entity held over its tolerance.
pub const P_FAIL: f64 = 0.05;

/// Default heat tolerances when an entity carries no override.
pub const SHIELD_TOLERANCE: f64 = 2000.0;
pub const SINK_TOLERANCE: f64 = 1400.0;
pub const PROBE_TOLERANCE: f64 = 1800.0;

/// Fraction of a probe group's total excess moved per tick at full throttle.
pub const TRANSFER_RATE: f64 = 0.9;
/// Fraction of moved energy converted to collected work; the rest is dumped
/// back onto the cold probes as waste heat.
pub const EFFICIENCY: f64 = 0.3;
/// Below this total excess a probe group is treated as at equilibrium.
pub const EQUILIBRIUM_EPSILON: f64 = 1e-4;

/// Obstacle corners are inflated outward from the cell center by this factor
/// so shared-edge floating-point ties cannot let a ray graze through.
pub const CORNER_INFLATION: f64 = 1.1;

/// Field values with absolute magnitude below this are snapped to exactly 0
/// at the end of every tick.
pub const NOISE_FLOOR: f64 = 1e-12;

/// Fixed group id ranges; capacitors and reservoirs exist for every id in
/// their range from board creation onward.
pub const CAPACITOR_GROUPS: std::ops::RangeInclusive<GroupId> = 1..=4;
pub const RESERVOIR_GROUPS: std::ops::RangeInclusive<GroupId> = 1..=6;

/// Board-creation defaults; all editable afterwards via `Command`.
pub const DEFAULT_CAPACITOR_CAPACITY: f64 = 100.0;
pub const DEFAULT_CAPACITOR_DRAIN: f64 = 0.5;
pub const DEFAULT_SURCHARGE_COST: f64 = 25.0;
pub const DEFAULT_RESERVOIR_VOLUME: f64 = 100.0;
pub const DEFAULT_RADIATOR_STRENGTH: f64 = 5.0;

// ---------------------------------------------------------------------------
// Aliases
// ---------------------------------------------------------------------------

/// Integer tag partitioning sources/shields/probes (and separately, sinks).
pub type GroupId = u8;

/// The scalar energy field. The domain is exactly the key set; positions
/// outside it do not exist and are ignored by every subsystem.
pub type EnergyField = AHashMap<Hex, f64>;

// ---------------------------------------------------------------------------
// Entities
// ---------------------------------------------------------------------------

/// A placed entity. One entity per cell; the entity map is keyed by `pos`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    pub pos: Hex,
    /// Terminal: a destroyed entity no longer injects, extracts, pulls, or
    /// blocks sight, but stays in the map for inspection and removal.
    pub destroyed: bool,
    /// Caller-controlled off switch; a disabled entity is skipped by every
    /// simulation phase that would otherwise read it.
    pub disabled: bool,
    /// Heat-tolerance override; `None` uses the per-kind default.
    pub tolerance: Option<f64>,
    pub kind: EntityKind,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum EntityKind {
    Source {
        /// Energy injected per tick while `active`, scaled by the group throttle.
        power: f64,
        active: bool,
        /// Reserved; carried and persisted but never read by the tick.
        min_activation: f64,
        group: GroupId,
    },
    Sink {
        /// Carried as configuration; the snap-to-reservoir model makes
        /// diffusion the actual pull mechanism.
        pull_rate: f64,
        /// Optional conductivity override min-clamped onto the cell.
        conductivity: Option<f64>,
        /// Identifies the reservoir this sink feeds (reservoir id space).
        group: GroupId,
    },
    Shield {
        /// Conductivity multiplier in (0, 1]; lower impedes diffusion.
        conductivity: f64,
        group: GroupId,
        /// Field energy parked here while the shield's group is disabled.
        retained: Option<f64>,
    },
    Probe {
        /// Identifies the capacitor bank this probe feeds.
        group: GroupId,
    },
}

impl Entity {
    fn with_kind(pos: Hex, kind: EntityKind) -> Self {
        Self {
            pos,
            destroyed: false,
            disabled: false,
            tolerance: None,
            kind,
        }
    }

    pub fn source(pos: Hex, power: f64, group: GroupId) -> Self {
        Self::with_kind(
            pos,
            EntityKind::Source {
                power,
                active: true,
                min_activation: 0.0,
                group,
            },
        )
    }

    pub fn sink(pos: Hex, pull_rate: f64, group: GroupId) -> Self {
        Self::with_kind(
            pos,
            EntityKind::Sink {
                pull_rate,
                conductivity: None,
                group,
            },
        )
    }

    pub fn shield(pos: Hex, conductivity: f64, group: GroupId) -> Self {
        Self::with_kind(
            pos,
            EntityKind::Shield {
                conductivity,
                group,
                retained: None,
            },
        )
    }

    pub fn probe(pos: Hex, group: GroupId) -> Self {
        Self::with_kind(pos, EntityKind::Probe { group })
    }

    /// Effective heat tolerance: the override, or the per-kind default.
    /// Sources are not destructible and report an infinite tolerance.
    pub fn heat_tolerance(&self) -> f64 {
        self.tolerance.unwrap_or(match self.kind {
            EntityKind::Source { .. } => f64::INFINITY,
            EntityKind::Sink { .. } => SINK_TOLERANCE,
            EntityKind::Shield { .. } => SHIELD_TOLERANCE,
            EntityKind::Probe { .. } => PROBE_TOLERANCE,
        })
    }

    /// Alive and switched on.
    pub fn is_live(&self) -> bool {
        !self.destroyed && !self.disabled
    }
}

// ---------------------------------------------------------------------------
// Storage
// ---------------------------------------------------------------------------

/// Bounded charge store backing a probe group. Invariant: `0 <= stored <= capacity`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Capacitor {
    pub stored: f64,
    pub capacity: f64,
    /// Charge lost per tick before extraction runs.
    pub drain_rate: f64,
    /// Fixed charge spent by the external discharge action.
    pub surcharge_cost: f64,
}

impl Capacitor {
    pub fn new(capacity: f64, drain_rate: f64, surcharge_cost: f64) -> Self {
        Self {
            stored: 0.0,
            capacity,
            drain_rate,
            surcharge_cost,
        }
    }

    pub fn headroom(&self) -> f64 {
        self.capacity - self.stored
    }

    /// True when the bank can accept no further charge; checked before the
    /// per-tick drain, so a bank that fills stops its group for a full tick.
    pub fn is_full(&self) -> bool {
        self.stored >= self.capacity
    }

    /// Spend `surcharge_cost` if enough charge is present. Atomic: either the
    /// full cost is subtracted or nothing changes.
    pub fn discharge(&mut self) -> bool {
        if self.stored < self.surcharge_cost {
            return false;
        }
        self.stored -= self.surcharge_cost;
        true
    }
}

/// Bulk thermal store backing a sink group. Heat is unbounded (and may go
/// negative when sinks sit in a cold region).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reservoir {
    pub heat: f64,
    pub volume: f64,
    pub radiator: Radiator,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Radiator {
    pub deployed: bool,
    /// Per-tick heat-loss cap while deployed.
    pub strength: f64,
}

impl Reservoir {
    pub fn new(volume: f64, radiator_strength: f64) -> Self {
        Self {
            heat: 0.0,
            volume,
            radiator: Radiator {
                deployed: false,
                strength: radiator_strength,
            },
        }
    }

    /// The temperature a sink cell is snapped to: `heat / max(1, volume)`.
    pub fn surface_temperature(&self) -> f64 {
        self.heat / self.volume.max(1.0)
    }
}

// ---------------------------------------------------------------------------
// Configuration, diagnostics, state
// ---------------------------------------------------------------------------

/// Global tick parameters. `diffusion_alpha` must stay small relative to the
/// conductivities for numerical stability; no clamp is enforced here.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SimConfig {
    pub diffusion_alpha: f64,
    pub base_conductivity: f64,
    pub board_radius: i32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            diffusion_alpha: 0.1,
            base_conductivity: 1.0,
            board_radius: 12,
        }
    }
}

/// Per-tick outputs for callers. Replaced wholesale every tick.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Diagnostics {
    /// Work collected this tick, per probe group.
    pub collected: BTreeMap<GroupId, f64>,
    /// Cumulative work collected since board creation, per probe group.
    pub total_collected: BTreeMap<GroupId, f64>,
    /// Field value change over the last tick, per cell.
    pub field_delta: AHashMap<Hex, f64>,
    /// Stored-charge change over the last tick, per capacitor group.
    pub capacitor_delta: BTreeMap<GroupId, f64>,
    /// Aggregate energy on the outer ring at the configured board radius.
    pub perimeter_energy: f64,
}

/// The whole simulation state. Created once at board initialization and
/// thereafter replaced, never mutated in place, by one tick per step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimState {
    pub field: EnergyField,
    pub entities: AHashMap<Hex, Entity>,
    pub capacitors: BTreeMap<GroupId, Capacitor>,
    pub reservoirs: BTreeMap<GroupId, Reservoir>,
    /// Caller-supplied throttles in [0, 1]; an absent group reads as 1.0.
    pub source_throttles: BTreeMap<GroupId, f64>,
    pub probe_throttles: BTreeMap<GroupId, f64>,
    pub disabled_shield_groups: BTreeSet<GroupId>,
    pub diagnostics: Diagnostics,
    pub tick: u64,
    pub config: SimConfig,
}

impl SimState {
    /// Zeroed board of all cells within `config.board_radius`, with every
    /// fixed-range capacitor and reservoir pre-populated.
    pub fn new(config: SimConfig) -> Self {
        let field: EnergyField = Hex::ORIGIN
            .range(config.board_radius)
            .into_iter()
            .map(|cell| (cell, 0.0))
            .collect();
        let capacitors = CAPACITOR_GROUPS
            .map(|group| {
                (
                    group,
                    Capacitor::new(
                        DEFAULT_CAPACITOR_CAPACITY,
                        DEFAULT_CAPACITOR_DRAIN,
                        DEFAULT_SURCHARGE_COST,
                    ),
                )
            })
            .collect();
        let reservoirs = RESERVOIR_GROUPS
            .map(|group| {
                (
                    group,
                    Reservoir::new(DEFAULT_RESERVOIR_VOLUME, DEFAULT_RADIATOR_STRENGTH),
                )
            })
            .collect();
        Self {
            field,
            entities: AHashMap::new(),
            capacitors,
            reservoirs,
            source_throttles: BTreeMap::new(),
            probe_throttles: BTreeMap::new(),
            disabled_shield_groups: BTreeSet::new(),
            diagnostics: Diagnostics::default(),
            tick: 0,
            config,
        }
    }

    pub fn in_domain(&self, pos: Hex) -> bool {
        self.field.contains_key(&pos)
    }

    pub fn source_throttle(&self, group: GroupId) -> f64 {
        self.source_throttles.get(&group).copied().unwrap_or(1.0)
    }

    pub fn probe_throttle(&self, group: GroupId) -> f64 {
        self.probe_throttles.get(&group).copied().unwrap_or(1.0)
    }

    /// Entity positions in ascending order. Phases that consume randomness or
    /// accumulate floats iterate in this order so replays are bit-identical.
    pub fn sorted_entity_positions(&self) -> Vec<Hex> {
        let mut positions: Vec<Hex> = self.entities.keys().copied().collect();
        positions.sort_unstable();
        positions
    }
}
