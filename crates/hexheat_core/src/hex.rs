//! Cube-coordinate hex kernel.
//!
//! Every cell is addressed by an integer cube coordinate `(x, y, z)` with
//! `x + y + z == 0`. The pixel projection is a fixed internal pointy-top
//! layout used by the line-of-sight geometry; it is independent of whatever
//! layout a renderer chooses.

use std::fmt;
use std::ops::Add;
use std::str::FromStr;

use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use smallvec::SmallVec;

/// The 6 unit directions, counter-clockwise starting east.
pub const DIRECTIONS: [Hex; 6] = [
    Hex { x: 1, y: -1, z: 0 },
    Hex { x: 1, y: 0, z: -1 },
    Hex { x: 0, y: 1, z: -1 },
    Hex { x: -1, y: 1, z: 0 },
    Hex { x: -1, y: 0, z: 1 },
    Hex { x: 0, y: -1, z: 1 },
];

/// A fixed half of the direction set. Walking only these three directions
/// visits every undirected edge of the grid exactly once.
pub const HALF_DIRECTIONS: [Hex; 3] = [DIRECTIONS[0], DIRECTIONS[1], DIRECTIONS[2]];

const SQRT_3: f64 = 1.732_050_807_568_877_2;

/// Cube coordinate of a hex cell. Immutable value type.
///
/// Serialized as the canonical `"x,y,z"` key so field maps stay readable in
/// snapshots and map keys stay canonical.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Hex {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl Hex {
    pub const ORIGIN: Hex = Hex { x: 0, y: 0, z: 0 };

    pub fn new(x: i32, y: i32, z: i32) -> Self {
        debug_assert!(x + y + z == 0, "cube coordinate must sum to zero: ({x},{y},{z})");
        Self { x, y, z }
    }

    /// Build from axial `(q, r)`; the third component is derived.
    pub fn axial(q: i32, r: i32) -> Self {
        Self::new(q, -q - r, r)
    }

    pub fn neighbor(self, direction: usize) -> Hex {
        self + DIRECTIONS[direction % 6]
    }

    /// All 6 adjacent cells.
    pub fn neighbors(self) -> SmallVec<[Hex; 6]> {
        DIRECTIONS.iter().map(|&d| self + d).collect()
    }

    /// Hex-step distance.
    pub fn distance(self, other: Hex) -> i32 {
        let dx = (self.x - other.x).abs();
        let dy = (self.y - other.y).abs();
        let dz = (self.z - other.z).abs();
        (dx + dy + dz) / 2
    }

    /// The ring of cells at exactly `radius` steps. `radius == 0` yields
    /// just this cell.
    pub fn ring(self, radius: i32) -> Vec<Hex> {
        if radius <= 0 {
            return vec![self];
        }
        let mut cells = Vec::with_capacity(6 * radius as usize);
        let mut cursor = self + DIRECTIONS[4].scaled(radius);
        for direction in DIRECTIONS {
            for _ in 0..radius {
                cells.push(cursor);
                cursor = cursor + direction;
            }
        }
        cells
    }

    /// All cells within `radius` steps, this cell included.
    pub fn range(self, radius: i32) -> Vec<Hex> {
        let mut cells = Vec::new();
        for dx in -radius..=radius {
            let lo = (-radius).max(-dx - radius);
            let hi = radius.min(-dx + radius);
            for dy in lo..=hi {
                cells.push(self + Hex::new(dx, dy, -dx - dy));
            }
        }
        cells
    }

    fn scaled(self, factor: i32) -> Hex {
        Hex::new(self.x * factor, self.y * factor, self.z * factor)
    }

    /// Pointy-top pixel projection of the cell center.
    pub fn to_pixel(self, size: f64) -> (f64, f64) {
        let q = f64::from(self.x);
        let r = f64::from(self.z);
        let px = size * (SQRT_3 * q + SQRT_3 / 2.0 * r);
        let py = size * (1.5 * r);
        (px, py)
    }

    /// Inverse pixel projection with cube rounding.
    pub fn from_pixel(px: f64, py: f64, size: f64) -> Hex {
        let q = (SQRT_3 / 3.0 * px - py / 3.0) / size;
        let r = (2.0 / 3.0 * py) / size;
        cube_round(q, -q - r, r)
    }
}

impl Add for Hex {
    type Output = Hex;

    fn add(self, rhs: Hex) -> Hex {
        Hex::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

fn cube_round(x: f64, y: f64, z: f64) -> Hex {
    let mut rx = x.round();
    let mut ry = y.round();
    let mut rz = z.round();
    let dx = (rx - x).abs();
    let dy = (ry - y).abs();
    let dz = (rz - z).abs();
    if dx > dy && dx > dz {
        rx = -ry - rz;
    } else if dy > dz {
        ry = -rx - rz;
    } else {
        rz = -rx - ry;
    }
    #[allow(clippy::cast_possible_truncation)] // rounded cube components are small integers
    Hex::new(rx as i32, ry as i32, rz as i32)
}

impl fmt::Display for Hex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{}", self.x, self.y, self.z)
    }
}

/// A cube key must decode to exactly three integer components summing to zero.
impl FromStr for Hex {
    type Err = String;

    fn from_str(key: &str) -> Result<Self, Self::Err> {
        let mut parts = key.split(',');
        let mut component = |name: &str| -> Result<i32, String> {
            parts
                .next()
                .ok_or_else(|| format!("cube key '{key}' is missing component {name}"))?
                .trim()
                .parse::<i32>()
                .map_err(|e| format!("cube key '{key}' component {name}: {e}"))
        };
        let x = component("x")?;
        let y = component("y")?;
        let z = component("z")?;
        if parts.next().is_some() {
            return Err(format!("cube key '{key}' has more than three components"));
        }
        if x + y + z != 0 {
            return Err(format!("cube key '{key}' does not sum to zero"));
        }
        Ok(Hex { x, y, z })
    }
}

impl Serialize for Hex {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Hex {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let key = String::deserialize(deserializer)?;
        key.parse().map_err(DeError::custom)
    }
}
