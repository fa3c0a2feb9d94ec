//! World positions and axis-aligned geofences.

use std::fmt;
use std::str::FromStr;

use crate::error::ZoneConfigError;

/// Name of the world (dimension) a position belongs to.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct WorldId(pub String);

impl WorldId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }
}

impl fmt::Display for WorldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Continuous position inside a world.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Location {
    pub world: WorldId,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Location {
    pub fn new(world: impl Into<String>, x: f64, y: f64, z: f64) -> Self {
        Self {
            world: WorldId::new(world),
            x,
            y,
            z,
        }
    }

    /// Block cell containing this position.
    pub fn block(&self) -> BlockPos {
        BlockPos {
            world: self.world.clone(),
            x: self.x.floor() as i64,
            y: self.y.floor() as i64,
            z: self.z.floor() as i64,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}:{}", self.world, self.x, self.y, self.z)
    }
}

/// Parses the catalog form `world:x:y:z`.
impl FromStr for Location {
    type Err = ZoneConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || ZoneConfigError::MalformedLocation {
            value: s.to_owned(),
        };

        let parts: Vec<&str> = s.split(':').collect();
        let [world, x, y, z] = parts.as_slice() else {
            return Err(malformed());
        };
        if world.trim().is_empty() {
            return Err(malformed());
        }

        let coord = |raw: &str| raw.trim().parse::<f64>().map_err(|_| malformed());
        let (x, y, z) = (coord(x)?, coord(y)?, coord(z)?);
        if !(x.is_finite() && y.is_finite() && z.is_finite()) {
            return Err(malformed());
        }

        Ok(Location::new(world.trim(), x, y, z))
    }
}

/// Integer block coordinate, used for anchor (click target) matching.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BlockPos {
    pub world: WorldId,
    pub x: i64,
    pub y: i64,
    pub z: i64,
}

impl BlockPos {
    pub fn new(world: impl Into<String>, x: i64, y: i64, z: i64) -> Self {
        Self {
            world: WorldId::new(world),
            x,
            y,
            z,
        }
    }

    /// Center of the block as a continuous location.
    pub fn to_location(&self) -> Location {
        Location {
            world: self.world.clone(),
            x: self.x as f64 + 0.5,
            y: self.y as f64,
            z: self.z as f64 + 0.5,
        }
    }
}

impl fmt::Display for BlockPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}:{}", self.world, self.x, self.y, self.z)
    }
}

/// Axis-aligned bounding volume in a single world.
///
/// Corners are normalized on construction so `min <= max` on every axis,
/// regardless of the order they were configured in.
#[derive(Clone, Debug, PartialEq)]
pub struct Geofence {
    world: WorldId,
    min: [f64; 3],
    max: [f64; 3],
}

impl Geofence {
    /// Builds a geofence from two opposite corners.
    ///
    /// Returns `None` when the corners live in different worlds.
    pub fn from_corners(a: &Location, b: &Location) -> Option<Self> {
        if a.world != b.world {
            return None;
        }

        Some(Self {
            world: a.world.clone(),
            min: [a.x.min(b.x), a.y.min(b.y), a.z.min(b.z)],
            max: [a.x.max(b.x), a.y.max(b.y), a.z.max(b.z)],
        })
    }

    pub fn world(&self) -> &WorldId {
        &self.world
    }

    pub fn min(&self) -> Location {
        Location {
            world: self.world.clone(),
            x: self.min[0],
            y: self.min[1],
            z: self.min[2],
        }
    }

    pub fn max(&self) -> Location {
        Location {
            world: self.world.clone(),
            x: self.max[0],
            y: self.max[1],
            z: self.max[2],
        }
    }

    /// Inclusive per-axis containment. A point in another world is never contained.
    pub fn contains(&self, point: &Location) -> bool {
        if point.world != self.world {
            return false;
        }

        let coords = [point.x, point.y, point.z];
        coords
            .iter()
            .zip(self.min.iter().zip(self.max.iter()))
            .all(|(value, (lo, hi))| value >= lo && value <= hi)
    }

    pub fn center(&self) -> Location {
        Location {
            world: self.world.clone(),
            x: (self.min[0] + self.max[0]) / 2.0,
            y: (self.min[1] + self.max[1]) / 2.0,
            z: (self.min[2] + self.max[2]) / 2.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_catalog_location() {
        let loc: Location = "world:10:64.5:-3".parse().unwrap();
        assert_eq!(loc, Location::new("world", 10.0, 64.5, -3.0));
    }

    #[test]
    fn rejects_malformed_locations() {
        for raw in ["world:1:2", "world:1:2:3:4", ":1:2:3", "world:a:2:3", "world:inf:2:3"] {
            assert!(raw.parse::<Location>().is_err(), "{raw} should be rejected");
        }
    }

    #[test]
    fn block_floors_negative_coordinates() {
        let loc = Location::new("world", -0.5, 64.9, 3.2);
        assert_eq!(loc.block(), BlockPos::new("world", -1, 64, 3));
    }

    #[test]
    fn corners_are_normalized_regardless_of_order() {
        let a = Location::new("world", 10.0, 80.0, -5.0);
        let b = Location::new("world", -10.0, 60.0, 5.0);

        let forward = Geofence::from_corners(&a, &b).unwrap();
        let backward = Geofence::from_corners(&b, &a).unwrap();

        assert_eq!(forward, backward);
        assert_eq!(forward.min(), Location::new("world", -10.0, 60.0, -5.0));
        assert_eq!(forward.max(), Location::new("world", 10.0, 80.0, 5.0));
    }

    #[test]
    fn containment_is_inclusive_on_every_face() {
        let fence = Geofence::from_corners(
            &Location::new("world", 0.0, 0.0, 0.0),
            &Location::new("world", 10.0, 10.0, 10.0),
        )
        .unwrap();

        assert!(fence.contains(&Location::new("world", 0.0, 0.0, 0.0)));
        assert!(fence.contains(&Location::new("world", 10.0, 10.0, 10.0)));
        assert!(fence.contains(&Location::new("world", 5.0, 10.0, 0.0)));
        assert!(!fence.contains(&Location::new("world", 10.01, 5.0, 5.0)));
        assert!(!fence.contains(&Location::new("world", 5.0, -0.01, 5.0)));
    }

    #[test]
    fn other_world_is_never_contained() {
        let fence = Geofence::from_corners(
            &Location::new("world", 0.0, 0.0, 0.0),
            &Location::new("world", 10.0, 10.0, 10.0),
        )
        .unwrap();

        assert!(!fence.contains(&Location::new("world_nether", 5.0, 5.0, 5.0)));
    }

    #[test]
    fn mixed_world_corners_build_no_geofence() {
        let a = Location::new("world", 0.0, 0.0, 0.0);
        let b = Location::new("world_nether", 1.0, 1.0, 1.0);
        assert!(Geofence::from_corners(&a, &b).is_none());
    }
}
