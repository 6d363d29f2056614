//! Ship and fleet value types.
//!
//! A ship's sunk state is never stored: it is recomputed from its parts'
//! hit flags, so the per-part and per-ship views cannot drift apart.

use alloc::vec::Vec;

use crate::coord::Coordinate;

/// Orientation of a ship on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub enum Orientation {
    /// Parts run along a row (increasing column).
    Horizontal,
    /// Parts run along a column (increasing row).
    Vertical,
}

impl Orientation {
    /// Row and column step between consecutive parts.
    pub const fn step(self) -> (i32, i32) {
        match self {
            Orientation::Horizontal => (0, 1),
            Orientation::Vertical => (1, 0),
        }
    }
}

/// Type of ship: name and length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShipClass {
    name: &'static str,
    length: usize,
}

impl ShipClass {
    /// Create a new ship class.
    pub const fn new(name: &'static str, length: usize) -> Self {
        Self { name, length }
    }

    /// Ship's name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Ship's length.
    pub fn length(&self) -> usize {
        self.length
    }
}

#[cfg(feature = "std")]
impl serde::Serialize for ShipClass {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name)
    }
}

#[cfg(feature = "std")]
impl<'de> serde::Deserialize<'de> for ShipClass {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        crate::config::ship_class(&name)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown ship class {:?}", name)))
    }
}

/// One segment of a ship.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub struct ShipPart {
    pub coord: Coordinate,
    pub hit: bool,
}

/// A placed ship: its class, orientation and parts in order from the anchor.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub struct Ship {
    class: ShipClass,
    orientation: Orientation,
    parts: Vec<ShipPart>,
}

impl Ship {
    /// Build a ship with every part intact. Callers are expected to have
    /// validated `coords` (see [`validate_placement`](crate::validate_placement)).
    pub fn new(class: ShipClass, orientation: Orientation, coords: &[Coordinate]) -> Self {
        Ship {
            class,
            orientation,
            parts: coords
                .iter()
                .map(|&coord| ShipPart { coord, hit: false })
                .collect(),
        }
    }

    pub fn class(&self) -> ShipClass {
        self.class
    }

    pub fn name(&self) -> &'static str {
        self.class.name()
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn parts(&self) -> &[ShipPart] {
        &self.parts
    }

    pub fn coords(&self) -> impl Iterator<Item = Coordinate> + '_ {
        self.parts.iter().map(|p| p.coord)
    }

    pub fn occupies(&self, coord: Coordinate) -> bool {
        self.parts.iter().any(|p| p.coord == coord)
    }

    /// Flag the part at `coord` as hit. Returns `false` if this ship has no
    /// part there.
    pub fn register_hit(&mut self, coord: Coordinate) -> bool {
        match self.parts.iter_mut().find(|p| p.coord == coord) {
            Some(part) => {
                part.hit = true;
                true
            }
            None => false,
        }
    }

    /// A ship is sunk iff every part has been hit.
    pub fn is_sunk(&self) -> bool {
        self.parts.iter().all(|p| p.hit)
    }
}

/// The five ships of one player. Membership is fixed once built.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "std", serde(transparent))]
pub struct Fleet {
    ships: Vec<Ship>,
}

impl Fleet {
    pub(crate) fn from_ships(ships: Vec<Ship>) -> Self {
        Fleet { ships }
    }

    pub fn ships(&self) -> &[Ship] {
        &self.ships
    }

    /// Index of the ship with a part at `coord`. Parts never share a cell,
    /// so there is at most one.
    pub fn ship_at(&self, coord: Coordinate) -> Option<usize> {
        self.ships.iter().position(|s| s.occupies(coord))
    }

    pub(crate) fn ship_mut(&mut self, index: usize) -> Option<&mut Ship> {
        self.ships.get_mut(index)
    }

    pub fn ships_remaining(&self) -> usize {
        self.ships.iter().filter(|s| !s.is_sunk()).count()
    }

    pub fn all_sunk(&self) -> bool {
        self.ships.iter().all(Ship::is_sunk)
    }
}
