//! Grid coordinates and the `<Letter><Number>` key codec.
//!
//! A [`Coordinate`] is always on the grid: it can only be built through the
//! checked constructors, so code holding one never re-validates bounds. The
//! letter names the row (`A` = row 0) and the number names the column
//! (`1` = column 0), so `"C7"` is row 2, column 6.

use alloc::string::{String, ToString};
use core::fmt;
use core::str::FromStr;

use crate::common::CoordError;
use crate::config::{BOARD_SIZE, CELL_COUNT, ROW_LETTERS};

const N: usize = BOARD_SIZE as usize;

/// A cell address on the 10x10 grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Coordinate {
    row: u8,
    col: u8,
}

impl Coordinate {
    /// Returns `None` if either index is outside `0..10`.
    pub const fn new(row: usize, col: usize) -> Option<Self> {
        if row < N && col < N {
            Some(Coordinate {
                row: row as u8,
                col: col as u8,
            })
        } else {
            None
        }
    }

    /// Like [`Coordinate::new`] for signed input such as drag positions.
    pub fn from_signed(row: i32, col: i32) -> Option<Self> {
        if row < 0 || col < 0 {
            return None;
        }
        Self::new(row as usize, col as usize)
    }

    /// Row-major cell index in `0..100`.
    pub fn from_index(index: usize) -> Option<Self> {
        if index < CELL_COUNT {
            Self::new(index / N, index % N)
        } else {
            None
        }
    }

    pub const fn row(self) -> usize {
        self.row as usize
    }

    pub const fn col(self) -> usize {
        self.col as usize
    }

    pub const fn index(self) -> usize {
        self.row as usize * N + self.col as usize
    }

    /// Every coordinate in row-major order.
    pub fn all() -> impl Iterator<Item = Coordinate> {
        (0..CELL_COUNT).filter_map(Coordinate::from_index)
    }

    /// Canonical key form, e.g. `"C7"`.
    pub fn to_key(self) -> String {
        self.to_string()
    }

    /// Parse a key such as `"C7"` (case-insensitive, surrounding whitespace
    /// ignored).
    pub fn from_key(key: &str) -> Result<Self, CoordError> {
        key.parse()
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", ROW_LETTERS[self.row as usize], self.col + 1)
    }
}

impl FromStr for Coordinate {
    type Err = CoordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || CoordError::Malformed(s.to_string());
        let key = s.trim();
        let mut chars = key.chars();
        let letter = chars.next().ok_or_else(malformed)?.to_ascii_uppercase();
        if !letter.is_ascii_uppercase() {
            return Err(malformed());
        }
        let digits = chars.as_str();
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(malformed());
        }
        let number: i64 = digits.parse().map_err(|_| malformed())?;
        let row = i64::from(letter as u8 - b'A');
        let col = number - 1;
        if row >= N as i64 || col < 0 || col >= N as i64 {
            return Err(CoordError::OutOfRange { row, col });
        }
        Ok(Coordinate {
            row: row as u8,
            col: col as u8,
        })
    }
}

impl TryFrom<&str> for Coordinate {
    type Error = CoordError;

    fn try_from(key: &str) -> Result<Self, Self::Error> {
        key.parse()
    }
}

impl TryFrom<&String> for Coordinate {
    type Error = CoordError;

    fn try_from(key: &String) -> Result<Self, Self::Error> {
        key.parse()
    }
}

impl TryFrom<(usize, usize)> for Coordinate {
    type Error = CoordError;

    fn try_from((row, col): (usize, usize)) -> Result<Self, Self::Error> {
        Coordinate::new(row, col).ok_or(CoordError::OutOfRange {
            row: row as i64,
            col: col as i64,
        })
    }
}

#[cfg(feature = "std")]
impl serde::Serialize for Coordinate {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(feature = "std")]
impl<'de> serde::Deserialize<'de> for Coordinate {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let key = String::deserialize(deserializer)?;
        key.parse().map_err(serde::de::Error::custom)
    }
}

/// Raw `(row, col)` under a pixel position, using floor division like the
/// grid drawing code does. The result may lie off the grid; a non-positive
/// or non-finite cell size maps to `(-1, -1)`.
pub fn from_pixel(x: f32, y: f32, origin_x: f32, origin_y: f32, cell_size: f32) -> (i32, i32) {
    let valid = cell_size > 0.0
        && [x, y, origin_x, origin_y, cell_size]
            .iter()
            .all(|v| v.is_finite());
    if !valid {
        return (-1, -1);
    }
    let row = libm::floorf((y - origin_y) / cell_size);
    let col = libm::floorf((x - origin_x) / cell_size);
    // `as` saturates at the i32 range.
    (row as i32, col as i32)
}

/// Clamp a raw `(row, col)` pair onto the grid. Used for freeform drag
/// input, where drops outside the grid are legal.
pub fn clamp_to_grid(row: i32, col: i32) -> Coordinate {
    let max = N as i32 - 1;
    Coordinate {
        row: row.clamp(0, max) as u8,
        col: col.clamp(0, max) as u8,
    }
}
