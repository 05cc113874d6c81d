//! Map coordinates and facing directions.
//!
//! Positions are stored as `f64` map coordinates where the integer part is
//! the tile and the fractional part is the offset within that tile. The y
//! axis grows southward, the x axis grows eastward.

use serde::{Deserialize, Serialize};

/// Axis bits used to compose a [`Direction`].
///
/// A movement direction is computed as at most one north/south bit combined
/// with at most one east/west bit.
pub mod axis {
    /// Moving toward smaller y.
    pub const NORTH: u8 = 0b0001;
    /// Moving toward larger y.
    pub const SOUTH: u8 = 0b0010;
    /// Moving toward smaller x.
    pub const WEST: u8 = 0b0100;
    /// Moving toward larger x.
    pub const EAST: u8 = 0b1000;
}

/// A position on the map in tile units.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MapPosition {
    /// Horizontal coordinate.
    pub x: f64,
    /// Vertical coordinate (grows southward).
    pub y: f64,
}

impl MapPosition {
    /// Create a position from its coordinates.
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Return true if both coordinates are within `tolerance` of `other`.
    pub fn is_within(&self, other: &Self, tolerance: f64) -> bool {
        is_float_equal(self.x, other.x, tolerance) && is_float_equal(self.y, other.y, tolerance)
    }

    /// Translate a relative offset into an absolute position using `origin`.
    ///
    /// The integer parts of the origin and the offset are summed while the
    /// offset's fractional part is kept untouched, so a destination authored
    /// at sub-tile precision keeps that precision wherever the actor starts.
    pub fn offset_from(&self, origin: &Self) -> Self {
        Self {
            x: float_integer(self.x) + float_integer(origin.x) + float_fraction(self.x),
            y: float_integer(self.y) + float_integer(origin.y) + float_fraction(self.y),
        }
    }
}

/// Integer part of a coordinate (truncated toward zero).
pub fn float_integer(value: f64) -> f64 {
    value.trunc()
}

/// Fractional part of a coordinate, carrying the sign of `value`.
pub fn float_fraction(value: f64) -> f64 {
    value.fract()
}

/// Compare two floats within an inclusive tolerance.
pub fn is_float_equal(a: f64, b: f64, tolerance: f64) -> bool {
    (a - b).abs() <= tolerance
}

/// The direction an actor faces or moves in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Toward smaller y.
    North,
    /// Toward larger y.
    South,
    /// Toward larger x.
    East,
    /// Toward smaller x.
    West,
    /// Diagonal north and west.
    NorthWest,
    /// Diagonal north and east.
    NorthEast,
    /// Diagonal south and west.
    SouthWest,
    /// Diagonal south and east.
    SouthEast,
}

impl Direction {
    /// The four axis-aligned facings.
    pub const CARDINALS: [Self; 4] = [Self::North, Self::South, Self::East, Self::West];

    /// Build a direction from a combination of [`axis`] bits.
    ///
    /// Matching north/south and east/west pairs collapse into one of the
    /// four diagonals; a single bit stays cardinal. Returns `None` for an
    /// empty mask or a contradictory one (north and south together).
    pub const fn from_axes(bits: u8) -> Option<Self> {
        match bits {
            axis::NORTH => Some(Self::North),
            axis::SOUTH => Some(Self::South),
            axis::EAST => Some(Self::East),
            axis::WEST => Some(Self::West),
            0b0101 => Some(Self::NorthWest),
            0b1001 => Some(Self::NorthEast),
            0b0110 => Some(Self::SouthWest),
            0b1010 => Some(Self::SouthEast),
            _ => None,
        }
    }

    /// Return the [`axis`] bits making up this direction.
    pub const fn axes(self) -> u8 {
        match self {
            Self::North => axis::NORTH,
            Self::South => axis::SOUTH,
            Self::East => axis::EAST,
            Self::West => axis::WEST,
            Self::NorthWest => axis::NORTH | axis::WEST,
            Self::NorthEast => axis::NORTH | axis::EAST,
            Self::SouthWest => axis::SOUTH | axis::WEST,
            Self::SouthEast => axis::SOUTH | axis::EAST,
        }
    }

    /// Return true for the four axis-aligned directions.
    pub const fn is_cardinal(self) -> bool {
        matches!(self, Self::North | Self::South | Self::East | Self::West)
    }

    /// Unit step `(dx, dy)` for one tile of movement in this direction.
    pub const fn step(self) -> (f64, f64) {
        match self {
            Self::North => (0.0, -1.0),
            Self::South => (0.0, 1.0),
            Self::East => (1.0, 0.0),
            Self::West => (-1.0, 0.0),
            Self::NorthWest => (-1.0, -1.0),
            Self::NorthEast => (1.0, -1.0),
            Self::SouthWest => (-1.0, 1.0),
            Self::SouthEast => (1.0, 1.0),
        }
    }
}
