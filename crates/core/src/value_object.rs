//! Value objects: equality by value, not identity.
//!
//! The grid coordinate is the main value object of this domain: two `GridPos`
//! with the same `x`/`y` denote the same cell, whatever stack sits on it.

use serde::{Deserialize, Serialize};

/// Marker trait for value objects (immutable, compared by value).
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}

/// One cell of an inventory grid.
///
/// Ordering is row-major (`y` first, then `x`), which is the scan order used
/// by free-cell search and stack-first allocation.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridPos {
    pub x: u32,
    pub y: u32,
}

impl GridPos {
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// Whether this cell lies inside a `width × height` grid.
    pub fn within(&self, width: u32, height: u32) -> bool {
        self.x < width && self.y < height
    }

    /// Build a cell from a row-major linear index.
    ///
    /// `width` of 0 is treated as 1 so the conversion stays total.
    pub fn from_linear(index: u32, width: u32) -> Self {
        let w = width.max(1);
        Self::new(index % w, index / w)
    }
}

impl ValueObject for GridPos {}

impl Ord for GridPos {
    fn cmp(&self, other: &Self) -> core::cmp::Ordering {
        (self.y, self.x).cmp(&(other.y, other.x))
    }
}

impl PartialOrd for GridPos {
    fn partial_cmp(&self, other: &Self) -> Option<core::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl core::fmt::Display for GridPos {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "({},{})", self.x, self.y)
    }
}
