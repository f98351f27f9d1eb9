//! Grid store — sparse map of placed pixels.
//!
//! DESIGN
//! ======
//! Cells that were never painted are absent rather than stored as a
//! background color, so snapshots only carry what has actually been placed.
//! Placement is last-write-wins with no history; the map never shrinks and
//! is bounded by `size * size` entries.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// One painted cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pixel {
    pub x: u32,
    pub y: u32,
    /// Palette index in `[0, 16)`.
    pub color: u8,
    /// Display name of the session that last painted this cell.
    pub owner: String,
}

#[derive(Debug)]
pub struct GridStore {
    size: u32,
    pixels: HashMap<(u32, u32), Pixel>,
}

impl GridStore {
    #[must_use]
    pub fn new(size: u32) -> Self {
        Self { size, pixels: HashMap::new() }
    }

    /// Side length of the square canvas.
    #[must_use]
    pub fn size(&self) -> u32 {
        self.size
    }

    #[must_use]
    pub fn get(&self, x: u32, y: u32) -> Option<&Pixel> {
        self.pixels.get(&(x, y))
    }

    /// Upsert the pixel at `(x, y)`. Callers validate bounds beforehand.
    pub fn set(&mut self, x: u32, y: u32, color: u8, owner: impl Into<String>) {
        debug_assert!(x < self.size && y < self.size, "pixel ({x}, {y}) outside {0}x{0} grid", self.size);
        let owner = owner.into();
        match self.pixels.get_mut(&(x, y)) {
            Some(pixel) => {
                pixel.color = color;
                pixel.owner = owner;
            }
            None => {
                self.pixels.insert((x, y), Pixel { x, y, color, owner });
            }
        }
    }

    /// Every painted pixel, in no particular order.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Pixel> {
        self.pixels.values().cloned().collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pixels.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }
}

#[cfg(test)]
#[path = "grid_test.rs"]
mod tests;
