//! # Tree Store — Per-Level Flat Arrays
//!
//! The fractal is stored level by level. Level 0 holds the root, level `L`
//! holds `5^L` parts, and each level carries a matrix array of the same
//! length. There are no parent pointers: the parent of part `i` at level `L`
//! is part `i / 5` at level `L - 1`.
//!
//! ```text
//!  level 0   [R]
//!             │
//!  level 1   [0 1 2 3 4]                 parent(i) = i / 5
//!             │ ...       │
//!  level 2   [0 1 2 3 4 | 5 6 7 8 9 | ... 24]
//! ```
//!
//! Allocation is all-or-nothing. An out-of-range depth is rejected before any
//! array is created, and allocating an already-populated store throws the old
//! levels away first. Nothing is resized in place.

use super::descriptor::CHILD_COUNT;
use super::part::FractalPart;
use crate::error::{FractalError, Result};
use crate::math::Mat4;

/// Smallest supported depth.
pub const MIN_DEPTH: u32 = 1;
/// Largest supported depth.
pub const MAX_DEPTH: u32 = 8;

/// One depth level: its parts and their instance matrices, index-aligned.
#[derive(Debug, Clone)]
pub struct Level {
    pub parts: Vec<FractalPart>,
    pub matrices: Vec<Mat4>,
}

impl Level {
    fn with_len(len: usize) -> Self {
        Self {
            parts: vec![FractalPart::default(); len],
            matrices: vec![Mat4::IDENTITY; len],
        }
    }

    /// Number of instances on this level.
    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }
}

/// Owns every level of one fractal instance.
#[derive(Debug, Clone, Default)]
pub struct FractalTree {
    levels: Vec<Level>,
}

impl FractalTree {
    /// An empty, unallocated store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate `depth` levels, releasing whatever was there before.
    ///
    /// Fails with [`FractalError::InvalidConfiguration`] when `depth` is
    /// outside `MIN_DEPTH..=MAX_DEPTH`; the store is left untouched.
    pub fn allocate(&mut self, depth: u32) -> Result<()> {
        validate_depth(depth)?;
        self.release();
        self.levels = (0..depth as usize).map(|l| Level::with_len(level_len(l))).collect();
        log::debug!(
            "Allocated fractal tree: depth {depth}, {} parts",
            self.total_parts()
        );
        Ok(())
    }

    /// Free all levels. A no-op on a store that was never allocated.
    pub fn release(&mut self) {
        self.levels = Vec::new();
    }

    pub fn is_allocated(&self) -> bool {
        !self.levels.is_empty()
    }

    /// Number of levels (0 when unallocated).
    pub fn depth(&self) -> usize {
        self.levels.len()
    }

    pub fn levels(&self) -> &[Level] {
        &self.levels
    }

    pub(crate) fn levels_mut(&mut self) -> &mut [Level] {
        &mut self.levels
    }

    pub fn level(&self, level: usize) -> &Level {
        &self.levels[level]
    }

    pub(crate) fn level_mut(&mut self, level: usize) -> &mut Level {
        &mut self.levels[level]
    }

    /// The root part. Panics if the store is unallocated.
    pub fn root(&self) -> &FractalPart {
        &self.levels[0].parts[0]
    }

    /// Sum of parts over all levels.
    pub fn total_parts(&self) -> usize {
        self.levels.iter().map(Level::len).sum()
    }
}

/// Reject depths outside the supported range.
pub fn validate_depth(depth: u32) -> Result<()> {
    if !(MIN_DEPTH..=MAX_DEPTH).contains(&depth) {
        return Err(FractalError::InvalidConfiguration(format!(
            "depth {depth} is outside {MIN_DEPTH}..={MAX_DEPTH}"
        )));
    }
    Ok(())
}

/// Number of parts on `level`: `5^level`.
pub fn level_len(level: usize) -> usize {
    CHILD_COUNT.pow(level as u32)
}

/// Index of the parent (on the previous level) of the part at `index`.
pub fn parent_index(index: usize) -> usize {
    index / CHILD_COUNT
}
