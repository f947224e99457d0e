#![no_std]

extern crate alloc;

use alloc::vec::Vec;
use core::ops::{Index, IndexMut};
use ndarray::Array2;
use serde::{Deserialize, Serialize};

pub use engine::*;
pub use error::*;
pub use generator::*;
pub use record::*;
pub use replay::*;
pub use snapshot::*;
pub use store::*;
pub use tile::*;
pub use types::*;

mod engine;
mod error;
mod generator;
mod record;
mod replay;
mod snapshot;
mod store;
mod tile;
mod types;

/// Square board parameters, only constructible through [`GameConfig::new`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    size: Coord,
    mines: CellCount,
}

impl GameConfig {
    pub fn new(size: Coord, mines: CellCount) -> Result<Self, ConfigError> {
        if size == 0 {
            return Err(ConfigError::ZeroSize);
        }
        if mines == 0 {
            return Err(ConfigError::NoMines);
        }
        if mines >= mult(size, size) {
            return Err(ConfigError::TooManyMines { size, mines });
        }
        Ok(Self { size, mines })
    }

    pub const fn size(&self) -> Coord {
        self.size
    }

    pub const fn mines(&self) -> CellCount {
        self.mines
    }

    pub const fn total_cells(&self) -> CellCount {
        mult(self.size, self.size)
    }

    pub const fn safe_cell_count(&self) -> CellCount {
        self.total_cells() - self.mines
    }

    pub fn validate_coords(&self, coords: Coord2) -> Result<Coord2> {
        if coords.0 < self.size && coords.1 < self.size {
            Ok(coords)
        } else {
            Err(GameError::InvalidCoords)
        }
    }
}

/// Serialized as the bare mine mask; the mine count is always recounted from it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "Array2<bool>", into = "Array2<bool>")]
pub struct MineLayout {
    mine_mask: Array2<bool>,
    mine_count: CellCount,
}

impl From<Array2<bool>> for MineLayout {
    fn from(mine_mask: Array2<bool>) -> Self {
        Self::from_mine_mask(mine_mask)
    }
}

impl From<MineLayout> for Array2<bool> {
    fn from(layout: MineLayout) -> Self {
        layout.mine_mask
    }
}

impl MineLayout {
    pub fn from_mine_mask(mine_mask: Array2<bool>) -> Self {
        // at most `Coord::MAX²` cells, which fits `CellCount`
        let mine_count = mine_mask.iter().filter(|&&is_mine| is_mine).count() as CellCount;
        Self {
            mine_mask,
            mine_count,
        }
    }

    /// Builds a square layout, duplicate coordinates collapse into one mine.
    pub fn from_mine_coords(size: Coord, mine_coords: &[Coord2]) -> Result<Self> {
        let mut mine_mask: Array2<bool> = Array2::default((size, size).to_nd_index());

        for &coords in mine_coords {
            if coords.0 >= size || coords.1 >= size {
                return Err(GameError::InvalidCoords);
            }
            mine_mask[coords.to_nd_index()] = true;
        }

        Ok(Self::from_mine_mask(mine_mask))
    }

    pub fn size(&self) -> Coord {
        self.mine_mask.dim().0 as Coord
    }

    pub fn mine_count(&self) -> CellCount {
        self.mine_count
    }

    pub fn total_cells(&self) -> CellCount {
        self.mine_mask.len() as CellCount
    }

    pub fn safe_cell_count(&self) -> CellCount {
        self.total_cells() - self.mine_count
    }

    pub fn contains_mine(&self, coords: Coord2) -> bool {
        self[coords]
    }

    /// Whether this layout can back a game played with `config`.
    pub fn fits(&self, config: &GameConfig) -> bool {
        let (dim_x, dim_y) = self.mine_mask.dim();
        dim_x == dim_y
            && dim_x == usize::from(config.size())
            && self.mine_count == config.mines()
    }

    /// Mine positions in `x`-major order.
    pub fn mine_coords(&self) -> Vec<Coord2> {
        iter_coords(self.size())
            .filter(|&coords| self[coords])
            .collect()
    }

    pub fn adjacent_mine_count(&self, coords: Coord2) -> u8 {
        // never more than 8 neighbours
        self.mine_mask
            .iter_neighbors(coords)
            .filter(|&pos| self[pos])
            .count() as u8
    }

    pub fn value_at(&self, coords: Coord2) -> CellValue {
        if self[coords] {
            CellValue::Mine
        } else {
            CellValue::Count(self.adjacent_mine_count(coords))
        }
    }

    /// Full board of values, mines keep [`CellValue::Mine`] and never get a count.
    pub fn cell_values(&self) -> Array2<CellValue> {
        let size = self.size();
        let mut values = Array2::default((size, size).to_nd_index());
        for coords in iter_coords(size) {
            values[coords.to_nd_index()] = self.value_at(coords);
        }
        values
    }
}

impl Index<Coord2> for MineLayout {
    type Output = bool;

    fn index(&self, (x, y): Coord2) -> &Self::Output {
        &self.mine_mask[(x as usize, y as usize)]
    }
}

impl IndexMut<Coord2> for MineLayout {
    fn index_mut(&mut self, (x, y): Coord2) -> &mut Self::Output {
        &mut self.mine_mask[(x as usize, y as usize)]
    }
}

/// A single cell opened by a reveal, handed to the presentation layer as-is.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevealedCell {
    pub coords: Coord2,
    pub value: CellValue,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RevealOutcome {
    /// Game over, or the target was already revealed or flagged.
    Invalid,
    NoMine,
    Exploded,
    Won,
}

impl RevealOutcome {
    pub const fn has_update(self) -> bool {
        !matches!(self, Self::Invalid)
    }

    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Exploded | Self::Won)
    }

    /// The move log entry this outcome produces, `None` for no-ops.
    pub const fn move_outcome(self) -> Option<MoveOutcome> {
        match self {
            Self::Invalid => None,
            Self::NoMine => Some(MoveOutcome::NoMine),
            Self::Exploded => Some(MoveOutcome::Exploded),
            Self::Won => Some(MoveOutcome::Won),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevealResult {
    pub revealed: Vec<RevealedCell>,
    pub outcome: RevealOutcome,
}

impl RevealResult {
    pub const fn invalid() -> Self {
        Self {
            revealed: Vec::new(),
            outcome: RevealOutcome::Invalid,
        }
    }
}
