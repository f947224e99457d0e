use crate::*;
pub use rejection::*;

mod rejection;

pub trait MineLayoutGenerator {
    /// Places `config.mines()` mines, keeping `start` and its neighbours clear.
    fn generate(self, config: GameConfig, start: Coord2) -> Result<MineLayout>;
}

/// Cells covered by the safe zone of `start`: the cell itself plus its clipped neighbourhood.
pub fn safe_zone_size(size: Coord, start: Coord2) -> CellCount {
    1 + NeighborIter::new(start, (size, size)).count() as CellCount
}
