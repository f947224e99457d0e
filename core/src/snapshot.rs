use alloc::vec::Vec;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::*;

/// Cell-by-cell copy of an engine's board: value, revealed and flagged per cell.
///
/// Two games ended in the same configuration iff their snapshots are equal.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoardSnapshot {
    pub size: Coord,
    pub state: EngineState,
    pub values: Array2<CellValue>,
    pub revealed: Array2<bool>,
    pub flagged: Array2<bool>,
}

impl BoardSnapshot {
    pub fn from_engine(engine: &Engine) -> Self {
        let size = engine.size();
        let shape = (size, size).to_nd_index();
        let mut values = Array2::default(shape);
        let mut revealed = Array2::from_elem(shape, false);
        let mut flagged = Array2::from_elem(shape, false);

        for coords in iter_coords(size) {
            let index = coords.to_nd_index();
            let cell = engine.cell_at(coords);
            values[index] = engine.value_at(coords);
            revealed[index] = cell.is_revealed();
            flagged[index] = cell.is_flagged();
        }

        Self {
            size,
            state: engine.state(),
            values,
            revealed,
            flagged,
        }
    }

    /// Revealed cells only, in the same shape a reveal hands out, for redrawing a board from scratch.
    pub fn revealed_cells(&self) -> Vec<RevealedCell> {
        iter_coords(self.size)
            .filter(|&coords| self.revealed[coords.to_nd_index()])
            .map(|coords| RevealedCell {
                coords,
                value: self.values[coords.to_nd_index()],
            })
            .collect()
    }

    /// First cell where the two boards disagree, if any.
    pub fn first_difference(&self, other: &Self) -> Option<Coord2> {
        if self.size != other.size {
            return Some((0, 0));
        }
        iter_coords(self.size).find(|&coords| {
            let index = coords.to_nd_index();
            self.values[index] != other.values[index]
                || self.revealed[index] != other.revealed[index]
                || self.flagged[index] != other.flagged[index]
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> Engine {
        let layout = MineLayout::from_mine_coords(2, &[(0, 0)]).unwrap();
        Engine::with_mine_layout(GameConfig::new(2, 1).unwrap(), layout).unwrap()
    }

    #[test]
    fn from_engine_maps_revealed_and_flagged_cells() {
        let mut engine = engine();
        engine.reveal((1, 1)).unwrap();
        engine.toggle_flag((0, 0)).unwrap();

        let snapshot = BoardSnapshot::from_engine(&engine);

        assert_eq!(snapshot.state, EngineState::InProgress);
        assert!(snapshot.revealed[(1, 1)]);
        assert_eq!(snapshot.values[(1, 1)], CellValue::Count(1));
        assert_eq!(snapshot.values[(0, 0)], CellValue::Mine);
        assert!(snapshot.flagged[(0, 0)]);
        assert!(!snapshot.revealed[(0, 0)]);
    }

    #[test]
    fn revealed_cells_skip_hidden_ones() {
        let mut engine = engine();
        engine.reveal((0, 1)).unwrap();

        let cells = BoardSnapshot::from_engine(&engine).revealed_cells();

        assert_eq!(
            cells,
            [RevealedCell {
                coords: (0, 1),
                value: CellValue::Count(1)
            }]
        );
    }

    #[test]
    fn first_difference_finds_diverging_cell() {
        let mut a = engine();
        let mut b = engine();
        a.reveal((1, 0)).unwrap();
        b.reveal((1, 0)).unwrap();
        assert_eq!(
            BoardSnapshot::from_engine(&a).first_difference(&BoardSnapshot::from_engine(&b)),
            None
        );

        b.toggle_flag((1, 1)).unwrap();
        assert_eq!(
            BoardSnapshot::from_engine(&a).first_difference(&BoardSnapshot::from_engine(&b)),
            Some((1, 1))
        );
    }
}
