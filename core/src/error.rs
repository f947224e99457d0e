use thiserror::Error;

use crate::{CellCount, Coord};

/// Rejected `(size, mines)` combination, an engine is never built from one.
#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Board size must be positive")]
    ZeroSize,
    #[error("Mine count must be positive")]
    NoMines,
    #[error("Too many mines: {mines} mines do not fit a {size}x{size} board")]
    TooManyMines { size: Coord, mines: CellCount },
}

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("Invalid coordinates")]
    InvalidCoords,
    #[error("Cannot place {mines} mines, only {available} cells outside the safe zone")]
    Placement {
        mines: CellCount,
        available: CellCount,
    },
    #[error("Mine layout does not match the game configuration")]
    LayoutMismatch,
    #[error("Mines were already placed for this game")]
    AlreadyPlaced,
}

pub type Result<T, E = GameError> = core::result::Result<T, E>;
