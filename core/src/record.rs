use alloc::string::String;
use alloc::vec::Vec;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::*;

/// How a logged reveal ended.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveOutcome {
    NoMine,
    Exploded,
    Won,
}

impl MoveOutcome {
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Exploded | Self::Won)
    }

    pub const fn reveal_outcome(self) -> RevealOutcome {
        match self {
            Self::NoMine => RevealOutcome::NoMine,
            Self::Exploded => RevealOutcome::Exploded,
            Self::Won => RevealOutcome::Won,
        }
    }
}

/// One entry of the move log, flag toggles are never logged.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Move {
    /// 1-based, incremented once per accepted reveal.
    pub move_number: u32,
    pub x: Coord,
    pub y: Coord,
    pub outcome: MoveOutcome,
}

impl Move {
    pub const fn coords(&self) -> Coord2 {
        (self.x, self.y)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameResult {
    Win,
    Lose,
    InProgress,
}

impl From<EngineState> for GameResult {
    fn from(state: EngineState) -> Self {
        match state {
            EngineState::Won => Self::Win,
            EngineState::Lost => Self::Lose,
            EngineState::NotStarted | EngineState::InProgress => Self::InProgress,
        }
    }
}

/// Everything needed to replay a finished (or abandoned) game.
///
/// Written once by the persistence layer and never changed afterwards.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameRecord {
    pub timestamp: DateTime<Utc>,
    pub player_label: String,
    pub size: Coord,
    pub mines_count: CellCount,
    pub mine_layout: Vec<Coord2>,
    pub moves: Vec<Move>,
    pub final_result: GameResult,
}

impl GameRecord {
    pub fn game_config(&self) -> Result<GameConfig> {
        Ok(GameConfig::new(self.size, self.mines_count)?)
    }

    /// Layout as stored, `None` for a game abandoned before its first reveal.
    pub fn layout(&self) -> Result<Option<MineLayout>> {
        if self.mine_layout.is_empty() {
            return Ok(None);
        }
        MineLayout::from_mine_coords(self.size, &self.mine_layout).map(Some)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}
