use alloc::string::String;
use alloc::vec::Vec;
use chrono::{DateTime, Utc};
use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::*;

/// Identifier handed out by a [`GameStore`] for a saved record.
pub type GameId = u64;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Game {0} not found")]
    NotFound(GameId),
    #[error("Storage backend failed: {0}")]
    Backend(String),
    #[error(transparent)]
    Replay(#[from] ReplayError),
}

/// Listing entry for a saved game, without its layout and moves.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSummary {
    pub id: GameId,
    pub timestamp: DateTime<Utc>,
    pub player_label: String,
    pub size: Coord,
    pub mines_count: CellCount,
    pub final_result: GameResult,
}

impl GameSummary {
    pub fn new(id: GameId, record: &GameRecord) -> Self {
        Self {
            id,
            timestamp: record.timestamp,
            player_label: record.player_label.clone(),
            size: record.size,
            mines_count: record.mines_count,
            final_result: record.final_result,
        }
    }
}

/// Storage the game core saves finished games to and loads replays from.
///
/// Implementations assign ids and store each record exactly once; callers never retry.
pub trait GameStore {
    fn save_game_record(&mut self, record: &GameRecord) -> Result<GameId, StoreError>;

    fn get_game_record(&self, id: GameId) -> Result<Option<GameRecord>, StoreError>;

    fn save_move(&mut self, id: GameId, mv: &Move) -> Result<(), StoreError>;

    /// Moves of one game ordered by move number.
    fn moves_for_game(&self, id: GameId) -> Result<Vec<Move>, StoreError>;

    fn list_games(&self) -> Result<Vec<GameSummary>, StoreError>;
}

/// In-memory [`GameStore`] with auto-incrementing ids starting at 1.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    records: HashMap<GameId, GameRecord>,
    moves: HashMap<GameId, Vec<Move>>,
    last_id: GameId,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl GameStore for MemoryStore {
    fn save_game_record(&mut self, record: &GameRecord) -> Result<GameId, StoreError> {
        self.last_id += 1;
        let id = self.last_id;
        self.records.insert(id, record.clone());
        Ok(id)
    }

    fn get_game_record(&self, id: GameId) -> Result<Option<GameRecord>, StoreError> {
        Ok(self.records.get(&id).cloned())
    }

    fn save_move(&mut self, id: GameId, mv: &Move) -> Result<(), StoreError> {
        if !self.records.contains_key(&id) {
            return Err(StoreError::NotFound(id));
        }
        self.moves.entry(id).or_default().push(*mv);
        Ok(())
    }

    fn moves_for_game(&self, id: GameId) -> Result<Vec<Move>, StoreError> {
        let mut moves = self.moves.get(&id).cloned().unwrap_or_default();
        moves.sort_by_key(|mv| mv.move_number);
        Ok(moves)
    }

    fn list_games(&self) -> Result<Vec<GameSummary>, StoreError> {
        let mut games: Vec<_> = self
            .records
            .iter()
            .map(|(&id, record)| GameSummary::new(id, record))
            .collect();
        games.sort_by_key(|summary| summary.id);
        Ok(games)
    }
}

/// Saves the engine's record and then each of its moves.
///
/// The engine is only read, so a failed save never touches the game in memory.
pub fn persist_game<S: GameStore + ?Sized>(
    store: &mut S,
    engine: &Engine,
    player_label: impl Into<String>,
    timestamp: DateTime<Utc>,
) -> Result<GameId, StoreError> {
    let record = engine.record(player_label, timestamp);

    let id = store
        .save_game_record(&record)
        .inspect_err(|err| log::error!("Failed to save game: {}", err))?;
    for mv in &record.moves {
        store
            .save_move(id, mv)
            .inspect_err(|err| {
                log::error!("Failed to save move {} of game {}: {}", mv.move_number, id, err)
            })?;
    }

    log::debug!("Saved game {} with {} moves", id, record.moves.len());
    Ok(id)
}

/// Loads a saved game and its moves and prepares it for replay.
pub fn load_replay<S: GameStore + ?Sized>(store: &S, id: GameId) -> Result<Replay, StoreError> {
    let mut record = store.get_game_record(id)?.ok_or(StoreError::NotFound(id))?;
    record.moves = store.moves_for_game(id)?;
    Ok(Replay::new(&record)?)
}
