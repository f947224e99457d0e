use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;
use chrono::{DateTime, Utc};
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::*;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngineState {
    NotStarted,
    InProgress,
    Won,
    Lost,
}

impl EngineState {
    pub const fn is_not_started(self) -> bool {
        matches!(self, Self::NotStarted)
    }

    pub const fn is_finished(self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }
}

impl Default for EngineState {
    fn default() -> Self {
        Self::NotStarted
    }
}

/// A single game from the first click to the end.
///
/// Mines are placed lazily on the first reveal so the clicked cell and its neighbours are always safe. Every accepted
/// reveal is appended to the move log; flag toggles are not.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Engine {
    config: GameConfig,
    seed: u64,
    mine_layout: Option<MineLayout>,
    values: Array2<CellValue>,
    board: Array2<EngineCell>,
    revealed_count: CellCount,
    flagged_count: CellCount,
    state: EngineState,
    moves: Vec<Move>,
}

impl Engine {
    pub fn new(size: Coord, mines: CellCount, seed: u64) -> Result<Self, ConfigError> {
        GameConfig::new(size, mines).map(|config| Self::from_config(config, seed))
    }

    pub fn from_config(config: GameConfig, seed: u64) -> Self {
        let shape = (config.size(), config.size()).to_nd_index();
        Self {
            config,
            seed,
            mine_layout: None,
            values: Array2::default(shape),
            board: Array2::default(shape),
            revealed_count: 0,
            flagged_count: 0,
            state: Default::default(),
            moves: Vec::new(),
        }
    }

    /// Engine whose mines are fixed up front instead of being placed on the first reveal.
    pub fn with_mine_layout(config: GameConfig, mine_layout: MineLayout) -> Result<Self> {
        let mut engine = Self::from_config(config, 0);
        engine.pin_mine_layout(mine_layout)?;
        Ok(engine)
    }

    /// Skips random placement and takes `mine_layout` as this game's mines.
    pub fn pin_mine_layout(&mut self, mine_layout: MineLayout) -> Result<()> {
        if self.mine_layout.is_some() {
            return Err(GameError::AlreadyPlaced);
        }
        if !mine_layout.fits(&self.config) {
            return Err(GameError::LayoutMismatch);
        }
        self.assign_layout(mine_layout);
        Ok(())
    }

    pub fn config(&self) -> GameConfig {
        self.config
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn is_finished(&self) -> bool {
        self.state.is_finished()
    }

    pub fn size(&self) -> Coord {
        self.config.size()
    }

    pub fn total_mines(&self) -> CellCount {
        self.config.mines()
    }

    pub fn mines_left(&self) -> isize {
        (self.config.mines() as isize) - (self.flagged_count as isize)
    }

    pub fn revealed_count(&self) -> CellCount {
        self.revealed_count
    }

    pub fn flagged_count(&self) -> CellCount {
        self.flagged_count
    }

    /// `None` until the first reveal places the mines.
    pub fn mine_layout(&self) -> Option<&MineLayout> {
        self.mine_layout.as_ref()
    }

    pub fn moves(&self) -> &[Move] {
        &self.moves
    }

    pub fn cell_at(&self, coords: Coord2) -> EngineCell {
        self.board[coords.to_nd_index()]
    }

    /// Underlying value, all zero before mines are placed.
    pub fn value_at(&self, coords: Coord2) -> CellValue {
        self.values[coords.to_nd_index()]
    }

    /// Won iff every safe cell is revealed, flags play no part.
    pub fn check_win(&self) -> bool {
        self.mine_layout.is_some() && self.revealed_count == self.config.safe_cell_count()
    }

    pub fn reveal(&mut self, coords: Coord2) -> Result<RevealResult> {
        let coords = self.config.validate_coords(coords)?;

        if self.state.is_finished() || self.board[coords.to_nd_index()] != EngineCell::Hidden {
            return Ok(RevealResult::invalid());
        }

        if self.mine_layout.is_none() {
            let mine_layout = RejectionSampler::new(self.seed).generate(self.config, coords)?;
            self.assign_layout(mine_layout);
        }

        let (revealed, outcome) = if self.values[coords.to_nd_index()].is_mine() {
            self.board[coords.to_nd_index()] = EngineCell::Detonated;
            self.end_game(false);
            let cell = RevealedCell {
                coords,
                value: CellValue::Mine,
            };
            (vec![cell], RevealOutcome::Exploded)
        } else {
            let revealed = self.flood_reveal(coords);
            if self.check_win() {
                self.end_game(true);
                (revealed, RevealOutcome::Won)
            } else {
                self.mark_started();
                (revealed, RevealOutcome::NoMine)
            }
        };

        if let Some(move_outcome) = outcome.move_outcome() {
            self.log_move(coords, move_outcome);
        }

        Ok(RevealResult { revealed, outcome })
    }

    /// Flips the flag on a hidden cell, `false` when the game is over or the cell is revealed.
    pub fn toggle_flag(&mut self, coords: Coord2) -> Result<bool> {
        use EngineCell::*;

        let coords = self.config.validate_coords(coords)?;
        if self.state.is_finished() {
            return Ok(false);
        }

        Ok(match self.board[coords.to_nd_index()] {
            Hidden => {
                self.board[coords.to_nd_index()] = Flagged;
                self.flagged_count += 1;
                true
            }
            Flagged => {
                self.board[coords.to_nd_index()] = Hidden;
                self.flagged_count -= 1;
                true
            }
            Revealed(_) | Detonated => false,
        })
    }

    /// Everything the persistence layer needs to store this game.
    pub fn record(&self, player_label: impl Into<String>, timestamp: DateTime<Utc>) -> GameRecord {
        GameRecord {
            timestamp,
            player_label: player_label.into(),
            size: self.config.size(),
            mines_count: self.config.mines(),
            mine_layout: self
                .mine_layout
                .as_ref()
                .map(MineLayout::mine_coords)
                .unwrap_or_default(),
            moves: self.moves.clone(),
            final_result: self.state.into(),
        }
    }

    fn assign_layout(&mut self, mine_layout: MineLayout) {
        self.values = mine_layout.cell_values();
        self.mine_layout = Some(mine_layout);
    }

    /// Opens `start` and spreads through zero cells with an explicit stack, stopping at flags.
    fn flood_reveal(&mut self, start: Coord2) -> Vec<RevealedCell> {
        let mut revealed = Vec::new();
        let mut to_visit = vec![start];

        while let Some(visit_coords) = to_visit.pop() {
            if self.board[visit_coords.to_nd_index()] != EngineCell::Hidden {
                continue;
            }

            let value = self.values[visit_coords.to_nd_index()];
            let CellValue::Count(count) = value else {
                // zero cells have no mine neighbours, so the fill never reaches one
                continue;
            };
            self.board[visit_coords.to_nd_index()] = EngineCell::Revealed(count);
            self.revealed_count += 1;
            revealed.push(RevealedCell {
                coords: visit_coords,
                value,
            });

            if count == 0 {
                let size = self.config.size();
                to_visit.extend(
                    NeighborIter::new(visit_coords, (size, size))
                        .filter(|&pos| self.board[pos.to_nd_index()] == EngineCell::Hidden),
                );
            }
        }

        log::trace!("Revealed {} cells from {:?}", revealed.len(), start);
        revealed
    }

    fn log_move(&mut self, coords: Coord2, outcome: MoveOutcome) {
        // one entry per accepted reveal, bounded by the cell count
        let move_number = self.moves.len() as u32 + 1;
        log::debug!("move {}: {:?} -> {:?}", move_number, coords, outcome);
        self.moves.push(Move {
            move_number,
            x: coords.0,
            y: coords.1,
            outcome,
        });
    }

    fn mark_started(&mut self) {
        if self.state.is_not_started() {
            log::debug!("game started");
            self.state = EngineState::InProgress;
        }
    }

    fn end_game(&mut self, won: bool) {
        if self.state.is_finished() {
            return;
        }

        self.state = if won {
            EngineState::Won
        } else {
            EngineState::Lost
        };
        log::debug!("game ended: {:?}", self.state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(size: Coord, mines: CellCount) -> GameConfig {
        GameConfig::new(size, mines).unwrap()
    }

    fn engine_with(size: Coord, mines: &[Coord2]) -> Engine {
        let layout = MineLayout::from_mine_coords(size, mines).unwrap();
        Engine::with_mine_layout(config(size, layout.mine_count()), layout).unwrap()
    }

    fn cell(x: Coord, y: Coord, value: CellValue) -> RevealedCell {
        RevealedCell {
            coords: (x, y),
            value,
        }
    }

    #[test]
    fn construction_rejects_bad_config() {
        assert_eq!(Engine::new(0, 1, 0), Err(ConfigError::ZeroSize));
        assert_eq!(Engine::new(2, 0, 0), Err(ConfigError::NoMines));
        assert_eq!(
            Engine::new(2, 4, 0),
            Err(ConfigError::TooManyMines { size: 2, mines: 4 })
        );
    }

    #[test]
    fn new_engine_is_blank() {
        let engine = Engine::new(4, 3, 0).unwrap();

        assert_eq!(engine.state(), EngineState::NotStarted);
        assert!(engine.mine_layout().is_none());
        assert!(engine.moves().is_empty());
        for coords in iter_coords(4) {
            assert_eq!(engine.cell_at(coords), EngineCell::Hidden);
            assert_eq!(engine.value_at(coords), CellValue::Count(0));
        }
    }

    #[test]
    fn two_by_two_game_is_won_after_three_reveals() {
        let mut engine = engine_with(2, &[(1, 1)]);

        let first = engine.reveal((0, 0)).unwrap();
        assert_eq!(first.revealed, [cell(0, 0, CellValue::Count(1))]);
        assert_eq!(first.outcome, RevealOutcome::NoMine);

        let second = engine.reveal((0, 1)).unwrap();
        assert_eq!(second.revealed, [cell(0, 1, CellValue::Count(1))]);
        assert_eq!(second.outcome, RevealOutcome::NoMine);

        let third = engine.reveal((1, 0)).unwrap();
        assert_eq!(third.revealed, [cell(1, 0, CellValue::Count(1))]);
        assert_eq!(third.outcome, RevealOutcome::Won);

        assert_eq!(engine.state(), EngineState::Won);
        let outcomes: Vec<_> = engine.moves().iter().map(|m| m.outcome).collect();
        assert_eq!(
            outcomes,
            [MoveOutcome::NoMine, MoveOutcome::NoMine, MoveOutcome::Won]
        );
        let numbers: Vec<_> = engine.moves().iter().map(|m| m.move_number).collect();
        assert_eq!(numbers, [1, 2, 3]);
    }

    #[test]
    fn reveal_on_revealed_cell_is_invalid_and_not_logged() {
        let mut engine = engine_with(3, &[(2, 2)]);
        engine.reveal((1, 1)).unwrap();

        let again = engine.reveal((1, 1)).unwrap();

        assert_eq!(again, RevealResult::invalid());
        assert_eq!(engine.moves().len(), 1);
    }

    #[test]
    fn toggle_flag_on_revealed_cell_is_rejected() {
        let mut engine = engine_with(3, &[(2, 2)]);
        engine.reveal((1, 1)).unwrap();

        assert_eq!(engine.toggle_flag((1, 1)), Ok(false));
        assert_eq!(engine.cell_at((1, 1)), EngineCell::Revealed(1));
        assert_eq!(engine.flagged_count(), 0);
    }

    #[test]
    fn first_reveal_keeps_neighbourhood_safe() {
        for seed in 0..64 {
            let start = ((seed % 9) as Coord, (seed / 9 % 9) as Coord);
            let mut engine = Engine::new(9, 30, seed).unwrap();

            let result = engine.reveal(start).unwrap();

            assert_ne!(result.outcome, RevealOutcome::Exploded);
            let layout = engine.mine_layout().unwrap();
            assert_eq!(layout.mine_count(), 30);
            assert!(!layout.contains_mine(start));
            for pos in NeighborIter::new(start, (9, 9)) {
                assert!(!layout.contains_mine(pos));
            }
            assert_eq!(engine.value_at(start), CellValue::Count(0));
        }
    }

    #[test]
    fn flood_fill_stops_at_numbered_border() {
        let wall = [(2, 0), (2, 1), (2, 2), (2, 3), (2, 4)];
        let mut engine = engine_with(5, &wall);

        let result = engine.reveal((0, 0)).unwrap();

        assert_eq!(result.outcome, RevealOutcome::NoMine);
        assert_eq!(result.revealed.len(), 10);
        assert_eq!(engine.revealed_count(), 10);
        for y in 0..5 {
            assert_eq!(engine.cell_at((0, y)), EngineCell::Revealed(0));
            assert!(engine.cell_at((1, y)).is_revealed());
            assert_eq!(engine.cell_at((3, y)), EngineCell::Hidden);
        }
        assert_eq!(engine.cell_at((1, 0)), EngineCell::Revealed(2));
        assert_eq!(engine.cell_at((1, 2)), EngineCell::Revealed(3));
    }

    #[test]
    fn flood_fill_skips_flagged_cells() {
        let wall = [(2, 0), (2, 1), (2, 2), (2, 3), (2, 4)];
        let mut engine = engine_with(5, &wall);
        assert_eq!(engine.toggle_flag((0, 4)), Ok(true));

        let result = engine.reveal((0, 0)).unwrap();

        assert_eq!(result.revealed.len(), 9);
        assert_eq!(engine.cell_at((0, 4)), EngineCell::Flagged);
        assert_eq!(engine.cell_at((1, 4)), EngineCell::Revealed(2));
    }

    #[test]
    fn numbered_cell_reveals_only_itself() {
        let mut engine = engine_with(5, &[(2, 2)]);

        let result = engine.reveal((1, 1)).unwrap();

        assert_eq!(result.revealed, [cell(1, 1, CellValue::Count(1))]);
        assert_eq!(engine.revealed_count(), 1);
    }

    #[test]
    fn zero_region_on_open_board_wins_at_once() {
        let mut engine = engine_with(3, &[(2, 2)]);

        let result = engine.reveal((0, 0)).unwrap();

        assert_eq!(result.outcome, RevealOutcome::Won);
        assert_eq!(result.revealed.len(), 8);
        assert_eq!(engine.state(), EngineState::Won);
        assert_eq!(engine.cell_at((2, 2)), EngineCell::Hidden);
    }

    #[test]
    fn hitting_a_mine_ends_the_game() {
        let mut engine = engine_with(3, &[(0, 0)]);
        engine.reveal((1, 1)).unwrap();

        let result = engine.reveal((0, 0)).unwrap();

        assert_eq!(result.outcome, RevealOutcome::Exploded);
        assert_eq!(result.revealed, [cell(0, 0, CellValue::Mine)]);
        assert_eq!(engine.state(), EngineState::Lost);
        assert_eq!(engine.cell_at((0, 0)), EngineCell::Detonated);
        assert_eq!(
            engine.moves().last().map(|m| m.outcome),
            Some(MoveOutcome::Exploded)
        );
    }

    #[test]
    fn finished_game_ignores_further_actions() {
        let mut engine = engine_with(3, &[(0, 0)]);
        engine.reveal((0, 0)).unwrap();
        let before = engine.clone();

        assert_eq!(engine.reveal((1, 1)).unwrap(), RevealResult::invalid());
        assert_eq!(engine.toggle_flag((2, 2)), Ok(false));
        assert_eq!(engine, before);
    }

    #[test]
    fn flags_do_not_count_towards_winning() {
        let mut engine = engine_with(2, &[(1, 1)]);
        engine.toggle_flag((1, 1)).unwrap();
        engine.reveal((0, 0)).unwrap();

        assert!(!engine.check_win());
        assert_eq!(engine.mines_left(), 0);

        engine.reveal((0, 1)).unwrap();
        engine.reveal((1, 0)).unwrap();
        assert!(engine.check_win());
    }

    #[test]
    fn flagged_cell_cannot_be_revealed_until_unflagged() {
        let mut engine = engine_with(3, &[(2, 2)]);
        assert_eq!(engine.toggle_flag((1, 1)), Ok(true));

        assert_eq!(engine.reveal((1, 1)).unwrap(), RevealResult::invalid());
        assert!(engine.moves().is_empty());

        assert_eq!(engine.toggle_flag((1, 1)), Ok(true));
        assert_eq!(
            engine.reveal((1, 1)).unwrap().outcome,
            RevealOutcome::NoMine
        );
    }

    #[test]
    fn failed_placement_leaves_engine_untouched() {
        let mut engine = Engine::new(3, 1, 0).unwrap();

        assert_eq!(
            engine.reveal((1, 1)),
            Err(GameError::Placement {
                mines: 1,
                available: 0
            })
        );
        assert_eq!(engine.state(), EngineState::NotStarted);
        assert!(engine.mine_layout().is_none());
        assert!(engine.moves().is_empty());

        // a corner click leaves room for the mine
        assert!(engine.reveal((0, 0)).unwrap().outcome.has_update());
    }

    #[test]
    fn out_of_range_coords_are_errors() {
        let mut engine = Engine::new(3, 1, 0).unwrap();

        assert_eq!(engine.reveal((3, 0)), Err(GameError::InvalidCoords));
        assert_eq!(engine.toggle_flag((0, 3)), Err(GameError::InvalidCoords));
    }

    #[test]
    fn pinned_layout_must_match_config() {
        let layout = MineLayout::from_mine_coords(3, &[(0, 0)]).unwrap();

        assert_eq!(
            Engine::with_mine_layout(config(3, 2), layout.clone()),
            Err(GameError::LayoutMismatch)
        );

        let mut engine = Engine::with_mine_layout(config(3, 1), layout.clone()).unwrap();
        assert_eq!(engine.pin_mine_layout(layout), Err(GameError::AlreadyPlaced));
    }

    #[test]
    fn record_reflects_game_state() {
        let mut engine = engine_with(2, &[(1, 1)]);
        let timestamp = DateTime::<Utc>::from_timestamp(0, 0).unwrap();

        let open = engine.record("bo", timestamp);
        assert_eq!(open.final_result, GameResult::InProgress);
        assert_eq!(open.mine_layout, [(1, 1)]);

        engine.reveal((1, 1)).unwrap();
        let lost = engine.record("bo", timestamp);
        assert_eq!(lost.final_result, GameResult::Lose);
        assert_eq!(lost.player_label, "bo");
        assert_eq!(lost.moves, engine.moves());
    }

    #[test]
    fn unstarted_record_has_no_layout() {
        let engine = Engine::new(4, 2, 9).unwrap();
        let timestamp = DateTime::<Utc>::from_timestamp(0, 0).unwrap();

        let record = engine.record("cy", timestamp);

        assert!(record.mine_layout.is_empty());
        assert!(record.moves.is_empty());
        assert_eq!(record.final_result, GameResult::InProgress);
    }
}
