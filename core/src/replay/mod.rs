use alloc::vec::Vec;
use thiserror::Error;

use crate::*;
pub use pacing::*;

mod pacing;

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum ReplayError {
    #[error(transparent)]
    Game(#[from] GameError),
    #[error("Move numbers must increase, move {found} follows move {previous}")]
    MoveOrder { previous: u32, found: u32 },
    #[error("Move {move_number} at {coords:?} was recorded as {recorded:?} but replays as {replayed:?}")]
    Mismatch {
        move_number: u32,
        coords: Coord2,
        recorded: MoveOutcome,
        replayed: RevealOutcome,
    },
    /// The replay already opened what this move opens in the record. Flags are not logged, so a flag that stopped a
    /// flood fill in the live game lets the replayed fill run further.
    #[error("Move {move_number} at {coords:?} was recorded as {recorded:?} but the replay got there first ({replayed:?})")]
    AheadOfRecord {
        move_number: u32,
        coords: Coord2,
        recorded: MoveOutcome,
        replayed: RevealOutcome,
    },
    #[error("Game was recorded as {recorded:?} but replays as {replayed:?}")]
    ResultMismatch {
        recorded: GameResult,
        replayed: GameResult,
    },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum StepKind {
    /// Same outcome as recorded.
    Matched,
    /// Tolerated [`ReplayError::AheadOfRecord`] divergence.
    AheadOfRecord,
}

/// One recorded move applied to the reconstructed engine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReplayStep {
    pub mv: Move,
    pub result: RevealResult,
    pub kind: StepKind,
}

/// Rebuilds a recorded game on its stored mine layout and re-applies its moves one by one.
///
/// No random placement happens during a replay. Every move must produce the outcome it was recorded with; the first
/// divergence stops the replay for good. Divergence caused by unlogged flags is reported as
/// [`ReplayError::AheadOfRecord`] and can be let through with [`Replay::allow_flag_divergence`].
#[derive(Clone, Debug)]
pub struct Replay {
    engine: Engine,
    moves: Vec<Move>,
    position: usize,
    final_result: GameResult,
    allow_flag_divergence: bool,
    tolerated: bool,
    diverged: Option<ReplayError>,
}

impl Replay {
    pub fn new(record: &GameRecord) -> Result<Self, ReplayError> {
        let config = record.game_config()?;
        check_move_order(&record.moves)?;

        let mut engine = Engine::from_config(config, 0);
        match record.layout()? {
            Some(mine_layout) => engine.pin_mine_layout(mine_layout)?,
            // abandoned before the first reveal, nothing to replay
            None if record.moves.is_empty() => {}
            None => return Err(GameError::LayoutMismatch.into()),
        }

        log::debug!(
            "Replaying {} moves on a {}x{} board with {} mines",
            record.moves.len(),
            config.size(),
            config.size(),
            config.mines()
        );
        Ok(Self {
            engine,
            moves: record.moves.clone(),
            position: 0,
            final_result: record.final_result,
            allow_flag_divergence: false,
            tolerated: false,
            diverged: None,
        })
    }

    /// Keeps going over [`ReplayError::AheadOfRecord`] moves instead of stopping, the board then shows at least
    /// everything the live game revealed.
    pub fn allow_flag_divergence(mut self) -> Self {
        self.allow_flag_divergence = true;
        self
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn into_engine(self) -> Engine {
        self.engine
    }

    pub fn moves(&self) -> &[Move] {
        &self.moves
    }

    /// Number of moves applied so far.
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn remaining(&self) -> usize {
        self.moves.len() - self.position
    }

    pub fn is_done(&self) -> bool {
        self.remaining() == 0
    }

    /// The error that stopped the replay, repeated by every later [`Replay::step`].
    pub fn divergence(&self) -> Option<ReplayError> {
        self.diverged
    }

    /// Applies the next recorded move, `Ok(None)` once all moves are applied.
    pub fn step(&mut self) -> Result<Option<ReplayStep>, ReplayError> {
        if let Some(err) = self.diverged {
            return Err(err);
        }
        let Some(&mv) = self.moves.get(self.position) else {
            return Ok(None);
        };

        let (kind, result) = self.apply(mv).inspect_err(|&err| {
            log::warn!("Replay diverged: {}", err);
            self.diverged = Some(err);
        })?;

        self.position += 1;
        Ok(Some(ReplayStep { mv, result, kind }))
    }

    fn apply(&mut self, mv: Move) -> Result<(StepKind, RevealResult), ReplayError> {
        let coords = self.engine.config().validate_coords(mv.coords())?;
        let already_revealed = self.engine.cell_at(coords).is_revealed();

        let result = self.engine.reveal(coords)?;
        let replayed = result.outcome;
        if replayed == mv.outcome.reveal_outcome() {
            return Ok((StepKind::Matched, result));
        }

        let ahead = match (mv.outcome, replayed) {
            (MoveOutcome::NoMine | MoveOutcome::Won, RevealOutcome::Invalid) => already_revealed,
            // the flag kept one safe cell hidden in the live game
            (MoveOutcome::NoMine, RevealOutcome::Won) => true,
            // the replay won early over an earlier divergence, so the explosion cannot happen anymore
            (MoveOutcome::Exploded, RevealOutcome::Invalid) => {
                self.tolerated && self.engine.state() == EngineState::Won
            }
            _ => false,
        };
        if !ahead {
            return Err(ReplayError::Mismatch {
                move_number: mv.move_number,
                coords,
                recorded: mv.outcome,
                replayed,
            });
        }

        let err = ReplayError::AheadOfRecord {
            move_number: mv.move_number,
            coords,
            recorded: mv.outcome,
            replayed,
        };
        if self.allow_flag_divergence {
            log::debug!("Tolerated: {}", err);
            self.tolerated = true;
            Ok((StepKind::AheadOfRecord, result))
        } else {
            Err(err)
        }
    }

    /// Applies every remaining move and checks the final result against the record.
    pub fn run_to_end(&mut self) -> Result<(), ReplayError> {
        while self.step()?.is_some() {}
        self.verify_final_result()
    }

    /// Whether a flag divergence was let through, see [`Replay::allow_flag_divergence`].
    pub fn has_tolerated_divergence(&self) -> bool {
        self.tolerated
    }

    /// Compares the engine with the recorded result. Skipped once a flag divergence was tolerated, a replay that won
    /// early cannot match a game lost afterwards.
    pub fn verify_final_result(&self) -> Result<(), ReplayError> {
        let replayed = GameResult::from(self.engine.state());
        if replayed == self.final_result || self.tolerated {
            Ok(())
        } else {
            let err = ReplayError::ResultMismatch {
                recorded: self.final_result,
                replayed,
            };
            log::warn!("Replay diverged: {}", err);
            Err(err)
        }
    }
}

/// Reconstructs the engine in the configuration the recorded game ended in.
pub fn reconstruct(record: &GameRecord) -> Result<Engine, ReplayError> {
    let mut replay = Replay::new(record)?;
    replay.run_to_end()?;
    Ok(replay.into_engine())
}

fn check_move_order(moves: &[Move]) -> Result<(), ReplayError> {
    for pair in moves.windows(2) {
        if pair[1].move_number <= pair[0].move_number {
            return Err(ReplayError::MoveOrder {
                previous: pair[0].move_number,
                found: pair[1].move_number,
            });
        }
    }
    Ok(())
}
