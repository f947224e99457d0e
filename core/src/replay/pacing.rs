use core::time::Duration;

use super::*;

/// Half a second between moves, a comfortable pace for watching a game unfold.
pub const DEFAULT_STEP_DELAY: Duration = Duration::from_millis(500);

/// Replay driven by caller-supplied elapsed time, for animated playback.
///
/// The first move is due immediately and every following move `step_delay` after the previous one. Each call to
/// [`PacedReplay::advance`] applies at most one move, so a late tick never plays a burst of moves. Pacing only changes
/// when moves become visible: the board after the last step is the same as with [`Replay::run_to_end`].
#[derive(Clone, Debug)]
pub struct PacedReplay {
    replay: Replay,
    step_delay: Duration,
    until_next: Duration,
    cancelled: bool,
}

impl PacedReplay {
    pub fn new(replay: Replay, step_delay: Duration) -> Self {
        Self {
            replay,
            step_delay,
            until_next: Duration::ZERO,
            cancelled: false,
        }
    }

    pub fn replay(&self) -> &Replay {
        &self.replay
    }

    pub fn engine(&self) -> &Engine {
        self.replay.engine()
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    pub fn is_done(&self) -> bool {
        self.cancelled || self.replay.is_done() || self.replay.divergence().is_some()
    }

    /// Time left until the next move is due, `None` when nothing is scheduled anymore.
    pub fn time_until_next(&self) -> Option<Duration> {
        if self.is_done() {
            None
        } else {
            Some(self.until_next)
        }
    }

    /// Stops scheduling moves; the moves applied so far stay applied.
    pub fn cancel(&mut self) {
        if !self.cancelled {
            log::debug!("Replay cancelled after {} moves", self.replay.position());
            self.cancelled = true;
        }
    }

    /// Lets `elapsed` pass and applies the next move if it became due.
    ///
    /// Time past the due point is dropped, the move after this one is due a full `step_delay` later. A divergence is
    /// returned on the call that hit it and on every call after it.
    pub fn advance(&mut self, elapsed: Duration) -> Result<Option<ReplayStep>, ReplayError> {
        if let Some(err) = self.replay.divergence() {
            return Err(err);
        }
        if self.is_done() {
            return Ok(None);
        }
        if elapsed < self.until_next {
            self.until_next -= elapsed;
            return Ok(None);
        }

        let step = self.replay.step()?;
        self.until_next = self.step_delay;
        Ok(step)
    }

    /// Applies all remaining moves at once, unless cancelled, and checks the final result.
    pub fn finish(mut self) -> Result<Engine, ReplayError> {
        if !self.cancelled {
            self.replay.run_to_end()?;
        }
        Ok(self.replay.into_engine())
    }
}
