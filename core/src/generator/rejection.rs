use ndarray::Array2;

use super::*;

/// Random draws allowed per board cell before giving up on placement.
pub const MAX_ATTEMPTS_PER_CELL: u32 = 64;

/// Uniform placement by rejection sampling: random cells are drawn and kept only when they are free and outside the
/// safe zone around the first click.
#[derive(Clone, Debug, PartialEq)]
pub struct RejectionSampler {
    seed: u64,
}

impl RejectionSampler {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }
}

impl MineLayoutGenerator for RejectionSampler {
    fn generate(self, config: GameConfig, start: Coord2) -> Result<MineLayout> {
        use rand::prelude::*;

        let size = config.size();
        let start = config.validate_coords(start)?;
        let available = config.total_cells() - safe_zone_size(size, start);

        if config.mines() > available {
            log::warn!(
                "Cannot keep {:?} safe, requested {} mines but only {} cells are free",
                start,
                config.mines(),
                available
            );
            return Err(GameError::Placement {
                mines: config.mines(),
                available,
            });
        }

        let mut mine_mask: Array2<bool> = Array2::default((size, size).to_nd_index());
        let mut mines_placed: CellCount = 0;
        let max_attempts = MAX_ATTEMPTS_PER_CELL * u32::from(config.total_cells());
        let mut attempts = 0;

        let mut rng = SmallRng::seed_from_u64(self.seed);
        while mines_placed < config.mines() {
            if attempts == max_attempts {
                log::warn!(
                    "Gave up placing mines after {} draws, placed {} of {}",
                    attempts,
                    mines_placed,
                    config.mines()
                );
                return Err(GameError::Placement {
                    mines: config.mines(),
                    available,
                });
            }
            attempts += 1;

            let candidate: Coord2 = (rng.random_range(0..size), rng.random_range(0..size));
            if is_adjacent_or_same(candidate, start) || mine_mask[candidate.to_nd_index()] {
                continue;
            }
            mine_mask[candidate.to_nd_index()] = true;
            mines_placed += 1;
        }

        log::debug!(
            "Placed {} mines around start {:?} in {} draws",
            mines_placed,
            start,
            attempts
        );
        Ok(MineLayout::from_mine_mask(mine_mask))
    }
}
