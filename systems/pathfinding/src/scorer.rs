//! Heuristic ranking of candidate positions.

use cave_in_core::{Cell, GridQuery, Movement, Position};

use crate::vector;

/// Largest discount momentum alignment can apply to the progress term.
const ALIGNMENT_WEIGHT: f32 = 0.3;
/// Largest inflation local obstacle density can apply to the progress term.
const DENSITY_WEIGHT: f32 = 0.5;
/// Half-width of the square window sampled for obstacle density (5x5).
const DENSITY_RADIUS: i32 = 2;

/// Scores positions by remaining distance, momentum alignment and how
/// crowded their surroundings are. Lower scores are better.
#[derive(Debug)]
pub struct PositionScorer<'g, G: ?Sized> {
    grid: &'g G,
}

impl<'g, G> PositionScorer<'g, G>
where
    G: GridQuery + ?Sized,
{
    /// Creates a scorer reading from the provided grid.
    pub fn new(grid: &'g G) -> Self {
        Self { grid }
    }

    /// Scores `position` as a step toward `target`.
    #[must_use]
    pub fn score(&self, position: Position, target: Position, momentum: Option<Movement>) -> f32 {
        let progress = position.manhattan_distance(target) as f32;
        let alignment = vector::alignment(position, target, momentum);
        let density = self.obstacle_density(position);

        progress * (1.0 - alignment * ALIGNMENT_WEIGHT) * (1.0 + density * DENSITY_WEIGHT)
    }

    /// Fraction of in-bounds cells within the 5x5 window around `position`
    /// that hold obstacles.
    #[must_use]
    pub fn obstacle_density(&self, position: Position) -> f32 {
        let mut obstacles = 0_u32;
        let mut cells = 0_u32;
        for dy in -DENSITY_RADIUS..=DENSITY_RADIUS {
            for dx in -DENSITY_RADIUS..=DENSITY_RADIUS {
                let sample = position.offset(dx, dy);
                if !self.grid.contains(sample) {
                    continue;
                }
                cells += 1;
                if self.grid.is_obstacle(sample) {
                    obstacles += 1;
                }
            }
        }

        if cells == 0 {
            return 0.0;
        }
        obstacles as f32 / cells as f32
    }

    /// Nearest resource by Manhattan distance. Ties go to the first resource
    /// in row-major order.
    #[must_use]
    pub fn closest_resource(&self, from: Position) -> Option<Position> {
        self.grid
            .positions_of(Cell::Resource)
            .into_iter()
            .min_by_key(|resource| from.manhattan_distance(*resource))
    }
}
