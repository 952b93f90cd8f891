//! Direction and alignment arithmetic.

use cave_in_core::{Direction, Movement, Position};
use glam::Vec2;

/// Alignment reported when no momentum is known.
pub const NEUTRAL_ALIGNMENT: f32 = 0.5;

/// Normalises an integer vector. The zero vector stays zero.
#[must_use]
pub fn normalize(dx: i32, dy: i32) -> Vec2 {
    Vec2::new(dx as f32, dy as f32).normalize_or_zero()
}

/// Unit vector pointing from `from` toward `to`, or zero when they coincide.
#[must_use]
pub fn bearing(from: Position, to: Position) -> Vec2 {
    normalize(to.x() - from.x(), to.y() - from.y())
}

/// Maps a vector onto the cardinal direction of its dominant axis.
///
/// Diagonals resolve vertically. The zero vector has no direction.
#[must_use]
pub fn cardinal_direction(vector: Vec2) -> Option<Direction> {
    if vector == Vec2::ZERO {
        return None;
    }

    let direction = if vector.x.abs() > vector.y.abs() {
        if vector.x > 0.0 {
            Direction::Right
        } else {
            Direction::Left
        }
    } else if vector.y > 0.0 {
        Direction::Down
    } else {
        Direction::Up
    };
    Some(direction)
}

/// Single cardinal step along the dominant axis of the bearing from `from`
/// to `to`. Equal gaps step vertically; coinciding positions do not move.
#[must_use]
pub fn movement_toward(from: Position, to: Position) -> Movement {
    cardinal_direction(bearing(from, to)).map_or(Movement::NONE, Movement::from_direction)
}

/// How well the current momentum points from `position` toward `target`.
///
/// The dot product of both unit vectors is rescaled from `[-1, 1]` into
/// `[0, 1]`. Standing on the target counts as perfectly aligned; unknown or
/// zero momentum is neutral.
#[must_use]
pub fn alignment(position: Position, target: Position, momentum: Option<Movement>) -> f32 {
    if position == target {
        return 1.0;
    }

    let Some(momentum) = momentum.filter(|movement| !movement.is_none()) else {
        return NEUTRAL_ALIGNMENT;
    };

    let heading = normalize(momentum.dx(), momentum.dy());
    (bearing(position, target).dot(heading) + 1.0) / 2.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_produces_unit_vectors() {
        let unit = normalize(3, 4);
        assert!((unit.length() - 1.0).abs() < 1e-6);
        assert_eq!(normalize(0, 0), Vec2::ZERO);
    }

    #[test]
    fn cardinal_direction_uses_dominant_axis() {
        assert_eq!(cardinal_direction(Vec2::new(2.0, 1.0)), Some(Direction::Right));
        assert_eq!(cardinal_direction(Vec2::new(-2.0, 1.0)), Some(Direction::Left));
        assert_eq!(cardinal_direction(Vec2::new(1.0, 1.0)), Some(Direction::Down));
        assert_eq!(cardinal_direction(Vec2::new(0.0, -0.5)), Some(Direction::Up));
        assert_eq!(cardinal_direction(Vec2::ZERO), None);
    }

    #[test]
    fn movement_toward_follows_the_dominant_axis() {
        let origin = Position::new(2, 2);
        assert_eq!(
            movement_toward(origin, Position::new(5, 1)),
            Movement::from_direction(Direction::Right)
        );
        assert_eq!(
            movement_toward(origin, Position::new(2, 0)),
            Movement::from_direction(Direction::Up)
        );
        assert_eq!(
            movement_toward(origin, Position::new(4, 0)),
            Movement::from_direction(Direction::Up)
        );
        assert_eq!(movement_toward(origin, origin), Movement::NONE);
    }

    #[test]
    fn adjacent_steps_map_back_to_their_direction() {
        let origin = Position::new(3, 3);
        for direction in [Direction::Up, Direction::Right, Direction::Down, Direction::Left] {
            let next = origin.step(direction);
            assert_eq!(movement_toward(origin, next), Movement::from_direction(direction));
            assert_eq!(cardinal_direction(bearing(origin, next)), Some(direction));
        }
    }

    #[test]
    fn alignment_rescales_dot_product() {
        let origin = Position::new(0, 0);
        let east = Position::new(5, 0);
        let right = Some(Movement::from_direction(Direction::Right));
        let left = Some(Movement::from_direction(Direction::Left));
        let down = Some(Movement::from_direction(Direction::Down));

        assert!((alignment(origin, east, right) - 1.0).abs() < 1e-6);
        assert!(alignment(origin, east, left).abs() < 1e-6);
        assert!((alignment(origin, east, down) - 0.5).abs() < 1e-6);
        assert!((alignment(origin, east, None) - NEUTRAL_ALIGNMENT).abs() < 1e-6);
        assert!((alignment(origin, east, Some(Movement::NONE)) - NEUTRAL_ALIGNMENT).abs() < 1e-6);
        assert!((alignment(east, east, left) - 1.0).abs() < 1e-6);
    }
}
