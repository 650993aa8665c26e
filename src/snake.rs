use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::config::GridSize;
use crate::input::{Direction, direction_change_is_valid};

/// Grid position in logical cell coordinates.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    /// Returns true when the position lies inside the bounds.
    #[must_use]
    pub fn is_within_bounds(self, bounds: GridSize) -> bool {
        self.x >= 0
            && self.y >= 0
            && self.x < i32::from(bounds.width)
            && self.y < i32::from(bounds.height)
    }

    /// Returns this position wrapped into bounds on both axes.
    #[must_use]
    pub fn wrapped(self, bounds: GridSize) -> Self {
        Self {
            x: self.x.rem_euclid(i32::from(bounds.width)),
            y: self.y.rem_euclid(i32::from(bounds.height)),
        }
    }

    /// Returns the neighbouring cell one step towards `direction`.
    #[must_use]
    pub fn step(self, direction: Direction) -> Self {
        let (dx, dy) = direction.delta();
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// Manhattan distance between two cells.
    #[must_use]
    pub fn manhattan(self, other: Self) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }
}

/// Snake body, heading and growth bookkeeping.
///
/// Direction requests are latched into a single pending slot and only take
/// effect when the owning engine calls [`Snake::adopt_pending_direction`] at
/// the start of a tick.
#[derive(Debug, Clone)]
pub struct Snake {
    body: VecDeque<Position>,
    direction: Direction,
    pending_direction: Direction,
    growth_pending: u32,
}

impl Snake {
    /// Creates a one-cell snake at `start` with the provided direction.
    #[must_use]
    pub fn new(start: Position, direction: Direction) -> Self {
        Self::from_segments(vec![start], direction)
    }

    /// Creates a snake from explicit body segments (front is head).
    ///
    /// # Panics
    ///
    /// Panics when `segments` is empty.
    #[must_use]
    pub fn from_segments(segments: Vec<Position>, direction: Direction) -> Self {
        assert!(!segments.is_empty(), "snake needs at least one segment");

        Self {
            body: VecDeque::from(segments),
            direction,
            pending_direction: direction,
            growth_pending: 0,
        }
    }

    /// Latches `direction` for the next tick.
    ///
    /// Reversals of the current heading are dropped while the snake has two
    /// or more segments. Returns whether the request was accepted.
    pub fn request_direction(&mut self, direction: Direction) -> bool {
        if self.body.len() >= 2 && !direction_change_is_valid(self.direction, direction) {
            return false;
        }
        self.pending_direction = direction;
        true
    }

    /// Makes the latched direction current.
    pub fn adopt_pending_direction(&mut self) {
        self.direction = self.pending_direction;
    }

    /// Returns the unbounded head position one step along the current heading.
    #[must_use]
    pub fn next_head_position(&self) -> Position {
        self.head().step(self.direction)
    }

    /// Pushes `head` to the front and pops the tail unless growth is pending.
    ///
    /// Returns the vacated tail cell, if any.
    pub fn advance(&mut self, head: Position) -> Option<Position> {
        self.body.push_front(head);
        if self.growth_pending > 0 {
            self.growth_pending -= 1;
            None
        } else {
            self.body.pop_back()
        }
    }

    /// Queues `segments` cells of growth.
    pub fn grow(&mut self, segments: u32) {
        self.growth_pending = self.growth_pending.saturating_add(segments);
    }

    /// Drops up to `segments` tail cells, always keeping the head.
    pub fn shrink(&mut self, segments: usize) {
        let keep = self.body.len().saturating_sub(segments).max(1);
        self.body.truncate(keep);
    }

    /// Returns true when moving the head into `position` hits the body.
    ///
    /// The tail cell is ignored when it is about to be vacated this tick.
    #[must_use]
    pub fn collides_with_body(&self, position: Position) -> bool {
        let tail_vacates = self.growth_pending == 0;
        let checked = if tail_vacates {
            self.body.len().saturating_sub(1)
        } else {
            self.body.len()
        };
        self.body.iter().take(checked).any(|segment| *segment == position)
    }

    /// Returns the current head position.
    #[must_use]
    pub fn head(&self) -> Position {
        *self
            .body
            .front()
            .expect("snake body must always contain at least one segment")
    }

    /// Returns true if any segment occupies `position`.
    #[must_use]
    pub fn occupies(&self, position: Position) -> bool {
        self.body.contains(&position)
    }

    /// Returns current segment count.
    #[must_use]
    pub fn len(&self) -> usize {
        self.body.len()
    }

    /// Returns true when there are no segments.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    /// Returns the current movement direction.
    #[must_use]
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Returns the direction that the next tick will adopt.
    #[must_use]
    pub fn pending_direction(&self) -> Direction {
        self.pending_direction
    }

    #[must_use]
    pub fn growth_pending(&self) -> u32 {
        self.growth_pending
    }

    /// Iterates over body segments from head to tail.
    pub fn segments(&self) -> impl Iterator<Item = &Position> {
        self.body.iter()
    }
}

#[cfg(test)]
mod tests {
    use crate::config::GridSize;
    use crate::input::Direction;

    use super::{Position, Snake};

    #[test]
    fn position_wrapping_keeps_coordinates_inside_bounds() {
        let bounds = GridSize {
            width: 10,
            height: 8,
        };

        let wrapped_left = Position { x: -1, y: 3 }.wrapped(bounds);
        let wrapped_bottom = Position { x: 4, y: 8 }.wrapped(bounds);

        assert_eq!(wrapped_left, Position { x: 9, y: 3 });
        assert_eq!(wrapped_bottom, Position { x: 4, y: 0 });
    }

    #[test]
    fn snake_moves_one_cell_per_advance() {
        let mut snake = Snake::new(Position { x: 5, y: 5 }, Direction::Right);

        let next = snake.next_head_position();
        let vacated = snake.advance(next);

        assert_eq!(snake.head(), Position { x: 6, y: 5 });
        assert_eq!(vacated, Some(Position { x: 5, y: 5 }));
        assert_eq!(snake.len(), 1);
    }

    #[test]
    fn pending_growth_keeps_tail_once_per_segment() {
        let mut snake = Snake::new(Position { x: 5, y: 5 }, Direction::Right);
        snake.grow(2);

        for _ in 0..3 {
            let next = snake.next_head_position();
            snake.advance(next);
        }

        assert_eq!(snake.len(), 3);
        assert_eq!(snake.growth_pending(), 0);
    }

    #[test]
    fn reversal_is_dropped_for_long_snakes() {
        let mut snake = Snake::from_segments(
            vec![Position { x: 5, y: 5 }, Position { x: 4, y: 5 }],
            Direction::Right,
        );

        assert!(!snake.request_direction(Direction::Left));
        assert_eq!(snake.pending_direction(), Direction::Right);

        assert!(snake.request_direction(Direction::Up));
        assert_eq!(snake.pending_direction(), Direction::Up);
    }

    #[test]
    fn single_segment_snake_may_reverse() {
        let mut snake = Snake::new(Position { x: 5, y: 5 }, Direction::Right);

        assert!(snake.request_direction(Direction::Left));
        snake.adopt_pending_direction();
        assert_eq!(snake.direction(), Direction::Left);
    }

    #[test]
    fn pending_slot_keeps_last_valid_request() {
        let mut snake = Snake::from_segments(
            vec![Position { x: 5, y: 5 }, Position { x: 5, y: 6 }],
            Direction::Up,
        );

        snake.request_direction(Direction::Left);
        snake.request_direction(Direction::Right);
        snake.request_direction(Direction::Down);
        snake.adopt_pending_direction();

        assert_eq!(snake.direction(), Direction::Right);
    }

    #[test]
    fn tail_cell_is_free_when_it_moves_away() {
        let mut snake = Snake::from_segments(
            vec![
                Position { x: 2, y: 2 },
                Position { x: 2, y: 3 },
                Position { x: 3, y: 3 },
                Position { x: 3, y: 2 },
            ],
            Direction::Right,
        );

        assert!(!snake.collides_with_body(Position { x: 3, y: 2 }));
        assert!(snake.collides_with_body(Position { x: 3, y: 3 }));

        snake.grow(1);
        assert!(snake.collides_with_body(Position { x: 3, y: 2 }));
    }

    #[test]
    fn shrink_never_removes_head() {
        let mut snake = Snake::from_segments(
            vec![
                Position { x: 2, y: 2 },
                Position { x: 1, y: 2 },
                Position { x: 0, y: 2 },
            ],
            Direction::Right,
        );

        snake.shrink(1);
        assert_eq!(snake.len(), 2);

        snake.shrink(10);
        assert_eq!(snake.len(), 1);
        assert_eq!(snake.head(), Position { x: 2, y: 2 });
    }
}
