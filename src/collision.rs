use crate::grid::GridWorld;
use crate::snake::Position;
use crate::spawn::Occupancy;

/// Outcome of moving the head into a proposed cell.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Collision {
    /// The head left the grid under a clamping boundary.
    OutOfBounds,
    OwnBody(Position),
    Obstacle { position: Position, index: usize },
    Food { position: Position, index: usize },
    PowerUp { position: Position, index: usize },
    Free(Position),
}

impl Collision {
    /// Returns true when this outcome ends the game.
    ///
    /// Ghost mode makes body and obstacle hits harmless; leaving a clamped
    /// grid is always fatal.
    #[must_use]
    pub fn is_fatal(self, ghost: bool) -> bool {
        match self {
            Self::OutOfBounds => true,
            Self::OwnBody(_) | Self::Obstacle { .. } => !ghost,
            Self::Food { .. } | Self::PowerUp { .. } | Self::Free(_) => false,
        }
    }

    /// Human-readable game over reason for fatal outcomes.
    #[must_use]
    pub fn reason(self) -> Option<&'static str> {
        match self {
            Self::OutOfBounds => Some("out of bounds"),
            Self::OwnBody(_) => Some("hit self"),
            Self::Obstacle { .. } => Some("hit obstacle"),
            Self::Food { .. } | Self::PowerUp { .. } | Self::Free(_) => None,
        }
    }

    /// Cell the head ends up in, if it stays on the grid.
    #[must_use]
    pub fn head(self) -> Option<Position> {
        match self {
            Self::OutOfBounds => None,
            Self::OwnBody(position)
            | Self::Free(position)
            | Self::Obstacle { position, .. }
            | Self::Food { position, .. }
            | Self::PowerUp { position, .. } => Some(position),
        }
    }
}

/// Classifies proposed head moves against the board.
#[derive(Debug, Clone, Copy)]
pub struct CollisionResolver {
    grid: GridWorld,
}

impl CollisionResolver {
    #[must_use]
    pub fn new(grid: GridWorld) -> Self {
        Self { grid }
    }

    /// Applies the boundary policy to `proposed`, then checks body,
    /// obstacles, food and power-ups in that order.
    #[must_use]
    pub fn classify(&self, occupancy: &Occupancy<'_>, proposed: Position) -> Collision {
        let Some(head) = self.grid.resolve(proposed) else {
            return Collision::OutOfBounds;
        };

        if occupancy.snake.collides_with_body(head) {
            return Collision::OwnBody(head);
        }

        if let Some(index) = occupancy
            .obstacles
            .iter()
            .position(|obstacle| obstacle.position == head)
        {
            return Collision::Obstacle {
                position: head,
                index,
            };
        }

        if let Some(index) = occupancy.foods.iter().position(|food| food.position == head) {
            return Collision::Food {
                position: head,
                index,
            };
        }

        if let Some(index) = occupancy
            .power_ups
            .iter()
            .position(|power_up| power_up.position == head)
        {
            return Collision::PowerUp {
                position: head,
                index,
            };
        }

        Collision::Free(head)
    }
}

#[cfg(test)]
mod tests {
    use crate::config::{BoundaryPolicy, GridSize};
    use crate::food::Food;
    use crate::grid::GridWorld;
    use crate::input::Direction;
    use crate::obstacle::Obstacle;
    use crate::power_up::{PowerUp, PowerUpKind};
    use crate::snake::{Position, Snake};
    use crate::spawn::Occupancy;

    use super::{Collision, CollisionResolver};

    fn resolver(policy: BoundaryPolicy) -> CollisionResolver {
        CollisionResolver::new(GridWorld::new(
            GridSize {
                width: 10,
                height: 10,
            },
            policy,
        ))
    }

    fn snake() -> Snake {
        Snake::from_segments(
            vec![
                Position { x: 5, y: 5 },
                Position { x: 4, y: 5 },
                Position { x: 4, y: 6 },
                Position { x: 5, y: 6 },
                Position { x: 6, y: 6 },
            ],
            Direction::Right,
        )
    }

    #[test]
    fn classifies_each_kind_of_cell() {
        let snake = snake();
        let foods = vec![Food::normal(Position { x: 6, y: 5 })];
        let obstacles = vec![Obstacle::wall(Position { x: 5, y: 4 })];
        let power_ups = vec![PowerUp::new(Position { x: 8, y: 8 }, PowerUpKind::Shrink)];
        let occupancy = Occupancy {
            snake: &snake,
            foods: &foods,
            obstacles: &obstacles,
            power_ups: &power_ups,
        };
        let resolver = resolver(BoundaryPolicy::Clamp);

        assert_eq!(
            resolver.classify(&occupancy, Position { x: 6, y: 5 }),
            Collision::Food {
                position: Position { x: 6, y: 5 },
                index: 0
            }
        );
        assert_eq!(
            resolver.classify(&occupancy, Position { x: 5, y: 4 }),
            Collision::Obstacle {
                position: Position { x: 5, y: 4 },
                index: 0
            }
        );
        assert_eq!(
            resolver.classify(&occupancy, Position { x: 5, y: 6 }),
            Collision::OwnBody(Position { x: 5, y: 6 })
        );
        assert_eq!(
            resolver.classify(&occupancy, Position { x: 8, y: 8 }),
            Collision::PowerUp {
                position: Position { x: 8, y: 8 },
                index: 0
            }
        );
        assert_eq!(
            resolver.classify(&occupancy, Position { x: 1, y: 1 }),
            Collision::Free(Position { x: 1, y: 1 })
        );
    }

    #[test]
    fn boundary_policy_decides_out_of_range_heads() {
        let snake = Snake::new(Position { x: 0, y: 3 }, Direction::Left);
        let occupancy = Occupancy {
            snake: &snake,
            foods: &[],
            obstacles: &[],
            power_ups: &[],
        };

        let off_grid = Position { x: -1, y: 3 };
        let clamped = resolver(BoundaryPolicy::Clamp).classify(&occupancy, off_grid);
        assert_eq!(clamped, Collision::OutOfBounds);
        assert_eq!(clamped.reason(), Some("out of bounds"));

        let wrapped = resolver(BoundaryPolicy::Wrap).classify(&occupancy, off_grid);
        assert_eq!(wrapped, Collision::Free(Position { x: 9, y: 3 }));
    }

    #[test]
    fn ghost_mode_only_spares_body_and_obstacles() {
        let origin = Position { x: 0, y: 0 };

        assert!(!Collision::OwnBody(origin).is_fatal(true));
        assert!(
            !Collision::Obstacle {
                position: origin,
                index: 0
            }
            .is_fatal(true)
        );
        assert!(Collision::OwnBody(origin).is_fatal(false));
        assert!(Collision::OutOfBounds.is_fatal(true));
        assert!(!Collision::Free(origin).is_fatal(false));
    }
}
