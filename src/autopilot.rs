//! Greedy steering used by the headless simulator.

use crate::game::GameEngine;
use crate::input::{Direction, direction_change_is_valid};
use crate::snake::Position;

/// Picks the safe direction that gets closest to the nearest food.
///
/// A direction is safe when the next cell stays on the grid, misses the
/// body and holds no obstacle. Returns `None` when every move is fatal.
#[must_use]
pub fn choose_direction(engine: &GameEngine) -> Option<Direction> {
    let snake = engine.snake();
    let head = snake.head();
    let grid = engine.grid();
    let ghost = engine.ghost_active();

    Direction::ALL
        .into_iter()
        .filter(|direction| {
            snake.len() < 2 || direction_change_is_valid(snake.direction(), *direction)
        })
        .filter_map(|direction| {
            let cell = grid.resolve(head.step(direction))?;
            let blocked = snake.collides_with_body(cell)
                || engine
                    .obstacles()
                    .iter()
                    .any(|obstacle| obstacle.position == cell);
            (ghost || !blocked).then_some((direction, cell))
        })
        .min_by_key(|(direction, cell)| {
            // Ties keep the current heading.
            (distance_to_food(engine, *cell), *direction != snake.direction())
        })
        .map(|(direction, _)| direction)
}

fn distance_to_food(engine: &GameEngine, cell: Position) -> u32 {
    engine
        .foods()
        .iter()
        .map(|food| food.position.manhattan(cell))
        .min()
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use crate::config::{EngineConfig, GameMode};
    use crate::food::Food;
    use crate::game::{GameEngine, GameState};
    use crate::input::Direction;
    use crate::obstacle::Obstacle;
    use crate::snake::{Position, Snake};

    use super::choose_direction;

    fn playing_engine(seed: u64) -> GameEngine {
        let mut engine = GameEngine::new_with_seed(EngineConfig::default(), seed);
        engine.request_start();
        engine.request_start();
        engine
    }

    #[test]
    fn heads_toward_food() {
        let mut engine = playing_engine(1);
        engine.place_snake(Snake::new(Position { x: 10, y: 10 }, Direction::Right));
        engine.place_food(Food::normal(Position { x: 10, y: 4 }));

        assert_eq!(choose_direction(&engine), Some(Direction::Up));
    }

    #[test]
    fn avoids_walls_and_obstacles() {
        let mut engine = playing_engine(2);
        engine.place_snake(Snake::new(Position { x: 29, y: 0 }, Direction::Right));
        engine.place_food(Food::normal(Position { x: 29, y: 10 }));
        engine.place_obstacles(vec![Obstacle::wall(Position { x: 29, y: 1 })]);

        assert_eq!(choose_direction(&engine), Some(Direction::Left));
    }

    #[test]
    fn trapped_snake_has_no_safe_move() {
        let mut engine = playing_engine(3);
        engine.place_snake(Snake::new(Position { x: 0, y: 0 }, Direction::Left));
        engine.place_obstacles(vec![
            Obstacle::wall(Position { x: 1, y: 0 }),
            Obstacle::wall(Position { x: 0, y: 1 }),
        ]);

        assert_eq!(choose_direction(&engine), None);
    }

    #[test]
    fn autopilot_keeps_a_classic_game_alive_for_a_while() {
        let mut engine = GameEngine::new_with_seed(EngineConfig::default(), 99);
        engine.set_mode(GameMode::Classic, 5);
        engine.request_start();
        engine.request_start();

        for _ in 0..40 {
            if let Some(direction) = choose_direction(&engine) {
                engine.request_direction(direction);
            }
            engine.tick();
        }

        assert_eq!(engine.state(), GameState::Playing);
        assert!(engine.score() > 0);
    }
}
