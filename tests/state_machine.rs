use std::collections::HashMap;
use std::sync::mpsc;
use std::time::Duration;

use snake_engine::achievements::AchievementRecord;
use snake_engine::config::{
    BoundaryPolicy, DifficultyTable, EngineConfig, GameMode, MAX_DIFFICULTY, MIN_DIFFICULTY,
    MIN_TICK_INTERVAL_MS, ModeProfile,
};
use snake_engine::difficulty::DifficultyController;
use snake_engine::events::GameEvent;
use snake_engine::food::{Food, FoodKind};
use snake_engine::game::{GameEngine, GameState};
use snake_engine::input::{Command, Direction};
use snake_engine::snake::{Position, Snake};
use snake_engine::store::MemoryStore;

fn start(engine: &mut GameEngine) {
    engine.apply_command(Command::Start);
    engine.apply_command(Command::Start);
}

fn unlock_count(events: &mpsc::Receiver<GameEvent>, wanted: &str) -> usize {
    events
        .try_iter()
        .filter(|event| matches!(event, GameEvent::AchievementUnlocked { id, .. } if *id == wanted))
        .count()
}

#[test]
fn start_requires_confirmation_by_default() {
    let mut engine = GameEngine::new_with_seed(EngineConfig::default(), 1);
    assert_eq!(engine.state(), GameState::Menu);
    assert_eq!(engine.tick_interval(), None);

    engine.apply_command(Command::Start);
    assert_eq!(engine.state(), GameState::Ready);
    assert_eq!(engine.tick_interval(), None);
    assert_eq!(engine.foods().len(), 1);

    engine.tick();
    assert_eq!(engine.statistics().ticks, 0);

    engine.apply_command(Command::Start);
    assert_eq!(engine.state(), GameState::Playing);
    assert_eq!(engine.tick_interval(), Some(Duration::from_millis(125)));
}

#[test]
fn start_can_skip_ready_state() {
    let config = EngineConfig {
        require_ready_confirmation: false,
        ..EngineConfig::default()
    };
    let mut engine = GameEngine::new_with_seed(config, 2);

    engine.apply_command(Command::Start);
    assert_eq!(engine.state(), GameState::Playing);
}

#[test]
fn pause_stops_and_resumes_ticking() {
    let mut engine = GameEngine::new_with_seed(EngineConfig::default(), 3);
    start(&mut engine);
    engine.tick();

    engine.apply_command(Command::Pause);
    assert_eq!(engine.state(), GameState::Paused);
    assert_eq!(engine.tick_interval(), None);
    let head = engine.snake().head();
    engine.tick();
    assert_eq!(engine.snake().head(), head);

    engine.apply_command(Command::Direction(Direction::Up));
    assert_eq!(engine.snake().pending_direction(), Direction::Right);

    engine.apply_command(Command::Pause);
    assert_eq!(engine.state(), GameState::Playing);
    assert!(engine.tick_interval().is_some());
}

#[test]
fn reset_returns_to_menu_with_a_fresh_board() {
    let mut engine = GameEngine::new_with_seed(EngineConfig::default(), 4);
    start(&mut engine);
    engine.place_snake(Snake::new(Position { x: 3, y: 3 }, Direction::Right));
    engine.place_food(Food::normal(Position { x: 4, y: 3 }));
    engine.tick();
    assert_eq!(engine.score(), 10);

    engine.apply_command(Command::Reset);

    assert_eq!(engine.state(), GameState::Menu);
    assert_eq!(engine.score(), 0);
    assert_eq!(engine.snake().len(), 1);
    assert_eq!(engine.snake().head(), engine.grid().center());
    assert_eq!(engine.foods().len(), 1);
    assert_eq!(engine.tick_interval(), None);
}

#[test]
fn reversal_requests_are_ignored_for_long_snakes() {
    let mut engine = GameEngine::new_with_seed(EngineConfig::default(), 5);
    start(&mut engine);
    engine.place_snake(Snake::from_segments(
        vec![
            Position { x: 10, y: 5 },
            Position { x: 9, y: 5 },
            Position { x: 8, y: 5 },
        ],
        Direction::Right,
    ));
    engine.place_food(Food::normal(Position { x: 0, y: 19 }));

    engine.apply_command(Command::Direction(Direction::Left));
    assert_eq!(engine.snake().pending_direction(), Direction::Right);

    engine.tick();
    assert_eq!(engine.state(), GameState::Playing);
    assert_eq!(engine.snake().head(), Position { x: 11, y: 5 });
}

#[test]
fn last_direction_request_wins() {
    let mut engine = GameEngine::new_with_seed(EngineConfig::default(), 6);
    start(&mut engine);
    engine.place_snake(Snake::new(Position { x: 10, y: 10 }, Direction::Right));
    engine.place_food(Food::normal(Position { x: 0, y: 0 }));

    engine.apply_command(Command::Direction(Direction::Up));
    engine.apply_command(Command::Direction(Direction::Down));
    engine.tick();

    assert_eq!(engine.snake().head(), Position { x: 10, y: 11 });
}

#[test]
fn classic_ends_at_the_left_edge() {
    let (sender, events) = mpsc::channel();
    let mut engine =
        GameEngine::new_with_seed(EngineConfig::default(), 7).with_sink(Box::new(sender));
    start(&mut engine);
    engine.place_snake(Snake::new(Position { x: 0, y: 6 }, Direction::Left));

    engine.tick();

    assert_eq!(engine.state(), GameState::GameOver);
    assert_eq!(engine.tick_interval(), None);
    let reason = events.try_iter().find_map(|event| match event {
        GameEvent::StateChanged {
            to: GameState::GameOver,
            reason,
            ..
        } => reason,
        _ => None,
    });
    assert_eq!(reason.as_deref(), Some("out of bounds"));

    engine.apply_command(Command::Start);
    assert_eq!(engine.state(), GameState::GameOver);
}

#[test]
fn freestyle_wraps_around_the_edges() {
    let mut engine = GameEngine::new_with_seed(EngineConfig::default(), 8);
    engine.apply_command(Command::SetMode(GameMode::Freestyle, 1));
    start(&mut engine);
    engine.place_snake(Snake::new(Position { x: 0, y: 6 }, Direction::Left));
    engine.place_food(Food::normal(Position { x: 10, y: 10 }));

    engine.tick();

    assert_eq!(engine.state(), GameState::Playing);
    assert_eq!(engine.snake().head(), Position { x: 29, y: 6 });
    assert_eq!(engine.snapshot().boundary, BoundaryPolicy::Wrap);
}

#[test]
fn tick_interval_shrinks_with_level_down_to_the_floor() {
    let controller = DifficultyController::new(DifficultyTable::default(), MIN_DIFFICULTY);
    let floor = Duration::from_millis(MIN_TICK_INTERVAL_MS);

    let intervals: Vec<_> = (MIN_DIFFICULTY..=MAX_DIFFICULTY)
        .map(|level| controller.interval_for_level(level))
        .collect();

    assert!(intervals.windows(2).all(|pair| pair[0] > pair[1]));
    assert!(intervals.iter().all(|interval| *interval >= floor));
}

#[test]
fn difficulty_change_mid_game_retimes_without_reset() {
    let (sender, events) = mpsc::channel();
    let mut engine =
        GameEngine::new_with_seed(EngineConfig::default(), 9).with_sink(Box::new(sender));
    start(&mut engine);
    engine.place_snake(Snake::new(Position { x: 2, y: 2 }, Direction::Right));
    engine.place_food(Food::normal(Position { x: 3, y: 2 }));
    engine.tick();

    engine.apply_command(Command::SetDifficulty(10));

    assert_eq!(engine.state(), GameState::Playing);
    assert_eq!(engine.score(), 10);
    assert_eq!(engine.snake().len(), 2);
    assert_eq!(engine.difficulty(), 10);
    assert_eq!(engine.tick_interval(), Some(Duration::from_millis(38)));
    assert!(
        events
            .try_iter()
            .any(|event| event == GameEvent::TickIntervalChanged(Duration::from_millis(38)))
    );

    engine.apply_command(Command::SetDifficulty(0));
    assert_eq!(engine.difficulty(), 1);
}

#[test]
fn century_unlocks_exactly_once() {
    let (sender, events) = mpsc::channel();
    let mut engine =
        GameEngine::new_with_seed(EngineConfig::default(), 10).with_sink(Box::new(sender));
    start(&mut engine);
    engine.place_snake(Snake::new(Position { x: 2, y: 8 }, Direction::Right));

    for _ in 0..4 {
        let ahead = engine.snake().head().step(Direction::Right);
        engine.place_food(Food::new(ahead, FoodKind::Bonus));
        engine.tick();
    }

    assert_eq!(engine.score(), 50 + 55 + 60 + 65);
    assert_eq!(unlock_count(&events, "score_100"), 1);
    assert!(
        engine
            .achievements()
            .get("score_100")
            .is_some_and(|entry| entry.unlocked)
    );
}

#[test]
fn restored_achievements_do_not_unlock_again() {
    let records = HashMap::from([(
        "score_100".to_owned(),
        AchievementRecord {
            unlocked: true,
            progress: 100,
        },
    )]);
    let (sender, events) = mpsc::channel();
    let mut engine = GameEngine::new_with_seed(EngineConfig::default(), 11)
        .with_sink(Box::new(sender))
        .with_store(Box::new(MemoryStore::with_achievements(records)));
    start(&mut engine);
    engine.place_snake(Snake::new(Position { x: 2, y: 8 }, Direction::Right));

    for _ in 0..3 {
        let ahead = engine.snake().head().step(Direction::Right);
        engine.place_food(Food::new(ahead, FoodKind::Bonus));
        engine.tick();
    }

    assert!(engine.score() >= 100);
    assert_eq!(unlock_count(&events, "score_100"), 0);
}

#[test]
fn time_attack_ends_when_the_clock_runs_out() {
    let mut difficulty = DifficultyTable::default();
    for row in &mut difficulty.levels {
        row.special_food_chance = 0.0;
    }
    let config = EngineConfig {
        difficulty,
        modes: vec![ModeProfile {
            obstacles: false,
            power_ups: false,
            time_limit_secs: Some(1),
            ..ModeProfile::builtin(GameMode::TimeAttack)
        }],
        ..EngineConfig::default()
    };
    let mut engine = GameEngine::new_with_seed(config, 12);
    engine.apply_command(Command::SetMode(GameMode::TimeAttack, 1));
    start(&mut engine);
    engine.place_food(Food::normal(Position { x: 0, y: 0 }));

    for _ in 0..7 {
        engine.tick();
    }
    assert_eq!(engine.state(), GameState::Playing);

    engine.tick();
    assert_eq!(engine.state(), GameState::GameOver);
    assert_eq!(engine.game_over_reason(), Some("time up"));
}

#[test]
fn expired_food_is_replaced() {
    let (sender, events) = mpsc::channel();
    let mut engine =
        GameEngine::new_with_seed(EngineConfig::default(), 13).with_sink(Box::new(sender));
    start(&mut engine);
    engine.place_food(Food::normal(Position { x: 0, y: 0 }).with_lifetime(2));

    engine.tick();
    assert_eq!(engine.foods()[0].position, Position { x: 0, y: 0 });
    engine.tick();

    assert_eq!(engine.foods().len(), 1);
    assert!(
        events
            .try_iter()
            .any(|event| matches!(event, GameEvent::FoodExpired { .. }))
    );
}

#[test]
fn survival_food_disappears_on_its_own() {
    let mut engine = GameEngine::new_with_seed(EngineConfig::default(), 14);
    engine.apply_command(Command::SetMode(GameMode::Survival, 2));
    start(&mut engine);

    assert_eq!(engine.foods().len(), 1);
    assert!(engine.foods()[0].lifetime.is_some());
}

#[test]
fn mode_change_is_refused_while_paused() {
    let mut engine = GameEngine::new_with_seed(EngineConfig::default(), 15);
    start(&mut engine);
    engine.apply_command(Command::Pause);

    engine.apply_command(Command::SetMode(GameMode::Modern, 3));
    assert_eq!(engine.mode(), GameMode::Classic);

    engine.apply_command(Command::Reset);
    engine.apply_command(Command::SetMode(GameMode::Modern, 3));
    assert_eq!(engine.mode(), GameMode::Modern);
    assert_eq!(engine.grid().size().width, 40);
    assert_eq!(engine.state(), GameState::Menu);
}
