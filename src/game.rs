use std::time::Duration;

use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use crate::achievements::{AchievementBook, ProgressInput};
use crate::collision::{Collision, CollisionResolver};
use crate::config::{
    DEFAULT_DIFFICULTY, EngineConfig, GameMode, MAX_DIFFICULTY, MAX_POWER_UPS,
    MOVING_OBSTACLE_PERIOD_TICKS, ModeProfile, POINTS_PER_LEVEL, POWER_UP_SPAWN_CHANCE,
    SURVIVAL_FOOD_LIFETIME_TICKS,
};
use crate::difficulty::DifficultyController;
use crate::events::{
    EffectView, EventSink, FoodView, GameEvent, NullSink, ObstacleView, PowerUpView, Snapshot,
};
use crate::food::{Food, FoodKind};
use crate::grid::GridWorld;
use crate::input::{Command, Direction};
use crate::obstacle::{Obstacle, ObstacleKind};
use crate::power_up::{PowerUp, PowerUpKind};
use crate::schedule::TickSchedule;
use crate::score::{EffectKind, ScoreBoard};
use crate::snake::Snake;
use crate::spawn::{Occupancy, SpawnPlanner};
use crate::store::{MemoryStore, ProgressStore};

/// Tail segments removed by the shrink power-up.
const SHRINK_SEGMENTS: usize = 3;

/// Current high-level gameplay state.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GameState {
    Menu,
    Ready,
    Playing,
    Paused,
    GameOver,
}

/// Per-game counters exposed to the front end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Statistics {
    pub score: u32,
    /// Difficulty level reached, including score level-ups.
    pub level: u8,
    pub ticks: u64,
    pub elapsed_ms: u64,
    pub foods_eaten: u32,
    pub power_ups_collected: u32,
    pub length: usize,
    pub max_length: usize,
    pub best_combo: u32,
}

/// Tick-driven snake simulation and its state machine.
///
/// The engine owns the board and every entity on it. External code drives
/// it through [`GameEngine::apply_command`] and calls [`GameEngine::tick`]
/// at the period reported by [`GameEngine::tick_interval`].
pub struct GameEngine {
    config: EngineConfig,
    mode: GameMode,
    profile: ModeProfile,
    grid: GridWorld,
    difficulty: DifficultyController,
    /// Level chosen through commands; each round starts from it.
    selected_level: u8,
    snake: Snake,
    foods: Vec<Food>,
    obstacles: Vec<Obstacle>,
    power_ups: Vec<PowerUp>,
    board: ScoreBoard,
    achievements: AchievementBook,
    state: GameState,
    schedule: TickSchedule,
    tick_count: u64,
    elapsed: Duration,
    max_length: usize,
    unsaved_unlocks: bool,
    game_over_reason: Option<String>,
    rng: StdRng,
    sink: Box<dyn EventSink>,
    store: Box<dyn ProgressStore>,
}

impl GameEngine {
    /// Creates an engine in the menu seeded from OS entropy.
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// Creates a deterministic engine for tests and reproducible simulations.
    #[must_use]
    pub fn new_with_seed(config: EngineConfig, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: EngineConfig, rng: StdRng) -> Self {
        let mode = GameMode::Classic;
        let profile = config.mode_profile(mode);
        let grid = GridWorld::new(profile.grid, profile.boundary);
        let difficulty = DifficultyController::new(config.difficulty.clone(), DEFAULT_DIFFICULTY);
        let schedule = TickSchedule::stopped(difficulty.tick_interval());

        let mut engine = Self {
            config,
            mode,
            profile,
            grid,
            difficulty,
            selected_level: DEFAULT_DIFFICULTY,
            snake: Snake::new(grid.center(), Direction::Right),
            foods: Vec::new(),
            obstacles: Vec::new(),
            power_ups: Vec::new(),
            board: ScoreBoard::default(),
            achievements: AchievementBook::default(),
            state: GameState::Menu,
            schedule,
            tick_count: 0,
            elapsed: Duration::ZERO,
            max_length: 1,
            unsaved_unlocks: false,
            game_over_reason: None,
            rng,
            sink: Box::new(NullSink),
            store: Box::new(MemoryStore::default()),
        };
        engine.reset_board();
        engine
    }

    /// Routes all further events to `sink`.
    #[must_use]
    pub fn with_sink(mut self, sink: Box<dyn EventSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Uses `store` for persistence and restores achievements from it.
    ///
    /// A failing load keeps the fresh catalog.
    #[must_use]
    pub fn with_store(mut self, store: Box<dyn ProgressStore>) -> Self {
        match store.load_achievements() {
            Ok(records) => self.achievements = AchievementBook::restore(&records),
            Err(error) => warn!("failed to load achievements: {error}"),
        }
        self.store = store;
        self
    }

    /// Applies one external command; commands outside their state are dropped.
    pub fn apply_command(&mut self, command: Command) {
        match command {
            Command::Direction(direction) => self.request_direction(direction),
            Command::Start => self.request_start(),
            Command::Pause => self.request_pause(),
            Command::Reset => self.request_reset(),
            Command::SetMode(mode, difficulty) => self.set_mode(mode, difficulty),
            Command::SetDifficulty(level) => self.set_difficulty(level),
        }
    }

    /// Latches a direction for the next tick; only honoured while playing.
    pub fn request_direction(&mut self, direction: Direction) {
        if self.state == GameState::Playing {
            self.snake.request_direction(direction);
        }
    }

    /// MENU → READY (or straight to PLAYING without confirmation), READY → PLAYING.
    pub fn request_start(&mut self) {
        match self.state {
            GameState::Menu => {
                self.prepare_round();
                if self.config.require_ready_confirmation {
                    self.transition(GameState::Ready, None);
                } else {
                    self.begin_play();
                }
                self.emit_snapshot();
            }
            GameState::Ready => {
                self.begin_play();
                self.emit_snapshot();
            }
            GameState::Playing | GameState::Paused | GameState::GameOver => {}
        }
    }

    /// Toggles between PLAYING and PAUSED.
    pub fn request_pause(&mut self) {
        match self.state {
            GameState::Playing => {
                self.schedule.stop();
                self.transition(GameState::Paused, None);
            }
            GameState::Paused => {
                self.schedule.start(self.current_interval());
                self.transition(GameState::Playing, None);
            }
            GameState::Menu | GameState::Ready | GameState::GameOver => return,
        }
        self.emit_snapshot();
    }

    /// Returns to the menu with a fresh board for the current mode.
    pub fn request_reset(&mut self) {
        self.reset_board();
        if self.state != GameState::Menu {
            self.transition(GameState::Menu, None);
        }
        self.emit_snapshot();
    }

    /// Switches mode and difficulty; accepted outside of running games only.
    pub fn set_mode(&mut self, mode: GameMode, difficulty: u8) {
        if matches!(self.state, GameState::Playing | GameState::Paused) {
            return;
        }

        self.mode = mode;
        self.profile = self.config.mode_profile(mode);
        self.grid = GridWorld::new(self.profile.grid, self.profile.boundary);
        self.selected_level = self.difficulty.set_difficulty(difficulty);
        info!(
            "mode set to {mode} at difficulty {} ({}x{})",
            self.difficulty.level(),
            self.profile.grid.width,
            self.profile.grid.height
        );

        self.request_reset();
    }

    /// Changes the difficulty level (clamped to `1..=10`).
    ///
    /// While playing the tick interval is swapped immediately and the board
    /// is left alone; in the menu the obstacles are rebuilt for the level.
    pub fn set_difficulty(&mut self, level: u8) {
        let level = self.difficulty.set_difficulty(level);
        self.selected_level = level;
        debug!("difficulty set to {level}");

        if self.state == GameState::Menu {
            self.reset_board();
            self.emit_snapshot();
        } else {
            self.retime();
        }
    }

    /// Advances the simulation by one tick. Does nothing unless PLAYING.
    pub fn tick(&mut self) {
        if self.state != GameState::Playing {
            return;
        }

        self.tick_count += 1;
        self.elapsed += self.schedule.period();

        self.snake.adopt_pending_direction();
        let proposed = self.snake.next_head_position();
        let collision = {
            let occupancy = Occupancy {
                snake: &self.snake,
                foods: &self.foods,
                obstacles: &self.obstacles,
                power_ups: &self.power_ups,
            };
            CollisionResolver::new(self.grid).classify(&occupancy, proposed)
        };

        if collision.is_fatal(self.board.effects().ghost()) {
            let reason = collision.reason().unwrap_or("collision");
            self.game_over(reason);
            return;
        }
        let Some(head) = collision.head() else {
            return;
        };

        let eaten = match collision {
            Collision::Food { index, .. } => {
                self.snake.grow(1);
                Some(self.foods.remove(index))
            }
            Collision::Obstacle { index, position } => {
                if self.obstacles[index].kind == ObstacleKind::Destructible {
                    self.obstacles.remove(index);
                    debug!("ghost head destroyed obstacle at {position:?}");
                    self.sink.emit(GameEvent::ObstacleDestroyed(position));
                }
                None
            }
            _ => None,
        };

        self.snake.advance(head);

        if let Some(food) = eaten {
            self.consume_food(food);
        }
        if let Collision::PowerUp { index, .. } = collision {
            let power_up = self.power_ups.remove(index);
            self.collect_power_up(power_up);
        }
        self.max_length = self.max_length.max(self.snake.len());

        self.expire_entities();
        if self.tick_count % MOVING_OBSTACLE_PERIOD_TICKS == 0 {
            self.move_obstacles();
        }
        self.maybe_spawn_power_up();

        self.check_achievements();

        if let Some(limit) = self.profile.time_limit_secs
            && self.elapsed >= Duration::from_secs(u64::from(limit))
        {
            self.game_over("time up");
            return;
        }

        self.emit_snapshot();
        self.flush_unlocks();
    }

    /// Builds a read-only view of the current board.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            tick: self.tick_count,
            state: self.state,
            mode: self.mode,
            difficulty: self.difficulty.level(),
            grid: self.grid.size(),
            score: self.board.score(),
            boundary: self.grid.policy(),
            combo_multiplier: self.board.combo_multiplier(),
            ghost: self.board.effects().ghost(),
            effects: EffectKind::ALL
                .into_iter()
                .filter_map(|kind| {
                    let remaining = self.board.effects().remaining(kind);
                    (remaining > 0).then_some(EffectView { kind, remaining })
                })
                .collect(),
            snake: self.snake.segments().copied().collect(),
            foods: self
                .foods
                .iter()
                .map(|food| FoodView {
                    position: food.position,
                    kind: food.kind,
                    lifetime: food.lifetime,
                })
                .collect(),
            obstacles: self
                .obstacles
                .iter()
                .map(|obstacle| ObstacleView {
                    position: obstacle.position,
                    kind: obstacle.kind,
                })
                .collect(),
            power_ups: self
                .power_ups
                .iter()
                .map(|power_up| PowerUpView {
                    position: power_up.position,
                    kind: power_up.kind,
                })
                .collect(),
        }
    }

    /// Period at which the driver should call [`GameEngine::tick`]; `None`
    /// while the tick source is stopped.
    #[must_use]
    pub fn tick_interval(&self) -> Option<Duration> {
        self.schedule.interval()
    }

    #[must_use]
    pub fn state(&self) -> GameState {
        self.state
    }

    #[must_use]
    pub fn mode(&self) -> GameMode {
        self.mode
    }

    #[must_use]
    pub fn difficulty(&self) -> u8 {
        self.difficulty.level()
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.board.score()
    }

    #[must_use]
    pub fn combo_multiplier(&self) -> f64 {
        self.board.combo_multiplier()
    }

    #[must_use]
    pub fn ghost_active(&self) -> bool {
        self.board.effects().ghost()
    }

    #[must_use]
    pub fn grid(&self) -> GridWorld {
        self.grid
    }

    #[must_use]
    pub fn snake(&self) -> &Snake {
        &self.snake
    }

    #[must_use]
    pub fn foods(&self) -> &[Food] {
        &self.foods
    }

    #[must_use]
    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    #[must_use]
    pub fn power_ups(&self) -> &[PowerUp] {
        &self.power_ups
    }

    #[must_use]
    pub fn achievements(&self) -> &AchievementBook {
        &self.achievements
    }

    /// Reason given for the last game over, if the game has ended.
    #[must_use]
    pub fn game_over_reason(&self) -> Option<&str> {
        self.game_over_reason.as_deref()
    }

    /// Best score stored for the current mode; `0` when unavailable.
    #[must_use]
    pub fn high_score(&self) -> u32 {
        self.store.high_score(self.mode).unwrap_or_else(|error| {
            warn!("failed to read high score: {error}");
            0
        })
    }

    #[must_use]
    pub fn statistics(&self) -> Statistics {
        Statistics {
            score: self.board.score(),
            level: self.difficulty.level(),
            ticks: self.tick_count,
            elapsed_ms: u64::try_from(self.elapsed.as_millis()).unwrap_or(u64::MAX),
            foods_eaten: self.board.foods_eaten(),
            power_ups_collected: self.board.power_ups_collected(),
            length: self.snake.len(),
            max_length: self.max_length,
            best_combo: self.board.best_combo(),
        }
    }

    /// Replaces the snake, e.g. to set up a scenario.
    pub fn place_snake(&mut self, snake: Snake) {
        self.max_length = self.max_length.max(snake.len());
        self.snake = snake;
    }

    /// Replaces all food with `food`, e.g. to set up a scenario.
    pub fn place_food(&mut self, food: Food) {
        self.foods = vec![food];
    }

    /// Replaces the obstacle set, e.g. to set up a scenario.
    pub fn place_obstacles(&mut self, obstacles: Vec<Obstacle>) {
        self.obstacles = obstacles;
    }

    /// Replaces the power-up set, e.g. to set up a scenario.
    pub fn place_power_ups(&mut self, power_ups: Vec<PowerUp>) {
        self.power_ups = power_ups;
    }

    fn transition(&mut self, to: GameState, reason: Option<&str>) {
        let from = self.state;
        self.state = to;
        match reason {
            Some(reason) => info!("{from:?} -> {to:?}: {reason}"),
            None => info!("{from:?} -> {to:?}"),
        }
        self.sink.emit(GameEvent::StateChanged {
            from,
            to,
            reason: reason.map(str::to_owned),
        });
    }

    fn begin_play(&mut self) {
        self.schedule.start(self.current_interval());
        self.transition(GameState::Playing, None);
    }

    /// Centers the snake and respawns food for a new round; keeps obstacles.
    fn prepare_round(&mut self) {
        self.board = ScoreBoard::default();
        self.snake = Snake::new(self.grid.center(), Direction::Right);
        self.power_ups.clear();
        self.foods.clear();
        self.tick_count = 0;
        self.elapsed = Duration::ZERO;
        self.max_length = 1;
        self.game_over_reason = None;
        self.difficulty.set_difficulty(self.selected_level);
        self.schedule.stop();
        self.schedule.set_interval(self.difficulty.tick_interval());
        self.achievements.begin_session();
        self.spawn_food();
    }

    fn reset_board(&mut self) {
        self.prepare_round();
        self.regenerate_obstacles();
    }

    fn game_over(&mut self, reason: &str) {
        self.schedule.stop();
        self.game_over_reason = Some(reason.to_owned());
        self.transition(GameState::GameOver, Some(reason));
        self.check_achievements();
        self.emit_snapshot();

        self.record_high_score();
        self.unsaved_unlocks = true;
        self.flush_unlocks();
    }

    fn record_high_score(&mut self) {
        let score = self.board.score();
        match self.store.high_score(self.mode) {
            Ok(best) if score > best => {
                if let Err(error) = self.store.save_high_score(self.mode, score) {
                    warn!("failed to save high score: {error}");
                }
                self.sink.emit(GameEvent::NewHighScore {
                    mode: self.mode,
                    score,
                });
            }
            Ok(_) => {}
            Err(error) => warn!("failed to read high score: {error}"),
        }
    }

    fn consume_food(&mut self, food: Food) {
        let points = self.board.on_food_eaten(&food);
        debug!(
            "ate {:?} at {:?} for {points} points, score {}",
            food.kind,
            food.position,
            self.board.score()
        );
        self.sink.emit(GameEvent::FoodEaten {
            kind: food.kind,
            position: food.position,
            points,
        });

        self.spawn_food();
        self.check_level_up();
        if matches!(food.kind, FoodKind::SpeedUp | FoodKind::SpeedDown) {
            self.retime();
        }
    }

    /// Raises the level by one for every [`POINTS_PER_LEVEL`] scored.
    ///
    /// Never lowers a level picked through commands.
    fn check_level_up(&mut self) {
        let earned = self.board.score() / POINTS_PER_LEVEL + 1;
        let earned = u8::try_from(earned)
            .unwrap_or(MAX_DIFFICULTY)
            .min(MAX_DIFFICULTY);
        if earned <= self.difficulty.level() {
            return;
        }

        let level = self.difficulty.set_difficulty(earned);
        info!("level up to {level} at score {}", self.board.score());
        self.sink.emit(GameEvent::LevelUp(level));
        self.retime();
    }

    fn collect_power_up(&mut self, power_up: PowerUp) {
        let ticks = power_up.duration_ticks(self.schedule.period());
        self.board.on_power_up(power_up.kind, ticks);
        debug!("collected {:?} for {ticks} ticks", power_up.kind);
        self.sink.emit(GameEvent::PowerUpCollected(power_up.kind));

        match power_up.kind {
            PowerUpKind::Shrink => self.snake.shrink(SHRINK_SEGMENTS),
            PowerUpKind::SpeedBoost | PowerUpKind::SlowMotion => self.retime(),
            PowerUpKind::Invincibility | PowerUpKind::DoubleScore => {}
        }
    }

    /// Counts down timed foods, power-ups and status effects.
    fn expire_entities(&mut self) {
        let mut expired_foods = Vec::new();
        self.foods.retain_mut(|food| {
            let expired = food.tick_ttl();
            if expired {
                expired_foods.push(*food);
            }
            !expired
        });
        for food in expired_foods {
            debug!("{:?} food at {:?} expired", food.kind, food.position);
            self.sink.emit(GameEvent::FoodExpired {
                kind: food.kind,
                position: food.position,
            });
            self.spawn_food();
        }

        self.power_ups.retain_mut(|power_up| !power_up.tick_ttl());

        for effect in self.board.tick() {
            debug!("{effect:?} effect expired");
            self.sink.emit(GameEvent::EffectExpired(effect));
            if effect == EffectKind::Speed {
                self.retime();
            }
        }
    }

    fn spawn_food(&mut self) {
        let chance = self.difficulty.profile().special_food_chance;
        let occupancy = Occupancy {
            snake: &self.snake,
            foods: &self.foods,
            obstacles: &self.obstacles,
            power_ups: &self.power_ups,
        };
        let mut food = SpawnPlanner::new(self.grid).spawn_food(&mut self.rng, &occupancy, chance);
        if self.profile.disappearing_food {
            food = food.with_lifetime(SURVIVAL_FOOD_LIFETIME_TICKS);
        }
        self.foods.push(food);
    }

    fn regenerate_obstacles(&mut self) {
        self.obstacles.clear();
        if self.profile.boundary_walls {
            self.obstacles
                .extend(self.grid.border_cells().map(Obstacle::wall));
        }
        // Food spawned before the walls went up may now sit under one.
        self.foods
            .retain(|food| !self.obstacles.iter().any(|o| o.position == food.position));

        if self.profile.obstacles {
            let count = self
                .difficulty
                .profile()
                .obstacle_count
                .saturating_mul(self.profile.obstacle_factor);
            let count = usize::try_from(count)
                .unwrap_or(usize::MAX)
                .min(self.grid.size().total_cells());
            let planner = SpawnPlanner::new(self.grid);
            for _ in 0..count {
                let occupancy = Occupancy {
                    snake: &self.snake,
                    foods: &self.foods,
                    obstacles: &self.obstacles,
                    power_ups: &self.power_ups,
                };
                let Some(obstacle) = planner.spawn_obstacle(&mut self.rng, &occupancy) else {
                    break;
                };
                self.obstacles.push(obstacle);
            }
        }

        if self.foods.is_empty() {
            self.spawn_food();
        }
    }

    fn move_obstacles(&mut self) {
        for index in 0..self.obstacles.len() {
            if self.obstacles[index].kind != ObstacleKind::Moving {
                continue;
            }

            let origin = self.obstacles[index].position;
            let mut directions = Direction::ALL;
            directions.shuffle(&mut self.rng);

            let target = {
                let occupancy = Occupancy {
                    snake: &self.snake,
                    foods: &self.foods,
                    obstacles: &self.obstacles,
                    power_ups: &self.power_ups,
                };
                directions
                    .into_iter()
                    .map(|direction| origin.step(direction))
                    .find(|cell| self.grid.contains(*cell) && !occupancy.is_occupied(*cell))
            };

            if let Some(target) = target {
                self.obstacles[index].position = target;
            }
        }
    }

    fn maybe_spawn_power_up(&mut self) {
        if !self.profile.power_ups
            || self.power_ups.len() >= MAX_POWER_UPS
            || !self.rng.gen_bool(POWER_UP_SPAWN_CHANCE)
        {
            return;
        }

        let occupancy = Occupancy {
            snake: &self.snake,
            foods: &self.foods,
            obstacles: &self.obstacles,
            power_ups: &self.power_ups,
        };
        let planner = SpawnPlanner::new(self.grid);
        if let Some(power_up) = planner.spawn_power_up(&mut self.rng, &occupancy) {
            debug!("spawned {:?} at {:?}", power_up.kind, power_up.position);
            self.power_ups.push(power_up);
        }
    }

    fn check_achievements(&mut self) {
        let input = ProgressInput {
            score: self.board.score(),
            length: u32::try_from(self.snake.len()).unwrap_or(u32::MAX),
            difficulty: self.difficulty.level(),
            elapsed_secs: u32::try_from(self.elapsed.as_secs()).unwrap_or(u32::MAX),
            mode: Some(self.mode),
            combo: self.board.combo_count(),
            power_ups_collected: self.board.power_ups_collected(),
            games_completed: u32::from(self.state == GameState::GameOver),
        };

        for spec in self.achievements.check(&input) {
            info!("achievement unlocked: {}", spec.id);
            self.sink.emit(GameEvent::AchievementUnlocked {
                id: spec.id,
                name: spec.name,
            });
            self.unsaved_unlocks = true;
        }
    }

    /// Persists achievements after the tick that changed them.
    fn flush_unlocks(&mut self) {
        if !self.unsaved_unlocks {
            return;
        }
        self.unsaved_unlocks = false;

        if let Err(error) = self.store.save_achievements(&self.achievements.records()) {
            warn!("failed to save achievements: {error}");
        }
    }

    fn current_interval(&self) -> Duration {
        self.difficulty
            .tick_interval_with(self.board.effects().speed_modifier())
    }

    /// Re-derives the interval from level and speed effects.
    fn retime(&mut self) {
        let interval = self.current_interval();
        if interval != self.schedule.period() {
            self.schedule.set_interval(interval);
            debug!("tick interval now {interval:?}");
            self.sink.emit(GameEvent::TickIntervalChanged(interval));
        }
    }

    fn emit_snapshot(&mut self) {
        let snapshot = self.snapshot();
        self.sink.emit(GameEvent::Snapshot(snapshot));
    }
}
