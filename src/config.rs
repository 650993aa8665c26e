use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::snake::Position;

/// Logical grid dimensions passed through the engine as a named type.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
pub struct GridSize {
    pub width: u16,
    pub height: u16,
}

impl GridSize {
    /// Returns the total number of cells in the grid.
    #[must_use]
    pub fn total_cells(self) -> usize {
        usize::from(self.width) * usize::from(self.height)
    }

    /// Returns the center cell used for spawning the snake.
    #[must_use]
    pub fn center(self) -> Position {
        Position {
            x: i32::from(self.width / 2),
            y: i32::from(self.height / 2),
        }
    }
}

/// Lowest accepted difficulty level.
pub const MIN_DIFFICULTY: u8 = 1;

/// Highest accepted difficulty level.
pub const MAX_DIFFICULTY: u8 = 10;

/// Difficulty used by a freshly constructed engine.
pub const DEFAULT_DIFFICULTY: u8 = 1;

/// Minimum tick interval in milliseconds, whatever the level or effects.
pub const MIN_TICK_INTERVAL_MS: u64 = 30;

/// Random candidates tried before the spiral fallback kicks in.
pub const SPAWN_ATTEMPTS: usize = 100;

/// Chebyshev radius around the grid center kept free of obstacles.
pub const OBSTACLE_SAFE_RADIUS: i32 = 2;

/// Cell used for food when the board has no free cell left.
pub const EMERGENCY_FOOD_POSITION: Position = Position { x: 0, y: 0 };

/// Ticks a food-granted status effect stays active.
pub const EFFECT_DURATION_TICKS: u32 = 50;

/// Ticks a food survives in modes with disappearing food.
pub const SURVIVAL_FOOD_LIFETIME_TICKS: u32 = 80;

/// Ticks without eating after which the combo multiplier resets.
pub const COMBO_WINDOW_TICKS: u32 = 40;

/// Per-tick probability of a power-up appearing when the mode allows them.
pub const POWER_UP_SPAWN_CHANCE: f64 = 0.01;

/// Upper bound of simultaneously visible power-ups.
pub const MAX_POWER_UPS: usize = 3;

/// Ticks an uncollected power-up stays on the board.
pub const POWER_UP_LIFETIME_TICKS: u32 = 100;

/// Moving obstacles take one step every this many ticks.
pub const MOVING_OBSTACLE_PERIOD_TICKS: u64 = 10;

/// Score needed per automatic level-up.
pub const POINTS_PER_LEVEL: u32 = 100;

/// Play time granted in time attack mode.
pub const TIME_ATTACK_LIMIT_SECS: u32 = 120;

/// Available game modes.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameMode {
    Classic,
    Modern,
    TimeAttack,
    Freestyle,
    Maze,
    Survival,
}

impl GameMode {
    /// All modes in menu order.
    pub const ALL: [Self; 6] = [
        Self::Classic,
        Self::Modern,
        Self::TimeAttack,
        Self::Freestyle,
        Self::Maze,
        Self::Survival,
    ];

    /// Stable key used for persistence and the CLI.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Classic => "classic",
            Self::Modern => "modern",
            Self::TimeAttack => "time_attack",
            Self::Freestyle => "freestyle",
            Self::Maze => "maze",
            Self::Survival => "survival",
        }
    }
}

impl fmt::Display for GameMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a mode name is not recognised.
#[derive(Debug, Clone, Error, Eq, PartialEq)]
#[error("unknown game mode `{0}`")]
pub struct ParseModeError(String);

impl FromStr for GameMode {
    type Err = ParseModeError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let key = raw.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|mode| mode.as_str() == key)
            .ok_or_else(|| ParseModeError(raw.to_owned()))
    }
}

/// What happens when the head leaves the grid.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundaryPolicy {
    /// Leaving the grid is a fatal collision.
    Clamp,
    /// Coordinates wrap around modulo the grid size.
    Wrap,
}

/// Feature set and board layout of one game mode.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModeProfile {
    pub mode: GameMode,
    pub grid: GridSize,
    pub boundary: BoundaryPolicy,
    /// Random interior obstacles are generated.
    pub obstacles: bool,
    /// The outer ring of the grid is filled with walls.
    pub boundary_walls: bool,
    /// Multiplier applied to the level's obstacle count.
    pub obstacle_factor: u32,
    pub power_ups: bool,
    pub time_limit_secs: Option<u32>,
    /// Every food expires after [`SURVIVAL_FOOD_LIFETIME_TICKS`].
    pub disappearing_food: bool,
}

impl ModeProfile {
    /// Returns the built-in profile for `mode`.
    #[must_use]
    pub fn builtin(mode: GameMode) -> Self {
        let standard = GridSize {
            width: 30,
            height: 20,
        };
        let base = Self {
            mode,
            grid: standard,
            boundary: BoundaryPolicy::Clamp,
            obstacles: false,
            boundary_walls: false,
            obstacle_factor: 1,
            power_ups: false,
            time_limit_secs: None,
            disappearing_food: false,
        };

        match mode {
            GameMode::Classic => base,
            GameMode::Modern => Self {
                grid: GridSize {
                    width: 40,
                    height: 25,
                },
                obstacles: true,
                power_ups: true,
                ..base
            },
            GameMode::TimeAttack => Self {
                grid: GridSize {
                    width: 25,
                    height: 15,
                },
                obstacles: true,
                power_ups: true,
                time_limit_secs: Some(TIME_ATTACK_LIMIT_SECS),
                ..base
            },
            GameMode::Freestyle => Self {
                boundary: BoundaryPolicy::Wrap,
                ..base
            },
            GameMode::Maze => Self {
                obstacles: true,
                boundary_walls: true,
                obstacle_factor: 2,
                ..base
            },
            GameMode::Survival => Self {
                obstacles: true,
                power_ups: true,
                disappearing_food: true,
                ..base
            },
        }
    }
}

/// Per-level tuning row of the difficulty table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LevelProfile {
    pub level: u8,
    /// Moves per second.
    pub speed: u32,
    /// Foods the level asks for; the engine keeps exactly one on the board.
    pub food_count: u32,
    pub obstacle_count: u32,
    pub special_food_chance: f64,
}

/// Difficulty table covering levels 1 through 10.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DifficultyTable {
    pub levels: Vec<LevelProfile>,
}

impl Default for DifficultyTable {
    fn default() -> Self {
        let levels = (MIN_DIFFICULTY..=MAX_DIFFICULTY)
            .map(|level| {
                let step = u32::from(level - 1);
                LevelProfile {
                    level,
                    speed: 8 + step * 2,
                    food_count: 1 + u32::from(level) / 2,
                    obstacle_count: if level == MAX_DIFFICULTY { 50 } else { step * 5 },
                    special_food_chance: if level == MAX_DIFFICULTY {
                        0.6
                    } else {
                        0.1 + f64::from(step) * 0.05
                    },
                }
            })
            .collect();

        Self { levels }
    }
}

impl DifficultyTable {
    /// Returns the row for `level`, clamped into the supported range.
    #[must_use]
    pub fn profile(&self, level: u8) -> LevelProfile {
        let level = level.clamp(MIN_DIFFICULTY, MAX_DIFFICULTY);
        self.levels
            .iter()
            .find(|row| row.level == level)
            .or_else(|| self.levels.first())
            .copied()
            .unwrap_or(LevelProfile {
                level,
                speed: 8,
                food_count: 1,
                obstacle_count: 0,
                special_food_chance: 0.1,
            })
    }

    /// Returns true when every level is present, speeds strictly increase
    /// with the level and chances are probabilities.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        let mut previous_speed = 0;
        for level in MIN_DIFFICULTY..=MAX_DIFFICULTY {
            let Some(row) = self.levels.iter().find(|row| row.level == level) else {
                return false;
            };
            if row.speed <= previous_speed || !(0.0..=1.0).contains(&row.special_food_chance) {
                return false;
            }
            previous_speed = row.speed;
        }
        true
    }
}

/// Static configuration handed to the engine at construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub difficulty: DifficultyTable,
    /// Overrides for built-in mode profiles; missing modes use the built-in.
    #[serde(default)]
    pub modes: Vec<ModeProfile>,
    /// When true the first start only shows the board (READY) and a second
    /// start begins play.
    pub require_ready_confirmation: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            difficulty: DifficultyTable::default(),
            modes: GameMode::ALL.into_iter().map(ModeProfile::builtin).collect(),
            require_ready_confirmation: true,
        }
    }
}

impl EngineConfig {
    /// Returns the profile of `mode`, preferring configured overrides.
    #[must_use]
    pub fn mode_profile(&self, mode: GameMode) -> ModeProfile {
        self.modes
            .iter()
            .find(|profile| profile.mode == mode && profile.grid.total_cells() > 0)
            .copied()
            .unwrap_or_else(|| ModeProfile::builtin(mode))
    }
}
