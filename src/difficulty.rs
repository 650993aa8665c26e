use std::time::Duration;

use log::warn;

use crate::config::{
    DifficultyTable, LevelProfile, MAX_DIFFICULTY, MIN_DIFFICULTY, MIN_TICK_INTERVAL_MS,
};

/// Maps the difficulty level to tick speed and spawn tuning.
#[derive(Debug, Clone)]
pub struct DifficultyController {
    table: DifficultyTable,
    level: u8,
}

impl DifficultyController {
    /// Creates a controller at `level`.
    ///
    /// A table whose speeds do not strictly increase with the level is
    /// replaced by the built-in one so the interval stays monotonic.
    #[must_use]
    pub fn new(table: DifficultyTable, level: u8) -> Self {
        let table = if table.is_valid() {
            table
        } else {
            warn!("difficulty table is incomplete or not monotonic, using built-in table");
            DifficultyTable::default()
        };

        Self {
            table,
            level: level.clamp(MIN_DIFFICULTY, MAX_DIFFICULTY),
        }
    }

    /// Sets the level, clamping into `1..=10`, and returns the level in force.
    pub fn set_difficulty(&mut self, level: u8) -> u8 {
        self.level = level.clamp(MIN_DIFFICULTY, MAX_DIFFICULTY);
        self.level
    }

    #[must_use]
    pub fn level(&self) -> u8 {
        self.level
    }

    /// Returns the tuning row of the current level.
    #[must_use]
    pub fn profile(&self) -> LevelProfile {
        self.table.profile(self.level)
    }

    /// Tick interval of the current level without status effects.
    #[must_use]
    pub fn tick_interval(&self) -> Duration {
        self.tick_interval_with(1.0)
    }

    /// Tick interval with a speed multiplier applied (`> 1.0` is faster).
    #[must_use]
    pub fn tick_interval_with(&self, speed_modifier: f64) -> Duration {
        interval_for_speed(f64::from(self.profile().speed) * speed_modifier)
    }

    /// Tick interval the table gives `level`, clamped into range.
    #[must_use]
    pub fn interval_for_level(&self, level: u8) -> Duration {
        interval_for_speed(f64::from(self.table.profile(level).speed))
    }
}

/// Converts moves per second into a tick interval, never below the floor.
fn interval_for_speed(moves_per_second: f64) -> Duration {
    let floor = Duration::from_millis(MIN_TICK_INTERVAL_MS);
    if moves_per_second <= 0.0 {
        return floor;
    }

    let millis = (1000.0 / moves_per_second).round();
    Duration::from_millis(millis as u64).max(floor)
}
