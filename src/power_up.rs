use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::POWER_UP_LIFETIME_TICKS;
use crate::snake::Position;

/// Collectible power-up types.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PowerUpKind {
    SpeedBoost,
    SlowMotion,
    Invincibility,
    DoubleScore,
    Shrink,
}

impl PowerUpKind {
    pub const ALL: [Self; 5] = [
        Self::SpeedBoost,
        Self::SlowMotion,
        Self::Invincibility,
        Self::DoubleScore,
        Self::Shrink,
    ];

    /// How long the effect lasts once collected.
    #[must_use]
    pub fn duration(self) -> Duration {
        let secs = match self {
            Self::SpeedBoost | Self::Shrink => 5,
            Self::SlowMotion => 8,
            Self::Invincibility => 3,
            Self::DoubleScore => 10,
        };
        Duration::from_secs(secs)
    }

    #[must_use]
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::ALL[rng.gen_range(0..Self::ALL.len())]
    }
}

/// Power-up waiting on the board.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct PowerUp {
    pub position: Position,
    pub kind: PowerUpKind,
    pub duration: Duration,
    /// Ticks left before it disappears uncollected.
    pub lifetime: u32,
}

impl PowerUp {
    #[must_use]
    pub fn new(position: Position, kind: PowerUpKind) -> Self {
        Self {
            position,
            kind,
            duration: kind.duration(),
            lifetime: POWER_UP_LIFETIME_TICKS,
        }
    }

    /// Converts the effect duration into whole ticks at `interval`, at least one.
    #[must_use]
    pub fn duration_ticks(&self, interval: Duration) -> u32 {
        let interval_ms = interval.as_millis().max(1);
        let ticks = self.duration.as_millis().div_ceil(interval_ms);
        u32::try_from(ticks).unwrap_or(u32::MAX).max(1)
    }

    /// Advances the board lifetime; returns `true` once it has expired.
    pub fn tick_ttl(&mut self) -> bool {
        self.lifetime = self.lifetime.saturating_sub(1);
        self.lifetime == 0
    }
}
