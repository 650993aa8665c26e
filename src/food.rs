use serde::{Deserialize, Serialize};

use crate::snake::Position;

/// Bonus food lifetime in ticks.
pub const BONUS_FOOD_LIFETIME_TICKS: u32 = 50;

/// Food type; every kind except `Normal` is a special food.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FoodKind {
    Normal,
    SpeedUp,
    SpeedDown,
    Ghost,
    Bonus,
}

impl FoodKind {
    /// Special kinds, drawn uniformly when a special food is rolled.
    pub const SPECIAL: [Self; 4] = [Self::SpeedUp, Self::SpeedDown, Self::Ghost, Self::Bonus];

    /// Returns the score value granted when eaten, before multipliers.
    #[must_use]
    pub fn base_value(self) -> u32 {
        match self {
            Self::Normal => 10,
            Self::SpeedUp => 15,
            Self::SpeedDown => 20,
            Self::Ghost => 25,
            Self::Bonus => 50,
        }
    }
}

/// Food entity currently active on the board.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct Food {
    pub position: Position,
    pub kind: FoodKind,
    pub value: u32,
    /// Remaining ticks; `None` never expires.
    pub lifetime: Option<u32>,
}

impl Food {
    /// Creates food of `kind`; bonus food gets its default lifetime.
    #[must_use]
    pub fn new(position: Position, kind: FoodKind) -> Self {
        let lifetime = (kind == FoodKind::Bonus).then_some(BONUS_FOOD_LIFETIME_TICKS);

        Self {
            position,
            kind,
            value: kind.base_value(),
            lifetime,
        }
    }

    /// Creates a normal food at `position`.
    #[must_use]
    pub fn normal(position: Position) -> Self {
        Self::new(position, FoodKind::Normal)
    }

    /// Caps the lifetime at `ticks`, keeping a shorter existing one.
    #[must_use]
    pub fn with_lifetime(mut self, ticks: u32) -> Self {
        self.lifetime = Some(self.lifetime.map_or(ticks, |current| current.min(ticks)));
        self
    }

    /// Advances the lifetime by one tick. Returns `true` once the food has
    /// expired and should be replaced. Has no effect on permanent food.
    pub fn tick_ttl(&mut self) -> bool {
        if let Some(ref mut ttl_ticks) = self.lifetime {
            *ttl_ticks = ttl_ticks.saturating_sub(1);
            return *ttl_ticks == 0;
        }
        false
    }
}
