use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::snake::Position;

/// Obstacle behaviour class.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObstacleKind {
    /// Immutable for the whole session.
    Wall,
    /// Removed when a ghosted head runs into it.
    Destructible,
    /// Steps to a free neighbouring cell now and then.
    Moving,
}

impl ObstacleKind {
    /// Kinds used for randomly placed interior obstacles.
    pub const INTERIOR: [Self; 3] = [Self::Wall, Self::Destructible, Self::Moving];

    /// Picks an interior kind uniformly.
    #[must_use]
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::INTERIOR[rng.gen_range(0..Self::INTERIOR.len())]
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct Obstacle {
    pub position: Position,
    pub kind: ObstacleKind,
}

impl Obstacle {
    #[must_use]
    pub fn wall(position: Position) -> Self {
        Self {
            position,
            kind: ObstacleKind::Wall,
        }
    }
}
