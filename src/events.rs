//! Observable output of the engine: events and immutable board snapshots.

use std::sync::mpsc::Sender;
use std::time::Duration;

use serde::Serialize;

use crate::config::{BoundaryPolicy, GameMode, GridSize};
use crate::food::FoodKind;
use crate::game::GameState;
use crate::obstacle::ObstacleKind;
use crate::power_up::PowerUpKind;
use crate::score::EffectKind;
use crate::snake::Position;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FoodView {
    pub position: Position,
    pub kind: FoodKind,
    pub lifetime: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ObstacleView {
    pub position: Position,
    pub kind: ObstacleKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PowerUpView {
    pub position: Position,
    pub kind: PowerUpKind,
}

/// Active timed effect with its remaining ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EffectView {
    pub kind: EffectKind,
    pub remaining: u32,
}

/// Read-only copy of everything a renderer needs for one frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub tick: u64,
    pub state: GameState,
    pub mode: GameMode,
    pub difficulty: u8,
    pub grid: GridSize,
    pub boundary: BoundaryPolicy,
    pub score: u32,
    pub combo_multiplier: f64,
    pub ghost: bool,
    pub effects: Vec<EffectView>,
    /// Head first.
    pub snake: Vec<Position>,
    pub foods: Vec<FoodView>,
    pub obstacles: Vec<ObstacleView>,
    pub power_ups: Vec<PowerUpView>,
}

/// Notifications emitted by the engine, in the order they happen.
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    StateChanged {
        from: GameState,
        to: GameState,
        /// Set for game over transitions.
        reason: Option<String>,
    },
    Snapshot(Snapshot),
    FoodEaten {
        kind: FoodKind,
        position: Position,
        points: u32,
    },
    FoodExpired {
        kind: FoodKind,
        position: Position,
    },
    PowerUpCollected(PowerUpKind),
    EffectExpired(EffectKind),
    ObstacleDestroyed(Position),
    AchievementUnlocked {
        id: &'static str,
        name: &'static str,
    },
    TickIntervalChanged(Duration),
    /// Score carried the session to a higher difficulty level.
    LevelUp(u8),
    NewHighScore {
        mode: GameMode,
        score: u32,
    },
}

/// Observer passed into the engine at construction.
pub trait EventSink {
    fn emit(&mut self, event: GameEvent);
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&mut self, _event: GameEvent) {}
}

/// Forwards events over a channel; a dropped receiver silently ends delivery.
impl EventSink for Sender<GameEvent> {
    fn emit(&mut self, event: GameEvent) {
        let _ = self.send(event);
    }
}
