//! Tick-driven Snake simulation on a bounded grid.
//!
//! [`game::GameEngine`] owns the board and state machine; everything else
//! is a collaborator it drives once per tick.

pub mod achievements;
pub mod autopilot;
pub mod collision;
pub mod config;
pub mod difficulty;
pub mod events;
pub mod food;
pub mod game;
pub mod grid;
pub mod input;
pub mod obstacle;
pub mod power_up;
pub mod schedule;
pub mod score;
pub mod snake;
pub mod spawn;
pub mod store;
