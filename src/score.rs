//! Score, combo multiplier and timed status effects.

use serde::{Deserialize, Serialize};

use crate::config::{COMBO_WINDOW_TICKS, EFFECT_DURATION_TICKS};
use crate::food::{Food, FoodKind};
use crate::power_up::PowerUpKind;

/// Combo multiplier in tenths: starts at 1.0.
const COMBO_BASE_TENTHS: u32 = 10;

/// Combo gain per food eaten (0.1).
const COMBO_STEP_TENTHS: u32 = 1;

/// Combo cap (5.0).
const COMBO_CAP_TENTHS: u32 = 50;

/// Speed multiplier of the speed-up food and speed boost power-up.
pub const FAST_SPEED_MODIFIER: f64 = 1.5;

/// Speed multiplier of the speed-down food and slow motion power-up.
pub const SLOW_SPEED_MODIFIER: f64 = 0.7;

/// Timed effect slots. Newer effects of the same slot replace older ones.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectKind {
    /// Tick speed changed by a modifier.
    Speed,
    /// Body and obstacle collisions are not fatal.
    Ghost,
    /// Food scores twice.
    DoubleScore,
}

impl EffectKind {
    pub const ALL: [Self; 3] = [Self::Speed, Self::Ghost, Self::DoubleScore];
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct SpeedEffect {
    modifier: f64,
    ticks: u32,
}

/// Currently active timed effects.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatusEffects {
    speed: Option<SpeedEffect>,
    ghost_ticks: u32,
    double_score_ticks: u32,
}

impl StatusEffects {
    /// Multiplier applied to the level speed; `1.0` when no speed effect runs.
    #[must_use]
    pub fn speed_modifier(&self) -> f64 {
        self.speed.map_or(1.0, |effect| effect.modifier)
    }

    #[must_use]
    pub fn ghost(&self) -> bool {
        self.ghost_ticks > 0
    }

    #[must_use]
    pub fn double_score(&self) -> bool {
        self.double_score_ticks > 0
    }

    /// Returns the remaining ticks of `kind`, zero when inactive.
    #[must_use]
    pub fn remaining(&self, kind: EffectKind) -> u32 {
        match kind {
            EffectKind::Speed => self.speed.map_or(0, |effect| effect.ticks),
            EffectKind::Ghost => self.ghost_ticks,
            EffectKind::DoubleScore => self.double_score_ticks,
        }
    }

    fn set_speed(&mut self, modifier: f64, ticks: u32) {
        self.speed = Some(SpeedEffect { modifier, ticks });
    }

    /// Counts every effect down by one tick and returns the ones that ended.
    pub fn tick(&mut self) -> Vec<EffectKind> {
        let mut expired = Vec::new();

        if let Some(effect) = self.speed.as_mut() {
            effect.ticks = effect.ticks.saturating_sub(1);
            if effect.ticks == 0 {
                self.speed = None;
                expired.push(EffectKind::Speed);
            }
        }
        if countdown(&mut self.ghost_ticks) {
            expired.push(EffectKind::Ghost);
        }
        if countdown(&mut self.double_score_ticks) {
            expired.push(EffectKind::DoubleScore);
        }

        expired
    }
}

/// Decrements a running timer; returns true when it just reached zero.
fn countdown(ticks: &mut u32) -> bool {
    if *ticks == 0 {
        return false;
    }
    *ticks -= 1;
    *ticks == 0
}

/// Score, combo and effect bookkeeping for one session.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreBoard {
    score: u32,
    combo_tenths: u32,
    combo_count: u32,
    best_combo: u32,
    ticks_since_food: u32,
    foods_eaten: u32,
    power_ups_collected: u32,
    effects: StatusEffects,
}

impl Default for ScoreBoard {
    fn default() -> Self {
        Self {
            score: 0,
            combo_tenths: COMBO_BASE_TENTHS,
            combo_count: 0,
            best_combo: 0,
            ticks_since_food: 0,
            foods_eaten: 0,
            power_ups_collected: 0,
            effects: StatusEffects::default(),
        }
    }
}

impl ScoreBoard {
    /// Scores one food and applies its effect. Returns the points awarded.
    ///
    /// Points use the food's value and the multiplier in force before this
    /// food raises it.
    pub fn on_food_eaten(&mut self, food: &Food) -> u32 {
        let mut points = food.value.saturating_mul(self.combo_tenths) / COMBO_BASE_TENTHS;
        if self.effects.double_score() {
            points *= 2;
        }

        self.score = self.score.saturating_add(points);
        self.combo_tenths = (self.combo_tenths + COMBO_STEP_TENTHS).min(COMBO_CAP_TENTHS);
        self.combo_count += 1;
        self.best_combo = self.best_combo.max(self.combo_count);
        self.ticks_since_food = 0;
        self.foods_eaten += 1;

        match food.kind {
            FoodKind::SpeedUp => self.effects.set_speed(FAST_SPEED_MODIFIER, EFFECT_DURATION_TICKS),
            FoodKind::SpeedDown => {
                self.effects.set_speed(SLOW_SPEED_MODIFIER, EFFECT_DURATION_TICKS);
            }
            FoodKind::Ghost => self.effects.ghost_ticks = EFFECT_DURATION_TICKS,
            FoodKind::Normal | FoodKind::Bonus => {}
        }

        points
    }

    /// Applies a collected power-up's timed effect for `ticks` ticks.
    ///
    /// `Shrink` has no timed part; the engine trims the snake itself.
    pub fn on_power_up(&mut self, kind: PowerUpKind, ticks: u32) {
        self.power_ups_collected += 1;

        match kind {
            PowerUpKind::SpeedBoost => self.effects.set_speed(FAST_SPEED_MODIFIER, ticks),
            PowerUpKind::SlowMotion => self.effects.set_speed(SLOW_SPEED_MODIFIER, ticks),
            PowerUpKind::Invincibility => {
                self.effects.ghost_ticks = self.effects.ghost_ticks.max(ticks);
            }
            PowerUpKind::DoubleScore => self.effects.double_score_ticks = ticks,
            PowerUpKind::Shrink => {}
        }
    }

    /// Advances combo decay and effect timers; returns the effects that ended.
    pub fn tick(&mut self) -> Vec<EffectKind> {
        self.ticks_since_food = self.ticks_since_food.saturating_add(1);
        if self.ticks_since_food > COMBO_WINDOW_TICKS {
            self.combo_tenths = COMBO_BASE_TENTHS;
            self.combo_count = 0;
        }

        self.effects.tick()
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    /// Current combo multiplier, between 1.0 and 5.0.
    #[must_use]
    pub fn combo_multiplier(&self) -> f64 {
        f64::from(self.combo_tenths) / f64::from(COMBO_BASE_TENTHS)
    }

    /// Foods eaten in the running combo.
    #[must_use]
    pub fn combo_count(&self) -> u32 {
        self.combo_count
    }

    #[must_use]
    pub fn best_combo(&self) -> u32 {
        self.best_combo
    }

    #[must_use]
    pub fn foods_eaten(&self) -> u32 {
        self.foods_eaten
    }

    #[must_use]
    pub fn power_ups_collected(&self) -> u32 {
        self.power_ups_collected
    }

    #[must_use]
    pub fn effects(&self) -> &StatusEffects {
        &self.effects
    }
}
