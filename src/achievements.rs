//! Static achievement catalog and threshold evaluation.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::config::{GameMode, MAX_DIFFICULTY};

/// Quantity an achievement measures.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum Metric {
    /// Finished sessions, across sessions.
    GamesCompleted,
    Score,
    Length,
    /// Foods eaten in one running combo.
    Combo,
    /// Power-ups collected, across sessions.
    PowerUpsCollected,
    /// Seconds played in survival mode.
    SurvivalSeconds,
    /// Score reached at the highest difficulty.
    ScoreAtMaxDifficulty,
    /// Every other achievement unlocked.
    AllOthers,
}

impl Metric {
    /// Cumulative metrics add the persisted progress to this session's count.
    #[must_use]
    pub fn is_cumulative(self) -> bool {
        matches!(self, Self::GamesCompleted | Self::PowerUpsCollected)
    }
}

/// One entry of the static catalog.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct AchievementSpec {
    pub id: &'static str,
    pub name: &'static str,
    pub metric: Metric,
    pub threshold: u32,
    pub hidden: bool,
}

const fn spec(
    id: &'static str,
    name: &'static str,
    metric: Metric,
    threshold: u32,
) -> AchievementSpec {
    AchievementSpec {
        id,
        name,
        metric,
        threshold,
        hidden: false,
    }
}

/// Every achievement the engine knows about.
pub const CATALOG: &[AchievementSpec] = &[
    spec("first_game", "First Game", Metric::GamesCompleted, 1),
    spec("score_100", "Century", Metric::Score, 100),
    spec("score_500", "High Roller", Metric::Score, 500),
    spec("score_1000", "Thousand Club", Metric::Score, 1000),
    spec("length_20", "Long Body", Metric::Length, 20),
    spec("combo_10", "Combo Expert", Metric::Combo, 10),
    spec("combo_20", "Combo Master", Metric::Combo, 20),
    spec("power_up_master", "Power-up Master", Metric::PowerUpsCollected, 100),
    spec("survivor", "Survivor", Metric::SurvivalSeconds, 300),
    spec("speed_demon", "Speed Demon", Metric::ScoreAtMaxDifficulty, 200),
    AchievementSpec {
        hidden: true,
        ..spec("perfectionist", "Perfectionist", Metric::AllOthers, 1)
    },
];

/// Persisted state of one achievement.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct AchievementRecord {
    pub unlocked: bool,
    pub progress: u32,
}

/// Inputs the thresholds are evaluated against.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
pub struct ProgressInput {
    pub score: u32,
    pub length: u32,
    pub difficulty: u8,
    pub elapsed_secs: u32,
    pub mode: Option<GameMode>,
    pub combo: u32,
    pub power_ups_collected: u32,
    pub games_completed: u32,
}

/// Live achievement with its progress counter.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct Achievement {
    pub spec: AchievementSpec,
    pub unlocked: bool,
    pub progress: u32,
    /// Persisted progress at session start, used by cumulative metrics.
    baseline: u32,
}

impl Achievement {
    #[must_use]
    pub fn id(&self) -> &'static str {
        self.spec.id
    }

    #[must_use]
    pub fn threshold(&self) -> u32 {
        self.spec.threshold
    }
}

/// Value of `metric` for `input`; `AllOthers` is decided separately.
#[must_use]
pub fn metric_value(metric: Metric, input: &ProgressInput) -> u32 {
    match metric {
        Metric::GamesCompleted => input.games_completed,
        Metric::Score => input.score,
        Metric::Length => input.length,
        Metric::Combo => input.combo,
        Metric::PowerUpsCollected => input.power_ups_collected,
        Metric::SurvivalSeconds => {
            if input.mode == Some(GameMode::Survival) {
                input.elapsed_secs
            } else {
                0
            }
        }
        Metric::ScoreAtMaxDifficulty => {
            if input.difficulty >= MAX_DIFFICULTY {
                input.score
            } else {
                0
            }
        }
        Metric::AllOthers => 0,
    }
}

/// Returns the indices of locked achievements whose threshold `input` meets.
///
/// Pure: nothing is mutated, so evaluating twice yields the same answer.
#[must_use]
pub fn evaluate(achievements: &[Achievement], input: &ProgressInput) -> Vec<usize> {
    let mut crossing: Vec<usize> = achievements
        .iter()
        .enumerate()
        .filter(|(_, achievement)| !achievement.unlocked)
        .filter(|(_, achievement)| achievement.spec.metric != Metric::AllOthers)
        .filter(|(_, achievement)| progress_for(achievement, input) >= achievement.threshold())
        .map(|(index, _)| index)
        .collect();

    let others_done = achievements
        .iter()
        .enumerate()
        .filter(|(_, achievement)| achievement.spec.metric != Metric::AllOthers)
        .all(|(index, achievement)| achievement.unlocked || crossing.contains(&index));

    if others_done {
        crossing.extend(
            achievements
                .iter()
                .enumerate()
                .filter(|(_, achievement)| {
                    !achievement.unlocked && achievement.spec.metric == Metric::AllOthers
                })
                .map(|(index, _)| index),
        );
    }

    crossing
}

fn progress_for(achievement: &Achievement, input: &ProgressInput) -> u32 {
    let value = metric_value(achievement.spec.metric, input);
    if achievement.spec.metric.is_cumulative() {
        achievement.baseline.saturating_add(value)
    } else {
        value
    }
}

/// The engine's copy of the catalog with progress and unlock flags.
#[derive(Debug, Clone, PartialEq)]
pub struct AchievementBook {
    entries: Vec<Achievement>,
}

impl Default for AchievementBook {
    fn default() -> Self {
        let entries = CATALOG
            .iter()
            .map(|spec| Achievement {
                spec: *spec,
                unlocked: false,
                progress: 0,
                baseline: 0,
            })
            .collect();

        Self { entries }
    }
}

impl AchievementBook {
    /// Builds the book from the catalog and previously persisted records.
    ///
    /// Unknown ids in `records` are ignored.
    #[must_use]
    pub fn restore(records: &HashMap<String, AchievementRecord>) -> Self {
        let mut book = Self::default();
        for entry in &mut book.entries {
            if let Some(record) = records.get(entry.spec.id) {
                entry.unlocked = record.unlocked;
                entry.progress = record.progress;
                entry.baseline = record.progress;
            }
        }
        book
    }

    /// Freezes cumulative progress as the baseline for a new session.
    pub fn begin_session(&mut self) {
        for entry in &mut self.entries {
            entry.baseline = entry.progress;
        }
    }

    /// Updates progress counters and unlocks every achievement crossing its
    /// threshold for the first time. Returns the newly unlocked entries.
    pub fn check(&mut self, input: &ProgressInput) -> Vec<AchievementSpec> {
        for entry in &mut self.entries {
            if entry.spec.metric == Metric::AllOthers {
                continue;
            }
            let value = progress_for(entry, input);
            entry.progress = entry.progress.max(value.min(entry.spec.threshold));
        }

        let crossing = evaluate(&self.entries, input);
        for index in &crossing {
            let entry = &mut self.entries[*index];
            entry.unlocked = true;
            entry.progress = entry.spec.threshold;
        }

        crossing.into_iter().map(|index| self.entries[index].spec).collect()
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Achievement> {
        self.entries.iter().find(|entry| entry.spec.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Achievement> {
        self.entries.iter()
    }

    #[must_use]
    pub fn unlocked_count(&self) -> usize {
        self.entries.iter().filter(|entry| entry.unlocked).count()
    }

    /// Snapshot for the persistence collaborator.
    #[must_use]
    pub fn records(&self) -> HashMap<String, AchievementRecord> {
        self.entries
            .iter()
            .map(|entry| {
                (
                    entry.spec.id.to_owned(),
                    AchievementRecord {
                        unlocked: entry.unlocked,
                        progress: entry.progress,
                    },
                )
            })
            .collect()
    }
}
