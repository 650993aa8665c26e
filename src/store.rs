use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::achievements::AchievementRecord;
use crate::config::GameMode;

const APP_DIR_NAME: &str = "snake-engine";
const PROGRESS_FILE_NAME: &str = "progress.json";

/// Failure of the persistence collaborator.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("progress file I/O failed: {0}")]
    Io(#[from] io::Error),
    #[error("progress file is malformed: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Persistence collaborator for achievements and per-mode high scores.
///
/// The engine calls it at construction, after ticks that unlocked something
/// and at game over, never in the middle of a tick.
pub trait ProgressStore {
    fn load_achievements(&self) -> Result<HashMap<String, AchievementRecord>, StoreError>;

    fn save_achievements(
        &mut self,
        records: &HashMap<String, AchievementRecord>,
    ) -> Result<(), StoreError>;

    fn high_score(&self, mode: GameMode) -> Result<u32, StoreError>;

    fn save_high_score(&mut self, mode: GameMode, score: u32) -> Result<(), StoreError>;
}

/// In-memory store; nothing survives the process.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    achievements: HashMap<String, AchievementRecord>,
    high_scores: HashMap<GameMode, u32>,
}

impl MemoryStore {
    /// Starts from previously saved achievement records.
    #[must_use]
    pub fn with_achievements(achievements: HashMap<String, AchievementRecord>) -> Self {
        Self {
            achievements,
            high_scores: HashMap::new(),
        }
    }
}

impl ProgressStore for MemoryStore {
    fn load_achievements(&self) -> Result<HashMap<String, AchievementRecord>, StoreError> {
        Ok(self.achievements.clone())
    }

    fn save_achievements(
        &mut self,
        records: &HashMap<String, AchievementRecord>,
    ) -> Result<(), StoreError> {
        self.achievements.clone_from(records);
        Ok(())
    }

    fn high_score(&self, mode: GameMode) -> Result<u32, StoreError> {
        Ok(self.high_scores.get(&mode).copied().unwrap_or(0))
    }

    fn save_high_score(&mut self, mode: GameMode, score: u32) -> Result<(), StoreError> {
        self.high_scores.insert(mode, score);
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ProgressFile {
    #[serde(default)]
    high_scores: BTreeMap<String, u32>,
    #[serde(default)]
    achievements: BTreeMap<String, AchievementRecord>,
}

/// JSON document on disk holding every mode's high score and all
/// achievement records.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Store at the platform-correct data directory.
    #[must_use]
    pub fn new() -> Self {
        Self::at(progress_path())
    }

    /// Store backed by an explicit file.
    #[must_use]
    pub fn at(path: PathBuf) -> Self {
        Self { path }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<ProgressFile, StoreError> {
        read_progress_file(&self.path)
    }

    fn write(&self, file: &ProgressFile) -> Result<(), StoreError> {
        write_progress_file(&self.path, file)
    }
}

impl Default for JsonFileStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressStore for JsonFileStore {
    fn load_achievements(&self) -> Result<HashMap<String, AchievementRecord>, StoreError> {
        Ok(self.read()?.achievements.into_iter().collect())
    }

    fn save_achievements(
        &mut self,
        records: &HashMap<String, AchievementRecord>,
    ) -> Result<(), StoreError> {
        let mut file = self.read()?;
        file.achievements = records
            .iter()
            .map(|(id, record)| (id.clone(), *record))
            .collect();
        self.write(&file)
    }

    fn high_score(&self, mode: GameMode) -> Result<u32, StoreError> {
        Ok(self
            .read()?
            .high_scores
            .get(mode.as_str())
            .copied()
            .unwrap_or(0))
    }

    fn save_high_score(&mut self, mode: GameMode, score: u32) -> Result<(), StoreError> {
        let mut file = self.read()?;
        file.high_scores.insert(mode.as_str().to_owned(), score);
        self.write(&file)
    }
}

/// Returns the platform-correct progress file path.
#[must_use]
pub fn progress_path() -> PathBuf {
    let mut base = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    base.push(APP_DIR_NAME);
    base.push(PROGRESS_FILE_NAME);
    base
}

/// Missing files read as empty progress (first run).
fn read_progress_file(path: &Path) -> Result<ProgressFile, StoreError> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(ProgressFile::default()),
        Err(e) => return Err(e.into()),
    };

    Ok(serde_json::from_str(&raw)?)
}

fn write_progress_file(path: &Path, file: &ProgressFile) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string_pretty(file)?;
    fs::write(path, json)?;
    Ok(())
}
