use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver};
use std::thread;

use clap::Parser;
use log::info;
use snake_engine::autopilot::choose_direction;
use snake_engine::config::{DEFAULT_DIFFICULTY, EngineConfig, GameMode};
use snake_engine::events::GameEvent;
use snake_engine::game::{GameEngine, GameState};
use snake_engine::input::Command;
use snake_engine::store::{JsonFileStore, MemoryStore, ProgressStore};

/// Headless Snake simulator driven by a greedy autopilot.
#[derive(Debug, Parser)]
#[command(name = "snake-sim", version)]
struct Cli {
    /// Game mode (classic, modern, time-attack, freestyle, maze, survival).
    #[arg(long, default_value = "classic")]
    mode: GameMode,

    /// Difficulty level, 1 through 10.
    #[arg(long, default_value_t = DEFAULT_DIFFICULTY)]
    difficulty: u8,

    /// Seed for a reproducible run.
    #[arg(long)]
    seed: Option<u64>,

    /// Stop after this many ticks even if the game is still running.
    #[arg(long, default_value_t = 5_000)]
    ticks: u64,

    /// Print one JSON snapshot per line instead of a text summary.
    #[arg(long)]
    json: bool,

    /// Keep high scores and achievements in memory only.
    #[arg(long = "no-persist")]
    no_persist: bool,

    /// Sleep for the engine's tick interval between ticks.
    #[arg(long)]
    realtime: bool,

    /// JSON file with an engine configuration to use instead of the defaults.
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> io::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => EngineConfig::default(),
    };
    let store: Box<dyn ProgressStore> = if cli.no_persist {
        Box::new(MemoryStore::default())
    } else {
        let store = JsonFileStore::new();
        info!("progress file: {}", store.path().display());
        Box::new(store)
    };

    let (sender, events) = mpsc::channel();
    let engine = match cli.seed {
        Some(seed) => GameEngine::new_with_seed(config, seed),
        None => GameEngine::new(config),
    };
    let mut engine = engine.with_sink(Box::new(sender)).with_store(store);

    run(&cli, &mut engine, &events)
}

fn load_config(path: &Path) -> io::Result<EngineConfig> {
    let raw = fs::read_to_string(path)?;
    serde_json::from_str(&raw).map_err(io::Error::other)
}

fn run(cli: &Cli, engine: &mut GameEngine, events: &Receiver<GameEvent>) -> io::Result<()> {
    let mut stdout = io::stdout().lock();

    engine.apply_command(Command::SetMode(cli.mode, cli.difficulty));
    engine.apply_command(Command::Start);
    engine.apply_command(Command::Start);
    drain(cli, events, &mut stdout)?;
    info!("simulating {} at difficulty {}", engine.mode(), engine.difficulty());

    for _ in 0..cli.ticks {
        if engine.state() != GameState::Playing {
            break;
        }

        if let Some(direction) = choose_direction(engine) {
            engine.request_direction(direction);
        }
        engine.tick();
        drain(cli, events, &mut stdout)?;

        if cli.realtime
            && let Some(interval) = engine.tick_interval()
        {
            thread::sleep(interval);
        }
    }

    if cli.json {
        serde_json::to_writer(&mut stdout, &engine.statistics()).map_err(io::Error::other)?;
        writeln!(stdout)?;
    } else {
        print_summary(engine, &mut stdout)?;
    }

    Ok(())
}

/// Forwards pending engine events to stdout.
fn drain(cli: &Cli, events: &Receiver<GameEvent>, out: &mut impl Write) -> io::Result<()> {
    for event in events.try_iter() {
        match event {
            GameEvent::Snapshot(snapshot) if cli.json => {
                serde_json::to_writer(&mut *out, &snapshot).map_err(io::Error::other)?;
                writeln!(out)?;
            }
            GameEvent::AchievementUnlocked { name, .. } if !cli.json => {
                writeln!(out, "achievement unlocked: {name}")?;
            }
            GameEvent::LevelUp(level) if !cli.json => {
                writeln!(out, "level up: {level}")?;
            }
            GameEvent::NewHighScore { mode, score } if !cli.json => {
                writeln!(out, "new {mode} high score: {score}")?;
            }
            GameEvent::StateChanged {
                to: GameState::GameOver,
                reason,
                ..
            } if !cli.json => {
                writeln!(out, "game over: {}", reason.as_deref().unwrap_or("unknown"))?;
            }
            _ => {}
        }
    }
    Ok(())
}

fn print_summary(engine: &GameEngine, out: &mut impl Write) -> io::Result<()> {
    let stats = engine.statistics();

    writeln!(out, "mode:        {}", engine.mode())?;
    writeln!(out, "level:       {}", stats.level)?;
    writeln!(out, "state:       {:?}", engine.state())?;
    writeln!(out, "score:       {}", stats.score)?;
    writeln!(out, "high score:  {}", engine.high_score())?;
    writeln!(out, "ticks:       {}", stats.ticks)?;
    writeln!(out, "play time:   {:.1}s", stats.elapsed_ms as f64 / 1000.0)?;
    writeln!(out, "foods eaten: {}", stats.foods_eaten)?;
    writeln!(out, "max length:  {}", stats.max_length)?;
    writeln!(out, "best combo:  {}", stats.best_combo)?;
    // Hidden achievements only count once unlocked.
    let listed = engine
        .achievements()
        .iter()
        .filter(|achievement| !achievement.spec.hidden || achievement.unlocked)
        .count();
    writeln!(
        out,
        "achievements: {}/{listed}",
        engine.achievements().unlocked_count()
    )?;
    Ok(())
}
