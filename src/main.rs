//! Degradius entry point
//!
//! Runs a headless session flown by the autopilot and reports the result.

use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use clap::Parser;

use degradius::audio::{AudioCue, AudioManager};
use degradius::highscores::{HighScores, format_frames};
use degradius::persistence::{FileScoreStore, MemoryScoreStore, ScoreStore};
use degradius::session::Session;
use degradius::settings::Settings;
use degradius::sim::{BombMode, TickInput};

/// Side-scrolling cave bomber simulation.
#[derive(Debug, Parser)]
#[command(
    name = "degradius",
    version,
    about = "Side-scrolling cave bomber. Runs a seeded headless session flown by the autopilot."
)]
struct Args {
    /// Run seed (overrides the settings file)
    #[arg(short, long, value_name = "N")]
    seed: Option<u64>,

    /// Frames to simulate (60 per second)
    #[arg(short, long, default_value = "3600", value_name = "N")]
    frames: u64,

    /// Settings file (defaults to the user data directory)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// High score file (defaults to the user data directory)
    #[arg(long, value_name = "FILE")]
    score_file: Option<PathBuf>,

    /// Bomb mode: standard, cluster, runner or mega
    #[arg(short, long, default_value = "standard", value_parser = parse_mode)]
    mode: BombMode,

    /// Keep scores in memory only
    #[arg(long)]
    no_persist: bool,
}

fn parse_mode(s: &str) -> Result<BombMode, String> {
    s.parse::<BombMode>().map_err(|e| e.to_string())
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let settings = match &args.config {
        Some(path) => Settings::load_from(path)
            .with_context(|| format!("loading settings from {}", path.display()))?,
        None => Settings::load().unwrap_or_else(|e| {
            log::warn!("Falling back to default settings: {}", e);
            Settings::default()
        }),
    };

    let seed = args.seed.or(settings.seed).unwrap_or_else(clock_seed);

    let (store, board_path): (Box<dyn ScoreStore>, Option<PathBuf>) = if args.no_persist {
        (Box::new(MemoryScoreStore::default()) as Box<dyn ScoreStore>, None)
    } else {
        let store = match &args.score_file {
            Some(path) => FileScoreStore::new(path),
            None => FileScoreStore::default_location()?,
        };
        let board = store.path().with_file_name(HighScores::FILE_NAME);
        (Box::new(store) as Box<dyn ScoreStore>, Some(board))
    };

    let leaderboard = match &board_path {
        Some(path) => HighScores::load_from(path).unwrap_or_else(|e| {
            log::warn!("Failed to load high scores: {}", e);
            HighScores::new()
        }),
        None => HighScores::new(),
    };

    let mut audio = AudioManager::new();
    settings.apply_audio(&mut audio);

    log::info!(
        "Degradius starting: seed {}, {} frames, {} bombs",
        seed,
        args.frames,
        args.mode.as_str()
    );

    let mut session = Session::new(&settings, seed, store, audio).with_leaderboard(leaderboard);
    let mut input = TickInput {
        idle_mode: true,
        select_mode: Some(args.mode),
        ..TickInput::default()
    };

    let mut cues = [0usize; AudioCue::ALL.len()];
    let mut last_hud = None;
    for _ in 0..args.frames {
        let hud = session.frame(&input);
        // One-shot inputs only apply to the frame they were pressed on
        input.select_mode = None;

        for mixed in session.sink_mut().drain() {
            if let Some(i) = AudioCue::ALL.iter().position(|c| *c == mixed.cue) {
                cues[i] += 1;
            }
        }

        let over = hud.game_over;
        last_hud = Some(hud);
        if over {
            break;
        }
    }

    if let Some(hud) = &last_hud {
        log::info!("{}", hud.status_line());
    }

    let (summary, leaderboard) = session.finish();
    if let Some(path) = &board_path {
        leaderboard
            .save_to(path)
            .with_context(|| format!("saving high scores to {}", path.display()))?;
    }

    let heard: Vec<String> = AudioCue::ALL
        .iter()
        .zip(cues)
        .filter(|(_, n)| *n > 0)
        .map(|(c, n)| format!("{}={}", c.as_str(), n))
        .collect();

    println!("seed       {}", summary.seed);
    println!("stage      {}", summary.stage);
    println!("score      {}", summary.score);
    println!("high score {}", summary.high_score);
    println!("time       {}", format_frames(summary.frames));
    println!(
        "result     {}",
        summary.reason.map(|r| r.as_str()).unwrap_or("still flying")
    );
    if let Some(rank) = summary.rank {
        println!("rank       #{}", rank);
    }
    if !heard.is_empty() {
        println!("audio      {}", heard.join(" "));
    }

    Ok(())
}

fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0x00de_96ad)
}
