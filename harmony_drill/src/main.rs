// Harmony Drill CLI entry point.
//
// Three commands over the theory core:
//   drill generate [--seed N] [--tonic T --mode M] [--tables FILE] [--json]
//   drill scale --tonic T --mode M
//   drill check --input FILE [--tables FILE] [--json]
//
// `generate --json` prints a session document (key, progression, empty
// voices). Fill in the voices and feed it back to `check`, which exits with
// status 1 when any rule is violated.
//
// Log verbosity follows RUST_LOG (default `harmony_drill=info`). Logs go to
// stderr so JSON on stdout stays clean.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use harmony_drill::progression::generate_progression_in;
use harmony_drill::session::unique_descriptions;
use harmony_drill::{
    Key, Mode, PracticeSession, Progression, TheoryTables, Tonic, VoiceSet, generate_progression,
};
use harmony_drill_prng::DrillRng;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Four-part harmony drills: generate progressions, check voicings
#[derive(Parser)]
#[command(name = "drill")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate a random key and chord progression
    Generate {
        /// Seed for reproducible drills (default: clock-derived)
        #[arg(long)]
        seed: Option<u64>,

        /// Fix the tonic instead of drawing one (requires --mode)
        #[arg(long, requires = "mode")]
        tonic: Option<Tonic>,

        /// Fix the mode instead of drawing one (requires --tonic)
        #[arg(long, requires = "tonic")]
        mode: Option<Mode>,

        /// Theory tables JSON file (default: built-in tables)
        #[arg(long)]
        tables: Option<PathBuf>,

        /// Print a session document as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the scale of a key
    Scale {
        #[arg(long)]
        tonic: Tonic,

        #[arg(long)]
        mode: Mode,
    },

    /// Check a filled-in session document against the voice-leading rules
    Check {
        /// Session JSON: {"key": ..., "progression": [...], "voices": {...}}
        #[arg(short, long)]
        input: PathBuf,

        /// Theory tables JSON file (default: built-in tables)
        #[arg(long)]
        tables: Option<PathBuf>,

        /// Print errors as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("harmony_drill=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Generate {
            seed,
            tonic,
            mode,
            tables,
            json,
        } => {
            let tables = load_tables(tables.as_deref())?;
            let key = tonic.zip(mode).map(|(t, m)| Key::new(t, m));
            run_generate(&tables, seed, key, json)?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Scale { tonic, mode } => {
            print_scale(Key::new(tonic, mode))?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Check {
            input,
            tables,
            json,
        } => {
            let tables = load_tables(tables.as_deref())?;
            run_check(&tables, &input, json)
        }
    }
}

fn load_tables(path: Option<&Path>) -> Result<TheoryTables> {
    match path {
        Some(path) => {
            let tables = TheoryTables::load(path)
                .with_context(|| format!("Failed to load theory tables from {}", path.display()))?;
            info!("Loaded theory tables from {}", path.display());
            Ok(tables)
        }
        None => TheoryTables::builtin().context("Built-in theory tables failed validation"),
    }
}

fn run_generate(tables: &TheoryTables, seed: Option<u64>, key: Option<Key>, json: bool) -> Result<()> {
    let seed = seed.unwrap_or_else(clock_seed);
    let mut rng = DrillRng::new(seed);
    let (key, progression) = match key {
        Some(key) => (key, generate_progression_in(tables, key, &mut rng)),
        None => generate_progression(tables, &mut rng),
    };

    if json {
        let session = PracticeSession::from_parts(key, progression, VoiceSet::new());
        let out = serde_json::to_string_pretty(&session).context("Failed to serialize session")?;
        println!("{out}");
        return Ok(());
    }

    println!("=== Harmony Drill ===");
    println!("Seed: {seed}");
    println!("Key: {key} (signature {})", key.signature());
    print_scale(key)?;
    print_progression(tables, key, &progression);
    Ok(())
}

fn print_scale(key: Key) -> Result<()> {
    let mut cells = Vec::with_capacity(7);
    for degree in 1..=7u8 {
        let pitch = key
            .degree_to_pitch(degree)
            .with_context(|| format!("No pitch for degree {degree} in {key}"))?;
        cells.push(format!("{degree}={pitch}"));
    }
    println!("Scale of {key}: {}", cells.join("  "));
    Ok(())
}

fn print_progression(tables: &TheoryTables, key: Key, progression: &Progression) {
    println!("Progression ({} chords, 2 per measure):", progression.len());
    let functions = progression.functions(tables, key.mode);
    let mut position = 0;
    for (measure, chords) in progression.measures().enumerate() {
        let cells: Vec<String> = chords
            .iter()
            .map(|chord| {
                let function = functions
                    .get(position)
                    .copied()
                    .flatten()
                    .map_or("?", |f| f.abbreviation());
                position += 1;
                format!("{:<5} ({})", chord.as_str(), function)
            })
            .collect();
        println!("  m{:<2} {}", measure + 1, cells.join("  "));
    }
}

fn run_check(tables: &TheoryTables, input: &Path, json: bool) -> Result<ExitCode> {
    let data = std::fs::read_to_string(input)
        .with_context(|| format!("Failed to read {}", input.display()))?;
    let session: PracticeSession = serde_json::from_str(&data)
        .with_context(|| format!("Failed to parse session document {}", input.display()))?;

    let errors = session.check(tables);

    if json {
        let out = serde_json::to_string_pretty(&errors).context("Failed to serialize errors")?;
        println!("{out}");
    } else if errors.is_empty() {
        println!("{}: {} -- no voice-leading errors.", session.key(), session.progression());
    } else {
        println!("{}: {}", session.key(), session.progression());
        print!("{}", session.voices().summary());
        println!("{} error(s):", errors.len());
        for error in &errors {
            let places: Vec<String> = error
                .locations
                .iter()
                .map(|loc| match loc.voice {
                    Some(voice) => format!("{voice}@{}", loc.index + 1),
                    None => format!("chord {}", loc.index + 1),
                })
                .collect();
            println!("  {} [{}]", error.description, places.join(", "));
        }
        println!("Summary: {}", unique_descriptions(&errors).join("; "));
    }

    Ok(if errors.is_empty() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    })
}

fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}
