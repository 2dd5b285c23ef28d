//! Gemfall batch simulator
//!
//! Usage:
//!   gf-sim                               - 1000 cascade spins, OS seed
//!   gf-sim --variant classic --seed 7    - reproducible classic session
//!   gf-sim --config game.yaml --spins 50 - custom config from JSON/YAML
//!   gf-sim --trace trace.json            - also write every stage event
//!   gf-sim --paced                       - sleep through the timing profile
//!
//! Logging goes to stderr (`RUST_LOG=debug` shows every cascade step and,
//! without `--trace`, every stage event); the JSON report goes to stdout.

mod report;

use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use gf_engine::{
    CascadeSession, ClassicSession, GameConfig, GameState, GemEngine, SessionError, TimingConfig,
    Variant,
};
use gf_stage::{LogSink, StageRecorder};

use report::{FinalState, SimReport};

#[derive(Parser)]
#[command(name = "gf-sim", about = "Gemfall batch simulator")]
struct Cli {
    /// Machine to simulate when no config file is given
    #[arg(long, value_enum, default_value_t = VariantArg::Cascade)]
    variant: VariantArg,

    /// JSON or YAML game config
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Spins to play (stops early on game over)
    #[arg(short = 'n', long, default_value_t = 1000)]
    spins: u64,

    /// RNG seed for a reproducible run
    #[arg(short, long)]
    seed: Option<u64>,

    /// Write the recorded stage trace to this file as JSON
    #[arg(short, long)]
    trace: Option<PathBuf>,

    /// Sleep for the configured animation durations between phases
    #[arg(long)]
    paced: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum VariantArg {
    Classic,
    Cascade,
}

impl From<VariantArg> for Variant {
    fn from(arg: VariantArg) -> Self {
        match arg {
            VariantArg::Classic => Variant::Classic,
            VariantArg::Cascade => Variant::Cascade,
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => GameConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => GameConfig::for_variant(cli.variant.into()),
    };
    log::info!(
        "simulating '{}' ({:?}, {}x{}) for {} spins",
        config.name,
        config.variant,
        config.grid.rows,
        config.grid.cols,
        cli.spins
    );

    let game = config.name.clone();
    let variant = config.variant;
    let mut engine = GemEngine::new(config).context("Invalid game config")?;
    if let Some(seed) = cli.seed {
        engine.seed(seed);
    }
    let timing = engine.timing_config();
    let recorder = cli.trace.as_ref().map(|_| StageRecorder::new(game.clone()));

    let mut report = match variant {
        Variant::Classic => {
            let mut session = match &recorder {
                Some(recorder) => ClassicSession::new(engine).with_sink(recorder.clone()),
                None => ClassicSession::new(engine).with_sink(LogSink),
            };
            run_classic(&mut session, &cli, &timing)?;
            let final_state = FinalState {
                state: session.state(),
                tokens: session.tokens(),
                score: session.score(),
                free_spins: 0,
            };
            SimReport::new(&game, variant, cli.seed, cli.spins, session.stats(), final_state)
        }
        Variant::Cascade => {
            let mut session = match &recorder {
                Some(recorder) => CascadeSession::new(engine).with_sink(recorder.clone()),
                None => CascadeSession::new(engine).with_sink(LogSink),
            };
            run_cascade(&mut session, &cli, &timing)?;
            let final_state = FinalState {
                state: session.state(),
                tokens: session.tokens(),
                score: session.score(),
                free_spins: session.free_spins(),
            };
            SimReport::new(&game, variant, cli.seed, cli.spins, session.stats(), final_state)
        }
    };

    if let (Some(path), Some(recorder)) = (&cli.trace, &recorder) {
        let trace = recorder.snapshot();
        let json = trace.to_json().context("Failed to serialize stage trace")?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write trace {}", path.display()))?;
        log::info!("wrote {} stage events to {}", trace.len(), path.display());
        report.trace_events = Some(trace.len());
    }

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

/// Running out of tokens ends the run; anything else is a bug
fn out_of_play(err: &SessionError) -> bool {
    matches!(
        err,
        SessionError::GameOver | SessionError::InsufficientTokens { .. }
    )
}

fn pause(paced: bool, duration: Duration) {
    if paced && !duration.is_zero() {
        thread::sleep(duration);
    }
}

fn run_classic(session: &mut ClassicSession, cli: &Cli, timing: &TimingConfig) -> Result<()> {
    for spin in 0..cli.spins {
        match session.begin_spin() {
            Ok(()) => {}
            Err(err) if out_of_play(&err) => {
                log::info!("stopped after {} spins: {}", spin, err);
                break;
            }
            Err(err) => return Err(err.into()),
        }
        pause(cli.paced, timing.spin_animation());
        session.resolve_spin()?;
        if session.state() == GameState::GameOver {
            log::info!("game over after {} spins", spin + 1);
            break;
        }
        pause(cli.paced, timing.cooldown());
        session.end_cooldown();
    }
    Ok(())
}

fn run_cascade(session: &mut CascadeSession, cli: &Cli, timing: &TimingConfig) -> Result<()> {
    for spin in 0..cli.spins {
        match session.start_spin() {
            Ok(()) => {}
            Err(err) if out_of_play(&err) => {
                log::info!("stopped after {} spins: {}", spin, err);
                break;
            }
            Err(err) => return Err(err.into()),
        }
        pause(cli.paced, timing.spin_animation());
        while session.advance()?.is_none() {
            pause(cli.paced, timing.cascade_step());
        }
        if session.state() == GameState::GameOver {
            log::info!("game over after {} spins", spin + 1);
            break;
        }
    }
    Ok(())
}
