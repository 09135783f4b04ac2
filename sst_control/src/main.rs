//! # SST Control
//!
//! Runs one autonomous routine through the control core against the
//! simulated robot and reports telemetry.
//!
//! The loop is the one a hardware scheduler would run: read a [`TickInput`]
//! from the driver, tick the core, write the [`ActuatorFrame`] back. By
//! default ticks run back to back; `--realtime` paces them at the configured
//! period.

use clap::{Parser, ValueEnum};
use sst_common::consts::DEFAULT_CONFIG_PATH;
use sst_common::prelude::*;
use sst_control::config::load_config;
use sst_control::cycle::ControlCore;
use sst_control::routines::{self, AutoRoutine};
use sst_control::sim::charge_station::Approach;
use sst_control::sim::{RobotDriver, SimulatedRobot};
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tracing::{Level, error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum PieceArg {
    Cube,
    Cone,
}

impl From<PieceArg> for GamePiece {
    fn from(arg: PieceArg) -> Self {
        match arg {
            PieceArg::Cube => GamePiece::Cube,
            PieceArg::Cone => GamePiece::Cone,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum AllianceArg {
    Red,
    Blue,
}

impl From<AllianceArg> for Alliance {
    fn from(arg: AllianceArg) -> Self {
        match arg {
            AllianceArg::Red => Alliance::Red,
            AllianceArg::Blue => Alliance::Blue,
        }
    }
}

/// SST Control: superstructure control core on a simulated robot
#[derive(Parser, Debug)]
#[command(name = "sst_control")]
#[command(version)]
#[command(about = "Run an autonomous routine through the superstructure control core")]
struct Args {
    /// Path to the core configuration TOML. Defaults apply if it is missing.
    #[arg(long, value_name = "FILE", default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Autonomous routine to run.
    #[arg(long, value_enum, default_value_t = AutoRoutine::MidCubeBalance)]
    routine: AutoRoutine,

    /// Simulated duration [s].
    #[arg(long, default_value_t = 15.0)]
    duration: f64,

    /// Game piece selected when the routine is built.
    #[arg(long, value_enum, default_value_t = PieceArg::Cube)]
    game_piece: PieceArg,

    /// Alliance reported by the field.
    #[arg(long, value_enum)]
    alliance: Option<AllianceArg>,

    /// Enable verbose logging (DEBUG level).
    #[arg(short, long)]
    verbose: bool,

    /// Output logs in JSON format.
    #[arg(long)]
    json: bool,

    /// Print a telemetry snapshot as a JSON line every telemetry interval.
    #[arg(long)]
    telemetry: bool,

    /// Pace ticks at the configured tick period.
    #[arg(long)]
    realtime: bool,
}

fn main() {
    let args = Args::parse();
    let loaded = load_or_default(&args.config);
    let level = match &loaded {
        _ if args.verbose => LogLevel::Debug,
        Ok((config, _)) => config.shared.log_level,
        Err(_) => LogLevel::default(),
    };
    setup_tracing(&args, level);

    info!(
        "SST Control v{} starting (log level {})...",
        env!("CARGO_PKG_VERSION"),
        level.as_directive()
    );

    let result = loaded
        .map_err(Into::into)
        .and_then(|(config, found)| {
            if found {
                info!("configuration loaded from {}", args.config.display());
            } else {
                warn!(
                    "config file '{}' not found, using defaults",
                    args.config.display()
                );
            }
            run(&args, config)
        });
    if let Err(e) = result {
        error!("FATAL: {e}");
        process::exit(1);
    }

    info!("SST Control shutdown complete");
}

/// Validated configuration from `path`, or the defaults when the file does
/// not exist. The flag tells which one it was.
fn load_or_default(path: &Path) -> Result<(CoreConfig, bool), ConfigError> {
    match load_config(path) {
        Ok(config) => Ok((config, true)),
        Err(ConfigError::FileNotFound) => {
            let config = CoreConfig::default();
            config.validate()?;
            Ok((config, false))
        }
        Err(e) => Err(e),
    }
}

fn run(args: &Args, config: CoreConfig) -> Result<(), Box<dyn std::error::Error>> {
    if !(args.duration.is_finite() && args.duration >= 0.0) {
        return Err(format!(
            "--duration must be a non-negative number (got {})",
            args.duration
        )
        .into());
    }

    let dt = config.cycle.tick_period_s;
    let telemetry_interval = u64::from(config.cycle.telemetry_interval);

    let mut core = ControlCore::new(config)?;
    let approach = match args.routine {
        AutoRoutine::BalanceForward => Approach::FromNear,
        _ => Approach::FromFar,
    };
    let mut driver = SimulatedRobot::new(approach);
    driver.preload_cube();
    driver.set_alliance(args.alliance.map(Alliance::from));
    info!("driver '{}' ready", driver.name());

    // Routine branches are resolved against the game piece selected here.
    core.robot_mut()
        .superstructure
        .set_game_piece(args.game_piece.into());

    // One disabled tick seeds the arm profile from the measured angle.
    let frame = core.tick(&driver.read()?);
    driver.write(&frame, dt)?;

    driver.set_mode(RobotMode::Autonomous);
    let task = routines::build(args.routine, core.robot());
    info!("routine '{}' scheduled", args.routine.name());
    core.schedule(task);

    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        info!("Received shutdown signal");
        r.store(false, Ordering::SeqCst);
    })?;

    let ticks = (args.duration / dt).round() as u64;
    let period = Duration::from_secs_f64(dt);
    let mut next = Instant::now();
    for tick in 1..=ticks {
        if !running.load(Ordering::SeqCst) {
            warn!("stopped after {} of {} ticks", tick - 1, ticks);
            break;
        }
        let input = driver.read()?;
        let frame = core.tick(&input);
        driver.write(&frame, dt)?;

        if args.telemetry && tick % telemetry_interval == 0 {
            println!("{}", serde_json::to_string(&core.telemetry())?);
        }
        if args.realtime {
            next += period;
            let now = Instant::now();
            if next > now {
                std::thread::sleep(next - now);
            }
        }
    }

    driver.set_mode(RobotMode::Disabled);
    let frame = core.tick(&driver.read()?);
    driver.write(&frame, dt)?;

    let t = core.telemetry();
    let stats = core.stats();
    info!(
        "finished: t={:.2}s arm={:.1}° pose={} pitch={:?} base x={:.2} m",
        driver.time(),
        driver.arm().angle().to_degrees(),
        t.last_pose,
        t.pitch_deg,
        driver.station().position()
    );
    info!(
        "cycle stats: {} ticks, avg {} ns, max {} ns, {} overruns",
        stats.cycle_count,
        stats.avg_cycle_ns(),
        stats.max_cycle_ns,
        stats.overruns
    );
    if !t.latched_faults.is_empty() {
        warn!("latched faults: {:?}", t.latched_faults.names());
    }
    Ok(())
}

/// Setup tracing subscriber based on CLI arguments and the configured level.
fn setup_tracing(args: &Args, level: LogLevel) {
    let level = match level {
        LogLevel::Trace => Level::TRACE,
        LogLevel::Debug => Level::DEBUG,
        LogLevel::Info => Level::INFO,
        LogLevel::Warn => Level::WARN,
        LogLevel::Error => Level::ERROR,
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    if args.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .compact()
            .init();
    }
}
