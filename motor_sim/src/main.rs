//! # Motor Simulation Binary
//!
//! Runs a motor scenario from a TOML file.
//!
//! # Usage
//!
//! ```bash
//! # Run the scenario for 5 simulated seconds, as fast as possible
//! motor_sim --config config/sim.toml --duration 5
//!
//! # Real-time pacing until Ctrl-C, final status as JSON
//! motor_sim --config config/sim.toml --realtime --status-out status.json
//!
//! # Verbose logging
//! motor_sim --config config/sim.toml -v
//! ```

use clap::Parser;
use motor_common::config::{ConfigLoader, LogLevel};
use motor_sim::config::SimulationConfig;
use motor_sim::core::SimulationCore;
use motor_sim::error::SimError;
use std::path::{Path, PathBuf};
use std::sync::atomic::Ordering;
use tracing::{Level, error, info};
use tracing_subscriber::EnvFilter;

/// Motor simulation - ramps, encoders and travel limits
#[derive(Parser, Debug)]
#[command(name = "motor_sim")]
#[command(author = "RTS007")]
#[command(version)]
#[command(about = "Electric motor simulation core")]
#[command(long_about = None)]
struct Args {
    /// Path to the simulation file
    #[arg(short, long, default_value = "config/sim.toml")]
    config: PathBuf,

    /// Simulated seconds to run (until Ctrl-C when omitted)
    #[arg(short, long)]
    duration: Option<f64>,

    /// Pace ticks to the configured cycle time
    #[arg(short, long)]
    realtime: bool,

    /// Write the final motor status as JSON to this file
    #[arg(long, value_name = "FILE")]
    status_out: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long)]
    json: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    if let Err(e) = run() {
        error!("Simulation failed: {}", e);
        std::process::exit(1);
    }
    Ok(())
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Logging comes up before the load result is checked, so a bad file
    // is reported.
    let loaded = SimulationConfig::load(&args.config);
    setup_tracing(&args, loaded.as_ref().ok().map(|c| c.shared.log_level));
    let config = loaded?;

    info!(
        "{} v{} starting ({:?})",
        config.shared.service_name,
        env!("CARGO_PKG_VERSION"),
        args.config
    );

    if args.duration.is_none() && !args.realtime {
        info!("No --duration given; running unpaced until Ctrl-C");
    }

    let mut core = SimulationCore::new(config)?;

    let running = core.running_flag();
    ctrlc::set_handler(move || {
        info!("Received shutdown signal");
        running.store(false, Ordering::SeqCst);
    })?;

    core.run(args.duration, args.realtime);

    if let Some(path) = &args.status_out {
        write_status(&core, path)?;
    }
    core.shutdown()?;

    info!("Motor simulation shutdown complete");
    Ok(())
}

/// Write every motor's status as pretty JSON.
fn write_status(core: &SimulationCore, path: &Path) -> Result<(), SimError> {
    let json = serde_json::to_string_pretty(&core.statuses())
        .map_err(|e| SimError::StatusOutput(e.to_string()))?;
    std::fs::write(path, json).map_err(|e| SimError::StatusOutput(e.to_string()))?;
    info!("Wrote status of {} motors to {:?}", core.registry().len(), path);
    Ok(())
}

/// Filter directive when `RUST_LOG` is unset. `level` is `None` when
/// the config could not be loaded.
fn startup_directive(args: &Args, level: Option<LogLevel>) -> &'static str {
    if args.verbose {
        LogLevel::Debug.as_directive()
    } else {
        level.unwrap_or_default().as_directive()
    }
}

/// Setup tracing subscriber based on CLI arguments and the config's log
/// level.
fn setup_tracing(args: &Args, level: Option<LogLevel>) {
    let filter = if args.verbose {
        EnvFilter::from_default_env().add_directive(Level::DEBUG.into())
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(startup_directive(args, level)))
    };

    if args.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}
