//! Swarm Run - compiles a script and ticks the demo particle batch
//!
//! This binary loads a swarm script (the bundled particle demo by default),
//! compiles it, prints the disassembly, lays out the particle memory
//! regions, runs the VM once per tick, and reports final state.
//!
//! Scripts passed with a path must use the demo's scope layout: a 16-byte
//! global block and 32-byte particle work units.

use clap::Parser;
use std::path::PathBuf;
use swarm_vm::{compile, run_with, RunOptions};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEMO_SCRIPT: &str = include_str!("../scripts/particles.swarm");

const GLOBAL_SIZE: usize = 16;
const WORK_STRIDE: usize = 32;

#[derive(Parser, Debug)]
#[command(name = "swarm-run")]
#[command(about = "Compile a swarm script and drive the demo particle batch")]
struct Cli {
    /// Path to a script; the bundled particle demo when omitted
    script: Option<PathBuf>,

    /// Number of particle work units
    #[arg(long, default_value = "3")]
    units: usize,

    /// Number of ticks to run
    #[arg(long, default_value = "600")]
    ticks: u64,

    /// Keep local scratch contents across work units
    #[arg(long)]
    keep_local: bool,
}

fn write_f32(buf: &mut [u8], at: usize, value: f32) {
    buf[at..at + 4].copy_from_slice(&value.to_ne_bytes());
}

fn read_f32(buf: &[u8], at: usize) -> f32 {
    f32::from_ne_bytes([buf[at], buf[at + 1], buf[at + 2], buf[at + 3]])
}

fn read_i32(buf: &[u8], at: usize) -> i32 {
    i32::from_ne_bytes([buf[at], buf[at + 1], buf[at + 2], buf[at + 3]])
}

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "swarm_run=info,swarm_vm=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let source = match &cli.script {
        Some(path) => match std::fs::read_to_string(path) {
            Ok(source) => {
                info!(script = %path.display(), "script loaded");
                source
            }
            Err(e) => {
                error!(script = %path.display(), "failed to read script: {e}");
                std::process::exit(1);
            }
        },
        None => DEMO_SCRIPT.to_string(),
    };

    let program = match compile(&source) {
        Ok(program) => program,
        Err(e) => {
            error!("compilation failed: {e}");
            std::process::exit(1);
        }
    };
    info!(bytes = program.len(), "script compiled");
    println!("{program}");

    // Global block: PassCounter, DeltaTime, ParticleLifeTime, SpareInteger.
    let mut global = vec![0u8; GLOBAL_SIZE];
    write_f32(&mut global, 4, 0.1);
    write_f32(&mut global, 8, 25.0);

    // Particle units: Pos, Dir, Gravity, Lifetime.
    let mut work = vec![0u8; WORK_STRIDE * cli.units];
    for unit in 0..cli.units {
        let base = unit * WORK_STRIDE;
        write_f32(&mut work, base, 1.0 + unit as f32);
        write_f32(&mut work, base + 4, 2.0);
        write_f32(&mut work, base + 8, 3.0);
        write_f32(&mut work, base + 12, 1.0);
        write_f32(&mut work, base + 16, 1.0);
        write_f32(&mut work, base + 20, 1.0);
        write_f32(&mut work, base + 24, -10.0);
    }
    if !work.is_empty() {
        // The first particle starts past its lifetime and halts every tick.
        write_f32(&mut work, 28, 30.0);
    }

    let options = RunOptions {
        zero_local: !cli.keep_local,
    };
    for tick in 0..cli.ticks {
        if let Err(e) = run_with(
            &program,
            &mut global,
            &mut work,
            WORK_STRIDE,
            cli.units,
            options,
        ) {
            error!(tick, "vm fault: {e}");
            std::process::exit(1);
        }
    }
    info!(ticks = cli.ticks, units = cli.units, "run complete");

    for unit in 0..cli.units {
        let base = unit * WORK_STRIDE;
        info!(
            unit,
            x = read_f32(&work, base),
            y = read_f32(&work, base + 4),
            z = read_f32(&work, base + 8),
            lifetime = read_f32(&work, base + 28),
            "particle state"
        );
    }
    info!(
        passes = read_i32(&global, 0),
        "global counters"
    );
}
