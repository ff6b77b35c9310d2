//! CLI for spindle — run and compare disk scheduling policies over simulated
//! workloads.

mod commands;
mod error;
mod input;
mod render;
mod sample;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "spindle")]
#[command(about = "spindle — OS storage stack simulator (round-robin CPU, segmented LFU cache, FIFO/LOOK/FLOOK disk scheduling)")]
#[command(version = spindle_core::VERSION)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one simulation with the given disk scheduling policy
    Run {
        /// Scheduling policy: fifo, look or flook
        policy: String,

        /// Configuration JSON (defaults apply for missing keys)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Workload JSON to simulate
        #[arg(long)]
        workload: Option<PathBuf>,

        /// Use the built-in sample workload instead of --workload
        #[arg(long)]
        sample: bool,

        /// Seed for the sample workload generator
        #[arg(long, default_value = "42")]
        seed: u64,

        /// Print the detailed per-iteration trace
        #[arg(long)]
        trace: bool,

        /// Render trace times in integer microseconds
        #[arg(long)]
        microseconds: bool,

        /// Write the report as JSON
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Run FIFO, LOOK and FLOOK on the identical workload and compare them
    Compare {
        /// Configuration JSON (defaults apply for missing keys)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Workload JSON to simulate
        #[arg(long)]
        workload: Option<PathBuf>,

        /// Use the built-in sample workload instead of --workload
        #[arg(long)]
        sample: bool,

        /// Seed for the sample workload generator
        #[arg(long, default_value = "42")]
        seed: u64,

        /// Write all three reports as a JSON array
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Print the effective configuration, defaults merged with --config
    ShowConfig {
        /// Configuration JSON to merge over the defaults
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run {
            policy,
            config,
            workload,
            sample,
            seed,
            trace,
            microseconds,
            output,
        } => commands::run::run(commands::run::RunOptions {
            policy: &policy,
            config_path: config.as_deref(),
            workload_path: workload.as_deref(),
            sample,
            seed,
            trace,
            microseconds,
            output_path: output.as_deref(),
        }),
        Commands::Compare {
            config,
            workload,
            sample,
            seed,
            output,
        } => commands::compare::run(commands::compare::CompareOptions {
            config_path: config.as_deref(),
            workload_path: workload.as_deref(),
            sample,
            seed,
            output_path: output.as_deref(),
        }),
        Commands::ShowConfig { config } => commands::show_config::run(config.as_deref()),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
