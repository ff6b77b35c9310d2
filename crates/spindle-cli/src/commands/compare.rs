//! `spindle compare` — FIFO, LOOK and FLOOK over the identical workload.

use std::fs;
use std::path::Path;

use spindle_core::{PolicyKind, SimReport, Simulation};

use crate::error::CliError;
use crate::input::{load_config, resolve_workload};
use crate::render;

pub struct CompareOptions<'a> {
    pub config_path: Option<&'a Path>,
    pub workload_path: Option<&'a Path>,
    pub sample: bool,
    pub seed: u64,
    pub output_path: Option<&'a Path>,
}

pub fn run(opts: CompareOptions<'_>) -> Result<(), CliError> {
    let config = load_config(opts.config_path)?;
    let workload = resolve_workload(opts.workload_path, opts.sample, opts.seed, &config)?;
    config.validate()?;
    workload.validate(&config)?;

    println!("HARD DISK SCHEDULING ALGORITHMS COMPARISON");
    println!("LFU buffer cache with three segments");
    println!("{}", "=".repeat(60));

    let mut reports: Vec<SimReport> = Vec::with_capacity(PolicyKind::ALL.len());
    for policy in PolicyKind::ALL {
        println!("\n{}", "=".repeat(80));
        println!("TESTING {policy} ALGORITHM");
        println!("{}", "=".repeat(80));

        let mut sim = Simulation::new(config.clone(), &workload, policy)?;
        let report = sim.run();
        render::print_report(&report);
        reports.push(report);
    }

    render::print_comparison(&reports);

    if let Some(path) = opts.output_path {
        let json = serde_json::to_string_pretty(&reports).expect("reports serialize");
        fs::write(path, json).map_err(|source| CliError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        println!("\nReports written to {}", path.display());
    }

    Ok(())
}
