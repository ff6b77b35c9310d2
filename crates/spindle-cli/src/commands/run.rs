//! `spindle run <policy>` — one simulation, optional detailed trace, optional
//! JSON report.

use std::fs;
use std::path::Path;

use spindle_core::{NullSink, PolicyKind, Simulation, TraceSink};

use crate::error::CliError;
use crate::input::{load_config, resolve_workload};
use crate::render::{self, TextTrace};

pub struct RunOptions<'a> {
    pub policy: &'a str,
    pub config_path: Option<&'a Path>,
    pub workload_path: Option<&'a Path>,
    pub sample: bool,
    pub seed: u64,
    pub trace: bool,
    pub microseconds: bool,
    pub output_path: Option<&'a Path>,
}

pub fn run(opts: RunOptions<'_>) -> Result<(), CliError> {
    let policy: PolicyKind = opts.policy.parse()?;
    let mut config = load_config(opts.config_path)?;
    if opts.trace {
        config.detailed_trace = true;
    }
    if opts.microseconds {
        config.time_unit_microseconds = true;
    }

    let workload = resolve_workload(opts.workload_path, opts.sample, opts.seed, &config)?;

    // Reject bad inputs before the first line of trace output.
    config.validate()?;
    workload.validate(&config)?;

    render::print_run_banner(policy, workload.processes.len());
    if config.detailed_trace {
        render::print_settings(&config);
    }

    let sink: Box<dyn TraceSink> = if config.detailed_trace {
        Box::new(TextTrace::new(config.time_unit_microseconds))
    } else {
        Box::new(NullSink)
    };
    let mut sim = Simulation::with_trace(config, &workload, policy, sink)?;
    let report = sim.run();

    render::print_report(&report);

    if let Some(path) = opts.output_path {
        let json = serde_json::to_string_pretty(&report).expect("report serializes");
        fs::write(path, json).map_err(|source| CliError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        println!("\nReport written to {}", path.display());
    }

    Ok(())
}
