//! `spindle show-config` — the effective configuration after merging.

use std::path::Path;

use crate::error::CliError;
use crate::input::load_config;
use crate::render;

pub fn run(config_path: Option<&Path>) -> Result<(), CliError> {
    let config = load_config(config_path)?;
    config.validate()?;

    match config_path {
        Some(path) => println!("Configuration ({} over defaults):", path.display()),
        None => println!("Configuration (defaults):"),
    }
    render::print_settings(&config);
    println!("    look_max_same_track {}", config.look_max_same_track);
    println!(
        "    flook_direction     {}",
        if config.flook_process_forward {
            "forward"
        } else {
            "backward"
        }
    );
    println!("    max_iterations      {}", config.max_iterations);
    println!("    detailed_trace      {}", config.detailed_trace);
    println!(
        "    time_unit           {}",
        if config.time_unit_microseconds {
            "microseconds"
        } else {
            "milliseconds"
        }
    );
    println!("\n    total_sectors       {}", config.total_sectors());

    Ok(())
}
