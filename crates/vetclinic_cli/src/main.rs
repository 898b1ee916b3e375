//! CLI smoke entry point.
//!
//! Loads configuration, starts logging, opens the clinic database and prints
//! a one-line summary followed by every active pet as JSON.

use log::info;
use std::error::Error;
use std::process::ExitCode;
use vetclinic_core::{core_version, init_logging, AppConfig, ChipService, PetService};

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("vetclinic: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let config = AppConfig::from_env()?;
    init_logging(&config.log_level, &config.log_dir)?;
    info!("event=cli_start module=cli status=ok db_path={}", config.db_path.display());

    let pets = PetService::new(config.provider()).get_all()?;
    let chips = ChipService::new(config.provider()).get_all()?;

    println!(
        "vetclinic_core version={} db_path={} pets={} chips={}",
        core_version(),
        config.db_path.display(),
        pets.len(),
        chips.len()
    );
    for pet in &pets {
        println!("{}", serde_json::to_string(pet)?);
    }

    Ok(())
}
