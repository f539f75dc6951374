//! fusereset - Reset microcontrollers to their stock state
//!
//! Reads flash, EEPROM and fuses through the external `minipro` tool and
//! compares them against the stock baseline from a JSON device database.
//! Devices that differ are erased, get their stock fuses written back and
//! are checked once more.

mod cli;
mod commands;

use clap::Parser;
use cli::Cli;
use commands::reset::ResetOptions;
use fusereset_core::database::DeviceDb;
use fusereset_minipro::{Minipro, MiniproConfig};

fn main() {
    let cli = Cli::parse();

    // Log level follows verbosity unless RUST_LOG says otherwise
    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    if let Err(e) = run(&cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    let db = DeviceDb::load_file(&cli.dbfile)?;
    log::info!("Loaded {} devices from {}", db.len(), cli.dbfile.display());

    let options = ResetOptions {
        verbose: cli.verbose,
        no_erase: cli.no_erase,
    };

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let outcome = commands::reset::run(
        &db,
        &cli.device,
        &options,
        |record| {
            Minipro::new(MiniproConfig {
                binary: cli.binary.clone(),
                force: cli.force,
                verbose: cli.verbose,
                ..MiniproConfig::new(record.minipro_name.as_str())
            })
        },
        &mut out,
    )?;

    log::debug!("Reset of {} finished: {:?}", cli.device, outcome);
    Ok(())
}
