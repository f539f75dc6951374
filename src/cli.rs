//! CLI argument parsing

use clap::Parser;
use fusereset_core::database::DEFAULT_DB_FILE;
use fusereset_minipro::DEFAULT_BINARY;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "fusereset")]
#[command(
    author,
    version,
    about = "Check a microcontroller against its stock state and reset it",
    long_about = "Reads flash, EEPROM and fuses through minipro, compares them against the \
                  stock values from the device database and, unless --no-erase is given, \
                  erases the chip and restores the stock fuses before checking again."
)]
pub struct Cli {
    /// Device database (JSON)
    #[arg(short = 'd', long = "dbfile", value_name = "filename", default_value = DEFAULT_DB_FILE)]
    pub dbfile: PathBuf,

    /// minipro executable
    #[arg(short = 'b', long = "binary", value_name = "filename", default_value = DEFAULT_BINARY)]
    pub binary: PathBuf,

    /// Only report, never erase or write
    #[arg(short = 'n', long = "no-erase")]
    pub no_erase: bool,

    /// Continue when the chip ID does not match (passes -y to minipro)
    #[arg(short, long)]
    pub force: bool,

    /// Verbosity level (-v status, -vv minipro output, -vvv hex dumps)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Device name as listed in the database (case-insensitive)
    pub device: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["fusereset", "atmega8"]).unwrap();
        assert_eq!(cli.dbfile, PathBuf::from("configuration.json"));
        assert_eq!(cli.binary, PathBuf::from("minipro"));
        assert!(!cli.no_erase);
        assert!(!cli.force);
        assert_eq!(cli.verbose, 0);
        assert_eq!(cli.device, "atmega8");
    }

    #[test]
    fn test_all_flags() {
        let cli = Cli::try_parse_from([
            "fusereset",
            "-d",
            "chips.json",
            "--binary",
            "/opt/minipro",
            "-n",
            "-f",
            "-vvv",
            "ATtiny13",
        ])
        .unwrap();
        assert_eq!(cli.dbfile, PathBuf::from("chips.json"));
        assert_eq!(cli.binary, PathBuf::from("/opt/minipro"));
        assert!(cli.no_erase);
        assert!(cli.force);
        assert_eq!(cli.verbose, 3);
        assert_eq!(cli.device, "ATtiny13");
    }

    #[test]
    fn test_device_required() {
        assert!(Cli::try_parse_from(["fusereset", "-v"]).is_err());
    }
}
