//! fusereset-minipro - Programmer backend driving the `minipro` binary
//!
//! Every operation runs the external tool once, blocking until it exits.
//! Area contents travel through a temporary file that lives only for the
//! duration of the call:
//!
//! ```text
//! minipro -p <part> -c {code|data|config} -r <tmpfile> [-y]
//! minipro -p <part> -E [-y]
//! minipro -p <part> -c config -w <tmpfile> [-y]
//! ```
//!
//! Read failures are fatal. Erase and fuse write are best effort: their exit
//! status is logged and otherwise ignored, the caller re-reads the device to
//! find out whether they worked.

use std::ffi::OsStr;
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, ExitStatus, Stdio};

use fusereset_core::fuses::{self, FuseMap};
use fusereset_core::programmer::Programmer;
use fusereset_core::{Area, Error, Result};
use tempfile::NamedTempFile;

/// Default programmer binary, looked up in `PATH`
pub const DEFAULT_BINARY: &str = "minipro";

/// Settings for the minipro backend
#[derive(Debug, Clone)]
pub struct MiniproConfig {
    /// Path or name of the minipro executable
    pub binary: PathBuf,
    /// Part name passed with `-p`
    pub part: String,
    /// Append `-y` so an unexpected chip ID does not abort the operation
    pub force: bool,
    /// Verbosity; at 2 or more the tool's stdout/stderr are passed through
    pub verbose: u8,
}

impl MiniproConfig {
    /// Settings for a part with the default binary and no force
    pub fn new(part: impl Into<String>) -> Self {
        Self {
            binary: PathBuf::from(DEFAULT_BINARY),
            part: part.into(),
            force: false,
            verbose: 0,
        }
    }
}

/// Programmer backed by the minipro executable
#[derive(Debug, Clone)]
pub struct Minipro {
    config: MiniproConfig,
}

impl Minipro {
    /// Create a backend with the given settings
    pub fn new(config: MiniproConfig) -> Self {
        Self { config }
    }

    /// Build an invocation with the part selector, the given arguments and
    /// the force flag
    fn command<I, S>(&self, args: I) -> Command
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let mut cmd = Command::new(&self.config.binary);
        cmd.arg("-p").arg(&self.config.part).args(args);
        if self.config.force {
            cmd.arg("-y");
        }

        cmd.stdin(Stdio::null());
        if self.config.verbose >= 2 {
            cmd.stdout(Stdio::inherit()).stderr(Stdio::inherit());
        } else {
            cmd.stdout(Stdio::null()).stderr(Stdio::null());
        }
        cmd
    }

    fn run(&self, mut cmd: Command) -> Result<ExitStatus> {
        log::debug!("Running {:?}", cmd);
        let status = cmd.status().map_err(|source| Error::Spawn {
            binary: self.config.binary.clone(),
            source,
        })?;
        log::debug!("{} exited with {}", self.config.binary.display(), status);
        Ok(status)
    }
}

fn temp_file(suffix: &str) -> Result<NamedTempFile> {
    tempfile::Builder::new()
        .prefix("fusereset-")
        .suffix(suffix)
        .tempfile()
        .map_err(Error::TempFile)
}

impl Programmer for Minipro {
    fn read_area(&mut self, area: Area) -> Result<Vec<u8>> {
        let file = temp_file(match area {
            Area::Config => ".txt",
            _ => ".bin",
        })?;

        let status = self.run(self.command([
            OsStr::new("-c"),
            OsStr::new(area.as_str()),
            OsStr::new("-r"),
            file.path().as_os_str(),
        ]))?;
        if !status.success() {
            return Err(Error::ReadFailed {
                area,
                device: self.config.part.clone(),
                status,
            });
        }

        let bytes = fs::read(file.path()).map_err(Error::TempFile)?;
        log::info!("Read {} bytes from {} area", bytes.len(), area);
        Ok(bytes)
    }

    fn erase_all(&mut self) -> Result<()> {
        let status = self.run(self.command(["-E"]))?;
        if !status.success() {
            log::warn!("Erase of {} returned {}", self.config.part, status);
        }
        Ok(())
    }

    fn write_config(&mut self, fuses: &FuseMap) -> Result<()> {
        let mut file = temp_file(".txt")?;
        file.write_all(fuses::serialize(fuses).as_bytes())
            .and_then(|_| file.flush())
            .map_err(Error::TempFile)?;

        let status = self.run(self.command([
            OsStr::new("-c"),
            OsStr::new("config"),
            OsStr::new("-w"),
            file.path().as_os_str(),
        ]))?;
        if !status.success() {
            log::warn!("Fuse write to {} returned {}", self.config.part, status);
        }
        Ok(())
    }
}
