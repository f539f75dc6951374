//! fusereset-dummy - In-memory device emulator for testing
//!
//! This crate provides a programmer that emulates a microcontroller in
//! memory: flash, EEPROM and fuses. It records every operation so tests can
//! check what the reset flow asked the hardware to do, and can be told to
//! misbehave (failing reads, erases or fuse writes that do not stick).

use fusereset_core::fuses::{self, FuseMap};
use fusereset_core::programmer::Programmer;
use fusereset_core::stock::ERASED_BYTE;
use fusereset_core::{Area, Error, Result};

/// Configuration for the dummy device
#[derive(Debug, Clone)]
pub struct DummyConfig {
    /// Part name reported in errors
    pub part: String,
    /// Flash size in bytes
    pub code_size: usize,
    /// EEPROM size in bytes
    pub data_size: usize,
    /// Fuse values the device starts with
    pub fuses: FuseMap,
}

impl Default for DummyConfig {
    fn default() -> Self {
        Self {
            part: "ATMEGA8".to_string(),
            code_size: 1024,
            data_size: 512,
            fuses: FuseMap::new(),
        }
    }
}

/// Operation recorded by the dummy
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    /// An area was read
    Read(Area),
    /// Chip erase
    Erase,
    /// Fuse write with the given values
    WriteConfig(FuseMap),
}

/// Dummy device programmer
///
/// Starts out erased with the configured fuses.
#[derive(Debug, Clone)]
pub struct DummyDevice {
    config: DummyConfig,
    code: Vec<u8>,
    data: Vec<u8>,
    fuses: FuseMap,
    calls: Vec<Call>,
    failing_read: Option<Area>,
    erase_works: bool,
    write_works: bool,
}

impl DummyDevice {
    /// Create a dummy device with the given configuration
    pub fn new(config: DummyConfig) -> Self {
        Self {
            code: vec![ERASED_BYTE; config.code_size],
            data: vec![ERASED_BYTE; config.data_size],
            fuses: config.fuses.clone(),
            config,
            calls: Vec::new(),
            failing_read: None,
            erase_works: true,
            write_works: true,
        }
    }

    /// Create an erased dummy device with the given fuses
    pub fn with_fuses(fuses: FuseMap) -> Self {
        Self::new(DummyConfig {
            fuses,
            ..DummyConfig::default()
        })
    }

    /// Flash contents
    pub fn code(&self) -> &[u8] {
        &self.code
    }

    /// Mutable flash contents
    pub fn code_mut(&mut self) -> &mut [u8] {
        &mut self.code
    }

    /// EEPROM contents
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Mutable EEPROM contents
    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Current fuse values
    pub fn fuses(&self) -> &FuseMap {
        &self.fuses
    }

    /// Operations performed so far
    pub fn calls(&self) -> &[Call] {
        &self.calls
    }

    /// Make reads of `area` fail
    pub fn fail_reads_of(&mut self, area: Area) {
        self.failing_read = Some(area);
    }

    /// Make erases silently leave the memory untouched
    pub fn break_erase(&mut self) {
        self.erase_works = false;
    }

    /// Make fuse writes silently leave the fuses untouched
    pub fn break_write(&mut self) {
        self.write_works = false;
    }

    fn exit_status_failure() -> std::process::ExitStatus {
        #[cfg(unix)]
        {
            use std::os::unix::process::ExitStatusExt;
            std::process::ExitStatus::from_raw(1 << 8)
        }
        #[cfg(windows)]
        {
            use std::os::windows::process::ExitStatusExt;
            std::process::ExitStatus::from_raw(1)
        }
    }
}

impl Programmer for DummyDevice {
    fn read_area(&mut self, area: Area) -> Result<Vec<u8>> {
        self.calls.push(Call::Read(area));

        if self.failing_read == Some(area) {
            return Err(Error::ReadFailed {
                area,
                device: self.config.part.clone(),
                status: Self::exit_status_failure(),
            });
        }

        Ok(match area {
            Area::Code => self.code.clone(),
            Area::Data => self.data.clone(),
            Area::Config => fuses::serialize(&self.fuses).into_bytes(),
        })
    }

    fn erase_all(&mut self) -> Result<()> {
        self.calls.push(Call::Erase);
        if self.erase_works {
            self.code.fill(ERASED_BYTE);
            self.data.fill(ERASED_BYTE);
        } else {
            log::debug!("Dummy erase ignored");
        }
        Ok(())
    }

    fn write_config(&mut self, fuses: &FuseMap) -> Result<()> {
        self.calls.push(Call::WriteConfig(fuses.clone()));
        if self.write_works {
            self.fuses = fuses.clone();
        } else {
            log::debug!("Dummy fuse write ignored");
        }
        Ok(())
    }
}
