//! Memory areas of a device and the snapshot read from them

use core::fmt;

use crate::fuses::FuseMap;

/// A memory area the programmer can read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Area {
    /// Program flash
    Code,
    /// Data EEPROM
    Data,
    /// Fuses and lock bits
    Config,
}

impl Area {
    /// All areas in read order
    pub const ALL: [Area; 3] = [Area::Code, Area::Data, Area::Config];

    /// Name used on the programmer command line (`-c <name>`)
    pub fn as_str(self) -> &'static str {
        match self {
            Area::Code => "code",
            Area::Data => "data",
            Area::Config => "config",
        }
    }
}

impl fmt::Display for Area {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Contents of all three areas, read fresh from the device
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    /// Flash contents
    pub code: Vec<u8>,
    /// EEPROM contents
    pub data: Vec<u8>,
    /// Parsed fuse values
    pub config: FuseMap,
}
