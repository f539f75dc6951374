//! Programmer capability trait
//!
//! The reset flow only needs three things from a programmer: read an area,
//! erase the whole chip, and write fuses. `fusereset-minipro` implements this
//! on top of the external binary; `fusereset-dummy` emulates a device in
//! memory.

use crate::area::{Area, Snapshot};
use crate::error::Result;
use crate::fuses::{self, FuseMap};

/// A device programmer
pub trait Programmer {
    /// Read the raw contents of an area
    ///
    /// For [`Area::Config`] this is the fuse text as produced by the
    /// programmer, see [`fuses::parse`].
    fn read_area(&mut self, area: Area) -> Result<Vec<u8>>;

    /// Erase flash and EEPROM
    ///
    /// Best effort: a failing erase is reported by the next read, not here.
    fn erase_all(&mut self) -> Result<()>;

    /// Write fuse values
    ///
    /// Best effort, like [`Programmer::erase_all`].
    fn write_config(&mut self, fuses: &FuseMap) -> Result<()>;

    /// Read all three areas and parse the fuses
    fn read_snapshot(&mut self) -> Result<Snapshot> {
        let code = self.read_area(Area::Code)?;
        let data = self.read_area(Area::Data)?;
        let config = fuses::parse(&self.read_area(Area::Config)?)?;
        Ok(Snapshot { code, data, config })
    }
}

impl<P: Programmer + ?Sized> Programmer for &mut P {
    fn read_area(&mut self, area: Area) -> Result<Vec<u8>> {
        (**self).read_area(area)
    }

    fn erase_all(&mut self) -> Result<()> {
        (**self).erase_all()
    }

    fn write_config(&mut self, fuses: &FuseMap) -> Result<()> {
        (**self).write_config(fuses)
    }
}
