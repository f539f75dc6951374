//! Device database
//!
//! The database is a JSON object keyed by device name. Each entry names the
//! part as the programmer knows it and lists the factory fuse values:
//!
//! ```json
//! {
//!     "atmega8": {
//!         "minipro-name": "ATMEGA8",
//!         "stock-config": { "fuses_lo": 225, "fuses_hi": 217, "lock_byte": 255 }
//!     }
//! }
//! ```
//!
//! Fuse values are unsigned 64-bit integers; anything larger is rejected as
//! a malformed database.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::fuses::FuseMap;

/// Default database file name
pub const DEFAULT_DB_FILE: &str = "configuration.json";

/// A single device entry
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeviceRecord {
    /// Part name passed to the programmer with `-p`
    #[serde(rename = "minipro-name")]
    pub minipro_name: String,
    /// Factory fuse values
    #[serde(rename = "stock-config")]
    pub stock_config: FuseMap,
}

/// Devices known to the tool, keyed by lowercase name
#[derive(Debug, Clone, Default)]
pub struct DeviceDb {
    devices: BTreeMap<String, DeviceRecord>,
}

impl DeviceDb {
    /// Create an empty database
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the database from a JSON file
    pub fn load_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|source| Error::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        let raw: BTreeMap<String, DeviceRecord> =
            serde_json::from_str(&content).map_err(|source| Error::ConfigParse {
                path: path.to_path_buf(),
                source,
            })?;

        Self::from_records(raw)
    }

    /// Build a database from parsed records, normalizing names to lowercase
    pub fn from_records<I>(records: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, DeviceRecord)>,
    {
        let mut db = Self::new();
        for (name, record) in records {
            db.insert(&name, record)?;
        }
        Ok(db)
    }

    /// Add a device; fails if the lowercase name is already present
    pub fn insert(&mut self, name: &str, record: DeviceRecord) -> Result<()> {
        match self.devices.entry(name.to_lowercase()) {
            Entry::Occupied(e) => Err(Error::DuplicateDevice(e.key().clone())),
            Entry::Vacant(e) => {
                e.insert(record);
                Ok(())
            }
        }
    }

    /// Look up a device by name (case-insensitive)
    pub fn device(&self, name: &str) -> Result<&DeviceRecord> {
        self.devices
            .get(&name.to_lowercase())
            .ok_or_else(|| Error::UnknownDevice(name.to_string()))
    }

    /// Number of devices
    pub fn len(&self) -> usize {
        self.devices.len()
    }

    /// Check if the database is empty
    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }
}
