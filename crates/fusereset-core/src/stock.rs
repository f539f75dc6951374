//! Comparison of a device snapshot against its stock state
//!
//! Flash and EEPROM count as stock when fully erased (every byte `0xFF`).
//! Fuses count as stock only when the read map equals the baseline exactly:
//! same names, same values, nothing extra and nothing missing.

use core::fmt;

use crate::area::Snapshot;
use crate::fuses::FuseMap;

/// Value of an erased flash or EEPROM byte
pub const ERASED_BYTE: u8 = 0xFF;

/// Returns true if every byte is erased
pub fn is_erased(bytes: &[u8]) -> bool {
    bytes.iter().all(|&b| b == ERASED_BYTE)
}

/// Which areas of a device match their stock state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StockStatus {
    /// Flash is erased
    pub code: bool,
    /// EEPROM is erased
    pub data: bool,
    /// Fuses equal the baseline
    pub config: bool,
}

impl StockStatus {
    /// True when all three areas are stock
    pub fn is_stock(&self) -> bool {
        self.code && self.data && self.config
    }

    /// True when flash or EEPROM needs an erase
    pub fn needs_erase(&self) -> bool {
        !self.code || !self.data
    }

    /// One-line status report
    pub fn summary_line(&self) -> String {
        format!(
            "Flash {}   EEPROM {}   Fuses {}",
            if self.code { "empty" } else { "USED" },
            if self.data { "empty" } else { "USED" },
            if self.config { "default" } else { "MODIFIED" },
        )
    }
}

/// Compare a snapshot against the stock fuse baseline
pub fn check(snapshot: &Snapshot, stock: &FuseMap) -> StockStatus {
    StockStatus {
        code: is_erased(&snapshot.code),
        data: is_erased(&snapshot.data),
        config: snapshot.config == *stock,
    }
}

/// A single fuse that does not match the baseline
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FuseDiff {
    /// Device reports a fuse the baseline does not know
    NotInStock {
        /// Fuse name
        name: String,
        /// Value read from the device
        value: u64,
    },
    /// Fuse value differs from the baseline
    Differs {
        /// Fuse name
        name: String,
        /// Value read from the device
        value: u64,
        /// Baseline value
        stock: u64,
    },
    /// Baseline fuse absent from the device read
    Missing {
        /// Fuse name
        name: String,
        /// Baseline value
        stock: u64,
    },
}

impl fmt::Display for FuseDiff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FuseDiff::NotInStock { name, value } => {
                write!(f, "Fuse {}: has 0x{:02x}, not in stock config", name, value)
            }
            FuseDiff::Differs { name, value, stock } => write!(
                f,
                "Fuse {}: has 0x{:02x}, stock is 0x{:02x} (XOR 0x{:02x})",
                name,
                value,
                stock,
                value ^ stock
            ),
            FuseDiff::Missing { name, stock } => {
                write!(f, "Fuse {}: missing, stock is 0x{:02x}", name, stock)
            }
        }
    }
}

/// List fuses that differ from the baseline, sorted by name
///
/// Fuses read from the device come first in name order, followed by
/// baseline fuses the device did not report.
pub fn fuse_diff(current: &FuseMap, stock: &FuseMap) -> Vec<FuseDiff> {
    let mut diffs: Vec<FuseDiff> = current
        .iter()
        .filter_map(|(name, &value)| match stock.get(name) {
            None => Some(FuseDiff::NotInStock {
                name: name.clone(),
                value,
            }),
            Some(&expected) if expected != value => Some(FuseDiff::Differs {
                name: name.clone(),
                value,
                stock: expected,
            }),
            Some(_) => None,
        })
        .collect();

    diffs.extend(
        stock
            .iter()
            .filter(|(name, _)| !current.contains_key(*name))
            .map(|(name, &expected)| FuseDiff::Missing {
                name: name.clone(),
                stock: expected,
            }),
    );

    diffs
}
