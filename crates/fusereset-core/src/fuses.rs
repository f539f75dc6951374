//! Fuse text format
//!
//! The programmer reads and writes the config area as plain text, one fuse
//! per line:
//!
//! ```text
//! lfuse = 0xe1
//! hfuse = 0xd9
//! lock = 0x3f
//! ```

use std::collections::BTreeMap;
use std::fmt::Write;

use crate::error::{Error, Result};

/// Fuse name to value mapping, ordered by name
pub type FuseMap = BTreeMap<String, u64>;

const SEPARATOR: &str = " = ";

/// Parse the programmer's config-area output into a fuse map
///
/// Every non-blank line must have the form `<name> = <hex>`. The value may
/// carry a `0x` prefix. Any malformed line fails the whole parse.
pub fn parse(raw: &[u8]) -> Result<FuseMap> {
    let text = core::str::from_utf8(raw).map_err(|e| Error::FuseParse {
        line_no: 0,
        line: String::new(),
        reason: format!("not valid UTF-8: {}", e),
    })?;

    let mut fuses = FuseMap::new();
    for (idx, line) in text.split('\n').enumerate() {
        let line = line.trim_end_matches('\r');
        if line.trim().is_empty() {
            continue;
        }
        let (name, value) = parse_line(line).map_err(|reason| Error::FuseParse {
            line_no: idx + 1,
            line: line.to_string(),
            reason,
        })?;
        fuses.insert(name, value);
    }

    log::trace!("Parsed {} fuses", fuses.len());
    Ok(fuses)
}

fn parse_line(line: &str) -> core::result::Result<(String, u64), String> {
    let (name, value) = line
        .split_once(SEPARATOR)
        .ok_or_else(|| format!("missing '{}' separator", SEPARATOR))?;

    let name = name.trim();
    if name.is_empty() {
        return Err("empty fuse name".to_string());
    }

    let value = value.trim();
    let digits = value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
        .unwrap_or(value);
    let value = u64::from_str_radix(digits, 16)
        .map_err(|e| format!("invalid hex value '{}': {}", value, e))?;

    Ok((name.to_string(), value))
}

/// Render a fuse map in the format the programmer accepts for writing
pub fn serialize(fuses: &FuseMap) -> String {
    let mut out = String::new();
    for (name, value) in fuses {
        // Writing to a String cannot fail
        let _ = writeln!(out, "{}{}0x{:02x}", name, SEPARATOR, value);
    }
    out
}
