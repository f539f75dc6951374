//! fusereset-core - Core library for resetting microcontrollers to stock
//!
//! This crate holds everything that does not touch the external programmer
//! binary directly:
//!
//! - [`database`] - device database loaded from JSON, keyed by device name
//! - [`fuses`] - the `name = 0xHEX` fuse text format
//! - [`stock`] - comparison of a device snapshot against its stock state
//! - [`programmer`] - the `Programmer` capability trait implemented by the
//!   minipro adapter and by the in-memory dummy
//! - [`hexdump`] - text rendering of raw memory contents
//!
//! # Example
//!
//! ```ignore
//! use fusereset_core::{database::DeviceDb, programmer::Programmer, stock};
//!
//! fn check<P: Programmer>(db: &DeviceDb, prog: &mut P) -> fusereset_core::Result<()> {
//!     let device = db.device("atmega8")?;
//!     let snapshot = prog.read_snapshot()?;
//!     let status = stock::check(&snapshot, &device.stock_config);
//!     println!("{}", status.summary_line());
//!     Ok(())
//! }
//! ```

#![warn(rust_2018_idioms)]

pub mod area;
pub mod database;
pub mod error;
pub mod fuses;
pub mod hexdump;
pub mod programmer;
pub mod stock;

pub use area::{Area, Snapshot};
pub use error::{Error, Result};
pub use fuses::FuseMap;
