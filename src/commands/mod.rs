//! CLI command implementations
//!
//! The `reset` module holds the check/erase/re-check flow. It works with any
//! [`Programmer`](fusereset_core::programmer::Programmer), which keeps it
//! testable against the in-memory dummy device.

pub mod reset;
