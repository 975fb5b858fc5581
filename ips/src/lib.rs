//! IPS (International Patching System) patch format.
//!
//! IPS is the legacy binary diff format used to distribute
//! modifications to fixed binary files (historically ROM images)
//! without redistributing the whole file. This crate decodes IPS
//! record streams and applies them to a target file.

pub mod error;
pub mod patcher;
pub mod record;

pub use error::{Error, Result};
pub use patcher::Patcher;
pub use record::{Record, RecordReader};

/// IPS magic bytes at the start of every patch stream.
pub const MAGIC: [u8; 5] = *b"PATCH";

/// Terminator marking the end of the record stream.
pub const EOF_MARKER: [u8; 3] = *b"EOF";
