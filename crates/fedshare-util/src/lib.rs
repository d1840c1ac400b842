#![deny(clippy::all)]
#![warn(clippy::pedantic)]

//! Helpers shared by the fedshare crates: content digests and file writes.
//!
//! No logging here; the core and CLI crates own that.

pub mod fs;
pub mod hash;
