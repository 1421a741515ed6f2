//! Output writers.
//!
//! # Submodules
//!
//! - [`json`]: Writes the deduplicated canonical records as a JSON array
//!
//! The storage and upload steps downstream read this file as-is.

pub mod json;
