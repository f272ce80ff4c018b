//! typefuzz-driver library exports for testing.
//!
//! The binary in `main.rs` is a thin shell over these modules.

pub mod cli;
pub mod error;
pub mod json_output;
pub mod output;
