//! CLI command logic
//!
//! Command implementations for the revisar binary. main.rs parses
//! arguments and dispatches here.

pub mod check;
pub mod secrets;
