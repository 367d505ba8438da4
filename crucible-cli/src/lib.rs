//! Command-line front end for the Crucible execution and verification engine.
//!
//! Parses arguments, builds the executor configuration and prints each
//! result as a single JSON document on stdout. Logs go to stderr.

#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]

pub mod args;
pub mod commands;
pub mod error;

pub use args::{Cli, Command};
pub use commands::{execute, Outcome};
pub use error::CliError;
