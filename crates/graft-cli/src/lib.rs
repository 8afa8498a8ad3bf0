//! graft command-line interface
//!
//! The binary in `main.rs` parses [`cli::Cli`], sets up logging and hands off
//! to a module in [`commands`]. Everything is exposed as a library so the
//! pieces can be tested without spawning the binary.

pub mod cli;
pub mod commands;
pub mod config;
pub mod factories;
pub mod logging;
pub mod output;
pub mod progress;
