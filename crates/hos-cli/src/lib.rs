//! Hours-of-service CLI library.
//!
//! This crate provides the command-line interface over the compliance
//! engine in `hos-core`.

mod cli;
pub mod commands;
mod config;
mod input;

pub use cli::{Cli, Commands};
pub use config::{Config, HomeMatcher, Thresholds};
pub use input::{load_certification_batches, load_duty_batches, retain_driver};
