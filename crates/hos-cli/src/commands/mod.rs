//! CLI subcommand implementations.

pub mod certs;
pub mod events;
pub mod report;
