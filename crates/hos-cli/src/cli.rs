//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Hours-of-service compliance reports for driver duty logs.
#[derive(Debug, Parser)]
#[command(name = "hos", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Per-shift hours and meal-break compliance report
    Report {
        /// Duty-event batch (JSONL); repeat for multiple batches
        #[arg(long = "events", value_name = "PATH", required = true)]
        events: Vec<PathBuf>,

        /// Only report this driver
        #[arg(long)]
        driver: Option<String>,

        /// Output JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Certification-gap verdicts per detected shift start
    Certs {
        /// Duty-event batch (JSONL); repeat for multiple batches
        #[arg(long = "events", value_name = "PATH", required = true)]
        events: Vec<PathBuf>,

        /// Certification batch (JSONL); repeat for multiple batches
        #[arg(long = "certs", value_name = "PATH", required = true)]
        certs: Vec<PathBuf>,

        /// Only report this driver
        #[arg(long)]
        driver: Option<String>,

        /// Output JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Dump normalized, de-duplicated duty events as JSONL
    Events {
        /// Duty-event batch (JSONL); repeat for multiple batches
        #[arg(long = "events", value_name = "PATH", required = true)]
        events: Vec<PathBuf>,

        /// Only dump this driver
        #[arg(long)]
        driver: Option<String>,
    },
}
