//! clap-based command line interface for the JobBuddy client.

use clap::{Parser, Subcommand};

/// JobBuddy — AI cover-letter generation client.
#[derive(Debug, Parser)]
#[command(name = "jobbuddy", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Delay between status polls in milliseconds.
    #[arg(long, global = true)]
    pub interval_ms: Option<u64>,

    /// Maximum number of poll attempts before giving up.
    #[arg(long, global = true)]
    pub max_attempts: Option<u32>,

    /// Base URL of the JobBuddy backend.
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Enable verbose output.
    #[arg(long, short, global = true, default_value_t = false)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Request AI generation for a saved cover letter and wait for the result.
    Generate {
        /// Cover letter id assigned by the backend when the draft was saved.
        id: String,

        /// Export format to request from the backend (e.g. "word").
        #[arg(long)]
        export_format: Option<String>,

        /// Skip the submit call and only poll an already-running job.
        #[arg(long, default_value_t = false)]
        poll_only: bool,
    },

    /// Probe the generation status of a cover letter once.
    Status {
        /// Cover letter id to check.
        id: String,
    },
}
