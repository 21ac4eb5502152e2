// src/cli.rs

//! CLI command definitions and subcommands

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Trip agent - plans short city trips from one sentence
#[derive(Parser)]
#[command(
    name = "trip-agent",
    about = "Plan a short city trip from a single sentence",
    version,
    after_help = "Logs are written to: ~/.local/share/trip-agent/logs/trip-agent.log"
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands
#[derive(Subcommand)]
pub enum Command {
    /// Plan a trip, e.g. "Plan a 2-day trip to New Delhi starting tomorrow"
    Plan {
        /// The trip sentence
        #[arg(required = true, num_args = 1..)]
        sentence: Vec<String>,

        /// Print the raw JSON response instead of the dashboard
        #[arg(long)]
        json: bool,

        /// Skip the planning model and use the deterministic plan and itinerary
        #[arg(long)]
        offline: bool,
    },

    /// Serve the planner over HTTP (POST /plan)
    Serve {
        /// Listen address (overrides server.addr from config)
        #[arg(short, long)]
        addr: Option<String>,
    },
}
