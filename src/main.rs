//! Trip agent CLI entry point

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use eyre::{Context as _, Result};
use tracing::{info, warn};

use trip_agent::agent::TripAgent;
use trip_agent::cli::{Cli, Command};
use trip_agent::config::{Config, LlmProvider};
use trip_agent::context::Context;
use trip_agent::render::render_dashboard;
use trip_agent::server;

fn setup_logging(verbose: bool) -> Result<()> {
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("trip-agent")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    // Log to a file so the dashboard on stdout stays clean
    let level = if verbose { tracing::Level::DEBUG } else { tracing::Level::INFO };
    let log_file = fs::File::create(log_dir.join("trip-agent.log")).context("Failed to create log file")?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    info!("Logging initialized (verbose: {})", verbose);
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose).context("Failed to setup logging")?;

    let mut config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    if let Err(e) = config.validate() {
        warn!("{}", e);
    }

    match cli.command {
        Command::Plan { sentence, json, offline } => {
            if offline {
                config.llm.provider = LlmProvider::None;
            }
            cmd_plan(&config, &sentence.join(" "), json)
        }
        Command::Serve { addr } => {
            let addr = addr.unwrap_or_else(|| config.server.addr.clone());
            cmd_serve(&config, &addr)
        }
    }
}

fn cmd_plan(config: &Config, sentence: &str, json: bool) -> Result<()> {
    let agent = TripAgent::new(Context::from_config(config)?);
    let response = agent.handle_query(sentence)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&response)?);
    } else {
        print!("{}", render_dashboard(&response));
    }
    Ok(())
}

fn cmd_serve(config: &Config, addr: &str) -> Result<()> {
    // Blocking HTTP clients are built outside the async runtime
    let agent = Arc::new(TripAgent::new(Context::from_config(config)?));

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;
    println!("Serving trip planner on http://{}", addr);
    runtime.block_on(server::serve(agent.clone(), addr))?;

    drop(runtime);
    drop(agent);
    Ok(())
}
