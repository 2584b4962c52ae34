// SPDX-FileCopyrightText: 2026 Replywise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Replywise - replies to customer reviews.
//!
//! This is the binary entry point for the Replywise service.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod commands;
mod serve;
mod wiring;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use replywise_config::ReplywiseConfig;

/// Replywise - replies to customer reviews.
#[derive(Parser, Debug)]
#[command(name = "replywise", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the standard locations.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the HTTP gateway and serve webhooks until shut down.
    Serve,
    /// Import a business's review history from the platform.
    Import {
        /// Business to import.
        business_id: String,
    },
    /// Run the reply pipeline for one stored review.
    Process {
        /// Review to process.
        review_id: String,
    },
    /// Validate and print the effective configuration (secrets redacted).
    Config,
}

fn load_config(path: Option<&PathBuf>) -> ReplywiseConfig {
    let loaded = match path {
        Some(path) => replywise_config::load_and_validate_path(path),
        None => replywise_config::load_and_validate(),
    };
    match loaded {
        Ok(config) => config,
        Err(errors) => {
            replywise_config::render_errors(&errors);
            std::process::exit(1);
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_ref());

    let Some(command) = cli.command else {
        println!("replywise: use --help for available commands");
        return;
    };

    if !matches!(command, Commands::Config) {
        init_tracing(&config.service.log_level);
    }

    let result = match command {
        Commands::Serve => serve::run_serve(config).await,
        Commands::Import { business_id } => commands::run_import(config, &business_id).await,
        Commands::Process { review_id } => commands::run_process(config, &review_id).await,
        Commands::Config => commands::run_config(&config),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

/// Initializes the tracing subscriber with the given log level.
///
/// `RUST_LOG` takes precedence when set.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("replywise={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
