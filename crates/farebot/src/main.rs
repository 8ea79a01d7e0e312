// SPDX-FileCopyrightText: 2026 Farebot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Farebot - a conversational bus booking assistant for Telegram.
//!
//! This is the binary entry point for the Farebot service.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod serve;
mod shutdown;

use clap::{Parser, Subcommand};

/// Farebot - a conversational bus booking assistant for Telegram.
#[derive(Parser, Debug)]
#[command(name = "farebot", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the bot, storage, and the admin gateway.
    Serve,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match farebot_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            farebot_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    match cli.command {
        Some(Commands::Serve) | None => {
            if let Err(e) = serve::run_serve(config).await {
                eprintln!("error: {e}");
                std::process::exit(1);
            }
        }
    }
}
