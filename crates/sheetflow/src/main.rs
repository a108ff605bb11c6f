// SPDX-FileCopyrightText: 2026 Sheetflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Sheetflow - spreadsheet-configured message routing for chat bots.
//!
//! This is the binary entry point.

mod app;
mod check;
mod shell;
mod sink;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use colored::Colorize;
use sheetflow_config::SheetflowConfig;
use sheetflow_core::SheetflowError;
use tracing::error;

use crate::app::App;

/// Sheetflow - spreadsheet-configured message routing for chat bots.
#[derive(Parser, Debug)]
#[command(name = "sheetflow", version, about, long_about = None)]
struct Cli {
    /// Load this config file instead of the standard locations.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Chat with the bot in an interactive REPL.
    Shell,
    /// Reply to a single message and exit.
    Reply {
        message: String,
        /// Conversation the message belongs to (selects history).
        #[arg(long, default_value = "cli")]
        conversation: String,
    },
    /// Show which flow, if any, a message triggers.
    Match { message: String },
    /// Send every scheduled message that is due now.
    Dispatch,
    /// Verify the configuration, the workbook, and the completion settings.
    Check,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => sheetflow_config::load_and_validate_path(path),
        None => sheetflow_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            sheetflow_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    init_tracing(&config.agent.log_level);

    if let Err(e) = run(config, cli.command).await {
        error!(error = %e, "command failed");
        eprintln!("{}: {e}", "error".red());
        std::process::exit(1);
    }
}

async fn run(config: SheetflowConfig, command: Commands) -> Result<(), SheetflowError> {
    if let Commands::Check = command {
        let failures = check::run_check(&config).await;
        if failures > 0 {
            std::process::exit(1);
        }
        return Ok(());
    }

    let app = App::open(config)?;

    match command {
        Commands::Shell => shell::run_shell(&app).await,
        Commands::Reply {
            message,
            conversation,
        } => {
            let reply = app.responder()?.reply(&conversation, &message).await;
            shell::print_reply(&app.config.agent.name, &reply);
            Ok(())
        }
        Commands::Match { message } => {
            let flows = app.store.flows().await;
            match sheetflow_router::match_flow(&message, &flows) {
                Some(found) => println!(
                    "flow #{} via {} match on `{}`: {}",
                    found.index + 1,
                    found.tier,
                    found.keyword,
                    found
                        .flow
                        .answer
                        .as_deref()
                        .or(found.flow.media.as_deref())
                        .unwrap_or("(no reply)")
                ),
                None => println!("no match"),
            }
            Ok(())
        }
        Commands::Dispatch => {
            let now = chrono::Local::now().naive_local();
            let report = app.dispatcher().run_once(now).await;
            println!(
                "sent {}, failed {}, skipped {}, unrecorded {}",
                report.sent, report.failed, report.skipped, report.unrecorded
            );
            Ok(())
        }
        Commands::Check => Ok(()),
    }
}

fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("sheetflow={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}
