// SPDX-FileCopyrightText: 2026 Sheetflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `sheetflow shell` command implementation.
//!
//! An interactive REPL with a colored prompt and readline history. Every
//! line goes through the same responder a chat channel would use, under one
//! conversation id per invocation.

use colored::Colorize;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use sheetflow_agent::Reply;
use sheetflow_core::SheetflowError;
use tracing::debug;

use crate::app::App;

pub async fn run_shell(app: &App) -> Result<(), SheetflowError> {
    let responder = app.responder()?;
    let conversation_id = format!("shell-{}", uuid::Uuid::new_v4());
    debug!(%conversation_id, "shell session started");

    let mut rl = DefaultEditor::new()
        .map_err(|e| SheetflowError::Internal(format!("failed to initialize readline: {e}")))?;

    println!("{}", format!("{} shell", app.config.agent.name).bold().green());
    println!(
        "Type {} to reload the sheets, {} to exit.\n",
        "/invalidate".yellow(),
        "/quit".yellow()
    );

    let prompt = format!("{}> ", "you".green());
    loop {
        match rl.readline(&prompt) {
            Ok(line) => {
                let trimmed = line.trim();
                match trimmed {
                    "/quit" | "/exit" => break,
                    "" => continue,
                    "/invalidate" => {
                        responder.store().invalidate_all();
                        println!("{}", "caches cleared".dimmed());
                        continue;
                    }
                    _ => {}
                }

                let _ = rl.add_history_entry(&line);

                let reply = responder.reply(&conversation_id, trimmed).await;
                print_reply(&app.config.agent.name, &reply);
            }
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("{}: {e}", "error".red());
                break;
            }
        }
    }

    println!("{}", "goodbye".dimmed());
    Ok(())
}

/// Prints a reply the way a chat client would show it.
pub fn print_reply(name: &str, reply: &Reply) {
    let label = format!("{name}:").cyan().bold();
    match reply {
        Reply::Flow {
            answer,
            media,
            keyword,
            tier,
        } => {
            if let Some(answer) = answer {
                println!("{label} {answer}");
            }
            if let Some(media) = media {
                println!("{label} {} {media}", "[media]".dimmed());
            }
            println!("{}", format!("  (flow `{keyword}`, {tier} match)").dimmed());
        }
        Reply::Generated { text } => println!("{label} {text}"),
        Reply::Fallback { text } => println!("{label} {}", text.yellow()),
    }
}
