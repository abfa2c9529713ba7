//! # Tablo CLI
//!
//! Thin terminal client over the `tabloapp` library. This binary only
//! parses arguments, dispatches to a command handler and turns errors
//! into an exit code; everything that talks to the remote service lives
//! in the library. Handlers are one file each under `commands/`.
//!
//! All commands authenticate from the `NOTION_TOKEN` environment
//! variable via the library's shared HTTP backend.

use clap::Parser;

mod args;
mod commands;

use args::{Cli, Commands};

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Inspect { database } => commands::inspect::run(&database),
        Commands::Pages {
            database,
            done,
            not_done,
        } => commands::pages::run(&database, done.as_deref(), not_done.as_deref()),
        Commands::Todo { database } => commands::todo::run(&database),
    }
}
