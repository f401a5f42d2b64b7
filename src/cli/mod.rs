//! Command-line interface wiring for the `deckcodec` binary.
//!
//! This module owns the clap definitions and delegates execution to
//! specialized submodules that encapsulate each command.

use anyhow::Result;
use clap::{Parser, Subcommand};

pub mod catalog;
pub mod check;
pub mod common;
pub mod inspect;
pub mod rewrite;
pub mod utils;

/// Parsed CLI entrypoint for the `deckcodec` binary.
#[derive(Parser, Debug)]
#[command(
    name = "deckcodec",
    version,
    about = "Fixed-width engineering input deck toolkit"
)]
pub struct Cli {
    /// Top-level command to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Commands made available to end users.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Decode a deck and re-emit it in canonical fixed-width form.
    Rewrite(rewrite::RewriteArgs),
    /// Summarize a deck's blocks, records, and diagnostics.
    Inspect(inspect::InspectArgs),
    /// Decode a deck and report every recorded condition.
    Check(check::CheckArgs),
    /// List the registered keyword schemas.
    Catalog(catalog::CatalogArgs),
}

/// Execute the requested command.
pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Rewrite(args) => rewrite::handle(args),
        Command::Inspect(args) => inspect::handle(args),
        Command::Check(args) => check::handle(args),
        Command::Catalog(args) => catalog::handle(args),
    }
}
