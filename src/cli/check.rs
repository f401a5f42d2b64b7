//! Decode validation (`deckcodec check ...`).

use std::path::PathBuf;

use anyhow::{Result, anyhow};
use clap::Args;
use deckcodec::{Severity, Syntax, WriteOptions, builtin_registry, encode_deck};

use crate::cli::common::IncludePolicyArg;
use crate::cli::utils::{decode_from, sha256_hex};

/// Arguments for `deckcodec check`.
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Input deck (`-` for stdin).
    pub input: PathBuf,
    /// Print a SHA-256 fingerprint of the canonical re-emission, usable as
    /// a round-trip baseline.
    #[arg(long)]
    pub hash: bool,
    /// Treat warnings as fatal.
    #[arg(long)]
    pub strict: bool,
    /// Report note-level conditions too.
    #[arg(long)]
    pub verbose: bool,
    /// Behavior when an include cannot be resolved.
    #[arg(long, default_value_t = IncludePolicyArg::Abort, value_enum)]
    pub include_policy: IncludePolicyArg,
}

pub fn handle(args: CheckArgs) -> Result<()> {
    let registry = builtin_registry();
    let (deck, mut diag) = decode_from(&args.input, &registry, args.include_policy.into())?;
    if args.hash {
        let canonical = encode_deck(
            &deck,
            &registry,
            &Syntax::default(),
            WriteOptions::default(),
            &mut diag,
        );
        println!("{}", sha256_hex(&canonical));
    }
    for line in diag.summary(args.verbose) {
        println!("{line}");
    }
    if diag.has_errors() {
        return Err(anyhow!(
            "check failed: {} error(s)",
            diag.count(Severity::Error)
        ));
    }
    if args.strict && diag.has_warnings() {
        return Err(anyhow!(
            "check failed under --strict: {} warning(s)",
            diag.count(Severity::Warning)
        ));
    }
    println!(
        "Check passed: {} block(s), {} warning(s)",
        deck.len(),
        diag.count(Severity::Warning)
    );
    Ok(())
}
