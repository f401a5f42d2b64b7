//! Canonical re-emission (`deckcodec rewrite ...`).

use std::path::PathBuf;

use anyhow::{Result, anyhow};
use clap::Args;
use deckcodec::{Syntax, WriteOptions, builtin_registry, encode_deck};

use crate::cli::common::IncludePolicyArg;
use crate::cli::utils::{decode_from, write_output};

/// Arguments for `deckcodec rewrite`.
#[derive(Args, Debug)]
pub struct RewriteArgs {
    /// Input deck (`-` for stdin).
    pub input: PathBuf,
    /// Output file path (`-` for stdout).
    #[arg(short = 'o', long = "output")]
    pub output: PathBuf,
    /// Emit blocks in discovery order instead of canonical sections.
    #[arg(long)]
    pub keep_order: bool,
    /// Skip the generated-at stamp line.
    #[arg(long)]
    pub no_stamp: bool,
    /// Treat warnings as fatal.
    #[arg(long)]
    pub strict: bool,
    /// Behavior when an include cannot be resolved.
    #[arg(long, default_value_t = IncludePolicyArg::Abort, value_enum)]
    pub include_policy: IncludePolicyArg,
}

pub fn handle(args: RewriteArgs) -> Result<()> {
    let registry = builtin_registry();
    let (deck, mut diag) = decode_from(&args.input, &registry, args.include_policy.into())?;
    let rendered = encode_deck(
        &deck,
        &registry,
        &Syntax::default(),
        WriteOptions {
            stamp: !args.no_stamp,
            keep_order: args.keep_order,
        },
        &mut diag,
    );
    write_output(&args.output, &rendered)?;
    for line in diag.summary(false) {
        println!("{line}");
    }
    if diag.has_errors() {
        return Err(anyhow!("rewrite finished with errors"));
    }
    if args.strict && diag.has_warnings() {
        return Err(anyhow!("rewrite finished with warnings under --strict"));
    }
    println!(
        "Rewrote {} blocks into {}",
        deck.len(),
        args.output.display()
    );
    Ok(())
}
