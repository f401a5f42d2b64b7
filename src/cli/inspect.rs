//! Deck summary (`deckcodec inspect ...`).

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use deckcodec::{Deck, builtin_registry};

use crate::cli::common::IncludePolicyArg;
use crate::cli::utils::decode_from;

/// Arguments for `deckcodec inspect`.
#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Input deck (`-` for stdin).
    pub input: PathBuf,
    /// Emit the report as JSON.
    #[arg(long)]
    pub json: bool,
    /// Include note-level conditions in the report.
    #[arg(long)]
    pub verbose: bool,
    /// Behavior when an include cannot be resolved.
    #[arg(long, default_value_t = IncludePolicyArg::Abort, value_enum)]
    pub include_policy: IncludePolicyArg,
}

/// Per-keyword roll-up of a decoded deck.
#[derive(Debug, Serialize)]
struct KeywordSummary {
    keyword: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    category: Option<String>,
    blocks: usize,
    records: usize,
    opaque: usize,
}

#[derive(Debug, Serialize)]
struct DeckReport {
    input: String,
    blocks: usize,
    keywords: Vec<KeywordSummary>,
    diagnostics: Vec<String>,
}

pub fn handle(args: InspectArgs) -> Result<()> {
    let registry = builtin_registry();
    let (deck, diag) = decode_from(&args.input, &registry, args.include_policy.into())?;
    let report = DeckReport {
        input: args.input.display().to_string(),
        blocks: deck.len(),
        keywords: summarize(&deck, &registry),
        diagnostics: diag.summary(args.verbose),
    };
    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }
    println!("Deck: {}", report.input);
    println!("Blocks: {}", report.blocks);
    for entry in &report.keywords {
        println!(
            "  {:<12} {:<10} {} block(s), {} record(s){}",
            entry.keyword,
            entry.category.as_deref().unwrap_or("(unknown)"),
            entry.blocks,
            entry.records,
            if entry.opaque > 0 {
                format!(", {} opaque", entry.opaque)
            } else {
                String::new()
            }
        );
    }
    for line in &report.diagnostics {
        println!("{line}");
    }
    Ok(())
}

fn summarize(deck: &Deck, registry: &deckcodec::Registry) -> Vec<KeywordSummary> {
    let mut rollup: BTreeMap<String, KeywordSummary> = BTreeMap::new();
    for block in deck.iter() {
        let entry = rollup
            .entry(block.keyword.clone())
            .or_insert_with(|| KeywordSummary {
                keyword: block.keyword.clone(),
                category: registry
                    .lookup(&block.keyword)
                    .map(|schema| schema.category().to_string()),
                blocks: 0,
                records: 0,
                opaque: 0,
            });
        entry.blocks += 1;
        match block.record_list() {
            Some(records) => entry.records += records.len(),
            None => entry.opaque += 1,
        }
    }
    rollup.into_values().collect()
}
