//! Re-emission of a deck as canonical fixed-width text.

use chrono::Utc;

use crate::diag::Diagnostics;
use crate::model::{BlockBody, Deck, DeckBlock};
use crate::registry::{EMISSION_ORDER, Registry};
use crate::schema::encode_block;
use crate::tokenizer::Syntax;

/// Keyword of the terminal end-marker block, always emitted exactly once,
/// last, whether or not the source carried one.
pub const END_KEYWORD: &str = "END";

#[derive(Debug, Clone, Copy, Default)]
pub struct WriteOptions {
    /// Stamp a generated-at comment line at the top of the output.
    pub stamp: bool,
    /// Emit blocks in discovery order instead of the canonical category
    /// order.
    pub keep_order: bool,
}

/// Render the whole deck. Known categories come out in the canonical
/// section order (discovery order within a category); unknown blocks follow
/// in discovery order, immediately before the end marker.
pub fn encode_deck(
    deck: &Deck,
    registry: &Registry,
    syntax: &Syntax,
    options: WriteOptions,
    diag: &mut Diagnostics,
) -> String {
    let mut out = String::new();
    if options.stamp {
        out.push_str(&format!(
            "{} generated by deckcodec on {} UTC\n",
            syntax.comment,
            Utc::now().format("%Y-%m-%d %H:%M:%S"),
        ));
    }
    for block in ordered(deck, registry, options) {
        write_block(block, registry, syntax, &mut out, diag);
    }
    out.push(syntax.sentinel);
    out.push_str(END_KEYWORD);
    out.push('\n');
    out
}

fn ordered<'a>(deck: &'a Deck, registry: &Registry, options: WriteOptions) -> Vec<&'a DeckBlock> {
    let body: Vec<&DeckBlock> = deck
        .iter()
        .filter(|block| !block.keyword.eq_ignore_ascii_case(END_KEYWORD))
        .collect();
    if options.keep_order {
        return body;
    }
    let mut known: Vec<&DeckBlock> = Vec::with_capacity(body.len());
    for category in EMISSION_ORDER {
        known.extend(body.iter().copied().filter(|block| {
            registry
                .lookup(&block.keyword)
                .is_some_and(|schema| schema.category() == category)
        }));
    }
    let unknown = body
        .iter()
        .copied()
        .filter(|block| registry.lookup(&block.keyword).is_none());
    known.extend(unknown);
    known
}

fn write_block(
    block: &DeckBlock,
    registry: &Registry,
    syntax: &Syntax,
    out: &mut String,
    diag: &mut Diagnostics,
) {
    out.push(syntax.sentinel);
    out.push_str(&block.keyword);
    out.push_str(&block.tail);
    out.push('\n');
    match &block.body {
        BlockBody::Opaque { lines } => {
            for line in lines {
                out.push_str(line);
                out.push('\n');
            }
        }
        BlockBody::Records { records } => {
            let rendered = match registry.lookup(&block.keyword) {
                Some(schema) => encode_block(&block.keyword, schema.steps(), records, diag),
                // A records block without a schema can only come from caller
                // mutation; render each record under its own layout.
                None => records
                    .iter()
                    .map(|record| (record.layout, record.layout.encode_record(record)))
                    .collect(),
            };
            let mut active_layout: Option<&str> = None;
            for (layout, lines) in rendered {
                if active_layout != Some(layout.name) {
                    for label in layout.labels(syntax.comment) {
                        out.push_str(&label);
                        out.push('\n');
                    }
                    active_layout = Some(layout.name);
                }
                for line in lines {
                    out.push_str(&line);
                    out.push('\n');
                }
            }
        }
    }
}
