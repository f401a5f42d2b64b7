//! In-memory representation of a decoded deck.

use anyhow::Result;
use serde::Serialize;

use crate::diag::{Condition, Diagnostics};
use crate::registry::Registry;
use crate::schema::{Record, decode_block};
use crate::tokenizer::{IncludeResolver, Syntax, TokenizeOptions, tokenize};

/// Decoded payload of one block.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BlockBody {
    /// Field-level access is available.
    Records { records: Vec<Record> },
    /// No schema (or a degraded decode): raw lines kept verbatim.
    Opaque { lines: Vec<String> },
}

/// One named block of the deck, in discovery order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeckBlock {
    pub keyword: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub tail: String,
    #[serde(flatten)]
    pub body: BlockBody,
}

impl DeckBlock {
    pub fn records<S: Into<String>>(keyword: S, records: Vec<Record>) -> Self {
        Self {
            keyword: keyword.into(),
            tail: String::new(),
            body: BlockBody::Records { records },
        }
    }

    pub fn opaque<S: Into<String>>(keyword: S, lines: Vec<String>) -> Self {
        Self {
            keyword: keyword.into(),
            tail: String::new(),
            body: BlockBody::Opaque { lines },
        }
    }

    pub fn is_opaque(&self) -> bool {
        matches!(self.body, BlockBody::Opaque { .. })
    }

    pub fn record_list(&self) -> Option<&[Record]> {
        match &self.body {
            BlockBody::Records { records } => Some(records),
            BlockBody::Opaque { .. } => None,
        }
    }

    pub fn record_list_mut(&mut self) -> Option<&mut Vec<Record>> {
        match &mut self.body {
            BlockBody::Records { records } => Some(records),
            BlockBody::Opaque { .. } => None,
        }
    }
}

/// Ordered collection of decoded blocks. Blocks keep the order they were
/// first encountered during tokenization, includes already spliced.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Deck {
    pub blocks: Vec<DeckBlock>,
}

impl Deck {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, block: DeckBlock) {
        self.blocks.push(block);
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DeckBlock> {
        self.blocks.iter()
    }

    /// All blocks under a keyword; repeats stay separate entries.
    pub fn get<'a>(&'a self, keyword: &'a str) -> impl Iterator<Item = &'a DeckBlock> {
        self.blocks
            .iter()
            .filter(move |block| block.keyword.eq_ignore_ascii_case(keyword))
    }

    pub fn get_mut<'a>(&'a mut self, keyword: &'a str) -> impl Iterator<Item = &'a mut DeckBlock> {
        self.blocks
            .iter_mut()
            .filter(move |block| block.keyword.eq_ignore_ascii_case(keyword))
    }

    pub fn first<'a>(&'a self, keyword: &'a str) -> Option<&'a DeckBlock> {
        self.get(keyword).next()
    }

    pub fn first_mut<'a>(&'a mut self, keyword: &'a str) -> Option<&'a mut DeckBlock> {
        self.get_mut(keyword).next()
    }
}

/// Tokenize and decode a full deck source. Unknown and structurally broken
/// blocks survive as opaque entries; the conditions land in `diag`.
pub fn decode_deck(
    source: &str,
    registry: &Registry,
    resolver: &mut dyn IncludeResolver,
    syntax: &Syntax,
    options: TokenizeOptions,
    diag: &mut Diagnostics,
) -> Result<Deck> {
    let blocks = tokenize(source, resolver, syntax, options, diag)?;
    let mut deck = Deck::new();
    for block in blocks {
        let body = match registry.lookup(&block.keyword) {
            None => {
                diag.push(Condition::UnknownKeyword {
                    keyword: block.keyword.clone(),
                });
                BlockBody::Opaque { lines: block.lines }
            }
            Some(schema) => match decode_block(&block.keyword, schema.steps(), &block.lines, diag)
            {
                Some(records) => BlockBody::Records { records },
                None => BlockBody::Opaque { lines: block.lines },
            },
        };
        deck.push(DeckBlock {
            keyword: block.keyword,
            tail: block.tail,
            body,
        });
    }
    Ok(deck)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::register_builtin;
    use crate::tokenizer::NoIncludes;
    use pretty_assertions::assert_eq;

    fn registry() -> Registry {
        let mut registry = Registry::new();
        register_builtin(&mut registry);
        registry
    }

    fn decode(source: &str) -> (Deck, Diagnostics) {
        let mut diag = Diagnostics::new();
        let deck = decode_deck(
            source,
            &registry(),
            &mut NoIncludes,
            &Syntax::default(),
            TokenizeOptions::default(),
            &mut diag,
        )
        .expect("decode failed");
        (deck, diag)
    }

    #[test]
    fn unknown_keywords_survive_as_opaque_blocks() {
        let (deck, diag) = decode("*MYSTERY\nraw payload line\n*NODE\n         1       1.0       2.0       3.0\n");
        let mystery = deck.first("MYSTERY").unwrap();
        assert!(mystery.is_opaque());
        assert_eq!(
            mystery.record_list(),
            None,
        );
        assert!(diag.iter().any(|c| matches!(c, Condition::UnknownKeyword { .. })));
        assert!(!deck.first("NODE").unwrap().is_opaque());
    }

    #[test]
    fn truncated_block_degrades_but_others_still_decode() {
        // BOUNDARY declares two constraint cards but provides one.
        let source = "\
*BOUNDARY
         1         2
         5         1       0.0
*NODE
         1       1.0       2.0       3.0
";
        let (deck, diag) = decode(source);
        assert!(deck.first("BOUNDARY").unwrap().is_opaque());
        assert!(!deck.first("NODE").unwrap().is_opaque());
        assert!(diag.iter().any(|c| matches!(c, Condition::StructuralTruncation { .. })));
    }

    #[test]
    fn repeated_keywords_stay_separate() {
        let (deck, _) = decode("*NODE\n         1       0.0       0.0       0.0\n*NODE\n         2       1.0       0.0       0.0\n");
        assert_eq!(deck.get("NODE").count(), 2);
        assert_eq!(deck.len(), 2);
    }

    #[test]
    fn empty_block_is_legal_for_dataless_keywords() {
        let (deck, diag) = decode("*END\n");
        assert_eq!(deck.first("END").unwrap().record_list(), Some(&[][..]));
        assert!(diag.is_empty());
    }
}
