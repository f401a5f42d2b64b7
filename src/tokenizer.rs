//! Splits raw deck text into keyword blocks and splices includes.
//!
//! The tokenizer owns no I/O: include sources come from a caller-supplied
//! [`IncludeResolver`], so cycle guards and path policy live at that
//! boundary, not here.

use anyhow::{Context, Result, anyhow};
use serde::Serialize;

use crate::diag::{Condition, Diagnostics};

/// Lexical conventions of the deck format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Syntax {
    /// First non-whitespace character of a keyword line.
    pub sentinel: char,
    /// First non-whitespace character of a dropped comment line.
    pub comment: char,
    /// Keyword whose single data line is a path to splice in.
    pub include_keyword: &'static str,
}

impl Default for Syntax {
    fn default() -> Self {
        Self {
            sentinel: '*',
            comment: '$',
            include_keyword: "INCLUDE",
        }
    }
}

/// A named group of raw lines between one sentinel line and the next.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Block {
    /// Canonical (uppercase) keyword.
    pub keyword: String,
    /// Remainder of the sentinel line after the keyword, kept for faithful
    /// re-emission.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub tail: String,
    pub lines: Vec<String>,
}

impl Block {
    pub fn new<S: Into<String>>(keyword: S) -> Self {
        Self {
            keyword: keyword.into(),
            tail: String::new(),
            lines: Vec::new(),
        }
    }
}

/// Supplies the text behind an include path.
pub trait IncludeResolver {
    fn resolve(&mut self, path: &str) -> Result<String>;
}

/// Resolver for sources expected to be self-contained.
pub struct NoIncludes;

impl IncludeResolver for NoIncludes {
    fn resolve(&mut self, path: &str) -> Result<String> {
        Err(anyhow!("source is expected to be self-contained, found include '{}'", path))
    }
}

/// What to do when an include path cannot be resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IncludePolicy {
    /// Fail the whole tokenization (the default).
    Abort,
    /// Record the failure and keep the unresolved include block verbatim.
    Skip,
}

impl Default for IncludePolicy {
    fn default() -> Self {
        IncludePolicy::Abort
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TokenizeOptions {
    pub include_policy: IncludePolicy,
}

/// Scan one source into ordered blocks, recursively splicing includes at
/// their point of reference.
pub fn tokenize(
    source: &str,
    resolver: &mut dyn IncludeResolver,
    syntax: &Syntax,
    options: TokenizeOptions,
    diag: &mut Diagnostics,
) -> Result<Vec<Block>> {
    let mut blocks: Vec<Block> = Vec::new();
    let mut open: Option<Block> = None;

    for (index, raw) in source.lines().enumerate() {
        let line = raw.trim_end_matches('\r');
        let trimmed = line.trim_start();
        if trimmed.starts_with(syntax.comment) {
            continue;
        }
        if let Some(rest) = trimmed.strip_prefix(syntax.sentinel) {
            if let Some(block) = open.take() {
                flush(block, &mut blocks, resolver, syntax, options, diag)?;
            }
            let (keyword, tail) = match rest.find(char::is_whitespace) {
                Some(at) => (&rest[..at], rest[at..].trim_end()),
                None => (rest, ""),
            };
            open = Some(Block {
                keyword: keyword.to_ascii_uppercase(),
                tail: tail.to_string(),
                lines: Vec::new(),
            });
            continue;
        }
        if line.trim().is_empty() {
            continue;
        }
        match open.as_mut() {
            Some(block) => block.lines.push(line.to_string()),
            None => diag.push(Condition::StrayLine { line: index + 1 }),
        }
    }
    if let Some(block) = open.take() {
        flush(block, &mut blocks, resolver, syntax, options, diag)?;
    }
    Ok(blocks)
}

/// Append a completed block, expanding it in place when it is an include
/// reference.
fn flush(
    block: Block,
    blocks: &mut Vec<Block>,
    resolver: &mut dyn IncludeResolver,
    syntax: &Syntax,
    options: TokenizeOptions,
    diag: &mut Diagnostics,
) -> Result<()> {
    if block.keyword != syntax.include_keyword {
        blocks.push(block);
        return Ok(());
    }
    let path = match block.lines.first() {
        Some(line) => line.trim().to_string(),
        None => {
            diag.push(Condition::IncludeResolutionFailure {
                path: String::new(),
                reason: "include block has no path line".to_string(),
            });
            return Ok(());
        }
    };
    if block.lines.len() > 1 {
        diag.push(Condition::TrailingData {
            keyword: block.keyword.clone(),
            count: block.lines.len() - 1,
        });
    }
    match resolver.resolve(&path) {
        Ok(text) => {
            let spliced = tokenize(&text, resolver, syntax, options, diag)
                .with_context(|| format!("while expanding include '{}'", path))?;
            blocks.extend(spliced);
            Ok(())
        }
        Err(err) => match options.include_policy {
            IncludePolicy::Abort => {
                Err(err.context(format!("failed to resolve include '{}'", path)))
            }
            IncludePolicy::Skip => {
                diag.push(Condition::IncludeResolutionFailure {
                    path,
                    reason: format!("{:#}", err),
                });
                blocks.push(block);
                Ok(())
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    struct MapResolver(HashMap<&'static str, &'static str>);

    impl IncludeResolver for MapResolver {
        fn resolve(&mut self, path: &str) -> Result<String> {
            self.0
                .get(path)
                .map(|text| text.to_string())
                .ok_or_else(|| anyhow!("no such source '{}'", path))
        }
    }

    fn run(source: &str) -> Vec<Block> {
        let mut diag = Diagnostics::new();
        tokenize(
            source,
            &mut NoIncludes,
            &Syntax::default(),
            TokenizeOptions::default(),
            &mut diag,
        )
        .expect("tokenize failed")
    }

    #[test]
    fn blocks_keep_source_order() {
        let blocks = run("*ALPHA\n1\n2\n*BETA\n*GAMMA\n3\n");
        let keywords: Vec<&str> = blocks.iter().map(|b| b.keyword.as_str()).collect();
        assert_eq!(keywords, vec!["ALPHA", "BETA", "GAMMA"]);
        assert_eq!(blocks[0].lines, vec!["1", "2"]);
        assert!(blocks[1].lines.is_empty());
    }

    #[test]
    fn comments_are_dropped_and_keywords_canonicalized() {
        let blocks = run("$ heading comment\n*node\n$ mid comment\n        10\n");
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].keyword, "NODE");
        assert_eq!(blocks[0].lines, vec!["        10"]);
    }

    #[test]
    fn sentinel_tail_is_preserved() {
        let blocks = run("*CONTACT sliding pair\n         1\n");
        assert_eq!(blocks[0].keyword, "CONTACT");
        assert_eq!(blocks[0].tail, " sliding pair");
    }

    #[test]
    fn stray_lines_before_first_keyword_are_reported() {
        let mut diag = Diagnostics::new();
        let blocks = tokenize(
            "orphan data\n*ALPHA\n",
            &mut NoIncludes,
            &Syntax::default(),
            TokenizeOptions::default(),
            &mut diag,
        )
        .unwrap();
        assert_eq!(blocks.len(), 1);
        assert_eq!(
            diag.iter().next(),
            Some(&Condition::StrayLine { line: 1 })
        );
    }

    #[test]
    fn include_blocks_splice_in_place() {
        let mut resolver = MapResolver(HashMap::from([(
            "mesh.inc",
            "*NODE\n         1\n*ELEMENT\n         1\n",
        )]));
        let mut diag = Diagnostics::new();
        let blocks = tokenize(
            "*TITLE\nmodel\n*INCLUDE\nmesh.inc\n*END\n",
            &mut resolver,
            &Syntax::default(),
            TokenizeOptions::default(),
            &mut diag,
        )
        .unwrap();
        let keywords: Vec<&str> = blocks.iter().map(|b| b.keyword.as_str()).collect();
        assert_eq!(keywords, vec!["TITLE", "NODE", "ELEMENT", "END"]);
    }

    #[test]
    fn nested_includes_resolve_recursively() {
        let mut resolver = MapResolver(HashMap::from([
            ("outer.inc", "*ALPHA\n*INCLUDE\ninner.inc\n*BETA\n"),
            ("inner.inc", "*GAMMA\n"),
        ]));
        let mut diag = Diagnostics::new();
        let blocks = tokenize(
            "*INCLUDE\nouter.inc\n*END\n",
            &mut resolver,
            &Syntax::default(),
            TokenizeOptions::default(),
            &mut diag,
        )
        .unwrap();
        let keywords: Vec<&str> = blocks.iter().map(|b| b.keyword.as_str()).collect();
        assert_eq!(keywords, vec!["ALPHA", "GAMMA", "BETA", "END"]);
    }

    #[test]
    fn missing_include_aborts_by_default() {
        let mut diag = Diagnostics::new();
        let result = tokenize(
            "*INCLUDE\nnowhere.inc\n",
            &mut NoIncludes,
            &Syntax::default(),
            TokenizeOptions::default(),
            &mut diag,
        );
        assert!(result.is_err());
    }

    #[test]
    fn skip_policy_keeps_the_reference_and_records_the_failure() {
        let mut diag = Diagnostics::new();
        let blocks = tokenize(
            "*INCLUDE\nnowhere.inc\n*END\n",
            &mut NoIncludes,
            &Syntax::default(),
            TokenizeOptions {
                include_policy: IncludePolicy::Skip,
            },
            &mut diag,
        )
        .unwrap();
        let keywords: Vec<&str> = blocks.iter().map(|b| b.keyword.as_str()).collect();
        assert_eq!(keywords, vec!["INCLUDE", "END"]);
        assert!(diag.has_errors());
    }
}
