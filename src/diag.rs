//! Non-fatal condition collector.
//!
//! Decode and encode never abort on a malformed block; they append a
//! [`Condition`] here and carry on. The caller inspects the collector once
//! per run and decides what is fatal.

use serde::Serialize;
use std::cmp::Reverse;
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// How serious a recorded condition is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Observable in verbose output only.
    Note,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Note => write!(f, "note"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// Everything that can go wrong without stopping a run.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum Condition {
    #[error("unknown keyword '{keyword}'; block preserved verbatim")]
    UnknownKeyword { keyword: String },

    #[error("block '{keyword}' declares {needed} more line(s) but only {available} remain")]
    StructuralTruncation {
        keyword: String,
        needed: usize,
        available: usize,
    },

    #[error("field '{field}' of '{keyword}' fell back to its default (raw '{raw}')")]
    FieldCoercionFallback {
        keyword: String,
        field: &'static str,
        raw: String,
    },

    #[error("include '{path}' could not be resolved: {reason}")]
    IncludeResolutionFailure { path: String, reason: String },

    #[error("record under '{keyword}' carries layout '{found}' where '{expected}' was declared")]
    LayoutMismatch {
        keyword: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("block '{keyword}' declares {declared} repetition(s) but {actual} remain")]
    CountMismatch {
        keyword: String,
        declared: usize,
        actual: usize,
    },

    #[error("line {line} precedes the first keyword and was dropped")]
    StrayLine { line: usize },

    #[error("block '{keyword}' carries {count} trailing item(s) outside its declared layout")]
    TrailingData { keyword: String, count: usize },
}

impl Condition {
    pub fn severity(&self) -> Severity {
        match self {
            Condition::FieldCoercionFallback { .. } => Severity::Note,
            Condition::IncludeResolutionFailure { .. } => Severity::Error,
            _ => Severity::Warning,
        }
    }

    /// Aggregation key: repeats of the same condition on the same keyword
    /// collapse into one summary line.
    fn group_key(&self) -> String {
        match self {
            Condition::UnknownKeyword { keyword } => format!("unknown/{keyword}"),
            Condition::StructuralTruncation { keyword, .. } => format!("truncation/{keyword}"),
            Condition::FieldCoercionFallback { keyword, field, .. } => {
                format!("coercion/{keyword}/{field}")
            }
            Condition::IncludeResolutionFailure { path, .. } => format!("include/{path}"),
            Condition::LayoutMismatch { keyword, .. } => format!("layout/{keyword}"),
            Condition::CountMismatch { keyword, .. } => format!("count/{keyword}"),
            Condition::StrayLine { .. } => "stray".to_string(),
            Condition::TrailingData { keyword, .. } => format!("trailing/{keyword}"),
        }
    }
}

/// Accumulates conditions across one decode/encode run.
#[derive(Debug, Default)]
pub struct Diagnostics {
    items: Vec<Condition>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, condition: Condition) {
        self.items.push(condition);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Condition> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.items.iter().filter(|c| c.severity() == severity).count()
    }

    pub fn has_errors(&self) -> bool {
        self.count(Severity::Error) > 0
    }

    pub fn has_warnings(&self) -> bool {
        self.count(Severity::Warning) > 0
    }

    /// One line per distinct condition group, errors first, with repeat
    /// counts folded in so a deck with hundreds of unknown blocks reports
    /// each keyword once. Notes appear only when `verbose` is set.
    pub fn summary(&self, verbose: bool) -> Vec<String> {
        let mut groups: BTreeMap<(Reverse<Severity>, String), (String, usize)> = BTreeMap::new();
        for condition in &self.items {
            let severity = condition.severity();
            if severity == Severity::Note && !verbose {
                continue;
            }
            groups
                .entry((Reverse(severity), condition.group_key()))
                .and_modify(|(_, n)| *n += 1)
                .or_insert_with(|| (condition.to_string(), 1));
        }
        groups
            .into_iter()
            .map(|((Reverse(severity), _), (message, n))| {
                if n > 1 {
                    format!("{severity}: {message} ({n} occurrences)")
                } else {
                    format!("{severity}: {message}")
                }
            })
            .collect()
    }
}
