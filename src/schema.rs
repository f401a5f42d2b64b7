//! Layout tables and the step interpreter that executes them.
//!
//! A schema is pure data: named column-width tables ([`Layout`]) and a
//! [`Step`] program over them. Decode and encode walk the same program, so
//! a conditional variant can never be read under one width table and
//! written under another.

use serde::{Serialize, Serializer};

use crate::diag::{Condition, Diagnostics};
use crate::field::{FieldSpec, Justify, Value, encode_field, slice};

/// A named layout-mode: one or more physical lines of fixed-width columns
/// that together form one logical record.
#[derive(Debug, PartialEq)]
pub struct Layout {
    pub name: &'static str,
    /// Canonical width every physical line of this mode must sum to.
    pub line_width: usize,
    pub lines: &'static [&'static [FieldSpec]],
}

impl Layout {
    pub fn field_count(&self) -> usize {
        self.lines.iter().map(|line| line.len()).sum()
    }

    /// Physical lines one record of this mode occupies.
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn fields(&self) -> impl Iterator<Item = &'static FieldSpec> {
        self.lines.iter().flat_map(|line| line.iter())
    }

    /// Column-label comment lines, one per physical line, aligned to the
    /// same width table the data lines use.
    pub fn labels(&self, comment: char) -> Vec<String> {
        self.lines
            .iter()
            .map(|specs| {
                let mut line = String::new();
                line.push(comment);
                for (index, spec) in specs.iter().enumerate() {
                    // The comment character occupies the first column.
                    let width = if index == 0 {
                        spec.width.saturating_sub(1)
                    } else {
                        spec.width
                    };
                    let name: String = spec.name.chars().take(width).collect();
                    match spec.justify() {
                        Justify::Right => line.push_str(&format!("{:>width$}", name)),
                        Justify::Left => line.push_str(&format!("{:<width$}", name)),
                    }
                }
                line.trim_end().to_string()
            })
            .collect()
    }

    /// Decode one record from exactly `line_count()` raw lines.
    pub fn decode_record(
        &'static self,
        keyword: &str,
        raw_lines: &[&str],
        diag: &mut Diagnostics,
    ) -> Record {
        let mut values = Vec::with_capacity(self.field_count());
        for (specs, raw) in self.lines.iter().zip(raw_lines) {
            let mut start = 0usize;
            for spec in specs.iter() {
                let column = slice(raw, start, spec.width);
                let (value, fell_back) = spec.decode(column);
                if fell_back {
                    diag.push(Condition::FieldCoercionFallback {
                        keyword: keyword.to_string(),
                        field: spec.name,
                        raw: column.trim().to_string(),
                    });
                }
                values.push(value);
                start += spec.width;
            }
        }
        Record {
            layout: self,
            values,
        }
    }

    /// Render one record back into `line_count()` fixed-width lines.
    pub fn encode_record(&self, record: &Record) -> Vec<String> {
        let mut values = record.values.iter();
        self.lines
            .iter()
            .map(|specs| {
                let mut line = String::new();
                for spec in specs.iter() {
                    let value = values
                        .next()
                        .cloned()
                        .unwrap_or_else(|| spec.fallback_value());
                    line.push_str(&encode_field(&value, spec.width, spec.justify()));
                }
                line.trim_end().to_string()
            })
            .collect()
    }
}

fn layout_name<S: Serializer>(
    layout: &&'static Layout,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(layout.name)
}

/// One decoded logical unit: ordered values under a single layout-mode.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    #[serde(rename = "layout", serialize_with = "layout_name")]
    pub layout: &'static Layout,
    pub values: Vec<Value>,
}

impl Record {
    pub fn new(layout: &'static Layout, values: Vec<Value>) -> Self {
        Self { layout, values }
    }

    pub fn value(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    pub fn int(&self, index: usize) -> Option<i64> {
        self.values.get(index).and_then(Value::as_int)
    }

    pub fn real(&self, index: usize) -> Option<f64> {
        self.values.get(index).and_then(Value::as_real)
    }

    pub fn set(&mut self, index: usize, value: Value) {
        if let Some(slot) = self.values.get_mut(index) {
            *slot = value;
        }
    }
}

/// Position of an already-decoded field within the current block, used to
/// drive conditional multiplicity and layout switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldRef {
    pub record: usize,
    pub field: usize,
}

/// One instruction of a schema's decode/encode program.
#[derive(Debug, PartialEq)]
pub enum Step {
    /// Exactly one record of the given layout.
    Card(&'static Layout),
    /// `count` records of the given layout, the count read from a field
    /// decoded earlier in the same block.
    Count {
        count: FieldRef,
        layout: &'static Layout,
    },
    /// Records of the given layout until the block is exhausted.
    Table(&'static Layout),
    /// Branch on an already-decoded field; transitions happen only at
    /// record boundaries.
    Switch {
        on: FieldRef,
        arms: &'static [(i64, &'static [Step])],
        default: &'static [Step],
    },
}

fn resolve_int(records: &[Record], at: FieldRef) -> Option<i64> {
    records.get(at.record)?.int(at.field)
}

/// Every layout a step program can reach, in first-use order.
pub fn layouts_in(steps: &'static [Step]) -> Vec<&'static Layout> {
    let mut found: Vec<&'static Layout> = Vec::new();
    collect_layouts(steps, &mut found);
    found
}

fn collect_layouts(steps: &'static [Step], found: &mut Vec<&'static Layout>) {
    for step in steps {
        match step {
            Step::Card(layout) | Step::Table(layout) | Step::Count { layout, .. } => {
                if !found.iter().any(|known| known.name == layout.name) {
                    found.push(layout);
                }
            }
            Step::Switch { arms, default, .. } => {
                for (_, sub) in arms.iter() {
                    collect_layouts(sub, found);
                }
                collect_layouts(default, found);
            }
        }
    }
}

/// Execute a schema's program over a block's raw lines. Returns `None` when
/// the declared structure outruns the available lines (or leaves lines
/// unclaimed), in which case the caller keeps the block opaque.
pub fn decode_block(
    keyword: &str,
    steps: &'static [Step],
    lines: &[String],
    diag: &mut Diagnostics,
) -> Option<Vec<Record>> {
    let mut records = Vec::new();
    let mut cursor = 0usize;
    if run_decode(keyword, steps, lines, &mut cursor, &mut records, diag).is_err() {
        return None;
    }
    if cursor < lines.len() {
        diag.push(Condition::TrailingData {
            keyword: keyword.to_string(),
            count: lines.len() - cursor,
        });
        return None;
    }
    Some(records)
}

fn run_decode(
    keyword: &str,
    steps: &'static [Step],
    lines: &[String],
    cursor: &mut usize,
    records: &mut Vec<Record>,
    diag: &mut Diagnostics,
) -> Result<(), ()> {
    for step in steps {
        match step {
            Step::Card(layout) => {
                decode_one(keyword, layout, lines, cursor, records, diag)?;
            }
            Step::Count { count, layout } => {
                let declared = resolve_int(records, *count).unwrap_or(0).max(0) as usize;
                let needed = declared * layout.line_count();
                let available = lines.len() - *cursor;
                if needed > available {
                    diag.push(Condition::StructuralTruncation {
                        keyword: keyword.to_string(),
                        needed,
                        available,
                    });
                    return Err(());
                }
                for _ in 0..declared {
                    decode_one(keyword, layout, lines, cursor, records, diag)?;
                }
            }
            Step::Table(layout) => {
                while lines.len() - *cursor >= layout.line_count() {
                    decode_one(keyword, layout, lines, cursor, records, diag)?;
                }
                let leftover = lines.len() - *cursor;
                if leftover > 0 {
                    diag.push(Condition::StructuralTruncation {
                        keyword: keyword.to_string(),
                        needed: layout.line_count(),
                        available: leftover,
                    });
                    return Err(());
                }
            }
            Step::Switch { on, arms, default } => {
                let selector = resolve_int(records, *on);
                let branch = arms
                    .iter()
                    .find(|(value, _)| Some(*value) == selector)
                    .map(|(_, sub)| *sub)
                    .unwrap_or(default);
                run_decode(keyword, branch, lines, cursor, records, diag)?;
            }
        }
    }
    Ok(())
}

fn decode_one(
    keyword: &str,
    layout: &'static Layout,
    lines: &[String],
    cursor: &mut usize,
    records: &mut Vec<Record>,
    diag: &mut Diagnostics,
) -> Result<(), ()> {
    let needed = layout.line_count();
    let available = lines.len() - *cursor;
    if available < needed {
        diag.push(Condition::StructuralTruncation {
            keyword: keyword.to_string(),
            needed,
            available,
        });
        return Err(());
    }
    let raw: Vec<&str> = lines[*cursor..*cursor + needed]
        .iter()
        .map(|line| line.as_str())
        .collect();
    records.push(layout.decode_record(keyword, &raw, diag));
    *cursor += needed;
    Ok(())
}

/// Mirror walk: re-render records into fixed-width lines, grouped by the
/// layout that produced them so the serializer can emit label comments at
/// each mode change.
pub fn encode_block(
    keyword: &str,
    steps: &'static [Step],
    records: &[Record],
    diag: &mut Diagnostics,
) -> Vec<(&'static Layout, Vec<String>)> {
    let mut out = Vec::with_capacity(records.len());
    let mut cursor = 0usize;
    run_encode(keyword, steps, records, &mut cursor, &mut out, diag);
    if cursor < records.len() {
        diag.push(Condition::TrailingData {
            keyword: keyword.to_string(),
            count: records.len() - cursor,
        });
        // Emit the undeclared tail anyway, each record under its own
        // layout, so mutation never silently loses data.
        for record in &records[cursor..] {
            out.push((record.layout, record.layout.encode_record(record)));
        }
    }
    out
}

fn run_encode(
    keyword: &str,
    steps: &'static [Step],
    records: &[Record],
    cursor: &mut usize,
    out: &mut Vec<(&'static Layout, Vec<String>)>,
    diag: &mut Diagnostics,
) {
    for step in steps {
        match step {
            Step::Card(layout) => {
                if *cursor >= records.len() {
                    return;
                }
                encode_one(keyword, layout, records, cursor, out, diag);
            }
            Step::Count { count, layout } => {
                let declared = resolve_int(records, *count).unwrap_or(0).max(0) as usize;
                let available = records.len() - *cursor;
                let emit = declared.min(available);
                if declared != emit {
                    diag.push(Condition::CountMismatch {
                        keyword: keyword.to_string(),
                        declared,
                        actual: available,
                    });
                }
                for _ in 0..emit {
                    encode_one(keyword, layout, records, cursor, out, diag);
                }
            }
            Step::Table(layout) => {
                while *cursor < records.len() {
                    encode_one(keyword, layout, records, cursor, out, diag);
                }
            }
            Step::Switch { on, arms, default } => {
                let selector = resolve_int(records, *on);
                let branch = arms
                    .iter()
                    .find(|(value, _)| Some(*value) == selector)
                    .map(|(_, sub)| *sub)
                    .unwrap_or(default);
                run_encode(keyword, branch, records, cursor, out, diag);
            }
        }
    }
}

fn encode_one(
    keyword: &str,
    expected: &'static Layout,
    records: &[Record],
    cursor: &mut usize,
    out: &mut Vec<(&'static Layout, Vec<String>)>,
    diag: &mut Diagnostics,
) {
    let record = &records[*cursor];
    if record.layout.name != expected.name {
        diag.push(Condition::LayoutMismatch {
            keyword: keyword.to_string(),
            expected: expected.name,
            found: record.layout.name,
        });
    }
    // A record is always rendered under the layout that decoded it.
    out.push((record.layout, record.layout.encode_record(record)));
    *cursor += 1;
}
