//! Fixed-width column slicing and value coercion.
//!
//! Everything in this module is pure and total: malformed input degrades
//! to a fallback or to raw text, it never raises. Widths are counted in
//! characters, not bytes.

use serde::{Serialize, Serializer};
use std::fmt;

/// A decoded field value: numeric when the column parses, raw text otherwise.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Int(i64),
    Real(f64),
    Text(String),
}

impl Value {
    /// Integer view used for count fields and layout switches.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            Value::Real(r) if r.is_finite() => Some(*r as i64),
            _ => None,
        }
    }

    pub fn as_real(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Real(r) => Some(*r),
            Value::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn text<S: Into<String>>(s: S) -> Self {
        Value::Text(s.into())
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(i) => write!(f, "{}", i),
            Value::Real(r) => write!(f, "{}", r),
            Value::Text(s) => write!(f, "{}", s),
        }
    }
}

/// Column justification. Numeric columns are right-justified, text left.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Justify {
    Left,
    Right,
}

/// Interpretation of a column's raw text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Int,
    Real,
    Text,
}

/// Declared substitute for a blank or unparseable column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Fallback {
    /// Kind-appropriate zero (`0`, `0.0`, or empty text).
    Zero,
    /// Empty text regardless of kind.
    Blank,
    Int(i64),
    Real(f64),
}

impl Fallback {
    pub fn value(self, kind: FieldKind) -> Value {
        match self {
            Fallback::Zero => match kind {
                FieldKind::Int => Value::Int(0),
                FieldKind::Real => Value::Real(0.0),
                FieldKind::Text => Value::Text(String::new()),
            },
            Fallback::Blank => Value::Text(String::new()),
            Fallback::Int(i) => Value::Int(i),
            Fallback::Real(r) => Value::Real(r),
        }
    }
}

/// One fixed-width column slot within a layout line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub width: usize,
    pub kind: FieldKind,
    pub fallback: Fallback,
}

impl FieldSpec {
    pub const fn justify(&self) -> Justify {
        match self.kind {
            FieldKind::Text => Justify::Left,
            _ => Justify::Right,
        }
    }

    pub fn fallback_value(&self) -> Value {
        self.fallback.value(self.kind)
    }

    /// Decode a raw column slice. The boolean reports whether the declared
    /// fallback was substituted for a non-blank slice that failed to parse.
    pub fn decode(&self, raw: &str) -> (Value, bool) {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return (self.fallback_value(), false);
        }
        match self.kind {
            FieldKind::Text => (Value::Text(trimmed.to_string()), false),
            FieldKind::Int => match decode_numeric(trimmed) {
                Value::Int(i) => (Value::Int(i), false),
                Value::Real(r) if r == r.trunc() && r.abs() < i64::MAX as f64 => {
                    (Value::Int(r as i64), false)
                }
                _ => (self.fallback_value(), true),
            },
            FieldKind::Real => match decode_numeric(trimmed) {
                Value::Int(i) => (Value::Real(i as f64), false),
                Value::Real(r) => (Value::Real(r), false),
                Value::Text(_) => (self.fallback_value(), true),
            },
        }
    }
}

impl Serialize for Justify {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Justify::Left => serializer.serialize_str("left"),
            Justify::Right => serializer.serialize_str("right"),
        }
    }
}

/// Extract the column starting at character `start`, `width` characters wide.
/// Lines shorter than `start` yield an empty slice.
pub fn slice(line: &str, start: usize, width: usize) -> &str {
    let begin = match line.char_indices().nth(start) {
        Some((offset, _)) => offset,
        None => return "",
    };
    let end = line
        .char_indices()
        .nth(start + width)
        .map(|(offset, _)| offset)
        .unwrap_or(line.len());
    &line[begin..end]
}

/// Coerce trimmed text to a number when it fully matches a numeric literal,
/// otherwise hand the trimmed text back unchanged. Accepts the Fortran-style
/// `D` exponent that legacy decks carry (`1.5D+3`).
pub fn decode_numeric(text: &str) -> Value {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Value::Text(String::new());
    }
    if let Ok(i) = trimmed.parse::<i64>() {
        return Value::Int(i);
    }
    if let Some(r) = parse_real(trimmed) {
        return Value::Real(r);
    }
    Value::Text(trimmed.to_string())
}

fn parse_real(text: &str) -> Option<f64> {
    let first = text.chars().next()?;
    if !(first.is_ascii_digit() || first == '+' || first == '-' || first == '.') {
        return None;
    }
    if !text.chars().any(|ch| ch.is_ascii_digit()) {
        return None;
    }
    // f64::from_str would happily accept "inf"/"NaN"; the leading-character
    // guard above already rejects those.
    let normalized;
    let candidate = if text.contains(['d', 'D']) {
        normalized = text.replace(['d', 'D'], "e");
        normalized.as_str()
    } else {
        text
    };
    candidate.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Format a value into a fixed-width column. Right-justified values that
/// would completely fill the width gain one trailing blank so adjacent
/// numeric columns can never fuse into one token.
pub fn encode_field(value: &Value, width: usize, justify: Justify) -> String {
    let text = match value {
        Value::Int(i) => i.to_string(),
        Value::Real(r) => render_real(*r, width),
        Value::Text(s) => s.clone(),
    };
    match justify {
        Justify::Left => {
            let mut out: String = text.chars().take(width).collect();
            while out.chars().count() < width {
                out.push(' ');
            }
            out
        }
        Justify::Right => {
            if text.chars().count() >= width {
                let mut out = text;
                out.push(' ');
                out
            } else {
                format!("{:>width$}", text)
            }
        }
    }
}

/// Render a real so it fits the column, keeping a decimal point and degrading
/// precision before overflowing the width.
fn render_real(value: f64, width: usize) -> String {
    if value == value.trunc() && value.abs() < 1e15 {
        let plain = format!("{:.1}", value);
        if plain.len() <= width {
            return plain;
        }
    }
    let shortest = format!("{}", value);
    if shortest.len() <= width {
        return shortest;
    }
    for precision in (0..=16).rev() {
        let sci = format!("{:.*e}", precision, value);
        if sci.len() <= width {
            return sci;
        }
    }
    format!("{:.0e}", value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn slice_handles_short_lines() {
        assert_eq!(slice("abcdef", 0, 3), "abc");
        assert_eq!(slice("abcdef", 4, 10), "ef");
        assert_eq!(slice("abc", 5, 2), "");
        assert_eq!(slice("", 0, 8), "");
    }

    #[test]
    fn slice_counts_characters_not_bytes() {
        assert_eq!(slice("äöü123", 2, 3), "ü12");
    }

    #[test]
    fn numeric_coercion() {
        assert_eq!(decode_numeric("  42 "), Value::Int(42));
        assert_eq!(decode_numeric("-7"), Value::Int(-7));
        assert_eq!(decode_numeric("2.5"), Value::Real(2.5));
        assert_eq!(decode_numeric("1.5e3"), Value::Real(1500.0));
        assert_eq!(decode_numeric("1.5D+3"), Value::Real(1500.0));
        assert_eq!(decode_numeric("steel"), Value::text("steel"));
        assert_eq!(decode_numeric("1-2"), Value::text("1-2"));
        assert_eq!(decode_numeric("inf"), Value::text("inf"));
        assert_eq!(decode_numeric(""), Value::text(""));
    }

    #[test]
    fn blank_numeric_column_falls_back_to_default() {
        let spec = FieldSpec {
            name: "id",
            width: 10,
            kind: FieldKind::Int,
            fallback: Fallback::Zero,
        };
        assert_eq!(spec.decode("          "), (Value::Int(0), false));
        assert_eq!(spec.decode(""), (Value::Int(0), false));
    }

    #[test]
    fn garbage_in_numeric_column_is_flagged() {
        let spec = FieldSpec {
            name: "density",
            width: 10,
            kind: FieldKind::Real,
            fallback: Fallback::Real(1.0),
        };
        assert_eq!(spec.decode("   rubber "), (Value::Real(1.0), true));
        assert_eq!(spec.decode("   7.85   "), (Value::Real(7.85), false));
    }

    #[test]
    fn integral_real_accepted_in_int_column() {
        let spec = FieldSpec {
            name: "count",
            width: 10,
            kind: FieldKind::Int,
            fallback: Fallback::Zero,
        };
        assert_eq!(spec.decode("       3. "), (Value::Int(3), false));
        assert_eq!(spec.decode("      3.7 "), (Value::Int(0), true));
    }

    #[test]
    fn encode_right_justifies_numbers() {
        assert_eq!(encode_field(&Value::Int(42), 10, Justify::Right), "        42");
        assert_eq!(encode_field(&Value::Real(2.5), 10, Justify::Right), "       2.5");
        assert_eq!(encode_field(&Value::Real(3.0), 10, Justify::Right), "       3.0");
    }

    #[test]
    fn encode_left_justifies_text() {
        assert_eq!(encode_field(&Value::text("hinge"), 8, Justify::Left), "hinge   ");
        assert_eq!(encode_field(&Value::text("overlong"), 4, Justify::Left), "over");
    }

    #[test]
    fn full_width_number_gains_separator_blank() {
        let out = encode_field(&Value::Int(1234567890), 10, Justify::Right);
        assert_eq!(out, "1234567890 ");
    }

    #[test]
    fn real_rendering_degrades_before_overflowing() {
        let out = encode_field(&Value::Real(123456.789012345), 10, Justify::Right);
        assert!(out.trim().len() <= 10, "{:?}", out);
        let back = decode_numeric(&out);
        match back {
            Value::Real(r) => assert!((r - 123456.789012345).abs() < 1.0),
            other => panic!("expected a real, got {:?}", other),
        }
    }
}
