//! Keyword lookup: the seam between the codec engine and the schema catalog.

use serde::Serialize;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::fmt;

use crate::schema::Step;

/// Section a keyword belongs to in the canonical output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Control,
    Mesh,
    Material,
    Boundary,
    Contact,
    Output,
}

/// Canonical emission order across block categories.
pub const EMISSION_ORDER: [Category; 6] = [
    Category::Control,
    Category::Mesh,
    Category::Material,
    Category::Boundary,
    Category::Contact,
    Category::Output,
];

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::Control => write!(f, "control"),
            Category::Mesh => write!(f, "mesh"),
            Category::Material => write!(f, "material"),
            Category::Boundary => write!(f, "boundary"),
            Category::Contact => write!(f, "contact"),
            Category::Output => write!(f, "output"),
        }
    }
}

/// A keyword's declared decode/encode behavior.
pub trait KeywordSchema: Sync {
    /// Canonical (uppercase) keyword this schema owns.
    fn keyword(&self) -> &'static str;
    fn category(&self) -> Category;
    /// The step program both decode and encode execute.
    fn steps(&self) -> &'static [Step];
}

/// Declarative schema: keyword, category, and a static step program.
#[derive(Debug)]
pub struct CardSchema {
    pub keyword: &'static str,
    pub category: Category,
    pub steps: &'static [Step],
}

impl KeywordSchema for CardSchema {
    fn keyword(&self) -> &'static str {
        self.keyword
    }

    fn category(&self) -> Category {
        self.category
    }

    fn steps(&self) -> &'static [Step] {
        self.steps
    }
}

/// Keyword-to-schema map, populated once at startup and read-only after.
/// First registration wins; duplicates are rejected.
#[derive(Default)]
pub struct Registry {
    map: HashMap<String, &'static dyn KeywordSchema>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` and leaves the existing entry when the keyword is
    /// already taken.
    pub fn register(&mut self, schema: &'static dyn KeywordSchema) -> bool {
        match self.map.entry(schema.keyword().to_ascii_uppercase()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(schema);
                true
            }
        }
    }

    pub fn lookup(&self, keyword: &str) -> Option<&'static dyn KeywordSchema> {
        self.map.get(&keyword.to_ascii_uppercase()).copied()
    }

    /// All registered schemas, sorted by keyword for stable listings.
    pub fn schemas(&self) -> Vec<&'static dyn KeywordSchema> {
        let mut all: Vec<_> = self.map.values().copied().collect();
        all.sort_by_key(|schema| schema.keyword());
        all
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}
