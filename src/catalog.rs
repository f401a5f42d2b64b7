//! Built-in demonstration schemas.
//!
//! The production catalog of per-keyword schemas lives outside this crate;
//! these entries keep the engine exercisable end to end and cover every
//! interpreter feature: plain tables, count-driven repetition, flag-gated
//! sub-cards, and width-switched multi-line layouts.

use crate::field::{Fallback, FieldKind, FieldSpec};
use crate::registry::{CardSchema, Category, KeywordSchema, Registry};
use crate::schema::{FieldRef, Layout, Step};

macro_rules! col {
    ($name:literal, $width:expr, Text) => {
        FieldSpec {
            name: $name,
            width: $width,
            kind: FieldKind::Text,
            fallback: Fallback::Blank,
        }
    };
    ($name:literal, $width:expr, $kind:ident) => {
        FieldSpec {
            name: $name,
            width: $width,
            kind: FieldKind::$kind,
            fallback: Fallback::Zero,
        }
    };
    ($name:literal, $width:expr, $kind:ident, $fallback:expr) => {
        FieldSpec {
            name: $name,
            width: $width,
            kind: FieldKind::$kind,
            fallback: $fallback,
        }
    };
}

static TITLE_CARD: &[FieldSpec] = &[col!("title", 80, Text)];
pub static TITLE_LAYOUT: Layout = Layout {
    name: "TITLE",
    line_width: 80,
    lines: &[TITLE_CARD],
};
static TITLE_STEPS: &[Step] = &[Step::Card(&TITLE_LAYOUT)];
static TITLE: CardSchema = CardSchema {
    keyword: "TITLE",
    category: Category::Control,
    steps: TITLE_STEPS,
};

static NODE_CARD: &[FieldSpec] = &[
    col!("id", 10, Int),
    col!("x", 10, Real),
    col!("y", 10, Real),
    col!("z", 10, Real),
];
pub static NODE_LAYOUT: Layout = Layout {
    name: "NODE",
    line_width: 40,
    lines: &[NODE_CARD],
};
static NODE_STEPS: &[Step] = &[Step::Table(&NODE_LAYOUT)];
static NODE: CardSchema = CardSchema {
    keyword: "NODE",
    category: Category::Mesh,
    steps: NODE_STEPS,
};

static ELEMENT_CARD: &[FieldSpec] = &[
    col!("id", 10, Int),
    col!("part", 10, Int),
    col!("n1", 10, Int),
    col!("n2", 10, Int),
    col!("n3", 10, Int),
    col!("n4", 10, Int),
];
pub static ELEMENT_LAYOUT: Layout = Layout {
    name: "ELEMENT",
    line_width: 60,
    lines: &[ELEMENT_CARD],
};
static ELEMENT_STEPS: &[Step] = &[Step::Table(&ELEMENT_LAYOUT)];
static ELEMENT: CardSchema = CardSchema {
    keyword: "ELEMENT",
    category: Category::Mesh,
    steps: ELEMENT_STEPS,
};

static MATERIAL_CARD: &[FieldSpec] = &[
    col!("id", 10, Int),
    col!("density", 10, Real),
    col!("youngs", 10, Real),
    col!("poisson", 10, Real),
    col!("harden", 10, Int),
];
pub static MATERIAL_LAYOUT: Layout = Layout {
    name: "MATERIAL",
    line_width: 50,
    lines: &[MATERIAL_CARD],
};
static MATERIAL_PLASTIC_CARD: &[FieldSpec] = &[
    col!("yield", 10, Real),
    col!("tangent", 10, Real),
    col!("failure", 10, Real),
];
pub static MATERIAL_PLASTIC_LAYOUT: Layout = Layout {
    name: "MATERIAL_PLASTIC",
    line_width: 30,
    lines: &[MATERIAL_PLASTIC_CARD],
};
static MATERIAL_PLASTIC_STEPS: &[Step] = &[Step::Card(&MATERIAL_PLASTIC_LAYOUT)];
static MATERIAL_STEPS: &[Step] = &[
    Step::Card(&MATERIAL_LAYOUT),
    Step::Switch {
        on: FieldRef { record: 0, field: 4 },
        arms: &[(1, MATERIAL_PLASTIC_STEPS)],
        default: &[],
    },
];
static MATERIAL: CardSchema = CardSchema {
    keyword: "MATERIAL",
    category: Category::Material,
    steps: MATERIAL_STEPS,
};

static BOUNDARY_SET_CARD: &[FieldSpec] = &[col!("set", 10, Int), col!("count", 10, Int)];
pub static BOUNDARY_SET_LAYOUT: Layout = Layout {
    name: "BOUNDARY_SET",
    line_width: 20,
    lines: &[BOUNDARY_SET_CARD],
};
static BOUNDARY_FIX_CARD: &[FieldSpec] = &[
    col!("node", 10, Int),
    col!("dof", 10, Int),
    col!("value", 10, Real),
];
pub static BOUNDARY_FIX_LAYOUT: Layout = Layout {
    name: "BOUNDARY_FIX",
    line_width: 30,
    lines: &[BOUNDARY_FIX_CARD],
};
static BOUNDARY_STEPS: &[Step] = &[
    Step::Card(&BOUNDARY_SET_LAYOUT),
    Step::Count {
        count: FieldRef { record: 0, field: 1 },
        layout: &BOUNDARY_FIX_LAYOUT,
    },
];
static BOUNDARY: CardSchema = CardSchema {
    keyword: "BOUNDARY",
    category: Category::Boundary,
    steps: BOUNDARY_STEPS,
};

static CONTACT_HEAD_CARD: &[FieldSpec] = &[
    col!("id", 10, Int),
    col!("kind", 10, Int),
    col!("format", 10, Int),
];
pub static CONTACT_HEAD_LAYOUT: Layout = Layout {
    name: "CONTACT_HEAD",
    line_width: 30,
    lines: &[CONTACT_HEAD_CARD],
};
static CONTACT_STANDARD_CARD: &[FieldSpec] = &[
    col!("surfa", 10, Int),
    col!("surfb", 10, Int),
    col!("fric", 10, Real),
    col!("damp", 10, Real),
    col!("stiff", 10, Real),
    col!("gap", 10, Real),
];
pub static CONTACT_STANDARD_LAYOUT: Layout = Layout {
    name: "CONTACT_STANDARD",
    line_width: 60,
    lines: &[CONTACT_STANDARD_CARD],
};
// Wide format: the same six fields at 16 columns, spilling onto a second
// physical line per pair.
static CONTACT_WIDE_CARD_A: &[FieldSpec] = &[
    col!("surfa", 16, Int),
    col!("surfb", 16, Int),
    col!("fric", 16, Real),
];
static CONTACT_WIDE_CARD_B: &[FieldSpec] = &[
    col!("damp", 16, Real),
    col!("stiff", 16, Real),
    col!("gap", 16, Real),
];
pub static CONTACT_WIDE_LAYOUT: Layout = Layout {
    name: "CONTACT_WIDE",
    line_width: 48,
    lines: &[CONTACT_WIDE_CARD_A, CONTACT_WIDE_CARD_B],
};
static CONTACT_STANDARD_STEPS: &[Step] = &[Step::Table(&CONTACT_STANDARD_LAYOUT)];
static CONTACT_WIDE_STEPS: &[Step] = &[Step::Table(&CONTACT_WIDE_LAYOUT)];
static CONTACT_STEPS: &[Step] = &[
    Step::Card(&CONTACT_HEAD_LAYOUT),
    Step::Switch {
        on: FieldRef { record: 0, field: 2 },
        arms: &[(1, CONTACT_WIDE_STEPS)],
        default: CONTACT_STANDARD_STEPS,
    },
];
static CONTACT: CardSchema = CardSchema {
    keyword: "CONTACT",
    category: Category::Contact,
    steps: CONTACT_STEPS,
};

static END_STEPS: &[Step] = &[];
static END: CardSchema = CardSchema {
    keyword: "END",
    category: Category::Output,
    steps: END_STEPS,
};

/// Every built-in schema, registration order.
pub fn builtin() -> [&'static dyn KeywordSchema; 7] {
    [&TITLE, &NODE, &ELEMENT, &MATERIAL, &BOUNDARY, &CONTACT, &END]
}

pub fn register_builtin(registry: &mut Registry) {
    for schema in builtin() {
        registry.register(schema);
    }
}
