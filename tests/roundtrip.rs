use anyhow::{Result, anyhow};
use pretty_assertions::assert_eq;
use std::collections::HashMap;

use deckcodec::{
    Deck, Diagnostics, IncludeResolver, NoIncludes, Syntax, TokenizeOptions, Value, WriteOptions,
    builtin_registry, decode_deck, encode_deck,
};

struct MapResolver(HashMap<&'static str, &'static str>);

impl IncludeResolver for MapResolver {
    fn resolve(&mut self, path: &str) -> Result<String> {
        self.0
            .get(path)
            .map(|text| text.to_string())
            .ok_or_else(|| anyhow!("no such source '{}'", path))
    }
}

fn decode(source: &str) -> (Deck, Diagnostics) {
    let registry = builtin_registry();
    let mut diag = Diagnostics::new();
    let deck = decode_deck(
        source,
        &registry,
        &mut NoIncludes,
        &Syntax::default(),
        TokenizeOptions::default(),
        &mut diag,
    )
    .expect("decode failed");
    (deck, diag)
}

fn encode(deck: &Deck, diag: &mut Diagnostics) -> String {
    encode_deck(
        deck,
        &builtin_registry(),
        &Syntax::default(),
        WriteOptions::default(),
        diag,
    )
}

const CANONICAL_DECK: &str = "\
*TITLE
cantilever beam test model
*NODE
         1       0.0       0.0       0.0
         2     100.0       0.0       0.0
*ELEMENT
         1         1         1         2         0         0
*MATERIAL
         1      7.85     210.0       0.3         1
     350.0    1200.0      0.18
*BOUNDARY
         1         2
         5         1       0.0
         6         2      -1.5
*CONTACT
         1         1         0
         1         2       0.2       0.0       0.1      0.05
*END
";

#[test]
fn full_deck_round_trips_to_identical_values() {
    let (original, diag) = decode(CANONICAL_DECK);
    assert!(diag.is_empty(), "{:?}", diag.summary(true));

    let mut diag = Diagnostics::new();
    let rendered = encode(&original, &mut diag);
    let (reparsed, rediag) = decode(&rendered);
    assert!(rediag.is_empty(), "{:?}", rediag.summary(true));
    assert_eq!(original, reparsed);
}

#[test]
fn decoded_fields_carry_expected_values() {
    let (deck, _) = decode(CANONICAL_DECK);

    let nodes = deck.first("NODE").unwrap().record_list().unwrap();
    assert_eq!(nodes.len(), 2);
    assert_eq!(nodes[1].int(0), Some(2));
    assert_eq!(nodes[1].real(1), Some(100.0));

    let material = deck.first("MATERIAL").unwrap().record_list().unwrap();
    assert_eq!(material.len(), 2);
    assert_eq!(material[1].real(0), Some(350.0));

    let boundary = deck.first("BOUNDARY").unwrap().record_list().unwrap();
    assert_eq!(boundary.len(), 3);
    assert_eq!(boundary[2].real(2), Some(-1.5));

    let title = deck.first("TITLE").unwrap().record_list().unwrap();
    assert_eq!(
        title[0].value(0),
        Some(&Value::text("cantilever beam test model"))
    );
}

#[test]
fn mutation_between_decode_and_encode_sticks() {
    let (mut deck, _) = decode(CANONICAL_DECK);
    let nodes = deck
        .first_mut("NODE")
        .unwrap()
        .record_list_mut()
        .unwrap();
    nodes[0].set(3, Value::Real(12.5));

    let mut diag = Diagnostics::new();
    let rendered = encode(&deck, &mut diag);
    let (reparsed, _) = decode(&rendered);
    let nodes = reparsed.first("NODE").unwrap().record_list().unwrap();
    assert_eq!(nodes[0].real(3), Some(12.5));
}

#[test]
fn wide_contact_round_trips_through_the_full_pipeline() {
    let source = "\
*CONTACT
         4         1         1
               1               2             0.2
             0.0             0.1            0.05
*END
";
    let (deck, diag) = decode(source);
    assert!(diag.is_empty(), "{:?}", diag.summary(true));
    let pairs = deck.first("CONTACT").unwrap().record_list().unwrap();
    assert_eq!(pairs[1].layout.name, "CONTACT_WIDE");
    assert_eq!(pairs[1].real(5), Some(0.05));

    let mut diag = Diagnostics::new();
    let rendered = encode(&deck, &mut diag);
    let (reparsed, _) = decode(&rendered);
    assert_eq!(deck, reparsed);
}

#[test]
fn includes_splice_blocks_at_the_point_of_reference() {
    let registry = builtin_registry();
    let mut resolver = MapResolver(HashMap::from([(
        "mesh.inc",
        "*NODE\n         1       0.0       0.0       0.0\n*ELEMENT\n         1         1         1         1         0         0\n",
    )]));
    let mut diag = Diagnostics::new();
    let deck = decode_deck(
        "*TITLE\nincluded mesh\n*INCLUDE\nmesh.inc\n*MATERIAL\n         1      7.85     210.0       0.3         0\n*END\n",
        &registry,
        &mut resolver,
        &Syntax::default(),
        TokenizeOptions::default(),
        &mut diag,
    )
    .unwrap();
    let keywords: Vec<&str> = deck.iter().map(|b| b.keyword.as_str()).collect();
    assert_eq!(
        keywords,
        vec!["TITLE", "NODE", "ELEMENT", "MATERIAL", "END"]
    );
    assert!(diag.is_empty(), "{:?}", diag.summary(true));
}

#[test]
fn unknown_blocks_survive_a_round_trip_verbatim() {
    let source = "\
*NODE
         1       0.0       0.0       0.0
*PERFORATION
  7 custom payload kept as-is
*END
";
    let (deck, diag) = decode(source);
    assert!(diag.has_warnings());

    let mut diag = Diagnostics::new();
    let rendered = encode(&deck, &mut diag);
    assert!(rendered.contains("*PERFORATION\n  7 custom payload kept as-is\n"));

    let (reparsed, _) = decode(&rendered);
    let opaque = reparsed.first("PERFORATION").unwrap();
    assert_eq!(
        opaque.body,
        deck.first("PERFORATION").unwrap().body.clone()
    );
}

#[test]
fn truncated_block_degrades_to_opaque_and_re_emits_its_lines() {
    // BOUNDARY promises three constraint cards, supplies two.
    let source = "\
*BOUNDARY
         1         3
         5         1       0.0
         6         2      -1.5
*END
";
    let (deck, diag) = decode(source);
    assert!(deck.first("BOUNDARY").unwrap().is_opaque());
    assert!(diag.has_warnings());

    let mut diag = Diagnostics::new();
    let rendered = encode(&deck, &mut diag);
    assert!(rendered.contains("         6         2      -1.5\n"));
}
