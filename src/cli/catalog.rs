//! Registered schema listing (`deckcodec catalog ...`).

use anyhow::Result;
use clap::Args;
use deckcodec::{builtin_registry, layouts_in};

/// Arguments for `deckcodec catalog`.
#[derive(Args, Debug)]
pub struct CatalogArgs {
    /// Also print each schema's layout tables.
    #[arg(long)]
    pub layouts: bool,
}

pub fn handle(args: CatalogArgs) -> Result<()> {
    let registry = builtin_registry();
    for schema in registry.schemas() {
        println!("{:<12} {}", schema.keyword(), schema.category());
        if !args.layouts {
            continue;
        }
        for layout in layouts_in(schema.steps()) {
            println!(
                "    {} ({} column(s) per line, {} line(s) per record)",
                layout.name,
                layout.line_width,
                layout.line_count()
            );
            for line in layout.lines {
                let columns: Vec<String> = line
                    .iter()
                    .map(|spec| format!("{}:{}", spec.name, spec.width))
                    .collect();
                println!("      [{}]", columns.join(", "));
            }
        }
    }
    Ok(())
}
