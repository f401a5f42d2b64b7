//! Convenience helpers shared across command handlers.

use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use sha2::{Digest, Sha256};

use deckcodec::{
    Deck, Diagnostics, IncludePolicy, IncludeResolver, Registry, Syntax, TokenizeOptions,
    decode_deck,
};

/// Expanding more sources than this in one run is treated as a cycle.
const MAX_INCLUDES: usize = 64;

/// Read a deck source from a file, or stdin when `-` is given.
pub fn read_input(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("failed to read from stdin")?;
        return Ok(buffer);
    }
    fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

/// Persist a string either to a file or stdout when `-` is provided.
pub fn write_output(path: &Path, content: &str) -> Result<()> {
    if path.as_os_str() == "-" {
        io::stdout().write_all(content.as_bytes())?;
        return Ok(());
    }
    fs::write(path, content).with_context(|| format!("failed to write {}", path.display()))
}

/// Filesystem include resolver. Relative paths resolve against the root
/// deck's directory; a budget on total expansions turns cyclic includes
/// into an error instead of a hang.
pub struct FileResolver {
    base: PathBuf,
    resolved: usize,
}

impl FileResolver {
    pub fn new<P: Into<PathBuf>>(base: P) -> Self {
        Self {
            base: base.into(),
            resolved: 0,
        }
    }

    /// Resolver rooted at the directory containing `input` (or the current
    /// directory for stdin).
    pub fn for_input(input: &Path) -> Self {
        let base = if input.as_os_str() == "-" {
            PathBuf::from(".")
        } else {
            input
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from("."))
        };
        Self::new(base)
    }
}

impl IncludeResolver for FileResolver {
    fn resolve(&mut self, path: &str) -> Result<String> {
        self.resolved += 1;
        if self.resolved > MAX_INCLUDES {
            return Err(anyhow!(
                "include expansion exceeded {} sources; cyclic include?",
                MAX_INCLUDES
            ));
        }
        let full = if Path::new(path).is_absolute() {
            PathBuf::from(path)
        } else {
            self.base.join(path)
        };
        fs::read_to_string(&full).with_context(|| format!("failed to read {}", full.display()))
    }
}

/// Read, tokenize, and decode one deck with the filesystem resolver.
pub fn decode_from(
    input: &Path,
    registry: &Registry,
    policy: IncludePolicy,
) -> Result<(Deck, Diagnostics)> {
    let source = read_input(input)?;
    let mut resolver = FileResolver::for_input(input);
    let mut diag = Diagnostics::new();
    let deck = decode_deck(
        &source,
        registry,
        &mut resolver,
        &Syntax::default(),
        TokenizeOptions {
            include_policy: policy,
        },
        &mut diag,
    )?;
    Ok((deck, diag))
}

/// SHA-256 fingerprint of rendered deck text.
pub fn sha256_hex(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    let digest = hasher.finalize();
    format!("{digest:02x}")
}
