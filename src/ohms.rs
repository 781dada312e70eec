use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use xmltree::Element;

use crate::pbcore::derived_path;

/// Where the OHMS companion for `infile` would live: same directory, last
/// extension replaced by `_ohms.xml`.
pub fn companion_path(infile: &Path) -> PathBuf {
    derived_path(infile, "_ohms.xml")
}

/// Loads the companion OHMS document next to `infile`, if there is one.
///
/// A missing companion is the common case and returns `Ok(None)`. A companion
/// that exists but does not parse is a fatal error: embedding half a document
/// is worse than failing the run.
pub fn load_companion(infile: &Path) -> Result<Option<Element>> {
    let path = companion_path(infile);
    if !path.is_file() {
        log::debug!("no OHMS companion at {}", path.display());
        return Ok(None);
    }

    log::info!("embedding OHMS companion {}", path.display());
    let file = File::open(&path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    let root = Element::parse(BufReader::new(file))
        .with_context(|| format!("{} is not well-formed XML", path.display()))?;
    Ok(Some(root))
}
