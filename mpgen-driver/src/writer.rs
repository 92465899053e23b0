//! Output writing with overwrite protection
//!
//! Both artifacts are written together or not at all: each is staged in a
//! temporary file next to its target and only moved into place once every
//! artifact has been staged.

use log::{debug, warn};
use mpgen_codegen::GeneratedModule;
use mpgen_common::GenError;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

#[derive(Debug, PartialEq)]
pub enum WriteOutcome {
    /// Every artifact was written, in this order
    Written(Vec<PathBuf>),
    /// Nothing was written because these files already exist
    Skipped { existing: Vec<PathBuf> },
}

/// Write the generated source and symbol table into `dir`
pub fn write_artifacts(
    generated: &GeneratedModule,
    dir: &Path,
    force: bool,
) -> Result<WriteOutcome, GenError> {
    let artifacts = [
        (dir.join(&generated.source_file), &generated.source),
        (dir.join(&generated.symbol_file), &generated.symbols),
    ];

    let existing: Vec<PathBuf> = artifacts
        .iter()
        .map(|(path, _)| path.clone())
        .filter(|path| path.exists())
        .collect();
    if !existing.is_empty() {
        if !force {
            return Ok(WriteOutcome::Skipped { existing });
        }
        warn!("Overwriting {} existing file(s)", existing.len());
    }

    fs::create_dir_all(dir)?;

    let mut staged = Vec::new();
    for (path, contents) in artifacts {
        debug!("Staging {} ({} bytes)", path.display(), contents.len());
        let mut file = NamedTempFile::new_in(dir)?;
        file.write_all(contents.as_bytes())?;
        staged.push((path, file));
    }

    let mut written: Vec<PathBuf> = Vec::new();
    for (path, file) in staged {
        if let Err(err) = file.persist(&path) {
            roll_back(&written);
            return Err(err.error.into());
        }
        written.push(path);
    }
    Ok(WriteOutcome::Written(written))
}

/// Remove artifacts already moved into place by a failed write
fn roll_back(written: &[PathBuf]) {
    for path in written {
        debug!("Removing {}", path.display());
        if let Err(err) = fs::remove_file(path) {
            warn!("Could not remove {}: {}", path.display(), err);
        }
    }
}
