//! File discovery and I/O for kconfigstyle

use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};
use tracing::warn;
use walkdir::WalkDir;

use crate::config::Config;

/// Files found under the given paths, plus paths that do not exist
#[derive(Debug, Default)]
pub struct Discovery {
    pub files: Vec<PathBuf>,
    pub missing: Vec<PathBuf>,
}

/// Whether a file name looks like Kconfig source
///
/// Matches `Kconfig`, `Kconfig.*` (e.g. `Kconfig.projbuild`), `*.Kconfig` and
/// `*.kconfig`.
pub fn is_kconfig_file(path: &Path) -> bool {
    let Some(name) = path.file_name().map(|n| n.to_string_lossy()) else {
        return false;
    };
    name.starts_with("Kconfig")
        || path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("kconfig"))
}

/// Expand `paths` into Kconfig files
///
/// Explicit file arguments are always taken; directories are walked and
/// filtered by name and by the config's exclude patterns. Results are sorted
/// so output does not depend on directory iteration order.
pub fn discover(paths: &[PathBuf], config: &Config) -> Discovery {
    let mut discovery = Discovery::default();

    for path in paths {
        if path.is_file() {
            discovery.files.push(path.clone());
        } else if path.is_dir() {
            let mut found: Vec<PathBuf> = WalkDir::new(path)
                .into_iter()
                .filter_map(|e| e.ok())
                .filter(|e| e.file_type().is_file())
                .map(|e| e.into_path())
                .filter(|p| is_kconfig_file(p) && !config.should_exclude(p))
                .collect();
            found.sort();
            discovery.files.extend(found);
        } else {
            discovery.missing.push(path.clone());
        }
    }

    discovery
}

/// Read a file for linting
///
/// Bytes that are not valid UTF-8 are replaced with U+FFFD so the file is
/// still checked; [`write_file`] refuses to write such files back.
pub fn read_file(path: &PathBuf) -> std::io::Result<String> {
    let bytes = std::fs::read(path)?;
    match String::from_utf8(bytes) {
        Ok(text) => Ok(text),
        Err(err) => {
            warn!(path = %path.display(), "file is not valid UTF-8, checking a lossy copy");
            Ok(String::from_utf8_lossy(err.as_bytes()).into_owned())
        }
    }
}

/// Write the processed result to the file
///
/// Fails without writing when the file on disk is not valid UTF-8, since the
/// fixed text would lose the original bytes.
pub fn write_file(path: &Path, content: &str) -> Result<()> {
    let current = std::fs::read(path)
        .with_context(|| format!("Failed to read file: {}", path.display()))?;
    if std::str::from_utf8(&current).is_err() {
        bail!("File is not valid UTF-8, fixes not written: {}", path.display());
    }
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write file: {}", path.display()))
}
