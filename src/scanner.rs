use crate::config::normalized_extensions;
use crate::models::AudioFileRef;
use std::cmp::Ordering;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;
use walkdir::WalkDir;

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("audio directory does not exist: {0}")]
    MissingDirectory(PathBuf),
    #[error("failed to read directory {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
}

/// How a configured extension is compared with a file's extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtensionMatch {
    /// Literal lowercase pass, then literal uppercase pass; `.Mp3` never matches.
    LowerAndUpper,
    /// One pass, ASCII case ignored.
    AnyCase,
}

/// Ordering applied to a scan result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanOrder {
    /// Extension by extension, lowercase pass before uppercase pass,
    /// names sorted within each pass.
    Enumeration,
    /// Full path compared ASCII-case-insensitively, raw bytes break ties.
    CaseInsensitivePath,
}

/// List the files directly inside `dir` whose extension is one of `extensions`,
/// compared according to `matching`. Files reachable under more than one
/// casing are kept once (first occurrence wins). An empty result is not an error.
pub fn scan_dir(
    dir: &Path,
    extensions: &[String],
    matching: ExtensionMatch,
    order: ScanOrder,
) -> Result<Vec<AudioFileRef>, ScanError> {
    if !dir.is_dir() {
        return Err(ScanError::MissingDirectory(dir.to_path_buf()));
    }

    let mut entries: Vec<PathBuf> = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|source| ScanError::Io { path: dir.to_path_buf(), source })?;
        if entry.file_type().is_file() {
            entries.push(entry.into_path());
        }
    }

    let mut seen: HashSet<String> = HashSet::new();
    let mut out: Vec<AudioFileRef> = Vec::new();
    for ext in normalized_extensions(extensions) {
        let passes = match matching {
            ExtensionMatch::LowerAndUpper => casings(&ext),
            ExtensionMatch::AnyCase => vec![ext.clone()],
        };
        for pass in passes {
            let hits = entries.iter().filter(|p| match matching {
                ExtensionMatch::LowerAndUpper => has_literal_extension(p, &pass),
                ExtensionMatch::AnyCase => has_extension_ignore_case(p, &pass),
            });
            for p in hits {
                let file = AudioFileRef::new(p.clone());
                if seen.insert(file.dedup_key.clone()) {
                    out.push(file);
                }
            }
        }
    }

    if order == ScanOrder::CaseInsensitivePath {
        out.sort_by(|a, b| compare_paths(&a.path, &b.path));
    }

    debug!(dir = %dir.display(), count = out.len(), "scanned directory");
    Ok(out)
}

fn casings(ext: &str) -> Vec<String> {
    let lower = ext.to_ascii_lowercase();
    let upper = ext.to_ascii_uppercase();
    if lower == upper {
        vec![lower]
    } else {
        vec![lower, upper]
    }
}

fn has_literal_extension(path: &Path, ext: &str) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some(ext)
}

fn has_extension_ignore_case(path: &Path, ext: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case(ext))
        .unwrap_or(false)
}

/// Case-insensitive, locale-independent collation used for on-page track order.
pub fn compare_paths(a: &Path, b: &Path) -> Ordering {
    let a = a.to_string_lossy();
    let b = b.to_string_lossy();
    let folded = a
        .bytes()
        .map(|c| c.to_ascii_lowercase())
        .cmp(b.bytes().map(|c| c.to_ascii_lowercase()));
    folded.then_with(|| a.as_bytes().cmp(b.as_bytes()))
}
