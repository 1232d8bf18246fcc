use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use std::path::{Path, PathBuf};
use tracing::info;

pub const TIMESTAMP_FORMAT: &str = "%Y%m%d-%H%M%S";

fn backup_prefix(markup: &Path) -> String {
    let name = markup
        .file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    format!("{}.backup.", name)
}

/// Copy `markup` byte-for-byte into `backup_dir` as
/// `<markup-filename>.backup.<YYYYMMDD-HHMMSS>`, creating the directory first.
/// A second snapshot within the same second gets a `-N` suffix.
pub fn create_backup(markup: &Path, backup_dir: &Path, now: NaiveDateTime) -> Result<PathBuf> {
    std::fs::create_dir_all(backup_dir)
        .with_context(|| format!("creating backup directory {}", backup_dir.display()))?;

    let base = format!("{}{}", backup_prefix(markup), now.format(TIMESTAMP_FORMAT));
    let mut target = backup_dir.join(&base);
    let mut n = 1;
    while target.exists() {
        target = backup_dir.join(format!("{}-{}", base, n));
        n += 1;
    }

    std::fs::copy(markup, &target)
        .with_context(|| format!("copying {} to {}", markup.display(), target.display()))?;
    info!(backup = %target.display(), "backup created");
    Ok(target)
}

/// Existing snapshots of `markup` in `backup_dir`, oldest first.
/// A missing backup directory yields an empty list.
pub fn list_backups(markup: &Path, backup_dir: &Path) -> Result<Vec<PathBuf>> {
    if !backup_dir.is_dir() {
        return Ok(Vec::new());
    }
    let prefix = backup_prefix(markup);
    let mut out: Vec<PathBuf> = Vec::new();
    for e in std::fs::read_dir(backup_dir)
        .with_context(|| format!("reading {}", backup_dir.display()))?
    {
        let p = e?.path();
        let matches = p
            .file_name()
            .and_then(|s| s.to_str())
            .map(|s| s.starts_with(&prefix))
            .unwrap_or(false);
        if matches && p.is_file() {
            out.push(p);
        }
    }
    out.sort_by_key(|p| {
        let name = p.file_name().map(|s| s.to_string_lossy().into_owned()).unwrap_or_default();
        snapshot_order(&name[prefix.len()..])
    });
    Ok(out)
}

/// Sort key for the part of a snapshot name after the prefix: the fixed-width
/// timestamp, then the numeric collision suffix (none sorts first).
fn snapshot_order(stamp: &str) -> (String, u32) {
    let ts_len = "YYYYMMDD-HHMMSS".len();
    if stamp.len() <= ts_len || !stamp.is_char_boundary(ts_len) {
        return (stamp.to_string(), 0);
    }
    let (ts, rest) = stamp.split_at(ts_len);
    let n = rest
        .strip_prefix('-')
        .and_then(|n| n.parse::<u32>().ok())
        .unwrap_or(u32::MAX);
    (ts.to_string(), n)
}
