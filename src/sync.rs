//! Playlist synchronization: keep the page's track array in step with the
//! audio folder.
//!
//! Sequence per run:
//! 1. snapshot the page into the backup directory (always, before anything else)
//! 2. scan the audio folder (any extension casing, sorted case-insensitively by path)
//! 3. rewrite the playlist array and the count expression in memory
//! 4. write the page back
//!
//! Nothing is rolled back when a later step fails; the snapshot is the
//! recovery path.

use crate::backup::create_backup;
use crate::config::Config;
use crate::markup::{MarkupError, PlaylistDocument};
use crate::models::AudioFileRef;
use crate::scanner::{scan_dir, ExtensionMatch, ScanError, ScanOrder};
use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use std::path::{Component, Path, PathBuf};
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    Updated { count: usize, backup: PathBuf },
    NoAudioFiles { backup: PathBuf },
    MissingAudioDirectory { backup: PathBuf },
    PatternNotFound { backup: PathBuf },
}

impl SyncOutcome {
    pub fn backup(&self) -> &Path {
        match self {
            SyncOutcome::Updated { backup, .. }
            | SyncOutcome::NoAudioFiles { backup }
            | SyncOutcome::MissingAudioDirectory { backup }
            | SyncOutcome::PatternNotFound { backup } => backup,
        }
    }
}

/// Result of a run plus the files it saw, for reporting.
#[derive(Debug)]
pub struct SyncReport {
    pub outcome: SyncOutcome,
    pub files: Vec<AudioFileRef>,
}

pub struct PlaylistSynchronizer {
    cfg: Config,
}

impl PlaylistSynchronizer {
    pub fn new(cfg: &Config) -> Self {
        Self { cfg: cfg.clone() }
    }

    pub fn sync(&self) -> Result<SyncReport> {
        self.sync_at(chrono::Local::now().naive_local())
    }

    /// Run once, stamping the backup with `now`.
    pub fn sync_at(&self, now: NaiveDateTime) -> Result<SyncReport> {
        let markup = self.cfg.markup_path();
        let backup = create_backup(&markup, &self.cfg.backup_path(), now)?;

        let audio_dir = self.cfg.audio_path();
        let scan = scan_dir(
            &audio_dir,
            &self.cfg.playlist_extensions,
            ExtensionMatch::AnyCase,
            ScanOrder::CaseInsensitivePath,
        );
        let files = match scan {
            Ok(f) => f,
            Err(ScanError::MissingDirectory(dir)) => {
                warn!(dir = %dir.display(), "audio directory missing; page left untouched");
                return Ok(SyncReport { outcome: SyncOutcome::MissingAudioDirectory { backup }, files: Vec::new() });
            }
            Err(e) => return Err(e).context("scanning audio directory"),
        };

        if files.is_empty() {
            info!(dir = %audio_dir.display(), "no audio files; page left untouched");
            return Ok(SyncReport { outcome: SyncOutcome::NoAudioFiles { backup }, files });
        }

        let entries: Vec<String> = files.iter().map(|f| self.entry_for(&f.path)).collect();

        let text = std::fs::read_to_string(&markup)
            .with_context(|| format!("reading {}", markup.display()))?;
        let doc = PlaylistDocument::new(&text, &self.cfg).context("compiling page anchors")?;
        if doc.locate_count().is_none() {
            warn!(anchor = %self.cfg.count_display_target, "count display expression not found; only the array is updated");
        }
        let updated = match doc.replace(&entries) {
            Ok(t) => t,
            Err(MarkupError::PatternNotFound(var)) => {
                warn!(variable = %var, page = %markup.display(), "playlist array not found; page left untouched");
                return Ok(SyncReport { outcome: SyncOutcome::PatternNotFound { backup }, files });
            }
            Err(e) => return Err(e).context("rewriting page"),
        };

        std::fs::write(&markup, updated)
            .with_context(|| format!("writing {}", markup.display()))?;
        info!(count = files.len(), page = %markup.display(), "playlist updated");

        Ok(SyncReport { outcome: SyncOutcome::Updated { count: files.len(), backup }, files })
    }

    /// Page-relative URL of an audio file, `/`-separated (e.g. `audios/a.mp3`).
    fn entry_for(&self, path: &Path) -> String {
        let rel = pathdiff::diff_paths(path, &self.cfg.root)
            .unwrap_or_else(|| self.cfg.audio_dir.join(path.file_name().unwrap_or_default()));
        rel.components()
            .filter_map(|c| match c {
                Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
                Component::ParentDir => Some("..".to_string()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("/")
    }
}
