use serde::Deserialize;
use std::path::{Path, PathBuf};

/// File name looked up under the execution root when no `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = "player-page-sync.toml";

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Execution root; every relative path below resolves against it.
    #[serde(default = "default_root")]
    pub root: PathBuf,
    #[serde(default = "default_audio_dir")]
    pub audio_dir: PathBuf,
    #[serde(default = "default_backup_dir")]
    pub backup_dir: PathBuf,
    #[serde(default = "default_markup_file")]
    pub markup_file: PathBuf,
    /// Optional directory for a daily-rotated log file.
    #[serde(default)]
    pub log_dir: Option<PathBuf>,
    /// Tracing filter used when RUST_LOG is unset. The console report goes to
    /// stdout, so the default keeps info-level records off the terminal.
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Extensions scanned by the cover extractor.
    /// Examples: ["*.mp3", ".flac", "wav"]. Each is tried in lower and upper case.
    #[serde(default = "default_cover_extensions")]
    pub cover_extensions: Vec<String>,
    /// Extensions scanned by the playlist synchronizer.
    #[serde(default = "default_playlist_extensions")]
    pub playlist_extensions: Vec<String>,

    // Markup anchors
    #[serde(default = "default_playlist_variable")]
    pub playlist_variable: String,
    #[serde(default = "default_count_display_target")]
    pub count_display_target: String,
    #[serde(default = "default_entry_indent")]
    pub entry_indent: String,
    #[serde(default = "default_closing_indent")]
    pub closing_indent: String,
}

fn default_root() -> PathBuf { ".".into() }
fn default_audio_dir() -> PathBuf { "audios".into() }
fn default_backup_dir() -> PathBuf { "backups".into() }
fn default_markup_file() -> PathBuf { "index.html".into() }
fn default_log_level() -> String { "warn".into() }
fn default_playlist_variable() -> String { "musicFiles".into() }
fn default_count_display_target() -> String { "this.playlistInfo.textContent".into() }
fn default_entry_indent() -> String { "\t".repeat(6) }
fn default_closing_indent() -> String { "\t".repeat(5) }

fn default_cover_extensions() -> Vec<String> {
    vec!["mp3", "flac", "m4a", "ogg", "wav"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_playlist_extensions() -> Vec<String> {
    vec!["mp3".to_string()]
}

impl Config {
    pub fn from_path(path: &Path) -> anyhow::Result<Self> {
        let s = std::fs::read_to_string(path)?;
        let cfg: Config = toml::from_str(&s)?;
        Ok(cfg)
    }

    /// All-defaults configuration rooted at `root`.
    pub fn for_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            audio_dir: default_audio_dir(),
            backup_dir: default_backup_dir(),
            markup_file: default_markup_file(),
            log_dir: None,
            log_level: default_log_level(),
            cover_extensions: default_cover_extensions(),
            playlist_extensions: default_playlist_extensions(),
            playlist_variable: default_playlist_variable(),
            count_display_target: default_count_display_target(),
            entry_indent: default_entry_indent(),
            closing_indent: default_closing_indent(),
        }
    }

    pub fn audio_path(&self) -> PathBuf {
        self.root.join(&self.audio_dir)
    }

    pub fn backup_path(&self) -> PathBuf {
        self.root.join(&self.backup_dir)
    }

    pub fn markup_path(&self) -> PathBuf {
        self.root.join(&self.markup_file)
    }

    pub fn log_path(&self) -> Option<PathBuf> {
        self.log_dir.as_ref().map(|d| self.root.join(d))
    }

    /// Reject settings that would make a pipeline silently do nothing.
    pub fn validate(&self) -> anyhow::Result<()> {
        if normalized_extensions(&self.cover_extensions).is_empty() {
            anyhow::bail!("cover_extensions must name at least one extension");
        }
        if normalized_extensions(&self.playlist_extensions).is_empty() {
            anyhow::bail!("playlist_extensions must name at least one extension");
        }
        let ident = self.playlist_variable.as_str();
        let valid_ident = !ident.is_empty()
            && !ident.starts_with(|c: char| c.is_ascii_digit())
            && ident.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$');
        if !valid_ident {
            anyhow::bail!("playlist_variable '{}' is not a valid identifier", ident);
        }
        if self.count_display_target.trim().is_empty() {
            anyhow::bail!("count_display_target must not be empty");
        }
        if self.markup_file.file_name().is_none() {
            anyhow::bail!("markup_file '{}' has no file name", self.markup_file.display());
        }
        Ok(())
    }
}

/// Strip the "*." / "." prefixes and drop empty entries.
pub fn normalized_extensions(exts: &[String]) -> Vec<String> {
    exts.iter()
        .filter_map(|pat| {
            let mut p = pat.trim();
            if let Some(stripped) = p.strip_prefix("*.") {
                p = stripped;
            } else if let Some(stripped) = p.strip_prefix('.') {
                p = stripped;
            }
            if p.is_empty() {
                None
            } else {
                Some(p.to_string())
            }
        })
        .collect()
}
