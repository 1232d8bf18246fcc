//! Embedded cover art extraction.
//!
//! Each audio file is dispatched on its container family to one routine that
//! returns the first embedded picture, which is then written next to the audio
//! file as `<stem>.<ext>`.

use crate::config::Config;
use crate::models::{AudioFileRef, AudioFormat, EmbeddedPicture, ImageExt};
use crate::scanner::{scan_dir, ExtensionMatch, ScanError, ScanOrder};
use anyhow::{Context, Result};
use lofty::config::ParseOptions;
use lofty::file::AudioFile;
use lofty::flac::FlacFile;
use lofty::mp4::{AtomData, AtomIdent, Mp4File};
use lofty::mpeg::MpegFile;
use lofty::ogg::OggPictureStorage;
use lofty::tag::Tag;
use std::fmt;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Result of looking inside one container.
#[derive(Debug)]
pub enum PictureLookup {
    Found(EmbeddedPicture),
    NoTags,
    NoPicture,
}

/// Container families that have an extraction routine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerKind {
    Mpeg,
    Flac,
    Mp4,
    /// Recognised audio (ogg, wav) or unknown files without a routine.
    Unsupported,
}

impl ContainerKind {
    pub fn for_format(format: Option<AudioFormat>) -> Self {
        match format {
            Some(AudioFormat::Mpeg) => ContainerKind::Mpeg,
            Some(AudioFormat::Flac) => ContainerKind::Flac,
            Some(AudioFormat::Mp4) => ContainerKind::Mp4,
            Some(AudioFormat::Ogg) | Some(AudioFormat::Wav) | None => ContainerKind::Unsupported,
        }
    }

    /// Read the container at `path` and return its first embedded picture.
    /// Returns `None` for kinds without a routine.
    pub fn lookup(self, path: &Path) -> Option<Result<PictureLookup>> {
        match self {
            ContainerKind::Mpeg => Some(lookup_mpeg(path)),
            ContainerKind::Flac => Some(lookup_flac(path)),
            ContainerKind::Mp4 => Some(lookup_mp4(path)),
            ContainerKind::Unsupported => None,
        }
    }
}

fn parse_options() -> ParseOptions {
    // Only tags are needed; skip audio property decoding.
    ParseOptions::new().read_properties(false)
}

fn lookup_mpeg(path: &Path) -> Result<PictureLookup> {
    let mut file = File::open(path)?;
    let mpeg = MpegFile::read_from(&mut file, parse_options())?;

    let id3v2 = match mpeg.id3v2() {
        Some(t) => t,
        None => return Ok(PictureLookup::NoTags),
    };

    // APIC/PIC frames keep their container order in the generic tag.
    let tag: Tag = id3v2.clone().into();
    let picture = match tag.pictures().first() {
        Some(p) => p,
        None => return Ok(PictureLookup::NoPicture),
    };

    Ok(PictureLookup::Found(EmbeddedPicture {
        data: picture.data().to_vec(),
        mime: picture.mime_type().map(|m| m.as_str().to_string()),
        forced_ext: None,
    }))
}

fn lookup_flac(path: &Path) -> Result<PictureLookup> {
    let mut file = File::open(path)?;
    let flac = FlacFile::read_from(&mut file, parse_options())?;

    let (picture, _info) = match flac.pictures().first() {
        Some(p) => p,
        None => return Ok(PictureLookup::NoPicture),
    };

    Ok(PictureLookup::Found(EmbeddedPicture {
        data: picture.data().to_vec(),
        mime: picture.mime_type().map(|m| m.as_str().to_string()),
        forced_ext: None,
    }))
}

fn lookup_mp4(path: &Path) -> Result<PictureLookup> {
    let mut file = File::open(path)?;
    let mp4 = Mp4File::read_from(&mut file, parse_options())?;

    let covr = AtomIdent::Fourcc(*b"covr");
    let picture = mp4
        .ilst()
        .and_then(|ilst| ilst.get(&covr))
        .and_then(|atom| {
            atom.data().find_map(|d| match d {
                AtomData::Picture(p) => Some(p),
                _ => None,
            })
        });

    let picture = match picture {
        Some(p) => p,
        None => return Ok(PictureLookup::NoPicture),
    };

    // MP4 covers are always written as .jpg, whatever the payload encoding.
    Ok(PictureLookup::Found(EmbeddedPicture {
        data: picture.data().to_vec(),
        mime: picture.mime_type().map(|m| m.as_str().to_string()),
        forced_ext: Some(ImageExt::Jpg),
    }))
}

/// Per-file extraction result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoverOutcome {
    Extracted { output: PathBuf },
    NoTags,
    NoEmbeddedPicture,
    UnsupportedFormat,
    ExtractionError(String),
}

impl CoverOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, CoverOutcome::Extracted { .. })
    }
}

impl fmt::Display for CoverOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoverOutcome::Extracted { output } => {
                let name = output.file_name().map(|s| s.to_string_lossy()).unwrap_or_default();
                write!(f, "-> {}", name)
            }
            CoverOutcome::NoTags => f.write_str("no tags"),
            CoverOutcome::NoEmbeddedPicture => f.write_str("no embedded picture"),
            CoverOutcome::UnsupportedFormat => f.write_str("unsupported format"),
            CoverOutcome::ExtractionError(reason) => write!(f, "extraction failed: {}", reason),
        }
    }
}

/// Extract the cover of one audio file. Never fails: every problem is
/// classified into the returned outcome.
pub fn extract_cover(file: &AudioFileRef) -> CoverOutcome {
    let kind = ContainerKind::for_format(file.format);
    let lookup = match kind.lookup(&file.path) {
        Some(res) => res,
        None => return CoverOutcome::UnsupportedFormat,
    };

    let picture = match lookup {
        Ok(PictureLookup::Found(p)) => p,
        Ok(PictureLookup::NoTags) => return CoverOutcome::NoTags,
        Ok(PictureLookup::NoPicture) => return CoverOutcome::NoEmbeddedPicture,
        Err(e) => return CoverOutcome::ExtractionError(format!("{:#}", e)),
    };

    let output = file.cover_path(picture.extension());
    match write_cover(&output, &picture.data) {
        Ok(()) => CoverOutcome::Extracted { output },
        Err(e) => CoverOutcome::ExtractionError(format!("{:#}", e)),
    }
}

fn write_cover(output: &Path, data: &[u8]) -> Result<()> {
    std::fs::write(output, data).with_context(|| format!("writing {}", output.display()))
}

/// Outcome of a full extraction pass.
#[derive(Debug, Default)]
pub struct CoverReport {
    pub entries: Vec<(AudioFileRef, CoverOutcome)>,
}

impl CoverReport {
    pub fn succeeded(&self) -> usize {
        self.entries.iter().filter(|(_, o)| o.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.entries.len() - self.succeeded()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Batch extractor over the configured audio directory.
pub struct CoverExtractor {
    audio_dir: PathBuf,
    extensions: Vec<String>,
}

impl CoverExtractor {
    pub fn new(cfg: &Config) -> Self {
        Self { audio_dir: cfg.audio_path(), extensions: cfg.cover_extensions.clone() }
    }

    /// Scan the audio directory and extract every cover, continuing past
    /// per-file failures. `on_file` is called after each file is processed.
    pub fn run_with<F>(&self, mut on_file: F) -> Result<CoverReport, ScanError>
    where
        F: FnMut(&AudioFileRef, &CoverOutcome),
    {
        let files = scan_dir(&self.audio_dir, &self.extensions, ExtensionMatch::LowerAndUpper, ScanOrder::Enumeration)?;
        info!(count = files.len(), dir = %self.audio_dir.display(), "extracting covers");

        let mut report = CoverReport::default();
        for file in files {
            let outcome = extract_cover(&file);
            match &outcome {
                CoverOutcome::Extracted { output } => {
                    debug!(file = %file.path.display(), output = %output.display(), "cover written")
                }
                other => warn!(file = %file.path.display(), reason = %other, "no cover extracted"),
            }
            on_file(&file, &outcome);
            report.entries.push((file, outcome));
        }

        info!(succeeded = report.succeeded(), failed = report.failed(), "cover extraction finished");
        Ok(report)
    }

    pub fn run(&self) -> Result<CoverReport, ScanError> {
        self.run_with(|_, _| {})
    }
}
