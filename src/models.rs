use std::fmt;
use std::path::{Path, PathBuf};

/// Audio container families recognised by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioFormat {
    /// mp3 / mp2 / mp1
    Mpeg,
    Flac,
    /// m4a / m4b / m4p / mp4
    Mp4,
    Ogg,
    Wav,
}

impl AudioFormat {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "mp3" | "mp2" | "mp1" => Some(AudioFormat::Mpeg),
            "flac" => Some(AudioFormat::Flac),
            "m4a" | "m4b" | "m4p" | "mp4" => Some(AudioFormat::Mp4),
            "ogg" => Some(AudioFormat::Ogg),
            "wav" => Some(AudioFormat::Wav),
            _ => None,
        }
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }
}

/// One audio file found by a scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioFileRef {
    pub path: PathBuf,
    /// Lowercased full path; unique within one scan.
    pub dedup_key: String,
    /// File name without extension.
    pub stem: String,
    pub format: Option<AudioFormat>,
}

impl AudioFileRef {
    pub fn new(path: PathBuf) -> Self {
        let dedup_key = dedup_key(&path);
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let format = AudioFormat::from_path(&path);
        Self { path, dedup_key, stem, format }
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Sibling path `<dir>/<stem>.<ext>` where the cover image is written.
    pub fn cover_path(&self, ext: ImageExt) -> PathBuf {
        let file_name = format!("{}.{}", self.stem, ext.as_str());
        match self.path.parent() {
            Some(dir) => dir.join(file_name),
            None => PathBuf::from(file_name),
        }
    }
}

pub fn dedup_key(path: &Path) -> String {
    path.to_string_lossy().to_lowercase()
}

/// File extension given to an extracted cover image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageExt {
    Jpg,
    Png,
    Gif,
}

impl ImageExt {
    /// jpeg/jpg -> jpg, png -> png, gif -> gif, anything else -> jpg.
    pub fn from_mime(mime: Option<&str>) -> Self {
        match mime.map(|m| m.trim().to_ascii_lowercase()).as_deref() {
            Some("image/png") => ImageExt::Png,
            Some("image/gif") => ImageExt::Gif,
            _ => ImageExt::Jpg,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ImageExt::Jpg => "jpg",
            ImageExt::Png => "png",
            ImageExt::Gif => "gif",
        }
    }
}

impl fmt::Display for ImageExt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Image payload pulled out of a container.
#[derive(Debug, Clone)]
pub struct EmbeddedPicture {
    pub data: Vec<u8>,
    pub mime: Option<String>,
    /// Set when the container forces the output extension regardless of mime.
    pub forced_ext: Option<ImageExt>,
}

impl EmbeddedPicture {
    pub fn extension(&self) -> ImageExt {
        self.forced_ext
            .unwrap_or_else(|| ImageExt::from_mime(self.mime.as_deref()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mime_maps_to_extension() {
        assert_eq!(ImageExt::from_mime(Some("image/jpeg")), ImageExt::Jpg);
        assert_eq!(ImageExt::from_mime(Some("image/jpg")), ImageExt::Jpg);
        assert_eq!(ImageExt::from_mime(Some("image/png")), ImageExt::Png);
        assert_eq!(ImageExt::from_mime(Some("image/gif")), ImageExt::Gif);
        assert_eq!(ImageExt::from_mime(Some("image/webp")), ImageExt::Jpg);
        assert_eq!(ImageExt::from_mime(None), ImageExt::Jpg);
    }

    #[test]
    fn format_by_extension_ignores_case() {
        assert_eq!(AudioFormat::from_path(Path::new("a/B.MP2")), Some(AudioFormat::Mpeg));
        assert_eq!(AudioFormat::from_path(Path::new("x.M4b")), Some(AudioFormat::Mp4));
        assert_eq!(AudioFormat::from_path(Path::new("x.wav")), Some(AudioFormat::Wav));
        assert_eq!(AudioFormat::from_path(Path::new("x.txt")), None);
    }

    #[test]
    fn cover_path_is_sibling_with_same_stem() {
        let r = AudioFileRef::new(PathBuf::from("/music/audios/Song One.mp3"));
        assert_eq!(r.stem, "Song One");
        assert_eq!(r.cover_path(ImageExt::Png), PathBuf::from("/music/audios/Song One.png"));
        assert_eq!(r.dedup_key, "/music/audios/song one.mp3");
    }

    #[test]
    fn forced_extension_wins_over_mime() {
        let pic = EmbeddedPicture { data: vec![1], mime: Some("image/png".into()), forced_ext: Some(ImageExt::Jpg) };
        assert_eq!(pic.extension(), ImageExt::Jpg);
    }
}
