#![allow(dead_code)]

use std::fs;
use std::path::Path;

/// Fake JPEG payload (SOI marker plus filler).
pub const JPEG_BYTES: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F', 0x00, 0x01, 0x02, 0x03];
/// Fake PNG payload (signature plus filler).
pub const PNG_BYTES: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48];

/// A run of MPEG-1 Layer III frames (128 kbps, 44.1 kHz), silence.
pub fn mpeg_frames(count: usize) -> Vec<u8> {
    const FRAME_LEN: usize = 417;
    let mut out = Vec::with_capacity(FRAME_LEN * count);
    for _ in 0..count {
        let mut frame = vec![0u8; FRAME_LEN];
        frame[..4].copy_from_slice(&[0xFF, 0xFB, 0x90, 0x00]);
        out.extend_from_slice(&frame);
    }
    out
}

fn id3v23_frame(id: &[u8; 4], body: &[u8]) -> Vec<u8> {
    let mut f = Vec::new();
    f.extend_from_slice(id);
    f.extend_from_slice(&(body.len() as u32).to_be_bytes());
    f.extend_from_slice(&[0, 0]);
    f.extend_from_slice(body);
    f
}

pub fn apic_frame(mime: &str, description: &str, data: &[u8]) -> Vec<u8> {
    let mut body = vec![0u8]; // latin1
    body.extend_from_slice(mime.as_bytes());
    body.push(0);
    body.push(3); // front cover
    body.extend_from_slice(description.as_bytes());
    body.push(0);
    body.extend_from_slice(data);
    id3v23_frame(b"APIC", &body)
}

pub fn title_frame(title: &str) -> Vec<u8> {
    let mut body = vec![0u8];
    body.extend_from_slice(title.as_bytes());
    id3v23_frame(b"TIT2", &body)
}

fn syncsafe(n: u32) -> [u8; 4] {
    [
        ((n >> 21) & 0x7F) as u8,
        ((n >> 14) & 0x7F) as u8,
        ((n >> 7) & 0x7F) as u8,
        (n & 0x7F) as u8,
    ]
}

/// ID3v2.3 tag wrapping the given frames.
pub fn id3v23_tag(frames: &[Vec<u8>]) -> Vec<u8> {
    let body: Vec<u8> = frames.concat();
    let mut tag = b"ID3".to_vec();
    tag.extend_from_slice(&[3, 0, 0]);
    tag.extend_from_slice(&syncsafe(body.len() as u32));
    tag.extend_from_slice(&body);
    tag
}

/// Write an mp3 file: ID3v2.3 tag with `frames` followed by audio frames.
pub fn write_mp3(path: &Path, frames: &[Vec<u8>]) {
    let mut bytes = id3v23_tag(frames);
    bytes.extend_from_slice(&mpeg_frames(8));
    fs::write(path, bytes).unwrap();
}

/// Write an mp3 file with no tag at all.
pub fn write_untagged_mp3(path: &Path) {
    fs::write(path, mpeg_frames(8)).unwrap();
}

fn flac_block_header(last: bool, block_type: u8, len: usize) -> Vec<u8> {
    let flag = if last { 0x80 } else { 0x00 };
    let len = len as u32;
    vec![flag | block_type, (len >> 16) as u8, (len >> 8) as u8, len as u8]
}

fn flac_streaminfo() -> Vec<u8> {
    let mut b = Vec::with_capacity(34);
    b.extend_from_slice(&4096u16.to_be_bytes());
    b.extend_from_slice(&4096u16.to_be_bytes());
    b.extend_from_slice(&[0, 0, 0]);
    b.extend_from_slice(&[0, 0, 0]);
    let packed: u64 = (44100u64 << 44) | (1u64 << 41) | (15u64 << 36);
    b.extend_from_slice(&packed.to_be_bytes());
    b.extend_from_slice(&[0u8; 16]);
    b
}

fn flac_picture(mime: &str, data: &[u8]) -> Vec<u8> {
    let mut b = Vec::new();
    b.extend_from_slice(&3u32.to_be_bytes());
    b.extend_from_slice(&(mime.len() as u32).to_be_bytes());
    b.extend_from_slice(mime.as_bytes());
    b.extend_from_slice(&0u32.to_be_bytes()); // empty description
    for _ in 0..4 {
        b.extend_from_slice(&0u32.to_be_bytes()); // width, height, depth, colors
    }
    b.extend_from_slice(&(data.len() as u32).to_be_bytes());
    b.extend_from_slice(data);
    b
}

/// Write a FLAC file with STREAMINFO and an optional picture block.
pub fn write_flac(path: &Path, picture: Option<(&str, &[u8])>) {
    let mut bytes = b"fLaC".to_vec();
    let info = flac_streaminfo();
    bytes.extend_from_slice(&flac_block_header(picture.is_none(), 0, info.len()));
    bytes.extend_from_slice(&info);
    if let Some((mime, data)) = picture {
        let pic = flac_picture(mime, data);
        bytes.extend_from_slice(&flac_block_header(true, 6, pic.len()));
        bytes.extend_from_slice(&pic);
    }
    fs::write(path, bytes).unwrap();
}

fn mp4_atom(kind: &[u8; 4], body: &[u8]) -> Vec<u8> {
    let mut a = Vec::with_capacity(8 + body.len());
    a.extend_from_slice(&((8 + body.len()) as u32).to_be_bytes());
    a.extend_from_slice(kind);
    a.extend_from_slice(body);
    a
}

fn mp4_mvhd() -> Vec<u8> {
    let mut b = vec![0u8; 4]; // version + flags
    b.extend_from_slice(&0u32.to_be_bytes()); // creation
    b.extend_from_slice(&0u32.to_be_bytes()); // modification
    b.extend_from_slice(&1000u32.to_be_bytes()); // timescale
    b.extend_from_slice(&0u32.to_be_bytes()); // duration
    b.extend_from_slice(&0x0001_0000u32.to_be_bytes()); // rate
    b.extend_from_slice(&0x0100u16.to_be_bytes()); // volume
    b.extend_from_slice(&[0u8; 10]);
    for v in [0x0001_0000u32, 0, 0, 0, 0x0001_0000, 0, 0, 0, 0x4000_0000] {
        b.extend_from_slice(&v.to_be_bytes());
    }
    b.extend_from_slice(&[0u8; 24]);
    b.extend_from_slice(&2u32.to_be_bytes()); // next track id
    mp4_atom(b"mvhd", &b)
}

/// `data` atom with the given well-known type (1 = UTF-8, 13 = JPEG, 14 = PNG).
fn mp4_data(type_code: u32, payload: &[u8]) -> Vec<u8> {
    let mut b = type_code.to_be_bytes().to_vec();
    b.extend_from_slice(&0u32.to_be_bytes()); // locale
    b.extend_from_slice(payload);
    mp4_atom(b"data", &b)
}

/// Write an .m4a-style file: ftyp, then moov with mvhd and an iTunes ilst
/// holding a title and, optionally, a `covr` picture of the given data type.
pub fn write_m4a(path: &Path, cover: Option<(u32, &[u8])>) {
    let mut ftyp = b"M4A ".to_vec();
    ftyp.extend_from_slice(&0u32.to_be_bytes());
    for brand in [b"M4A ", b"mp42", b"isom"] {
        ftyp.extend_from_slice(brand);
    }

    let mut ilst_body = mp4_atom(&[0xA9, b'n', b'a', b'm'], &mp4_data(1, b"Song"));
    if let Some((type_code, payload)) = cover {
        ilst_body.extend_from_slice(&mp4_atom(b"covr", &mp4_data(type_code, payload)));
    }

    let mut hdlr = vec![0u8; 8]; // version + flags, pre_defined
    hdlr.extend_from_slice(b"mdir");
    hdlr.extend_from_slice(b"appl");
    hdlr.extend_from_slice(&[0u8; 8]);
    hdlr.push(0); // empty name

    let mut meta_body = vec![0u8; 4]; // version + flags
    meta_body.extend_from_slice(&mp4_atom(b"hdlr", &hdlr));
    meta_body.extend_from_slice(&mp4_atom(b"ilst", &ilst_body));

    let udta = mp4_atom(b"udta", &mp4_atom(b"meta", &meta_body));
    let mut moov_body = mp4_mvhd();
    moov_body.extend_from_slice(&udta);

    let mut bytes = mp4_atom(b"ftyp", &ftyp);
    bytes.extend_from_slice(&mp4_atom(b"moov", &moov_body));
    fs::write(path, bytes).unwrap();
}

pub const PAGE: &str = r#"<!DOCTYPE html>
<html>
<body>
	<div id="player"></div>
	<script>
		class Player {
			constructor() {
				const musicFiles = [
						'audios/old-one.mp3',
						'audios/old-two.mp3'
					];
				this.tracks = musicFiles;
			}
			show(index) {
				this.playlistInfo.textContent = `${index + 1} / 2`;
			}
		}
	</script>
</body>
</html>
"#;
