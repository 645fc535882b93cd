#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::process;

pub const TAG_IMAGE_WIDTH: u16 = 256;
pub const TAG_IMAGE_LENGTH: u16 = 257;
pub const TAG_BITS_PER_SAMPLE: u16 = 258;
pub const TAG_COMPRESSION: u16 = 259;
pub const TAG_X_RESOLUTION: u16 = 282;
pub const TAG_Y_RESOLUTION: u16 = 283;
pub const TAG_RESOLUTION_UNIT: u16 = 296;

const SHORT: u16 = 3;
const LONG: u16 = 4;
const RATIONAL: u16 = 5;
pub const UNDEFINED: u16 = 7;

/// Builds a TIFF structure with a single IFD.
pub struct TiffBuilder {
    big_endian: bool,
    entries: Vec<(u16, u16, u32, Vec<u8>)>,
}

impl TiffBuilder {
    pub fn little() -> TiffBuilder {
        TiffBuilder { big_endian: false, entries: Vec::new() }
    }

    pub fn big() -> TiffBuilder {
        TiffBuilder { big_endian: true, entries: Vec::new() }
    }

    fn u16_bytes(&self, n: u16) -> [u8; 2] {
        if self.big_endian { n.to_be_bytes() } else { n.to_le_bytes() }
    }

    fn u32_bytes(&self, n: u32) -> [u8; 4] {
        if self.big_endian { n.to_be_bytes() } else { n.to_le_bytes() }
    }

    pub fn short(mut self, tag: u16, values: &[u16]) -> TiffBuilder {
        let data = values.iter().flat_map(|&v| self.u16_bytes(v)).collect();
        self.entries.push((tag, SHORT, values.len() as u32, data));
        self
    }

    pub fn long(mut self, tag: u16, values: &[u32]) -> TiffBuilder {
        let data = values.iter().flat_map(|&v| self.u32_bytes(v)).collect();
        self.entries.push((tag, LONG, values.len() as u32, data));
        self
    }

    pub fn rational(mut self, tag: u16, values: &[(u32, u32)]) -> TiffBuilder {
        let data = values.iter()
            .flat_map(|&(n, d)| {
                let mut v = self.u32_bytes(n).to_vec();
                v.extend_from_slice(&self.u32_bytes(d));
                v
            })
            .collect();
        self.entries.push((tag, RATIONAL, values.len() as u32, data));
        self
    }

    /// An entry whose value offset is given as is instead of being laid out by the builder.
    pub fn pointer(mut self, tag: u16, field_type: u16, count: u32, offset: u32) -> TiffBuilder {
        let data = self.u32_bytes(offset).to_vec();
        self.entries.push((tag, field_type, count, data));
        self
    }

    /// A baseline RGB image description with the given size.
    pub fn image(self, width: u32, height: u32) -> TiffBuilder {
        self.long(TAG_IMAGE_WIDTH, &[width])
            .long(TAG_IMAGE_LENGTH, &[height])
            .short(TAG_COMPRESSION, &[1])
    }

    pub fn build(&self) -> Vec<u8> {
        let mut entries: Vec<_> = self.entries.iter().collect();
        entries.sort_by_key(|e| e.0);

        let mut out = if self.big_endian { b"MM".to_vec() } else { b"II".to_vec() };
        out.extend_from_slice(&self.u16_bytes(42));
        out.extend_from_slice(&self.u32_bytes(8));

        let ifd_size = 2 + 12 * entries.len() + 4;
        let mut data_area = Vec::new();
        out.extend_from_slice(&self.u16_bytes(entries.len() as u16));
        for &&(tag, field_type, count, ref data) in &entries {
            out.extend_from_slice(&self.u16_bytes(tag));
            out.extend_from_slice(&self.u16_bytes(field_type));
            out.extend_from_slice(&self.u32_bytes(count));
            if data.len() <= 4 {
                let mut inline = data.clone();
                inline.resize(4, 0);
                out.extend_from_slice(&inline);
            } else {
                let offset = 8 + ifd_size + data_area.len();
                out.extend_from_slice(&self.u32_bytes(offset as u32));
                data_area.extend_from_slice(data);
                if data_area.len() % 2 == 1 {
                    data_area.push(0);
                }
            }
        }
        out.extend_from_slice(&self.u32_bytes(0));
        out.extend_from_slice(&data_area);
        out
    }
}

/// An EXIF `APP1` payload with resolution tags.
pub fn exif_payload(x: (u32, u32), y: (u32, u32), unit: u16) -> Vec<u8> {
    let tiff = TiffBuilder::big()
        .rational(TAG_X_RESOLUTION, &[x])
        .rational(TAG_Y_RESOLUTION, &[y])
        .short(TAG_RESOLUTION_UNIT, &[unit])
        .build();
    let mut payload = b"Exif\0\0".to_vec();
    payload.extend_from_slice(&tiff);
    payload
}

fn segment(out: &mut Vec<u8>, marker: u8, payload: &[u8]) {
    out.extend_from_slice(&[0xff, marker]);
    out.extend_from_slice(&((payload.len() + 2) as u16).to_be_bytes());
    out.extend_from_slice(payload);
}

/// A JFIF stream with an optional `APP1` payload and a baseline frame header.
pub fn jpeg(width: u16, height: u16, app1: Option<&[u8]>) -> Vec<u8> {
    let mut out = vec![0xff, 0xd8];
    segment(&mut out, 0xe0, b"JFIF\0\x01\x01\x00\x00\x01\x00\x01\x00\x00");
    if let Some(payload) = app1 {
        segment(&mut out, 0xe1, payload);
    }
    segment(&mut out, 0xdb, &[0u8; 65]);

    let mut sof = vec![8];
    sof.extend_from_slice(&height.to_be_bytes());
    sof.extend_from_slice(&width.to_be_bytes());
    sof.extend_from_slice(&[3, 1, 0x22, 0, 2, 0x11, 1, 3, 0x11, 1]);
    segment(&mut out, 0xc0, &sof);

    segment(&mut out, 0xda, &[3, 1, 0, 2, 0x11, 3, 0x11, 0, 0x3f, 0]);
    out.extend_from_slice(&[0x12, 0x34, 0x56, 0xff, 0x00, 0x78]);
    out.extend_from_slice(&[0xff, 0xd9]);
    out
}

pub fn png(width: u32, height: u32) -> Vec<u8> {
    let mut out = b"\x89PNG\r\n\x1a\n".to_vec();
    out.extend_from_slice(&13u32.to_be_bytes());
    out.extend_from_slice(b"IHDR");
    out.extend_from_slice(&width.to_be_bytes());
    out.extend_from_slice(&height.to_be_bytes());
    out.extend_from_slice(&[8, 2, 0, 0, 0]);
    out.extend_from_slice(&[0; 4]);
    out.extend_from_slice(&0u32.to_be_bytes());
    out.extend_from_slice(b"IEND");
    out.extend_from_slice(&[0xae, 0x42, 0x60, 0x82]);
    out
}

pub fn gif(width: u16, height: u16) -> Vec<u8> {
    let mut out = b"GIF89a".to_vec();
    out.extend_from_slice(&width.to_le_bytes());
    out.extend_from_slice(&height.to_le_bytes());
    out.extend_from_slice(&[0x80, 0, 0]);
    out.extend_from_slice(&[0, 0, 0, 0xff, 0xff, 0xff]);
    // graphic control extension
    out.extend_from_slice(&[0x21, 0xf9, 4, 0, 10, 0, 0, 0]);
    out.push(0x2c);
    out.extend_from_slice(&[0, 0, 0, 0]);
    out.extend_from_slice(&width.to_le_bytes());
    out.extend_from_slice(&height.to_le_bytes());
    out.push(0);
    out.extend_from_slice(&[2, 2, 0x44, 0x01, 0]);
    out.push(0x3b);
    out
}

pub fn bmp(width: i32, height: i32) -> Vec<u8> {
    let mut out = b"BM".to_vec();
    out.extend_from_slice(&0u32.to_le_bytes());
    out.extend_from_slice(&0u32.to_le_bytes());
    out.extend_from_slice(&54u32.to_le_bytes());
    out.extend_from_slice(&40u32.to_le_bytes());
    out.extend_from_slice(&width.to_le_bytes());
    out.extend_from_slice(&height.to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes());
    out.extend_from_slice(&24u16.to_le_bytes());
    out.extend_from_slice(&[0; 24]);
    out
}

pub fn pcx(width: u16, height: u16) -> Vec<u8> {
    let mut out = vec![0x0a, 5, 1, 8];
    for n in &[0, 0, width - 1, height - 1, 72, 72] {
        out.extend_from_slice(&n.to_le_bytes());
    }
    out.extend_from_slice(&[0; 49]);
    out.push(3);
    out.extend_from_slice(&width.to_le_bytes());
    out.extend_from_slice(&[0; 60]);
    out
}

/// A fresh directory under the system temp dir, removed on drop.
pub struct TempDir(PathBuf);

impl TempDir {
    pub fn new(name: &str) -> TempDir {
        let path = std::env::temp_dir().join(format!("imscan-{}-{}", name, process::id()));
        let _ = fs::remove_dir_all(&path);
        fs::create_dir_all(&path).unwrap();
        TempDir(path)
    }

    pub fn path(&self) -> &Path {
        &self.0
    }

    pub fn write(&self, name: &str, data: &[u8]) -> PathBuf {
        let path = self.0.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, data).unwrap();
        path
    }
}

impl Drop for TempDir {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.0);
    }
}
