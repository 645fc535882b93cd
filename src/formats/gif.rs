//! Metadata of GIF images.

use std::fmt;
use std::io::BufRead;

use byteorder::{LittleEndian, ReadBytesExt};

use crate::traits::LoadableMetadata;
use crate::types::{Dimensions, Error, Result};
use crate::utils::BufReadExt;

const IMAGE_SEPARATOR: u8 = 0x2c;
const EXTENSION_INTRODUCER: u8 = 0x21;
const TRAILER: u8 = 0x3b;

/// GIF file version number.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Version {
    V87a,
    V89a,
}

impl Version {
    fn from_bytes(b: &[u8]) -> Option<Version> {
        match b {
            b"87a" => Some(Version::V87a),
            b"89a" => Some(Version::V89a),
            _ => None,
        }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match *self {
            Version::V87a => "87a",
            Version::V89a => "89a",
        })
    }
}

/// Contains information about a color table (global or local).
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct ColorTable {
    /// Color table size, between 2 and 256.
    pub size: u16,
    /// Whether the color table is sorted in order of decreasing importance.
    pub sorted: bool,
}

impl ColorTable {
    fn from_flags(present: bool, sorted: bool, size_p: u8) -> Option<ColorTable> {
        if present {
            Some(ColorTable { size: 1u16 << (size_p + 1), sorted })
        } else {
            None
        }
    }

    fn skip<R: ?Sized + BufRead>(&self, r: &mut R, what: &str) -> Result<()> {
        let skip_size = self.size as u64 * 3;
        if r.skip_exact(skip_size)? != skip_size {
            return Err(unexpected_eof!("when reading {} color table", what));
        }
        Ok(())
    }
}

/// Skips a sequence of data sub-blocks up to and including the block terminator.
fn skip_blocks<R: ?Sized + BufRead>(r: &mut R, index: usize) -> Result<()> {
    loop {
        let n = try_if_eof!(r.read_u8(), "when reading data of block {}", index) as u64;
        if n == 0 {
            return Ok(());
        }
        if r.skip_exact(n)? != n {
            return Err(unexpected_eof!("when reading data of block {}", index));
        }
    }
}

/// Reads one block; returns `false` at the trailer.
fn read_block<R: ?Sized + BufRead>(index: usize, r: &mut R, frames: &mut Vec<Frame>) -> Result<bool> {
    let separator = try_if_eof!(r.read_u8(), "when reading separator of block {}", index);
    match separator {
        IMAGE_SEPARATOR => {
            let frame = Frame::load(index, r)?;
            let skipped = frame.skip_data(index, r);
            frames.push(frame);
            skipped?;
        }
        EXTENSION_INTRODUCER => {
            let _label = try_if_eof!(r.read_u8(), "when reading label of block {}", index);
            skip_blocks(r, index)?;
        }
        TRAILER => return Ok(false),
        _ => return Err(invalid_format!("unknown block type of block {}: 0x{:X}", index, separator)),
    }
    Ok(true)
}

/// Metadata of a single frame.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Frame {
    pub left: u16,
    pub top: u16,
    pub dimensions: Dimensions,
    pub local_color_table: Option<ColorTable>,
    pub interlace: bool,
}

impl Frame {
    /// Reads an image descriptor, leaving the reader at the local color table.
    fn load<R: ?Sized + BufRead>(index: usize, r: &mut R) -> Result<Frame> {
        let left = try_if_eof!(r.read_u16::<LittleEndian>(), "when reading left offset of block {}", index);
        let top = try_if_eof!(r.read_u16::<LittleEndian>(), "when reading top offset of block {}", index);
        let width = try_if_eof!(r.read_u16::<LittleEndian>(), "when reading width of block {}", index);
        let height = try_if_eof!(r.read_u16::<LittleEndian>(), "when reading height of block {}", index);

        let packed_flags = try_if_eof!(r.read_u8(), "when reading flags of block {}", index);
        let local_color_table = ColorTable::from_flags(
            (0b1000_0000 & packed_flags) > 0,
            (0b0010_0000 & packed_flags) > 0,
            0b0000_0111 & packed_flags,
        );
        let interlace = (0b0100_0000 & packed_flags) > 0;

        Ok(Frame {
            left,
            top,
            dimensions: (width, height).into(),
            local_color_table,
            interlace,
        })
    }

    /// Skips the local color table and the image data that follow the descriptor.
    fn skip_data<R: ?Sized + BufRead>(&self, index: usize, r: &mut R) -> Result<()> {
        if let Some(ref table) = self.local_color_table {
            table.skip(r, "local")?;
        }
        let _ = try_if_eof!(r.read_u8(), "when reading LZW minimum code size of block {}", index);
        skip_blocks(r, index)
    }
}

/// Contains metadata about the whole GIF image.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Metadata {
    /// GIF format version from the file header.
    pub version: Version,
    /// Logical screen dimensions of the image.
    pub dimensions: Dimensions,
    pub global_color_table: Option<ColorTable>,
    /// Number of colors available to the original image (not the number of bits).
    pub color_resolution: u16,
    pub background_color_index: u8,
    /// Raw pixel aspect ratio byte; zero means no information.
    pub pixel_aspect_ratio: u8,
    pub frames: Vec<Frame>,
}

impl Metadata {
    #[inline]
    pub fn pixel_aspect_ratio_approx(&self) -> Option<f64> {
        if self.pixel_aspect_ratio == 0 {
            None
        } else {
            Some((self.pixel_aspect_ratio as f64 + 15.0) / 64.0)
        }
    }

    #[inline]
    pub fn is_animated(&self) -> bool {
        self.frames.len() > 1
    }
}

impl LoadableMetadata for Metadata {
    fn load<R: ?Sized + BufRead>(r: &mut R) -> Result<Metadata> {
        let mut signature = [0u8; 6];
        try_if_eof!(r.read_exact(&mut signature), "when reading GIF signature");
        if &signature[..3] != b"GIF" {
            return Err(invalid_format!("invalid GIF signature: {:?}", signature));
        }

        let version = Version::from_bytes(&signature[3..])
            .ok_or_else(|| invalid_format!("invalid GIF version: {:?}", &signature[3..]))?;

        let width = try_if_eof!(r.read_u16::<LittleEndian>(), "when reading logical width");
        let height = try_if_eof!(r.read_u16::<LittleEndian>(), "when reading logical height");

        let packed_flags = try_if_eof!(r.read_u8(), "when reading global flags");
        let global_color_table = ColorTable::from_flags(
            (packed_flags & 0b1000_0000) > 0,
            (packed_flags & 0b0000_1000) > 0,
            packed_flags & 0b0000_0111,
        );
        let color_resolution = (packed_flags & 0b0111_0000) >> 4;

        let background_color_index = try_if_eof!(r.read_u8(), "when reading background color index");
        let pixel_aspect_ratio = try_if_eof!(r.read_u8(), "when reading pixel aspect ratio");

        if let Some(ref table) = global_color_table {
            table.skip(r, "global")?;
        }

        let mut frames = Vec::new();
        let mut index = 0usize;
        loop {
            match read_block(index, r, &mut frames) {
                Ok(true) => index += 1,
                Ok(false) => break,
                // the image is usable once its first descriptor is known
                Err(Error::UnexpectedEndOfFile(ref what)) if !frames.is_empty() => {
                    debug!("GIF stream ends early ({:?}), keeping {} frames", what, frames.len());
                    break;
                }
                Err(e) => return Err(e),
            }
        }

        if frames.is_empty() {
            return Err(invalid_format!("GIF image contains no frames"));
        }

        Ok(Metadata {
            version,
            dimensions: (width, height).into(),
            global_color_table,
            color_resolution: 1u16 << (color_resolution + 1),
            background_color_index,
            pixel_aspect_ratio,
            frames,
        })
    }
}
