//! Metadata of Windows bitmap (BMP) images.

use std::fmt;
use std::io::BufRead;

use byteorder::{LittleEndian, ReadBytesExt};

use crate::traits::LoadableMetadata;
use crate::types::{Dimensions, Result};
use crate::utils::BufReadExt;

const CORE_HEADER_SIZE: u32 = 12;
const INFO_HEADER_SIZE: u32 = 40;

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Compression {
    Rgb,
    Rle8,
    Rle4,
    Bitfields,
    Jpeg,
    Png,
    Unknown(u32),
}

impl Compression {
    fn from_u32(n: u32) -> Compression {
        match n {
            0 => Compression::Rgb,
            1 => Compression::Rle8,
            2 => Compression::Rle4,
            3 | 6 => Compression::Bitfields,
            4 => Compression::Jpeg,
            5 => Compression::Png,
            n => Compression::Unknown(n),
        }
    }
}

impl fmt::Display for Compression {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Compression::Rgb => f.write_str("none"),
            Compression::Rle8 => f.write_str("RLE8"),
            Compression::Rle4 => f.write_str("RLE4"),
            Compression::Bitfields => f.write_str("bitfields"),
            Compression::Jpeg => f.write_str("JPEG"),
            Compression::Png => f.write_str("PNG"),
            Compression::Unknown(n) => write!(f, "unknown ({})", n),
        }
    }
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Metadata {
    pub dimensions: Dimensions,
    /// Rows are stored top to bottom (negative height in the header).
    pub top_down: bool,
    pub bits_per_pixel: u16,
    pub compression: Compression,
    /// Horizontal and vertical resolution in pixels per meter, when the header carries it.
    pub pixels_per_meter: Option<(i32, i32)>,
}

impl LoadableMetadata for Metadata {
    fn load<R: ?Sized + BufRead>(r: &mut R) -> Result<Metadata> {
        let mut signature = [0u8; 2];
        try_if_eof!(r.read_exact(&mut signature), "when reading BMP signature");
        if &signature != b"BM" {
            return Err(invalid_format!("invalid BMP signature: {:?}", signature));
        }

        // file size, two reserved words and pixel data offset
        if r.skip_exact(12)? != 12 {
            return Err(unexpected_eof!("when reading BMP file header"));
        }

        let header_size = try_if_eof!(r.read_u32::<LittleEndian>(), "when reading DIB header size");

        let (width, height, planes, bits_per_pixel) = if header_size == CORE_HEADER_SIZE {
            let w = try_if_eof!(r.read_u16::<LittleEndian>(), "when reading width") as i32;
            let h = try_if_eof!(r.read_u16::<LittleEndian>(), "when reading height") as i32;
            let planes = try_if_eof!(r.read_u16::<LittleEndian>(), "when reading planes");
            let bpp = try_if_eof!(r.read_u16::<LittleEndian>(), "when reading bits per pixel");
            (w, h, planes, bpp)
        } else if header_size >= INFO_HEADER_SIZE {
            let w = try_if_eof!(r.read_i32::<LittleEndian>(), "when reading width");
            let h = try_if_eof!(r.read_i32::<LittleEndian>(), "when reading height");
            let planes = try_if_eof!(r.read_u16::<LittleEndian>(), "when reading planes");
            let bpp = try_if_eof!(r.read_u16::<LittleEndian>(), "when reading bits per pixel");
            (w, h, planes, bpp)
        } else {
            return Err(invalid_format!("unsupported DIB header size: {}", header_size));
        };

        if planes != 1 {
            return Err(invalid_format!("invalid number of color planes: {}", planes));
        }
        match bits_per_pixel {
            1 | 2 | 4 | 8 | 16 | 24 | 32 => {}
            n => return Err(invalid_format!("invalid bits per pixel: {}", n)),
        }
        if width <= 0 || height == 0 || height == i32::MIN {
            return Err(invalid_format!("invalid BMP dimensions: {} x {}", width, height));
        }

        let (compression, pixels_per_meter) = if header_size == CORE_HEADER_SIZE {
            (Compression::Rgb, None)
        } else {
            let compression = try_if_eof!(r.read_u32::<LittleEndian>(), "when reading compression");
            let _image_size = try_if_eof!(r.read_u32::<LittleEndian>(), "when reading image size");
            let x = try_if_eof!(r.read_i32::<LittleEndian>(), "when reading horizontal resolution");
            let y = try_if_eof!(r.read_i32::<LittleEndian>(), "when reading vertical resolution");
            let ppm = if x > 0 && y > 0 { Some((x, y)) } else { None };
            (Compression::from_u32(compression), ppm)
        };

        Ok(Metadata {
            dimensions: Dimensions::try_from_pair(width, height.unsigned_abs())?,
            top_down: height < 0,
            bits_per_pixel,
            compression,
            pixels_per_meter,
        })
    }
}
