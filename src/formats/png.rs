//! Metadata of PNG images.

use std::fmt;
use std::io::BufRead;

use byteorder::{BigEndian, ReadBytesExt};

use crate::traits::LoadableMetadata;
use crate::types::{Dimensions, Result};

pub const SIGNATURE: &[u8] = b"\x89PNG\r\n\x1a\n";

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum ColorType {
    Grayscale,
    Rgb,
    Indexed,
    GrayscaleAlpha,
    RgbAlpha,
}

const CT_GRAYSCALE: u8 = 0;
const CT_RGB: u8 = 2;
const CT_INDEXED: u8 = 3;
const CT_GRAYSCALE_ALPHA: u8 = 4;
const CT_RGB_ALPHA: u8 = 6;

impl ColorType {
    fn from_u8(n: u8) -> Option<ColorType> {
        match n {
            CT_GRAYSCALE       => Some(ColorType::Grayscale),
            CT_RGB             => Some(ColorType::Rgb),
            CT_INDEXED         => Some(ColorType::Indexed),
            CT_GRAYSCALE_ALPHA => Some(ColorType::GrayscaleAlpha),
            CT_RGB_ALPHA       => Some(ColorType::RgbAlpha),
            _                  => None,
        }
    }
}

impl fmt::Display for ColorType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match *self {
            ColorType::Grayscale => "grayscale",
            ColorType::Rgb => "RGB",
            ColorType::Indexed => "indexed",
            ColorType::GrayscaleAlpha => "grayscale with alpha",
            ColorType::RgbAlpha => "RGB with alpha",
        })
    }
}

fn compute_color_depth(bit_depth: u8, color_type: u8) -> Option<u8> {
    match color_type {
        CT_INDEXED => match bit_depth {
            1 | 2 | 4 | 8 => Some(bit_depth),
            _ => None,
        },
        CT_GRAYSCALE => match bit_depth {
            1 | 2 | 4 | 8 | 16 => Some(bit_depth),
            _ => None,
        },
        CT_GRAYSCALE_ALPHA => match bit_depth {
            8 | 16 => Some(bit_depth * 2),
            _ => None,
        },
        CT_RGB => match bit_depth {
            8 | 16 => Some(bit_depth * 3),
            _ => None,
        },
        CT_RGB_ALPHA => match bit_depth {
            8 | 16 => Some(bit_depth * 4),
            _ => None,
        },
        _ => None,
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum InterlaceMethod {
    Disabled,
    Adam7,
}

impl InterlaceMethod {
    fn from_u8(n: u8) -> Option<InterlaceMethod> {
        match n {
            0 => Some(InterlaceMethod::Disabled),
            1 => Some(InterlaceMethod::Adam7),
            _ => None,
        }
    }
}

impl fmt::Display for InterlaceMethod {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match *self {
            InterlaceMethod::Disabled => "none",
            InterlaceMethod::Adam7 => "Adam7",
        })
    }
}

/// Metadata found in the header chunk of a PNG image.
///
/// Compression and filter methods are not stored: PNG defines exactly one of each and
/// anything else is rejected as invalid.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Metadata {
    pub dimensions: Dimensions,
    pub color_type: ColorType,
    /// Bits per pixel, all channels included.
    pub color_depth: u8,
    pub interlace_method: InterlaceMethod,
}

impl LoadableMetadata for Metadata {
    fn load<R: ?Sized + BufRead>(r: &mut R) -> Result<Metadata> {
        let mut signature = [0u8; 8];
        try_if_eof!(r.read_exact(&mut signature), "when reading PNG signature");
        if &signature[..] != SIGNATURE {
            return Err(invalid_format!("invalid PNG header: {:?}", signature));
        }

        // chunk length
        let _ = try_if_eof!(r.read_u32::<BigEndian>(), "when reading chunk length");

        let mut chunk_type = [0u8; 4];
        try_if_eof!(r.read_exact(&mut chunk_type), "when reading chunk type");
        if &chunk_type != b"IHDR" {
            return Err(invalid_format!("invalid PNG chunk: {:?}", chunk_type));
        }

        let width = try_if_eof!(r.read_u32::<BigEndian>(), "when reading width");
        let height = try_if_eof!(r.read_u32::<BigEndian>(), "when reading height");
        let bit_depth = try_if_eof!(r.read_u8(), "when reading bit depth");
        let color_type = try_if_eof!(r.read_u8(), "when reading color type");
        let compression_method = try_if_eof!(r.read_u8(), "when reading compression method");
        let filter_method = try_if_eof!(r.read_u8(), "when reading filter method");
        let interlace_method = try_if_eof!(r.read_u8(), "when reading interlace method");

        if width == 0 || height == 0 {
            return Err(invalid_format!("invalid PNG dimensions: {} x {}", width, height));
        }
        if compression_method != 0 {
            return Err(invalid_format!("invalid compression method: {}", compression_method));
        }
        if filter_method != 0 {
            return Err(invalid_format!("invalid filter method: {}", filter_method));
        }

        Ok(Metadata {
            dimensions: (width, height).into(),
            color_type: ColorType::from_u8(color_type)
                .ok_or_else(|| invalid_format!("invalid color type: {}", color_type))?,
            color_depth: compute_color_depth(bit_depth, color_type)
                .ok_or_else(|| invalid_format!("invalid bit depth: {}", bit_depth))?,
            interlace_method: InterlaceMethod::from_u8(interlace_method)
                .ok_or_else(|| invalid_format!("invalid interlace method: {}", interlace_method))?,
        })
    }
}
