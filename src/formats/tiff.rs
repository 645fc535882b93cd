//! Metadata of TIFF images, taken from the first image file directory.

use std::fmt;
use std::io::BufRead;

use crate::common::tiff::{tags, Ifd, TiffReader};
use crate::traits::LoadableMetadata;
use crate::types::{Dimensions, Result};
use crate::utils::ByteOrder;

/// Color depth reported when the BitsPerSample tag is absent.
pub const DEFAULT_COLOR_DEPTH: u32 = 24;

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Compression {
    None,
    CcittRle,
    CcittFax3,
    CcittFax4,
    Lzw,
    OldJpeg,
    Jpeg,
    Deflate,
    PackBits,
    Other(u16),
}

impl Compression {
    fn from_u16(n: u16) -> Compression {
        match n {
            1 => Compression::None,
            2 => Compression::CcittRle,
            3 => Compression::CcittFax3,
            4 => Compression::CcittFax4,
            5 => Compression::Lzw,
            6 => Compression::OldJpeg,
            7 => Compression::Jpeg,
            8 | 32946 => Compression::Deflate,
            32773 => Compression::PackBits,
            n => Compression::Other(n),
        }
    }
}

impl fmt::Display for Compression {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Compression::None => f.write_str("none"),
            Compression::CcittRle => f.write_str("CCITT modified Huffman RLE"),
            Compression::CcittFax3 => f.write_str("CCITT Group 3 fax"),
            Compression::CcittFax4 => f.write_str("CCITT Group 4 fax"),
            Compression::Lzw => f.write_str("LZW"),
            Compression::OldJpeg => f.write_str("JPEG (old-style)"),
            Compression::Jpeg => f.write_str("JPEG"),
            Compression::Deflate => f.write_str("Deflate"),
            Compression::PackBits => f.write_str("PackBits"),
            Compression::Other(n) => write!(f, "unknown ({})", n),
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum ResolutionUnit {
    None,
    Inch,
    Centimeter,
}

impl ResolutionUnit {
    pub fn from_u32(n: u32) -> Option<ResolutionUnit> {
        match n {
            1 => Some(ResolutionUnit::None),
            2 => Some(ResolutionUnit::Inch),
            3 => Some(ResolutionUnit::Centimeter),
            _ => None,
        }
    }

    /// Whether the unit is an absolute length, so that resolution values mean something.
    #[inline]
    pub fn is_absolute(&self) -> bool {
        *self != ResolutionUnit::None
    }
}

#[derive(Clone, PartialEq, Debug)]
pub struct Metadata {
    pub byte_order: ByteOrder,
    pub dimensions: Dimensions,
    /// Values of the BitsPerSample tag; empty when the tag is absent.
    pub bits_per_sample: Vec<u32>,
    pub compression: Compression,
    /// Resolution tags with rationals divided out; `None` when absent or unusable.
    pub x_resolution: Option<f64>,
    pub y_resolution: Option<f64>,
    pub resolution_unit: Option<ResolutionUnit>,
    /// Number of IFDs in the file (pages, thumbnails).
    pub ifd_count: usize,
}

impl Metadata {
    /// Sum of the bits of all samples of a pixel.
    pub fn color_depth(&self) -> u32 {
        if self.bits_per_sample.is_empty() {
            DEFAULT_COLOR_DEPTH
        } else {
            // the sum is checked to fit when the metadata is loaded
            self.bits_per_sample.iter().fold(0u32, |acc, &b| acc.saturating_add(b))
        }
    }

    /// Both resolution values, when both tags are present.
    pub fn resolution(&self) -> Option<(f64, f64)> {
        match (self.x_resolution, self.y_resolution) {
            (Some(x), Some(y)) => Some((x, y)),
            _ => None,
        }
    }

    fn from_ifd(byte_order: ByteOrder, ifd: &Ifd, ifd_count: usize) -> Result<Metadata> {
        let width = ifd.get(tags::IMAGE_WIDTH)?
            .and_then(|v| v.first_u32())
            .ok_or_else(|| invalid_format!("TIFF image has no ImageWidth tag"))?;
        let height = ifd.get(tags::IMAGE_LENGTH)?
            .and_then(|v| v.first_u32())
            .ok_or_else(|| invalid_format!("TIFF image has no ImageLength tag"))?;

        let bits_per_sample = match ifd.get(tags::BITS_PER_SAMPLE)? {
            Some(v) => v.as_u32_list()
                .ok_or_else(|| invalid_format!("invalid BitsPerSample field type"))?,
            None => Vec::new(),
        };
        if bits_per_sample.iter().try_fold(0u32, |acc, &b| acc.checked_add(b)).is_none() {
            return Err(invalid_format!("BitsPerSample values {:?} do not fit a color depth", bits_per_sample));
        }

        let compression = ifd.get(tags::COMPRESSION)?
            .and_then(|v| v.first_u32())
            .map_or(Compression::None, |n| Compression::from_u16(n as u16));

        Ok(Metadata {
            byte_order,
            dimensions: (width, height).into(),
            bits_per_sample,
            compression,
            x_resolution: ifd.get(tags::X_RESOLUTION)?.and_then(|v| v.first_f64()),
            y_resolution: ifd.get(tags::Y_RESOLUTION)?.and_then(|v| v.first_f64()),
            resolution_unit: ifd.get(tags::RESOLUTION_UNIT)?
                .and_then(|v| v.first_u32())
                .and_then(ResolutionUnit::from_u32),
            ifd_count,
        })
    }
}

impl LoadableMetadata for Metadata {
    fn load<R: ?Sized + BufRead>(r: &mut R) -> Result<Metadata> {
        let mut data = Vec::new();
        r.read_to_end(&mut data)?;

        let reader = TiffReader::new(&data)?;
        let mut ifds = reader.ifds();
        let first = ifds.next()
            .unwrap_or_else(|| Err(invalid_format!("TIFF file contains no IFDs")))?;

        // later IFDs are only counted; a broken chain after the main image is tolerated
        let mut ifd_count = 1;
        for ifd in ifds {
            match ifd {
                Ok(_) => ifd_count += 1,
                Err(e) => {
                    debug!("ignoring broken IFD after the first one: {}", e);
                    break;
                }
            }
        }

        Metadata::from_ifd(reader.byte_order(), &first, ifd_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ifd_with(entries: &[[u8; 12]]) -> Vec<u8> {
        let mut d = b"II\x2a\x00\x08\x00\x00\x00".to_vec();
        d.extend_from_slice(&(entries.len() as u16).to_le_bytes());
        for e in entries {
            d.extend_from_slice(e);
        }
        d.extend_from_slice(&[0; 4]);
        d
    }

    const WIDTH: [u8; 12] = [0x00, 0x01, 3, 0, 1, 0, 0, 0, 10, 0, 0, 0];
    const LENGTH: [u8; 12] = [0x01, 0x01, 3, 0, 1, 0, 0, 0, 20, 0, 0, 0];

    #[test]
    fn test_color_depth_overflow_is_invalid() {
        // BitsPerSample LONG [u32::MAX, 8] stored after the IFD
        let mut d = ifd_with(&[WIDTH, LENGTH, [0x02, 0x01, 4, 0, 2, 0, 0, 0, 50, 0, 0, 0]]);
        d.extend_from_slice(&u32::MAX.to_le_bytes());
        d.extend_from_slice(&8u32.to_le_bytes());
        assert!(Metadata::load_from_buf(&d).is_err());
    }

    #[test]
    fn test_unused_entries_are_not_decoded() {
        // an UNDEFINED entry whose payload lies past the end of the file
        let junk = [0x10, 0x9c, 7, 0, 0, 0, 1, 0, 0, 0, 0, 0x7f];
        let md = Metadata::load_from_buf(&ifd_with(&[WIDTH, LENGTH, junk])).unwrap();
        assert_eq!(md.dimensions, Dimensions::from((10u32, 20u32)));
        assert_eq!(md.color_depth(), DEFAULT_COLOR_DEPTH);
        assert_eq!(md.compression, Compression::None);
        assert_eq!(md.ifd_count, 1);
    }
}
