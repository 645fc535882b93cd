//! Metadata of ZSoft PCX images.

use std::io::BufRead;

use byteorder::{LittleEndian, ReadBytesExt};

use crate::traits::LoadableMetadata;
use crate::types::{Dimensions, Result};
use crate::utils::BufReadExt;

pub const MANUFACTURER: u8 = 0x0a;

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Metadata {
    /// Version byte from the header (0, 2, 3, 4 or 5).
    pub version: u8,
    /// Whether scanlines are run-length encoded.
    pub rle: bool,
    pub dimensions: Dimensions,
    pub bits_per_pixel: u8,
    pub color_planes: u8,
    pub bytes_per_line: u16,
    /// Resolution as written by the producer; often the screen size instead of DPI.
    pub dpi: (u16, u16),
}

impl Metadata {
    #[inline]
    pub fn color_depth(&self) -> u16 {
        self.bits_per_pixel as u16 * self.color_planes as u16
    }
}

impl LoadableMetadata for Metadata {
    fn load<R: ?Sized + BufRead>(r: &mut R) -> Result<Metadata> {
        let manufacturer = try_if_eof!(r.read_u8(), "when reading PCX manufacturer");
        if manufacturer != MANUFACTURER {
            return Err(invalid_format!("invalid PCX manufacturer byte: 0x{:X}", manufacturer));
        }

        let version = try_if_eof!(r.read_u8(), "when reading PCX version");
        match version {
            0 | 2 | 3 | 4 | 5 => {}
            v => return Err(invalid_format!("invalid PCX version: {}", v)),
        }

        let encoding = try_if_eof!(r.read_u8(), "when reading PCX encoding");
        if encoding > 1 {
            return Err(invalid_format!("invalid PCX encoding: {}", encoding));
        }

        let bits_per_pixel = try_if_eof!(r.read_u8(), "when reading bits per pixel");
        match bits_per_pixel {
            1 | 2 | 4 | 8 => {}
            n => return Err(invalid_format!("invalid bits per pixel: {}", n)),
        }

        let x_min = try_if_eof!(r.read_u16::<LittleEndian>(), "when reading window");
        let y_min = try_if_eof!(r.read_u16::<LittleEndian>(), "when reading window");
        let x_max = try_if_eof!(r.read_u16::<LittleEndian>(), "when reading window");
        let y_max = try_if_eof!(r.read_u16::<LittleEndian>(), "when reading window");
        if x_max < x_min || y_max < y_min {
            return Err(invalid_format!(
                "invalid PCX window: ({}, {}) - ({}, {})", x_min, y_min, x_max, y_max
            ));
        }

        let h_dpi = try_if_eof!(r.read_u16::<LittleEndian>(), "when reading horizontal DPI");
        let v_dpi = try_if_eof!(r.read_u16::<LittleEndian>(), "when reading vertical DPI");

        // 16-color palette and a reserved byte
        if r.skip_exact(49)? != 49 {
            return Err(unexpected_eof!("when reading PCX palette"));
        }

        let color_planes = try_if_eof!(r.read_u8(), "when reading color planes");
        let bytes_per_line = try_if_eof!(r.read_u16::<LittleEndian>(), "when reading bytes per line");
        if color_planes == 0 || bytes_per_line == 0 {
            return Err(invalid_format!(
                "invalid PCX layout: {} planes, {} bytes per line", color_planes, bytes_per_line
            ));
        }

        let width = x_max as u32 - x_min as u32 + 1;
        let height = y_max as u32 - y_min as u32 + 1;

        Ok(Metadata {
            version,
            rle: encoding == 1,
            dimensions: (width, height).into(),
            bits_per_pixel,
            color_planes,
            bytes_per_line,
            dpi: (h_dpi, v_dpi),
        })
    }
}
