//! Resolution lookup in EXIF blocks embedded into JPEG files.
//!
//! An EXIF `APP1` payload is the `Exif\0\0` signature followed by a complete TIFF structure;
//! the resolution tags live in its first IFD, the same place TIFF images keep them.

use crate::common::tiff::{tags, TiffReader};
use crate::formats::tiff::ResolutionUnit;
use crate::record::Resolution;
use crate::types::Result;

const SIGNATURE: &[u8] = b"Exif\0\0";

#[derive(Copy, Clone, PartialEq, Debug)]
pub struct ExifResolution {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub unit: Option<ResolutionUnit>,
}

impl ExifResolution {
    /// Parses an `APP1` payload, signature included.
    pub fn parse(payload: &[u8]) -> Result<ExifResolution> {
        if !payload.starts_with(SIGNATURE) {
            return Err(invalid_format!("APP1 segment is not an EXIF block"));
        }

        let tiff = &payload[SIGNATURE.len()..];
        let ifd = TiffReader::new(tiff)?.first_ifd()?;

        Ok(ExifResolution {
            x: ifd.get(tags::X_RESOLUTION)?.and_then(|v| v.first_f64()),
            y: ifd.get(tags::Y_RESOLUTION)?.and_then(|v| v.first_f64()),
            unit: ifd.get(tags::RESOLUTION_UNIT)?
                .and_then(|v| v.first_u32())
                .and_then(ResolutionUnit::from_u32),
        })
    }

    /// Rounded resolution pair, available only for inch or centimeter units.
    ///
    /// Values are shown in the unit the file uses; centimeter values are not converted.
    pub fn dpi(&self) -> Option<(u32, u32)> {
        match self.unit {
            Some(unit) if unit.is_absolute() => {}
            _ => return None,
        }
        match Resolution::from_values(self.x, self.y) {
            Resolution::Dpi { x, y } => Some((x, y)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dpi_requires_absolute_unit() {
        let mut res = ExifResolution { x: Some(72.0), y: Some(72.0), unit: Some(ResolutionUnit::Inch) };
        assert_eq!(res.dpi(), Some((72, 72)));

        res.unit = Some(ResolutionUnit::Centimeter);
        assert_eq!(res.dpi(), Some((72, 72)));

        res.unit = Some(ResolutionUnit::None);
        assert_eq!(res.dpi(), None);

        res.unit = None;
        assert_eq!(res.dpi(), None);
    }

    #[test]
    fn test_dpi_requires_both_axes() {
        let res = ExifResolution { x: Some(300.0), y: None, unit: Some(ResolutionUnit::Inch) };
        assert_eq!(res.dpi(), None);
    }

    #[test]
    fn test_zero_resolution_is_missing() {
        let res = ExifResolution { x: Some(0.0), y: Some(72.0), unit: Some(ResolutionUnit::Inch) };
        assert_eq!(res.dpi(), None);
    }

    #[test]
    fn test_rejects_non_exif_payload() {
        assert!(ExifResolution::parse(b"http://ns.adobe.com/xap/1.0/\0").is_err());
        assert!(ExifResolution::parse(b"Exif\0\0II*\0").is_err());
    }
}
