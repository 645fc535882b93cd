use serde::Serialize;

use crate::classify::Compression;
use crate::types::round_half_up;

fn dpi_value(value: f64) -> Option<u32> {
    if value == 0.0 {
        None
    } else {
        round_half_up(value)
    }
}

/// Resolution column of a record.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Resolution {
    Dpi { x: u32, y: u32 },
    NotSpecified,
    TiffReadError,
    LoadError,
}

impl Resolution {
    /// Normalizes a pair of raw resolution values; either missing or zero means "not specified".
    pub fn from_values(x: Option<f64>, y: Option<f64>) -> Resolution {
        match (x.and_then(dpi_value), y.and_then(dpi_value)) {
            (Some(x), Some(y)) => Resolution::Dpi { x, y },
            _ => Resolution::NotSpecified,
        }
    }

    #[inline]
    pub fn is_error(&self) -> bool {
        matches!(self, Resolution::TiffReadError | Resolution::LoadError)
    }
}

/// Metadata of one scanned file, as shown in one table row.
///
/// `None` in a numeric field marks the value as unavailable.
#[derive(Clone, PartialEq, Eq, Debug, Serialize)]
pub struct ImageMetadataRecord {
    pub name: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub resolution: Resolution,
    pub color_depth: Option<u32>,
    pub compression: Compression,
}

impl ImageMetadataRecord {
    /// A record for a file whose contents could not be decoded.
    pub fn unavailable(name: &str, resolution: Resolution) -> ImageMetadataRecord {
        ImageMetadataRecord {
            name: name.to_owned(),
            width: None,
            height: None,
            resolution,
            color_depth: None,
            compression: Compression::from_name(name),
        }
    }

    #[inline]
    pub fn is_error(&self) -> bool {
        self.resolution.is_error()
    }
}
