//! Per-file metadata extraction.
//!
//! Extraction never fails: every decoding problem ends up as placeholder values inside the
//! returned record, so one broken file cannot affect the others.

use crate::classify::{Compression, ImageExtension};
use crate::exif::ExifResolution;
use crate::formats::tiff;
use crate::generic;
use crate::record::{ImageMetadataRecord, Resolution};
use crate::source::FileHandle;
use crate::traits::LoadableMetadata;

/// Color depth reported by the generic strategy, which does not inspect bit depth.
pub const GENERIC_COLOR_DEPTH: u32 = 24;

pub trait Extractor: Sync {
    fn extract(&self, name: &str, bytes: &[u8]) -> ImageMetadataRecord;

    /// The record produced when the file contents are not available at all.
    fn failed(&self, name: &str) -> ImageMetadataRecord;
}

/// Reads TIFF tags directly.
#[derive(Copy, Clone, Debug, Default)]
pub struct TiffExtractor;

impl Extractor for TiffExtractor {
    fn extract(&self, name: &str, bytes: &[u8]) -> ImageMetadataRecord {
        match tiff::Metadata::load_from_buf(bytes) {
            Ok(md) => {
                debug!("{}: TIFF {} ({} compression)", name, md.dimensions, md.compression);
                let (x, y) = match md.resolution() {
                    Some((x, y)) => (Some(x), Some(y)),
                    None => (None, None),
                };
                ImageMetadataRecord {
                    name: name.to_owned(),
                    width: Some(md.dimensions.width),
                    height: Some(md.dimensions.height),
                    resolution: Resolution::from_values(x, y),
                    color_depth: Some(md.color_depth()),
                    // the sub-scheme is not reported, every TIFF is labelled alike
                    compression: Compression::Tiff,
                }
            }
            Err(e) => {
                warn!("{}: cannot read TIFF: {}", name, e);
                self.failed(name)
            }
        }
    }

    fn failed(&self, name: &str) -> ImageMetadataRecord {
        ImageMetadataRecord {
            compression: Compression::Tiff,
            ..ImageMetadataRecord::unavailable(name, Resolution::TiffReadError)
        }
    }
}

/// Decodes the image by content and, for JPEG files, looks up EXIF resolution.
#[derive(Copy, Clone, Debug, Default)]
pub struct GenericExtractor;

impl GenericExtractor {
    fn exif_resolution(name: &str, md: &generic::GenericMetadata) -> Resolution {
        let payload = match md.as_jpeg().and_then(|j| j.exif.as_ref()) {
            Some(payload) => payload,
            None => return Resolution::NotSpecified,
        };
        match ExifResolution::parse(payload) {
            Ok(exif) => match exif.dpi() {
                Some((x, y)) => Resolution::Dpi { x, y },
                None => Resolution::NotSpecified,
            },
            Err(e) => {
                trace!("{}: ignoring unreadable EXIF block: {}", name, e);
                Resolution::NotSpecified
            }
        }
    }
}

impl Extractor for GenericExtractor {
    fn extract(&self, name: &str, bytes: &[u8]) -> ImageMetadataRecord {
        let md = match generic::load_from_buf(bytes) {
            Ok(md) => md,
            Err(e) => {
                warn!("{}: cannot load image: {}", name, e);
                return self.failed(name);
            }
        };
        debug!("{}: {} {}", name, md.mime_type(), md.dimensions());

        let is_jpeg = ImageExtension::from_name(name).map_or(false, ImageExtension::is_jpeg);
        let resolution = if is_jpeg {
            GenericExtractor::exif_resolution(name, &md)
        } else {
            Resolution::NotSpecified
        };

        let dimensions = md.dimensions();
        ImageMetadataRecord {
            name: name.to_owned(),
            width: Some(dimensions.width),
            height: Some(dimensions.height),
            resolution,
            color_depth: Some(GENERIC_COLOR_DEPTH),
            compression: Compression::from_name(name),
        }
    }

    fn failed(&self, name: &str) -> ImageMetadataRecord {
        ImageMetadataRecord::unavailable(name, Resolution::LoadError)
    }
}

/// Extraction strategy chosen by file extension.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Strategy {
    Tiff,
    Generic,
}

static TIFF_EXTRACTOR: TiffExtractor = TiffExtractor;
static GENERIC_EXTRACTOR: GenericExtractor = GenericExtractor;

impl Strategy {
    pub fn for_extension(ext: Option<ImageExtension>) -> Strategy {
        match ext {
            Some(ext) if ext.is_tiff() => Strategy::Tiff,
            _ => Strategy::Generic,
        }
    }

    #[inline]
    pub fn for_name(name: &str) -> Strategy {
        Strategy::for_extension(ImageExtension::from_name(name))
    }

    pub fn extractor(self) -> &'static dyn Extractor {
        match self {
            Strategy::Tiff => &TIFF_EXTRACTOR,
            Strategy::Generic => &GENERIC_EXTRACTOR,
        }
    }
}

/// Reads one file completely and extracts its metadata.
///
/// A read failure goes down the error path of the file's strategy.
pub fn extract_file<F: FileHandle + ?Sized>(file: &F, max_file_bytes: Option<u64>) -> ImageMetadataRecord {
    let name = file.name();
    let strategy = Strategy::for_name(name);
    debug!("{}: using {:?} strategy", name, strategy);

    match file.read_bytes(max_file_bytes) {
        Ok(bytes) => strategy.extractor().extract(name, &bytes),
        Err(e) => {
            warn!("{}: cannot read file: {}", name, e);
            strategy.extractor().failed(name)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MemoryFile;

    #[test]
    fn test_strategy_table() {
        assert_eq!(Strategy::for_name("a.tif"), Strategy::Tiff);
        assert_eq!(Strategy::for_name("a.TIFF"), Strategy::Tiff);
        assert_eq!(Strategy::for_name("a.jpeg"), Strategy::Generic);
        assert_eq!(Strategy::for_name("a.pcx"), Strategy::Generic);
        assert_eq!(Strategy::for_name("a.xyz"), Strategy::Generic);
    }

    #[test]
    fn test_garbage_tiff() {
        let r = TiffExtractor.extract("bad.tif", b"not a tiff at all");
        assert_eq!(r.width, None);
        assert_eq!(r.height, None);
        assert_eq!(r.color_depth, None);
        assert_eq!(r.resolution, Resolution::TiffReadError);
        assert_eq!(r.compression, Compression::Tiff);
    }

    #[test]
    fn test_garbage_generic() {
        let r = GenericExtractor.extract("bad.bmp", &[1, 2, 3]);
        assert_eq!(r.width, None);
        assert_eq!(r.resolution, Resolution::LoadError);
        assert_eq!(r.compression, Compression::Uncompressed);
    }

    #[test]
    fn test_read_failure_uses_error_path() {
        let f = MemoryFile::new("big.tiff", vec![0; 64]);
        assert_eq!(extract_file(&f, Some(16)).resolution, Resolution::TiffReadError);

        let f = MemoryFile::new("big.png", vec![0; 64]);
        assert_eq!(extract_file(&f, Some(16)).resolution, Resolution::LoadError);
    }
}
