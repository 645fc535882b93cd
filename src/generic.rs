use crate::formats::{bmp, gif, jpeg, pcx, png};
use crate::traits::LoadableMetadata;
use crate::types::{Dimensions, Result};

/// Metadata of an image decoded by content, regardless of its file name.
///
/// TIFF is absent: it has its own extraction path.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum GenericMetadata {
    Jpeg(jpeg::Metadata),
    Png(png::Metadata),
    Gif(gif::Metadata),
    Bmp(bmp::Metadata),
    Pcx(pcx::Metadata),
}

impl GenericMetadata {
    pub fn mime_type(&self) -> &'static str {
        match *self {
            GenericMetadata::Jpeg(_) => "image/jpeg",
            GenericMetadata::Png(_) => "image/png",
            GenericMetadata::Gif(_) => "image/gif",
            GenericMetadata::Bmp(_) => "image/bmp",
            GenericMetadata::Pcx(_) => "image/x-pcx",
        }
    }

    pub fn dimensions(&self) -> Dimensions {
        match *self {
            GenericMetadata::Jpeg(ref md) => md.dimensions,
            GenericMetadata::Png(ref md) => md.dimensions,
            GenericMetadata::Gif(ref md) => md.dimensions,
            GenericMetadata::Bmp(ref md) => md.dimensions,
            GenericMetadata::Pcx(ref md) => md.dimensions,
        }
    }

    #[inline]
    pub fn as_jpeg(&self) -> Option<&jpeg::Metadata> {
        match *self {
            GenericMetadata::Jpeg(ref md) => Some(md),
            _ => None,
        }
    }
}

/// Decodes image metadata, choosing the format by the leading bytes.
pub fn load_from_buf(buf: &[u8]) -> Result<GenericMetadata> {
    if buf.starts_with(png::SIGNATURE) {
        png::Metadata::load_from_buf(buf).map(GenericMetadata::Png)
    } else if buf.starts_with(b"GIF8") {
        gif::Metadata::load_from_buf(buf).map(GenericMetadata::Gif)
    } else if buf.starts_with(b"BM") {
        bmp::Metadata::load_from_buf(buf).map(GenericMetadata::Bmp)
    } else if buf.starts_with(&[0xff, 0xd8]) {
        jpeg::Metadata::load_from_buf(buf).map(GenericMetadata::Jpeg)
    } else if buf.first() == Some(&pcx::MANUFACTURER) {
        // should be at the bottom because the PCX signature is a single byte
        pcx::Metadata::load_from_buf(buf).map(GenericMetadata::Pcx)
    } else {
        Err(invalid_format!("unknown file type"))
    }
}

