//! Name-based classification of selected files.
//!
//! Nothing here looks at file contents: a file is an image candidate purely because of its
//! extension, and the compression label is derived from that extension alone.

use std::fmt;

use serde::Serialize;

use crate::source::FileHandle;

/// Extensions of the files accepted for scanning.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum ImageExtension {
    Jpg,
    Jpeg,
    Png,
    Gif,
    Bmp,
    Tif,
    Tiff,
    Pcx,
}

impl ImageExtension {
    /// Lowercased text after the last dot of `name`, if there is one.
    pub fn raw_extension(name: &str) -> Option<String> {
        name.rsplit_once('.').map(|(_, ext)| ext.to_ascii_lowercase())
    }

    /// Parses the extension of a file name, ignoring case.
    pub fn from_name(name: &str) -> Option<ImageExtension> {
        match Self::raw_extension(name)?.as_str() {
            "jpg" => Some(ImageExtension::Jpg),
            "jpeg" => Some(ImageExtension::Jpeg),
            "png" => Some(ImageExtension::Png),
            "gif" => Some(ImageExtension::Gif),
            "bmp" => Some(ImageExtension::Bmp),
            "tif" => Some(ImageExtension::Tif),
            "tiff" => Some(ImageExtension::Tiff),
            "pcx" => Some(ImageExtension::Pcx),
            _ => None,
        }
    }

    #[inline]
    pub fn is_jpeg(self) -> bool {
        matches!(self, ImageExtension::Jpg | ImageExtension::Jpeg)
    }

    #[inline]
    pub fn is_tiff(self) -> bool {
        matches!(self, ImageExtension::Tif | ImageExtension::Tiff)
    }
}

#[inline]
pub fn is_accepted(name: &str) -> bool {
    ImageExtension::from_name(name).is_some()
}

/// Keeps the files with accepted extensions, preserving their order.
pub fn classify<F: FileHandle>(files: Vec<F>) -> Vec<F> {
    let total = files.len();
    let accepted: Vec<F> = files.into_iter().filter(|f| is_accepted(f.name())).collect();
    debug!("accepted {} of {} selected files", accepted.len(), total);
    accepted
}

/// Compression scheme label, a pure function of the file extension.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Compression {
    LossyJpeg,
    LosslessPng,
    LzwPalette,
    Tiff,
    Uncompressed,
    Rle,
    Unknown,
}

impl Compression {
    pub fn from_name(name: &str) -> Compression {
        match ImageExtension::from_name(name) {
            Some(ext) => Compression::from_extension(ext),
            None => Compression::Unknown,
        }
    }

    pub fn from_extension(ext: ImageExtension) -> Compression {
        match ext {
            ImageExtension::Jpg | ImageExtension::Jpeg => Compression::LossyJpeg,
            ImageExtension::Png => Compression::LosslessPng,
            ImageExtension::Gif => Compression::LzwPalette,
            ImageExtension::Tif | ImageExtension::Tiff => Compression::Tiff,
            ImageExtension::Bmp => Compression::Uncompressed,
            ImageExtension::Pcx => Compression::Rle,
        }
    }

    /// The built-in English label.
    pub fn english_label(self) -> &'static str {
        match self {
            Compression::LossyJpeg => "lossy JPEG",
            Compression::LosslessPng => "lossless PNG",
            Compression::LzwPalette => "LZW (palette)",
            Compression::Tiff => "TIFF",
            Compression::Uncompressed => "uncompressed",
            Compression::Rle => "RLE",
            Compression::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Compression {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.english_label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MemoryFile;

    #[test]
    fn test_extension_case_insensitive() {
        assert_eq!(ImageExtension::from_name("photo.JPG"), Some(ImageExtension::Jpg));
        assert_eq!(ImageExtension::from_name("scan.Tiff"), Some(ImageExtension::Tiff));
        assert_eq!(ImageExtension::from_name("archive.tar.gz"), None);
        assert_eq!(ImageExtension::from_name("png"), None);
        assert_eq!(ImageExtension::from_name("noext."), None);
    }

    #[test]
    fn test_classify_preserves_order() {
        let files = vec![
            MemoryFile::new("a.png", vec![]),
            MemoryFile::new("b.txt", vec![]),
            MemoryFile::new("c.jpeg", vec![]),
            MemoryFile::new("D.PCX", vec![]),
            MemoryFile::new("e.jpg.bak", vec![]),
        ];
        let names: Vec<_> = classify(files).iter().map(|f| f.name().to_owned()).collect();
        assert_eq!(names, ["a.png", "c.jpeg", "D.PCX"]);
    }

    #[test]
    fn test_classify_empty() {
        assert!(classify(Vec::<MemoryFile>::new()).is_empty());
    }

    #[test]
    fn test_compression_labels() {
        assert_eq!(Compression::from_name("photo.JPG"), Compression::LossyJpeg);
        assert_eq!(Compression::from_name("scan.PCX"), Compression::Rle);
        assert_eq!(Compression::from_name("mystery.xyz"), Compression::Unknown);
        assert_eq!(Compression::from_name("a.tif"), Compression::Tiff);
        assert_eq!(Compression::from_name("a.bmp").to_string(), "uncompressed");
        assert_eq!(Compression::from_name("a.gif").to_string(), "LZW (palette)");
        assert_eq!(Compression::from_name("photo.JPG").to_string(), "lossy JPEG");
        assert_eq!(Compression::from_name("a.png").to_string(), "lossless PNG");
    }
}
