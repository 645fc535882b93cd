//! Scans image files and summarizes their metadata: pixel dimensions, resolution,
//! color depth and compression.
//!
//! Files are classified by extension, then each accepted file is decoded on its own:
//! TIFF files through their tags, everything else through a content-sniffing header decoder
//! plus an EXIF lookup for JPEG files. Failures never escape a single file; they become
//! placeholder values in that file's record.

#[macro_use]
extern crate log;

pub use crate::classify::{classify, is_accepted, Compression, ImageExtension};
pub use crate::extract::{extract_file, Extractor, GenericExtractor, Strategy, TiffExtractor};
pub use crate::generic::GenericMetadata;
pub use crate::messages::{Locale, Messages};
pub use crate::record::{ImageMetadataRecord, Resolution};
pub use crate::scan::{ScanOptions, Scanner};
pub use crate::source::{collect_paths, DiskFile, FileHandle, MemoryFile};
pub use crate::table::{present, Presentation, Table};
pub use crate::traits::LoadableMetadata;
pub use crate::types::{Dimensions, Error, Rational, Result};
pub use crate::utils::ByteOrder;

#[macro_use]
mod macros;
mod traits;
mod types;
mod utils;

pub mod classify;
pub mod common;
pub mod exif;
pub mod extract;
pub mod formats;
pub mod generic;
pub mod messages;
pub mod record;
pub mod scan;
pub mod source;
pub mod table;
