//! Decoders for individual image formats.

pub mod bmp;
pub mod gif;
pub mod jpeg;
pub mod pcx;
pub mod png;
pub mod tiff;
