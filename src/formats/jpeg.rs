//! Metadata of JPEG images.

use std::fmt;
use std::io::BufRead;

use byteorder::{BigEndian, ReadBytesExt};

use crate::traits::LoadableMetadata;
use crate::types::{Dimensions, Result};
use crate::utils::BufReadExt;

const APP1: u8 = 0xe1;
const SOS: u8 = 0xda;
const EOI: u8 = 0xd9;
const EXIF_SIGNATURE: &[u8] = b"Exif\0\0";

/// Coding process of a frame, from its start-of-frame marker.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum CodingProcess {
    Baseline,
    ExtendedSequential,
    Progressive,
    Lossless,
}

impl fmt::Display for CodingProcess {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match *self {
            CodingProcess::Baseline => "baseline sequential DCT",
            CodingProcess::ExtendedSequential => "extended sequential DCT",
            CodingProcess::Progressive => "progressive DCT",
            CodingProcess::Lossless => "lossless",
        })
    }
}

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum EntropyCoding {
    Huffman,
    Arithmetic,
}

impl fmt::Display for EntropyCoding {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match *self {
            EntropyCoding::Huffman => "Huffman",
            EntropyCoding::Arithmetic => "arithmetic",
        })
    }
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Metadata {
    pub dimensions: Dimensions,
    pub sample_precision: u8,
    pub components: u8,
    pub coding_process: CodingProcess,
    pub entropy_coding: EntropyCoding,
    pub differential: bool,
    /// Payload of the first EXIF `APP1` segment, starting with the `Exif\0\0` signature.
    pub exif: Option<Vec<u8>>,
}

impl Metadata {
    #[inline]
    pub fn baseline(&self) -> bool {
        self.coding_process == CodingProcess::Baseline
    }
}

// Start-of-frame markers are 0xc0..=0xcf except DHT (c4), JPG (c8) and DAC (cc).
fn frame_kind(marker: u8) -> Option<(CodingProcess, EntropyCoding, bool)> {
    let entropy = if marker & 0x08 == 0 { EntropyCoding::Huffman } else { EntropyCoding::Arithmetic };
    let differential = marker & 0x04 != 0;
    let process = match marker {
        0xc0 => CodingProcess::Baseline,
        0xc1 | 0xc5 | 0xc9 | 0xcd => CodingProcess::ExtendedSequential,
        0xc2 | 0xc6 | 0xca | 0xce => CodingProcess::Progressive,
        0xc3 | 0xc7 | 0xcb | 0xcf => CodingProcess::Lossless,
        _ => return None,
    };
    Some((process, entropy, differential))
}

impl LoadableMetadata for Metadata {
    fn load<R: ?Sized + BufRead>(r: &mut R) -> Result<Metadata> {
        let mut soi = [0u8; 2];
        try_if_eof!(r.read_exact(&mut soi), "when reading JPEG start of image marker");
        if soi != [0xff, 0xd8] {
            return Err(invalid_format!("invalid JPEG start of image marker: {:?}", soi));
        }

        let mut exif = None;
        loop {
            if r.skip_until(0xff)? == 0 {
                return Err(unexpected_eof!("when searching for a marker"));
            }

            let mut marker = try_if_eof!(r.read_u8(), "when reading marker type");
            while marker == 0xff {  // fill bytes
                marker = try_if_eof!(r.read_u8(), "when reading marker type");
            }
            match marker {
                0x00 => continue,  // stuffed byte
                0xd0..=0xd8 | 0x01 => continue,  // markers without payload
                EOI | SOS => return Err(invalid_format!("no frame header before marker 0x{:X}", marker)),
                _ => {}
            }

            let size = try_if_eof!(
                r.read_u16::<BigEndian>(),
                "when reading payload size of marker 0x{:X}", marker
            );
            if size < 2 {
                return Err(invalid_format!("invalid payload size of marker 0x{:X}: {}", marker, size));
            }
            let size = size as u64 - 2;

            if let Some((coding_process, entropy_coding, differential)) = frame_kind(marker) {
                let sample_precision = try_if_eof!(r.read_u8(), "when reading sample precision");
                let h = try_if_eof!(r.read_u16::<BigEndian>(), "when reading height");
                let w = try_if_eof!(r.read_u16::<BigEndian>(), "when reading width");
                let components = try_if_eof!(r.read_u8(), "when reading number of components");
                if w == 0 || components == 0 {
                    return Err(invalid_format!("invalid frame header: width {}, {} components", w, components));
                }

                return Ok(Metadata {
                    dimensions: (w, h).into(),
                    sample_precision,
                    components,
                    coding_process,
                    entropy_coding,
                    differential,
                    exif,
                });
            }

            if marker == APP1 && exif.is_none() {
                let mut payload = vec![0u8; size as usize];
                try_if_eof!(r.read_exact(&mut payload), "when reading APP1 segment");
                if payload.starts_with(EXIF_SIGNATURE) {
                    exif = Some(payload);
                }
                continue;
            }

            if r.skip_exact(size)? != size {
                return Err(unexpected_eof!("when skipping payload of marker 0x{:X}", marker));
            }
        }
    }
}
