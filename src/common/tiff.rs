//! A reader for the TIFF container structure: the header and the chain of image file
//! directories (IFDs).
//!
//! Both TIFF images and EXIF blocks embedded into JPEG files use this layout, so this module
//! only knows about the container; interpretation of particular tags lives elsewhere.

use std::collections::HashSet;
use std::io::Read;

use byteorder::ReadBytesExt;

use crate::types::{Rational, Result};
use crate::utils::{ByteOrder, ByteOrderReadExt};

/// Numbers of the baseline tags this crate looks at.
pub mod tags {
    pub const IMAGE_WIDTH: u16 = 256;
    pub const IMAGE_LENGTH: u16 = 257;
    pub const BITS_PER_SAMPLE: u16 = 258;
    pub const COMPRESSION: u16 = 259;
    pub const X_RESOLUTION: u16 = 282;
    pub const Y_RESOLUTION: u16 = 283;
    pub const RESOLUTION_UNIT: u16 = 296;
}

const IFD_ENTRY_SIZE: u64 = 12;

/// Field types defined by TIFF 6.0.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum FieldType {
    Byte,
    Ascii,
    Short,
    Long,
    Rational,
    SByte,
    Undefined,
    SShort,
    SLong,
    SRational,
    Float,
    Double,
}

impl FieldType {
    fn from_u16(n: u16) -> Option<FieldType> {
        match n {
            1 => Some(FieldType::Byte),
            2 => Some(FieldType::Ascii),
            3 => Some(FieldType::Short),
            4 => Some(FieldType::Long),
            5 => Some(FieldType::Rational),
            6 => Some(FieldType::SByte),
            7 => Some(FieldType::Undefined),
            8 => Some(FieldType::SShort),
            9 => Some(FieldType::SLong),
            10 => Some(FieldType::SRational),
            11 => Some(FieldType::Float),
            12 => Some(FieldType::Double),
            _ => None,
        }
    }

    fn size(self) -> u64 {
        match self {
            FieldType::Byte | FieldType::Ascii | FieldType::SByte | FieldType::Undefined => 1,
            FieldType::Short | FieldType::SShort => 2,
            FieldType::Long | FieldType::SLong | FieldType::Float => 4,
            FieldType::Rational | FieldType::SRational | FieldType::Double => 8,
        }
    }
}

/// Decoded contents of an IFD entry.
#[derive(Clone, PartialEq, Debug)]
pub enum Value {
    Byte(Vec<u8>),
    Ascii(String),
    Short(Vec<u16>),
    Long(Vec<u32>),
    Rational(Vec<Rational>),
    SByte(Vec<i8>),
    Undefined(Vec<u8>),
    SShort(Vec<i16>),
    SLong(Vec<i32>),
    SRational(Vec<(i32, i32)>),
    Float(Vec<f32>),
    Double(Vec<f64>),
    /// A field type this reader does not know; the payload is not read.
    Unknown { field_type: u16, count: u32 },
}

impl Value {
    /// Returns the first value of an unsigned integer field.
    pub fn first_u32(&self) -> Option<u32> {
        self.as_u32_list().and_then(|v| v.first().cloned())
    }

    /// Returns all values of an unsigned integer field.
    pub fn as_u32_list(&self) -> Option<Vec<u32>> {
        match *self {
            Value::Byte(ref v) => Some(v.iter().map(|&n| n as u32).collect()),
            Value::Short(ref v) => Some(v.iter().map(|&n| n as u32).collect()),
            Value::Long(ref v) => Some(v.clone()),
            _ => None,
        }
    }

    /// Returns the first value of a numeric field as a float.
    ///
    /// Rationals are divided out; a rational with a zero denominator has no usable value.
    pub fn first_f64(&self) -> Option<f64> {
        match *self {
            Value::Byte(ref v) => v.first().map(|&n| n as f64),
            Value::Short(ref v) => v.first().map(|&n| n as f64),
            Value::Long(ref v) => v.first().map(|&n| n as f64),
            Value::Rational(ref v) => v.first().and_then(Rational::to_f64),
            Value::SByte(ref v) => v.first().map(|&n| n as f64),
            Value::SShort(ref v) => v.first().map(|&n| n as f64),
            Value::SLong(ref v) => v.first().map(|&n| n as f64),
            Value::SRational(ref v) => v.first().and_then(|&(n, d)| {
                if d == 0 { None } else { Some(n as f64 / d as f64) }
            }),
            Value::Float(ref v) => v.first().map(|&n| n as f64),
            Value::Double(ref v) => v.first().cloned(),
            Value::Ascii(_) | Value::Undefined(_) | Value::Unknown { .. } => None,
        }
    }
}

/// A single image file directory.
///
/// Only the entry table is located when the directory is read; a value is decoded when its
/// tag is looked up, so entries nobody asks for cost nothing.
#[derive(Copy, Clone, Debug)]
pub struct Ifd<'a> {
    data: &'a [u8],
    byte_order: ByteOrder,
    entries: &'a [u8],
}

impl<'a> Ifd<'a> {
    #[inline]
    pub fn entry_count(&self) -> usize {
        self.entries.len() / IFD_ENTRY_SIZE as usize
    }

    /// Decodes the value of `tag`, or returns `None` when the directory has no such entry.
    pub fn get(&self, tag: u16) -> Result<Option<Value>> {
        let bo = self.byte_order;
        for mut raw in self.entries.chunks(IFD_ENTRY_SIZE as usize) {
            if raw.read_u16_in(bo)? == tag {
                return self.read_value(tag, raw).map(Some);
            }
        }
        Ok(None)
    }

    fn read_value(&self, tag: u16, mut raw: &[u8]) -> Result<Value> {
        let bo = self.byte_order;
        let field_type = raw.read_u16_in(bo)?;
        let count = raw.read_u32_in(bo)?;

        let ft = match FieldType::from_u16(field_type) {
            Some(ft) => ft,
            None => {
                debug!("TIFF tag {} has unknown field type {}", tag, field_type);
                return Ok(Value::Unknown { field_type, count });
            }
        };

        let size = count as u64 * ft.size();
        if size <= 4 {
            read_values(&mut raw, bo, ft, count)
        } else {
            let offset = raw.read_u32_in(bo)? as u64;
            let mut data = slice_at(self.data, offset, size, "IFD entry value")?;
            read_values(&mut data, bo, ft, count)
        }
    }
}

/// Reader of a TIFF structure held in memory.
#[derive(Copy, Clone, Debug)]
pub struct TiffReader<'a> {
    data: &'a [u8],
    byte_order: ByteOrder,
    first_ifd_offset: u32,
}

impl<'a> TiffReader<'a> {
    /// Reads and validates the TIFF header.
    pub fn new(data: &'a [u8]) -> Result<TiffReader<'a>> {
        let mut r = data;

        let mut bom = [0u8; 2];
        try_if_eof!(r.read_exact(&mut bom), "when reading TIFF byte order mark");

        let byte_order = match &bom {
            b"II" => ByteOrder::Little,
            b"MM" => ByteOrder::Big,
            _ => return Err(invalid_format!("invalid TIFF byte order mark: {:?}", bom)),
        };

        let magic = try_if_eof!(r.read_u16_in(byte_order), "when reading TIFF magic number");
        if magic != 42 {
            return Err(invalid_format!("invalid TIFF magic number: {}", magic));
        }

        let first_ifd_offset = try_if_eof!(
            r.read_u32_in(byte_order),
            "when reading the first IFD offset"
        );

        Ok(TiffReader { data, byte_order, first_ifd_offset })
    }

    #[inline]
    pub fn byte_order(&self) -> ByteOrder {
        self.byte_order
    }

    pub fn ifds(&self) -> Ifds<'a> {
        Ifds {
            reader: *self,
            next_ifd_offset: self.first_ifd_offset,
            visited: HashSet::new(),
        }
    }

    /// Reads the first IFD, which describes the main image.
    pub fn first_ifd(&self) -> Result<Ifd<'a>> {
        self.ifds()
            .next()
            .unwrap_or_else(|| Err(invalid_format!("TIFF file contains no IFDs")))
    }

    fn read_ifd(&self, offset: u32) -> Result<(Ifd<'a>, u32)> {
        let offset = offset as u64;
        let bo = self.byte_order;

        let count = slice_at(self.data, offset, 2, "number of entries in an IFD")?.read_u16_in(bo)?;
        if count == 0 {
            return Err(invalid_format!("number of entries in an IFD at offset {} is zero", offset));
        }

        let entries_size = count as u64 * IFD_ENTRY_SIZE;
        let entries = slice_at(self.data, offset + 2, entries_size, "IFD entries")?;
        let next_ifd_offset = slice_at(self.data, offset + 2 + entries_size, 4, "the next IFD offset")?
            .read_u32_in(bo)?;

        let ifd = Ifd { data: self.data, byte_order: bo, entries };
        Ok((ifd, next_ifd_offset))
    }
}

fn slice_at<'a>(data: &'a [u8], offset: u64, size: u64, what: &'static str) -> Result<&'a [u8]> {
    match offset.checked_add(size) {
        Some(end) if end <= data.len() as u64 => Ok(&data[offset as usize..end as usize]),
        _ => Err(unexpected_eof!(
            "when reading {}: {} bytes at offset {} exceed file size {}",
            what, size, offset, data.len()
        )),
    }
}

fn read_values<R: Read>(r: &mut R, bo: ByteOrder, ft: FieldType, count: u32) -> Result<Value> {
    fn collect<T, F>(count: u32, mut f: F) -> Result<Vec<T>>
        where F: FnMut() -> std::io::Result<T>
    {
        (0..count).map(|_| f().map_err(if_eof!("when reading TIFF field value"))).collect()
    }

    Ok(match ft {
        FieldType::Byte => Value::Byte(collect(count, || r.read_u8())?),
        FieldType::Undefined => Value::Undefined(collect(count, || r.read_u8())?),
        FieldType::Ascii => {
            let bytes = collect(count, || r.read_u8())?;
            let text = bytes.split(|&b| b == 0).next().unwrap_or(&[]);
            Value::Ascii(String::from_utf8_lossy(text).into_owned())
        }
        FieldType::Short => Value::Short(collect(count, || r.read_u16_in(bo))?),
        FieldType::Long => Value::Long(collect(count, || r.read_u32_in(bo))?),
        FieldType::Rational => Value::Rational(collect(count, || {
            Ok(Rational::new(r.read_u32_in(bo)?, r.read_u32_in(bo)?))
        })?),
        FieldType::SByte => Value::SByte(collect(count, || r.read_i8())?),
        FieldType::SShort => Value::SShort(collect(count, || r.read_i16_in(bo))?),
        FieldType::SLong => Value::SLong(collect(count, || r.read_i32_in(bo))?),
        FieldType::SRational => Value::SRational(collect(count, || {
            Ok((r.read_i32_in(bo)?, r.read_i32_in(bo)?))
        })?),
        FieldType::Float => Value::Float(collect(count, || r.read_f32_in(bo))?),
        FieldType::Double => Value::Double(collect(count, || r.read_f64_in(bo))?),
    })
}

/// Iterator over the IFD chain of a TIFF stream.
///
/// Iteration stops after the first error.
pub struct Ifds<'a> {
    reader: TiffReader<'a>,
    next_ifd_offset: u32,
    visited: HashSet<u32>,
}

impl<'a> Iterator for Ifds<'a> {
    type Item = Result<Ifd<'a>>;

    fn next(&mut self) -> Option<Result<Ifd<'a>>> {
        let offset = self.next_ifd_offset;
        if offset == 0 {
            return None;
        }
        self.next_ifd_offset = 0;

        if !self.visited.insert(offset) {
            return Some(Err(invalid_format!("IFD chain loops back to offset {}", offset)));
        }

        match self.reader.read_ifd(offset) {
            Ok((ifd, next)) => {
                self.next_ifd_offset = next;
                Some(Ok(ifd))
            }
            Err(e) => Some(Err(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // One IFD, little-endian, with an inline SHORT and an out-of-line RATIONAL.
    fn sample() -> Vec<u8> {
        let mut d = b"II\x2a\x00\x08\x00\x00\x00".to_vec();
        d.extend_from_slice(&[2, 0]);
        d.extend_from_slice(&[0x00, 0x01, 3, 0, 1, 0, 0, 0, 0x40, 0x00, 0, 0]);
        d.extend_from_slice(&[0x1a, 0x01, 5, 0, 1, 0, 0, 0, 38, 0, 0, 0]);
        d.extend_from_slice(&[0, 0, 0, 0]);
        d.extend_from_slice(&[0x2c, 0x01, 0, 0, 1, 0, 0, 0]);
        d
    }

    #[test]
    fn test_reads_inline_and_offset_values() {
        let d = sample();
        let r = TiffReader::new(&d).unwrap();
        assert_eq!(r.byte_order(), ByteOrder::Little);
        let ifd = r.first_ifd().unwrap();
        assert_eq!(ifd.entry_count(), 2);
        assert_eq!(ifd.get(tags::IMAGE_WIDTH).unwrap().and_then(|v| v.first_u32()), Some(64));
        assert_eq!(
            ifd.get(tags::X_RESOLUTION).unwrap(),
            Some(Value::Rational(vec![Rational::new(300, 1)]))
        );
        assert_eq!(ifd.get(tags::Y_RESOLUTION).unwrap(), None);
    }

    #[test]
    fn test_rejects_bad_header() {
        assert!(TiffReader::new(b"XX\x2a\x00").is_err());
        assert!(TiffReader::new(b"II\x2b\x00\x08\x00\x00\x00").is_err());
        match TiffReader::new(b"II") {
            Err(crate::Error::UnexpectedEndOfFile(_)) => {}
            _ => panic!("expected end of file error"),
        }
    }

    #[test]
    fn test_value_out_of_bounds() {
        let mut d = sample();
        d.truncate(d.len() - 4);
        let ifd = TiffReader::new(&d).unwrap().first_ifd().unwrap();
        assert_eq!(ifd.get(tags::IMAGE_WIDTH).unwrap().and_then(|v| v.first_u32()), Some(64));
        match ifd.get(tags::X_RESOLUTION) {
            Err(crate::Error::UnexpectedEndOfFile(_)) => {}
            other => panic!("expected end of file error, got {:?}", other),
        }
    }

    #[test]
    fn test_truncated_entry_table() {
        let d = sample();
        assert!(TiffReader::new(&d[..20]).unwrap().first_ifd().is_err());
    }

    #[test]
    fn test_unknown_field_type_is_not_read() {
        let mut d = sample();
        // retype the RATIONAL entry to an unknown type with a huge count
        d[24] = 99;
        d[26..30].copy_from_slice(&u32::MAX.to_le_bytes());
        let ifd = TiffReader::new(&d).unwrap().first_ifd().unwrap();
        assert_eq!(
            ifd.get(tags::X_RESOLUTION).unwrap(),
            Some(Value::Unknown { field_type: 99, count: u32::MAX })
        );
    }

    #[test]
    fn test_ifd_loop_is_detected() {
        let mut d = sample();
        // point the next IFD offset back at the first IFD
        d[34] = 8;
        let r = TiffReader::new(&d).unwrap();
        let results: Vec<_> = r.ifds().collect();
        assert_eq!(results.len(), 2);
        assert!(results[0].is_ok());
        assert!(results[1].is_err());
    }
}
