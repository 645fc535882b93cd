use std::io::{self, BufRead, ErrorKind, Read};

use byteorder::{BigEndian, LittleEndian, ReadBytesExt};

pub trait BufReadExt: BufRead {
    /// Skips up to `n` bytes, returning how many were actually skipped.
    fn skip_exact(&mut self, n: u64) -> io::Result<u64> {
        let mut skipped = 0;
        loop {
            let available = match self.fill_buf() {
                Ok(buf) => buf.len(),
                Err(ref e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            } as u64;
            let total = skipped + available;
            if total >= n {
                let to_skip = n - skipped;
                self.consume(to_skip as usize);
                skipped += to_skip;
                break;
            }
            self.consume(available as usize);
            skipped += available;
            if available == 0 {
                break;
            }
        }
        Ok(skipped)
    }

    /// Skips everything up to and including `delim`, returning the number of bytes consumed.
    fn skip_until(&mut self, delim: u8) -> io::Result<usize> {
        let mut read = 0;
        loop {
            let (done, used) = {
                let available = match self.fill_buf() {
                    Ok(buf) => buf,
                    Err(ref e) if e.kind() == ErrorKind::Interrupted => continue,
                    Err(e) => return Err(e),
                };
                match available.iter().position(|&b| b == delim) {
                    Some(i) => (true, i + 1),
                    None => (false, available.len()),
                }
            };
            self.consume(used);
            read += used;
            if done || used == 0 {
                return Ok(read);
            }
        }
    }
}

impl<R: BufRead + ?Sized> BufReadExt for R {}

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum ByteOrder {
    Little,
    Big,
}

macro_rules! byte_order_read {
    ($name:ident, $inner:ident, $kind:ty) => {
        fn $name(&mut self, byte_order: ByteOrder) -> io::Result<$kind> {
            match byte_order {
                ByteOrder::Little => self.$inner::<LittleEndian>(),
                ByteOrder::Big => self.$inner::<BigEndian>(),
            }
        }
    };
}

/// Reads of multi-byte numbers whose endianness is only known at runtime.
pub trait ByteOrderReadExt: Read {
    byte_order_read!(read_u16_in, read_u16, u16);
    byte_order_read!(read_i16_in, read_i16, i16);
    byte_order_read!(read_u32_in, read_u32, u32);
    byte_order_read!(read_i32_in, read_i32, i32);
    byte_order_read!(read_f32_in, read_f32, f32);
    byte_order_read!(read_f64_in, read_f64, f64);
}

impl<R: Read + ?Sized> ByteOrderReadExt for R {}
