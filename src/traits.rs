use std::io::BufRead;

use crate::types::Result;

/// Metadata which can be decoded from a byte stream positioned at the start of an image.
pub trait LoadableMetadata: Sized {
    fn load<R: ?Sized + BufRead>(r: &mut R) -> Result<Self>;

    #[inline]
    fn load_from_buf(mut buf: &[u8]) -> Result<Self> {
        LoadableMetadata::load(&mut buf)
    }
}
