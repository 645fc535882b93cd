use std::borrow::Cow;
use std::error;
use std::fmt;
use std::io;
use std::result;

use num::ToPrimitive;

#[derive(Debug)]
pub enum Error {
    InvalidFormat(Cow<'static, str>),
    UnexpectedEndOfFile(Option<Cow<'static, str>>),
    Io(io::Error),
    /// No accepted image files were supplied to a scan.
    EmptySelection,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Error::InvalidFormat(ref s) => write!(f, "invalid image format: {}", s),
            Error::UnexpectedEndOfFile(None) => write!(f, "unexpected end of file"),
            Error::UnexpectedEndOfFile(Some(ref s)) => write!(f, "unexpected end of file {}", s),
            Error::Io(ref e) => write!(f, "I/O error: {}", e),
            Error::EmptySelection => write!(f, "no image files selected"),
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match *self {
            Error::Io(ref e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    #[inline]
    fn from(e: io::Error) -> Error {
        Error::Io(e)
    }
}

pub type Result<T> = result::Result<T, Error>;

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    /// Converts a pair of integers of any width, failing if either does not fit into `u32`.
    pub fn try_from_pair<T: ToPrimitive, U: ToPrimitive>(w: T, h: U) -> Result<Dimensions> {
        match (w.to_u32(), h.to_u32()) {
            (Some(width), Some(height)) => Ok(Dimensions { width, height }),
            _ => Err(invalid_format!(
                "image dimensions out of range: {:?} x {:?}",
                w.to_i64(),
                h.to_i64()
            )),
        }
    }
}

impl From<(u16, u16)> for Dimensions {
    #[inline]
    fn from((w, h): (u16, u16)) -> Dimensions {
        Dimensions { width: w as u32, height: h as u32 }
    }
}

impl From<(u32, u32)> for Dimensions {
    #[inline]
    fn from((width, height): (u32, u32)) -> Dimensions {
        Dimensions { width, height }
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} × {}", self.width, self.height)
    }
}

/// An unsigned TIFF rational, `numerator / denominator`.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct Rational {
    pub numerator: u32,
    pub denominator: u32,
}

impl Rational {
    #[inline]
    pub fn new(numerator: u32, denominator: u32) -> Rational {
        Rational { numerator, denominator }
    }

    /// Returns `None` when the denominator is zero.
    #[inline]
    pub fn to_f64(&self) -> Option<f64> {
        if self.denominator == 0 {
            None
        } else {
            Some(self.numerator as f64 / self.denominator as f64)
        }
    }
}

/// Rounds half up, the way resolution values are normalized for display.
///
/// Negative and non-finite inputs yield `None`.
pub fn round_half_up(value: f64) -> Option<u32> {
    if !value.is_finite() || value < 0.0 {
        return None;
    }
    (value + 0.5).floor().to_u32()
}
