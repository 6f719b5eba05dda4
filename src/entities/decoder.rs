//! Image decoding behind a small trait
//!
//! Processors depend on `Decoder` rather than on the `image` crate directly so
//! tests and alternative backends can swap it out.

use std::fmt;
use std::path::Path;

use image::imageops::FilterType;
use log::debug;

use super::thumbnail::Thumbnail;

/// Decoding errors
#[derive(Debug)]
pub enum DecodeError {
    Io(String),
    Image(String),
    Empty,
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::Io(e) => write!(f, "I/O error: {}", e),
            DecodeError::Image(e) => write!(f, "Image error: {}", e),
            DecodeError::Empty => write!(f, "Image has no pixels"),
        }
    }
}

impl std::error::Error for DecodeError {}

/// Turns an encoded image on disk into a `Thumbnail`
pub trait Decoder: Send + Sync {
    /// Decode `path`. With `bounds`, scale and center-crop to exactly `(w, h)`.
    fn decode(&self, path: &Path, bounds: Option<(u32, u32)>) -> Result<Thumbnail, DecodeError>;
}

/// `image` crate backend
#[derive(Debug, Default, Clone, Copy)]
pub struct ImageCrateDecoder;

impl Decoder for ImageCrateDecoder {
    fn decode(&self, path: &Path, bounds: Option<(u32, u32)>) -> Result<Thumbnail, DecodeError> {
        debug!("Decoding image: {}", path.display());

        let img = image::open(path).map_err(|e| match e {
            image::ImageError::IoError(io) => DecodeError::Io(io.to_string()),
            other => DecodeError::Image(other.to_string()),
        })?;

        if img.width() == 0 || img.height() == 0 {
            return Err(DecodeError::Empty);
        }

        let img = match bounds {
            Some((w, h)) if w > 0 && h > 0 => img.resize_to_fill(w, h, FilterType::Triangle),
            _ => img,
        };

        let rgba = img.to_rgba8();
        let (width, height) = rgba.dimensions();
        Ok(Thumbnail::from_rgba(rgba.into_raw(), width, height))
    }
}
