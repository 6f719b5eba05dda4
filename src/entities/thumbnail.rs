//! Decoded thumbnail payload shared between cache, workers and UI targets
//!
//! **Why**: The cache must be able to drop its own reference under memory pressure
//! while a UI slot keeps showing the same pixels. Cloning a `Thumbnail` is an
//! `Arc` bump; `WeakThumbnail` is the non-owning handle used by the cache's
//! second tier to resurrect entries that are still alive elsewhere.
//!
//! **Used by**: ImageCache (both tiers), processors (produce), ImagePipeline (deliver/dispose)
//!
//! # Disposal
//!
//! `dispose()` releases the pixel buffer in place. All clones observe it, and
//! `byte_size()` reports 1 from then on so a disposed entry still occupies a slot.

use std::sync::{Arc, Mutex, Weak};

/// Pixel data behind the shared handle. `None` once disposed.
#[derive(Debug)]
struct ThumbData {
    pixels: Option<Vec<u8>>, // RGBA8, row-major
    width: u32,
    height: u32,
}

/// Shared decoded image (RGBA8)
#[derive(Debug, Clone)]
pub struct Thumbnail {
    data: Arc<Mutex<ThumbData>>,
}

/// Non-owning handle to a `Thumbnail`
#[derive(Debug, Clone)]
pub struct WeakThumbnail {
    data: Weak<Mutex<ThumbData>>,
}

impl Thumbnail {
    /// Wrap an RGBA8 buffer. `pixels.len()` should be `width * height * 4`.
    pub fn from_rgba(pixels: Vec<u8>, width: u32, height: u32) -> Self {
        Self {
            data: Arc::new(Mutex::new(ThumbData {
                pixels: Some(pixels),
                width,
                height,
            })),
        }
    }

    /// Solid-color image, handy for placeholders
    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let mut pixels = vec![0u8; width as usize * height as usize * 4];
        for px in pixels.chunks_mut(4) {
            px.copy_from_slice(&rgba);
        }
        Self::from_rgba(pixels, width, height)
    }

    /// Approximate memory footprint in bytes, never 0.
    pub fn byte_size(&self) -> usize {
        let data = self.data.lock().unwrap_or_else(|e| e.into_inner());
        match &data.pixels {
            Some(px) => px.len().max(1),
            None => 1,
        }
    }

    /// Release the pixel buffer. Idempotent.
    pub fn dispose(&self) {
        let mut data = self.data.lock().unwrap_or_else(|e| e.into_inner());
        data.pixels = None;
    }

    pub fn is_disposed(&self) -> bool {
        self.data.lock().unwrap_or_else(|e| e.into_inner()).pixels.is_none()
    }

    pub fn width(&self) -> u32 {
        self.data.lock().unwrap_or_else(|e| e.into_inner()).width
    }

    pub fn height(&self) -> u32 {
        self.data.lock().unwrap_or_else(|e| e.into_inner()).height
    }

    /// Copy of the pixel buffer, `None` if disposed
    pub fn pixels(&self) -> Option<Vec<u8>> {
        self.data.lock().unwrap_or_else(|e| e.into_inner()).pixels.clone()
    }

    pub fn downgrade(&self) -> WeakThumbnail {
        WeakThumbnail {
            data: Arc::downgrade(&self.data),
        }
    }

    /// Same underlying buffer (identity, not pixel equality)
    pub fn ptr_eq(&self, other: &Thumbnail) -> bool {
        Arc::ptr_eq(&self.data, &other.data)
    }
}

impl WeakThumbnail {
    /// Strong handle if some owner still holds the payload
    pub fn upgrade(&self) -> Option<Thumbnail> {
        self.data.upgrade().map(|data| Thumbnail { data })
    }

    pub fn is_alive(&self) -> bool {
        self.data.strong_count() > 0
    }
}
