//! Image loading utilities for texture data
//!
//! Decodes PNG and JPEG files into raw 8-bit samples ready for texture upload.

use std::path::Path;
use crate::assets::AssetError;

/// Sample layout of decoded image data
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    /// 3 bytes per pixel
    Rgb8,
    /// 4 bytes per pixel
    Rgba8,
}

impl PixelFormat {
    /// Pixel layout for a decoder channel count (4 selects RGBA, anything else RGB)
    pub fn from_channels(channels: u8) -> Self {
        if channels == 4 { Self::Rgba8 } else { Self::Rgb8 }
    }

    /// Bytes per pixel
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            Self::Rgb8 => 3,
            Self::Rgba8 => 4,
        }
    }
}

/// Loaded image data ready for GPU upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageData {
    /// Raw pixel data, rows bottom-to-top
    pub data: Vec<u8>,
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
    /// Number of color channels (3 or 4)
    pub channels: u8,
}

impl ImageData {
    /// Load an image from a file path
    ///
    /// The image is flipped vertically so the first row is the bottom row, matching
    /// OBJ texture coordinates. Images with an alpha channel decode to RGBA, others to RGB.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, AssetError> {
        let path_ref = path.as_ref();

        log::debug!("Loading image from: {:?}", path_ref);

        if !path_ref.exists() {
            return Err(AssetError::NotFound(path_ref.display().to_string()));
        }

        let img = image::open(path_ref)
            .map_err(|e| AssetError::LoadFailed(format!("Failed to load image: {}", e)))?
            .flipv();

        let image = if img.color().has_alpha() {
            let rgba = img.to_rgba8();
            let (width, height) = rgba.dimensions();
            Self { data: rgba.into_raw(), width, height, channels: 4 }
        } else {
            let rgb = img.to_rgb8();
            let (width, height) = rgb.dimensions();
            Self { data: rgb.into_raw(), width, height, channels: 3 }
        };

        log::info!("Loaded image {}x{} ({} channels) from {:?}", image.width, image.height, image.channels, path_ref);

        Ok(image)
    }

    /// Create a solid color RGBA image (used for placeholder textures)
    pub fn solid_color(width: u32, height: u32, color: [u8; 4]) -> Self {
        let pixel_count = width as usize * height as usize;
        let mut data = Vec::with_capacity(pixel_count * 4);

        for _ in 0..pixel_count {
            data.extend_from_slice(&color);
        }

        Self {
            data,
            width,
            height,
            channels: 4,
        }
    }

    /// The 1x1 opaque white texture bound for materials without `map_Kd`
    pub fn placeholder() -> Self {
        Self::solid_color(1, 1, [255, 255, 255, 255])
    }

    /// Pixel layout selected by the channel count
    pub fn format(&self) -> PixelFormat {
        PixelFormat::from_channels(self.channels)
    }

    /// Get the size of the image data in bytes
    pub fn size_bytes(&self) -> usize {
        self.data.len()
    }
}

/// Decodes texture files referenced by material libraries
pub trait ImageDecoder {
    /// Decode the image at `path`
    fn decode(&self, path: &Path) -> Result<ImageData, AssetError>;
}

/// Decoder backed by the `image` crate
#[derive(Debug, Clone, Copy, Default)]
pub struct FileImageDecoder;

impl ImageDecoder for FileImageDecoder {
    fn decode(&self, path: &Path) -> Result<ImageData, AssetError> {
        ImageData::from_file(path)
    }
}
