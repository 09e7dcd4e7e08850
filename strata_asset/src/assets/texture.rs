use std::fmt::{Debug, Formatter};
use std::path::{Path, PathBuf};

/// A texture known to the database. The pixels only exist on the GPU once the
/// texture loading pipeline has decoded and uploaded the source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureAsset {
    pub source: PathBuf,
    pub srgb: bool,
}

impl TextureAsset {
    pub fn new(source: impl Into<PathBuf>) -> Self {
        TextureAsset {
            source: source.into(),
            srgb: true,
        }
    }

    pub fn linear(source: impl Into<PathBuf>) -> Self {
        TextureAsset {
            source: source.into(),
            srgb: false,
        }
    }

    pub fn source(&self) -> &Path {
        &self.source
    }
}

/// Decoded RGBA8 pixels living in CPU memory until uploaded.
#[derive(Clone)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
    pub has_transparency: bool,
}

impl DecodedImage {
    pub fn from_rgba8(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        debug_assert_eq!(pixels.len(), width as usize * height as usize * 4);

        let has_transparency = pixels.chunks_exact(4).any(|px| px[3] < u8::MAX);
        DecodedImage {
            width,
            height,
            pixels,
            has_transparency,
        }
    }

    pub fn byte_len(&self) -> usize {
        self.pixels.len()
    }
}

impl Debug for DecodedImage {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecodedImage")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.pixels.len())
            .field("has_transparency", &self.has_transparency)
            .finish()
    }
}
