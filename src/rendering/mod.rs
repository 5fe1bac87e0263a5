//! Rendering: lay out an element tree, paint it and rasterize to PNG.

pub mod layout;
pub mod paint;
pub mod raster;

use sha2::{Digest, Sha256};

/// A rasterized image and its encoded PNG bytes.
#[derive(Debug, Clone)]
pub struct Screenshot {
    pub width: u32,
    pub height: u32,
    pub png_data: Vec<u8>,
}

impl Screenshot {
    /// Hex SHA-256 of the PNG bytes; stable across runs for identical input.
    pub fn digest(&self) -> String {
        hex::encode(Sha256::digest(&self.png_data))
    }
}
