//! Rasterization: turn a card into a pixel image.
//!
//! The capture itself sits behind the [`Rasterizer`] trait so backends are
//! swappable; [`BlockRasterizer`] is the built-in pure-Rust backend
//! (block layout, paint commands, RGBA buffer, PNG encode).

pub mod layout;
pub mod paint;
pub mod raster;

pub use raster::BlockRasterizer;

use crate::{Card, Result};

/// Fixed capture configuration handed to the backend.
#[derive(Debug, Clone)]
pub struct RasterOptions {
    /// Resolution multiplier for sharper output
    pub scale: f32,
    /// Background color as RGBA bytes; `None` renders transparent
    pub background: Option<[u8; 4]>,
    /// Whether the backend may substitute placeholders for image sources
    /// that were left external by the inliner
    pub remote_assets: bool,
    /// Whether the backend emits diagnostic logging
    pub logging: bool,
}

impl Default for RasterOptions {
    fn default() -> Self {
        Self {
            scale: 2.0,
            background: None,
            remote_assets: true,
            logging: false,
        }
    }
}

/// A captured card: PNG-encoded pixels plus dimensions.
#[derive(Debug, Clone)]
pub struct RasterSurface {
    pub width: u32,
    pub height: u32,
    pub png_data: Vec<u8>,
}

/// A capture backend: given the card and fixed options, produce a surface.
///
/// Backend failures propagate to the caller; there is no retry.
pub trait Rasterizer {
    fn rasterize(&self, card: &Card, options: &RasterOptions) -> Result<RasterSurface>;
}
