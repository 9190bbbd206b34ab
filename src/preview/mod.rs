//! Preview (Open Graph) images
//!
//! A preview is described as a [`LayoutNode`] tree, laid out into SVG by
//! [`render_svg`], then handed to a [`Rasterizer`]. Fonts and canvas size
//! live in an immutable [`PreviewContext`] built once per build and shared by
//! every worker.

mod layout;
mod raster;
mod svg;

use std::fs;
use std::path::Path;
use std::sync::Arc;

pub use layout::{
    home_layout, post_layout, post_subtitle, Align, Branding, FlexDirection, Justify, LayoutNode,
    Length, Style,
};
pub use raster::{Bitmap, RasterizationError, Rasterizer, ResvgRasterizer};
pub use svg::render_svg;

use crate::config::PreviewConfig;
use crate::error::{BuildError, Result};

/// Raw font file of one weight
#[derive(Debug, Clone)]
pub struct FontAsset {
    pub weight: u16,
    pub data: Vec<u8>,
}

/// Canvas size and fonts used for every preview image
#[derive(Debug, Clone)]
pub struct PreviewContext {
    pub width: u32,
    pub height: u32,
    pub font_family: String,
    pub fonts: Vec<FontAsset>,
}

impl PreviewContext {
    /// Load the regular and bold fonts named in the configuration
    pub fn load(config: &PreviewConfig, static_dir: &Path) -> Result<Self> {
        let mut fonts = Vec::with_capacity(2);
        for (weight, file) in [(400, &config.font_regular), (700, &config.font_bold)] {
            let path = static_dir.join(file);
            let data = fs::read(&path).map_err(|source| BuildError::Asset {
                path: path.clone(),
                source,
            })?;
            fonts.push(FontAsset { weight, data });
        }

        Ok(Self {
            width: config.width,
            height: config.height,
            font_family: config.font_family.clone(),
            fonts,
        })
    }
}

/// Lays out and rasterizes preview images
#[derive(Clone)]
pub struct PreviewGenerator {
    context: Arc<PreviewContext>,
    rasterizer: Arc<dyn Rasterizer>,
}

impl PreviewGenerator {
    pub fn new(context: Arc<PreviewContext>, rasterizer: Arc<dyn Rasterizer>) -> Self {
        Self {
            context,
            rasterizer,
        }
    }

    /// Render a layout to a bitmap as wide as the canvas
    pub fn render(&self, layout: &LayoutNode) -> std::result::Result<Bitmap, RasterizationError> {
        let svg = render_svg(layout, &self.context)?;
        self.rasterizer.rasterize(&svg, self.context.width)
    }
}
