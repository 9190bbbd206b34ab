//! Rasterizer boundary and the resvg implementation

use resvg::{tiny_skia, usvg};
use std::sync::Arc;
use thiserror::Error;

use super::PreviewContext;

/// Failure reported by a rasterizer
#[derive(Debug, Error)]
#[error("{0}")]
pub struct RasterizationError(pub String);

/// An encoded PNG image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
    pub width: u32,
    pub height: u32,
    pub png: Vec<u8>,
}

/// Turns an SVG document into a bitmap scaled to `target_width`
pub trait Rasterizer: Send + Sync {
    fn rasterize(&self, svg: &str, target_width: u32) -> Result<Bitmap, RasterizationError>;
}

/// Rasterizer backed by `resvg`, with the preview fonts preloaded
pub struct ResvgRasterizer {
    fontdb: Arc<usvg::fontdb::Database>,
}

impl ResvgRasterizer {
    pub fn new(context: &PreviewContext) -> Self {
        let mut fontdb = usvg::fontdb::Database::new();
        for font in &context.fonts {
            fontdb.load_font_data(font.data.clone());
        }
        tracing::debug!("Loaded {} font faces for preview images", fontdb.len());
        Self {
            fontdb: Arc::new(fontdb),
        }
    }
}

impl Rasterizer for ResvgRasterizer {
    fn rasterize(&self, svg: &str, target_width: u32) -> Result<Bitmap, RasterizationError> {
        let options = usvg::Options {
            fontdb: Arc::clone(&self.fontdb),
            ..usvg::Options::default()
        };
        let tree = usvg::Tree::from_str(svg, &options)
            .map_err(|e| RasterizationError(format!("invalid SVG: {}", e)))?;

        let size = tree.size();
        if target_width == 0 || size.width() <= 0.0 {
            return Err(RasterizationError("empty canvas".to_string()));
        }
        let scale = target_width as f32 / size.width();
        let height = (size.height() * scale).round().max(1.0) as u32;

        let mut pixmap = tiny_skia::Pixmap::new(target_width, height).ok_or_else(|| {
            RasterizationError(format!("cannot allocate {}x{} bitmap", target_width, height))
        })?;
        resvg::render(
            &tree,
            tiny_skia::Transform::from_scale(scale, scale),
            &mut pixmap.as_mut(),
        );

        let png = pixmap
            .encode_png()
            .map_err(|e| RasterizationError(format!("PNG encoding failed: {}", e)))?;

        Ok(Bitmap {
            width: target_width,
            height,
            png,
        })
    }
}
