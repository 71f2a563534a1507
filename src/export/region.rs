//! Visual regions that can be captured into a bitmap for the PDF report.

use crate::export::error::ExportError;
use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use resvg::usvg::fontdb;
use resvg::{tiny_skia, usvg};
use std::sync::{Arc, OnceLock};

/// An opaque background colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

/// Fill used behind transparent parts of a captured region (the widget card colour).
pub const REPORT_BACKGROUND: Rgb = Rgb(0x1e, 0x29, 0x3b);

/// An already-rendered visual region, such as a widget card with its chart.
pub trait RenderedRegion {
    /// Captures the region at `scale` times its intrinsic size, with every
    /// transparent pixel composited over `background`.
    fn rasterize(&self, scale: f32, background: Rgb) -> Result<RgbaImage, ExportError>;
}

/// A region rendered as SVG markup by the chart renderer.
#[derive(Debug, Clone)]
pub struct SvgRegion {
    markup: String,
}

impl SvgRegion {
    pub fn new(markup: impl Into<String>) -> Self {
        Self {
            markup: markup.into(),
        }
    }
}

impl RenderedRegion for SvgRegion {
    fn rasterize(&self, scale: f32, background: Rgb) -> Result<RgbaImage, ExportError> {
        let options = usvg::Options {
            fontdb: system_fonts(),
            ..usvg::Options::default()
        };
        let tree = usvg::Tree::from_str(&self.markup, &options)
            .map_err(|e| ExportError::Rasterize(e.to_string()))?;

        let size = tree.size();
        let width = (size.width() * scale).round() as u32;
        let height = (size.height() * scale).round() as u32;
        let mut pixmap =
            tiny_skia::Pixmap::new(width, height).ok_or(ExportError::EmptyRegion { width, height })?;
        pixmap.fill(tiny_skia::Color::from_rgba8(
            background.0,
            background.1,
            background.2,
            255,
        ));
        resvg::render(
            &tree,
            tiny_skia::Transform::from_scale(scale, scale),
            &mut pixmap.as_mut(),
        );

        let mut data = Vec::with_capacity(pixmap.pixels().len() * 4);
        for pixel in pixmap.pixels() {
            let color = pixel.demultiply();
            data.extend_from_slice(&[color.red(), color.green(), color.blue(), color.alpha()]);
        }
        RgbaImage::from_raw(width, height, data)
            .ok_or_else(|| ExportError::Rasterize("pixel buffer size mismatch".to_string()))
    }
}

/// System fonts, loaded on first use and shared by every SVG capture.
fn system_fonts() -> Arc<fontdb::Database> {
    static FONTS: OnceLock<Arc<fontdb::Database>> = OnceLock::new();
    FONTS
        .get_or_init(|| {
            let mut db = fontdb::Database::new();
            db.load_system_fonts();
            Arc::new(db)
        })
        .clone()
}

/// A region that was already captured as a bitmap.
#[derive(Debug, Clone)]
pub struct BitmapRegion {
    image: RgbaImage,
}

impl BitmapRegion {
    pub fn new(image: RgbaImage) -> Self {
        Self { image }
    }
}

impl RenderedRegion for BitmapRegion {
    fn rasterize(&self, scale: f32, background: Rgb) -> Result<RgbaImage, ExportError> {
        let width = (self.image.width() as f32 * scale).round() as u32;
        let height = (self.image.height() as f32 * scale).round() as u32;
        if width == 0 || height == 0 {
            return Err(ExportError::EmptyRegion { width, height });
        }
        let mut scaled = imageops::resize(&self.image, width, height, FilterType::Triangle);
        for pixel in scaled.pixels_mut() {
            *pixel = over(*pixel, background);
        }
        Ok(scaled)
    }
}

fn over(pixel: Rgba<u8>, background: Rgb) -> Rgba<u8> {
    let alpha = pixel[3] as u32;
    let blend = |fg: u8, bg: u8| ((fg as u32 * alpha + bg as u32 * (255 - alpha) + 127) / 255) as u8;
    Rgba([
        blend(pixel[0], background.0),
        blend(pixel[1], background.1),
        blend(pixel[2], background.2),
        255,
    ])
}
