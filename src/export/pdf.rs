//! Single-page raster PDF report of a captured visual region.

use crate::export::error::ExportError;
use crate::export::region::{RenderedRegion, REPORT_BACKGROUND};
use image::{DynamicImage, RgbaImage};
use log::info;
use printpdf::{Image, ImageTransform, Mm, PdfDocument};
use std::path::{Path, PathBuf};
use tokio::{fs, task};

/// Upscale factor applied when capturing a region.
pub const CAPTURE_SCALE: f32 = 2.0;

const IMAGE_DPI: f64 = 300.0;
const MM_PER_INCH: f64 = 25.4;

/// Output page geometry in millimetres.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSpec {
    pub width_mm: f64,
    pub height_mm: f64,
    pub margin_mm: f64,
}

/// A4 portrait with a 10 mm margin on every side.
pub const A4_PORTRAIT: PageSpec = PageSpec {
    width_mm: 210.0,
    height_mm: 297.0,
    margin_mm: 10.0,
};

impl PageSpec {
    pub fn printable_width(&self) -> f64 {
        self.width_mm - self.margin_mm * 2.0
    }

    pub fn printable_height(&self) -> f64 {
        self.height_mm - self.margin_mm * 2.0
    }
}

/// Position and size of the image on the page, in millimetres from the page corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Fits an image of `image_width` x `image_height` pixels inside the printable
/// area of `page`, keeping its aspect ratio, and centers it on the full page.
///
/// The image first takes the full printable width; only when that makes it
/// taller than the printable height is it scaled by height instead.
///
/// # Examples
///
/// ```
/// use weather_dash::{fit_image, A4_PORTRAIT};
///
/// let placement = fit_image(1900, 950, &A4_PORTRAIT);
/// assert_eq!(placement.width, 190.0);
/// assert_eq!(placement.height, 95.0);
/// assert_eq!(placement.x, 10.0);
/// ```
pub fn fit_image(image_width: u32, image_height: u32, page: &PageSpec) -> Placement {
    let ratio = image_width as f64 / image_height as f64;

    let mut width = page.printable_width();
    let mut height = width / ratio;
    if height > page.printable_height() {
        height = page.printable_height();
        width = height * ratio;
    }

    Placement {
        x: (page.width_mm - width) / 2.0,
        y: (page.height_mm - height) / 2.0,
        width,
        height,
    }
}

/// Embeds `image` into a single-page PDF of size `page`.
pub fn render_pdf(image: &RgbaImage, title: &str, page: &PageSpec) -> Result<Vec<u8>, ExportError> {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return Err(ExportError::EmptyRegion { width, height });
    }
    let placement = fit_image(width, height, page);

    let (doc, page_index, layer_index) = PdfDocument::new(
        title,
        Mm(page.width_mm as f32),
        Mm(page.height_mm as f32),
        "Report",
    );
    let layer = doc.get_page(page_index).get_layer(layer_index);

    // The capture is already opaque, so dropping alpha loses nothing.
    let rgb = DynamicImage::ImageRgba8(image.clone()).to_rgb8();
    let pdf_image = Image::from_dynamic_image(&DynamicImage::ImageRgb8(rgb));

    let natural_width = width as f64 / IMAGE_DPI * MM_PER_INCH;
    let natural_height = height as f64 / IMAGE_DPI * MM_PER_INCH;
    pdf_image.add_to_layer(
        layer,
        ImageTransform {
            translate_x: Some(Mm(placement.x as f32)),
            translate_y: Some(Mm(placement.y as f32)),
            scale_x: Some((placement.width / natural_width) as f32),
            scale_y: Some((placement.height / natural_height) as f32),
            dpi: Some(IMAGE_DPI as f32),
            ..Default::default()
        },
    );

    doc.save_to_bytes()
        .map_err(|e| ExportError::Document(e.to_string()))
}

/// Captures `region` at [`CAPTURE_SCALE`] over [`REPORT_BACKGROUND`] and
/// returns the A4 report bytes.
pub fn render_report<R: RenderedRegion + ?Sized>(
    region: &R,
    title: &str,
) -> Result<Vec<u8>, ExportError> {
    let image = region.rasterize(CAPTURE_SCALE, REPORT_BACKGROUND)?;
    render_pdf(&image, title, &A4_PORTRAIT)
}

/// Renders the report for `region` and writes it to `path`.
pub async fn export_pdf<R>(region: R, path: &Path) -> Result<PathBuf, ExportError>
where
    R: RenderedRegion + Send + 'static,
{
    let title = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "report".to_string());
    let bytes = task::spawn_blocking(move || render_report(&region, &title)).await??;
    fs::write(path, &bytes)
        .await
        .map_err(|e| ExportError::Write(path.to_path_buf(), e))?;
    info!("Wrote {} bytes of PDF to {:?}", bytes.len(), path);
    Ok(path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::region::BitmapRegion;
    use image::Rgba;

    const EPSILON: f64 = 1e-9;

    fn assert_fits(width: u32, height: u32) {
        let page = A4_PORTRAIT;
        let p = fit_image(width, height, &page);
        assert!(p.width <= page.printable_width() + EPSILON, "{width}x{height}");
        assert!(p.height <= page.printable_height() + EPSILON, "{width}x{height}");
        let at_width_bound = (p.width - page.printable_width()).abs() < EPSILON;
        let at_height_bound = (p.height - page.printable_height()).abs() < EPSILON;
        assert!(at_width_bound || at_height_bound, "{width}x{height} shrunk needlessly");

        let ratio = width as f64 / height as f64;
        assert!((p.width / p.height - ratio).abs() < 1e-6);

        let right = page.width_mm - p.x - p.width;
        let bottom = page.height_mm - p.y - p.height;
        assert!((p.x - right).abs() < EPSILON);
        assert!((p.y - bottom).abs() < EPSILON);
        assert!(p.x >= page.margin_mm - EPSILON);
        assert!(p.y >= page.margin_mm - EPSILON);
    }

    #[test]
    fn test_fit_law_over_aspect_ratios() {
        for (w, h) in [
            (1, 1),
            (1900, 950),
            (800, 700),
            (190, 277),
            (100, 1000),
            (4000, 10),
            (10, 4000),
            (1234, 567),
        ] {
            assert_fits(w, h);
        }
    }

    #[test]
    fn test_wide_image_fills_width_tall_image_fills_height() {
        let wide = fit_image(2000, 1000, &A4_PORTRAIT);
        assert_eq!(wide.width, 190.0);
        assert_eq!(wide.height, 95.0);
        assert_eq!(wide.y, 101.0);

        let tall = fit_image(1000, 2770, &A4_PORTRAIT);
        assert_eq!(tall.height, 277.0);
        assert!((tall.width - 100.0).abs() < EPSILON);
        assert!((tall.x - 55.0).abs() < EPSILON);
    }

    #[test]
    fn test_render_report_produces_pdf() -> Result<(), ExportError> {
        let region = BitmapRegion::new(RgbaImage::from_pixel(60, 40, Rgba([56, 189, 248, 255])));
        let bytes = render_report(&region, "제주날씨_리포트_제주시_오늘")?;
        assert!(bytes.starts_with(b"%PDF"));
        Ok(())
    }

    #[test]
    fn test_empty_image_rejected() {
        let err = render_pdf(&RgbaImage::new(0, 0), "empty", &A4_PORTRAIT).unwrap_err();
        assert!(matches!(err, ExportError::EmptyRegion { width: 0, height: 0 }));
    }

    #[tokio::test]
    async fn test_export_pdf_writes_file() -> Result<(), ExportError> {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.pdf");
        let region = BitmapRegion::new(RgbaImage::from_pixel(30, 30, Rgba([0, 0, 0, 128])));
        let written = export_pdf(region, &path).await?;
        assert_eq!(written, path);
        assert!(std::fs::read(&path).unwrap().starts_with(b"%PDF"));
        Ok(())
    }
}
