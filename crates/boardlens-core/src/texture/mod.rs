//! Surface texturer: composite vector artwork in, aligned pixel texture out.
//!
//! The longer bounding-box dimension always maps to
//! [`TEXTURE_BASE_RESOLUTION`] pixels and the shorter one scales
//! proportionally, so textures stay undistorted for any board aspect
//! ratio. Rasterization scratch state (parsed paths, scanline crossing
//! buffers) is scoped to the call and dropped when the pixel buffer is
//! captured, on success and on failure alike.
//!
//! Decode is exposed as an explicit completion future so the assembler
//! has a single suspension point to guard with its render-pass token.

use futures::channel::oneshot;
use image::{Rgba, RgbaImage};
use std::future::Future;

use crate::constants::TEXTURE_BASE_RESOLUTION;
use crate::error::TextureError;
use crate::geometry::BoundingBox;
use crate::stackup::CompositeDocument;
use crate::vector::{parse_filled_paths, FilledPath};

/// A rasterized side texture plus the metadata the overlay mapping needs.
#[derive(Debug, Clone)]
pub struct SurfaceTexture {
    pub image: RgbaImage,
    /// Width over height of the source bounding box.
    pub aspect: f64,
    /// Vertical sampling direction already matches the solid's mapping
    /// convention; consumers must not re-flip.
    pub flip_y: bool,
}

impl SurfaceTexture {
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }
}

/// Pixel dimensions for a bounding box: longer side at base resolution,
/// shorter side proportional.
pub fn resolution_for(bounds: &BoundingBox) -> (u32, u32) {
    let base = TEXTURE_BASE_RESOLUTION;
    let (width, height) = (bounds.width(), bounds.height());

    if width >= height {
        let short = ((base as f64) * height / width).round() as u32;
        (base, short.max(1))
    } else {
        let short = ((base as f64) * width / height).round() as u32;
        (short.max(1), base)
    }
}

/// Rasterize a composite document at the policy resolution.
pub fn render_texture(document: &CompositeDocument) -> Result<SurfaceTexture, TextureError> {
    let bounds = validate(document)?;
    let (width, height) = resolution_for(&bounds);
    let image = rasterize_markup(&document.markup, &bounds, width, height);

    Ok(SurfaceTexture {
        image,
        aspect: bounds.width() / bounds.height(),
        flip_y: false,
    })
}

/// Rasterize a composite document at an explicit resolution (used by the
/// DPI export path).
pub fn rasterize_document(
    document: &CompositeDocument,
    width: u32,
    height: u32,
) -> Result<RgbaImage, TextureError> {
    let bounds = validate(document)?;
    Ok(rasterize_markup(&document.markup, &bounds, width.max(1), height.max(1)))
}

/// The decode suspension point: resolves with the finished texture or a
/// typed failure once rasterization completes.
pub fn decode_texture(
    document: &CompositeDocument,
) -> impl Future<Output = Result<SurfaceTexture, TextureError>> {
    let (sender, receiver) = oneshot::channel();
    let result = render_texture(document);
    // The send only fails if the receiver was dropped, and then nobody
    // is awaiting the result anyway.
    let _ = sender.send(result);

    async move { receiver.await.unwrap_or(Err(TextureError::Canceled)) }
}

fn validate(document: &CompositeDocument) -> Result<BoundingBox, TextureError> {
    if document.markup.trim().is_empty() {
        return Err(TextureError::EmptyMarkup);
    }
    let bounds = document.bounds.ok_or(TextureError::MissingBounds)?;
    if !bounds.is_positive() {
        return Err(TextureError::DegenerateBounds {
            width: bounds.width(),
            height: bounds.height(),
        });
    }
    Ok(bounds)
}

/// Scanline even-odd fill of every filled element, in document order.
/// Document row `min.y` maps to image row 0, so the texture reads
/// top-down exactly as the artwork does.
fn rasterize_markup(markup: &str, bounds: &BoundingBox, width: u32, height: u32) -> RgbaImage {
    let mut image = RgbaImage::from_pixel(width, height, Rgba([0, 0, 0, 0]));

    let paths = parse_filled_paths(markup);
    let step_x = bounds.width() / width as f64;
    let step_y = bounds.height() / height as f64;

    let mut crossings: Vec<f64> = Vec::new();

    for path in &paths {
        let Some(fill) = path.fill else { continue };
        if fill[3] == 0 {
            continue;
        }

        for row in 0..height {
            let sample_y = bounds.min.y + (row as f64 + 0.5) * step_y;

            crossings.clear();
            scanline_crossings(path, sample_y, &mut crossings);
            crossings.sort_by(f64::total_cmp);

            for span in crossings.chunks_exact(2) {
                fill_span(&mut image, bounds, step_x, row, span[0], span[1], fill);
            }
        }
    }

    image
}

fn scanline_crossings(path: &FilledPath, sample_y: f64, crossings: &mut Vec<f64>) {
    for contour in &path.contours {
        let n = contour.len();
        let mut j = n - 1;
        for i in 0..n {
            let (pi, pj) = (contour[i], contour[j]);
            if (pi.y > sample_y) != (pj.y > sample_y) {
                crossings.push(pj.x + (sample_y - pj.y) / (pi.y - pj.y) * (pi.x - pj.x));
            }
            j = i;
        }
    }
}

fn fill_span(
    image: &mut RgbaImage,
    bounds: &BoundingBox,
    step_x: f64,
    row: u32,
    span_start: f64,
    span_end: f64,
    fill: [u8; 4],
) {
    // Columns whose center falls inside [span_start, span_end)
    let first = ((span_start - bounds.min.x) / step_x - 0.5).ceil().max(0.0) as u32;
    let last = ((span_end - bounds.min.x) / step_x - 0.5).floor();
    if last < 0.0 {
        return;
    }
    let last = (last as u32).min(image.width().saturating_sub(1));

    for col in first..=last {
        if col >= image.width() {
            break;
        }
        let pixel = image.get_pixel_mut(col, row);
        *pixel = blend_over(*pixel, fill);
    }
}

/// Source-over compositing with straight alpha.
fn blend_over(dst: Rgba<u8>, src: [u8; 4]) -> Rgba<u8> {
    let src_a = src[3] as f32 / 255.0;
    if src_a >= 1.0 {
        return Rgba(src);
    }

    let dst_a = dst.0[3] as f32 / 255.0;
    let out_a = src_a + dst_a * (1.0 - src_a);
    if out_a <= 0.0 {
        return Rgba([0, 0, 0, 0]);
    }

    let mut out = [0u8; 4];
    for channel in 0..3 {
        let s = src[channel] as f32 / 255.0;
        let d = dst.0[channel] as f32 / 255.0;
        out[channel] = (((s * src_a + d * dst_a * (1.0 - src_a)) / out_a) * 255.0).round() as u8;
    }
    out[3] = (out_a * 255.0).round() as u8;
    Rgba(out)
}
