//! Side-image export: rasterize one side's composite artwork at a
//! physical resolution derived from its declared dimensions and encode
//! it as PNG.

use std::io::Cursor;

use image::ImageOutputFormat;

use crate::error::ExportError;
use crate::stackup::{BoardSide, StackupResult};
use crate::texture::rasterize_document;

/// Encode `side`'s composite document as PNG bytes at `dpi`.
///
/// Pixel dimensions come from the document's declared physical size:
/// a 100mm-wide side at 300 DPI yields `round(100 / 25.4 * 300)` columns.
pub fn export_side_png(
    stackup: &StackupResult,
    side: BoardSide,
    dpi: f64,
) -> Result<Vec<u8>, ExportError> {
    let document = stackup.side(side).ok_or(ExportError::MissingSide(side))?;

    let width_px = (document.width * document.units.to_inches() * dpi).round().max(1.0) as u32;
    let height_px = (document.height * document.units.to_inches() * dpi).round().max(1.0) as u32;

    log::info!(
        "exporting {} ({side} side) at {dpi} DPI: {width_px}x{height_px} px ({:.2} x {:.2} mm)",
        document.name,
        document.width_mm(),
        document.height_mm()
    );

    let rendered = rasterize_document(document, width_px, height_px)?;

    let mut bytes = Vec::new();
    image::DynamicImage::ImageRgba8(rendered)
        .write_to(&mut Cursor::new(&mut bytes), ImageOutputFormat::Png)?;
    Ok(bytes)
}
