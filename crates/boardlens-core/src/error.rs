//! Error types for the reconstruction pipeline.
//!
//! Two families, mirroring how failures propagate: input-data defects are
//! logged where they occur and reported through [`RenderOutcome`]
//! (crate::assembler::RenderOutcome) without failing the caller, while
//! external-call failures carry one of these errors up and abort the
//! in-flight render pass.

use crate::stackup::BoardSide;

/// Failure of the external stackup compositor call.
#[derive(Debug, thiserror::Error)]
pub enum CompositorError {
    #[error("stackup composition failed: {0}")]
    Failed(String),
}

/// Failure of the external archive-reading collaborator.
#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    #[error("failed to open archive: {0}")]
    Open(String),

    #[error("failed to read archive entry {name}: {reason}")]
    Entry { name: String, reason: String },
}

/// Rejection reasons of the surface texturer.
#[derive(Debug, thiserror::Error)]
pub enum TextureError {
    #[error("document has no markup to rasterize")]
    EmptyMarkup,

    #[error("document has no bounding box")]
    MissingBounds,

    #[error("bounding box is degenerate ({width} x {height})")]
    DegenerateBounds { width: f64, height: f64 },

    #[error("texture decode was abandoned before completion")]
    Canceled,
}

/// Failure that aborts a whole render pass. Per-side texture defects are
/// not represented here; the assembler logs and skips those sides.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error(transparent)]
    Compositor(#[from] CompositorError),
}

/// Failure of the side-image export operation.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("no stackup has been rendered yet")]
    NoStackup,

    #[error("stackup has no {0} composite document")]
    MissingSide(BoardSide),

    #[error(transparent)]
    Texture(#[from] TextureError),

    #[error("failed to encode image: {0}")]
    Encode(#[from] image::ImageError),
}
