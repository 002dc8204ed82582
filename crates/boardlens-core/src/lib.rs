//! boardlens-core: 2D-to-3D reconstruction pipeline for PCB inspection.
//!
//! Takes the per-side composite vector documents produced by an external
//! stackup compositor and rebuilds them as a textured, extruded 3D board
//! with an auto-framed camera. The pipeline is single-threaded and
//! event-driven; one render pass fully replaces the previous board.

pub mod assembler;
pub mod compositor;
pub mod constants;
pub mod error;
pub mod export;
pub mod geometry;
pub mod scene;
pub mod solid;
pub mod stackup;
pub mod texture;
pub mod vector;

// Re-export the main types for easy access
pub use assembler::{BoardAssembler, RenderOutcome};
pub use compositor::{ArchiveReader, ColorConfig, LayerRecord, StackupCompositor};
pub use error::{ArchiveError, CompositorError, ExportError, RenderError, TextureError};
pub use geometry::BoundingBox;
pub use scene::{CameraController, CameraState, PcbGroup, RenderContext};
pub use solid::{BoardSolid, Mesh3D};
pub use stackup::{
    BoardSide, CompositeDocument, LayerKind, OutlineSource, StackupResult, TypedLayer, Units,
};
pub use texture::SurfaceTexture;
pub use vector::PlanarShape;
