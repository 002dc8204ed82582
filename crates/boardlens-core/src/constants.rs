// Fixed parameters of the reconstruction pipeline.

/// Board substrate thickness in world units (standard 1.6mm FR4).
pub const BOARD_THICKNESS: f64 = 1.6;

/// Pixel count assigned to the longer bounding-box dimension of a
/// rasterized side; the shorter dimension scales to preserve aspect.
pub const TEXTURE_BASE_RESOLUTION: u32 = 2048;

/// Gap between an overlay surface and the solid face it decorates,
/// in world units. Keeps the overlay off the coplanar face.
pub const OVERLAY_CLEARANCE: f64 = 0.05;

/// Opacity below which an overlay fragment is discarded outright
/// instead of blended.
pub const OVERLAY_ALPHA_CUTOFF: f32 = 0.5;

/// Fraction of the view frustum height the framed board should fill.
pub const FRAME_FILL_FRACTION: f64 = 0.75;

/// Curve flattening tolerance for vector path extraction, in document units.
pub const PATH_FLATTEN_TOLERANCE: f64 = 0.01;

// Custom log types for different event categories
pub const LOG_TYPE_OUTLINE: &str = "outline";
pub const LOG_TYPE_TEXTURE: &str = "texture";
pub const LOG_TYPE_CAMERA: &str = "camera";
