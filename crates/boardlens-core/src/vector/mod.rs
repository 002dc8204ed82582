pub mod path;
pub mod shapes;

// Re-export the main types for easy access
pub use path::{parse_contours, parse_filled_paths, FilledPath};
pub use shapes::{build_shapes, extract_shapes, PlanarShape};
