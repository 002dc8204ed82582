pub mod types;
pub mod detection;

// Re-export the main types for easy access
pub use types::{
    BoardSide, CompositeDocument, LayerKind, OutlineSource, StackupResult, TypedLayer, Units,
};
pub use detection::kind_from_name;
