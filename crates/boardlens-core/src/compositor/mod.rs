//! Interfaces to the external collaborators (spec'd at their seams only):
//! the stackup compositor that turns raw layer files into per-side
//! composite documents, and the archive reader that unpacks layer batches.
//!
//! Both are single-shot async calls with no cancellation or timeout; a
//! stalled collaborator stalls the render pass that awaited it.

use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};

use crate::error::{ArchiveError, CompositorError};
use crate::stackup::StackupResult;

/// One named raw layer file handed to the compositor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerRecord {
    pub name: String,
    pub content: String,
}

impl LayerRecord {
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }
}

/// Color and finish configuration forwarded to the compositor and used
/// for the substrate tint. All channels are 0-255 RGBA.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorConfig {
    pub soldermask: [u8; 4],
    pub silkscreen: [u8; 4],
    pub copper_finish: [u8; 4],
    pub substrate: [u8; 4],
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            soldermask: [0, 132, 80, 255],      // Green mask
            silkscreen: [255, 255, 255, 255],   // White silk
            copper_finish: [192, 192, 192, 255], // HASL silver
            substrate: [60, 90, 40, 255],       // FR4 core
        }
    }
}

impl ColorConfig {
    /// Substrate tint as normalized RGBA for the solid node.
    pub fn substrate_rgba(&self) -> [f32; 4] {
        [
            self.substrate[0] as f32 / 255.0,
            self.substrate[1] as f32 / 255.0,
            self.substrate[2] as f32 / 255.0,
            self.substrate[3] as f32 / 255.0,
        ]
    }
}

/// The external stackup compositor: raw layer records plus color
/// configuration in, per-side composite documents plus the typed layer
/// list out. Exactly zero or one of the typed layers is outline-kinded.
pub trait StackupCompositor {
    fn compose<'a>(
        &'a self,
        layers: &'a [LayerRecord],
        colors: &'a ColorConfig,
    ) -> BoxFuture<'a, Result<StackupResult, CompositorError>>;
}

/// The external archive reader: a container file in, one record per
/// non-directory member out.
pub trait ArchiveReader {
    fn read_entries<'a>(
        &'a self,
        container: &'a [u8],
    ) -> BoxFuture<'a, Result<Vec<LayerRecord>, ArchiveError>>;
}
