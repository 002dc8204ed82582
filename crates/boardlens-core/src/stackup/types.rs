//! Data model for a composited stackup: per-side composite documents,
//! the typed layer list and the outline-source variants.
//!
//! Everything here is produced once per render pass by the external
//! stackup compositor and is immutable afterwards.

use crate::geometry::BoundingBox;

/// Which face of the board a composite document or overlay belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoardSide {
    Top,
    Bottom,
}

impl BoardSide {
    pub fn all() -> [Self; 2] {
        [Self::Top, Self::Bottom]
    }
}

impl std::fmt::Display for BoardSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Top => write!(f, "top"),
            Self::Bottom => write!(f, "bottom"),
        }
    }
}

/// Unit designator attached to a composite document's declared dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Units {
    #[default]
    Millimeters,
    Inches,
    /// No designator supplied; treated as millimeters wherever a physical
    /// size is needed.
    Unspecified,
}

impl Units {
    /// Conversion factor from this unit to millimeters.
    pub fn to_millimeters(&self) -> f64 {
        match self {
            Units::Millimeters | Units::Unspecified => 1.0,
            Units::Inches => 25.4,
        }
    }

    /// Conversion factor from this unit to inches.
    pub fn to_inches(&self) -> f64 {
        match self {
            Units::Millimeters | Units::Unspecified => 1.0 / 25.4,
            Units::Inches => 1.0,
        }
    }
}

/// Kinds of typed layers the compositor reports alongside the per-side
/// composite documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayerKind {
    TopCopper,
    BottomCopper,
    TopSoldermask,
    BottomSoldermask,
    TopSilkscreen,
    BottomSilkscreen,
    Outline,
    Drill,
    Unknown,
}

impl LayerKind {
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::TopCopper => "Top Copper",
            Self::BottomCopper => "Bottom Copper",
            Self::TopSoldermask => "Top Soldermask",
            Self::BottomSoldermask => "Bottom Soldermask",
            Self::TopSilkscreen => "Top Silkscreen",
            Self::BottomSilkscreen => "Bottom Silkscreen",
            Self::Outline => "Board Outline",
            Self::Drill => "Drill",
            Self::Unknown => "Unknown",
        }
    }

    pub fn is_outline(&self) -> bool {
        matches!(self, Self::Outline)
    }
}

/// One side's merged vector artwork plus its physical dimensions.
#[derive(Debug, Clone)]
pub struct CompositeDocument {
    /// Side or layer name as reported by the compositor.
    pub name: String,
    /// Flattened vector markup for the whole side.
    pub markup: String,
    /// Bounding box of the artwork in document units.
    pub bounds: Option<BoundingBox>,
    /// Declared physical width in `units`.
    pub width: f64,
    /// Declared physical height in `units`.
    pub height: f64,
    pub units: Units,
}

impl CompositeDocument {
    /// Declared width in millimeters, for DPI-derived export sizing.
    pub fn width_mm(&self) -> f64 {
        self.width * self.units.to_millimeters()
    }

    pub fn height_mm(&self) -> f64 {
        self.height * self.units.to_millimeters()
    }
}

/// The outline layer's geometry arrives in one of two representations;
/// resolved once at the start of board assembly.
#[derive(Debug, Clone)]
pub enum OutlineSource {
    /// Ready-made markup with matching units (scale 1.0).
    Markup(String),
    /// Raw path fragments plus the transform descriptor needed to
    /// reconcile them with physical dimensions.
    Fragments {
        /// Raw path-data fragments (`d` attribute payloads).
        fragments: Vec<String>,
        /// View box the fragments are expressed in.
        view_box: BoundingBox,
        /// Declared physical width in `units`.
        width: f64,
        /// Declared physical height in `units`.
        height: f64,
        units: Units,
    },
}

/// One entry of the compositor's typed layer list.
#[derive(Debug, Clone)]
pub struct TypedLayer {
    pub kind: LayerKind,
    pub name: String,
    /// Present on the outline-typed layer only.
    pub outline: Option<OutlineSource>,
}

/// Full compositor output for one render pass.
#[derive(Debug, Clone, Default)]
pub struct StackupResult {
    pub top: Option<CompositeDocument>,
    pub bottom: Option<CompositeDocument>,
    pub layers: Vec<TypedLayer>,
}

impl StackupResult {
    pub fn side(&self, side: BoardSide) -> Option<&CompositeDocument> {
        match side {
            BoardSide::Top => self.top.as_ref(),
            BoardSide::Bottom => self.bottom.as_ref(),
        }
    }

    /// The outline-typed layer, if the stackup carries one.
    pub fn outline_layer(&self) -> Option<&TypedLayer> {
        self.layers.iter().find(|layer| layer.kind.is_outline())
    }
}
