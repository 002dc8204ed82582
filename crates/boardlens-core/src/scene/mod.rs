pub mod camera;

// Re-export the main types for easy access
pub use camera::{frame_group, CameraController, CameraState};

use nalgebra::{Point3, UnitQuaternion, Vector3};

use crate::solid::BoardSolid;
use crate::stackup::BoardSide;
use crate::texture::SurfaceTexture;

/// Upright board orientation: the extrusion axis (local Z) is rotated
/// onto the world's vertical axis (world Y).
pub fn upright_rotation() -> UnitQuaternion<f32> {
    UnitQuaternion::from_axis_angle(&Vector3::x_axis(), -std::f32::consts::FRAC_PI_2)
}

/// The board substrate node: owned solid plus its scene placement.
#[derive(Debug, Clone)]
pub struct SolidNode {
    pub solid: BoardSolid,
    pub rotation: UnitQuaternion<f32>,
    /// Substrate tint, normalized RGBA.
    pub color: [f32; 4],
}

impl SolidNode {
    pub fn upright(solid: BoardSolid, color: [f32; 4]) -> Self {
        Self {
            solid,
            rotation: upright_rotation(),
            color,
        }
    }

    /// World-space bounding box of the rotated mesh.
    pub fn bounding_box(&self) -> Option<(Point3<f32>, Point3<f32>)> {
        let (min, max) = self.solid.mesh.bounding_box()?;
        let corners = [
            Point3::new(min.x, min.y, min.z),
            Point3::new(max.x, min.y, min.z),
            Point3::new(min.x, max.y, min.z),
            Point3::new(min.x, min.y, max.z),
            Point3::new(max.x, max.y, min.z),
            Point3::new(max.x, min.y, max.z),
            Point3::new(min.x, max.y, max.z),
            Point3::new(max.x, max.y, max.z),
        ];
        aabb_of(corners.iter().map(|c| self.rotation * c))
    }
}

/// Render material for an overlay surface. Fragments below the alpha
/// cutoff are discarded outright, so non-board texture regions read as
/// true transparency instead of translucency.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayMaterial {
    pub transparent: bool,
    pub alpha_cutoff: f32,
}

impl OverlayMaterial {
    pub fn cutout() -> Self {
        Self {
            transparent: true,
            alpha_cutoff: crate::constants::OVERLAY_ALPHA_CUTOFF,
        }
    }
}

/// A thin planar surface carrying one side's rasterized artwork,
/// positioned just off the corresponding solid face.
#[derive(Debug, Clone)]
pub struct OverlaySurface {
    pub side: BoardSide,
    /// In-plane extents of the quad, world units.
    pub width: f32,
    pub height: f32,
    pub center: Point3<f32>,
    pub rotation: UnitQuaternion<f32>,
    pub texture: SurfaceTexture,
    pub material: OverlayMaterial,
}

impl OverlaySurface {
    /// World-space corners of the quad.
    pub fn corners(&self) -> [Point3<f32>; 4] {
        let (hw, hh) = (self.width / 2.0, self.height / 2.0);
        let local = [
            Point3::new(-hw, -hh, 0.0),
            Point3::new(hw, -hh, 0.0),
            Point3::new(hw, hh, 0.0),
            Point3::new(-hw, hh, 0.0),
        ];
        local.map(|corner| self.rotation * corner + self.center.coords)
    }

    pub fn bounding_box(&self) -> Option<(Point3<f32>, Point3<f32>)> {
        aabb_of(self.corners().into_iter())
    }
}

/// The mutable scene container for the current board. Fully cleared and
/// rebuilt on every render pass, never incrementally patched.
#[derive(Debug, Clone, Default)]
pub struct PcbGroup {
    solid: Option<SolidNode>,
    overlays: Vec<OverlaySurface>,
}

impl PcbGroup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every node. Previous-pass resources die here; nothing keeps
    /// a reference past this call.
    pub fn clear(&mut self) {
        self.solid = None;
        self.overlays.clear();
    }

    pub fn set_solid(&mut self, node: SolidNode) {
        self.solid = Some(node);
    }

    pub fn add_overlay(&mut self, overlay: OverlaySurface) {
        // At most one overlay per side
        self.overlays.retain(|existing| existing.side != overlay.side);
        self.overlays.push(overlay);
    }

    pub fn solid(&self) -> Option<&SolidNode> {
        self.solid.as_ref()
    }

    pub fn overlay(&self, side: BoardSide) -> Option<&OverlaySurface> {
        self.overlays.iter().find(|overlay| overlay.side == side)
    }

    pub fn overlays(&self) -> &[OverlaySurface] {
        &self.overlays
    }

    pub fn child_count(&self) -> usize {
        usize::from(self.solid.is_some()) + self.overlays.len()
    }

    pub fn is_empty(&self) -> bool {
        self.child_count() == 0
    }

    /// Union bounding box of every node, or `None` for an empty group.
    pub fn bounding_box(&self) -> Option<(Point3<f32>, Point3<f32>)> {
        let boxes = self
            .solid
            .iter()
            .filter_map(|node| node.bounding_box())
            .chain(self.overlays.iter().filter_map(|overlay| overlay.bounding_box()));

        boxes.reduce(|(amin, amax), (bmin, bmax)| {
            (
                Point3::new(amin.x.min(bmin.x), amin.y.min(bmin.y), amin.z.min(bmin.z)),
                Point3::new(amax.x.max(bmax.x), amax.y.max(bmax.y), amax.z.max(bmax.z)),
            )
        })
    }
}

/// Opaque render-pass identity handed out by [`RenderContext::begin_pass`].
/// A continuation resumed after an await revalidates its token before
/// touching the group, so a stale decode can never overwrite content
/// installed by a newer pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PassToken(u64);

/// Explicitly-passed scene state: the PCB group, the camera, and the
/// render-pass generation counter. Replaces ambient module-level scene
/// globals; every pipeline stage that mutates the scene receives this.
#[derive(Debug, Default)]
pub struct RenderContext {
    pub group: PcbGroup,
    pub camera: CameraState,
    generation: u64,
}

impl RenderContext {
    pub fn init() -> Self {
        Self::default()
    }

    /// Start a render pass: unconditionally clear the group (stale
    /// geometry must never survive into a failed pass) and invalidate
    /// every outstanding pass token.
    pub fn begin_pass(&mut self) -> PassToken {
        self.generation += 1;
        self.group.clear();
        PassToken(self.generation)
    }

    pub fn pass_is_current(&self, token: PassToken) -> bool {
        token.0 == self.generation
    }
}

fn aabb_of(points: impl Iterator<Item = Point3<f32>>) -> Option<(Point3<f32>, Point3<f32>)> {
    points.fold(None, |acc, p| match acc {
        None => Some((p, p)),
        Some((min, max)) => Some((
            Point3::new(min.x.min(p.x), min.y.min(p.y), min.z.min(p.z)),
            Point3::new(max.x.max(p.x), max.y.max(p.y), max.z.max(p.z)),
        )),
    })
}
