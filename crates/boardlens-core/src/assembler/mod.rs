//! Board assembler: orchestrates outline extraction, solid building,
//! surface texturing and camera framing for one render pass.
//!
//! Failure policy follows the two-family taxonomy: input-data defects
//! (no outline, unusable outline representation, empty geometry, bad
//! side artwork) are logged and degrade the affected branch only, while
//! compositor failures abort the pass with an error the UI surfaces.

use nalgebra::{Point3, UnitQuaternion, Vector3};

use crate::compositor::{ColorConfig, LayerRecord, StackupCompositor};
use crate::constants::{BOARD_THICKNESS, LOG_TYPE_OUTLINE, LOG_TYPE_TEXTURE, OVERLAY_CLEARANCE};
use crate::error::{ExportError, RenderError};
use crate::scene::{
    frame_group, upright_rotation, OverlayMaterial, OverlaySurface, RenderContext, SolidNode,
};
use crate::solid::build_board_solid;
use crate::stackup::{BoardSide, OutlineSource, StackupResult, TypedLayer};
use crate::texture::{decode_texture, SurfaceTexture};
use crate::vector::extract_shapes;

/// Handled result of a render pass. Every variant except `Rendered` is a
/// recoverable, already-logged degradation; none of them is an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderOutcome {
    /// Solid installed with this many side overlays (0-2).
    Rendered { overlays: usize },
    /// Stackup carried no usable outline layer; group left empty.
    NoOutline,
    /// Outline existed but contained no drawable geometry; group left empty.
    NoGeometry,
    /// A newer render pass started while this one was suspended; its
    /// remaining work was abandoned.
    Superseded,
}

impl RenderOutcome {
    pub fn is_rendered(&self) -> bool {
        matches!(self, Self::Rendered { .. })
    }
}

/// Owns the pipeline collaborators and the last composited stackup.
pub struct BoardAssembler {
    compositor: Box<dyn StackupCompositor>,
    /// Extrusion depth of the substrate; standard 1.6 unless the
    /// surrounding configuration overrides it.
    pub board_thickness: f64,
    last_stackup: Option<StackupResult>,
}

impl BoardAssembler {
    pub fn new(compositor: Box<dyn StackupCompositor>) -> Self {
        Self {
            compositor,
            board_thickness: BOARD_THICKNESS,
            last_stackup: None,
        }
    }

    /// The most recent compositor output, kept for side exports.
    pub fn last_stackup(&self) -> Option<&StackupResult> {
        self.last_stackup.as_ref()
    }

    /// The UI-facing "render all views" operation: composite the loaded
    /// layer records, then rebuild the scene group from the result.
    pub async fn render_all_views(
        &mut self,
        ctx: &mut RenderContext,
        layers: &[LayerRecord],
        colors: &ColorConfig,
    ) -> Result<RenderOutcome, RenderError> {
        let stackup = self.compositor.compose(layers, colors).await?;
        self.last_stackup = Some(stackup.clone());
        Ok(self.assemble(ctx, &stackup, colors).await)
    }

    /// Rebuild the scene group from an already-composited stackup.
    ///
    /// The group is cleared first, unconditionally: even when a later
    /// step degrades, a previous board is never left rendered next to
    /// the failure.
    pub async fn assemble(
        &self,
        ctx: &mut RenderContext,
        stackup: &StackupResult,
        colors: &ColorConfig,
    ) -> RenderOutcome {
        let token = ctx.begin_pass();

        let Some(outline_layer) = stackup.outline_layer() else {
            log::warn!(target: LOG_TYPE_OUTLINE, "stackup has no outline layer; nothing to render");
            return RenderOutcome::NoOutline;
        };

        let Some((markup, scale)) = resolve_outline(outline_layer) else {
            log::warn!(
                target: LOG_TYPE_OUTLINE,
                "outline layer {} has no usable representation",
                outline_layer.name
            );
            return RenderOutcome::NoOutline;
        };

        let shapes = extract_shapes(&markup);
        if shapes.is_empty() {
            log::warn!(
                target: LOG_TYPE_OUTLINE,
                "outline layer {} contained no drawable geometry",
                outline_layer.name
            );
            return RenderOutcome::NoGeometry;
        }

        let Some(solid) = build_board_solid(&shapes, self.board_thickness, scale) else {
            log::warn!(target: LOG_TYPE_OUTLINE, "outline produced no solid");
            return RenderOutcome::NoGeometry;
        };

        let span = solid.span;
        let thickness = solid.thickness;
        ctx.group.set_solid(SolidNode::upright(solid, colors.substrate_rgba()));

        let mut overlays = 0;
        for side in BoardSide::all() {
            let Some(document) = stackup.side(side) else { continue };

            match decode_texture(document).await {
                Ok(texture) => {
                    if !ctx.pass_is_current(token) {
                        log::info!(
                            target: LOG_TYPE_TEXTURE,
                            "{side} texture finished after a newer render pass started; dropping it"
                        );
                        return RenderOutcome::Superseded;
                    }
                    ctx.group.add_overlay(build_overlay(side, span, thickness, texture));
                    overlays += 1;
                }
                // One side's failure must not cost the other side or the solid
                Err(err) => {
                    log::warn!(target: LOG_TYPE_TEXTURE, "skipping {side} overlay: {err}");
                }
            }
        }

        frame_group(&mut ctx.camera, &ctx.group);

        RenderOutcome::Rendered { overlays }
    }

    /// The UI-facing "export side as image at DPI" operation, served
    /// from the cached stackup.
    pub fn export_side_image(&self, side: BoardSide, dpi: f64) -> Result<Vec<u8>, ExportError> {
        let stackup = self.last_stackup.as_ref().ok_or(ExportError::NoStackup)?;
        crate::export::export_side_png(stackup, side, dpi)
    }
}

/// Resolve the outline layer's markup and reconciliation scale.
///
/// Ready markup carries scale 1.0; the raw-fragment representation is
/// synthesized into markup and scaled by declared width over view-box
/// width (declared width normalized to millimeters).
fn resolve_outline(layer: &TypedLayer) -> Option<(String, f64)> {
    match layer.outline.as_ref()? {
        OutlineSource::Markup(markup) => {
            if markup.trim().is_empty() {
                return None;
            }
            Some((markup.clone(), 1.0))
        }
        OutlineSource::Fragments {
            fragments,
            view_box,
            width,
            units,
            ..
        } => {
            if fragments.is_empty() || view_box.width() <= 0.0 {
                return None;
            }
            let paths: String = fragments
                .iter()
                .map(|d| format!(r#"<path d="{d}"/>"#))
                .collect();
            let markup = format!("<svg>{paths}</svg>");
            let scale = (width * units.to_millimeters()) / view_box.width();
            Some((markup, scale))
        }
    }
}

fn build_overlay(
    side: BoardSide,
    span: (f64, f64),
    thickness: f64,
    texture: SurfaceTexture,
) -> OverlaySurface {
    let offset = (thickness / 2.0 + OVERLAY_CLEARANCE) as f32;

    let (center, rotation) = match side {
        BoardSide::Top => (Point3::new(0.0, offset, 0.0), upright_rotation()),
        // Face-down and yaw-rotated 180° so the artwork reads correctly
        // from below
        BoardSide::Bottom => (
            Point3::new(0.0, -offset, 0.0),
            UnitQuaternion::from_axis_angle(&Vector3::y_axis(), std::f32::consts::PI)
                * UnitQuaternion::from_axis_angle(&Vector3::x_axis(), std::f32::consts::FRAC_PI_2),
        ),
    };

    OverlaySurface {
        side,
        width: span.0 as f32,
        height: span.1 as f32,
        center,
        rotation,
        texture,
        material: OverlayMaterial::cutout(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::BoundingBox;
    use crate::stackup::{LayerKind, Units};

    fn outline_layer(source: OutlineSource) -> TypedLayer {
        TypedLayer {
            kind: LayerKind::Outline,
            name: "outline".into(),
            outline: Some(source),
        }
    }

    #[test]
    fn test_resolve_ready_markup_has_unit_scale() {
        let layer = outline_layer(OutlineSource::Markup("<svg/>".into()));
        let (_, scale) = resolve_outline(&layer).unwrap();
        assert_eq!(scale, 1.0);
    }

    #[test]
    fn test_resolve_empty_markup_is_unusable() {
        let layer = outline_layer(OutlineSource::Markup("  ".into()));
        assert!(resolve_outline(&layer).is_none());

        let absent = TypedLayer {
            kind: LayerKind::Outline,
            name: "outline".into(),
            outline: None,
        };
        assert!(resolve_outline(&absent).is_none());
    }

    #[test]
    fn test_resolve_fragments_synthesizes_markup_and_scale() {
        let layer = outline_layer(OutlineSource::Fragments {
            fragments: vec!["M0 0 L100 0 L100 50 L0 50 Z".into()],
            view_box: BoundingBox::new(0.0, 0.0, 100.0, 50.0),
            width: 200.0,
            height: 100.0,
            units: Units::Millimeters,
        });
        let (markup, scale) = resolve_outline(&layer).unwrap();
        assert!(markup.contains("<path d=\"M0 0 L100 0 L100 50 L0 50 Z\"/>"));
        assert_eq!(scale, 2.0);
    }

    #[test]
    fn test_resolve_fragments_rejects_empty_and_degenerate() {
        let empty = outline_layer(OutlineSource::Fragments {
            fragments: vec![],
            view_box: BoundingBox::new(0.0, 0.0, 100.0, 50.0),
            width: 100.0,
            height: 50.0,
            units: Units::Millimeters,
        });
        assert!(resolve_outline(&empty).is_none());

        let degenerate = outline_layer(OutlineSource::Fragments {
            fragments: vec!["M0 0 L1 0 L1 1 Z".into()],
            view_box: BoundingBox::new(0.0, 0.0, 0.0, 50.0),
            width: 100.0,
            height: 50.0,
            units: Units::Millimeters,
        });
        assert!(resolve_outline(&degenerate).is_none());
    }

    #[test]
    fn test_overlay_offsets_clear_the_faces() {
        let texture = SurfaceTexture {
            image: image::RgbaImage::new(2, 2),
            aspect: 2.0,
            flip_y: false,
        };
        let top = build_overlay(BoardSide::Top, (100.0, 50.0), 1.6, texture.clone());
        let bottom = build_overlay(BoardSide::Bottom, (100.0, 50.0), 1.6, texture);

        let expected = (1.6f32 / 2.0) + OVERLAY_CLEARANCE as f32;
        assert!((top.center.y - expected).abs() < 1e-6);
        assert!((bottom.center.y + expected).abs() < 1e-6);
        assert_eq!(top.width, 100.0);
        assert_eq!(top.height, 50.0);
        assert_eq!(top.material, OverlayMaterial::cutout());
    }

    #[test]
    fn test_overlay_normals_face_away_from_board() {
        let texture = SurfaceTexture {
            image: image::RgbaImage::new(2, 2),
            aspect: 1.0,
            flip_y: false,
        };
        let top = build_overlay(BoardSide::Top, (10.0, 10.0), 1.6, texture.clone());
        let bottom = build_overlay(BoardSide::Bottom, (10.0, 10.0), 1.6, texture);

        let top_normal = top.rotation * Vector3::z();
        let bottom_normal = bottom.rotation * Vector3::z();
        assert!((top_normal - Vector3::y()).norm() < 1e-6);
        assert!((bottom_normal + Vector3::y()).norm() < 1e-6);

        // Yaw flip: the bottom overlay's local X runs opposite the top's
        let top_x = top.rotation * Vector3::x();
        let bottom_x = bottom.rotation * Vector3::x();
        assert!((top_x + bottom_x).norm() < 1e-6);
    }
}
