//! End-to-end render pass scenarios against a stub compositor.

use futures::future::{self, BoxFuture, FutureExt};
use futures::executor::block_on;

use boardlens_core::{
    BoardAssembler, BoardSide, ColorConfig, CompositeDocument, CompositorError, LayerKind,
    LayerRecord, OutlineSource, RenderContext, RenderOutcome, StackupCompositor, StackupResult,
    TypedLayer, Units,
};
use boardlens_core::geometry::BoundingBox;
use boardlens_core::stackup::kind_from_name;

/// Compositor stub that resolves with a canned stackup (or rejection).
struct FixedCompositor {
    result: Result<StackupResult, String>,
}

impl StackupCompositor for FixedCompositor {
    fn compose<'a>(
        &'a self,
        _layers: &'a [LayerRecord],
        _colors: &'a ColorConfig,
    ) -> BoxFuture<'a, Result<StackupResult, CompositorError>> {
        let result = self
            .result
            .clone()
            .map_err(CompositorError::Failed);
        future::ready(result).boxed()
    }
}

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn side_document(name: &str) -> CompositeDocument {
    CompositeDocument {
        name: name.into(),
        markup: r##"<svg><rect x="0" y="0" width="100" height="50" fill="#006450"/></svg>"##
            .into(),
        bounds: Some(BoundingBox::new(0.0, 0.0, 100.0, 50.0)),
        width: 100.0,
        height: 50.0,
        units: Units::Millimeters,
    }
}

fn outline_fragments_layer() -> TypedLayer {
    TypedLayer {
        kind: kind_from_name("board-Edge_Cuts.gbr"),
        name: "board-Edge_Cuts.gbr".into(),
        outline: Some(OutlineSource::Fragments {
            fragments: vec!["M0 0 L100 0 L100 50 L0 50 Z".into()],
            view_box: BoundingBox::new(0.0, 0.0, 100.0, 50.0),
            width: 100.0,
            height: 50.0,
            units: Units::Millimeters,
        }),
    }
}

fn full_stackup() -> StackupResult {
    StackupResult {
        top: Some(side_document("top")),
        bottom: Some(side_document("bottom")),
        layers: vec![
            TypedLayer {
                kind: kind_from_name("board-F_Cu.gbr"),
                name: "board-F_Cu.gbr".into(),
                outline: None,
            },
            outline_fragments_layer(),
        ],
    }
}

fn assembler_for(result: Result<StackupResult, String>) -> BoardAssembler {
    BoardAssembler::new(Box::new(FixedCompositor { result }))
}

#[test]
fn scenario_full_stackup_renders_solid_and_two_overlays() {
    init_logging();
    let mut assembler = assembler_for(Ok(full_stackup()));
    let mut ctx = RenderContext::init();

    let outcome = block_on(assembler.render_all_views(
        &mut ctx,
        &[LayerRecord::new("board-Edge_Cuts.gbr", "...")],
        &ColorConfig::default(),
    ))
    .unwrap();

    assert_eq!(outcome, RenderOutcome::Rendered { overlays: 2 });
    assert!(outcome.is_rendered());
    assert_eq!(ctx.group.child_count(), 3);

    // Solid span 100x50, thickness 1.6, upright in the X-Z plane
    let solid = ctx.group.solid().unwrap();
    assert!((solid.solid.span.0 - 100.0).abs() < 1e-6);
    assert!((solid.solid.span.1 - 50.0).abs() < 1e-6);
    assert!((solid.solid.thickness - 1.6).abs() < 1e-12);

    // Overlays sit just outside the faces at +/-(0.8 + clearance)
    let clearance = boardlens_core::constants::OVERLAY_CLEARANCE;
    let expected = (1.6 / 2.0 + clearance) as f32;
    let top = ctx.group.overlay(BoardSide::Top).unwrap();
    let bottom = ctx.group.overlay(BoardSide::Bottom).unwrap();
    assert!((top.center.y - expected).abs() < 1e-6);
    assert!((bottom.center.y + expected).abs() < 1e-6);

    // Texture resolution follows the 2:1 bounds
    assert_eq!((top.texture.width(), top.texture.height()), (2048, 1024));
    assert!((top.texture.aspect - 2.0).abs() < 1e-9);
    assert!(!top.texture.flip_y);

    // Camera was retargeted to the origin and pulled back
    assert_eq!(ctx.camera.target, nalgebra::Point3::origin());
    assert!(ctx.camera.distance() > 50.0);
}

#[test]
fn scenario_missing_outline_leaves_group_empty() {
    init_logging();
    let stackup = StackupResult {
        top: Some(side_document("top")),
        bottom: None,
        layers: vec![TypedLayer {
            kind: LayerKind::TopCopper,
            name: "board-F_Cu.gbr".into(),
            outline: None,
        }],
    };
    let mut assembler = assembler_for(Ok(stackup));
    let mut ctx = RenderContext::init();

    let outcome = block_on(assembler.render_all_views(&mut ctx, &[], &ColorConfig::default()))
        .unwrap();

    assert_eq!(outcome, RenderOutcome::NoOutline);
    assert!(ctx.group.is_empty());
}

#[test]
fn scenario_missing_bottom_renders_top_only() {
    init_logging();
    let mut stackup = full_stackup();
    stackup.bottom = None;

    let mut assembler = assembler_for(Ok(stackup));
    let mut ctx = RenderContext::init();

    let outcome = block_on(assembler.render_all_views(&mut ctx, &[], &ColorConfig::default()))
        .unwrap();

    assert_eq!(outcome, RenderOutcome::Rendered { overlays: 1 });
    assert_eq!(ctx.group.child_count(), 2);
    assert!(ctx.group.overlay(BoardSide::Top).is_some());
    assert!(ctx.group.overlay(BoardSide::Bottom).is_none());
}

#[test]
fn bad_side_artwork_skips_that_side_only() {
    init_logging();
    let mut stackup = full_stackup();
    if let Some(bottom) = stackup.bottom.as_mut() {
        bottom.bounds = Some(BoundingBox::new(0.0, 0.0, 0.0, 0.0));
    }

    let mut assembler = assembler_for(Ok(stackup));
    let mut ctx = RenderContext::init();

    let outcome = block_on(assembler.render_all_views(&mut ctx, &[], &ColorConfig::default()))
        .unwrap();

    assert_eq!(outcome, RenderOutcome::Rendered { overlays: 1 });
    assert!(ctx.group.overlay(BoardSide::Top).is_some());
    assert!(ctx.group.overlay(BoardSide::Bottom).is_none());
}

#[test]
fn outline_without_geometry_reports_no_geometry() {
    init_logging();
    let mut stackup = full_stackup();
    stackup.layers = vec![TypedLayer {
        kind: LayerKind::Outline,
        name: "empty".into(),
        outline: Some(OutlineSource::Markup("<svg></svg>".into())),
    }];

    let mut assembler = assembler_for(Ok(stackup));
    let mut ctx = RenderContext::init();

    let outcome = block_on(assembler.render_all_views(&mut ctx, &[], &ColorConfig::default()))
        .unwrap();

    assert_eq!(outcome, RenderOutcome::NoGeometry);
    assert!(ctx.group.is_empty());
}

#[test]
fn compositor_rejection_aborts_pass_and_keeps_previous_board() {
    init_logging();
    let mut assembler = assembler_for(Ok(full_stackup()));
    let mut ctx = RenderContext::init();

    block_on(assembler.render_all_views(&mut ctx, &[], &ColorConfig::default())).unwrap();
    assert_eq!(ctx.group.child_count(), 3);

    // Second pass fails before orchestration begins: the rendered board
    // stays, the error surfaces
    let mut failing = assembler_for(Err("no copper layers".into()));
    let result = block_on(failing.render_all_views(&mut ctx, &[], &ColorConfig::default()));
    assert!(result.is_err());
    assert_eq!(ctx.group.child_count(), 3);
}

#[test]
fn rerender_is_idempotent() {
    init_logging();
    let mut assembler = assembler_for(Ok(full_stackup()));
    let mut ctx = RenderContext::init();
    let colors = ColorConfig::default();

    block_on(assembler.render_all_views(&mut ctx, &[], &colors)).unwrap();
    let first_count = ctx.group.child_count();
    let first_bbox = ctx.group.bounding_box().unwrap();

    block_on(assembler.render_all_views(&mut ctx, &[], &colors)).unwrap();
    let second_count = ctx.group.child_count();
    let second_bbox = ctx.group.bounding_box().unwrap();

    assert_eq!(first_count, second_count);
    let (amin, amax) = first_bbox;
    let (bmin, bmax) = second_bbox;
    assert!((amin - bmin).norm() < 1e-6);
    assert!((amax - bmax).norm() < 1e-6);
}

#[test]
fn export_uses_cached_stackup() {
    init_logging();
    let mut assembler = assembler_for(Ok(full_stackup()));
    let mut ctx = RenderContext::init();

    // Export before any render has nothing to serve
    assert!(assembler.export_side_image(BoardSide::Top, 300.0).is_err());

    block_on(assembler.render_all_views(&mut ctx, &[], &ColorConfig::default())).unwrap();

    let png = assembler.export_side_image(BoardSide::Top, 300.0).unwrap();
    assert_eq!(&png[..4], &[0x89, b'P', b'N', b'G']);
}
