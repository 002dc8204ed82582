//! Solid builder: extruded board substrate mesh from planar shapes.
//!
//! Caps are triangulated with hole support via earcutr, side walls are
//! generated for the exterior and every hole ring, and the finished mesh
//! is mirrored into world handedness and centered on the origin.

use nalgebra::{Point2, Point3, Vector3};

use crate::geometry::shoelace_area;
use crate::vector::PlanarShape;

/// 3D mesh representation for rendering.
#[derive(Debug, Clone, Default)]
pub struct Mesh3D {
    pub vertices: Vec<Point3<f32>>,
    pub indices: Vec<u32>,
    pub normals: Vec<Vector3<f32>>,
    pub uvs: Vec<Point2<f32>>,
}

impl Mesh3D {
    pub fn new() -> Self {
        Self::default()
    }

    /// Axis-aligned bounding box, or `None` for an empty mesh.
    pub fn bounding_box(&self) -> Option<(Point3<f32>, Point3<f32>)> {
        let first = self.vertices.first()?;
        let (mut min, mut max) = (*first, *first);

        for vertex in &self.vertices {
            min.x = min.x.min(vertex.x);
            min.y = min.y.min(vertex.y);
            min.z = min.z.min(vertex.z);
            max.x = max.x.max(vertex.x);
            max.y = max.y.max(vertex.y);
            max.z = max.z.max(vertex.z);
        }

        Some((min, max))
    }

    pub fn translate(&mut self, offset: Vector3<f32>) {
        for vertex in &mut self.vertices {
            *vertex += offset;
        }
    }

    pub fn stats(&self) -> MeshStats {
        MeshStats {
            vertex_count: self.vertices.len(),
            triangle_count: self.indices.len() / 3,
            has_normals: !self.normals.is_empty(),
            has_uvs: !self.uvs.is_empty(),
        }
    }

    /// Accumulate face normals at vertices, then normalize.
    fn calculate_normals(&mut self) {
        self.normals.clear();
        self.normals.resize(self.vertices.len(), Vector3::zeros());

        for triangle in self.indices.chunks(3) {
            if triangle.len() == 3 {
                let v0 = self.vertices[triangle[0] as usize];
                let v1 = self.vertices[triangle[1] as usize];
                let v2 = self.vertices[triangle[2] as usize];

                let normal = (v1 - v0).cross(&(v2 - v0));
                if normal.magnitude() > 0.0 {
                    let normal = normal.normalize();
                    self.normals[triangle[0] as usize] += normal;
                    self.normals[triangle[1] as usize] += normal;
                    self.normals[triangle[2] as usize] += normal;
                }
            }
        }

        for normal in &mut self.normals {
            if normal.magnitude() > 0.0 {
                *normal = normal.normalize();
            }
        }
    }

    /// Project bounding-box-relative UVs onto every vertex.
    fn generate_uvs(&mut self) {
        self.uvs.clear();
        self.uvs.reserve(self.vertices.len());

        if let Some((min_pt, max_pt)) = self.bounding_box() {
            let size_x = max_pt.x - min_pt.x;
            let size_y = max_pt.y - min_pt.y;

            for vertex in &self.vertices {
                let u = if size_x > 0.0 { (vertex.x - min_pt.x) / size_x } else { 0.0 };
                let v = if size_y > 0.0 { (vertex.y - min_pt.y) / size_y } else { 0.0 };
                self.uvs.push(Point2::new(u, v));
            }
        } else {
            self.uvs.resize(self.vertices.len(), Point2::new(0.0, 0.0));
        }
    }
}

#[derive(Debug, Clone)]
pub struct MeshStats {
    pub vertex_count: usize,
    pub triangle_count: usize,
    pub has_normals: bool,
    pub has_uvs: bool,
}

/// The extruded, centered board substrate for one render pass.
#[derive(Debug, Clone)]
pub struct BoardSolid {
    pub mesh: Mesh3D,
    /// Extrusion depth along the local Z axis.
    pub thickness: f64,
    /// In-plane extents (X, Y) after transform.
    pub span: (f64, f64),
}

/// Build the board solid from extracted shapes.
///
/// The coordinate reconciliation transform negates both in-plane axes
/// (artwork X mirrors to the physical top view, document Y runs downward)
/// and applies `scale` — 1.0 for ready markup, declared-width over
/// view-box-width for the raw-fragment outline representation. The mesh
/// is then translated so its bounding box is centered on the origin in
/// all three axes.
///
/// Returns `None` for an empty shape list; the caller treats that as
/// "nothing to render".
pub fn build_board_solid(shapes: &[PlanarShape], thickness: f64, scale: f64) -> Option<BoardSolid> {
    if shapes.is_empty() {
        return None;
    }

    let mut mesh = Mesh3D::new();

    for shape in shapes {
        if !shape.is_valid() {
            log::warn!("skipping invalid shape ({} exterior points)", shape.exterior.len());
            continue;
        }
        if let Err(err) = extrude_shape(&mut mesh, shape, thickness, scale) {
            log::warn!("failed to extrude shape: {err}");
        }
    }

    if mesh.vertices.is_empty() {
        return None;
    }

    mesh.calculate_normals();
    mesh.generate_uvs();

    // Center the bounding box on the origin in all three axes
    let (min, max) = mesh.bounding_box()?;
    let mid = Vector3::new(
        (min.x + max.x) / 2.0,
        (min.y + max.y) / 2.0,
        (min.z + max.z) / 2.0,
    );
    mesh.translate(-mid);

    Some(BoardSolid {
        mesh,
        thickness,
        span: ((max.x - min.x) as f64, (max.y - min.y) as f64),
    })
}

fn extrude_shape(
    mesh: &mut Mesh3D,
    shape: &PlanarShape,
    thickness: f64,
    scale: f64,
) -> Result<(), String> {
    // Mirror both in-plane axes and scale; a double negation is a 180°
    // rotation, so contour winding survives the transform.
    let reconcile =
        |points: &[Point2<f64>]| -> Vec<Point2<f64>> {
            points.iter().map(|p| Point2::new(-p.x * scale, -p.y * scale)).collect()
        };

    // Normalize winding after transform: exterior counter-clockwise,
    // holes clockwise, which fixes cap orientation and wall normals.
    let mut rings: Vec<Vec<Point2<f64>>> = Vec::with_capacity(1 + shape.holes.len());

    let mut exterior = reconcile(&shape.exterior);
    if shoelace_area(&exterior) < 0.0 {
        exterior.reverse();
    }
    rings.push(exterior);

    for hole in &shape.holes {
        let mut ring = reconcile(hole);
        if shoelace_area(&ring) > 0.0 {
            ring.reverse();
        }
        rings.push(ring);
    }

    // Flatten in the earcutr layout: outer ring coordinates first, then
    // each hole, with hole_indices marking where each hole starts.
    let mut flat: Vec<f64> = Vec::new();
    let mut hole_indices: Vec<usize> = Vec::new();
    for (ring_index, ring) in rings.iter().enumerate() {
        if ring_index > 0 {
            hole_indices.push(flat.len() / 2);
        }
        for point in ring {
            flat.push(point.x);
            flat.push(point.y);
        }
    }

    let cap_triangles = earcutr::earcut(&flat, &hole_indices, 2)
        .map_err(|err| format!("triangulation failed: {err:?}"))?;

    let ring_point_count = flat.len() / 2;
    let base = mesh.vertices.len() as u32;
    let top_offset = ring_point_count as u32;

    // Bottom ring vertices at z=0, then top ring vertices at z=thickness
    for level in [0.0f32, thickness as f32] {
        for xy in flat.chunks_exact(2) {
            mesh.vertices.push(Point3::new(xy[0] as f32, xy[1] as f32, level));
        }
    }

    // Caps: bottom face winds downward, top face winds upward
    for triangle in cap_triangles.chunks_exact(3) {
        let (a, b, c) = (triangle[0] as u32, triangle[1] as u32, triangle[2] as u32);
        mesh.indices.extend_from_slice(&[base + a, base + c, base + b]);
        mesh.indices.extend_from_slice(&[
            base + top_offset + a,
            base + top_offset + b,
            base + top_offset + c,
        ]);
    }

    // Side walls: two triangles per edge of every ring. The winding
    // normalization above makes the same quad orientation face outward
    // on the exterior and into the cavity on holes.
    let mut ring_start = 0u32;
    for ring in &rings {
        let len = ring.len() as u32;
        for i in 0..len {
            let next = (i + 1) % len;

            let bottom_current = base + ring_start + i;
            let bottom_next = base + ring_start + next;
            let top_current = base + top_offset + ring_start + i;
            let top_next = base + top_offset + ring_start + next;

            mesh.indices.extend_from_slice(&[bottom_current, bottom_next, top_current]);
            mesh.indices.extend_from_slice(&[bottom_next, top_next, top_current]);
        }
        ring_start += len;
    }

    Ok(())
}
