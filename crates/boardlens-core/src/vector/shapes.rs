//! Shape extraction: closed contours in, planar shapes with holes out.
//!
//! Winding is resolved by containment depth so that an inner contour
//! becomes a hole of its enclosing outer contour regardless of the order
//! the contours were declared in, matching even-odd fill evaluation.

use nalgebra::Point2;

use crate::geometry::{contains_point, shoelace_area};

/// A closed 2D contour with zero or more hole contours.
#[derive(Debug, Clone)]
pub struct PlanarShape {
    pub exterior: Vec<Point2<f64>>,
    pub holes: Vec<Vec<Point2<f64>>>,
}

impl PlanarShape {
    pub fn new(exterior: Vec<Point2<f64>>) -> Self {
        Self {
            exterior,
            holes: Vec::new(),
        }
    }

    pub fn with_holes(mut self, holes: Vec<Vec<Point2<f64>>>) -> Self {
        self.holes = holes;
        self
    }

    /// 2D area: exterior minus holes.
    pub fn area(&self) -> f64 {
        let exterior_area = shoelace_area(&self.exterior).abs();
        let holes_area: f64 = self.holes.iter().map(|hole| shoelace_area(hole).abs()).sum();
        exterior_area - holes_area
    }

    pub fn is_valid(&self) -> bool {
        self.exterior.len() >= 3 && self.holes.iter().all(|hole| hole.len() >= 3)
    }
}

/// Extract planar shapes from vector markup. Malformed or empty markup
/// yields an empty list, never an error.
pub fn extract_shapes(markup: &str) -> Vec<PlanarShape> {
    let shapes = build_shapes(super::path::parse_contours(markup));
    if shapes.is_empty() {
        log::info!("no closed shapes extracted from markup");
    }
    shapes
}

/// Group closed contours into shapes by containment nesting.
///
/// Contours are classified largest-first: a contour enclosed by an outer
/// contour becomes that outer's hole; a contour enclosed by a hole is an
/// island and starts a new shape.
pub fn build_shapes(contours: Vec<Vec<Point2<f64>>>) -> Vec<PlanarShape> {
    let mut measured: Vec<(Vec<Point2<f64>>, f64)> = contours
        .into_iter()
        .map(|contour| {
            let area = shoelace_area(&contour).abs();
            (contour, area)
        })
        .filter(|(_, area)| *area > f64::EPSILON)
        .collect();
    measured.sort_by(|a, b| b.1.total_cmp(&a.1));

    // (contour, is_hole, owning shape index)
    let mut classified: Vec<(Vec<Point2<f64>>, bool, usize)> = Vec::new();
    let mut shapes: Vec<PlanarShape> = Vec::new();

    for (contour, _area) in measured {
        let probe = contour[0];

        // Innermost already-classified contour enclosing this one.
        // Classified contours are all at least as large, and the list is
        // scanned newest-first so the tightest parent wins.
        let parent = classified
            .iter()
            .rev()
            .find(|(candidate, _, _)| contains_point(candidate, probe));

        match parent {
            Some((_, false, shape_index)) => {
                let shape_index = *shape_index;
                shapes[shape_index].holes.push(contour.clone());
                classified.push((contour, true, shape_index));
            }
            // No parent, or parent is a hole: island, new shape
            _ => {
                shapes.push(PlanarShape::new(contour.clone()));
                classified.push((contour, false, shapes.len() - 1));
            }
        }
    }

    shapes
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(origin: f64, size: f64) -> Vec<Point2<f64>> {
        vec![
            Point2::new(origin, origin),
            Point2::new(origin + size, origin),
            Point2::new(origin + size, origin + size),
            Point2::new(origin, origin + size),
        ]
    }

    #[test]
    fn test_single_contour() {
        let shapes = build_shapes(vec![square(0.0, 10.0)]);
        assert_eq!(shapes.len(), 1);
        assert!(shapes[0].holes.is_empty());
        assert!((shapes[0].area() - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_square_with_square_hole() {
        let shapes = build_shapes(vec![square(0.0, 10.0), square(3.0, 4.0)]);
        assert_eq!(shapes.len(), 1);
        assert_eq!(shapes[0].holes.len(), 1);
        assert!((shapes[0].area() - 84.0).abs() < 1e-9);
    }

    #[test]
    fn test_hole_declared_before_outer() {
        // Same nesting, reversed declaration order
        let shapes = build_shapes(vec![square(3.0, 4.0), square(0.0, 10.0)]);
        assert_eq!(shapes.len(), 1);
        assert_eq!(shapes[0].holes.len(), 1);
    }

    #[test]
    fn test_island_inside_hole() {
        let shapes = build_shapes(vec![square(0.0, 20.0), square(4.0, 12.0), square(8.0, 4.0)]);
        assert_eq!(shapes.len(), 2);
        assert_eq!(shapes[0].holes.len(), 1);
        assert!(shapes[1].holes.is_empty());
    }

    #[test]
    fn test_disjoint_contours_are_separate_shapes() {
        let shapes = build_shapes(vec![square(0.0, 5.0), square(10.0, 5.0)]);
        assert_eq!(shapes.len(), 2);
    }

    #[test]
    fn test_degenerate_contour_dropped() {
        let line = vec![
            Point2::new(0.0, 0.0),
            Point2::new(5.0, 0.0),
            Point2::new(10.0, 0.0),
        ];
        assert!(build_shapes(vec![line]).is_empty());
    }

    #[test]
    fn test_extract_from_markup() {
        let markup =
            r#"<svg><path d="M0 0 L10 0 L10 10 L0 10 Z M3 3 L7 3 L7 7 L3 7 Z"/></svg>"#;
        let shapes = extract_shapes(markup);
        assert_eq!(shapes.len(), 1);
        assert_eq!(shapes[0].holes.len(), 1);
    }

    #[test]
    fn test_extract_malformed_is_empty() {
        assert!(extract_shapes("not markup at all").is_empty());
        assert!(extract_shapes("").is_empty());
    }
}
