//! Plane selection strategies for BSP tree construction.
//!
//! The choice of splitting plane affects tree balance and the number of
//! polygon splits during construction. Different strategies offer different
//! trade-offs between build time and tree quality.

use crate::Plane;

use super::polygon_tree::{PolygonNodeId, PolygonTree};

/// Strategy for selecting the splitting plane of a BSP node.
///
/// The candidates are the polygon-tree nodes that first reach a node without
/// a plane. Different strategies can optimize for:
/// - Build speed (simple selection)
/// - Tree balance (minimize depth)
/// - Minimal splits (preserve original polygons)
pub trait PlaneSelector {
    /// Select the plane of one of the candidate polygons.
    ///
    /// Returns `None` if there are no candidates.
    fn select(&self, tree: &PolygonTree, candidates: &[PolygonNodeId]) -> Option<Plane>;
}

/// Selects the plane of the first candidate.
///
/// This is the simplest and fastest selector, but may produce unbalanced
/// trees depending on input order.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstPolygon;

impl PlaneSelector for FirstPolygon {
    fn select(&self, tree: &PolygonTree, candidates: &[PolygonNodeId]) -> Option<Plane> {
        candidates.first().map(|&id| *tree.polygon(id).plane())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Polygon, Shared};
    use nalgebra::Point3;

    fn make_triangle(a: [f64; 3], b: [f64; 3], c: [f64; 3]) -> Polygon {
        Polygon::from_points(
            &[Point3::from(a), Point3::from(b), Point3::from(c)],
            Shared::default(),
        )
    }

    #[test]
    fn first_polygon_empty_list() {
        let tree = PolygonTree::new();
        assert!(FirstPolygon.select(&tree, &[]).is_none());
    }

    #[test]
    fn first_polygon_multiple() {
        let mut tree = PolygonTree::new();
        let poly1 = make_triangle([0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]);
        let poly2 = make_triangle([0.0, 0.0, 1.0], [1.0, 0.0, 1.0], [0.0, 0.0, 2.0]);
        let ids = tree.add_polygons([poly1.clone(), poly2]);

        assert_eq!(FirstPolygon.select(&tree, &ids), Some(*poly1.plane()));
    }
}
