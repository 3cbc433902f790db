//! BSP tree container and construction.

use tracing::trace;

use crate::Polygon;

use super::node::BspNode;
use super::polygon_tree::PolygonTree;
use super::selector::{FirstPolygon, PlaneSelector};

/// A Binary Space Partitioning tree over the polygons of one solid.
///
/// The tree pairs a [`PolygonTree`], which owns the polygons and tracks how
/// they have been split, with a hierarchy of [`BspNode`]s whose planes
/// partition space. Clipping one tree against another removes the fragments
/// that fall inside the other solid; [`BspTree::all_polygons`] then
/// reassembles what survived.
///
/// # Construction
///
/// ```ignore
/// use bsp_csg::{BspTree, Polygon};
///
/// let polygons: Vec<Polygon> = /* ... */;
/// let mut a = BspTree::new(polygons);
/// ```
///
/// Splitting planes are picked with a [`PlaneSelector`]; [`FirstPolygon`]
/// is the default.
#[derive(Debug, Clone)]
pub struct BspTree<S = FirstPolygon> {
    polygon_tree: PolygonTree,
    root: BspNode,
    selector: S,
}

impl BspTree {
    /// Builds a BSP tree using the default plane selector ([`FirstPolygon`]).
    pub fn new(polygons: Vec<Polygon>) -> Self {
        Self::with_selector(polygons, FirstPolygon)
    }
}

impl<S: PlaneSelector> BspTree<S> {
    /// Builds a BSP tree, choosing splitting planes with `selector`.
    pub fn with_selector(polygons: Vec<Polygon>, selector: S) -> Self {
        let mut tree = Self {
            polygon_tree: PolygonTree::new(),
            root: BspNode::new(),
            selector,
        };
        tree.add_polygons(polygons);
        tree
    }

    /// Files additional polygons into the existing tree.
    pub fn add_polygons(&mut self, polygons: Vec<Polygon>) {
        if polygons.is_empty() {
            return;
        }
        trace!(count = polygons.len(), "adding polygons to bsp tree");
        let ids = self.polygon_tree.add_polygons(polygons);
        self.root
            .add_polygon_nodes(&mut self.polygon_tree, ids, &self.selector);
    }

    /// Turns the solid inside out.
    pub fn invert(&mut self) {
        self.polygon_tree.invert();
        self.root.invert();
    }

    /// Removes every fragment of this tree that lies inside `other`.
    ///
    /// With `also_remove_coplanar_front`, fragments lying on a boundary of
    /// `other` and facing the same way are removed as well.
    pub fn clip_to<T>(&mut self, other: &BspTree<T>, also_remove_coplanar_front: bool) {
        self.root
            .clip_to(&mut self.polygon_tree, &other.root, also_remove_coplanar_front);
    }

    /// Collects the surviving polygons, reassembling fragments whose
    /// siblings all survived.
    pub fn all_polygons(&self) -> Vec<Polygon> {
        self.polygon_tree.polygons()
    }

    /// Returns the root node.
    #[inline]
    pub fn root(&self) -> &BspNode {
        &self.root
    }

    /// Returns the polygon tree.
    #[inline]
    pub fn polygon_tree(&self) -> &PolygonTree {
        &self.polygon_tree
    }

    /// Returns `true` if the tree has no splitting plane, i.e. it was built
    /// from no polygons.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.root.plane().is_none()
    }

    /// Returns the maximum depth of the tree (0 for empty tree).
    pub fn depth(&self) -> usize {
        if self.is_empty() { 0 } else { self.root.depth() }
    }
}
