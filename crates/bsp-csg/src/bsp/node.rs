//! BSP tree node implementation.

use crate::Plane;

use super::polygon_tree::{PolygonNodeId, PolygonSide, PolygonTree};
use super::selector::PlaneSelector;

/// A node in the BSP tree.
///
/// Each node partitions space using a splitting plane and references the
/// polygon-tree nodes that are coplanar with that plane. Fragments in front
/// of or behind the plane are handed to the respective child subtrees.
///
/// # Coplanar Polygon Storage
///
/// Coplanar fragments facing either way are kept together in one list. The
/// facing direction matters only while clipping, where it is recomputed
/// against the clipping plane.
#[derive(Debug, Clone, Default)]
pub struct BspNode {
    /// The splitting plane for this node, chosen from the first batch of
    /// polygons that reaches it.
    plane: Option<Plane>,

    /// Polygon-tree nodes coplanar with the plane.
    polygon_nodes: Vec<PolygonNodeId>,

    /// Subtree for fragments in FRONT of the splitting plane.
    front: Option<Box<BspNode>>,

    /// Subtree for fragments BEHIND the splitting plane.
    back: Option<Box<BspNode>>,
}

impl BspNode {
    /// Creates an empty node without a plane.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the splitting plane, if one has been chosen.
    #[inline]
    pub fn plane(&self) -> Option<&Plane> {
        self.plane.as_ref()
    }

    /// Returns the polygon-tree nodes coplanar with this node's plane.
    #[inline]
    pub fn polygon_nodes(&self) -> &[PolygonNodeId] {
        &self.polygon_nodes
    }

    /// Returns a reference to the front child subtree.
    #[inline]
    pub fn front(&self) -> Option<&BspNode> {
        self.front.as_deref()
    }

    /// Returns a reference to the back child subtree.
    #[inline]
    pub fn back(&self) -> Option<&BspNode> {
        self.back.as_deref()
    }

    /// Checks if this node has any children.
    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.front.is_none() && self.back.is_none()
    }

    /// Returns the number of coplanar references in this subtree (including all descendants).
    pub fn polygon_node_count(&self) -> usize {
        let mut count = self.polygon_nodes.len();

        if let Some(ref front) = self.front {
            count += front.polygon_node_count();
        }
        if let Some(ref back) = self.back {
            count += back.polygon_node_count();
        }

        count
    }

    /// Returns the depth of this subtree (1 for a leaf node).
    pub fn depth(&self) -> usize {
        let front_depth = self.front.as_ref().map_or(0, |n| n.depth());
        let back_depth = self.back.as_ref().map_or(0, |n| n.depth());
        1 + front_depth.max(back_depth)
    }

    /// Turns the subtree inside out: every plane is flipped and the front and
    /// back subtrees trade places.
    pub fn invert(&mut self) {
        if let Some(plane) = self.plane.as_mut() {
            *plane = plane.flipped();
        }
        if let Some(front) = self.front.as_mut() {
            front.invert();
        }
        if let Some(back) = self.back.as_mut() {
            back.invert();
        }
        std::mem::swap(&mut self.front, &mut self.back);
    }

    /// Files polygon-tree nodes into this subtree.
    ///
    /// A node without a plane adopts the one picked by `selector`. Coplanar
    /// fragments stay here, front and back fragments go to child subtrees
    /// that are created on demand.
    pub fn add_polygon_nodes<S: PlaneSelector>(
        &mut self,
        tree: &mut PolygonTree,
        nodes: Vec<PolygonNodeId>,
        selector: &S,
    ) {
        if nodes.is_empty() {
            return;
        }
        if self.plane.is_none() {
            self.plane = selector.select(tree, &nodes);
        }
        let Some(plane) = self.plane else {
            return;
        };

        let mut front_nodes = Vec::new();
        let mut back_nodes = Vec::new();
        let coplanar = &mut self.polygon_nodes;
        for id in nodes {
            tree.split_by_plane(id, &plane, &mut |side, node| match side {
                PolygonSide::CoplanarFront | PolygonSide::CoplanarBack => coplanar.push(node),
                PolygonSide::Front => front_nodes.push(node),
                PolygonSide::Back => back_nodes.push(node),
            });
        }

        if !front_nodes.is_empty() {
            self.front
                .get_or_insert_with(Box::default)
                .add_polygon_nodes(tree, front_nodes, selector);
        }
        if !back_nodes.is_empty() {
            self.back
                .get_or_insert_with(Box::default)
                .add_polygon_nodes(tree, back_nodes, selector);
        }
    }

    /// Removes the parts of `nodes` that lie inside the solid this subtree
    /// bounds.
    ///
    /// Fragments coplanar with a plane and facing the same way are kept
    /// unless `also_remove_coplanar_front` is set; fragments facing the
    /// opposite way are treated as inside. Fragments reaching a missing back
    /// subtree are removed from the polygon tree.
    pub fn clip_polygon_nodes(
        &self,
        tree: &mut PolygonTree,
        nodes: &[PolygonNodeId],
        also_remove_coplanar_front: bool,
    ) {
        let Some(plane) = self.plane.as_ref() else {
            return;
        };

        let mut front_nodes = Vec::new();
        let mut back_nodes = Vec::new();
        for &id in nodes {
            if tree.is_removed(id) {
                continue;
            }
            tree.split_by_plane(id, plane, &mut |side, node| match side {
                PolygonSide::CoplanarFront if !also_remove_coplanar_front => front_nodes.push(node),
                PolygonSide::Front => front_nodes.push(node),
                PolygonSide::CoplanarFront | PolygonSide::CoplanarBack | PolygonSide::Back => {
                    back_nodes.push(node)
                }
            });
        }

        if let Some(front) = self.front.as_deref() {
            if !front_nodes.is_empty() {
                front.clip_polygon_nodes(tree, &front_nodes, also_remove_coplanar_front);
            }
        }
        match self.back.as_deref() {
            Some(back) => {
                if !back_nodes.is_empty() {
                    back.clip_polygon_nodes(tree, &back_nodes, also_remove_coplanar_front);
                }
            }
            None => {
                for id in back_nodes {
                    tree.remove(id);
                }
            }
        }
    }

    /// Clips every fragment referenced by this subtree against `clipper`.
    pub fn clip_to(&self, tree: &mut PolygonTree, clipper: &BspNode, also_remove_coplanar_front: bool) {
        clipper.clip_polygon_nodes(tree, &self.polygon_nodes, also_remove_coplanar_front);
        if let Some(front) = self.front.as_deref() {
            front.clip_to(tree, clipper, also_remove_coplanar_front);
        }
        if let Some(back) = self.back.as_deref() {
            back.clip_to(tree, clipper, also_remove_coplanar_front);
        }
    }
}
