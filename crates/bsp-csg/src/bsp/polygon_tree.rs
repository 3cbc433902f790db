//! Split-tracking tree of polygon fragments.
//!
//! Every polygon fed into a [`BspTree`](super::BspTree) becomes a child of
//! the polygon tree's root. Splitting a polygon does not replace it: the
//! fragments are attached as children while the node keeps its original
//! polygon. Only when a fragment is removed during clipping does the
//! ancestor chain drop its polygons, so that collecting the surviving
//! polygons yields the unsplit original wherever nothing was clipped away.
//!
//! Nodes live in an arena and refer to each other by [`PolygonNodeId`].

use crate::config::BOUNDING_SPHERE_MARGIN;
use crate::cuttable::{Cuttable, Split};
use crate::{Plane, Polygon};

/// Index of a node in a [`PolygonTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PolygonNodeId(usize);

/// Where a polygon-tree node ended up relative to a splitting plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolygonSide {
    /// Coplanar and facing the same way as the plane.
    CoplanarFront,
    /// Coplanar and facing the opposite way.
    CoplanarBack,
    /// In front of the plane.
    Front,
    /// Behind the plane.
    Back,
}

#[derive(Debug, Clone, Default)]
struct PolygonTreeNode {
    parent: Option<PolygonNodeId>,
    children: Vec<PolygonNodeId>,
    polygon: Option<Polygon>,
    removed: bool,
}

/// Arena of polygon fragments, rooted at [`PolygonTree::ROOT`].
#[derive(Debug, Clone)]
pub struct PolygonTree {
    nodes: Vec<PolygonTreeNode>,
}

impl Default for PolygonTree {
    fn default() -> Self {
        Self::new()
    }
}

impl PolygonTree {
    /// The root node. It never holds a polygon.
    pub const ROOT: PolygonNodeId = PolygonNodeId(0);

    /// Creates a tree containing only the root.
    pub fn new() -> Self {
        Self {
            nodes: vec![PolygonTreeNode::default()],
        }
    }

    /// Adds polygons as children of the root and returns their ids.
    pub fn add_polygons(&mut self, polygons: impl IntoIterator<Item = Polygon>) -> Vec<PolygonNodeId> {
        polygons
            .into_iter()
            .map(|polygon| self.add_child(Self::ROOT, polygon))
            .collect()
    }

    fn add_child(&mut self, parent: PolygonNodeId, polygon: Polygon) -> PolygonNodeId {
        let id = PolygonNodeId(self.nodes.len());
        self.nodes.push(PolygonTreeNode {
            parent: Some(parent),
            children: Vec::new(),
            polygon: Some(polygon),
            removed: false,
        });
        self.nodes[parent.0].children.push(id);
        id
    }

    /// Total number of nodes ever allocated, including the root and removed nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_removed(&self, id: PolygonNodeId) -> bool {
        self.nodes[id.0].removed
    }

    /// Children of `id`, in insertion order.
    #[inline]
    pub fn children(&self, id: PolygonNodeId) -> &[PolygonNodeId] {
        &self.nodes[id.0].children
    }

    /// Returns the polygon of a node.
    ///
    /// # Panics
    /// Panics if the node has no polygon, which is the case for the root and
    /// for split nodes that lost their polygon when a fragment was removed.
    pub fn polygon(&self, id: PolygonNodeId) -> &Polygon {
        self.nodes[id.0]
            .polygon
            .as_ref()
            .expect("Polygon tree node must hold a polygon")
    }

    /// Splits the polygon of `id` by `plane`.
    ///
    /// A node that already has children forwards the split to its children.
    /// Otherwise the node is reported whole when it lies on one side
    /// (or in the plane), or receives front and back fragment children which
    /// are reported instead. Every reported node is passed to `sink`
    /// together with its side.
    pub fn split_by_plane<F>(&mut self, id: PolygonNodeId, plane: &Plane, sink: &mut F)
    where
        F: FnMut(PolygonSide, PolygonNodeId),
    {
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let children = &self.nodes[current.0].children;
            if !children.is_empty() {
                stack.extend(children.iter().rev().copied());
                continue;
            }

            let Some(polygon) = self.nodes[current.0].polygon.as_ref() else {
                continue;
            };

            let (center, radius) = polygon.bounding_sphere();
            let distance = plane.signed_distance(center);
            let reach = radius + BOUNDING_SPHERE_MARGIN;
            if distance > reach {
                sink(PolygonSide::Front, current);
                continue;
            }
            if distance < -reach {
                sink(PolygonSide::Back, current);
                continue;
            }

            match polygon.split(plane) {
                Split::CoplanarFront => sink(PolygonSide::CoplanarFront, current),
                Split::CoplanarBack => sink(PolygonSide::CoplanarBack, current),
                Split::Front => sink(PolygonSide::Front, current),
                Split::Back => sink(PolygonSide::Back, current),
                Split::Spanning { front, back } => {
                    if let Some(front) = front {
                        let child = self.add_child(current, front);
                        sink(PolygonSide::Front, child);
                    }
                    if let Some(back) = back {
                        let child = self.add_child(current, back);
                        sink(PolygonSide::Back, child);
                    }
                }
            }
        }
    }

    /// Discards a fragment that was clipped away.
    ///
    /// The node is detached from its parent and every ancestor that still
    /// holds its polygon drops it, since that polygon is no longer whole.
    /// Removing a node twice has no effect.
    ///
    /// # Panics
    /// Panics when called on the root or on a node that has been split.
    pub fn remove(&mut self, id: PolygonNodeId) {
        let node = &self.nodes[id.0];
        if node.removed {
            return;
        }
        let parent = node.parent.expect("Cannot remove the polygon tree root");
        assert!(
            node.children.is_empty(),
            "Cannot remove a polygon tree node that has been split"
        );

        self.nodes[id.0].removed = true;
        let siblings = &mut self.nodes[parent.0].children;
        let index = siblings
            .iter()
            .position(|&child| child == id)
            .expect("Polygon tree node must be listed by its parent");
        siblings.remove(index);

        let mut current = Some(parent);
        while let Some(ancestor) = current {
            let node = &mut self.nodes[ancestor.0];
            if node.polygon.take().is_none() {
                break;
            }
            current = node.parent;
        }
    }

    /// Flips every polygon in the tree.
    pub fn invert(&mut self) {
        for node in &mut self.nodes {
            if let Some(polygon) = node.polygon.as_mut() {
                *polygon = polygon.flipped();
            }
        }
    }

    /// Collects the surviving polygons.
    ///
    /// A node that still holds its polygon contributes it as a whole; a node
    /// that lost it contributes its children instead.
    pub fn polygons(&self) -> Vec<Polygon> {
        let mut result = Vec::new();
        let mut stack = vec![Self::ROOT];
        while let Some(current) = stack.pop() {
            let node = &self.nodes[current.0];
            match &node.polygon {
                Some(polygon) => result.push(polygon.clone()),
                None => stack.extend(node.children.iter().rev().copied()),
            }
        }
        result
    }
}
