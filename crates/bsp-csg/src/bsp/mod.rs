//! Binary Space Partitioning trees for constructive solid geometry.
//!
//! This module provides the BSP machinery behind the boolean operations on
//! [`Csg`](crate::Csg). A tree recursively partitions 3D space using planes
//! derived from its polygons and supports:
//!
//! - Clipping the polygons of one solid against the volume of another
//! - Inverting a solid (swapping inside and outside)
//! - Reassembling clipped fragments into the largest surviving pieces
//!
//! # Example
//!
//! ```ignore
//! use bsp_csg::{BspTree, Polygon};
//!
//! let mut a = BspTree::new(polygons_a);
//! let mut b = BspTree::new(polygons_b);
//!
//! // union: drop everything of each solid that lies inside the other
//! a.clip_to(&b, false);
//! b.clip_to(&a, true);
//!
//! let mut polygons = a.all_polygons();
//! polygons.extend(b.all_polygons());
//! ```
//!
//! # Architecture
//!
//! - [`BspTree`]: The main container pairing the node hierarchy with its polygons
//! - [`BspNode`]: Internal nodes storing a splitting plane and coplanar fragments
//! - [`PolygonTree`]: Arena tracking how each input polygon has been split
//! - [`PlaneSelector`]: Strategy trait for choosing splitting planes

mod node;
mod polygon_tree;
mod selector;
mod tree;

// Re-export main types
pub use node::BspNode;
pub use polygon_tree::{PolygonNodeId, PolygonSide, PolygonTree};
pub use selector::{FirstPolygon, PlaneSelector};
pub use tree::BspTree;
