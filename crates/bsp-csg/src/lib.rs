//! Constructive solid geometry on polygon boundaries, built on BSP trees.
//!
//! A [`Csg`] is a closed solid described by the convex polygons of its
//! surface. Union, subtraction and intersection clip the polygons of one
//! solid against a BSP tree of the other, then merge the surviving
//! fragments back into large convex faces.
//!
//! # Example
//!
//! ```
//! use bsp_csg::{Csg, Polygon, Shared};
//! use nalgebra::{Point3, Vector3};
//!
//! let square = Polygon::from_points(
//!     &[
//!         Point3::new(0.0, 0.0, 0.0),
//!         Point3::new(1.0, 0.0, 0.0),
//!         Point3::new(1.0, 1.0, 0.0),
//!         Point3::new(0.0, 1.0, 0.0),
//!     ],
//!     Shared::default(),
//! );
//! let cube = square.extrude(Vector3::new(0.0, 0.0, 1.0));
//! let shifted = cube.translate(Vector3::new(0.5, 0.0, 0.0));
//!
//! let union = cube.union(&shifted);
//! assert!((union.volume() - 1.5).abs() < 1e-9);
//! ```

mod basis;
mod binary;
pub mod bsp;
pub mod config;
mod csg;
mod cuttable;
mod error;
mod fuzzy;
mod line;
mod plane;
mod polygon;
mod retesselate;
mod shared;
mod stl;
pub mod transform;
mod triangle;
mod vertex;

pub use basis::OrthoNormalBasis;
pub use binary::CompactBinary;
pub use bsp::{BspNode, BspTree, FirstPolygon, PlaneSelector, PolygonTree};
pub use config::{CsgOptions, EPSILON};
pub use csg::Csg;
pub use cuttable::{Cuttable, Split};
pub use error::{CsgError, CsgResult};
pub use fuzzy::{Canonicalizer, FuzzyFactory};
pub use line::{Line2D, Line3D, solve_2_linear};
pub use plane::{Plane, PlaneKey, PlaneSide, non_parallel_vector};
pub use polygon::{Polygon, is_convex_point, is_strictly_convex_point, vertices_convex};
pub use retesselate::{interpolate_between_2d_points_for_y, retesselate_coplanar_polygons};
pub use shared::{Shared, SharedKey};
pub use stl::Stl;
pub use triangle::Triangle;
pub use vertex::{Vertex, VertexKey};
