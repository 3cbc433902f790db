//! Compact, index-based interchange representation of a solid.

use std::collections::HashMap;

use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

use crate::error::{CsgError, CsgResult};
use crate::{Csg, Plane, PlaneKey, Polygon, Shared, SharedKey, Vertex, VertexKey};

/// A solid flattened into arrays of numbers and indexes.
///
/// Vertices, planes and attributes are each stored once and referenced by
/// index, in order of first appearance. Produced from the canonical form of
/// a solid, so decoding restores exactly that form.
///
/// Text formats must carry the `f64` values exactly. With `serde_json` that
/// means enabling its `float_roundtrip` feature.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CompactBinary {
    pub num_polygons: u32,
    /// Vertex count of every polygon.
    pub num_vertices_per_polygon: Vec<u32>,
    /// Concatenated vertex indexes of all polygons.
    pub polygon_vertices: Vec<u32>,
    pub polygon_plane_indexes: Vec<u32>,
    pub polygon_shared_indexes: Vec<u32>,
    /// `x, y, z` per vertex.
    pub vertex_data: Vec<f64>,
    /// `nx, ny, nz, w` per plane.
    pub plane_data: Vec<f64>,
    pub shared: Vec<Shared>,
}

/// Allowed deviation of a decoded plane normal from unit length.
const UNIT_NORMAL_TOLERANCE: f64 = 1e-9;

/// Assigns indexes in order of first appearance.
struct Interner<K> {
    indexes: HashMap<K, u32>,
}

impl<K: std::hash::Hash + Eq> Interner<K> {
    fn new() -> Self {
        Self {
            indexes: HashMap::new(),
        }
    }

    /// Returns the index of `key` and whether it was seen for the first time.
    fn intern(&mut self, key: K) -> (u32, bool) {
        let next = self.indexes.len() as u32;
        match self.indexes.entry(key) {
            std::collections::hash_map::Entry::Occupied(e) => (*e.get(), false),
            std::collections::hash_map::Entry::Vacant(e) => (*e.insert(next), true),
        }
    }
}

impl Csg {
    /// Flattens the canonical form of the solid.
    pub fn to_compact_binary(&self) -> CompactBinary {
        let canonical = self.canonicalized();
        let polygons = canonical.polygons();

        let mut out = CompactBinary {
            num_polygons: polygons.len() as u32,
            ..CompactBinary::default()
        };
        let mut vertices: Interner<VertexKey> = Interner::new();
        let mut planes: Interner<PlaneKey> = Interner::new();
        let mut shared: Interner<SharedKey> = Interner::new();

        for polygon in polygons {
            out.num_vertices_per_polygon.push(polygon.len() as u32);
            for vertex in polygon.vertices() {
                let (index, is_new) = vertices.intern(vertex.key());
                if is_new {
                    let p = vertex.pos();
                    out.vertex_data.extend([p.x, p.y, p.z]);
                }
                out.polygon_vertices.push(index);
            }

            let plane = polygon.plane();
            let (index, is_new) = planes.intern(plane.key());
            if is_new {
                let n = plane.normal();
                out.plane_data.extend([n.x, n.y, n.z, plane.w()]);
            }
            out.polygon_plane_indexes.push(index);

            let (index, is_new) = shared.intern(polygon.shared().key());
            if is_new {
                out.shared.push(*polygon.shared());
            }
            out.polygon_shared_indexes.push(index);
        }
        out
    }

    /// Rebuilds a solid from its compact form.
    ///
    /// The result is flagged canonicalized and retesselated, matching the
    /// solid it was produced from.
    pub fn from_compact_binary(bin: &CompactBinary) -> CsgResult<Csg> {
        let malformed = |msg: String| CsgError::MalformedBinary(msg);
        let num_polygons = bin.num_polygons as usize;

        for (name, len) in [
            ("num_vertices_per_polygon", bin.num_vertices_per_polygon.len()),
            ("polygon_plane_indexes", bin.polygon_plane_indexes.len()),
            ("polygon_shared_indexes", bin.polygon_shared_indexes.len()),
        ] {
            if len != num_polygons {
                return Err(malformed(format!(
                    "{name} has {len} entries, expected {num_polygons}"
                )));
            }
        }
        if bin.vertex_data.len() % 3 != 0 {
            return Err(malformed(format!(
                "vertex data length {} is not a multiple of 3",
                bin.vertex_data.len()
            )));
        }
        if bin.plane_data.len() % 4 != 0 {
            return Err(malformed(format!(
                "plane data length {} is not a multiple of 4",
                bin.plane_data.len()
            )));
        }

        if let Some(i) = bin.vertex_data.iter().position(|x| !x.is_finite()) {
            return Err(malformed(format!("vertex {} has a non-finite coordinate", i / 3)));
        }
        for (i, c) in bin.plane_data.chunks_exact(4).enumerate() {
            if c.iter().any(|x| !x.is_finite()) {
                return Err(malformed(format!("plane {i} has a non-finite component")));
            }
            let norm = Vector3::new(c[0], c[1], c[2]).norm();
            if (norm - 1.0).abs() > UNIT_NORMAL_TOLERANCE {
                return Err(malformed(format!("plane {i} normal has length {norm}")));
            }
        }

        let vertices: Vec<Vertex> = bin
            .vertex_data
            .chunks_exact(3)
            .map(|c| Vertex::new(Point3::new(c[0], c[1], c[2])))
            .collect();
        let planes: Vec<Plane> = bin
            .plane_data
            .chunks_exact(4)
            .map(|c| Plane::from_raw_parts(Vector3::new(c[0], c[1], c[2]), c[3]))
            .collect();

        let mut polygons = Vec::with_capacity(num_polygons);
        let mut next_vertex = 0usize;
        for polygon_index in 0..num_polygons {
            let count = bin.num_vertices_per_polygon[polygon_index] as usize;
            if count < 3 {
                return Err(CsgError::TooFewVertices { count });
            }
            let indexes = bin
                .polygon_vertices
                .get(next_vertex..next_vertex + count)
                .ok_or_else(|| malformed("polygon vertex list is truncated".into()))?;
            next_vertex += count;

            let polygon_vertices = indexes
                .iter()
                .map(|&i| {
                    vertices
                        .get(i as usize)
                        .copied()
                        .ok_or_else(|| malformed(format!("vertex index {i} out of range")))
                })
                .collect::<CsgResult<Vec<Vertex>>>()?;

            let plane_index = bin.polygon_plane_indexes[polygon_index];
            let plane = *planes
                .get(plane_index as usize)
                .ok_or_else(|| malformed(format!("plane index {plane_index} out of range")))?;
            let shared_index = bin.polygon_shared_indexes[polygon_index];
            let shared = *bin
                .shared
                .get(shared_index as usize)
                .ok_or_else(|| malformed(format!("shared index {shared_index} out of range")))?;

            polygons.push(Polygon::from_vertices_and_plane(polygon_vertices, shared, plane));
        }
        if next_vertex != bin.polygon_vertices.len() {
            return Err(malformed(format!(
                "{} unused polygon vertex entries",
                bin.polygon_vertices.len() - next_vertex
            )));
        }

        Ok(Csg::with_flags(polygons, true, true))
    }
}

impl TryFrom<&CompactBinary> for Csg {
    type Error = CsgError;

    fn try_from(bin: &CompactBinary) -> CsgResult<Self> {
        Csg::from_compact_binary(bin)
    }
}
