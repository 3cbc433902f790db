//! Polygon cutting/splitting operations for BSP trees.

use crate::config::EPSILON;
use crate::{Plane, Polygon, Vertex};

/// Outcome of splitting a polygon by a plane.
#[derive(Debug, Clone, PartialEq)]
pub enum Split {
    /// The polygon lies in the plane and faces the same way.
    CoplanarFront,
    /// The polygon lies in the plane and faces the opposite way.
    CoplanarBack,
    /// Every vertex is in front of (or on) the plane.
    Front,
    /// Every vertex is behind (or on) the plane.
    Back,
    /// The polygon crosses the plane. Either part may be missing when it
    /// collapses below three vertices.
    Spanning {
        front: Option<Polygon>,
        back: Option<Polygon>,
    },
}

/// Trait for geometry that can be cut by a plane.
pub trait Cuttable {
    /// Cuts the geometry by a plane.
    ///
    /// # Return values by classification
    ///
    /// - **CoplanarFront / CoplanarBack**: geometry lies within the plane,
    ///   distinguished by the sign of the dot product of the normals
    /// - **Front**: entire geometry is in front
    /// - **Back**: entire geometry is behind
    /// - **Spanning**: split into two pieces that keep the source attributes
    fn split(&self, plane: &Plane) -> Split;
}

impl Cuttable for Polygon {
    fn split(&self, plane: &Plane) -> Split {
        if self.plane() == plane {
            return Split::CoplanarFront;
        }

        let mut has_front = false;
        let mut has_back = false;
        let is_back: Vec<bool> = self
            .vertices()
            .iter()
            .map(|v| {
                let t = plane.signed_distance(v.pos());
                has_front |= t > EPSILON;
                has_back |= t < -EPSILON;
                t < 0.0
            })
            .collect();

        match (has_front, has_back) {
            (false, false) => {
                if plane.normal().dot(&self.plane().normal()) >= 0.0 {
                    Split::CoplanarFront
                } else {
                    Split::CoplanarBack
                }
            }
            (true, false) => Split::Front,
            (false, true) => Split::Back,
            (true, true) => split_spanning(self, plane, &is_back),
        }
    }
}

/// Splits a spanning polygon into front and back parts.
///
/// Walks the polygon edges and builds two vertex lists, adding the
/// intersection point to both whenever an edge changes side. Vertices with a
/// distance of exactly zero count as front.
fn split_spanning(polygon: &Polygon, plane: &Plane, is_back: &[bool]) -> Split {
    let vertices = polygon.vertices();
    let n = vertices.len();

    let mut front_verts = Vec::with_capacity(n + 1);
    let mut back_verts = Vec::with_capacity(n + 1);

    for i in 0..n {
        let current = vertices[i];
        let next_idx = (i + 1) % n;
        let next = vertices[next_idx];

        if is_back[i] {
            back_verts.push(current);
        } else {
            front_verts.push(current);
        }

        if is_back[i] != is_back[next_idx] {
            let intersection =
                Vertex::new(plane.split_line_between_points(current.pos(), next.pos()));
            front_verts.push(intersection);
            back_verts.push(intersection);
        }
    }

    remove_near_duplicates(&mut front_verts);
    remove_near_duplicates(&mut back_verts);

    let build = |verts: Vec<Vertex>| {
        (verts.len() >= 3)
            .then(|| Polygon::from_vertices_and_plane(verts, *polygon.shared(), *polygon.plane()))
    };

    Split::Spanning {
        front: build(front_verts),
        back: build(back_verts),
    }
}

/// Drops vertices closer than [`EPSILON`] to their predecessor, wrapping
/// around from the last vertex to the first.
fn remove_near_duplicates(vertices: &mut Vec<Vertex>) {
    let Some(last) = vertices.last() else {
        return;
    };
    if vertices.len() < 3 {
        return;
    }

    let mut prev = last.pos();
    vertices.retain(|v| {
        let keep = (v.pos() - prev).norm_squared() >= EPSILON * EPSILON;
        prev = v.pos();
        keep
    });
}
