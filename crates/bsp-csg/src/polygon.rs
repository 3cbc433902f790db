//! Convex polygon representation for BSP trees.

use nalgebra::{Matrix4, Point3, Vector3};

use crate::error::{CsgError, CsgResult};
use crate::transform::is_mirroring;
use crate::{Csg, Plane, Shared, Triangle, Vertex};

/// A convex polygon in 3D space, defined by an ordered list of vertices.
///
/// Vertices are coplanar and in counter-clockwise winding order when viewed
/// from the front (the direction the plane normal points). The plane is
/// stored rather than recomputed, so fragments produced by splitting keep the
/// exact plane of their source polygon.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    vertices: Vec<Vertex>,
    shared: Shared,
    plane: Plane,
    bounding_box: (Point3<f64>, Point3<f64>),
}

impl Polygon {
    /// Creates a polygon, deriving its plane from the first corner of the
    /// vertex loop that is not straight.
    ///
    /// # Panics
    /// Panics if fewer than 3 vertices are provided. Use
    /// [`Polygon::try_from_vertices`] for unchecked input.
    pub fn from_vertices(vertices: Vec<Vertex>, shared: Shared) -> Self {
        assert!(vertices.len() >= 3, "Polygon must have at least 3 vertices");
        let plane = plane_of(&vertices);
        Self::from_vertices_and_plane(vertices, shared, plane)
    }

    /// Creates a polygon on a known plane.
    ///
    /// # Panics
    /// Panics if fewer than 3 vertices are provided.
    pub fn from_vertices_and_plane(vertices: Vec<Vertex>, shared: Shared, plane: Plane) -> Self {
        assert!(vertices.len() >= 3, "Polygon must have at least 3 vertices");
        let bounding_box = bounds_of(&vertices);
        Self {
            vertices,
            shared,
            plane,
            bounding_box,
        }
    }

    /// Creates a polygon from bare positions.
    pub fn from_points(points: &[Point3<f64>], shared: Shared) -> Self {
        Self::from_vertices(points.iter().copied().map(Vertex::new).collect(), shared)
    }

    /// Like [`Polygon::from_vertices`], but rejects polygons with too few
    /// vertices or a reflex corner.
    pub fn try_from_vertices(vertices: Vec<Vertex>, shared: Shared) -> CsgResult<Self> {
        if vertices.len() < 3 {
            return Err(CsgError::TooFewVertices {
                count: vertices.len(),
            });
        }
        let plane = plane_of(&vertices);
        Self::try_from_vertices_and_plane(vertices, shared, plane)
    }

    /// Like [`Polygon::from_vertices_and_plane`], but rejects polygons with
    /// too few vertices or a reflex corner.
    pub fn try_from_vertices_and_plane(
        vertices: Vec<Vertex>,
        shared: Shared,
        plane: Plane,
    ) -> CsgResult<Self> {
        if vertices.len() < 3 {
            return Err(CsgError::TooFewVertices {
                count: vertices.len(),
            });
        }
        if let Some(index) = first_reflex_vertex(&vertices, &plane.normal()) {
            return Err(CsgError::NonConvex { index });
        }
        Ok(Self::from_vertices_and_plane(vertices, shared, plane))
    }

    /// Returns the vertices of the polygon.
    #[inline]
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    /// Returns the surface attribute.
    #[inline]
    pub fn shared(&self) -> &Shared {
        &self.shared
    }

    /// Returns the plane that this polygon lies on.
    #[inline]
    pub fn plane(&self) -> &Plane {
        &self.plane
    }

    /// Returns the number of vertices.
    #[inline]
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    /// Returns true if the polygon has no vertices (always false for valid polygons).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Axis-aligned bounds as `(min, max)`.
    #[inline]
    pub fn bounding_box(&self) -> (Point3<f64>, Point3<f64>) {
        self.bounding_box
    }

    /// Sphere enclosing the bounding box, as `(center, radius)`.
    pub fn bounding_sphere(&self) -> (Point3<f64>, f64) {
        let (min, max) = self.bounding_box;
        let center = nalgebra::center(&min, &max);
        (center, (max - center).norm())
    }

    /// Computes the centroid (average of the vertices) of the polygon.
    pub fn centroid(&self) -> Point3<f64> {
        let sum: Vector3<f64> = self.vertices.iter().map(|v| v.pos().coords).sum();
        Point3::from(sum / self.vertices.len() as f64)
    }

    /// Returns the polygon facing the other way: reversed vertices, flipped plane.
    pub fn flipped(&self) -> Self {
        let vertices = self.vertices.iter().rev().map(Vertex::flipped).collect();
        Self::from_vertices_and_plane(vertices, self.shared, self.plane.flipped())
    }

    /// Returns a copy carrying a different surface attribute.
    pub fn with_shared(&self, shared: Shared) -> Self {
        Self {
            shared,
            ..self.clone()
        }
    }

    /// Applies an affine transformation. Mirroring transformations reverse
    /// the vertex order so the polygon keeps facing outward.
    pub fn transform(&self, matrix: &Matrix4<f64>) -> Self {
        let mut vertices: Vec<Vertex> = self.vertices.iter().map(|v| v.transform(matrix)).collect();
        if is_mirroring(matrix) {
            vertices.reverse();
        }
        Self::from_vertices_and_plane(vertices, self.shared, self.plane.transform(matrix))
    }

    /// Moves the polygon by `offset`.
    pub fn translate(&self, offset: Vector3<f64>) -> Self {
        self.transform(&Matrix4::new_translation(&offset))
    }

    /// Sweeps the polygon along `offset` into a closed prism.
    ///
    /// The base always faces away from the sweep direction.
    pub fn extrude(&self, offset: Vector3<f64>) -> Csg {
        let bottom = if self.plane.normal().dot(&offset) > 0.0 {
            self.flipped()
        } else {
            self.clone()
        };
        let top = bottom.translate(offset);

        let n = bottom.vertices.len();
        let mut polygons = Vec::with_capacity(n + 2);
        for i in 0..n {
            let next = (i + 1) % n;
            polygons.push(Polygon::from_points(
                &[
                    bottom.vertices[i].pos(),
                    top.vertices[i].pos(),
                    top.vertices[next].pos(),
                    bottom.vertices[next].pos(),
                ],
                self.shared,
            ));
        }
        polygons.push(top.flipped());
        polygons.insert(0, bottom);
        Csg::from_polygons(polygons)
    }

    /// Fan triangulation from the first vertex.
    pub fn triangles(&self) -> impl Iterator<Item = Triangle> + '_ {
        let first = self.vertices[0].pos();
        self.vertices[1..]
            .windows(2)
            .map(move |pair| Triangle::new(first, pair[0].pos(), pair[1].pos()))
    }

    /// Area of the polygon.
    pub fn area(&self) -> f64 {
        self.triangles().map(|t| t.area()).sum()
    }

    /// Checks that every corner turns counter-clockwise around the plane normal.
    pub fn is_convex(&self) -> bool {
        vertices_convex(&self.vertices, &self.plane.normal())
    }

    /// Validates convexity, reporting the first reflex corner.
    pub fn check_convex(&self) -> CsgResult<()> {
        match first_reflex_vertex(&self.vertices, &self.plane.normal()) {
            Some(index) => Err(CsgError::NonConvex { index }),
            None => Ok(()),
        }
    }
}

/// True when the loop of vertices is convex around `normal`.
/// Fewer than three vertices count as convex.
pub fn vertices_convex(vertices: &[Vertex], normal: &Vector3<f64>) -> bool {
    first_reflex_vertex(vertices, normal).is_none()
}

/// The corner at `point` turns counter-clockwise (or straight) around `normal`.
pub fn is_convex_point(
    prev: Point3<f64>,
    point: Point3<f64>,
    next: Point3<f64>,
    normal: &Vector3<f64>,
) -> bool {
    corner_turn(prev, point, next, normal) >= 0.0
}

/// The corner at `point` turns counter-clockwise around `normal` by a
/// noticeable amount.
pub fn is_strictly_convex_point(
    prev: Point3<f64>,
    point: Point3<f64>,
    next: Point3<f64>,
    normal: &Vector3<f64>,
) -> bool {
    corner_turn(prev, point, next, normal) >= crate::config::EPSILON
}

fn corner_turn(prev: Point3<f64>, point: Point3<f64>, next: Point3<f64>, normal: &Vector3<f64>) -> f64 {
    (point - prev).cross(&(next - point)).dot(normal)
}

fn first_reflex_vertex(vertices: &[Vertex], normal: &Vector3<f64>) -> Option<usize> {
    let n = vertices.len();
    if n < 3 {
        return None;
    }
    (0..n).find(|&i| {
        let prev = vertices[(i + n - 1) % n].pos();
        let next = vertices[(i + 1) % n].pos();
        !is_convex_point(prev, vertices[i].pos(), next, normal)
    })
}

/// Plane through the first corner that turns by more than `EPSILON`
/// radians, falling back to the sharpest corner when the loop is nearly
/// straight everywhere.
fn plane_of(vertices: &[Vertex]) -> Plane {
    let n = vertices.len();
    let corner = |i: usize| {
        (
            vertices[i].pos(),
            vertices[(i + 1) % n].pos(),
            vertices[(i + 2) % n].pos(),
        )
    };

    let mut sharpest: Option<(f64, usize)> = None;
    for i in 0..n {
        let (a, b, c) = corner(i);
        let (ab, ac) = (b - a, c - a);
        let turn = ab.cross(&ac).norm();
        if turn > crate::config::EPSILON * ab.norm() * ac.norm() {
            if let Some(plane) = Plane::try_from_points(a, b, c) {
                return plane;
            }
        }
        if sharpest.is_none_or(|(best, _)| turn > best) {
            sharpest = Some((turn, i));
        }
    }

    let (a, b, c) = corner(sharpest.map_or(0, |(_, i)| i));
    Plane::try_from_points(a, b, c).unwrap_or_else(|| Plane::any_from_points(a, b, c))
}

fn bounds_of(vertices: &[Vertex]) -> (Point3<f64>, Point3<f64>) {
    let Some(first) = vertices.first() else {
        return (Point3::origin(), Point3::origin());
    };
    vertices.iter().skip(1).fold((first.pos(), first.pos()), |(min, max), v| {
        (min.inf(&v.pos()), max.sup(&v.pos()))
    })
}

impl From<Triangle> for Polygon {
    fn from(triangle: Triangle) -> Self {
        Polygon::from_points(triangle.vertices(), Shared::default())
    }
}

impl From<&Polygon> for Plane {
    fn from(polygon: &Polygon) -> Self {
        *polygon.plane()
    }
}
