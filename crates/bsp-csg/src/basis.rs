//! Orthonormal 2D coordinate frames embedded in a plane.

use nalgebra::{Matrix4, Point2, Point3, Vector3};

use crate::line::{Line2D, Line3D};
use crate::plane::non_parallel_vector;
use crate::Plane;

/// Projects points of a plane to 2D coordinates and back.
///
/// The frame axes `u` and `v` are orthonormal, lie in the plane, and satisfy
/// `u × v = normal`, so counter-clockwise in 2D is counter-clockwise around
/// the plane normal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrthoNormalBasis {
    u: Vector3<f64>,
    v: Vector3<f64>,
    plane: Plane,
    plane_origin: Point3<f64>,
}

impl OrthoNormalBasis {
    /// Frame for `plane` with an automatically chosen in-plane axis.
    pub fn new(plane: &Plane) -> Self {
        Self::with_right_vector(plane, non_parallel_vector(&plane.normal()))
    }

    /// Frame for `plane` whose `u` axis points along the in-plane part of
    /// `right`.
    pub fn with_right_vector(plane: &Plane, right: Vector3<f64>) -> Self {
        let normal = plane.normal();
        let v = normal.cross(&right).normalize();
        let u = v.cross(&normal);
        Self {
            u,
            v,
            plane: *plane,
            plane_origin: Point3::from(normal * plane.w()),
        }
    }

    /// Frame for the z = 0 plane with `u = x` and `v = y`.
    pub fn z0_plane() -> Self {
        Self::with_right_vector(&Plane::new(Vector3::z(), 0.0), Vector3::x())
    }

    #[inline]
    pub fn u(&self) -> Vector3<f64> {
        self.u
    }

    #[inline]
    pub fn v(&self) -> Vector3<f64> {
        self.v
    }

    #[inline]
    pub fn plane(&self) -> &Plane {
        &self.plane
    }

    /// Maps 3D points into the frame: `(u, v, distance from plane)`.
    pub fn projection_matrix(&self) -> Matrix4<f64> {
        let (u, v, n) = (self.u, self.v, self.plane.normal());
        #[rustfmt::skip]
        let m = Matrix4::new(
            u.x, u.y, u.z, 0.0,
            v.x, v.y, v.z, 0.0,
            n.x, n.y, n.z, -self.plane.w(),
            0.0, 0.0, 0.0, 1.0,
        );
        m
    }

    /// Inverse of [`OrthoNormalBasis::projection_matrix`].
    pub fn inverse_projection_matrix(&self) -> Matrix4<f64> {
        let (u, v, n, p) = (self.u, self.v, self.plane.normal(), self.plane_origin);
        #[rustfmt::skip]
        let m = Matrix4::new(
            u.x, v.x, n.x, p.x,
            u.y, v.y, n.y, p.y,
            u.z, v.z, n.z, p.z,
            0.0, 0.0, 0.0, 1.0,
        );
        m
    }

    /// Coordinates of `point` projected onto the plane.
    #[inline]
    pub fn to_2d(&self, point: &Point3<f64>) -> Point2<f64> {
        Point2::new(point.coords.dot(&self.u), point.coords.dot(&self.v))
    }

    /// Point of the plane with the given frame coordinates.
    #[inline]
    pub fn to_3d(&self, point: &Point2<f64>) -> Point3<f64> {
        self.plane_origin + self.u * point.x + self.v * point.y
    }

    /// Projects a 3D line into the frame.
    pub fn line_3d_to_2d(&self, line: &Line3D) -> Line2D {
        let a = line.point();
        let b = a + line.direction();
        Line2D::from_points(self.to_2d(&a), self.to_2d(&b))
    }

    /// Lifts a frame line back onto the plane.
    pub fn line_2d_to_3d(&self, line: &Line2D) -> Line3D {
        let a = line.origin();
        let b = a + line.direction();
        Line3D::from_points(self.to_3d(&a), self.to_3d(&b))
    }

    /// Re-expresses the frame after transforming space with `matrix`.
    pub fn transform(&self, matrix: &Matrix4<f64>) -> Self {
        let plane = self.plane.transform(matrix);
        let origin = matrix.transform_point(&Point3::origin());
        let right = matrix.transform_point(&Point3::from(self.u)) - origin;
        Self::with_right_vector(&plane, right)
    }
}
