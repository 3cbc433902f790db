//! Infinite lines in the plane and in space.

use nalgebra::{Matrix4, Point2, Point3, Vector2, Vector3};

use crate::config::{LINE_EQUALITY_TOLERANCE, PARALLEL_PLANES_EPSILON};
use crate::Plane;

/// Solves the 2×2 system `a·x + b·y = u`, `c·x + d·y = v`.
///
/// A singular system yields non-finite components.
pub fn solve_2_linear(a: f64, b: f64, c: f64, d: f64, u: f64, v: f64) -> (f64, f64) {
    let inv_det = 1.0 / (a * d - b * c);
    ((u * d - b * v) * inv_det, (a * v - u * c) * inv_det)
}

/// A line in 2D, stored as `normal · p = w`.
///
/// Lines are oriented: walking along [`Line2D::direction`], the normal points
/// to the left.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Line2D {
    normal: Vector2<f64>,
    w: f64,
}

impl Line2D {
    /// Creates a line, normalizing the normal and scaling `w` with it.
    pub fn new(normal: Vector2<f64>, w: f64) -> Self {
        let len = normal.norm();
        Self {
            normal: normal / len,
            w: w / len,
        }
    }

    /// Line through `p1` and `p2`, directed from `p1` to `p2`.
    ///
    /// Coincident points give a line with non-finite components.
    pub fn from_points(p1: Point2<f64>, p2: Point2<f64>) -> Self {
        let direction = p2 - p1;
        let normal = Vector2::new(-direction.y, direction.x) / direction.norm();
        Self {
            normal,
            w: p1.coords.dot(&normal),
        }
    }

    #[inline]
    pub fn normal(&self) -> Vector2<f64> {
        self.normal
    }

    #[inline]
    pub fn w(&self) -> f64 {
        self.w
    }

    /// Same line walked the other way.
    pub fn reverse(&self) -> Self {
        Self {
            normal: -self.normal,
            w: -self.w,
        }
    }

    /// Foot of the perpendicular from the origin.
    pub fn origin(&self) -> Point2<f64> {
        Point2::from(self.normal * self.w)
    }

    /// Unit direction of travel.
    pub fn direction(&self) -> Vector2<f64> {
        Vector2::new(self.normal.y, -self.normal.x)
    }

    /// The x coordinate where the line crosses height `y`.
    pub fn x_at_y(&self, y: f64) -> f64 {
        (self.w - self.normal.y * y) / self.normal.x
    }

    pub fn abs_distance_to_point(&self, point: Point2<f64>) -> f64 {
        (point.coords.dot(&self.normal) - self.w).abs()
    }

    pub fn closest_point(&self, point: Point2<f64>) -> Point2<f64> {
        let direction = self.direction();
        self.origin() + direction * point.coords.dot(&direction)
    }

    /// Crossing point of two lines. Parallel lines give non-finite coordinates.
    pub fn intersect_with_line(&self, other: &Line2D) -> Point2<f64> {
        let (x, y) = solve_2_linear(
            self.normal.x,
            self.normal.y,
            other.normal.x,
            other.normal.y,
            self.w,
            other.w,
        );
        Point2::new(x, y)
    }

    /// Applies an affine transformation in the z = 0 plane.
    pub fn transform(&self, matrix: &Matrix4<f64>) -> Self {
        let p1 = self.origin();
        let p2 = p1 + self.direction();
        Self::from_points(transform_point_2d(matrix, p1), transform_point_2d(matrix, p2))
    }
}

/// Transforms a 2D point lying in the z = 0 plane and drops the z coordinate.
pub(crate) fn transform_point_2d(matrix: &Matrix4<f64>, point: Point2<f64>) -> Point2<f64> {
    let p = matrix.transform_point(&Point3::new(point.x, point.y, 0.0));
    Point2::new(p.x, p.y)
}

/// An infinite line in 3D through `point` with unit `direction`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Line3D {
    point: Point3<f64>,
    direction: Vector3<f64>,
}

impl Line3D {
    /// Creates a line, normalizing the direction.
    pub fn new(point: Point3<f64>, direction: Vector3<f64>) -> Self {
        Self {
            point,
            direction: direction.normalize(),
        }
    }

    /// Line through `p1` towards `p2`.
    pub fn from_points(p1: Point3<f64>, p2: Point3<f64>) -> Self {
        Self::new(p1, p2 - p1)
    }

    /// Intersection of two planes, or `None` when they are parallel.
    ///
    /// The returned point has a zero coordinate along the dominant axis of
    /// the direction.
    pub fn from_planes(p1: &Plane, p2: &Plane) -> Option<Self> {
        let (n1, n2) = (p1.normal(), p2.normal());
        let direction = n1.cross(&n2);
        let len = direction.norm();
        if len < PARALLEL_PLANES_EPSILON {
            return None;
        }
        let direction = direction / len;

        let abs = direction.abs();
        let point = if abs.x >= abs.y && abs.x >= abs.z {
            let (y, z) = solve_2_linear(n1.y, n1.z, n2.y, n2.z, p1.w(), p2.w());
            Point3::new(0.0, y, z)
        } else if abs.y >= abs.x && abs.y >= abs.z {
            let (x, z) = solve_2_linear(n1.x, n1.z, n2.x, n2.z, p1.w(), p2.w());
            Point3::new(x, 0.0, z)
        } else {
            let (x, y) = solve_2_linear(n1.x, n1.y, n2.x, n2.y, p1.w(), p2.w());
            Point3::new(x, y, 0.0)
        };
        Some(Self { point, direction })
    }

    #[inline]
    pub fn point(&self) -> Point3<f64> {
        self.point
    }

    #[inline]
    pub fn direction(&self) -> Vector3<f64> {
        self.direction
    }

    /// Where the line pierces `plane`. A line parallel to the plane gives
    /// non-finite coordinates.
    pub fn intersect_with_plane(&self, plane: &Plane) -> Point3<f64> {
        let lambda = (plane.w() - plane.normal().dot(&self.point.coords))
            / plane.normal().dot(&self.direction);
        self.point + self.direction * lambda
    }

    pub fn reverse(&self) -> Self {
        Self {
            point: self.point,
            direction: -self.direction,
        }
    }

    pub fn transform(&self, matrix: &Matrix4<f64>) -> Self {
        let p1 = matrix.transform_point(&self.point);
        let p2 = matrix.transform_point(&(self.point + self.direction));
        Self::from_points(p1, p2)
    }

    pub fn closest_point_on_line(&self, point: Point3<f64>) -> Point3<f64> {
        let t = (point - self.point).dot(&self.direction) / self.direction.dot(&self.direction);
        self.point + self.direction * t
    }

    pub fn distance_to_point(&self, point: Point3<f64>) -> f64 {
        (self.closest_point_on_line(point) - point).norm()
    }

    /// Same direction and passing through each other's anchor point.
    pub fn is_same_line(&self, other: &Line3D) -> bool {
        self.direction == other.direction
            && self.distance_to_point(other.point) <= LINE_EQUALITY_TOLERANCE
    }
}
