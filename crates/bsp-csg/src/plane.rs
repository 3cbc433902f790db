//! Plane representation and operations for BSP trees.

use nalgebra::{Matrix4, Point3, Vector3};

use crate::config::EPSILON;
use crate::cuttable::{Cuttable, Split};
use crate::line::Line3D;
use crate::vertex::canonical_bits;
use crate::Polygon;

/// Which side of a plane a point lies on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaneSide {
    /// Point is in front of the plane (positive side of normal)
    Front,
    /// Point is behind the plane (negative side of normal)
    Back,
    /// Point lies on the plane (within epsilon tolerance)
    OnPlane,
}

/// Hashable identity of a plane, built from the bit patterns of its
/// normal and offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PlaneKey([u64; 4]);

/// A plane in 3D space, represented as `normal · point = w`.
///
/// Equality is exact and component-wise. Near-equal planes are unified by
/// canonicalization, not by comparison.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    normal: Vector3<f64>,
    w: f64,
}

impl Plane {
    /// Creates a new plane from a normal vector and offset.
    /// Both are scaled so that the normal has unit length.
    ///
    /// # Panics
    /// Panics if the normal vector has zero length.
    pub fn new(normal: Vector3<f64>, w: f64) -> Self {
        let norm = normal.norm();
        assert!(
            norm > f64::MIN_POSITIVE && norm.is_finite(),
            "Plane normal cannot be zero"
        );
        Self {
            normal: normal / norm,
            w: w / norm,
        }
    }

    /// Creates a plane from an already normalized normal without touching
    /// its components. Used when decoding planes that must survive bit-exact.
    pub(crate) fn from_raw_parts(normal: Vector3<f64>, w: f64) -> Self {
        Self { normal, w }
    }

    /// Creates a plane from a point on the plane and a normal vector.
    /// The normal will be normalized automatically.
    ///
    /// # Panics
    /// Panics if the normal vector has zero length.
    pub fn from_normal_and_point(normal: Vector3<f64>, point: Point3<f64>) -> Self {
        let norm = normal.norm();
        assert!(
            norm > f64::MIN_POSITIVE && norm.is_finite(),
            "Plane normal cannot be zero"
        );
        let unit_normal = normal / norm;
        Self {
            normal: unit_normal,
            w: unit_normal.dot(&point.coords),
        }
    }

    /// Creates a plane from three non-collinear points.
    /// The normal direction follows the right-hand rule: (b - a) × (c - a).
    ///
    /// # Panics
    /// Panics if the points are collinear.
    pub fn from_points(a: Point3<f64>, b: Point3<f64>, c: Point3<f64>) -> Self {
        Self::try_from_points(a, b, c).expect("Plane points must not be collinear")
    }

    /// Like [`Plane::from_points`], but returns `None` for collinear points.
    pub fn try_from_points(a: Point3<f64>, b: Point3<f64>, c: Point3<f64>) -> Option<Self> {
        let normal = (b - a).cross(&(c - a));
        let norm = normal.norm();
        if norm > f64::MIN_POSITIVE && norm.is_finite() {
            let unit_normal = normal / norm;
            Some(Self {
                normal: unit_normal,
                w: unit_normal.dot(&a.coords),
            })
        } else {
            None
        }
    }

    /// Creates some plane through the three points, even when they coincide
    /// or lie on one line. Degenerate directions are replaced by an axis that
    /// is not parallel to the remaining direction.
    pub fn any_from_points(a: Point3<f64>, b: Point3<f64>, c: Point3<f64>) -> Self {
        let mut v1 = b - a;
        let mut v2 = c - a;
        if v1.norm() < EPSILON {
            v1 = non_parallel_vector(&v2);
        }
        if v2.norm() < EPSILON {
            v2 = non_parallel_vector(&v1);
        }
        let mut normal = v1.cross(&v2);
        if normal.norm() < EPSILON {
            // v1 and v2 point in opposite directions
            v2 = non_parallel_vector(&v1);
            normal = v1.cross(&v2);
        }
        Self::from_normal_and_point(normal, a)
    }

    /// Returns the unit normal vector of the plane.
    #[inline]
    pub fn normal(&self) -> Vector3<f64> {
        self.normal
    }

    /// Returns the signed distance from the origin to the plane along the normal.
    #[inline]
    pub fn w(&self) -> f64 {
        self.w
    }

    /// Returns the identity key of this plane.
    pub fn key(&self) -> PlaneKey {
        PlaneKey([
            canonical_bits(self.normal.x),
            canonical_bits(self.normal.y),
            canonical_bits(self.normal.z),
            canonical_bits(self.w),
        ])
    }

    /// Computes the signed distance from a point to the plane.
    /// - Positive: point is in front (same side as normal)
    /// - Negative: point is behind (opposite side from normal)
    /// - Zero: point is on the plane
    #[inline]
    pub fn signed_distance(&self, point: Point3<f64>) -> f64 {
        self.normal.dot(&point.coords) - self.w
    }

    /// Classifies which side of the plane a point lies on.
    /// Uses the default [`EPSILON`] tolerance.
    #[inline]
    pub fn classify_point(&self, point: Point3<f64>) -> PlaneSide {
        self.classify_point_with_epsilon(point, EPSILON)
    }

    /// Classifies which side of the plane a point lies on, with a custom epsilon.
    pub fn classify_point_with_epsilon(&self, point: Point3<f64>, epsilon: f64) -> PlaneSide {
        let dist = self.signed_distance(point);
        if dist > epsilon {
            PlaneSide::Front
        } else if dist < -epsilon {
            PlaneSide::Back
        } else {
            PlaneSide::OnPlane
        }
    }

    /// Returns a new plane with the normal flipped (facing the opposite direction).
    #[inline]
    pub fn flipped(&self) -> Self {
        Self {
            normal: -self.normal,
            w: -self.w,
        }
    }

    /// Splits a polygon by this plane.
    ///
    /// See [`Split`] for the possible outcomes.
    #[inline]
    pub fn split_polygon(&self, polygon: &Polygon) -> Split {
        polygon.split(self)
    }

    /// Finds where the segment `p1 → p2` meets the plane.
    ///
    /// Works for segments parallel to the plane too: the interpolation
    /// parameter falls back to 0 when undefined and is clamped to `[0, 1]`,
    /// so the result always lies on the segment.
    pub fn split_line_between_points(&self, p1: Point3<f64>, p2: Point3<f64>) -> Point3<f64> {
        let direction = p2 - p1;
        let mut lambda = (self.w - self.normal.dot(&p1.coords)) / self.normal.dot(&direction);
        if lambda.is_nan() {
            lambda = 0.0;
        }
        p1 + direction * lambda.clamp(0.0, 1.0)
    }

    /// Intersection point of an infinite line with this plane.
    pub fn intersect_with_line(&self, line: &Line3D) -> Point3<f64> {
        line.intersect_with_plane(self)
    }

    /// Intersection line of two planes, or `None` when they are parallel.
    pub fn intersect_with_plane(&self, other: &Plane) -> Option<Line3D> {
        Line3D::from_planes(self, other)
    }

    /// Reflects a point through the plane.
    pub fn mirror_point(&self, point: Point3<f64>) -> Point3<f64> {
        point - self.normal * (self.signed_distance(point) * 2.0)
    }

    /// Applies an affine transformation.
    ///
    /// The normal is carried by the inverse transpose of the linear part so
    /// planes stay correct under non-uniform scaling.
    pub fn transform(&self, matrix: &Matrix4<f64>) -> Self {
        let point_on_plane = matrix.transform_point(&Point3::from(self.normal * self.w));
        let linear = matrix.fixed_view::<3, 3>(0, 0).clone_owned();
        let normal = match linear.try_inverse() {
            Some(inverse) => inverse.transpose() * self.normal,
            None => {
                let origin = matrix.transform_point(&Point3::origin());
                matrix.transform_point(&Point3::from(self.normal)) - origin
            }
        };
        Self::from_normal_and_point(normal, point_on_plane)
    }
}

/// Returns a coordinate axis that is as far from parallel to `v` as possible.
pub fn non_parallel_vector(v: &Vector3<f64>) -> Vector3<f64> {
    let abs = v.abs();
    if abs.x <= abs.y && abs.x <= abs.z {
        Vector3::x()
    } else if abs.y <= abs.x && abs.y <= abs.z {
        Vector3::y()
    } else {
        Vector3::z()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::Translation3;

    #[test]
    fn new_normalizes_normal_and_offset() {
        let plane = Plane::new(Vector3::new(0.0, 0.0, 2.0), 4.0);
        assert_eq!(plane.normal(), Vector3::new(0.0, 0.0, 1.0));
        assert_eq!(plane.w(), 2.0);
    }

    #[test]
    #[should_panic(expected = "Plane normal cannot be zero")]
    fn zero_normal_panics() {
        Plane::new(Vector3::zeros(), 1.0);
    }

    #[test]
    fn from_points_follows_right_hand_rule() {
        let plane = Plane::from_points(
            Point3::new(0.0, 0.0, 1.0),
            Point3::new(1.0, 0.0, 1.0),
            Point3::new(0.0, 1.0, 1.0),
        );
        assert_eq!(plane.normal(), Vector3::new(0.0, 0.0, 1.0));
        assert_eq!(plane.w(), 1.0);
    }

    #[test]
    fn try_from_collinear_points_is_none() {
        let p = Plane::try_from_points(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
        );
        assert!(p.is_none());
    }

    #[test]
    fn any_from_points_handles_degenerate_input() {
        let a = Point3::new(1.0, 2.0, 3.0);
        let plane = Plane::any_from_points(a, a, a);
        assert_relative_eq!(plane.normal().norm(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(plane.signed_distance(a), 0.0, epsilon = 1e-12);

        let collinear =
            Plane::any_from_points(a, Point3::new(2.0, 2.0, 3.0), Point3::new(0.0, 2.0, 3.0));
        assert_relative_eq!(collinear.signed_distance(a), 0.0, epsilon = 1e-12);
        assert_relative_eq!(collinear.normal().x, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn classify_points() {
        let plane = Plane::new(Vector3::y(), 0.0);
        assert_eq!(plane.classify_point(Point3::new(0.0, 1.0, 0.0)), PlaneSide::Front);
        assert_eq!(plane.classify_point(Point3::new(0.0, -1.0, 0.0)), PlaneSide::Back);
        assert_eq!(plane.classify_point(Point3::new(5.0, 1e-6, 0.0)), PlaneSide::OnPlane);
    }

    #[test]
    fn flipped_reverses_orientation() {
        let plane = Plane::new(Vector3::x(), 2.0);
        let flipped = plane.flipped();
        assert_eq!(flipped.normal(), -Vector3::x());
        assert_eq!(flipped.w(), -2.0);
        assert_eq!(flipped.flipped(), plane);
    }

    #[test]
    fn split_line_crosses_plane() {
        let plane = Plane::new(Vector3::z(), 1.0);
        let p = plane.split_line_between_points(Point3::new(0.0, 0.0, 0.0), Point3::new(0.0, 0.0, 4.0));
        assert_relative_eq!(p, Point3::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn split_line_parallel_segment_stays_on_segment() {
        let plane = Plane::new(Vector3::z(), 1.0);
        let start = Point3::new(0.0, 0.0, 1.0);
        let p = plane.split_line_between_points(start, Point3::new(3.0, 0.0, 1.0));
        assert!(p.x.is_finite());
        assert!(p.x >= 0.0 && p.x <= 3.0);
    }

    #[test]
    fn mirror_point_reflects() {
        let plane = Plane::new(Vector3::x(), 1.0);
        assert_relative_eq!(
            plane.mirror_point(Point3::new(0.0, 3.0, 0.0)),
            Point3::new(2.0, 3.0, 0.0)
        );
    }

    #[test]
    fn transform_translates_plane() {
        let plane = Plane::new(Vector3::z(), 1.0);
        let m = Translation3::new(0.0, 0.0, 2.0).to_homogeneous();
        let moved = plane.transform(&m);
        assert_relative_eq!(moved.normal(), Vector3::z());
        assert_relative_eq!(moved.w(), 3.0);
    }

    #[test]
    fn transform_handles_non_uniform_scaling() {
        let plane = Plane::from_normal_and_point(Vector3::new(1.0, 1.0, 0.0), Point3::new(1.0, 0.0, 0.0));
        let m = Matrix4::new_nonuniform_scaling(&Vector3::new(2.0, 1.0, 1.0));
        let scaled = plane.transform(&m);
        // (1, 0, 0) and (0, 1, 0) lie on the plane before scaling
        assert_relative_eq!(scaled.signed_distance(Point3::new(2.0, 0.0, 0.0)), 0.0, epsilon = 1e-12);
        assert_relative_eq!(scaled.signed_distance(Point3::new(0.0, 1.0, 0.0)), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn keys_match_for_equal_planes() {
        let a = Plane::new(Vector3::z(), 1.0);
        let b = Plane::from_normal_and_point(Vector3::z(), Point3::new(5.0, 5.0, 1.0));
        assert_eq!(a.key(), b.key());
        assert_ne!(a.key(), a.flipped().key());
    }

    #[test]
    fn non_parallel_vector_picks_smallest_axis() {
        assert_eq!(non_parallel_vector(&Vector3::new(0.1, 5.0, 3.0)), Vector3::x());
        assert_eq!(non_parallel_vector(&Vector3::new(5.0, 0.1, 3.0)), Vector3::y());
        assert_eq!(non_parallel_vector(&Vector3::new(5.0, 3.0, 0.1)), Vector3::z());
    }
}
