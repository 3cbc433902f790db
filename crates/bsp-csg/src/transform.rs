//! Affine transformation builders.
//!
//! All matrices act on column vectors (`p' = M · p`), following nalgebra.
//! Angles are in degrees.

use nalgebra::{Matrix4, Point3, Unit, Vector3};

use crate::Plane;

pub fn translation(offset: Vector3<f64>) -> Matrix4<f64> {
    Matrix4::new_translation(&offset)
}

pub fn scaling(factors: Vector3<f64>) -> Matrix4<f64> {
    Matrix4::new_nonuniform_scaling(&factors)
}

pub fn rotation_x(degrees: f64) -> Matrix4<f64> {
    Matrix4::from_axis_angle(&Vector3::x_axis(), degrees.to_radians())
}

pub fn rotation_y(degrees: f64) -> Matrix4<f64> {
    Matrix4::from_axis_angle(&Vector3::y_axis(), degrees.to_radians())
}

pub fn rotation_z(degrees: f64) -> Matrix4<f64> {
    Matrix4::from_axis_angle(&Vector3::z_axis(), degrees.to_radians())
}

/// Counter-clockwise rotation around the axis through `center`.
pub fn rotation(center: Point3<f64>, axis: Vector3<f64>, degrees: f64) -> Matrix4<f64> {
    let axis = Unit::new_normalize(axis);
    Matrix4::new_translation(&center.coords)
        * Matrix4::from_axis_angle(&axis, degrees.to_radians())
        * Matrix4::new_translation(&-center.coords)
}

/// Reflection through `plane`.
pub fn mirroring(plane: &Plane) -> Matrix4<f64> {
    let n = plane.normal();
    let t = n * (2.0 * plane.w());
    #[rustfmt::skip]
    let m = Matrix4::new(
        1.0 - 2.0 * n.x * n.x, -2.0 * n.x * n.y,       -2.0 * n.x * n.z,       t.x,
        -2.0 * n.y * n.x,       1.0 - 2.0 * n.y * n.y, -2.0 * n.y * n.z,       t.y,
        -2.0 * n.z * n.x,       -2.0 * n.z * n.y,       1.0 - 2.0 * n.z * n.z, t.z,
        0.0,                    0.0,                    0.0,                    1.0,
    );
    m
}

/// True when the transformation turns a right-handed frame into a
/// left-handed one. Polygons transformed by such a matrix must reverse their
/// vertex order to keep facing outward.
pub fn is_mirroring(matrix: &Matrix4<f64>) -> bool {
    matrix.fixed_view::<3, 3>(0, 0).clone_owned().determinant() < 0.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn rotation_z_is_counter_clockwise() {
        let p = rotation_z(90.0).transform_point(&Point3::new(1.0, 0.0, 0.0));
        assert_relative_eq!(p, Point3::new(0.0, 1.0, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn rotation_about_offset_axis() {
        let m = rotation(Point3::new(1.0, 0.0, 0.0), Vector3::z(), 180.0);
        let p = m.transform_point(&Point3::new(2.0, 0.0, 0.0));
        assert_relative_eq!(p, Point3::new(0.0, 0.0, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn mirroring_reflects_through_plane() {
        let plane = Plane::new(Vector3::x(), 1.0);
        let m = mirroring(&plane);
        let p = m.transform_point(&Point3::new(0.0, 2.0, 3.0));
        assert_relative_eq!(p, Point3::new(2.0, 2.0, 3.0), epsilon = 1e-12);
        assert_relative_eq!(p, plane.mirror_point(Point3::new(0.0, 2.0, 3.0)), epsilon = 1e-12);
    }

    #[test]
    fn detects_mirroring() {
        assert!(is_mirroring(&mirroring(&Plane::new(Vector3::y(), 0.0))));
        assert!(is_mirroring(&scaling(Vector3::new(-1.0, 1.0, 1.0))));
        assert!(!is_mirroring(&scaling(Vector3::new(-1.0, -1.0, 1.0))));
        assert!(!is_mirroring(&rotation_x(30.0)));
        assert!(!is_mirroring(&translation(Vector3::new(1.0, 2.0, 3.0))));
    }
}
