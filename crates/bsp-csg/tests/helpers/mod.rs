//! Solids and checks shared by the integration tests.
#![allow(dead_code)]

use std::f64::consts::PI;

use bsp_csg::{Csg, Polygon, Shared};
use nalgebra::{Point3, Vector3};

/// Axis-aligned cube with half edge length `radius`.
pub fn cube(center: Point3<f64>, radius: f64) -> Csg {
    const FACES: [[usize; 4]; 6] = [
        [0, 4, 6, 2],
        [1, 3, 7, 5],
        [0, 1, 5, 4],
        [2, 6, 7, 3],
        [0, 2, 3, 1],
        [4, 5, 7, 6],
    ];
    let corner = |i: usize| {
        let sign = |bit: usize| if i & bit != 0 { 1.0 } else { -1.0 };
        center + Vector3::new(sign(1), sign(2), sign(4)) * radius
    };
    Csg::from_polygons(
        FACES
            .iter()
            .map(|face| {
                let points: Vec<Point3<f64>> = face.iter().map(|&i| corner(i)).collect();
                Polygon::from_points(&points, Shared::default())
            })
            .collect(),
    )
}

/// Unit cube with its minimum corner at `min`.
pub fn unit_cube_at(min: Point3<f64>) -> Csg {
    cube(min + Vector3::repeat(0.5), 0.5)
}

/// Sphere approximated by `slices` segments around the y axis and `stacks`
/// bands from pole to pole. The poles are closed with triangles.
pub fn sphere(center: Point3<f64>, radius: f64, slices: usize, stacks: usize) -> Csg {
    let point = |slice: usize, stack: usize| {
        let theta = slice as f64 / slices as f64 * 2.0 * PI;
        let phi = stack as f64 / stacks as f64 * PI;
        let dir = Vector3::new(theta.cos() * phi.sin(), phi.cos(), theta.sin() * phi.sin());
        center + dir * radius
    };

    let mut polygons = Vec::with_capacity(slices * stacks);
    for i in 0..slices {
        for j in 0..stacks {
            let mut points = vec![point(i, j)];
            if j > 0 {
                points.push(point(i + 1, j));
            }
            if j < stacks - 1 {
                points.push(point(i + 1, j + 1));
            }
            points.push(point(i, j + 1));
            polygons.push(Polygon::from_points(&points, Shared::default()));
        }
    }
    Csg::from_polygons(polygons)
}

/// Convexity with a little slack for corners that are straight up to
/// rounding error.
pub fn is_convex_with_tolerance(polygon: &Polygon) -> bool {
    let normal = polygon.plane().normal();
    let points: Vec<Point3<f64>> = polygon.vertices().iter().map(|v| v.pos()).collect();
    let n = points.len();
    (0..n).all(|i| {
        let prev = points[(i + n - 1) % n];
        let here = points[i];
        let next = points[(i + 1) % n];
        (here - prev).cross(&(next - here)).dot(&normal) >= -1e-9
    })
}

/// Every vertex of every polygon lies on that polygon's plane.
pub fn vertices_on_planes(csg: &Csg) -> bool {
    csg.polygons().iter().all(|polygon| {
        polygon
            .vertices()
            .iter()
            .all(|v| polygon.plane().signed_distance(v.pos()).abs() < 1e-6)
    })
}

/// Number of distinct planes among the polygons.
pub fn distinct_planes(csg: &Csg) -> usize {
    let mut keys: Vec<_> = csg.polygons().iter().map(|p| p.plane().key()).collect();
    keys.sort();
    keys.dedup();
    keys.len()
}
