mod helpers;

use std::f64::consts::PI;

use approx::assert_relative_eq;
use bsp_csg::{Csg, CsgOptions, Plane};
use helpers::{cube, distinct_planes, is_convex_with_tolerance, sphere, unit_cube_at, vertices_on_planes};
use nalgebra::{Point3, Vector3};

fn assert_well_formed(csg: &Csg) {
    assert!(vertices_on_planes(csg));
    for polygon in csg.polygons() {
        assert!(polygon.len() >= 3);
        assert!(is_convex_with_tolerance(polygon), "reflex corner in {polygon:?}");
    }
}

#[test]
fn union_of_overlapping_cubes() {
    let a = unit_cube_at(Point3::origin());
    let b = unit_cube_at(Point3::new(0.5, 0.0, 0.0));
    let union = a.union(&b);

    assert_relative_eq!(union.volume(), 1.5, epsilon = 1e-9);
    assert_relative_eq!(union.surface_area(), 8.0, epsilon = 1e-9);
    assert_eq!(distinct_planes(&union), 6);
    assert!(union.polygons().len() <= 10);
    assert_well_formed(&union);

    let (min, max) = union.bounds().expect("non-empty");
    assert_relative_eq!(min, Point3::new(0.0, 0.0, 0.0), epsilon = 1e-9);
    assert_relative_eq!(max, Point3::new(1.5, 1.0, 1.0), epsilon = 1e-9);
}

#[test]
fn intersection_of_overlapping_cubes() {
    let a = unit_cube_at(Point3::origin());
    let b = unit_cube_at(Point3::new(0.5, 0.0, 0.0));
    let common = a.intersect(&b);

    assert_relative_eq!(common.volume(), 0.5, epsilon = 1e-9);
    assert_relative_eq!(common.surface_area(), 4.0, epsilon = 1e-9);
    assert_eq!(distinct_planes(&common), 6);
    assert_well_formed(&common);
}

#[test]
fn subtraction_of_overlapping_cubes() {
    let a = unit_cube_at(Point3::origin());
    let b = unit_cube_at(Point3::new(0.5, 0.0, 0.0));
    let rest = a.subtract(&b);

    assert_relative_eq!(rest.volume(), 0.5, epsilon = 1e-9);
    assert_relative_eq!(rest.surface_area(), 4.0, epsilon = 1e-9);
    let (_, max) = rest.bounds().expect("non-empty");
    assert_relative_eq!(max.x, 0.5, epsilon = 1e-9);
    assert_well_formed(&rest);
}

#[test]
fn volumes_follow_inclusion_exclusion() {
    let a = unit_cube_at(Point3::origin());
    let b = unit_cube_at(Point3::new(0.3, 0.4, 0.2));
    let overlap = 0.7 * 0.6 * 0.8;

    assert_relative_eq!(a.intersect(&b).volume(), overlap, epsilon = 1e-9);
    assert_relative_eq!(a.union(&b).volume(), 2.0 - overlap, epsilon = 1e-9);
    assert_relative_eq!(a.subtract(&b).volume(), 1.0 - overlap, epsilon = 1e-9);
    assert_relative_eq!(b.subtract(&a).volume(), 1.0 - overlap, epsilon = 1e-9);
}

#[test]
fn union_and_intersection_commute() {
    let a = unit_cube_at(Point3::origin());
    let b = unit_cube_at(Point3::new(0.3, 0.4, 0.2));

    for (ab, ba) in [(a.union(&b), b.union(&a)), (a.intersect(&b), b.intersect(&a))] {
        assert_relative_eq!(ab.volume(), ba.volume(), epsilon = 1e-9);
        assert_relative_eq!(ab.surface_area(), ba.surface_area(), epsilon = 1e-9);
        assert_eq!(distinct_planes(&ab), distinct_planes(&ba));
    }
}

#[test]
fn surface_areas_follow_inclusion_exclusion() {
    let a = unit_cube_at(Point3::origin());
    let b = unit_cube_at(Point3::new(0.5, 0.0, 0.0));
    let total = a.union(&b).surface_area() + a.intersect(&b).surface_area();
    assert_relative_eq!(total, a.surface_area() + b.surface_area(), epsilon = 1e-9);
}

#[test]
fn intersection_of_separated_copies_is_empty() {
    let a = cube(Point3::origin(), 0.5);
    let b = a.translate(Vector3::new(3.0, 0.0, 0.0));
    assert!(!a.may_overlap(&b));
    assert!(a.intersect(&b).is_empty());
    assert_eq!(a.union(&b).polygons().len(), 12);
}

#[test]
fn disjoint_intersection_is_empty() {
    let a = unit_cube_at(Point3::origin());
    let b = unit_cube_at(Point3::new(5.0, 5.0, 5.0));
    assert!(a.intersect(&b).is_empty());
    assert_relative_eq!(a.subtract(&b).volume(), 1.0, epsilon = 1e-12);
}

#[test]
fn carved_part_does_not_intersect_the_cutter() {
    let a = cube(Point3::origin(), 1.0);
    let b = cube(Point3::new(2.5, 0.0, 0.0), 2.0);

    let carved = a.subtract(&b);
    assert_relative_eq!(carved.volume(), 6.0, epsilon = 1e-9);
    assert!(carved.intersect(&b).is_empty());
    assert!(b.intersect(&carved).is_empty());
}

#[test]
fn cube_minus_inner_sphere() {
    let block = cube(Point3::origin(), 1.0);
    let ball = sphere(Point3::origin(), 0.5, 16, 8);
    let hollow = block.subtract(&ball);

    assert_relative_eq!(hollow.volume(), 8.0 - ball.volume(), epsilon = 1e-6);
    let exact = 8.0 - 4.0 / 3.0 * PI * 0.125;
    assert!((hollow.volume() - exact).abs() / exact < 0.01);
    assert_eq!(hollow.polygons().len(), block.polygons().len() + ball.polygons().len());

    // the sphere is fully enclosed, so intersecting gives it back
    let inner = block.intersect(&ball);
    assert_relative_eq!(inner.volume(), ball.volume(), epsilon = 1e-6);
}

fn overlapping_spheres() -> (Csg, Csg) {
    (
        sphere(Point3::origin(), 1.0, 16, 8),
        sphere(Point3::new(0.6, 0.3, 0.2), 0.8, 16, 8),
    )
}

#[test]
fn sphere_volumes_follow_inclusion_exclusion() {
    let (a, b) = overlapping_spheres();
    let (va, vb) = (a.volume(), b.volume());
    let overlap = a.intersect(&b).volume();
    assert!(overlap > 1.0 && overlap < vb);

    // canonicalization moves vertices by up to 1e-5
    assert_relative_eq!(a.union(&b).volume(), va + vb - overlap, epsilon = 1e-4);
    assert_relative_eq!(a.subtract(&b).volume(), va - overlap, epsilon = 1e-4);
    assert_relative_eq!(b.subtract(&a).volume(), vb - overlap, epsilon = 1e-4);

    let raw_overlap = a.intersect_with(&b, CsgOptions::RAW).volume();
    assert_relative_eq!(
        a.union_with(&b, CsgOptions::RAW).volume(),
        va + vb - raw_overlap,
        epsilon = 1e-8
    );
    assert_relative_eq!(
        a.subtract_with(&b, CsgOptions::RAW).volume(),
        va - raw_overlap,
        epsilon = 1e-8
    );
}

#[test]
fn carved_sphere_does_not_intersect_the_cutter() {
    let (a, b) = overlapping_spheres();
    assert_well_formed(&a.subtract_with(&b, CsgOptions::RAW));

    let carved = a.subtract(&b);

    let leftover = carved.intersect(&b);
    assert!(leftover.volume().abs() < 1e-6, "volume {}", leftover.volume());
    let leftover = b.intersect(&carved);
    assert!(leftover.volume().abs() < 1e-6, "volume {}", leftover.volume());
}

#[test]
fn empty_operands() {
    let a = unit_cube_at(Point3::origin());
    let empty = Csg::new();

    assert_eq!(a.union(&empty).polygons().len(), 6);
    assert_relative_eq!(empty.union(&a).volume(), 1.0, epsilon = 1e-12);
    assert_relative_eq!(a.subtract(&empty).volume(), 1.0, epsilon = 1e-12);
    assert!(empty.subtract(&a).is_empty());
    assert!(a.intersect(&empty).is_empty());
    assert!(empty.intersect(&a).is_empty());
}

#[test]
fn raw_results_keep_every_fragment() {
    let a = unit_cube_at(Point3::origin());
    let b = unit_cube_at(Point3::new(0.5, 0.5, 0.0));

    let raw = a.union_with(&b, CsgOptions::RAW);
    let clean = a.union(&b);
    assert!(raw.polygons().len() >= clean.polygons().len());
    assert_relative_eq!(raw.volume(), clean.volume(), epsilon = 1e-9);
    assert_relative_eq!(raw.surface_area(), clean.surface_area(), epsilon = 1e-9);
    assert_relative_eq!(clean.volume(), 1.75, epsilon = 1e-9);
}

#[test]
fn cut_by_plane_through_rotated_solid() {
    let block = cube(Point3::origin(), 1.0).rotate_z(45.0);
    let half = block.cut_by_plane(&Plane::new(Vector3::x(), 0.0));

    assert_relative_eq!(half.volume(), 4.0, epsilon = 1e-9);
    let (_, max) = half.bounds().expect("non-empty");
    assert!(max.x < 1e-9);
    assert_well_formed(&half);
}

#[test]
fn mirrored_union_matches_union_of_mirrors() {
    let a = unit_cube_at(Point3::origin());
    let b = unit_cube_at(Point3::new(0.3, 0.4, 0.2));
    let plane = Plane::new(Vector3::new(1.0, 1.0, 0.0), 0.25);

    let lhs = a.union(&b).mirrored(&plane);
    let rhs = a.mirrored(&plane).union(&b.mirrored(&plane));
    assert_relative_eq!(lhs.volume(), rhs.volume(), epsilon = 1e-9);
    assert_relative_eq!(lhs.surface_area(), rhs.surface_area(), epsilon = 1e-9);
    assert!(lhs.volume() > 0.0);
}
