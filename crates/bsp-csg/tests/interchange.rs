mod helpers;

use approx::assert_relative_eq;
use bsp_csg::{CompactBinary, Csg, CsgError};
use helpers::{cube, sphere};
use nalgebra::{Point3, Vector3};

fn sample() -> Csg {
    let block = cube(Point3::origin(), 1.0).with_color(0.2, 0.4, 0.6);
    let ball = sphere(Point3::new(0.8, 0.0, 0.0), 0.6, 12, 6).with_color(1.0, 0.0, 0.0);
    block.subtract(&ball)
}

#[test]
fn binary_round_trip_keeps_assignments() {
    let solid = sample();
    let bin = solid.to_compact_binary();
    let decoded = Csg::from_compact_binary(&bin).expect("valid binary");

    assert_eq!(decoded.polygons().len(), solid.polygons().len());
    assert_eq!(bin.num_polygons as usize, solid.polygons().len());
    assert_eq!(bin.shared.len(), 2);
    for (before, after) in solid.canonicalized().polygons().iter().zip(decoded.polygons()) {
        assert_eq!(before.vertices(), after.vertices());
        assert_eq!(before.plane().key(), after.plane().key());
        assert_eq!(before.shared().key(), after.shared().key());
    }
    assert_relative_eq!(decoded.volume(), solid.volume(), epsilon = 1e-12);
}

#[test]
fn vertices_are_shared_between_polygons() {
    let bin = cube(Point3::origin(), 1.0).to_compact_binary();
    assert_eq!(bin.vertex_data.len(), 8 * 3);
    assert_eq!(bin.plane_data.len(), 6 * 4);
    assert_eq!(bin.polygon_vertices.len(), 6 * 4);
    assert!(bin.polygon_vertices.iter().all(|&i| i < 8));
}

#[test]
fn json_round_trip() {
    let bin = sample().to_compact_binary();
    let json = serde_json::to_string(&bin).expect("serialize");
    let back: CompactBinary = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(back, bin);
    let decoded = Csg::try_from(&back).expect("valid binary");
    assert_eq!(decoded.to_compact_binary(), bin);
}

#[test]
fn truncated_binary_is_rejected() {
    let mut bin = sample().to_compact_binary();
    bin.polygon_vertices.truncate(bin.polygon_vertices.len() - 2);
    assert!(matches!(
        Csg::from_compact_binary(&bin),
        Err(CsgError::MalformedBinary(_))
    ));

    let mut bin = sample().to_compact_binary();
    bin.num_polygons += 1;
    assert!(Csg::from_compact_binary(&bin).is_err());
}

#[test]
fn stl_of_a_cube() {
    let stl = cube(Point3::new(0.0, 0.0, 0.0), 0.5).to_stl_string();
    assert!(stl.starts_with("solid csg.rs\n"));
    assert!(stl.ends_with("endsolid csg.rs\n"));
    assert_eq!(stl.matches("facet normal").count(), 12);
    assert_eq!(stl.matches("facet normal 0 0 1\n").count(), 2);
    assert_eq!(stl.matches("vertex ").count(), 36);
}

#[test]
fn stl_follows_transforms() {
    let moved = cube(Point3::origin(), 0.5).translate(Vector3::new(10.0, 0.0, 0.0));
    let stl = format!("{}", moved.stl());
    assert!(stl.contains("vertex 10.5 0.5 0.5"));
    assert!(!stl.contains("vertex 0.5 0.5 0.5"));
}
