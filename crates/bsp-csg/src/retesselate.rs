//! Merging of coplanar polygon fragments.
//!
//! Boolean operations leave faces cut into many small convex pieces. The
//! sweep in this module rebuilds a set of coplanar polygons sharing one
//! attribute into fewer, larger convex polygons.
//!
//! The polygons are projected into a 2D frame of their plane and swept from
//! low to high `y`. Between two consecutive distinct `y` values every active
//! polygon contributes a trapezoid; touching trapezoids in a row are merged
//! horizontally, and trapezoids continuing one from the previous row are
//! merged vertically as long as the result stays convex. Finished outlines
//! are lifted back into 3D.

use std::collections::{HashMap, HashSet};

use nalgebra::Point2;

use crate::basis::OrthoNormalBasis;
use crate::config::{EPSILON, INTERPOLATE_EPSILON, Y_BINNING_FACTOR};
use crate::line::Line2D;
use crate::{Polygon, Vertex};

/// x coordinate at height `y` on the segment `p1 → p2`.
///
/// Heights outside the segment clamp to its end points, and a segment
/// flatter than [`INTERPOLATE_EPSILON`] yields its midpoint.
pub fn interpolate_between_2d_points_for_y(p1: Point2<f64>, p2: Point2<f64>, y: f64) -> f64 {
    let mut f1 = y - p1.y;
    let mut f2 = p2.y - p1.y;
    if f2 < 0.0 {
        f1 = -f1;
        f2 = -f2;
    }
    let t = if f1 <= 0.0 {
        0.0
    } else if f1 >= f2 {
        1.0
    } else if f2 < INTERPOLATE_EPSILON {
        0.5
    } else {
        f1 / f2
    };
    p1.x + t * (p2.x - p1.x)
}

/// A polygon currently crossed by the sweep line.
#[derive(Debug, Clone, Copy)]
struct ActivePolygon {
    polygon_index: usize,
    left_vertex_index: usize,
    right_vertex_index: usize,
    top_left: Point2<f64>,
    top_right: Point2<f64>,
    bottom_left: Point2<f64>,
    bottom_right: Point2<f64>,
}

/// One trapezoid of the current sweep row.
#[derive(Debug, Clone, Copy)]
struct RowTrapezoid {
    top_left: Point2<f64>,
    top_right: Point2<f64>,
    bottom_left: Point2<f64>,
    bottom_right: Point2<f64>,
    left_line: Line2D,
    right_line: Line2D,
    outline: Option<usize>,
    left_line_continues: bool,
    right_line_continues: bool,
}

/// Outline under construction, as two chains running down the right and
/// left sides.
#[derive(Debug, Clone, Default)]
struct Outline {
    left_points: Vec<Point2<f64>>,
    right_points: Vec<Point2<f64>>,
}

/// Rebuilds a set of coplanar polygons into merged convex polygons.
///
/// All inputs must lie on the plane of the first polygon and share its
/// attribute; the outputs carry that plane and attribute. The covered area
/// is preserved. Polygons that are degenerate in the sweep direction are
/// dropped.
pub fn retesselate_coplanar_polygons(source: &[Polygon]) -> Vec<Polygon> {
    let mut dest = Vec::new();
    let Some(first) = source.first() else {
        return dest;
    };
    let plane = *first.plane();
    let shared = *first.shared();
    let basis = OrthoNormalBasis::new(&plane);

    let mut polygon_vertices_2d: Vec<Vec<Point2<f64>>> = Vec::with_capacity(source.len());
    let mut polygon_top_vertex_indexes: Vec<usize> = Vec::with_capacity(source.len());
    let mut top_y_to_polygon_indexes: HashMap<u64, Vec<usize>> = HashMap::new();
    let mut y_coordinate_to_polygon_indexes: HashMap<u64, HashSet<usize>> = HashMap::new();
    let mut y_coordinate_bins: HashMap<i64, f64> = HashMap::new();

    for (polygon_index, polygon) in source.iter().enumerate() {
        let num_vertices = polygon.vertices().len();
        let mut vertices_2d = Vec::with_capacity(num_vertices);
        let mut min_index = 0;
        let mut min_y = f64::INFINITY;
        let mut max_y = f64::NEG_INFINITY;

        for (i, vertex) in polygon.vertices().iter().enumerate() {
            let pos = basis.to_2d(&vertex.pos());
            let y = snap_y(&mut y_coordinate_bins, pos.y + 0.0);
            vertices_2d.push(Point2::new(pos.x, y));
            if i == 0 || y < min_y {
                min_y = y;
                min_index = i;
            }
            if i == 0 || y > max_y {
                max_y = y;
            }
            y_coordinate_to_polygon_indexes
                .entry(y.to_bits())
                .or_default()
                .insert(polygon_index);
        }

        if min_y >= max_y {
            // degenerate in y, contributes no area
            vertices_2d.clear();
        } else {
            top_y_to_polygon_indexes
                .entry(min_y.to_bits())
                .or_default()
                .push(polygon_index);
        }
        // walk clockwise so that increasing indexes run down the left side
        vertices_2d.reverse();
        polygon_vertices_2d.push(vertices_2d);
        polygon_top_vertex_indexes.push(num_vertices.saturating_sub(min_index + 1));
    }

    let mut y_coordinates: Vec<f64> = y_coordinate_to_polygon_indexes
        .keys()
        .map(|&bits| f64::from_bits(bits))
        .collect();
    y_coordinates.sort_by(f64::total_cmp);

    let mut active_polygons: Vec<ActivePolygon> = Vec::new();
    let mut prev_row: Vec<RowTrapezoid> = Vec::new();
    let mut outlines: Vec<Outline> = Vec::new();

    for (y_index, &y) in y_coordinates.iter().enumerate() {
        let polygons_with_corner = &y_coordinate_to_polygon_indexes[&y.to_bits()];

        // advance the active polygons that have a corner at this height
        let mut i = 0;
        while i < active_polygons.len() {
            let active = active_polygons[i];
            if !polygons_with_corner.contains(&active.polygon_index) {
                i += 1;
                continue;
            }
            let vertices = &polygon_vertices_2d[active.polygon_index];
            let n = vertices.len();

            let mut new_left = active.left_vertex_index;
            loop {
                let next = (new_left + 1) % n;
                if vertices[next].y != y || next == active.left_vertex_index {
                    break;
                }
                new_left = next;
            }
            let mut new_right = active.right_vertex_index;
            let prev = (new_right + n - 1) % n;
            if vertices[prev].y == y {
                new_right = prev;
            }

            if new_left != active.left_vertex_index && new_left == new_right {
                // the polygon ends here
                active_polygons.remove(i);
                continue;
            }
            let updated = &mut active_polygons[i];
            updated.left_vertex_index = new_left;
            updated.right_vertex_index = new_right;
            updated.top_left = vertices[new_left];
            updated.top_right = vertices[new_right];
            updated.bottom_left = vertices[(new_left + 1) % n];
            updated.bottom_right = vertices[(new_right + n - 1) % n];
            i += 1;
        }

        let next_y = if y_index + 1 >= y_coordinates.len() {
            active_polygons.clear();
            None
        } else {
            let next_y = y_coordinates[y_index + 1];
            let middle_y = 0.5 * (y + next_y);
            if let Some(starting) = top_y_to_polygon_indexes.get(&y.to_bits()) {
                for &polygon_index in starting {
                    let active = start_polygon(
                        polygon_index,
                        &polygon_vertices_2d[polygon_index],
                        polygon_top_vertex_indexes[polygon_index],
                        y,
                    );
                    let x = interpolate_between_2d_points_for_y(active.top_left, active.bottom_left, middle_y);
                    let position = active_polygons.partition_point(|other| {
                        x > interpolate_between_2d_points_for_y(other.top_left, other.bottom_left, middle_y)
                    });
                    active_polygons.insert(position, active);
                }
            }
            Some(next_y)
        };

        // build the trapezoids of this row
        let mut new_row: Vec<RowTrapezoid> = Vec::new();
        if let Some(next_y) = next_y {
            for active in &active_polygons {
                let x = interpolate_between_2d_points_for_y(active.top_left, active.bottom_left, y);
                let top_left = Point2::new(x, y);
                let x = interpolate_between_2d_points_for_y(active.top_right, active.bottom_right, y);
                let top_right = Point2::new(x, y);
                let x = interpolate_between_2d_points_for_y(active.top_left, active.bottom_left, next_y);
                let bottom_left = Point2::new(x, next_y);
                let x = interpolate_between_2d_points_for_y(active.top_right, active.bottom_right, next_y);
                let bottom_right = Point2::new(x, next_y);

                let mut trapezoid = RowTrapezoid {
                    top_left,
                    top_right,
                    bottom_left,
                    bottom_right,
                    left_line: Line2D::from_points(top_left, bottom_left),
                    right_line: Line2D::from_points(bottom_right, top_right),
                    outline: None,
                    left_line_continues: false,
                    right_line_continues: false,
                };

                if let Some(prev) = new_row.last() {
                    let d1 = (trapezoid.top_left - prev.top_right).norm();
                    let d2 = (trapezoid.bottom_left - prev.bottom_right).norm();
                    if d1 < EPSILON && d2 < EPSILON {
                        // touches the previous trapezoid, merge the two
                        trapezoid.top_left = prev.top_left;
                        trapezoid.left_line = prev.left_line;
                        trapezoid.bottom_left = prev.bottom_left;
                        new_row.pop();
                    }
                }
                new_row.push(trapezoid);
            }
        }

        if y_index > 0 {
            // continue polygons of the previous row where the result stays convex
            let mut prev_continued = vec![false; prev_row.len()];
            let mut matched = vec![false; prev_row.len()];
            for trapezoid in &mut new_row {
                for (ii, prev) in prev_row.iter().enumerate() {
                    if matched[ii] {
                        continue;
                    }
                    let d1 = (prev.bottom_left - trapezoid.top_left).norm();
                    if d1 >= EPSILON {
                        continue;
                    }
                    let d2 = (prev.bottom_right - trapezoid.top_right).norm();
                    if d2 >= EPSILON {
                        continue;
                    }
                    matched[ii] = true;

                    let d1 = trapezoid.left_line.direction().x - prev.left_line.direction().x;
                    let d2 = trapezoid.right_line.direction().x - prev.right_line.direction().x;
                    let left_continues = d1.abs() < EPSILON;
                    let right_continues = d2.abs() < EPSILON;
                    let left_convex = left_continues || d1 >= 0.0;
                    let right_convex = right_continues || d2 >= 0.0;
                    if left_convex && right_convex {
                        trapezoid.outline = prev.outline;
                        trapezoid.left_line_continues = left_continues;
                        trapezoid.right_line_continues = right_continues;
                        prev_continued[ii] = true;
                    }
                    break;
                }
            }

            // close the outlines that were not continued
            for (ii, prev) in prev_row.iter().enumerate() {
                if prev_continued[ii] {
                    continue;
                }
                let Some(outline) = prev.outline.and_then(|index| outlines.get_mut(index)) else {
                    continue;
                };
                outline.right_points.push(prev.bottom_right);
                if (prev.bottom_right - prev.bottom_left).norm() > EPSILON {
                    outline.left_points.push(prev.bottom_left);
                }
                let points = std::mem::take(&mut outline.right_points)
                    .into_iter()
                    .chain(std::mem::take(&mut outline.left_points).into_iter().rev());
                let vertices: Vec<Vertex> = points.map(|p| Vertex::new(basis.to_3d(&p))).collect();
                if vertices.len() >= 3 {
                    dest.push(Polygon::from_vertices_and_plane(vertices, shared, plane));
                }
            }
        }

        // start new outlines or extend the continued ones
        for trapezoid in &mut new_row {
            match trapezoid.outline {
                None => {
                    let mut outline = Outline {
                        left_points: vec![trapezoid.top_left],
                        right_points: Vec::new(),
                    };
                    if (trapezoid.top_left - trapezoid.top_right).norm() > EPSILON {
                        outline.right_points.push(trapezoid.top_right);
                    }
                    outlines.push(outline);
                    trapezoid.outline = Some(outlines.len() - 1);
                }
                Some(index) => {
                    let outline = &mut outlines[index];
                    if !trapezoid.left_line_continues {
                        outline.left_points.push(trapezoid.top_left);
                    }
                    if !trapezoid.right_line_continues {
                        outline.right_points.push(trapezoid.top_right);
                    }
                }
            }
        }
        prev_row = new_row;
    }

    dest
}

/// Reuses a nearby binned y value so that coordinates which differ only by
/// rounding noise compare exactly equal.
fn snap_y(bins: &mut HashMap<i64, f64>, y: f64) -> f64 {
    let bin = (y * Y_BINNING_FACTOR).floor() as i64;
    for candidate in [bin, bin + 1, bin - 1] {
        if let Some(&snapped) = bins.get(&candidate) {
            return snapped;
        }
    }
    bins.insert(bin, y);
    y
}

/// Activates a polygon whose topmost vertex lies at height `y`.
fn start_polygon(
    polygon_index: usize,
    vertices: &[Point2<f64>],
    top_vertex_index: usize,
    y: f64,
) -> ActivePolygon {
    let n = vertices.len();

    // the top edge may be horizontal: walk to its ends
    let mut top_left = top_vertex_index;
    loop {
        let next = (top_left + 1) % n;
        if vertices[next].y != y || next == top_vertex_index {
            break;
        }
        top_left = next;
    }
    let mut top_right = top_vertex_index;
    loop {
        let prev = (top_right + n - 1) % n;
        if vertices[prev].y != y || prev == top_left {
            break;
        }
        top_right = prev;
    }

    let next_left = (top_left + 1) % n;
    let next_right = (top_right + n - 1) % n;
    ActivePolygon {
        polygon_index,
        left_vertex_index: top_left,
        right_vertex_index: top_right,
        top_left: vertices[top_left],
        top_right: vertices[top_right],
        bottom_left: vertices[next_left],
        bottom_right: vertices[next_right],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Shared;
    use approx::assert_relative_eq;
    use nalgebra::Point3;

    fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> Polygon {
        Polygon::from_points(
            &[
                Point3::new(x0, y0, 0.0),
                Point3::new(x1, y0, 0.0),
                Point3::new(x1, y1, 0.0),
                Point3::new(x0, y1, 0.0),
            ],
            Shared::default(),
        )
    }

    fn total_area(polygons: &[Polygon]) -> f64 {
        polygons.iter().map(Polygon::area).sum()
    }

    #[test]
    fn interpolation_clamps_and_handles_flat_segments() {
        let a = Point2::new(0.0, 0.0);
        let b = Point2::new(2.0, 2.0);
        assert_relative_eq!(interpolate_between_2d_points_for_y(a, b, 1.0), 1.0);
        assert_relative_eq!(interpolate_between_2d_points_for_y(a, b, -1.0), 0.0);
        assert_relative_eq!(interpolate_between_2d_points_for_y(a, b, 5.0), 2.0);
        // reversed segment gives the same answer
        assert_relative_eq!(interpolate_between_2d_points_for_y(b, a, 0.5), 0.5);

        let flat_a = Point2::new(0.0, 1.0);
        let flat_b = Point2::new(4.0, 1.0 + 1e-12);
        assert_relative_eq!(interpolate_between_2d_points_for_y(flat_a, flat_b, 1.0 + 5e-13), 2.0);
    }

    #[test]
    fn empty_input_gives_empty_output() {
        assert!(retesselate_coplanar_polygons(&[]).is_empty());
    }

    #[test]
    fn single_polygon_is_preserved() {
        let square = rect(0.0, 0.0, 1.0, 1.0);
        let result = retesselate_coplanar_polygons(&[square.clone()]);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].plane(), square.plane());
        assert_eq!(result[0].len(), 4);
        assert_relative_eq!(total_area(&result), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn side_by_side_squares_merge() {
        let result = retesselate_coplanar_polygons(&[rect(0.0, 0.0, 1.0, 1.0), rect(1.0, 0.0, 2.0, 1.0)]);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].len(), 4);
        assert_relative_eq!(total_area(&result), 2.0, epsilon = 1e-12);
        assert!(result[0].is_convex());
        assert_eq!(result[0].plane().normal(), nalgebra::Vector3::z());
    }

    #[test]
    fn stacked_squares_merge() {
        let result = retesselate_coplanar_polygons(&[rect(0.0, 0.0, 1.0, 1.0), rect(0.0, 1.0, 1.0, 2.0)]);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].len(), 4);
        assert_relative_eq!(total_area(&result), 2.0, epsilon = 1e-12);
    }

    #[test]
    fn grid_of_fragments_merges_into_one() {
        let mut pieces = Vec::new();
        for i in 0..3 {
            for j in 0..3 {
                pieces.push(rect(i as f64, j as f64, i as f64 + 1.0, j as f64 + 1.0));
            }
        }
        let result = retesselate_coplanar_polygons(&pieces);
        assert_eq!(result.len(), 1);
        assert_relative_eq!(total_area(&result), 9.0, epsilon = 1e-12);
    }

    #[test]
    fn l_shape_stays_convex_pieces() {
        let pieces = [
            rect(0.0, 0.0, 1.0, 1.0),
            rect(1.0, 0.0, 2.0, 1.0),
            rect(0.0, 1.0, 1.0, 2.0),
        ];
        let result = retesselate_coplanar_polygons(&pieces);
        assert_eq!(result.len(), 2);
        assert_relative_eq!(total_area(&result), 3.0, epsilon = 1e-12);
        assert!(result.iter().all(Polygon::is_convex));
    }

    #[test]
    fn triangles_of_a_square_merge() {
        let a = Polygon::from_points(
            &[
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(1.0, 1.0, 0.0),
            ],
            Shared::default(),
        );
        let b = Polygon::from_vertices_and_plane(
            vec![
                Vertex::new(Point3::new(0.0, 0.0, 0.0)),
                Vertex::new(Point3::new(1.0, 1.0, 0.0)),
                Vertex::new(Point3::new(0.0, 1.0, 0.0)),
            ],
            Shared::default(),
            *a.plane(),
        );
        let result = retesselate_coplanar_polygons(&[a, b]);
        assert_eq!(result.len(), 1);
        assert_relative_eq!(total_area(&result), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn outputs_keep_attribute() {
        let red = Shared::with_color(1.0, 0.0, 0.0);
        let pieces = [
            rect(0.0, 0.0, 1.0, 1.0).with_shared(red),
            rect(1.0, 0.0, 2.0, 1.0).with_shared(red),
        ];
        let result = retesselate_coplanar_polygons(&pieces);
        assert!(result.iter().all(|p| p.shared() == &red));
    }
}
