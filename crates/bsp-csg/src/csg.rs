//! Solids and the boolean operations between them.

use std::collections::HashMap;

use nalgebra::{Matrix4, Point3, Vector3};
use tracing::{debug, trace};

use crate::basis::OrthoNormalBasis;
use crate::bsp::BspTree;
use crate::config::CsgOptions;
use crate::fuzzy::Canonicalizer;
use crate::retesselate::retesselate_coplanar_polygons;
use crate::transform::{self, is_mirroring};
use crate::{Plane, PlaneKey, Polygon, Shared, SharedKey, Vertex, VertexKey};

/// A solid, represented by the convex polygons of its boundary.
///
/// Polygons face outward. A `Csg` is a value: every operation returns a new
/// solid and leaves its inputs untouched.
///
/// Results of boolean operations are retesselated and canonicalized by
/// default (see [`CsgOptions`]). Two flags remember whether that
/// post-processing has already happened so repeated calls are free.
#[derive(Debug, Clone, PartialEq)]
pub struct Csg {
    polygons: Vec<Polygon>,
    is_canonicalized: bool,
    is_retesselated: bool,
}

impl Default for Csg {
    fn default() -> Self {
        Self::new()
    }
}

impl Csg {
    /// The empty solid.
    pub fn new() -> Self {
        Self {
            polygons: Vec::new(),
            is_canonicalized: true,
            is_retesselated: true,
        }
    }

    /// Wraps a list of outward-facing convex polygons.
    pub fn from_polygons(polygons: Vec<Polygon>) -> Self {
        Self {
            polygons,
            is_canonicalized: false,
            is_retesselated: false,
        }
    }

    pub(crate) fn with_flags(polygons: Vec<Polygon>, is_canonicalized: bool, is_retesselated: bool) -> Self {
        Self {
            polygons,
            is_canonicalized,
            is_retesselated,
        }
    }

    #[inline]
    pub fn polygons(&self) -> &[Polygon] {
        &self.polygons
    }

    pub fn into_polygons(self) -> Vec<Polygon> {
        self.polygons
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.polygons.is_empty()
    }

    #[inline]
    pub fn is_canonicalized(&self) -> bool {
        self.is_canonicalized
    }

    #[inline]
    pub fn is_retesselated(&self) -> bool {
        self.is_retesselated
    }

    /// Everything inside either solid.
    pub fn union(&self, other: &Csg) -> Csg {
        self.union_with(other, CsgOptions::default())
    }

    /// Union of all solids, folded left to right.
    pub fn union_all<'a>(&self, others: impl IntoIterator<Item = &'a Csg>) -> Csg {
        others
            .into_iter()
            .fold(self.clone(), |acc, other| acc.union_with(other, CsgOptions::RAW))
            .into_post_processed(CsgOptions::default())
    }

    /// [`Csg::union`] with explicit post-processing.
    pub fn union_with(&self, other: &Csg, options: CsgOptions) -> Csg {
        if !self.may_overlap(other) {
            return self.union_for_non_intersecting(other);
        }
        debug!(
            a = self.polygons.len(),
            b = other.polygons.len(),
            "union"
        );

        let mut a = BspTree::new(self.polygons.clone());
        let mut b = BspTree::new(other.polygons.clone());
        a.clip_to(&b, false);
        b.clip_to(&a, true);

        let mut polygons = a.all_polygons();
        polygons.extend(b.all_polygons());
        Csg::from_polygons(polygons).into_post_processed(options)
    }

    /// Union of two solids known not to overlap: the polygon lists are
    /// concatenated without any clipping.
    pub fn union_for_non_intersecting(&self, other: &Csg) -> Csg {
        let mut polygons = self.polygons.clone();
        polygons.extend(other.polygons.iter().cloned());
        Csg::with_flags(
            polygons,
            self.is_canonicalized && other.is_canonicalized,
            self.is_retesselated && other.is_retesselated,
        )
    }

    /// Everything inside this solid but not inside `other`.
    pub fn subtract(&self, other: &Csg) -> Csg {
        self.subtract_with(other, CsgOptions::default())
    }

    /// Subtracts all solids, folded left to right.
    pub fn subtract_all<'a>(&self, others: impl IntoIterator<Item = &'a Csg>) -> Csg {
        others
            .into_iter()
            .fold(self.clone(), |acc, other| acc.subtract_with(other, CsgOptions::RAW))
            .into_post_processed(CsgOptions::default())
    }

    /// [`Csg::subtract`] with explicit post-processing.
    pub fn subtract_with(&self, other: &Csg, options: CsgOptions) -> Csg {
        // an empty tree stays empty when inverted
        if self.is_empty() {
            return Csg::new();
        }
        debug!(
            a = self.polygons.len(),
            b = other.polygons.len(),
            "subtract"
        );
        let mut a = BspTree::new(self.polygons.clone());
        let mut b = BspTree::new(other.polygons.clone());
        a.invert();
        a.clip_to(&b, false);
        b.clip_to(&a, true);
        a.add_polygons(b.all_polygons());
        a.invert();
        Csg::from_polygons(a.all_polygons()).into_post_processed(options)
    }

    /// Everything inside both solids.
    pub fn intersect(&self, other: &Csg) -> Csg {
        self.intersect_with(other, CsgOptions::default())
    }

    /// Intersection of all solids, folded left to right.
    pub fn intersect_all<'a>(&self, others: impl IntoIterator<Item = &'a Csg>) -> Csg {
        others
            .into_iter()
            .fold(self.clone(), |acc, other| acc.intersect_with(other, CsgOptions::RAW))
            .into_post_processed(CsgOptions::default())
    }

    /// [`Csg::intersect`] with explicit post-processing.
    pub fn intersect_with(&self, other: &Csg, options: CsgOptions) -> Csg {
        if self.is_empty() || other.is_empty() {
            return Csg::new();
        }
        debug!(
            a = self.polygons.len(),
            b = other.polygons.len(),
            "intersect"
        );
        let mut a = BspTree::new(self.polygons.clone());
        let mut b = BspTree::new(other.polygons.clone());
        a.invert();
        b.clip_to(&a, false);
        b.invert();
        a.clip_to(&b, false);
        b.clip_to(&a, false);
        a.add_polygons(b.all_polygons());
        a.invert();
        Csg::from_polygons(a.all_polygons()).into_post_processed(options)
    }

    /// The solid turned inside out: every polygon flipped.
    pub fn inverse(&self) -> Csg {
        Csg::with_flags(
            self.polygons.iter().map(Polygon::flipped).collect(),
            self.is_canonicalized,
            self.is_retesselated,
        )
    }

    fn into_post_processed(self, options: CsgOptions) -> Csg {
        let mut result = self;
        if options.retesselate {
            result = result.into_retesselated();
        }
        if options.canonicalize {
            result = result.into_canonicalized();
        }
        debug!(polygons = result.polygons.len(), "boolean result");
        result
    }

    /// Copy with nearly-equal vertices, planes and attributes snapped onto
    /// shared representatives.
    pub fn canonicalized(&self) -> Csg {
        self.clone().into_canonicalized()
    }

    /// Consuming variant of [`Csg::canonicalized`].
    pub fn into_canonicalized(self) -> Csg {
        if self.is_canonicalized {
            return self;
        }
        let mut canonicalizer = Canonicalizer::new();
        let polygons = canonicalizer.polygons(&self.polygons);
        trace!(
            before = self.polygons.len(),
            after = polygons.len(),
            "canonicalized"
        );
        Csg::with_flags(polygons, true, self.is_retesselated)
    }

    /// Copy with coplanar fragments of equal attribute merged into larger
    /// convex polygons. The result is canonicalized as well.
    pub fn retesselated(&self) -> Csg {
        self.clone().into_retesselated()
    }

    /// Consuming variant of [`Csg::retesselated`].
    pub fn into_retesselated(self) -> Csg {
        if self.is_retesselated {
            return self;
        }
        let canonical = self.into_canonicalized();

        let mut group_order: Vec<(PlaneKey, SharedKey)> = Vec::new();
        let mut groups: HashMap<(PlaneKey, SharedKey), Vec<Polygon>> = HashMap::new();
        for polygon in canonical.polygons {
            let key = (polygon.plane().key(), polygon.shared().key());
            groups
                .entry(key)
                .or_insert_with(|| {
                    group_order.push(key);
                    Vec::new()
                })
                .push(polygon);
        }
        trace!(groups = group_order.len(), "retesselating coplanar groups");

        let mut polygons = Vec::new();
        for key in group_order {
            let Some(group) = groups.remove(&key) else {
                continue;
            };
            if group.len() < 2 {
                polygons.extend(group);
            } else {
                polygons.extend(retesselate_coplanar_polygons(&group));
            }
        }

        Csg::with_flags(polygons, false, true).into_canonicalized()
    }

    /// Applies an affine transformation. Each distinct plane and vertex is
    /// transformed once; mirroring transformations reverse vertex order so
    /// polygons keep facing outward.
    pub fn transform(&self, matrix: &Matrix4<f64>) -> Csg {
        let mirror = is_mirroring(matrix);
        let mut planes: HashMap<PlaneKey, Plane> = HashMap::new();
        let mut vertices: HashMap<VertexKey, Vertex> = HashMap::new();

        let polygons = self
            .polygons
            .iter()
            .map(|polygon| {
                let plane = *planes
                    .entry(polygon.plane().key())
                    .or_insert_with(|| polygon.plane().transform(matrix));
                let mut new_vertices: Vec<Vertex> = polygon
                    .vertices()
                    .iter()
                    .map(|v| *vertices.entry(v.key()).or_insert_with(|| v.transform(matrix)))
                    .collect();
                if mirror {
                    new_vertices.reverse();
                }
                Polygon::from_vertices_and_plane(new_vertices, *polygon.shared(), plane)
            })
            .collect();

        Csg::with_flags(polygons, self.is_canonicalized, self.is_retesselated)
    }

    pub fn translate(&self, offset: Vector3<f64>) -> Csg {
        self.transform(&transform::translation(offset))
    }

    pub fn scale(&self, factors: Vector3<f64>) -> Csg {
        self.transform(&transform::scaling(factors))
    }

    /// Rotates around the x axis, angle in degrees.
    pub fn rotate_x(&self, degrees: f64) -> Csg {
        self.transform(&transform::rotation_x(degrees))
    }

    /// Rotates around the y axis, angle in degrees.
    pub fn rotate_y(&self, degrees: f64) -> Csg {
        self.transform(&transform::rotation_y(degrees))
    }

    /// Rotates around the z axis, angle in degrees.
    pub fn rotate_z(&self, degrees: f64) -> Csg {
        self.transform(&transform::rotation_z(degrees))
    }

    /// Rotates around the axis through `center`, angle in degrees.
    pub fn rotate(&self, center: Point3<f64>, axis: Vector3<f64>, degrees: f64) -> Csg {
        self.transform(&transform::rotation(center, axis, degrees))
    }

    /// Reflects the solid through `plane`.
    pub fn mirrored(&self, plane: &Plane) -> Csg {
        self.transform(&transform::mirroring(plane))
    }

    /// Axis-aligned bounds as `(min, max)`, or `None` for the empty solid.
    pub fn bounds(&self) -> Option<(Point3<f64>, Point3<f64>)> {
        let mut iter = self.polygons.iter().map(Polygon::bounding_box);
        let first = iter.next()?;
        Some(iter.fold(first, |(min, max), (lo, hi)| (min.inf(&lo), max.sup(&hi))))
    }

    /// Cheap conservative test: `false` guarantees the solids do not
    /// overlap, `true` means they might.
    pub fn may_overlap(&self, other: &Csg) -> bool {
        let (Some((min_a, max_a)), Some((min_b, max_b))) = (self.bounds(), other.bounds()) else {
            return false;
        };
        (0..3).all(|axis| min_a[axis] <= max_b[axis] && max_a[axis] >= min_b[axis])
    }

    /// Keeps the part of the solid behind `plane`, closing the cut with a
    /// face lying in the plane.
    pub fn cut_by_plane(&self, plane: &Plane) -> Csg {
        if self.polygons.is_empty() {
            return Csg::new();
        }

        // a square on the plane, large enough to cover the whole solid
        let plane_center = Point3::from(plane.normal() * plane.w());
        let max_distance = self
            .polygons
            .iter()
            .flat_map(Polygon::vertices)
            .map(|v| (v.pos() - plane_center).norm_squared())
            .fold(0.0_f64, f64::max)
            .sqrt()
            * 1.01;

        let basis = OrthoNormalBasis::new(plane);
        let corners = [
            (max_distance, -max_distance),
            (-max_distance, -max_distance),
            (-max_distance, max_distance),
            (max_distance, max_distance),
        ];
        let vertices = corners
            .iter()
            .map(|&(x, y)| Vertex::new(basis.to_3d(&nalgebra::Point2::new(x, y))))
            .collect();
        let square = Polygon::from_vertices_and_plane(vertices, Shared::default(), plane.flipped());

        let slab = square.extrude(plane.normal() * -max_distance);
        self.intersect(&slab)
    }

    /// Copy with every polygon carrying `shared`.
    pub fn with_shared(&self, shared: Shared) -> Csg {
        Csg::with_flags(
            self.polygons.iter().map(|p| p.with_shared(shared)).collect(),
            false,
            false,
        )
    }

    /// Copy with every polygon colored.
    pub fn with_color(&self, red: f64, green: f64, blue: f64) -> Csg {
        self.with_shared(Shared::with_color(red, green, blue))
    }

    /// Total area of the boundary.
    pub fn surface_area(&self) -> f64 {
        self.polygons.iter().map(Polygon::area).sum()
    }

    /// Enclosed volume. Only meaningful for closed, outward-facing solids.
    pub fn volume(&self) -> f64 {
        self.polygons
            .iter()
            .flat_map(Polygon::triangles)
            .map(|t| t.signed_volume())
            .sum()
    }
}

impl From<Vec<Polygon>> for Csg {
    fn from(polygons: Vec<Polygon>) -> Self {
        Csg::from_polygons(polygons)
    }
}
