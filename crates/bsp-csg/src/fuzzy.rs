//! Tolerance-based deduplication of vertices, planes and attributes.
//!
//! Values are quantized per dimension. On insertion a representative is
//! registered under both the floor and the ceiling of each quantized
//! coordinate; lookups use the rounded coordinate. This way any value within
//! roughly one cell of a representative finds it, regardless of where the
//! cell boundaries fall.

use std::collections::{HashMap, HashSet};

use crate::config::CANONICAL_TOLERANCE;
use crate::{Plane, Polygon, Shared, SharedKey, Vertex};

/// Maps nearly-equal value tuples onto one stored representative.
#[derive(Debug, Clone)]
pub struct FuzzyFactory<T> {
    lookup_tables: Vec<HashMap<i64, HashSet<usize>>>,
    objects: Vec<T>,
    multiplier: f64,
}

impl<T> FuzzyFactory<T> {
    /// Factory for `num_dimensions`-tuples, merging values closer than
    /// `tolerance`.
    pub fn new(num_dimensions: usize, tolerance: f64) -> Self {
        Self {
            lookup_tables: vec![HashMap::new(); num_dimensions],
            objects: Vec::new(),
            multiplier: 1.0 / tolerance,
        }
    }

    /// Number of representatives created so far.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Returns the representative matching `elements`, creating it with
    /// `create` when none is close enough.
    ///
    /// # Panics
    /// Panics if `elements` does not have the configured number of dimensions.
    pub fn lookup_or_create(&mut self, elements: &[f64], create: impl FnOnce() -> T) -> &T {
        assert_eq!(
            elements.len(),
            self.lookup_tables.len(),
            "fuzzy lookup dimension mismatch"
        );
        let id = match self.lookup(elements) {
            Some(id) => id,
            None => self.insert(elements, create()),
        };
        &self.objects[id]
    }

    fn lookup(&self, elements: &[f64]) -> Option<usize> {
        let mut candidates: Option<HashSet<usize>> = None;
        for (table, value) in self.lookup_tables.iter().zip(elements) {
            let ids = table.get(&quantize(value * self.multiplier, f64::round))?;
            let next = match candidates {
                None => ids.clone(),
                Some(current) => current.intersection(ids).copied().collect(),
            };
            if next.is_empty() {
                return None;
            }
            candidates = Some(next);
        }
        candidates.and_then(|ids| ids.into_iter().min())
    }

    fn insert(&mut self, elements: &[f64], object: T) -> usize {
        let id = self.objects.len();
        self.objects.push(object);
        for (table, value) in self.lookup_tables.iter_mut().zip(elements) {
            let scaled = value * self.multiplier;
            table
                .entry(quantize(scaled, f64::floor))
                .or_default()
                .insert(id);
            table
                .entry(quantize(scaled, f64::ceil))
                .or_default()
                .insert(id);
        }
        id
    }
}

fn quantize(scaled: f64, round: fn(f64) -> f64) -> i64 {
    round(scaled) as i64
}

/// Snaps the vertices, planes and attributes of many polygons onto shared
/// representatives, so that nearly-equal values become exactly equal.
///
/// The first value seen in each tolerance cell becomes the representative.
#[derive(Debug, Clone)]
pub struct Canonicalizer {
    vertices: FuzzyFactory<Vertex>,
    planes: FuzzyFactory<Plane>,
    shared: HashMap<SharedKey, Shared>,
}

impl Default for Canonicalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Canonicalizer {
    pub fn new() -> Self {
        Self {
            vertices: FuzzyFactory::new(3, CANONICAL_TOLERANCE),
            planes: FuzzyFactory::new(4, CANONICAL_TOLERANCE),
            shared: HashMap::new(),
        }
    }

    pub fn vertex(&mut self, vertex: &Vertex) -> Vertex {
        let p = vertex.pos();
        *self.vertices.lookup_or_create(&[p.x, p.y, p.z], || *vertex)
    }

    pub fn plane(&mut self, plane: &Plane) -> Plane {
        let n = plane.normal();
        *self
            .planes
            .lookup_or_create(&[n.x, n.y, n.z, plane.w()], || *plane)
    }

    pub fn shared(&mut self, shared: &Shared) -> Shared {
        *self.shared.entry(shared.key()).or_insert(*shared)
    }

    /// Canonical copy of `polygon`.
    ///
    /// Consecutive vertices that snapped onto the same representative are
    /// merged. Returns `None` when fewer than three distinct vertices remain.
    pub fn polygon(&mut self, polygon: &Polygon) -> Option<Polygon> {
        let mut vertices: Vec<Vertex> = Vec::with_capacity(polygon.len());
        for v in polygon.vertices() {
            let canonical = self.vertex(v);
            if vertices.last().map(Vertex::key) != Some(canonical.key()) {
                vertices.push(canonical);
            }
        }
        while vertices.len() > 1
            && vertices.first().map(Vertex::key) == vertices.last().map(Vertex::key)
        {
            vertices.pop();
        }
        if vertices.len() < 3 {
            return None;
        }

        let plane = self.plane(polygon.plane());
        let shared = self.shared(polygon.shared());
        Some(Polygon::from_vertices_and_plane(vertices, shared, plane))
    }

    pub fn polygons(&mut self, polygons: &[Polygon]) -> Vec<Polygon> {
        polygons.iter().filter_map(|p| self.polygon(p)).collect()
    }
}
