//! Polygon vertices.

use nalgebra::{Matrix4, Point3};

/// Hashable identity of a vertex position.
///
/// Built from the bit patterns of the coordinates, so it is stable across
/// clones and solids. After canonicalization two vertices that were snapped
/// onto the same representative always produce the same key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VertexKey([u64; 3]);

/// A polygon corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    pos: Point3<f64>,
}

impl Vertex {
    /// Creates a vertex at the given position.
    #[inline]
    pub fn new(pos: Point3<f64>) -> Self {
        Self { pos }
    }

    /// Returns the vertex position.
    #[inline]
    pub fn pos(&self) -> Point3<f64> {
        self.pos
    }

    /// Returns the identity key of this vertex.
    pub fn key(&self) -> VertexKey {
        VertexKey([
            canonical_bits(self.pos.x),
            canonical_bits(self.pos.y),
            canonical_bits(self.pos.z),
        ])
    }

    /// Returns the vertex with orientation-specific data flipped.
    ///
    /// Plain vertices carry no orientation, so this is the identity.
    #[inline]
    pub fn flipped(&self) -> Self {
        *self
    }

    /// Linearly interpolates towards `other`.
    pub fn interpolate(&self, other: &Vertex, t: f64) -> Self {
        Self::new(self.pos + (other.pos - self.pos) * t)
    }

    /// Applies an affine transformation.
    pub fn transform(&self, matrix: &Matrix4<f64>) -> Self {
        Self::new(matrix.transform_point(&self.pos))
    }
}

impl From<Point3<f64>> for Vertex {
    fn from(pos: Point3<f64>) -> Self {
        Self::new(pos)
    }
}

/// Bit pattern of a float with negative zero folded onto positive zero.
#[inline]
pub(crate) fn canonical_bits(value: f64) -> u64 {
    (value + 0.0).to_bits()
}
