//! Per-polygon surface attributes.

use serde::{Deserialize, Serialize};

use crate::vertex::canonical_bits;

/// Hashable identity of a [`Shared`] attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SharedKey(Option<[u64; 3]>);

/// Surface attribute carried by a polygon and inherited by all of its
/// fragments. Currently only an optional RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Shared {
    color: Option<[f64; 3]>,
}

impl Shared {
    /// Attribute with a color.
    pub fn with_color(red: f64, green: f64, blue: f64) -> Self {
        Self {
            color: Some([red, green, blue]),
        }
    }

    /// Returns the color, if any.
    #[inline]
    pub fn color(&self) -> Option<[f64; 3]> {
        self.color
    }

    /// Returns the identity key. Two attributes with equal keys are
    /// interchangeable after canonicalization.
    pub fn key(&self) -> SharedKey {
        SharedKey(
            self.color
                .map(|[r, g, b]| [canonical_bits(r), canonical_bits(g), canonical_bits(b)]),
        )
    }
}
