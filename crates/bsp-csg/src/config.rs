//! Tolerances and operation switches shared by the whole kernel.

/// Distance tolerance for plane classification.
/// Points within this distance of a plane are considered "on" the plane.
pub const EPSILON: f64 = 1e-5;

/// Extra radius added to a polygon's bounding sphere before the
/// whole-polygon front/back shortcut is taken.
pub const BOUNDING_SPHERE_MARGIN: f64 = 1e-4;

/// Cell size used when merging near-identical vertices and planes.
pub const CANONICAL_TOLERANCE: f64 = 1e-5;

/// Multiplier applied to projected y coordinates before binning them in the
/// retesselation sweep.
pub const Y_BINNING_FACTOR: f64 = 10.0 / EPSILON;

/// Below this height a segment is treated as horizontal when interpolating x for a given y.
pub const INTERPOLATE_EPSILON: f64 = 1e-10;

/// Maximum point distance for two 3D lines to compare equal.
pub const LINE_EQUALITY_TOLERANCE: f64 = 1e-8;

/// Minimum direction length for two planes to be considered non-parallel.
pub const PARALLEL_PLANES_EPSILON: f64 = 1e-10;

/// Post-processing applied to the result of a boolean operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CsgOptions {
    /// Merge coplanar fragments back into larger convex polygons.
    pub retesselate: bool,
    /// Snap near-identical vertices and planes onto shared representatives.
    pub canonicalize: bool,
}

impl CsgOptions {
    /// No post-processing. Useful when accumulating many small unions
    /// where only the final result needs cleaning up.
    pub const RAW: Self = Self {
        retesselate: false,
        canonicalize: false,
    };
}

impl Default for CsgOptions {
    fn default() -> Self {
        Self {
            retesselate: true,
            canonicalize: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_options_clean_up_results() {
        let options = CsgOptions::default();
        assert!(options.retesselate);
        assert!(options.canonicalize);
    }

    #[test]
    fn binning_factor_is_ten_cells_per_epsilon() {
        assert!((Y_BINNING_FACTOR * EPSILON - 10.0).abs() < 1e-9);
    }
}
