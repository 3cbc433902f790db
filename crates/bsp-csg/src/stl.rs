//! ASCII STL export.

use std::fmt;

use crate::{Csg, Polygon};

const SOLID_NAME: &str = "csg.rs";

/// Displays a solid as an ASCII STL document. Every polygon is written as a
/// fan of triangles sharing the polygon's plane normal.
#[derive(Debug, Clone, Copy)]
pub struct Stl<'a>(&'a Csg);

impl fmt::Display for Stl<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "solid {SOLID_NAME}")?;
        for polygon in self.0.polygons() {
            write_polygon(f, polygon)?;
        }
        writeln!(f, "endsolid {SOLID_NAME}")
    }
}

fn write_polygon(f: &mut fmt::Formatter<'_>, polygon: &Polygon) -> fmt::Result {
    let n = polygon.plane().normal();
    for triangle in polygon.triangles() {
        writeln!(f, "facet normal {} {} {}", n.x, n.y, n.z)?;
        writeln!(f, "outer loop")?;
        for p in triangle.vertices() {
            writeln!(f, "vertex {} {} {}", p.x, p.y, p.z)?;
        }
        writeln!(f, "endloop")?;
        writeln!(f, "endfacet")?;
    }
    Ok(())
}

impl Csg {
    /// STL view of the solid, for use with `format!` or `write!`.
    pub fn stl(&self) -> Stl<'_> {
        Stl(self)
    }

    /// The solid as an ASCII STL document.
    pub fn to_stl_string(&self) -> String {
        self.stl().to_string()
    }
}
