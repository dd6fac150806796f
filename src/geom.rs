//! Centroid and marker-offset math.
//!
//! The "centroid" here is the unweighted mean of boundary vertices, not an
//! area-weighted centroid. Downstream data was calibrated against this exact
//! computation, so it must not be upgraded to a true centroid.

use geo::{Coord, Point};

use crate::error::MapError;
use crate::geojson::Geometry;

/// Unweighted vertex-mean centroid.
///
/// Polygon: mean of ring-0 vertices. MultiPolygon: mean over all vertices of
/// all rings of all polygons, flattened. Any other geometry type is
/// `UnsupportedGeometry`, which callers treat as "no marker producible".
///
/// A geometry with zero vertices yields a NaN point; the non-finite marker
/// filter removes it downstream.
pub fn centroid(geometry: &Geometry) -> Result<Point<f64>, MapError> {
    match geometry {
        Geometry::Polygon(rings) => {
            let exterior = rings.first().map(Vec::as_slice).unwrap_or(&[]);
            Ok(vertex_mean(exterior.iter()))
        }
        Geometry::MultiPolygon(polygons) => {
            Ok(vertex_mean(polygons.iter().flatten().flatten()))
        }
        Geometry::Other(ty) => Err(MapError::UnsupportedGeometry(ty.clone())),
    }
}

fn vertex_mean<'a>(coords: impl Iterator<Item = &'a Coord<f64>>) -> Point<f64> {
    let (mut sum_x, mut sum_y, mut count) = (0.0, 0.0, 0usize);
    for c in coords {
        sum_x += c.x;
        sum_y += c.y;
        count += 1;
    }
    Point::new(sum_x / count as f64, sum_y / count as f64)
}

/// Presentation nudge for state-level marker layouts, not a geographic
/// correction: in Odisha the plant-emphasis marker shifts +0.05/+0.02 and
/// the biomass marker −0.05/−0.02, so the two dots at a district centroid
/// don't overlap. Identity for every other state.
pub fn offset_marker(centroid: Point<f64>, state: &str, is_primary: bool) -> Point<f64> {
    if state != "Odisha" {
        return centroid;
    }
    let (dx, dy) = if is_primary { (0.05, 0.02) } else { (-0.05, -0.02) };
    Point::new(centroid.x() + dx, centroid.y() + dy)
}

/// Fixed nudge for national-level biomass markers, applied uniformly to
/// separate the biomass dot from the state's plant cluster at national zoom.
pub fn national_offset(centroid: Point<f64>) -> Point<f64> {
    Point::new(centroid.x() + 0.2, centroid.y() + 0.2)
}
