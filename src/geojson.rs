//! Tolerant GeoJSON parsing for the two feature granularities the map uses:
//! state outlines (named by the `st_nm` property) and district outlines
//! (named by the `district` property).
//!
//! Rings are kept exactly as they appear in the source file — no closing
//! point is added or removed — because the centroid is the unweighted mean
//! of the vertices as present in the data.

use anyhow::{Context, Result, anyhow};
use geo::Coord;
use serde_json::Value;

/// Name property at state granularity.
pub const STATE_NAME_PROPERTY: &str = "st_nm";
/// Name property at district granularity.
pub const DISTRICT_NAME_PROPERTY: &str = "district";

type Ring = Vec<Coord<f64>>;

/// Raw geometry of a feature. Unknown types keep their tag so the centroid
/// error can name them.
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    /// Rings of the polygon; ring 0 is the exterior.
    Polygon(Vec<Ring>),
    /// Per polygon, the rings of that polygon.
    MultiPolygon(Vec<Vec<Ring>>),
    Other(String),
}

/// A single named shape (state or district). Never mutated after parse.
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    pub name: String,
    pub geometry: Geometry,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct FeatureCollection {
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    /// Parse a FeatureCollection, taking feature names from `name_property`.
    /// Features without that property are skipped rather than failing the
    /// whole file; malformed coordinates are an error.
    pub fn from_value(value: &Value, name_property: &str) -> Result<Self> {
        let mut features = Vec::new();

        if let Some(raw_features) = value["features"].as_array() {
            for raw in raw_features {
                let Some(name) = raw["properties"][name_property].as_str() else {
                    continue;
                };
                let geometry = parse_geometry(&raw["geometry"])
                    .with_context(|| format!("feature {:?}", name))?;
                features.push(Feature { name: name.trim().to_string(), geometry });
            }
        }

        Ok(Self { features })
    }

    pub fn from_slice(bytes: &[u8], name_property: &str) -> Result<Self> {
        let value: Value =
            serde_json::from_slice(bytes).context("failed to parse GeoJSON bytes")?;
        Self::from_value(&value, name_property)
    }

    /// Exact, case-sensitive name lookup (state-level joins; source data is
    /// controlled at state granularity).
    pub fn find(&self, name: &str) -> Option<&Feature> {
        self.features.iter().find(|f| f.name == name)
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

fn parse_geometry(geometry: &Value) -> Result<Geometry> {
    match geometry["type"].as_str() {
        Some("Polygon") => {
            let rings = geometry["coordinates"]
                .as_array()
                .ok_or_else(|| anyhow!("Polygon has no coordinate array"))?;
            Ok(Geometry::Polygon(parse_rings(rings)?))
        }
        Some("MultiPolygon") => {
            let polygons = geometry["coordinates"]
                .as_array()
                .ok_or_else(|| anyhow!("MultiPolygon has no coordinate array"))?;
            let parsed = polygons
                .iter()
                .map(|rings| {
                    rings
                        .as_array()
                        .ok_or_else(|| anyhow!("MultiPolygon member is not an array"))
                        .and_then(|r| parse_rings(r))
                })
                .collect::<Result<Vec<_>>>()?;
            Ok(Geometry::MultiPolygon(parsed))
        }
        Some(other) => Ok(Geometry::Other(other.to_string())),
        None => Ok(Geometry::Other("missing".to_string())),
    }
}

fn parse_rings(rings: &[Value]) -> Result<Vec<Ring>> {
    rings
        .iter()
        .map(|ring| {
            ring.as_array()
                .ok_or_else(|| anyhow!("ring is not an array"))
                .and_then(|coords| parse_ring(coords))
        })
        .collect()
}

fn parse_ring(coords: &[Value]) -> Result<Ring> {
    let mut points = Vec::with_capacity(coords.len());
    for pair in coords {
        let pair = pair
            .as_array()
            .ok_or_else(|| anyhow!("coordinate is not an array"))?;
        if pair.len() < 2 {
            return Err(anyhow!("coordinate has fewer than two components"));
        }
        let x = pair[0]
            .as_f64()
            .ok_or_else(|| anyhow!("invalid coordinate: x must be a number"))?;
        let y = pair[1]
            .as_f64()
            .ok_or_else(|| anyhow!("invalid coordinate: y must be a number"))?;
        points.push(Coord { x, y });
    }
    Ok(points)
}
