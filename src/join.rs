//! Joining tabular plant/biomass records to geographic features by name,
//! and deriving the marker point lists for the two overlays.
//!
//! Join-key rules: state names match by exact, case-sensitive equality
//! (controlled data); district names always go through
//! [`normalize::district`] (uncontrolled spelling). A name present on one
//! side with no partner on the other is a routine miss and resolves to an
//! empty result, never an error.

use std::collections::BTreeMap;

use ahash::AHashMap;
use geo::Point;

use crate::geojson::FeatureCollection;
use crate::geom;
use crate::normalize;
use crate::types::{BIOMASS_COLOR, MapMarker, MarkerKind, PLANT_COLOR, PlantRecord};

/// The states for which per-state biomass data exists. Order matches the
/// national marker layout; the state index panel sorts its own copy.
pub const STATES_WITH_BIOMASS: [&str; 28] = [
    "Andhra Pradesh",
    "Arunachal Pradesh",
    "Assam",
    "Bihar",
    "Chhattisgarh",
    "Gujarat",
    "Haryana",
    "Himachal Pradesh",
    "Jharkhand",
    "Karnataka",
    "Kerala",
    "Madhya Pradesh",
    "Maharashtra",
    "Manipur",
    "Meghalaya",
    "Mizoram",
    "Nagaland",
    "Odisha",
    "Punjab",
    "Rajasthan",
    "Sikkim",
    "Goa",
    "Tamil Nadu",
    "Telangana",
    "Tripura",
    "Uttar Pradesh",
    "Uttarakhand",
    "West Bengal",
];

/// Partition plants by normalized district in a single pass. Insertion order
/// within a district is preserved. A blank district groups under "unknown".
pub fn group_plants_by_district(plants: &[PlantRecord]) -> AHashMap<String, Vec<PlantRecord>> {
    let mut groups: AHashMap<String, Vec<PlantRecord>> = AHashMap::new();
    for plant in plants {
        groups
            .entry(district_key(plant))
            .or_default()
            .push(plant.clone());
    }
    groups
}

fn district_key(plant: &PlantRecord) -> String {
    if plant.district.is_empty() {
        normalize::district("Unknown")
    } else {
        normalize::district(&plant.district)
    }
}

fn parse_coordinate(raw: &str) -> f64 {
    raw.trim().parse().unwrap_or(f64::NAN)
}

/// One marker per plant, raw coordinates parsed as floating point. A plant
/// with unparsable coordinates produces a NaN position here; callers must
/// run the result through [`drop_nonfinite`] before render.
pub fn build_plant_markers(plants: &[PlantRecord]) -> Vec<MapMarker> {
    plants
        .iter()
        .map(|plant| MapMarker {
            name: if plant.name.is_empty() {
                "Unknown Plant".to_string()
            } else {
                plant.name.clone()
            },
            position: Point::new(
                parse_coordinate(&plant.longitude),
                parse_coordinate(&plant.latitude),
            ),
            kind: MarkerKind::Plant,
            color: PLANT_COLOR,
            district: Some(district_key(plant)),
        })
        .collect()
}

/// National-view biomass markers: one per candidate state whose feature is
/// present, at the state centroid plus the national nudge. States with no
/// feature match or an unsupported geometry are silently omitted.
pub fn build_state_biomass_markers(
    features: &FeatureCollection,
    candidate_states: &[&str],
) -> Vec<MapMarker> {
    let mut markers = Vec::new();
    for &state in candidate_states {
        let Some(feature) = features.find(state) else {
            continue;
        };
        let Ok(c) = geom::centroid(&feature.geometry) else {
            continue;
        };
        markers.push(MapMarker {
            name: state.to_string(),
            position: geom::national_offset(c),
            kind: MarkerKind::BiomassAvailability,
            color: BIOMASS_COLOR,
            district: None,
        });
    }
    markers
}

/// State-view biomass markers: one per district feature, at the district
/// centroid with the secondary (non-primary) nudge so the dot separates from
/// the district's plant cluster. Unsupported geometries are omitted.
pub fn build_district_biomass_markers(
    state_features: &FeatureCollection,
    state_name: &str,
) -> Vec<MapMarker> {
    let mut markers = Vec::new();
    for feature in &state_features.features {
        let Ok(c) = geom::centroid(&feature.geometry) else {
            continue;
        };
        let district = normalize::district(&feature.name);
        markers.push(MapMarker {
            name: district.clone(),
            position: geom::offset_marker(c, state_name, false),
            kind: MarkerKind::BiomassAvailability,
            color: BIOMASS_COLOR,
            district: Some(district),
        });
    }
    markers
}

/// Drop markers with non-finite coordinates. The legacy implementation fed
/// NaN positions straight to the renderer, producing invisible markers with
/// live click regions; every chart build runs its marker lists through here.
pub fn drop_nonfinite(markers: Vec<MapMarker>) -> Vec<MapMarker> {
    markers
        .into_iter()
        .filter(|m| m.position.x().is_finite() && m.position.y().is_finite())
        .collect()
}

/// An autocomplete entry: plant name plus its raw district spelling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlantNameEntry {
    pub name: String,
    pub district: String,
}

/// The sorted plant-name feed for the search widget. Rows missing a name or
/// district are skipped; sort is case-insensitive by name with stable ties.
pub fn plant_name_index(plants_by_state: &BTreeMap<String, Vec<PlantRecord>>) -> Vec<PlantNameEntry> {
    let mut entries: Vec<PlantNameEntry> = plants_by_state
        .values()
        .flatten()
        .filter(|p| !p.name.is_empty() && !p.district.is_empty())
        .map(|p| PlantNameEntry { name: p.name.clone(), district: p.district.clone() })
        .collect();
    entries.sort_by_key(|e| e.name.to_lowercase());
    entries
}
