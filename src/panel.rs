//! Detail-panel composition: the structured content shown when a state
//! biomass marker, a district, or a sidebar index entry is clicked. Pure
//! functions from records to display rows; no rendering here.

use std::collections::BTreeMap;

use crate::join::STATES_WITH_BIOMASS;
use crate::types::{BiomassDistrictRecord, BiomassStateRecord, MapMarker, MarkerKind, PlantRecord};

/// Fixed column headers of the state biomass table.
pub const BIOMASS_COLUMNS: [&str; 9] = [
    "Wheat",
    "Rice",
    "Maize",
    "Bajra",
    "Sugarcane",
    "Groundnut",
    "Rapeseed Mustard",
    "Arhar/Tur",
    "Sum",
];

pub const NOT_AVAILABLE: &str = "N/A";

#[derive(Debug, Clone, PartialEq)]
pub enum PanelContent {
    StateBiomass { title: String, rows: Vec<BiomassRow> },
    District(DistrictPanel),
    StateIndex { title: String, states: Vec<String> },
    DistrictIndex { title: String, districts: Vec<String> },
}

/// One row of the state biomass table, cells in [`BIOMASS_COLUMNS`] order.
/// A missing cell renders "N/A" so it cannot be confused with a true zero.
#[derive(Debug, Clone, PartialEq)]
pub struct BiomassRow {
    pub label: String,
    pub cells: [String; 9],
}

#[derive(Debug, Clone, PartialEq)]
pub struct DistrictPanel {
    pub district: String,
    pub title: String,
    pub plants: Vec<PlantDetails>,
    /// Set when the district has no plants.
    pub plants_note: Option<String>,
    pub biomass: Option<DistrictBiomassTables>,
    /// Set when the biomass section is absent (non-Odisha district, join
    /// miss, or a degraded fetch). The plant tables render regardless.
    pub biomass_note: Option<String>,
}

/// One plant as a key/value table; empty and "N/A" values are suppressed
/// rather than shown as blank rows.
#[derive(Debug, Clone, PartialEq)]
pub struct PlantDetails {
    pub name: String,
    pub fields: Vec<(String, String)>,
}

/// The three per-district biomass tables, values formatted to two decimals,
/// keys with underscores replaced by spaces and upper-cased.
#[derive(Debug, Clone, PartialEq)]
pub struct DistrictBiomassTables {
    pub bioenergy_potential_gj: Vec<(String, String)>,
    pub gross_biomass_kt: Vec<(String, String)>,
    pub surplus_biomass_kt: Vec<(String, String)>,
}

/// State-biomass mode: the fixed-column table with the two provider rows
/// (total biomass, then total surplus).
pub fn state_biomass(state: &str, records: &[BiomassStateRecord]) -> PanelContent {
    let rows = records
        .iter()
        .enumerate()
        .map(|(index, record)| BiomassRow {
            label: if index == 0 { "Total Biomass" } else { "Total Surplus" }.to_string(),
            cells: record.cells().map(|cell| match cell {
                Some(value) => value.to_string(),
                None => NOT_AVAILABLE.to_string(),
            }),
        })
        .collect();

    PanelContent::StateBiomass { title: format!("{state} - Biomass Details"), rows }
}

/// District mode: plants sorted by name (case-insensitive, stable ties) plus
/// the optional Odisha biomass tables.
pub fn district(
    district: &str,
    plants: &[PlantRecord],
    biomass: Option<&BiomassDistrictRecord>,
) -> DistrictPanel {
    let mut sorted: Vec<&PlantRecord> = plants.iter().collect();
    sorted.sort_by_key(|plant| plant.name.to_lowercase());

    let plants: Vec<PlantDetails> = sorted
        .into_iter()
        .map(|plant| PlantDetails {
            name: if plant.name.is_empty() { "Plant".to_string() } else { plant.name.clone() },
            fields: plant
                .attributes
                .iter()
                .filter(|(_, value)| !value.is_empty() && value.as_str() != NOT_AVAILABLE)
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect(),
        })
        .collect();

    let plants_note = plants
        .is_empty()
        .then(|| "No plant data available for this district.".to_string());

    let biomass = biomass.map(|record| DistrictBiomassTables {
        bioenergy_potential_gj: crop_rows(&record.bioenergy_potential),
        gross_biomass_kt: crop_rows(&record.gross_biomass),
        surplus_biomass_kt: crop_rows(&record.surplus_biomass),
    });
    let biomass_note = biomass
        .is_none()
        .then(|| "No biomass data available for this district.".to_string());

    DistrictPanel {
        district: district.to_string(),
        title: format!("Plants in {district}"),
        plants,
        plants_note,
        biomass,
        biomass_note,
    }
}

fn crop_rows(crops: &BTreeMap<String, f64>) -> Vec<(String, String)> {
    crops
        .iter()
        .map(|(key, value)| (key.replace('_', " ").to_uppercase(), format!("{value:.2}")))
        .collect()
}

/// The all-states biomass index, listed alphabetically.
pub fn state_index() -> PanelContent {
    let mut states: Vec<String> = STATES_WITH_BIOMASS.iter().map(|s| s.to_string()).collect();
    states.sort();
    PanelContent::StateIndex { title: "Biomass Details by State".to_string(), states }
}

/// The Odisha district biomass index, in provider order.
pub fn district_index(records: &[BiomassDistrictRecord]) -> PanelContent {
    PanelContent::DistrictIndex {
        title: "Biomass Details by District (Odisha)".to_string(),
        districts: records.iter().map(|r| r.district.clone()).collect(),
    }
}

/// Hover text for a marker. Biomass markers read the normalized district
/// attached at construction; nothing is re-derived here.
pub fn marker_hover(marker: &MapMarker) -> String {
    match marker.kind {
        MarkerKind::Plant => format!("Plant: {}", marker.name),
        MarkerKind::BiomassAvailability => match &marker.district {
            Some(district) => format!("{district}\nClick here to view Biomass Availability"),
            None => format!("{}\nClick to view biomass details", marker.name),
        },
    }
}

/// Hover text for a state polygon at the national view.
pub fn state_hover(state: &str, plant_count: usize) -> String {
    format!("{state}\nNumber of Plants: {plant_count}")
}
