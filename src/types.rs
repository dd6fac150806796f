use std::collections::BTreeMap;

use geo::Point;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Source-table column holding the plant name.
pub const PLANT_NAME_FIELD: &str = "Sponge Iron Plant";
/// Source-table column holding the (uncontrolled) district spelling.
pub const DISTRICT_FIELD: &str = "City/ District";
pub const LONGITUDE_FIELD: &str = "Longitude";
pub const LATITUDE_FIELD: &str = "Latitude";

pub const PLANT_COLOR: &str = "#FF0000";
pub const BIOMASS_COLOR: &str = "#00FF00";

/// One row of the plant table. Immutable once loaded.
///
/// Coordinates are kept as the raw source text and parsed only at marker
/// construction; an unparsable value becomes a NaN marker that the
/// non-finite filter drops before render.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "BTreeMap<String, Value>")]
pub struct PlantRecord {
    pub name: String,
    pub district: String,
    pub longitude: String,
    pub latitude: String,
    /// Every column of the source row, open-ended. The detail panel renders
    /// these key/value pairs directly (in BTreeMap key order).
    pub attributes: BTreeMap<String, String>,
}

impl From<BTreeMap<String, Value>> for PlantRecord {
    fn from(row: BTreeMap<String, Value>) -> Self {
        let attributes: BTreeMap<String, String> = row
            .into_iter()
            .map(|(k, v)| (k.trim().to_string(), stringify(&v)))
            .collect();
        let field = |key: &str| attributes.get(key).cloned().unwrap_or_default();
        Self {
            name: field(PLANT_NAME_FIELD),
            district: field(DISTRICT_FIELD),
            longitude: field(LONGITUDE_FIELD),
            latitude: field(LATITUDE_FIELD),
            attributes,
        }
    }
}

/// Render a JSON cell the way the source pipeline did (everything is text).
fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.trim().to_string(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// One row of the per-state biomass table (units: 1000 tonnes per annum).
/// The provider returns two rows per state: total biomass, then total surplus.
/// A missing cell stays `None` and renders as "N/A", never as zero.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct BiomassStateRecord {
    #[serde(rename = "Wheat", default, deserialize_with = "de_cell")]
    pub wheat: Option<f64>,
    #[serde(rename = "Rice", default, deserialize_with = "de_cell")]
    pub rice: Option<f64>,
    #[serde(rename = "Maize", default, deserialize_with = "de_cell")]
    pub maize: Option<f64>,
    #[serde(rename = "Bajra", default, deserialize_with = "de_cell")]
    pub bajra: Option<f64>,
    #[serde(rename = "Sugarcane", default, deserialize_with = "de_cell")]
    pub sugarcane: Option<f64>,
    #[serde(rename = "Groundnut", default, deserialize_with = "de_cell")]
    pub groundnut: Option<f64>,
    #[serde(rename = "Rapeseed Mustard", default, deserialize_with = "de_cell")]
    pub rapeseed_mustard: Option<f64>,
    #[serde(rename = "Arhar/Tur", default, deserialize_with = "de_cell")]
    pub arhar_tur: Option<f64>,
    #[serde(rename = "Total Crops", default, deserialize_with = "de_cell")]
    pub total: Option<f64>,
}

impl BiomassStateRecord {
    /// Cells in the fixed display order of the state biomass table.
    pub fn cells(&self) -> [Option<f64>; 9] {
        [
            self.wheat,
            self.rice,
            self.maize,
            self.bajra,
            self.sugarcane,
            self.groundnut,
            self.rapeseed_mustard,
            self.arhar_tur,
            self.total,
        ]
    }
}

/// Accepts a number or numeric text; anything else is a missing cell.
fn de_cell<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    })
}

/// Per-district biomass metrics (Odisha only). Crop keys are open-ended
/// because the district workbook's crop set differs from the state-level one.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BiomassDistrictRecord {
    pub district: String,
    /// GJ per crop.
    pub bioenergy_potential: BTreeMap<String, f64>,
    /// Kilo tonnes per crop.
    pub gross_biomass: BTreeMap<String, f64>,
    /// Kilo tonnes per crop.
    pub surplus_biomass: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarkerKind {
    Plant,
    BiomassAvailability,
}

/// A point overlay rendered atop the map, recomputed on every view
/// transition and never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct MapMarker {
    pub name: String,
    pub position: Point<f64>,
    pub kind: MarkerKind,
    pub color: &'static str,
    /// Normalized district, attached once at construction. Click dispatch and
    /// hover text read this field rather than re-deriving it at render time.
    pub district: Option<String>,
}

/// Which map extent is displayed. Drilling into a district opens a detail
/// panel but does not change the view state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewState {
    India,
    State(String),
}

impl ViewState {
    pub fn is_india(&self) -> bool {
        matches!(self, ViewState::India)
    }

    pub fn state_name(&self) -> Option<&str> {
        match self {
            ViewState::India => None,
            ViewState::State(name) => Some(name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn plant_record_from_row_keeps_raw_fields() {
        let record: PlantRecord = serde_json::from_value(json!({
            "Sponge Iron Plant": "Arya Iron & Steel Company",
            "City/ District": "Sundargarh",
            "Longitude": "84.0167",
            "Latitude": "22.1167",
            "Capacity (MTPA)": "0.5"
        }))
        .unwrap();

        assert_eq!(record.name, "Arya Iron & Steel Company");
        assert_eq!(record.district, "Sundargarh");
        assert_eq!(record.longitude, "84.0167");
        assert_eq!(record.attributes["Capacity (MTPA)"], "0.5");
        // The well-known columns stay in the attribute map too; the detail
        // panel renders the whole row.
        assert_eq!(record.attributes[PLANT_NAME_FIELD], "Arya Iron & Steel Company");
    }

    #[test]
    fn plant_record_tolerates_missing_and_numeric_cells() {
        let record: PlantRecord = serde_json::from_value(json!({
            "Capacity (MTPA)": 0.5
        }))
        .unwrap();

        assert_eq!(record.name, "");
        assert_eq!(record.district, "");
        assert_eq!(record.attributes["Capacity (MTPA)"], "0.5");
    }

    #[test]
    fn biomass_state_record_accepts_text_and_numbers() {
        let record: BiomassStateRecord = serde_json::from_value(json!({
            "Wheat": "150.5",
            "Rice": 2500.8,
            "Total Crops": "3458.4"
        }))
        .unwrap();

        assert_eq!(record.wheat, Some(150.5));
        assert_eq!(record.rice, Some(2500.8));
        assert_eq!(record.maize, None);
        assert_eq!(record.cells()[8], Some(3458.4));
    }
}
