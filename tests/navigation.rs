use std::cell::Cell;
use std::collections::BTreeMap;
use std::rc::Rc;

use anyhow::{Result, bail};
use dri_map::geojson::{DISTRICT_NAME_PROPERTY, FeatureCollection, STATE_NAME_PROPERTY};
use dri_map::panel::PanelContent;
use dri_map::providers::{
    MemoryDataProvider, MemoryGeoProvider, TabularDataProvider,
};
use dri_map::{
    BiomassDistrictRecord, BiomassStateRecord, Command, LayerId, MapError, MapSession,
    MarkerKind, Outcome, PlantRecord, ViewState,
};
use serde_json::json;

/// A small three-state world shared by the navigation tests.
///
/// States present in the national GeoJSON: Odisha, Maharashtra, Jharkhand.
/// State-level GeoJSON exists for Odisha and Maharashtra only; Jharkhand has
/// plants but no state file, which makes its selection a fetch failure.
/// "Goa" has an (empty) plant list, making its selection a refused
/// transition.
fn world() -> (MemoryGeoProvider, MemoryDataProvider) {
    let india = json!({
        "features": [
            {
                "properties": { "st_nm": "Odisha" },
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[84.0, 20.0], [86.0, 20.0], [86.0, 22.0], [84.0, 22.0]]]
                }
            },
            {
                "properties": { "st_nm": "Maharashtra" },
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[72.0, 17.0], [76.0, 17.0], [76.0, 21.0], [72.0, 21.0]]]
                }
            },
            {
                "properties": { "st_nm": "Jharkhand" },
                "geometry": {
                    "type": "MultiPolygon",
                    "coordinates": [[[[84.0, 22.0], [86.0, 22.0], [86.0, 24.0], [84.0, 24.0]]]]
                }
            }
        ]
    });

    let odisha = json!({
        "features": [
            {
                "properties": { "district": "Sundergarh" },
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[83.8, 21.9], [84.2, 21.9], [84.2, 22.3], [83.8, 22.3]]]
                }
            },
            {
                "properties": { "district": "Dhenkanal" },
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[85.4, 20.5], [85.8, 20.5], [85.8, 20.9], [85.4, 20.9]]]
                }
            }
        ]
    });

    let maharashtra = json!({
        "features": [{
            "properties": { "district": "Pune" },
            "geometry": {
                "type": "Polygon",
                "coordinates": [[[73.6, 18.3], [74.1, 18.3], [74.1, 18.8], [73.6, 18.8]]]
            }
        }]
    });

    let mut geo = MemoryGeoProvider::new(
        FeatureCollection::from_value(&india, STATE_NAME_PROPERTY).unwrap(),
    );
    geo.insert_state(
        "odisha",
        FeatureCollection::from_value(&odisha, DISTRICT_NAME_PROPERTY).unwrap(),
    );
    geo.insert_state(
        "maharashtra",
        FeatureCollection::from_value(&maharashtra, DISTRICT_NAME_PROPERTY).unwrap(),
    );

    let mut data = MemoryDataProvider::default();
    data.plants = serde_json::from_value(json!({
        "Odisha": [
            {
                "Sponge Iron Plant": "Arya Iron & Steel Company",
                "City/ District": "Sundargarh",
                "Longitude": "84.0167",
                "Latitude": "22.1167",
                "Capacity (MTPA)": "0.5"
            },
            {
                "Sponge Iron Plant": "Bhushan Steel Limited",
                "City/ District": "Dhenkanal",
                "Longitude": "85.5983",
                "Latitude": "20.6667"
            }
        ],
        "Maharashtra": [
            {
                "Sponge Iron Plant": "Tata Steel BSL",
                "City/ District": "Pune",
                "Longitude": "73.8567",
                "Latitude": "18.5204"
            }
        ],
        "Jharkhand": [
            {
                "Sponge Iron Plant": "Tata Steel Jamshedpur",
                "City/ District": "Jamshedpur",
                "Longitude": "86.1844",
                "Latitude": "22.8046"
            }
        ],
        "Goa": []
    }))
    .unwrap();
    data.biomass.insert(
        "Odisha".to_string(),
        serde_json::from_value(json!([
            { "Wheat": "150.5", "Rice": "2500.8", "Total Crops": "3458.4" },
            { "Wheat": "120.3", "Rice": "2000.6", "Total Crops": "2767.1" }
        ]))
        .unwrap(),
    );
    data.odisha_districts = serde_json::from_value(json!([
        {
            "district": "Sundargarh",
            "bioenergy_potential": { "kharif_rice": 1250.5, "wheat": 150.2 },
            "gross_biomass": { "kharif_rice": 2500.8, "wheat": 300.4 },
            "surplus_biomass": { "kharif_rice": 1875.6, "wheat": 225.3 }
        }
    ]))
    .unwrap();

    (geo, data)
}

fn started() -> MapSession<MemoryGeoProvider, MemoryDataProvider> {
    let (geo, data) = world();
    let mut session = MapSession::new(geo, data);
    session.start().unwrap();
    session
}

#[test]
fn start_builds_the_national_chart() {
    let session = started();

    assert_eq!(*session.view(), ViewState::India);
    assert_eq!(session.charts_created(), 1);

    let chart = session.chart().unwrap();
    assert_eq!(chart.title, "India Map With Plant and Biomass Locations");
    assert!(chart.plants.visible);
    assert!(chart.biomass.visible);

    // Four plants across all states; biomass markers only for the three
    // states whose features exist in the national file.
    assert_eq!(chart.plants.markers.len(), 4);
    assert_eq!(chart.biomass.markers.len(), 3);

    // National biomass markers sit at centroid + (0.2, 0.2).
    let odisha = chart
        .biomass
        .markers
        .iter()
        .find(|m| m.name == "Odisha")
        .unwrap();
    assert!((odisha.position.x() - 85.2).abs() < 1e-9);
    assert!((odisha.position.y() - 21.2).abs() < 1e-9);
}

#[test]
fn plant_markers_round_trip_exact_coordinates() {
    let mut session = started();
    session
        .apply(Command::SelectState("Odisha".to_string()))
        .unwrap();

    let chart = session.chart().unwrap();
    let arya = chart
        .plants
        .markers
        .iter()
        .find(|m| m.name == "Arya Iron & Steel Company")
        .unwrap();
    assert_eq!(arya.position.x(), 84.0167);
    assert_eq!(arya.position.y(), 22.1167);
    assert_eq!(arya.kind, MarkerKind::Plant);
    assert_eq!(arya.district.as_deref(), Some("sundargarh"));
}

#[test]
fn biomass_layer_defaults_by_state() {
    let mut session = started();
    session
        .apply(Command::SelectState("Odisha".to_string()))
        .unwrap();
    assert!(session.chart().unwrap().biomass.visible);

    session.apply(Command::Back).unwrap();
    session
        .apply(Command::SelectState("Maharashtra".to_string()))
        .unwrap();
    assert!(!session.chart().unwrap().biomass.visible);
    assert!(session.chart().unwrap().plants.visible);
}

#[test]
fn selecting_a_state_without_plants_is_refused() {
    let mut session = started();
    let chart_id = session.chart().unwrap().id;

    for state in ["Goa", "Kerala"] {
        let err = session
            .apply(Command::SelectState(state.to_string()))
            .unwrap_err();
        assert!(matches!(err, MapError::NoDataForState(ref s) if s == state));
    }

    // Refused transitions never destroy or rebuild the chart.
    assert_eq!(*session.view(), ViewState::India);
    assert_eq!(session.chart().unwrap().id, chart_id);
    assert_eq!(session.charts_created(), 1);
}

#[test]
fn a_failed_geojson_fetch_leaves_the_prior_view_intact() {
    let mut session = started();
    let chart_id = session.chart().unwrap().id;

    // Jharkhand has plants but no state GeoJSON in the fixture.
    let err = session
        .apply(Command::SelectState("Jharkhand".to_string()))
        .unwrap_err();
    assert!(matches!(err, MapError::Fetch { .. }));

    assert_eq!(*session.view(), ViewState::India);
    assert_eq!(session.chart().unwrap().id, chart_id);
    assert_eq!(session.charts_created(), 1);
}

#[test]
fn exactly_one_chart_survives_repeated_navigation() {
    let mut session = started();

    session.apply(Command::SelectState("Odisha".to_string())).unwrap();
    assert_eq!(*session.view(), ViewState::State("Odisha".to_string()));

    session.apply(Command::Back).unwrap();
    assert_eq!(*session.view(), ViewState::India);

    session
        .apply(Command::SelectState("Maharashtra".to_string()))
        .unwrap();

    // Four constructions (start + three transitions), one survivor whose id
    // is the latest.
    assert_eq!(session.charts_created(), 4);
    assert_eq!(session.chart().unwrap().id, 4);
}

#[test]
fn back_at_the_national_view_does_not_rebuild() {
    let mut session = started();
    let outcome = session.apply(Command::Back).unwrap();
    assert_eq!(outcome, Outcome::ViewChanged(ViewState::India));
    assert_eq!(session.charts_created(), 1);
}

#[test]
fn layer_toggles_persist_across_navigation() {
    let mut session = started();

    let outcome = session.apply(Command::ToggleLayer(LayerId::Biomass)).unwrap();
    assert_eq!(outcome, Outcome::LayerToggled(LayerId::Biomass, false));
    assert!(!session.chart().unwrap().biomass.visible);

    // The user's preference overrides the Odisha default on the next chart.
    session.apply(Command::SelectState("Odisha".to_string())).unwrap();
    assert!(!session.chart().unwrap().biomass.visible);
    assert!(session.chart().unwrap().plants.visible);

    session.apply(Command::Back).unwrap();
    assert!(!session.chart().unwrap().biomass.visible);

    // Hidden layers contribute no markers to the observable set.
    assert!(
        session
            .current_markers()
            .iter()
            .all(|m| m.kind == MarkerKind::Plant)
    );
}

#[test]
fn district_selection_opens_the_detail_panel_without_a_view_change() {
    let mut session = started();
    session.apply(Command::SelectState("Odisha".to_string())).unwrap();
    let chart_id = session.chart().unwrap().id;

    // The click arrives with a variant spelling; the normalizer is the join
    // key everywhere, so it still finds the Sundargarh plants and biomass.
    let outcome = session
        .apply(Command::SelectDistrict("Sondagarh".to_string()))
        .unwrap();
    assert_eq!(outcome, Outcome::PanelOpened);
    assert_eq!(*session.view(), ViewState::State("Odisha".to_string()));
    assert_eq!(session.chart().unwrap().id, chart_id);

    let Some(PanelContent::District(panel)) = session.panel() else {
        panic!("expected district panel");
    };
    assert_eq!(panel.title, "Plants in sundargarh");
    assert_eq!(panel.plants.len(), 1);
    assert_eq!(panel.plants[0].name, "Arya Iron & Steel Company");

    let tables = panel.biomass.as_ref().unwrap();
    assert_eq!(tables.bioenergy_potential_gj[0].0, "KHARIF RICE");
    assert_eq!(tables.bioenergy_potential_gj[0].1, "1250.50");
    assert!(panel.biomass_note.is_none());
}

#[test]
fn district_without_records_resolves_to_an_empty_panel() {
    let mut session = started();
    session.apply(Command::SelectState("Odisha".to_string())).unwrap();

    // "Cuttack" appears in neither the plant table nor the biomass sheet: a
    // routine join miss, not an error.
    session
        .apply(Command::SelectDistrict("Cuttack".to_string()))
        .unwrap();

    let Some(PanelContent::District(panel)) = session.panel() else {
        panic!("expected district panel");
    };
    assert!(panel.plants.is_empty());
    assert!(panel.plants_note.is_some());
    assert!(panel.biomass.is_none());
}

#[test]
fn state_biomass_panel_opens_at_the_national_view() {
    let mut session = started();
    let outcome = session
        .apply(Command::SelectStateBiomass("Odisha".to_string()))
        .unwrap();
    assert_eq!(outcome, Outcome::PanelOpened);
    assert_eq!(*session.view(), ViewState::India);

    let Some(PanelContent::StateBiomass { title, rows }) = session.panel() else {
        panic!("expected state biomass panel");
    };
    assert_eq!(title, "Odisha - Biomass Details");
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].cells[0], "150.5");
    assert_eq!(rows[0].cells[2], "N/A");
}

#[test]
fn odisha_district_index_lists_fetched_records() {
    let mut session = started();
    session.apply(Command::SelectState("Odisha".to_string())).unwrap();

    session.apply(Command::ShowOdishaDistrictIndex).unwrap();
    let Some(PanelContent::DistrictIndex { districts, .. }) = session.panel() else {
        panic!("expected district index");
    };
    assert_eq!(districts, &vec!["Sundargarh".to_string()]);
}

/// Delegating provider that counts plant-table fetches.
struct CountingData {
    inner: MemoryDataProvider,
    plant_fetches: Rc<Cell<usize>>,
}

impl TabularDataProvider for CountingData {
    fn plants_by_state(&self) -> Result<BTreeMap<String, Vec<PlantRecord>>> {
        self.plant_fetches.set(self.plant_fetches.get() + 1);
        self.inner.plants_by_state()
    }

    fn state_biomass(&self, state: &str) -> Result<Vec<BiomassStateRecord>> {
        self.inner.state_biomass(state)
    }

    fn odisha_district_biomass(&self) -> Result<Vec<BiomassDistrictRecord>> {
        self.inner.odisha_district_biomass()
    }

    fn distance(&self, origin: &str, destination: &str) -> Result<String> {
        self.inner.distance(origin, destination)
    }
}

#[test]
fn plant_data_is_fetched_once_per_session() {
    let (geo, data) = world();
    let fetches = Rc::new(Cell::new(0));
    let data = CountingData { inner: data, plant_fetches: fetches.clone() };
    let mut session = MapSession::new(geo, data);

    session.start().unwrap();
    session.apply(Command::SelectState("Odisha".to_string())).unwrap();
    session
        .apply(Command::SelectDistrict("Dhenkanal".to_string()))
        .unwrap();
    session.apply(Command::Back).unwrap();
    session.glance().unwrap();

    // One fetch at start; every later use reads the session cache.
    assert_eq!(fetches.get(), 1);
}

/// Delegating provider whose district biomass endpoint always fails.
struct FlakyDistrictBiomass(MemoryDataProvider);

impl TabularDataProvider for FlakyDistrictBiomass {
    fn plants_by_state(&self) -> Result<BTreeMap<String, Vec<PlantRecord>>> {
        self.0.plants_by_state()
    }

    fn state_biomass(&self, state: &str) -> Result<Vec<BiomassStateRecord>> {
        self.0.state_biomass(state)
    }

    fn odisha_district_biomass(&self) -> Result<Vec<BiomassDistrictRecord>> {
        bail!("district biomass backend unavailable")
    }

    fn distance(&self, origin: &str, destination: &str) -> Result<String> {
        self.0.distance(origin, destination)
    }
}

#[test]
fn a_failed_biomass_fetch_degrades_to_a_note_not_a_failed_panel() {
    let (geo, data) = world();
    let mut session = MapSession::new(geo, FlakyDistrictBiomass(data));
    session.start().unwrap();
    session.apply(Command::SelectState("Odisha".to_string())).unwrap();

    let outcome = session
        .apply(Command::SelectDistrict("Sundergarh".to_string()))
        .unwrap();
    assert_eq!(outcome, Outcome::PanelOpened);

    let Some(PanelContent::District(panel)) = session.panel() else {
        panic!("expected district panel");
    };
    // The plant table renders regardless; only the biomass section degrades.
    assert_eq!(panel.plants.len(), 1);
    assert!(panel.biomass.is_none());
    assert!(panel.biomass_note.is_some());
}

#[test]
fn glance_and_name_index_derive_from_cached_plants() {
    let mut session = started();

    let glance = session.glance().unwrap();
    assert_eq!(glance.total_plants, 4);
    assert_eq!(glance.biomass_states, 28);

    let index = session.plant_name_index().unwrap();
    let names: Vec<&str> = index.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "Arya Iron & Steel Company",
            "Bhushan Steel Limited",
            "Tata Steel BSL",
            "Tata Steel Jamshedpur",
        ]
    );
}
