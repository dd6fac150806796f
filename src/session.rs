//! The map session: view-state machine, chart lifecycle, and layer
//! visibility.
//!
//! All mutable view state lives in one owned [`MapSession`]; every user
//! gesture arrives as a typed [`Command`] and is applied through
//! [`MapSession::apply`], so transitions are unit-testable without a
//! rendering environment. The session owns at most one live [`Chart`] and
//! always destroys it before constructing the next one, which tears down the
//! previous chart's event wiring before any new wiring can exist.
//!
//! Provider calls are synchronous, so a transition either completes or
//! fails atomically: every fallible fetch happens before the old chart is
//! dropped, and a fetch failure leaves the prior view untouched.

use std::collections::BTreeMap;
use std::sync::Arc;

use ahash::AHashMap;

use crate::error::MapError;
use crate::geojson::FeatureCollection;
use crate::join::{self, PlantNameEntry, STATES_WITH_BIOMASS};
use crate::normalize;
use crate::panel::{self, PanelContent};
use crate::providers::{GeoDataProvider, TabularDataProvider};
use crate::types::{BiomassDistrictRecord, MapMarker, PlantRecord, ViewState};

/// Stable identifier of a marker overlay, used by the visibility toggles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayerId {
    Plants,
    Biomass,
}

/// A user gesture, as dispatched by the UI shell.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Click on a state polygon at the national view.
    SelectState(String),
    /// Click on a district polygon or district biomass marker at a state
    /// view. Opens the detail panel; the view state does not change.
    SelectDistrict(String),
    /// Click on a state biomass marker at the national view. Opens the
    /// state-biomass panel; the view state does not change.
    SelectStateBiomass(String),
    /// Sidebar visibility toggle for one overlay.
    ToggleLayer(LayerId),
    /// The back control at a state view.
    Back,
    /// Sidebar: list all states with biomass data.
    ShowStateBiomassIndex,
    /// Sidebar: list Odisha's district biomass records (Odisha view only).
    ShowOdishaDistrictIndex,
}

/// What a successfully applied command did.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    ViewChanged(ViewState),
    PanelOpened,
    LayerToggled(LayerId, bool),
    /// The command was accepted but had nothing to do; the text is a
    /// user-facing notice.
    Notice(String),
}

/// One marker overlay of a chart.
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    pub id: LayerId,
    pub markers: Vec<MapMarker>,
    pub visible: bool,
}

/// An owned chart instance: the polygon base map plus the two marker
/// overlays. Rebuilt from scratch on every view transition; `id` increments
/// per construction so tests can observe the destroy/create discipline.
#[derive(Debug, Clone, PartialEq)]
pub struct Chart {
    pub id: u64,
    pub title: String,
    pub subtitle: String,
    pub map: Arc<FeatureCollection>,
    pub plants: Layer,
    pub biomass: Layer,
}

impl Chart {
    pub fn layer(&self, id: LayerId) -> &Layer {
        match id {
            LayerId::Plants => &self.plants,
            LayerId::Biomass => &self.biomass,
        }
    }

    pub fn layer_mut(&mut self, id: LayerId) -> &mut Layer {
        match id {
            LayerId::Plants => &mut self.plants,
            LayerId::Biomass => &mut self.biomass,
        }
    }
}

/// User visibility preferences, persisted across view transitions. Until the
/// user toggles a layer, each rebuilt chart uses its per-view default
/// (plants on everywhere; biomass on nationally and for Odisha only at state
/// views).
#[derive(Debug, Clone, Copy, Default)]
struct LayerOverrides {
    plants: Option<bool>,
    biomass: Option<bool>,
}

/// Headline numbers for the "data at a glance" overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Glance {
    pub total_plants: usize,
    pub biomass_states: usize,
}

pub struct MapSession<G, T> {
    geo: G,
    data: T,
    view: ViewState,
    chart: Option<Chart>,
    charts_created: u64,
    panel: Option<PanelContent>,
    overrides: LayerOverrides,

    // Session caches: external inputs are fetched lazily on first need and
    // reused for the rest of the session.
    plants: Option<Arc<BTreeMap<String, Vec<PlantRecord>>>>,
    india_map: Option<Arc<FeatureCollection>>,
    state_maps: AHashMap<String, Arc<FeatureCollection>>,
    district_biomass: AHashMap<String, Option<BiomassDistrictRecord>>,
}

impl<G: GeoDataProvider, T: TabularDataProvider> MapSession<G, T> {
    pub fn new(geo: G, data: T) -> Self {
        Self {
            geo,
            data,
            view: ViewState::India,
            chart: None,
            charts_created: 0,
            panel: None,
            overrides: LayerOverrides::default(),
            plants: None,
            india_map: None,
            state_maps: AHashMap::new(),
            district_biomass: AHashMap::new(),
        }
    }

    /// Fetch the plant table and national GeoJSON, then build the initial
    /// India chart.
    pub fn start(&mut self) -> Result<(), MapError> {
        let plants = self.plants()?;
        let map = self.india_map()?;
        self.chart = None;
        let chart = self.assemble_india_chart(map, &plants);
        self.chart = Some(chart);
        self.view = ViewState::India;
        Ok(())
    }

    /// Apply one user gesture. On `Err` the view, chart, and panel are
    /// exactly as they were before the call.
    pub fn apply(&mut self, command: Command) -> Result<Outcome, MapError> {
        match command {
            Command::SelectState(state) => self.select_state(state),
            Command::SelectDistrict(district) => self.select_district(&district),
            Command::SelectStateBiomass(state) => self.select_state_biomass(&state),
            Command::ToggleLayer(layer) => self.toggle_layer(layer),
            Command::Back => self.back(),
            Command::ShowStateBiomassIndex => {
                self.panel = Some(panel::state_index());
                Ok(Outcome::PanelOpened)
            }
            Command::ShowOdishaDistrictIndex => self.show_odisha_district_index(),
        }
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn chart(&self) -> Option<&Chart> {
        self.chart.as_ref()
    }

    pub fn panel(&self) -> Option<&PanelContent> {
        self.panel.as_ref()
    }

    pub fn clear_panel(&mut self) {
        self.panel = None;
    }

    /// Markers of the currently visible overlays, in layer order.
    pub fn current_markers(&self) -> Vec<&MapMarker> {
        let Some(chart) = &self.chart else {
            return Vec::new();
        };
        [&chart.plants, &chart.biomass]
            .into_iter()
            .filter(|layer| layer.visible)
            .flat_map(|layer| layer.markers.iter())
            .collect()
    }

    /// Total number of chart instances constructed so far. At most one of
    /// them is ever alive.
    pub fn charts_created(&self) -> u64 {
        self.charts_created
    }

    pub fn glance(&mut self) -> Result<Glance, MapError> {
        let plants = self.plants()?;
        Ok(Glance {
            total_plants: plants.values().map(Vec::len).sum(),
            biomass_states: STATES_WITH_BIOMASS.len(),
        })
    }

    /// The sorted plant-name feed for the search widget.
    pub fn plant_name_index(&mut self) -> Result<Vec<PlantNameEntry>, MapError> {
        let plants = self.plants()?;
        Ok(join::plant_name_index(&plants))
    }

    /// Distance between two plants as display text (provider stub).
    pub fn distance(&self, origin: &str, destination: &str) -> Result<String, MapError> {
        self.data
            .distance(origin, destination)
            .map_err(|e| MapError::fetch(format!("distance from {origin} to {destination}"), e))
    }

    fn select_state(&mut self, state: String) -> Result<Outcome, MapError> {
        let plants_by_state = self.plants()?;
        let plants = plants_by_state.get(&state).cloned().unwrap_or_default();
        if plants.is_empty() {
            // Refused transition: the chart is not destroyed or rebuilt.
            return Err(MapError::NoDataForState(state));
        }

        // Fallible fetch first, teardown after: a failure here leaves the
        // prior view fully intact.
        let map = self.state_map(&state)?;
        self.chart = None;
        let chart = self.assemble_state_chart(map, &state, &plants);
        self.chart = Some(chart);
        self.view = ViewState::State(state);
        Ok(Outcome::ViewChanged(self.view.clone()))
    }

    fn back(&mut self) -> Result<Outcome, MapError> {
        if self.view.is_india() {
            return Ok(Outcome::ViewChanged(ViewState::India));
        }

        // Plant data is already cached; only the national GeoJSON may need a
        // (cached) fetch.
        let plants = self.plants()?;
        let map = self.india_map()?;
        self.chart = None;
        let chart = self.assemble_india_chart(map, &plants);
        self.chart = Some(chart);
        self.view = ViewState::India;
        Ok(Outcome::ViewChanged(ViewState::India))
    }

    fn select_district(&mut self, raw_district: &str) -> Result<Outcome, MapError> {
        let Some(state) = self.view.state_name().map(str::to_string) else {
            return Ok(Outcome::Notice(
                "select a state before drilling into a district".to_string(),
            ));
        };

        let district = normalize::district(raw_district);
        let plants_by_state = self.plants()?;
        let state_plants = plants_by_state.get(&state).map(Vec::as_slice).unwrap_or(&[]);
        let groups = join::group_plants_by_district(state_plants);
        // A district with no plants is a routine join miss: empty list.
        let in_district = groups.get(&district).cloned().unwrap_or_default();

        let biomass = if state == "Odisha" {
            self.district_biomass(&district)
        } else {
            None
        };

        self.panel = Some(PanelContent::District(panel::district(
            &district,
            &in_district,
            biomass.as_ref(),
        )));
        Ok(Outcome::PanelOpened)
    }

    fn select_state_biomass(&mut self, state: &str) -> Result<Outcome, MapError> {
        let records = self
            .data
            .state_biomass(state)
            .map_err(|e| MapError::fetch(format!("biomass data for {state}"), e))?;
        self.panel = Some(panel::state_biomass(state, &records));
        Ok(Outcome::PanelOpened)
    }

    fn toggle_layer(&mut self, id: LayerId) -> Result<Outcome, MapError> {
        let Some(chart) = self.chart.as_mut() else {
            return Ok(Outcome::Notice("no live chart to toggle".to_string()));
        };
        let layer = chart.layer_mut(id);
        layer.visible = !layer.visible;
        let visible = layer.visible;
        match id {
            LayerId::Plants => self.overrides.plants = Some(visible),
            LayerId::Biomass => self.overrides.biomass = Some(visible),
        }
        Ok(Outcome::LayerToggled(id, visible))
    }

    fn show_odisha_district_index(&mut self) -> Result<Outcome, MapError> {
        if self.view.state_name() != Some("Odisha") {
            return Ok(Outcome::Notice(
                "district biomass details are only available for Odisha".to_string(),
            ));
        }
        let records = self
            .data
            .odisha_district_biomass()
            .map_err(|e| MapError::fetch("Odisha district biomass", e))?;
        self.panel = Some(panel::district_index(&records));
        Ok(Outcome::PanelOpened)
    }

    fn assemble_india_chart(
        &mut self,
        map: Arc<FeatureCollection>,
        plants_by_state: &BTreeMap<String, Vec<PlantRecord>>,
    ) -> Chart {
        let all_plants: Vec<PlantRecord> =
            plants_by_state.values().flatten().cloned().collect();
        let plant_markers = join::drop_nonfinite(join::build_plant_markers(&all_plants));
        let biomass_markers = join::drop_nonfinite(join::build_state_biomass_markers(
            &map,
            &STATES_WITH_BIOMASS,
        ));

        Chart {
            id: self.next_chart_id(),
            title: "India Map With Plant and Biomass Locations".to_string(),
            subtitle: "Click on a state to explore its districts, plants, and biomass data."
                .to_string(),
            map,
            plants: Layer {
                id: LayerId::Plants,
                markers: plant_markers,
                visible: self.overrides.plants.unwrap_or(true),
            },
            biomass: Layer {
                id: LayerId::Biomass,
                markers: biomass_markers,
                visible: self.overrides.biomass.unwrap_or(true),
            },
        }
    }

    fn assemble_state_chart(
        &mut self,
        map: Arc<FeatureCollection>,
        state: &str,
        plants: &[PlantRecord],
    ) -> Chart {
        let plant_markers = join::drop_nonfinite(join::build_plant_markers(plants));
        let biomass_markers =
            join::drop_nonfinite(join::build_district_biomass_markers(&map, state));
        let district_count = join::group_plants_by_district(plants).len();

        Chart {
            id: self.next_chart_id(),
            title: format!("{state} Districts"),
            subtitle: format!(
                "Total Plants: {} | Districts with Plants: {}",
                plants.len(),
                district_count
            ),
            map,
            plants: Layer {
                id: LayerId::Plants,
                markers: plant_markers,
                visible: self.overrides.plants.unwrap_or(true),
            },
            biomass: Layer {
                id: LayerId::Biomass,
                markers: biomass_markers,
                visible: self.overrides.biomass.unwrap_or(state == "Odisha"),
            },
        }
    }

    fn next_chart_id(&mut self) -> u64 {
        self.charts_created += 1;
        self.charts_created
    }

    fn plants(&mut self) -> Result<Arc<BTreeMap<String, Vec<PlantRecord>>>, MapError> {
        if let Some(cached) = &self.plants {
            return Ok(cached.clone());
        }
        let fetched = self
            .data
            .plants_by_state()
            .map_err(|e| MapError::fetch("plant data", e))?;
        let cached = Arc::new(fetched);
        self.plants = Some(cached.clone());
        Ok(cached)
    }

    fn india_map(&mut self) -> Result<Arc<FeatureCollection>, MapError> {
        if let Some(cached) = &self.india_map {
            return Ok(cached.clone());
        }
        let fetched = self
            .geo
            .india()
            .map_err(|e| MapError::fetch("India GeoJSON", e))?;
        let cached = Arc::new(fetched);
        self.india_map = Some(cached.clone());
        Ok(cached)
    }

    fn state_map(&mut self, state: &str) -> Result<Arc<FeatureCollection>, MapError> {
        let key = normalize::state_key(state);
        if let Some(cached) = self.state_maps.get(&key) {
            return Ok(cached.clone());
        }
        let fetched = self
            .geo
            .state(&key)
            .map_err(|e| MapError::fetch(format!("GeoJSON for {state}"), e))?;
        let cached = Arc::new(fetched);
        self.state_maps.insert(key, cached.clone());
        Ok(cached)
    }

    /// Per-district biomass with session caching. A fetch failure degrades to
    /// `None` (the panel shows a local "not available" note and the plant
    /// tables render regardless); failures are not cached.
    fn district_biomass(&mut self, district: &str) -> Option<BiomassDistrictRecord> {
        if let Some(cached) = self.district_biomass.get(district) {
            return cached.clone();
        }
        match self.data.odisha_district_biomass_for(district) {
            Ok(record) => {
                self.district_biomass.insert(district.to_string(), record.clone());
                record
            }
            Err(_) => None,
        }
    }
}
