//! The two collaborator interfaces the core consumes, plus the bundled
//! implementations: in-memory providers (tests, demos) and file-backed
//! providers reading the JSON layout the data pipeline exports.
//!
//! Provider methods return `anyhow::Result`; the session wraps any failure
//! into `MapError::Fetch` and aborts the in-progress transition.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use ahash::AHashMap;
use anyhow::{Context, Result, bail};

use crate::geojson::{DISTRICT_NAME_PROPERTY, FeatureCollection, STATE_NAME_PROPERTY};
use crate::types::{BiomassDistrictRecord, BiomassStateRecord, PlantRecord};

/// Serves GeoJSON for the national view and for a single state.
pub trait GeoDataProvider {
    fn india(&self) -> Result<FeatureCollection>;

    /// `state_key` is the state name lowercased with whitespace stripped
    /// (see [`crate::normalize::state_key`]).
    fn state(&self, state_key: &str) -> Result<FeatureCollection>;
}

/// Serves the tabular plant and biomass records.
pub trait TabularDataProvider {
    /// All plant records, grouped by state. Fetched once per session.
    fn plants_by_state(&self) -> Result<BTreeMap<String, Vec<PlantRecord>>>;

    /// The two per-state biomass rows (total, then surplus); empty when the
    /// state has no biomass sheet.
    fn state_biomass(&self, state: &str) -> Result<Vec<BiomassStateRecord>>;

    /// Every Odisha district biomass record.
    fn odisha_district_biomass(&self) -> Result<Vec<BiomassDistrictRecord>>;

    /// A single district's record, matched case-insensitively on the stored
    /// district name; `None` on a join miss.
    fn odisha_district_biomass_for(
        &self,
        district: &str,
    ) -> Result<Option<BiomassDistrictRecord>> {
        Ok(self
            .odisha_district_biomass()?
            .into_iter()
            .find(|record| record.district.eq_ignore_ascii_case(district)))
    }

    /// Distance between two plants as display text. Stub: real routing is out
    /// of scope, implementations return canned values.
    fn distance(&self, origin: &str, destination: &str) -> Result<String>;
}

/// In-memory geo provider, built up by hand in tests and demos.
#[derive(Debug, Default)]
pub struct MemoryGeoProvider {
    pub india: FeatureCollection,
    pub states: AHashMap<String, FeatureCollection>,
}

impl MemoryGeoProvider {
    pub fn new(india: FeatureCollection) -> Self {
        Self { india, states: AHashMap::new() }
    }

    pub fn insert_state(&mut self, state_key: impl Into<String>, features: FeatureCollection) {
        self.states.insert(state_key.into(), features);
    }
}

impl GeoDataProvider for MemoryGeoProvider {
    fn india(&self) -> Result<FeatureCollection> {
        Ok(self.india.clone())
    }

    fn state(&self, state_key: &str) -> Result<FeatureCollection> {
        match self.states.get(state_key) {
            Some(features) => Ok(features.clone()),
            None => bail!("no GeoJSON for state key {state_key:?}"),
        }
    }
}

/// In-memory tabular provider.
#[derive(Debug, Default)]
pub struct MemoryDataProvider {
    pub plants: BTreeMap<String, Vec<PlantRecord>>,
    pub biomass: AHashMap<String, Vec<BiomassStateRecord>>,
    pub odisha_districts: Vec<BiomassDistrictRecord>,
}

impl TabularDataProvider for MemoryDataProvider {
    fn plants_by_state(&self) -> Result<BTreeMap<String, Vec<PlantRecord>>> {
        Ok(self.plants.clone())
    }

    fn state_biomass(&self, state: &str) -> Result<Vec<BiomassStateRecord>> {
        Ok(self.biomass.get(state).cloned().unwrap_or_default())
    }

    fn odisha_district_biomass(&self) -> Result<Vec<BiomassDistrictRecord>> {
        Ok(self.odisha_districts.clone())
    }

    fn distance(&self, _origin: &str, _destination: &str) -> Result<String> {
        Ok("125.5 km".to_string())
    }
}

/// Reads GeoJSON from `<root>/geojson/india.json` and
/// `<root>/geojson/states/<state_key>.json`.
#[derive(Debug, Clone)]
pub struct FileGeoProvider {
    root: PathBuf,
}

impl FileGeoProvider {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn read(&self, relative: &str, name_property: &str) -> Result<FeatureCollection> {
        let path = self.root.join(relative);
        let bytes = fs::read(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        FeatureCollection::from_slice(&bytes, name_property)
            .with_context(|| format!("failed to parse {}", path.display()))
    }
}

impl GeoDataProvider for FileGeoProvider {
    fn india(&self) -> Result<FeatureCollection> {
        self.read("geojson/india.json", STATE_NAME_PROPERTY)
    }

    fn state(&self, state_key: &str) -> Result<FeatureCollection> {
        self.read(&format!("geojson/states/{state_key}.json"), DISTRICT_NAME_PROPERTY)
    }
}

/// Reads the tabular exports: `plants.json` (state -> rows), `biomass.json`
/// (state -> two rows), `odisha_biomass.json` (district records).
#[derive(Debug, Clone)]
pub struct FileDataProvider {
    root: PathBuf,
}

impl FileDataProvider {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let bytes = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_slice(&bytes).with_context(|| format!("failed to parse {}", path.display()))
}

impl TabularDataProvider for FileDataProvider {
    fn plants_by_state(&self) -> Result<BTreeMap<String, Vec<PlantRecord>>> {
        read_json(&self.root.join("plants.json"))
    }

    fn state_biomass(&self, state: &str) -> Result<Vec<BiomassStateRecord>> {
        let all: BTreeMap<String, Vec<BiomassStateRecord>> =
            read_json(&self.root.join("biomass.json"))?;
        Ok(all.get(state).cloned().unwrap_or_default())
    }

    fn odisha_district_biomass(&self) -> Result<Vec<BiomassDistrictRecord>> {
        read_json(&self.root.join("odisha_biomass.json"))
    }

    fn distance(&self, _origin: &str, _destination: &str) -> Result<String> {
        Ok("125.5 km".to_string())
    }
}
