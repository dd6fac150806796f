#![doc = "Interactive India plant/biomass map core: view-state machine and geospatial join layer"]
pub mod geojson;
pub mod geom;
pub mod join;
pub mod normalize;
pub mod panel;
pub mod providers;

mod error;
mod session;
mod types;

#[doc(inline)]
pub use error::MapError;

#[doc(inline)]
pub use session::{Chart, Command, Glance, Layer, LayerId, MapSession, Outcome};

#[doc(inline)]
pub use types::{
    BiomassDistrictRecord, BiomassStateRecord, MapMarker, MarkerKind, PlantRecord, ViewState,
};
