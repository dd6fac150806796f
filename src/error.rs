use thiserror::Error;

/// Errors surfaced by the map session. Provider failures are wrapped in
/// [`MapError::Fetch`] with the underlying cause preserved as the source.
#[derive(Debug, Error)]
pub enum MapError {
    /// An external fetch (GeoJSON or tabular data) failed mid-transition.
    /// The session guarantees the prior view is untouched when this is
    /// returned.
    #[error("failed to fetch {what}")]
    Fetch {
        what: String,
        #[source]
        source: anyhow::Error,
    },

    /// The clicked state has no plant records; the transition is refused and
    /// the national view stays up.
    #[error("no plant data available for {0}")]
    NoDataForState(String),

    /// A geometry type the centroid computation does not handle.
    #[error("unsupported geometry type {0:?}")]
    UnsupportedGeometry(String),
}

impl MapError {
    pub(crate) fn fetch(what: impl Into<String>, source: anyhow::Error) -> Self {
        MapError::Fetch { what: what.into(), source }
    }
}
