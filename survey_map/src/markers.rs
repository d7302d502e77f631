use std::error::Error;
use std::fmt::Display;

use crate::model::{MapView, Marker, Table};

/// Signalled when a map is requested over an empty subset. The caller
/// renders an empty-state message instead; a centroid over zero rows is
/// never computed.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum MapError {
    NoData,
}

impl Error for MapError {}

impl Display for MapError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MapError::NoData => write!(f, "no rows to place on the map"),
        }
    }
}

/// One marker per row of the subset, plus the unweighted centroid used
/// as the initial view center.
///
/// Co-located markers are all kept: there is no deduplication or
/// clustering. `placeholder` is the popup text for rows without a
/// comment.
pub fn build_markers(table: &Table, placeholder: &str) -> Result<MapView, MapError> {
    if table.is_empty() {
        return Err(MapError::NoData);
    }
    let n = table.len() as f64;
    let lat = table.rows.iter().map(|s| s.latitude).sum::<f64>() / n;
    let lon = table.rows.iter().map(|s| s.longitude).sum::<f64>() / n;
    let markers = table
        .rows
        .iter()
        .map(|s| Marker {
            latitude: s.latitude,
            longitude: s.longitude,
            tooltip: s.category.clone().unwrap_or_default(),
            popup: s.comment.clone().unwrap_or_else(|| placeholder.to_string()),
        })
        .collect();
    Ok(MapView {
        center: (lat, lon),
        markers,
    })
}
