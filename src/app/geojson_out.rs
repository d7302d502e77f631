// Serializing the map view for the front-end map widget.

use geojson::{Feature, FeatureCollection, GeoJson, Geometry, JsonObject, Value};

use survey_map::MapView;

/// One Point feature per marker, with the tooltip and popup texts as
/// properties. The initial view center rides along as a foreign member,
/// in GeoJSON (longitude, latitude) order.
pub fn to_geojson(map: &MapView) -> GeoJson {
    let features = map
        .markers
        .iter()
        .map(|m| {
            let mut props = JsonObject::new();
            props.insert(
                "tooltip".to_string(),
                serde_json::Value::String(m.tooltip.clone()),
            );
            props.insert(
                "popup".to_string(),
                serde_json::Value::String(m.popup.clone()),
            );
            Feature {
                bbox: None,
                geometry: Some(Geometry::new(Value::Point(vec![m.longitude, m.latitude]))),
                id: None,
                properties: Some(props),
                foreign_members: None,
            }
        })
        .collect();

    let mut foreign = JsonObject::new();
    foreign.insert(
        "center".to_string(),
        serde_json::json!([map.center.1, map.center.0]),
    );
    GeoJson::FeatureCollection(FeatureCollection {
        bbox: None,
        features,
        foreign_members: Some(foreign),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use survey_map::Marker;

    #[test]
    fn markers_become_point_features() {
        let map = MapView {
            center: (41.0, -72.0),
            markers: vec![Marker {
                latitude: 40.7,
                longitude: -74.0,
                tooltip: "A".to_string(),
                popup: "No comment".to_string(),
            }],
        };
        let gj = to_geojson(&map).to_string();
        assert!(gj.contains("\"FeatureCollection\""));
        assert!(gj.contains("\"tooltip\":\"A\""));
        // (lon, lat) position order.
        assert!(gj.contains("[-74.0,40.7]"));
        assert!(gj.contains("\"center\":[-72.0,41.0]"));
    }
}
