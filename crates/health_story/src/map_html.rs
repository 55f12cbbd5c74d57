use crate::constants::{MAP_CENTER, MAP_CLASSES, MAP_FILL_OPACITY, MAP_LINE_OPACITY, MAP_ZOOM};
use crate::error::{Result, StoryError};
use crate::html::{html_encode, script_json};
use crate::join::{JoinedArea, JoinedAreas};
use crate::render::centroid_labels;
use crate::render::colors::{ClassBreaks, ColorRamp, to_hex};

use geojson::{Feature, FeatureCollection, Geometry, JsonObject, JsonValue};
use log::info;
use serde::Serialize;
use std::path::Path;

const NO_DATA_COLOR: &str = "#000000";
const FILL_PROPERTY: &str = "fill_color";

/// Fill color of each map class, YlOrRd from light to dark
pub fn class_colors(breaks: &ClassBreaks) -> Vec<String> {
    (0..breaks.classes())
        .map(|i| to_hex(ColorRamp::YL_OR_RD.class_color(i)))
        .collect()
}

/// Fill color for an optional metric value
pub fn fill_color(value: Option<f64>, breaks: &ClassBreaks) -> String {
    match value {
        Some(v) => to_hex(ColorRamp::YL_OR_RD.class_color(breaks.class_of(v))),
        None => NO_DATA_COLOR.to_string(),
    }
}

/// Markup of the value marker placed at a centroid
pub fn marker_html(text: &str) -> String {
    format!(
        r#"<div style="font-size: 10px; font-weight: bold; color: black;">{}</div>"#,
        text
    )
}

#[derive(Debug, Serialize)]
struct Marker {
    lat: f64,
    lon: f64,
    html: String,
}

/// Boundary properties merged with the joined indicator record
fn feature_properties(joined: &JoinedAreas, area: &JoinedArea, breaks: &ClassBreaks) -> JsonObject {
    let mut properties = area.boundary.properties.clone();
    if let Some(record) = area.record {
        for (header, cell) in joined.headers.iter().zip(record.iter()) {
            properties.insert(header.to_string(), JsonValue::from(cell));
        }
    }
    properties.insert(
        joined.metric.clone(),
        area.value.map_or(JsonValue::Null, JsonValue::from),
    );
    properties.insert(
        FILL_PROPERTY.to_string(),
        JsonValue::from(fill_color(area.value, breaks)),
    );
    properties
}

/// The joined areas as a GeoJSON FeatureCollection with precomputed fills
pub fn styled_features(joined: &JoinedAreas, breaks: &ClassBreaks) -> FeatureCollection {
    let features = joined
        .areas
        .iter()
        .map(|area| Feature {
            bbox: None,
            geometry: Some(Geometry::new(geojson::Value::from(&area.boundary.shape))),
            id: None,
            properties: Some(feature_properties(joined, area, breaks)),
            foreign_members: None,
        })
        .collect();

    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}

/// Legend markup: metric name, one row per class, and the no-data swatch
fn legend_html(metric: &str, breaks: &ClassBreaks) -> String {
    let mut html = format!("<strong>{}</strong><br>", html_encode(metric));
    for (i, color) in class_colors(breaks).iter().enumerate() {
        html.push_str(&format!(
            r#"<i style="background:{}"></i>{:.2} &ndash; {:.2}<br>"#,
            color,
            breaks.edges[i],
            breaks.edges[i + 1]
        ));
    }
    html.push_str(&format!(r#"<i style="background:{}"></i>No data"#, NO_DATA_COLOR));
    html
}

/// Builds the self-contained Leaflet document. `range` is the metric's
/// min..max over the indicator table; classes split it evenly.
pub fn map_document(joined: &JoinedAreas, range: (f64, f64)) -> Result<String> {
    let breaks = ClassBreaks::equal_width(range.0, range.1, MAP_CLASSES);
    let features = script_json(&styled_features(joined, &breaks))?;

    let markers: Vec<Marker> = centroid_labels(joined)
        .into_iter()
        .map(|label| Marker {
            lat: label.lat,
            lon: label.lon,
            html: marker_html(&label.text),
        })
        .collect();
    let markers = script_json(&markers)?;
    let legend = script_json(&legend_html(&joined.metric, &breaks))?;

    Ok(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Chicago Health Metric: {title}</title>
  <link rel="stylesheet" href="https://cdnjs.cloudflare.com/ajax/libs/leaflet/1.9.4/leaflet.css" crossorigin="anonymous"
    referrerpolicy="no-referrer" />
  <script src="https://cdnjs.cloudflare.com/ajax/libs/leaflet/1.9.4/leaflet.js" crossorigin="anonymous"
    referrerpolicy="no-referrer"></script>
  <style>
    html, body, #map {{ height: 100%; width: 100%; margin: 0; padding: 0; }}
    .legend {{ background: white; padding: 6px 8px; font: 12px/18px Arial, Helvetica, sans-serif;
      box-shadow: 0 0 15px rgba(0, 0, 0, .2); border-radius: 5px; }}
    .legend i {{ width: 18px; height: 18px; float: left; margin-right: 8px; opacity: {fill_opacity}; }}
  </style>
</head>
<body>
  <div id="map"></div>
  <script>
    const areas = {features};
    const markers = {markers};

    const map = L.map('map').setView([{lat}, {lon}], {zoom});
    L.tileLayer('https://tile.openstreetmap.org/{{z}}/{{x}}/{{y}}.png', {{
      maxZoom: 19,
      attribution: '&copy; <a href="https://www.openstreetmap.org/copyright">OpenStreetMap</a> contributors'
    }}).addTo(map);

    L.geoJSON(areas, {{
      style: (feature) => ({{
        fillColor: feature.properties.{fill_property},
        fillOpacity: {fill_opacity},
        color: 'black',
        weight: 1,
        opacity: {line_opacity}
      }})
    }}).addTo(map);

    for (const m of markers) {{
      L.marker([m.lat, m.lon], {{ icon: L.divIcon({{ className: '', html: m.html }}) }}).addTo(map);
    }}

    const legend = L.control({{ position: 'topright' }});
    legend.onAdd = () => {{
      const div = L.DomUtil.create('div', 'legend');
      div.innerHTML = {legend};
      return div;
    }};
    legend.addTo(map);
  </script>
</body>
</html>
"#,
        title = html_encode(&joined.metric),
        features = features,
        markers = markers,
        legend = legend,
        lat = MAP_CENTER.0,
        lon = MAP_CENTER.1,
        zoom = MAP_ZOOM,
        fill_property = FILL_PROPERTY,
        fill_opacity = MAP_FILL_OPACITY,
        line_opacity = MAP_LINE_OPACITY,
    ))
}

/// Writes the interactive map, replacing any previous file
pub fn render_map(joined: &JoinedAreas, range: (f64, f64), output_path: &Path) -> Result<()> {
    let document = map_document(joined, range)?;
    std::fs::write(output_path, document).map_err(|source| StoryError::WriteFile {
        path: output_path.to_path_buf(),
        source,
    })?;
    info!("Interactive map written to {}", output_path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boundaries::read_boundaries_from_reader;
    use crate::indicators::read_indicators_from_reader;
    use crate::join::{IndicatorColumns, left_join};

    const AREAS: &str = r#"{"type":"FeatureCollection","features":[
        {"type":"Feature","properties":{"area_numbe":"1","community":"ONE"},
         "geometry":{"type":"Polygon","coordinates":[[[-87.70,41.80],[-87.68,41.80],[-87.68,41.82],[-87.70,41.82],[-87.70,41.80]]]}},
        {"type":"Feature","properties":{"area_numbe":"2","community":"TWO"},
         "geometry":{"type":"Polygon","coordinates":[[[-87.66,41.80],[-87.64,41.80],[-87.64,41.82],[-87.66,41.82],[-87.66,41.80]]]}},
        {"type":"Feature","properties":{"area_numbe":"3","community":"THREE"},
         "geometry":{"type":"Polygon","coordinates":[[[-87.62,41.80],[-87.60,41.80],[-87.60,41.82],[-87.62,41.82],[-87.62,41.80]]]}}
    ]}"#;
    const CSV: &str = "Community Area,Community Area Name,Low Birth Weight\n1,AreaOne,10.0\n2,AreaTwo,20.0\n3,AreaThree,\n";

    fn with_joined<F: FnOnce(&JoinedAreas)>(f: F) {
        let boundaries = read_boundaries_from_reader(AREAS.as_bytes()).unwrap();
        let table = read_indicators_from_reader(CSV.as_bytes()).unwrap();
        let columns = IndicatorColumns::resolve(&table, "Low Birth Weight").unwrap();
        let values = table.numeric_column(columns.metric).unwrap();
        let joined = left_join(&boundaries, &table, &columns, "Low Birth Weight", &values);
        f(&joined);
    }

    #[test]
    fn test_fill_colors_by_class() {
        let breaks = ClassBreaks::equal_width(10.0, 20.0, MAP_CLASSES);
        assert_eq!(fill_color(Some(10.0), &breaks), "#ffffb2");
        assert_eq!(fill_color(Some(20.0), &breaks), "#bd0026");
        assert_eq!(fill_color(None, &breaks), "#000000");
        assert_eq!(class_colors(&breaks).len(), 6);
    }

    #[test]
    fn test_styled_features_carry_record_and_fill() {
        with_joined(|joined| {
            let breaks = ClassBreaks::equal_width(10.0, 20.0, MAP_CLASSES);
            let collection = styled_features(joined, &breaks);
            assert_eq!(collection.features.len(), 3);

            let first = collection.features[0].properties.as_ref().unwrap();
            assert_eq!(first["community"], "ONE");
            assert_eq!(first["Community Area Name"], "AreaOne");
            assert_eq!(first["Low Birth Weight"], 10.0);
            assert_eq!(first["fill_color"], "#ffffb2");

            let third = collection.features[2].properties.as_ref().unwrap();
            assert!(third["Low Birth Weight"].is_null());
            assert_eq!(third["fill_color"], "#000000");
        });
    }

    #[test]
    fn test_document_markers_only_for_values() {
        with_joined(|joined| {
            let html = map_document(joined, (10.0, 20.0)).unwrap();
            let marker = |text: &str| script_json(&marker_html(text)).unwrap();
            assert!(html.contains(marker("10.0").trim_matches('"')));
            assert!(html.contains(marker("20.0").trim_matches('"')));
            assert_eq!(html.matches("font-weight: bold").count(), 2);
            assert!(html.contains("setView([41.85, -87.65], 10)"));
            assert!(html.contains("leaflet/1.9.4/leaflet.js"));
            assert!(html.contains("tile.openstreetmap.org/{z}/{x}/{y}.png"));
        });
    }

    #[test]
    fn test_metric_name_escaped() {
        let legend = legend_html("<Rate & Ratio>", &ClassBreaks::equal_width(0.0, 6.0, 6));
        assert!(legend.starts_with("<strong>&lt;Rate &amp; Ratio&gt;</strong>"));
        assert!(legend.contains("0.00 &ndash; 1.00"));
        assert!(legend.ends_with("No data"));
    }
}
