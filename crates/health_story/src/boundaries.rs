use crate::constants::BOUNDARY_KEY_PROPERTY;
use crate::error::{Result, StoryError};
use crate::join::normalize_json_key;

use geo::{Centroid, MultiPolygon, Point};
use geojson::{Feature, GeoJson, JsonObject};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// One community area polygon with its GeoJSON properties
#[derive(Debug, Clone, PartialEq)]
pub struct AreaBoundary {
    /// `area_numbe` normalized to canonical text, `None` when absent
    pub key: Option<String>,
    pub properties: JsonObject,
    pub shape: MultiPolygon<f64>,
}

impl AreaBoundary {
    /// Area-weighted centroid in lon/lat
    pub fn centroid(&self) -> Option<Point<f64>> {
        self.shape.centroid()
    }
}

/// Reads community area boundaries from a GeoJSON file
///
/// # Errors
/// Returns error if the file cannot be read, is not valid GeoJSON, or a
/// feature carries something other than a (multi)polygon
pub fn read_boundaries<P: AsRef<Path>>(path: P) -> Result<Vec<AreaBoundary>> {
    let file = File::open(path)?;
    read_boundaries_from_reader(BufReader::new(file))
}

pub fn read_boundaries_from_reader<R: Read>(reader: R) -> Result<Vec<AreaBoundary>> {
    let features = match GeoJson::from_reader(reader)? {
        GeoJson::FeatureCollection(collection) => collection.features,
        GeoJson::Feature(feature) => vec![feature],
        GeoJson::Geometry(_) => {
            return Err(StoryError::Geometry {
                message: "expected a Feature or FeatureCollection, found a bare geometry"
                    .to_string(),
            });
        }
    };

    features
        .into_iter()
        .enumerate()
        .map(|(index, feature)| parse_feature(feature, index))
        .collect()
}

fn parse_feature(feature: Feature, index: usize) -> Result<AreaBoundary> {
    let properties = feature.properties.unwrap_or_default();
    let key = properties.get(BOUNDARY_KEY_PROPERTY).and_then(normalize_json_key);

    let geometry = feature.geometry.ok_or_else(|| StoryError::Geometry {
        message: format!("feature {} has no geometry", index),
    })?;

    let shape = match geo::Geometry::<f64>::try_from(geometry)? {
        geo::Geometry::Polygon(polygon) => MultiPolygon::new(vec![polygon]),
        geo::Geometry::MultiPolygon(multi) => multi,
        other => {
            return Err(StoryError::Geometry {
                message: format!(
                    "feature {} ({}) is a {}, expected Polygon or MultiPolygon",
                    index,
                    key.as_deref().unwrap_or("no key"),
                    geometry_kind(&other)
                ),
            });
        }
    };

    Ok(AreaBoundary {
        key,
        properties,
        shape,
    })
}

fn geometry_kind(geometry: &geo::Geometry<f64>) -> &'static str {
    match geometry {
        geo::Geometry::Point(_) => "Point",
        geo::Geometry::Line(_) => "Line",
        geo::Geometry::LineString(_) => "LineString",
        geo::Geometry::Polygon(_) => "Polygon",
        geo::Geometry::MultiPoint(_) => "MultiPoint",
        geo::Geometry::MultiLineString(_) => "MultiLineString",
        geo::Geometry::MultiPolygon(_) => "MultiPolygon",
        geo::Geometry::GeometryCollection(_) => "GeometryCollection",
        geo::Geometry::Rect(_) => "Rect",
        geo::Geometry::Triangle(_) => "Triangle",
    }
}
