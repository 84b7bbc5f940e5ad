//! Core types for the geometry subsystem.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::sync::Arc;

/// A `[lon, lat]` position as the provider sends it.
pub type LngLat = [f64; 2];

/// A `[lat, lng]` pair as the map layer consumes it.
pub type LatLng = [f64; 2];

/// One linear ring of provider positions.
pub type Ring = Vec<LngLat>;

/// Cache key. Name and relation lookups live in separate namespaces.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    Name(String),
    Relation(u64),
}

impl CacheKey {
    pub fn name(name: &str) -> Self {
        Self::Name(name.to_lowercase())
    }

    pub fn relation(osm_id: u64) -> Self {
        Self::Relation(osm_id)
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name(n) => write!(f, "{}", n),
            Self::Relation(id) => write!(f, "osm_{}", id),
        }
    }
}

/// A boundary geometry. Anything other than (multi)polygons is kept only by kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawGeometry", into = "RawGeometry")]
pub enum Geometry {
    Polygon(Vec<Ring>),
    MultiPolygon(Vec<Vec<Ring>>),
    Other(String),
}

impl Geometry {
    pub fn kind(&self) -> &str {
        match self {
            Self::Polygon(_) => "Polygon",
            Self::MultiPolygon(_) => "MultiPolygon",
            Self::Other(kind) => kind,
        }
    }
}

#[derive(Serialize, Deserialize)]
struct RawGeometry {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    coordinates: serde_json::Value,
}

fn positions(raw: Vec<Vec<f64>>) -> Result<Ring, String> {
    raw.into_iter()
        .map(|p| match p.as_slice() {
            [lon, lat, ..] => Ok([*lon, *lat]),
            _ => Err(format!("position needs two values, got {}", p.len())),
        })
        .collect()
}

fn rings(raw: Vec<Vec<Vec<f64>>>) -> Result<Vec<Ring>, String> {
    raw.into_iter().map(positions).collect()
}

impl TryFrom<RawGeometry> for Geometry {
    type Error = String;

    fn try_from(raw: RawGeometry) -> Result<Self, Self::Error> {
        match raw.kind.as_str() {
            "Polygon" => {
                let coords: Vec<Vec<Vec<f64>>> =
                    serde_json::from_value(raw.coordinates).map_err(|e| e.to_string())?;
                Ok(Self::Polygon(rings(coords)?))
            }
            "MultiPolygon" => {
                let coords: Vec<Vec<Vec<Vec<f64>>>> =
                    serde_json::from_value(raw.coordinates).map_err(|e| e.to_string())?;
                let polygons: Vec<Vec<Ring>> =
                    coords.into_iter().map(rings).collect::<Result<_, _>>()?;
                Ok(Self::MultiPolygon(polygons))
            }
            _ => Ok(Self::Other(raw.kind)),
        }
    }
}

impl From<Geometry> for RawGeometry {
    fn from(g: Geometry) -> Self {
        let (kind, coordinates) = match g {
            Geometry::Polygon(r) => ("Polygon".to_string(), serde_json::json!(r)),
            Geometry::MultiPolygon(p) => ("MultiPolygon".to_string(), serde_json::json!(p)),
            Geometry::Other(kind) => (kind, serde_json::Value::Null),
        };
        RawGeometry { kind, coordinates }
    }
}

// Nominatim sends `"name": null` for some unnamed relations.
fn null_as_empty<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(d)?.unwrap_or_default())
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureProperties {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub display_name: String,
}

/// A single boundary feature returned by the provider. Immutable once fetched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeometryFeature {
    #[serde(default)]
    pub properties: FeatureProperties,
    pub geometry: Geometry,
}

impl GeometryFeature {
    pub fn name(&self) -> &str {
        &self.properties.name
    }

    pub fn display_name(&self) -> &str {
        &self.properties.display_name
    }
}

/// Provider response body (`format=geojson`).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeatureCollection {
    #[serde(default)]
    pub features: Vec<GeometryFeature>,
}

/// Why a lookup produced no feature, other than the provider having none.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LookupFailure {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("provider returned HTTP {0}")]
    Status(u16),
    #[error("could not decode provider response: {0}")]
    Decode(String),
}

/// Outcome of a single keyed lookup, as stored in the cache.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup {
    Found(Arc<GeometryFeature>),
    /// The provider answered with zero features.
    NotFound,
    Failed(LookupFailure),
}

impl Lookup {
    pub fn into_feature(self) -> Option<Arc<GeometryFeature>> {
        match self {
            Self::Found(f) => Some(f),
            _ => None,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }
}

/// Where a province boundary came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BoundarySource {
    OsmRelation,
    Search,
    Approximate,
}

impl fmt::Display for BoundarySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OsmRelation => write!(f, "OSM relation"),
            Self::Search => write!(f, "Nominatim search"),
            Self::Approximate => write!(f, "Built-in"),
        }
    }
}

/// A province boundary ready for the map layer, with provenance.
#[derive(Debug, Clone, Serialize)]
pub struct ProvinceBoundary {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    pub rings: Vec<Vec<LatLng>>,
    pub source: BoundarySource,
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEARCH_BODY: &str = r#"{
        "type": "FeatureCollection",
        "licence": "Data © OpenStreetMap contributors, ODbL 1.0.",
        "features": [{
            "type": "Feature",
            "properties": {
                "place_id": 1,
                "osm_type": "relation",
                "osm_id": 1903291,
                "name": "Tỉnh Sơn La",
                "display_name": "Tỉnh Sơn La, Việt Nam",
                "importance": 0.6
            },
            "bbox": [103.2, 20.6, 105.0, 22.0],
            "geometry": {
                "type": "Polygon",
                "coordinates": [[[103.2, 21.0], [104.0, 21.5], [103.5, 22.0], [103.2, 21.0]]]
            }
        }]
    }"#;

    #[test]
    fn test_parse_nominatim_geojson() {
        let fc: FeatureCollection = serde_json::from_str(SEARCH_BODY).unwrap();
        assert_eq!(fc.features.len(), 1);
        let f = &fc.features[0];
        assert_eq!(f.name(), "Tỉnh Sơn La");
        assert_eq!(f.display_name(), "Tỉnh Sơn La, Việt Nam");
        match &f.geometry {
            Geometry::Polygon(r) => {
                assert_eq!(r.len(), 1);
                assert_eq!(r[0][1], [104.0, 21.5]);
            }
            other => panic!("unexpected geometry {:?}", other),
        }
    }

    #[test]
    fn test_parse_empty_collection() {
        let fc: FeatureCollection =
            serde_json::from_str(r#"{"type":"FeatureCollection","features":[]}"#).unwrap();
        assert!(fc.features.is_empty());
    }

    #[test]
    fn test_null_name() {
        let f: GeometryFeature = serde_json::from_str(
            r#"{"properties":{"name":null,"display_name":"Việt Nam"},"geometry":{"type":"Point","coordinates":[0,0]}}"#,
        )
        .unwrap();
        assert_eq!(f.name(), "");
        assert_eq!(f.display_name(), "Việt Nam");
    }

    #[test]
    fn test_point_is_other() {
        let g: Geometry =
            serde_json::from_str(r#"{"type":"Point","coordinates":[105.8,21.0]}"#).unwrap();
        assert_eq!(g, Geometry::Other("Point".into()));
        assert_eq!(g.kind(), "Point");
    }

    #[test]
    fn test_altitude_dropped() {
        let g: Geometry = serde_json::from_str(
            r#"{"type":"Polygon","coordinates":[[[105.8,21.0,12.5],[105.9,21.1,3.0]]]}"#,
        )
        .unwrap();
        assert_eq!(g, Geometry::Polygon(vec![vec![[105.8, 21.0], [105.9, 21.1]]]));
    }

    #[test]
    fn test_short_position_rejected() {
        let r: Result<Geometry, _> =
            serde_json::from_str(r#"{"type":"Polygon","coordinates":[[[105.8]]]}"#);
        assert!(r.is_err());
    }

    #[test]
    fn test_geometry_serializes_back_to_geojson() {
        let g = Geometry::MultiPolygon(vec![vec![vec![[1.0, 2.0]]]]);
        let v = serde_json::to_value(&g).unwrap();
        assert_eq!(v["type"], "MultiPolygon");
        assert_eq!(v["coordinates"][0][0][0][1], 2.0);
    }

    #[test]
    fn test_cache_key_display() {
        assert_eq!(CacheKey::name("Sơn La").to_string(), "sơn la");
        assert_eq!(CacheKey::relation(1903291).to_string(), "osm_1903291");
        assert_ne!(CacheKey::name("osm_1903291"), CacheKey::relation(1903291));
    }
}
