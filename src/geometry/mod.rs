//! Boundary geometry subsystem.
//!
//! Resolves province names or OSM relation ids to polygons via Nominatim, with
//! request throttling, memoization of every outcome, and a built-in catalogue
//! of approximate province bounds.

pub mod cache;
pub mod convert;
pub mod providers;
pub mod provinces;
pub mod rate_gate;
pub mod resolver;
pub mod types;

pub use convert::to_lat_lng_rings;
pub use providers::{GeometryRequest, GeometrySource, NominatimSource};
pub use provinces::{find_by_relation, find_province, province_list, ProvinceInfo};
pub use rate_gate::RateGate;
pub use resolver::GeometryResolver;
pub use types::{
    BoundarySource, CacheKey, Geometry, GeometryFeature, LatLng, Lookup, LookupFailure,
    ProvinceBoundary,
};
