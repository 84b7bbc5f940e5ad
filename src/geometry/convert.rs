//! Conversion from provider geometry to map-layer rings.

use super::types::{Geometry, LatLng, Ring};

fn swap_ring(ring: &Ring) -> Vec<LatLng> {
    ring.iter().map(|[lng, lat]| [*lat, *lng]).collect()
}

/// Convert a geometry to `[lat, lng]` rings.
///
/// A `Polygon` yields all of its rings. A `MultiPolygon` yields only the rings of
/// its first polygon; further disjoint parts (offshore islands, exclaves) are
/// dropped. Any other geometry yields no rings.
pub fn to_lat_lng_rings(geometry: &Geometry) -> Vec<Vec<LatLng>> {
    match geometry {
        Geometry::Polygon(rings) => rings.iter().map(swap_ring).collect(),
        Geometry::MultiPolygon(polygons) => polygons
            .first()
            .map(|rings| rings.iter().map(swap_ring).collect())
            .unwrap_or_default(),
        Geometry::Other(_) => Vec::new(),
    }
}
