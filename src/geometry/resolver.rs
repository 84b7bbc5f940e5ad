//! Geometry resolver: cache, rate gate and provider behind one handle.
//!
//! Lookup flow:   Cache → rate gate → provider → cache (positive or negative)
//! Province flow: OSM relation → full-text search → built-in approximate bounds
//!
//! Nothing here returns an error to the caller. A failed lookup is cached as a
//! miss and logged, so a missing boundary never breaks the map.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use super::cache::GeometryCache;
use super::convert::to_lat_lng_rings;
use super::providers::{GeometryRequest, GeometrySource, NominatimSource};
use super::provinces;
use super::rate_gate::RateGate;
use super::types::{BoundarySource, CacheKey, GeometryFeature, Lookup, ProvinceBoundary};
use crate::config::ResolverConfig;

pub struct GeometryResolver<S = NominatimSource> {
    source: S,
    cache: GeometryCache,
    gate: RateGate,
    offline: bool,
}

impl GeometryResolver<NominatimSource> {
    /// Resolver talking to Nominatim as described by `config`.
    pub fn new(config: &ResolverConfig) -> Self {
        Self::with_source(NominatimSource::new(config), RateGate::new(config.min_interval))
    }
}

impl<S: GeometrySource> GeometryResolver<S> {
    /// Create a resolver over any source (for testing).
    pub fn with_source(source: S, gate: RateGate) -> Self {
        Self {
            source,
            cache: GeometryCache::new(),
            gate,
            offline: false,
        }
    }

    /// Offline mode skips network calls. Offline misses are not cached.
    pub fn set_offline(&mut self, offline: bool) {
        self.offline = offline;
    }

    pub fn is_offline(&self) -> bool {
        self.offline
    }

    pub fn cache(&self) -> &GeometryCache {
        &self.cache
    }

    /// Minimum spacing between outbound requests.
    pub fn min_interval(&self) -> Duration {
        self.gate.min_interval()
    }

    /// Resolve a region name by full-text search. Case-insensitive.
    pub async fn resolve_by_name(&self, name: &str) -> Option<Arc<GeometryFeature>> {
        self.lookup_by_name(name).await.into_feature()
    }

    /// Resolve an OSM relation id by direct lookup.
    pub async fn resolve_by_osm_id(&self, osm_id: u64) -> Option<Arc<GeometryFeature>> {
        self.lookup_by_osm_id(osm_id).await.into_feature()
    }

    /// Like [`resolve_by_name`](Self::resolve_by_name), keeping the reason for a miss.
    pub async fn lookup_by_name(&self, name: &str) -> Lookup {
        let request = GeometryRequest::Search {
            name: name.to_string(),
        };
        self.lookup(CacheKey::name(name), request).await
    }

    pub async fn lookup_by_osm_id(&self, osm_id: u64) -> Lookup {
        self.lookup(CacheKey::relation(osm_id), GeometryRequest::Relation { osm_id })
            .await
    }

    /// Discard every cached outcome.
    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    async fn lookup(&self, key: CacheKey, request: GeometryRequest) -> Lookup {
        if let Some(hit) = self.cache.get(&key) {
            debug!(%key, found = hit.is_found(), "geometry cache hit");
            return hit;
        }
        if self.offline {
            return Lookup::NotFound;
        }

        let slot = self.cache.slot(&key);
        slot.get_or_init(|| self.fetch(&key, request)).await.clone()
    }

    async fn fetch(&self, key: &CacheKey, request: GeometryRequest) -> Lookup {
        self.gate.acquire().await;

        match self.source.fetch(request).await {
            Ok(collection) => match collection.features.into_iter().next() {
                Some(feature) => {
                    debug!(%key, kind = feature.geometry.kind(), "geometry resolved");
                    Lookup::Found(Arc::new(feature))
                }
                None => {
                    debug!(%key, "provider returned no features");
                    Lookup::NotFound
                }
            },
            Err(e) => {
                warn!(%key, error = %e, "geometry lookup failed");
                Lookup::Failed(e)
            }
        }
    }

    /// Resolve a province boundary: relation id first, then name search, then the
    /// catalogue's approximate bounds.
    pub async fn resolve_province(&self, query: &str) -> Option<ProvinceBoundary> {
        let province = provinces::find_province(query);

        if let Some(osm_id) = province.and_then(|p| p.osm_relation) {
            if let Some(feature) = self.resolve_by_osm_id(osm_id).await {
                let name = province.map(|p| p.name);
                return Some(boundary_from(&feature, name, BoundarySource::OsmRelation));
            }
        }

        let search_name = province.map(|p| p.name).unwrap_or(query);
        if let Some(feature) = self.resolve_by_name(search_name).await {
            let name = province.map(|p| p.name);
            return Some(boundary_from(&feature, name, BoundarySource::Search));
        }

        province.map(|p| ProvinceBoundary {
            name: p.name.to_string(),
            display_name: None,
            rings: p.approximate_rings(),
            source: BoundarySource::Approximate,
        })
    }
}

fn boundary_from(
    feature: &GeometryFeature,
    catalogue_name: Option<&str>,
    source: BoundarySource,
) -> ProvinceBoundary {
    let name = catalogue_name.unwrap_or_else(|| feature.name()).to_string();
    let display_name = Some(feature.display_name())
        .filter(|d| !d.is_empty())
        .map(str::to_string);
    ProvinceBoundary {
        name,
        display_name,
        rings: to_lat_lng_rings(&feature.geometry),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::providers::FetchFuture;
    use crate::geometry::types::{FeatureCollection, LookupFailure};

    struct Unreachable;

    impl GeometrySource for Unreachable {
        fn fetch(&self, _request: GeometryRequest) -> FetchFuture<'_> {
            Box::pin(async { Err(LookupFailure::Transport("connection refused".into())) })
        }
    }

    struct Empty;

    impl GeometrySource for Empty {
        fn fetch(&self, _request: GeometryRequest) -> FetchFuture<'_> {
            Box::pin(async { Ok(FeatureCollection::default()) })
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_transport_failure_is_cached_miss() {
        let resolver = GeometryResolver::with_source(Unreachable, RateGate::default());
        assert!(resolver.resolve_by_name("Hà Giang").await.is_none());
        assert_eq!(
            resolver.cache().get(&CacheKey::name("hà giang")),
            Some(Lookup::Failed(LookupFailure::Transport("connection refused".into())))
        );
    }

    #[tokio::test]
    async fn test_offline_skips_network_and_cache() {
        let mut resolver = GeometryResolver::with_source(Unreachable, RateGate::default());
        resolver.set_offline(true);
        assert_eq!(resolver.lookup_by_osm_id(1903291).await, Lookup::NotFound);
        assert!(resolver.cache().is_empty());
    }

    #[tokio::test]
    async fn test_offline_province_uses_catalogue() {
        let mut resolver = GeometryResolver::with_source(Unreachable, RateGate::default());
        resolver.set_offline(true);
        let b = resolver.resolve_province("lang son").await.unwrap();
        assert_eq!(b.name, "Lạng Sơn");
        assert_eq!(b.source, BoundarySource::Approximate);
        assert_eq!(b.rings[0][0], [22.4, 106.2]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unknown_province_without_match() {
        let resolver = GeometryResolver::with_source(Empty, RateGate::default());
        assert!(resolver.resolve_province("Atlantis").await.is_none());
        assert_eq!(
            resolver.cache().get(&CacheKey::name("atlantis")),
            Some(Lookup::NotFound)
        );
    }
}
