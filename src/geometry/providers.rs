//! Geometry sources: the Nominatim provider and the trait the resolver fetches through.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use super::types::{FeatureCollection, LookupFailure};
use crate::config::ResolverConfig;

/// What to ask the provider for.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GeometryRequest {
    /// Free-text search for a region name.
    Search { name: String },
    /// Direct lookup of an OSM relation.
    Relation { osm_id: u64 },
}

pub type FetchFuture<'a> =
    Pin<Box<dyn Future<Output = Result<FeatureCollection, LookupFailure>> + Send + 'a>>;

/// A provider of boundary features. One call is one outbound request.
pub trait GeometrySource: Send + Sync + 'static {
    fn fetch(&self, request: GeometryRequest) -> FetchFuture<'_>;
}

impl<T: GeometrySource + ?Sized> GeometrySource for Arc<T> {
    fn fetch(&self, request: GeometryRequest) -> FetchFuture<'_> {
        (**self).fetch(request)
    }
}

// ─── Nominatim provider ─────────────────────────────────────────

pub struct NominatimSource {
    agent: ureq::Agent,
    base_url: String,
    accept_language: String,
    country: String,
}

impl NominatimSource {
    pub fn new(config: &ResolverConfig) -> Self {
        let mut builder = ureq::AgentBuilder::new().user_agent(&config.user_agent);
        if let Some(t) = config.http_timeout {
            builder = builder.timeout(t);
        }
        Self {
            agent: builder.build(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            accept_language: config.accept_language.clone(),
            country: config.country.clone(),
        }
    }

    /// Endpoint path and query pairs for `request`, relative to the base URL.
    pub fn endpoint(
        &self,
        request: &GeometryRequest,
    ) -> (&'static str, Vec<(&'static str, String)>) {
        match request {
            GeometryRequest::Search { name } => (
                "search",
                vec![
                    ("q", format!("{}, {}", name, self.country)),
                    ("format", "geojson".into()),
                    ("polygon_geojson", "1".into()),
                    ("limit", "1".into()),
                ],
            ),
            GeometryRequest::Relation { osm_id } => (
                "lookup",
                vec![
                    ("osm_ids", format!("R{}", osm_id)),
                    ("format", "geojson".into()),
                    ("polygon_geojson", "1".into()),
                ],
            ),
        }
    }

    fn prepare(&self, request: &GeometryRequest) -> ureq::Request {
        let (path, query) = self.endpoint(request);
        let url = format!("{}/{}", self.base_url, path);
        query
            .iter()
            .fold(self.agent.get(&url), |req, (k, v)| req.query(k, v))
            .set("Accept-Language", &self.accept_language)
    }
}

fn fetch_blocking(request: ureq::Request) -> Result<FeatureCollection, LookupFailure> {
    let response = request.call().map_err(|e| match e {
        ureq::Error::Status(code, _) => LookupFailure::Status(code),
        ureq::Error::Transport(t) => LookupFailure::Transport(t.to_string()),
    })?;

    response
        .into_json()
        .map_err(|e| LookupFailure::Decode(e.to_string()))
}

impl GeometrySource for NominatimSource {
    fn fetch(&self, request: GeometryRequest) -> FetchFuture<'_> {
        let prepared = self.prepare(&request);
        Box::pin(async move {
            tracing::debug!(url = prepared.url(), "nominatim request");
            tokio::task::spawn_blocking(move || fetch_blocking(prepared))
                .await
                .map_err(|e| LookupFailure::Transport(e.to_string()))?
        })
    }
}
