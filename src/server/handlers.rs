use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

use crate::geometry::{
    province_list, to_lat_lng_rings, GeometrySource, LatLng, Lookup, ProvinceBoundary,
    ProvinceInfo,
};

use super::state::AppState;

// ─── Error response ──────────────────────────────────────────────

#[derive(Serialize)]
struct ApiErrorBody {
    error: String,
    code: u16,
}

pub(super) struct ApiError(StatusCode, String);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ApiErrorBody {
            error: self.1,
            code: self.0.as_u16(),
        };
        (self.0, Json(body)).into_response()
    }
}

fn api_error(status: StatusCode, msg: impl Into<String>) -> ApiError {
    ApiError(status, msg.into())
}

// ─── GET /api/health ─────────────────────────────────────────────

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub cached_entries: usize,
    pub offline: bool,
    pub min_interval_ms: u64,
}

pub async fn health<S: GeometrySource>(
    State(state): State<Arc<AppState<S>>>,
) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        cached_entries: state.resolver.cache().len(),
        offline: state.resolver.is_offline(),
        min_interval_ms: state.resolver.min_interval().as_millis() as u64,
    })
}

// ─── GET /api/geometry ───────────────────────────────────────────

#[derive(Deserialize)]
pub struct GeometryQuery {
    pub name: Option<String>,
    pub osm_id: Option<u64>,
}

#[derive(Debug, Serialize)]
pub struct GeometryResponse {
    pub name: String,
    pub display_name: String,
    pub geometry_type: String,
    pub rings: Vec<Vec<LatLng>>,
}

pub async fn geometry<S: GeometrySource>(
    State(state): State<Arc<AppState<S>>>,
    Query(params): Query<GeometryQuery>,
) -> Result<Json<GeometryResponse>, ApiError> {
    let start = Instant::now();

    let name = params.name.as_deref().map(str::trim).filter(|n| !n.is_empty());
    let (label, lookup) = match (params.osm_id, name) {
        (Some(id), _) => (format!("osm_id={}", id), state.resolver.lookup_by_osm_id(id).await),
        (None, Some(n)) => (format!("name={}", n), state.resolver.lookup_by_name(n).await),
        (None, None) => {
            return Err(api_error(
                StatusCode::BAD_REQUEST,
                "Provide 'name' or 'osm_id' parameter",
            ))
        }
    };

    let feature = match lookup {
        Lookup::Found(f) => f,
        Lookup::NotFound => {
            return Err(api_error(StatusCode::NOT_FOUND, format!("No boundary for {}", label)))
        }
        // Upstream failures still read as "no boundary" to the map.
        Lookup::Failed(e) => {
            return Err(api_error(
                StatusCode::NOT_FOUND,
                format!("No boundary for {} ({})", label, e),
            ))
        }
    };

    tracing::info!(
        query = %label,
        kind = feature.geometry.kind(),
        elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
        "GET /api/geometry"
    );

    Ok(Json(GeometryResponse {
        name: feature.name().to_string(),
        display_name: feature.display_name().to_string(),
        geometry_type: feature.geometry.kind().to_string(),
        rings: to_lat_lng_rings(&feature.geometry),
    }))
}

// ─── GET /api/provinces/{name}/boundary ──────────────────────────

pub async fn province_boundary<S: GeometrySource>(
    State(state): State<Arc<AppState<S>>>,
    Path(name): Path<String>,
) -> Result<Json<ProvinceBoundary>, ApiError> {
    let start = Instant::now();

    let boundary = state
        .resolver
        .resolve_province(&name)
        .await
        .ok_or_else(|| api_error(StatusCode::NOT_FOUND, format!("Unknown province '{}'", name)))?;

    tracing::info!(
        province = %boundary.name,
        source = %boundary.source,
        elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
        "GET /api/provinces/{{name}}/boundary"
    );

    Ok(Json(boundary))
}

// ─── GET /api/provinces ──────────────────────────────────────────

pub async fn provinces() -> Json<Vec<ProvinceInfo>> {
    Json(province_list())
}
