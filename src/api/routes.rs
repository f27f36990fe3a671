//! API Routes
//!
//! `GET /<domain>` lookup endpoint plus the optional health and metrics
//! listener.

use axum::{
    body::Body,
    extract::State,
    http::{
        header::{self, HeaderMap, HeaderValue},
        Method, StatusCode, Uri,
    },
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use std::borrow::Cow;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info};

use crate::api::conditional::serve_content;
use crate::api::Metrics;
use crate::config::ResolvConfig;
use crate::dns::{resolve_domain, RecordSource, Resolution};
use crate::types::{compute_etag, ResponseEnvelope, INTERNAL_ERROR_BODY, NOT_FOUND_BODY};

const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";

/// Shared API state
pub struct ApiState {
    pub source: Arc<dyn RecordSource>,
    pub metrics: Arc<Metrics>,
    cache_control: HeaderValue,
}

impl ApiState {
    pub fn new(
        config: &ResolvConfig,
        source: Arc<dyn RecordSource>,
        metrics: Arc<Metrics>,
    ) -> anyhow::Result<Self> {
        Ok(Self {
            source,
            metrics,
            cache_control: HeaderValue::from_str(&config.cache_control())?,
        })
    }

    /// Headers shared by every JSON response, errors included
    fn json_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE));
        headers.insert(header::CACHE_CONTROL, self.cache_control.clone());
        headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
        headers
    }
}

/// Router answering every path with a domain lookup
pub fn lookup_router(state: Arc<ApiState>) -> Router {
    Router::new()
        .fallback(serve_domain)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Run the lookup API server
pub async fn run_api_server(
    config: Arc<ResolvConfig>,
    source: Arc<dyn RecordSource>,
    metrics: Arc<Metrics>,
) -> anyhow::Result<()> {
    let state = Arc::new(ApiState::new(&config, source, metrics)?);
    let app = lookup_router(state);

    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    info!("🌐 Lookup API listening on {}", config.listen_addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Any path - resolve the domain named by the path
async fn serve_domain(
    State(state): State<Arc<ApiState>>,
    method: Method,
    uri: Uri,
    request_headers: HeaderMap,
) -> Response {
    state.metrics.inc_requests();

    if method != Method::GET {
        state.metrics.inc_rejected_methods();
        return method_not_allowed(&method);
    }

    let domain = match domain_from_path(uri.path()) {
        Some(domain) => domain,
        None => {
            state.metrics.inc_bad_requests();
            return (
                StatusCode::BAD_REQUEST,
                format!("Request path {} is not valid UTF-8.\n", uri.path()),
            )
                .into_response();
        }
    };

    let headers = state.json_headers();

    let records = match resolve_domain(state.source.as_ref(), &domain).await {
        Ok(Resolution::Found(records)) => records,
        Ok(Resolution::NotFound) => {
            state.metrics.inc_not_found();
            return error_response(StatusCode::NOT_FOUND, headers, &NOT_FOUND_BODY);
        }
        Err(e) => {
            error!(domain = %domain, error = %e, "Error resolving records");
            state.metrics.inc_resolution_errors();
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, headers, &INTERNAL_ERROR_BODY);
        }
    };

    debug!(
        domain = %domain,
        servers = records.servers.len(),
        alternatives = records.alternatives.len(),
        "Resolved records"
    );

    let encoded = match serde_json::to_vec(&ResponseEnvelope::data(records)) {
        Ok(encoded) => encoded,
        Err(e) => {
            // Records are plain strings and integers; this is a broken invariant
            error!(domain = %domain, error = %e, "Error encoding response envelope");
            std::process::exit(1);
        }
    };

    let etag = compute_etag(&encoded);
    let response = serve_content(&request_headers, headers, &etag, encoded);

    if response.status() == StatusCode::NOT_MODIFIED {
        state.metrics.inc_not_modified();
    } else {
        state.metrics.inc_ok();
    }

    response
}

/// Percent-decoded path without its leading `/`
fn domain_from_path(path: &str) -> Option<String> {
    let raw = path.strip_prefix('/').unwrap_or(path);
    urlencoding::decode(raw).ok().map(Cow::into_owned)
}

/// Plain-text rejection, outside the envelope format
fn method_not_allowed(method: &Method) -> Response {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8"),
            (header::X_CONTENT_TYPE_OPTIONS, "nosniff"),
        ],
        format!("This resource does not accept {} requests.\n", method),
    )
        .into_response()
}

/// Fixed envelope plus newline, keeping the already prepared headers
fn error_response(status: StatusCode, headers: HeaderMap, body: &str) -> Response {
    (status, headers, Body::from(format!("{}\n", body))).into_response()
}

// =============================================================================
// HEALTH & METRICS
// =============================================================================

/// Router for the health and metrics listener
pub fn metrics_router(metrics: Arc<Metrics>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(get_metrics_prometheus))
        .route("/metrics/json", get(get_metrics_json))
        .with_state(metrics)
}

/// Run the health and metrics server
pub async fn run_metrics_server(addr: SocketAddr, metrics: Arc<Metrics>) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("📊 Metrics listening on {}", addr);

    axum::serve(listener, metrics_router(metrics)).await?;

    Ok(())
}

/// GET /health - Simple health check
async fn health_check() -> impl IntoResponse {
    "OK"
}

/// GET /metrics - Prometheus format metrics
async fn get_metrics_prometheus(State(metrics): State<Arc<Metrics>>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        metrics.to_prometheus(),
    )
}

/// GET /metrics/json - JSON format metrics
async fn get_metrics_json(State(metrics): State<Arc<Metrics>>) -> impl IntoResponse {
    Json(metrics.to_json())
}
