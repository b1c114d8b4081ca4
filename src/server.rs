//! HTTP server for health and metrics endpoints

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use chrono::{DateTime, Utc};
use eyre::eyre;
use prometheus::{Encoder, IntCounter, IntGauge, Registry, TextEncoder};
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::info;

/// Tracer statistics shared between the batch runner and HTTP server
#[derive(Debug, Default, Clone)]
pub struct TracerStats {
    pub cycles_completed: u64,
    pub denoms_resolved: u64,
    pub resolution_failures: u64,
    /// Chains in the snapshot of the last successful cycle
    pub snapshot_chains: usize,
    /// Packets handled in the last successful cycle
    pub last_cycle_packets: usize,
    pub last_cycle_at: Option<DateTime<Utc>>,
}

/// Prometheus metrics
pub struct Metrics {
    pub denoms_resolved_total: IntCounter,
    pub resolution_failures_total: IntCounter,
    pub batch_cycles_total: IntCounter,
    pub snapshot_failures_total: IntCounter,
    pub snapshot_chains: IntGauge,
    pub last_cycle_packets: IntGauge,
    pub registry: Registry,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    pub fn new() -> Self {
        let registry = Registry::new();

        let denoms_resolved_total = IntCounter::new(
            "denom_tracer_denoms_resolved_total",
            "Total number of denom provenance records written",
        )
        .expect("constant metric name is valid");

        let resolution_failures_total = IntCounter::new(
            "denom_tracer_resolution_failures_total",
            "Packet resolution attempts that failed and were left pending",
        )
        .expect("constant metric name is valid");

        let batch_cycles_total = IntCounter::new(
            "denom_tracer_batch_cycles_total",
            "Total number of completed batch cycles",
        )
        .expect("constant metric name is valid");

        let snapshot_failures_total = IntCounter::new(
            "denom_tracer_snapshot_failures_total",
            "Cycles aborted because the chain config snapshot failed to load",
        )
        .expect("constant metric name is valid");

        let snapshot_chains = IntGauge::new(
            "denom_tracer_snapshot_chains",
            "Chains in the current chain config snapshot",
        )
        .expect("constant metric name is valid");

        let last_cycle_packets = IntGauge::new(
            "denom_tracer_last_cycle_packets",
            "Packets handled in the last batch cycle",
        )
        .expect("constant metric name is valid");

        // Names are unique constants, each registered once
        registry
            .register(Box::new(denoms_resolved_total.clone()))
            .expect("metric registration must not be called twice");
        registry
            .register(Box::new(resolution_failures_total.clone()))
            .expect("metric registration must not be called twice");
        registry
            .register(Box::new(batch_cycles_total.clone()))
            .expect("metric registration must not be called twice");
        registry
            .register(Box::new(snapshot_failures_total.clone()))
            .expect("metric registration must not be called twice");
        registry
            .register(Box::new(snapshot_chains.clone()))
            .expect("metric registration must not be called twice");
        registry
            .register(Box::new(last_cycle_packets.clone()))
            .expect("metric registration must not be called twice");

        Self {
            denoms_resolved_total,
            resolution_failures_total,
            batch_cycles_total,
            snapshot_failures_total,
            snapshot_chains,
            last_cycle_packets,
            registry,
        }
    }
}

/// Shared state for the HTTP server
pub type SharedStats = Arc<RwLock<TracerStats>>;
pub type SharedMetrics = Arc<Metrics>;

/// Combined app state
#[derive(Clone)]
pub struct AppState {
    pub stats: SharedStats,
    pub metrics: SharedMetrics,
}

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub cycles_completed: u64,
    pub denoms_resolved: u64,
    pub resolution_failures: u64,
    pub snapshot_chains: usize,
    pub last_cycle_packets: usize,
    pub last_cycle_at: Option<DateTime<Utc>>,
}

/// Health check endpoint handler
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let stats = state.stats.read().await;
    Json(HealthResponse {
        status: "healthy".to_string(),
        cycles_completed: stats.cycles_completed,
        denoms_resolved: stats.denoms_resolved,
        resolution_failures: stats.resolution_failures,
        snapshot_chains: stats.snapshot_chains,
        last_cycle_packets: stats.last_cycle_packets,
        last_cycle_at: stats.last_cycle_at,
    })
}

/// Liveness probe (always returns OK if server is running)
async fn liveness() -> &'static str {
    "OK"
}

/// Readiness probe (ready once a batch cycle has completed)
async fn readiness(State(state): State<AppState>) -> &'static str {
    let stats = state.stats.read().await;
    if stats.cycles_completed > 0 {
        "OK"
    } else {
        "NOT_READY"
    }
}

/// Prometheus metrics endpoint
async fn prometheus_metrics(State(state): State<AppState>) -> Response {
    let encoder = TextEncoder::new();
    let metric_families = state.metrics.registry.gather();
    let mut buffer = Vec::new();

    if encoder.encode(&metric_families, &mut buffer).is_err() {
        return (
            axum::http::StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to encode metrics",
        )
            .into_response();
    }

    match Response::builder()
        .header(header::CONTENT_TYPE, encoder.format_type())
        .body(axum::body::Body::from(buffer))
    {
        Ok(resp) => resp,
        Err(_) => (
            axum::http::StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to build metrics response",
        )
            .into_response(),
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/healthz", get(liveness))
        .route("/readyz", get(readiness))
        .route("/metrics", get(prometheus_metrics))
        .with_state(state)
}

/// Start the HTTP server for health and metrics
pub async fn start_server(
    bind_address: &str,
    port: u16,
    stats: SharedStats,
    prom_metrics: SharedMetrics,
) -> eyre::Result<()> {
    let app = router(AppState {
        stats,
        metrics: prom_metrics,
    });

    let addr: SocketAddr = format!("{}:{}", bind_address, port)
        .parse()
        .map_err(|e| eyre!("Invalid bind address {}:{}: {}", bind_address, port, e))?;
    info!("Health server listening on {}", addr);
    info!("  /health  - Full health status (JSON)");
    info!("  /metrics - Prometheus metrics");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
