use axum::debug_handler;
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use serde::Deserialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tracing::info;

use lilo_client::config::Config;
use lilo_client::http_client::ReqwestLiloClient;
use lilo_client::retry::RetryPolicy;
use lilo_stats::services::StatsService;
use lilo_stats::{ReportOptions, Scope, StatsError, StatsReport, parse_trend_value};

struct AppState {
    service: StatsService,
    defaults: ReportOptions,
    metrics: PrometheusHandle,
}

#[derive(Debug, Default, Deserialize)]
struct ReportParams {
    top_n: Option<usize>,
    trend: Option<String>,
}

impl ReportParams {
    fn options(&self, defaults: &ReportOptions) -> Result<ReportOptions, StatsError> {
        let mut options = defaults.clone();
        if let Some(n) = self.top_n {
            options.top_n = n;
        }
        if let Some(t) = self.trend.as_deref() {
            options.trend_value = parse_trend_value(t)?;
        }
        Ok(options)
    }
}

#[debug_handler]
async fn health() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

#[debug_handler]
async fn metrics_endpoint(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let body = state.metrics.render();
    ([("content-type", "text/plain; version=0.0.4")], body)
}

#[debug_handler]
async fn team_stats(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ReportParams>,
) -> Result<Json<StatsReport>, (StatusCode, String)> {
    build_report(&state, Scope::Team, &params).await
}

#[debug_handler]
async fn user_stats(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(params): Query<ReportParams>,
) -> Result<Json<StatsReport>, (StatusCode, String)> {
    build_report(&state, Scope::User(id), &params).await
}

async fn build_report(
    state: &AppState,
    scope: Scope,
    params: &ReportParams,
) -> Result<Json<StatsReport>, (StatusCode, String)> {
    let options = params.options(&state.defaults).map_err(map_err)?;
    metrics::counter!("lilo_stats_reports_total", "scope" => scope_label(&scope)).increment(1);
    state
        .service
        .report(&scope, &options)
        .await
        .map(Json)
        .map_err(map_err)
}

fn scope_label(scope: &Scope) -> &'static str {
    match scope {
        Scope::User(_) => "user",
        Scope::Team => "team",
    }
}

fn map_err(e: StatsError) -> (StatusCode, String) {
    let status = if e.is_upstream() {
        StatusCode::BAD_GATEWAY
    } else {
        StatusCode::BAD_REQUEST
    };
    (status, e.to_string())
}


#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let log_env = lilo_stats::init_tracing();
    tracing::info!(%log_env, "lilo_stats:http: log filter");

    let handle = PrometheusBuilder::new().install_recorder()?;

    let cfg = Config::from_env()?;
    let defaults = lilo_stats::options_from_env_with(|k| std::env::var(k).ok())?;
    let client = ReqwestLiloClient::from_config(&cfg);
    let service = StatsService::new(Arc::new(client), RetryPolicy::with_retries(cfg.max_retries));
    let state = Arc::new(AppState {
        service,
        defaults,
        metrics: handle,
    });

    let app = Router::new()
        .route("/health", get(health))
        .route("/metrics", get(metrics_endpoint))
        .route("/stats/team", get(team_stats))
        .route("/stats/users/{id}", get(user_stats))
        .with_state(state);

    let addr: SocketAddr = std::env::var("ADDRESS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| SocketAddr::from(([127, 0, 0, 1], 3000)));
    info!(%addr, backend = %cfg.base_url, "starting HTTP server");

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!("Failed to bind to address {addr}: {e}");
            std::process::exit(1);
        }
    };

    let server = axum::serve(listener, app.into_make_service());
    if let Err(e) = server
        .with_graceful_shutdown(async {
            if let Err(e) = signal::ctrl_c().await {
                tracing::error!("failed to listen for ctrl+c: {e}");
            }
        })
        .await
    {
        tracing::error!("Server error: {e}");
        std::process::exit(1);
    }

    Ok(())
}
