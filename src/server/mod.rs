//! Dashboard HTTP server
//!
//! ```text
//! GET /             - settings form
//! GET /analyze      - run an analysis with the form's query fields
//! GET /api/health   - health check
//! ```

use std::sync::{Arc, Mutex};
use std::time::Instant;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::dashboard::{self, AnalysisForm, PageRenderer};
use crate::error::Error;
use crate::trends::{self, ClientCache, ClientHandle};
use crate::utils::error::FetchError;

/// Supplies a client handle for each run
pub type HandleProvider = Arc<dyn Fn() -> Result<ClientHandle, FetchError> + Send + Sync>;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,

    /// Page renderer
    pub renderer: Arc<PageRenderer>,

    /// Client handle source
    pub provider: HandleProvider,

    /// Server start time
    pub start_time: Instant,
}

impl AppState {
    /// State backed by a [`ClientCache`] of real trends clients
    pub fn new(config: Config) -> crate::error::Result<Self> {
        let cache = Arc::new(Mutex::new(ClientCache::new(config.trends.handle_ttl())));
        let trends_config = config.trends.clone();

        let provider: HandleProvider = Arc::new(move || {
            let mut cache = cache
                .lock()
                .map_err(|_| FetchError::new("Client cache lock poisoned"))?;
            trends::initialize(&mut cache, &trends_config)
        });

        Self::with_provider(config, provider)
    }

    /// State with a custom handle provider
    pub fn with_provider(config: Config, provider: HandleProvider) -> crate::error::Result<Self> {
        Ok(Self {
            config: Arc::new(config),
            renderer: Arc::new(PageRenderer::new()?),
            provider,
            start_time: Instant::now(),
        })
    }
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
}

/// Create the dashboard router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/analyze", get(analyze))
        .route("/api/health", get(health_check))
        .with_state(state)
}

fn error_page(err: Error) -> Response {
    tracing::error!(error = %err, "Failed to render dashboard page");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Html(format!(
            "<h1>Internal error</h1><p>{}</p>",
            handlebars::html_escape(&err.to_string())
        )),
    )
        .into_response()
}

async fn index(State(state): State<AppState>) -> Response {
    match state.renderer.render(&AnalysisForm::default(), None) {
        Ok(html) => Html(html).into_response(),
        Err(e) => error_page(e),
    }
}

async fn analyze(State(state): State<AppState>, Query(form): Query<AnalysisForm>) -> Response {
    let provider = state.provider.clone();
    let report = dashboard::analyze(&form, move || provider()).await;

    match state.renderer.render(&form, Some(&report)) {
        Ok(html) => Html(html).into_response(),
        Err(e) => error_page(e),
    }
}

async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
    })
}

/// Dashboard server
pub struct DashboardServer {
    state: AppState,
}

impl DashboardServer {
    pub fn new(config: Config) -> crate::error::Result<Self> {
        Ok(Self {
            state: AppState::new(config)?,
        })
    }

    pub fn with_state(state: AppState) -> Self {
        Self { state }
    }

    /// Build the router with configured layers
    pub fn build_router(&self) -> Router {
        let server = &self.state.config.server;
        let mut router = create_router(self.state.clone());

        if server.enable_cors {
            router = router.layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any),
            );
        }

        if server.enable_request_logging {
            router = router.layer(TraceLayer::new_for_http());
        }

        router
    }

    /// Serve until `shutdown_signal` resolves
    pub async fn start_with_shutdown(
        &self,
        shutdown_signal: impl std::future::Future<Output = ()> + Send + 'static,
    ) -> crate::error::Result<()> {
        let router = self.build_router();
        let addr = self.state.config.server.bind_address;

        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!("Dashboard listening on http://{}", addr);

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal)
            .await?;

        tracing::info!("Dashboard server shutdown complete");
        Ok(())
    }
}
