//! REST 介面：路由、驗證中介層與錯誤映射

pub mod auth;
pub mod error;
mod handlers;
pub mod params;

use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use axum::body::Body;
use axum::http::Request;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tracing::{info, Instrument};

use crate::adapters::sqlite::SqliteStore;
use crate::core::services::{
    DashboardService, EpicService, InitiativeService, PortfolioService, RequirementService,
    SponsorService,
};
use crate::domain::ports::TokenVerifier;

pub use auth::{require_auth, Claims, JwtAuthenticator};

/// 所有 handler 共用的狀態
#[derive(Clone)]
pub struct AppState {
    pub sponsors: SponsorService<SqliteStore>,
    pub portfolios: PortfolioService<SqliteStore>,
    pub initiatives: InitiativeService<SqliteStore>,
    pub epics: EpicService<SqliteStore>,
    pub requirements: RequirementService<SqliteStore>,
    pub dashboard: DashboardService<SqliteStore>,
    pub verifier: Arc<dyn TokenVerifier>,
}

impl AppState {
    pub fn new(store: SqliteStore, verifier: Arc<dyn TokenVerifier>) -> Self {
        let store = Arc::new(store);
        Self {
            sponsors: SponsorService::new(store.clone()),
            portfolios: PortfolioService::new(store.clone()),
            initiatives: InitiativeService::new(store.clone()),
            epics: EpicService::new(store.clone()),
            requirements: RequirementService::new(store.clone()),
            dashboard: DashboardService::new(store),
            verifier,
        }
    }
}

/// 組裝完整路由：`/health` 公開，`/api/*` 需要 Bearer token
pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .merge(handlers::sponsors::routes())
        .merge(handlers::portfolios::routes())
        .merge(handlers::initiatives::routes())
        .merge(handlers::epics::routes())
        .merge(handlers::requirements::routes())
        .merge(handlers::dashboard_routes())
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .route("/health", get(health))
        .nest("/api", api)
        .layer(middleware::from_fn(request_tracing))
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok", "version": env!("CARGO_PKG_VERSION") }))
}

async fn request_tracing(request: Request<Body>, next: Next) -> Response {
    let method = request.method().to_string();
    let route = request.uri().path().to_string();
    let span = tracing::info_span!("http.request", method = %method, route = %route);

    let started = Instant::now();
    let response = next.run(request).instrument(span).await;
    info!(
        "🌐 {} {} -> {} ({} ms)",
        method,
        route,
        response.status().as_u16(),
        started.elapsed().as_millis()
    );
    response
}

/// 在既有的 listener 上提供服務，直到 `shutdown` 完成
pub async fn serve_with_shutdown<F>(
    listener: TcpListener,
    state: AppState,
    shutdown: F,
) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    if let Ok(addr) = listener.local_addr() {
        info!("🚀 Portfolio API listening on {}", addr);
    }
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await
}
