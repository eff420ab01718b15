//! # HTTP Server
//!
//! Combines the diagnose and observability routers and runs the idle-session
//! sweeper alongside the listener.

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use chrono::Utc;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::config::HttpServerConfig;
use super::diagnose_routes::{diagnose_routes, DiagnoseState};
use super::observability_routes::{health_routes, observability_routes};
use crate::observability::{log_event, Event, Logger};

pub struct HttpServer {
    config: HttpServerConfig,
    state: Arc<DiagnoseState>,
    router: Router,
}

impl HttpServer {
    pub fn with_config(config: HttpServerConfig, state: DiagnoseState) -> Self {
        let state = Arc::new(state);
        let router = Self::build_router(&config, Arc::clone(&state));
        Self {
            config,
            state,
            router,
        }
    }

    fn build_router(config: &HttpServerConfig, state: Arc<DiagnoseState>) -> Router {
        let metrics = Arc::clone(state.service.metrics());

        let cors = if config.cors_origins.is_empty() {
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        } else {
            let origins: Vec<_> = config
                .cors_origins
                .iter()
                .filter_map(|s| s.parse().ok())
                .collect();
            CorsLayer::new()
                .allow_origin(AllowOrigin::list(origins))
                .allow_methods(Any)
                .allow_headers(Any)
        };

        Router::new()
            .merge(health_routes())
            .nest("/diagnose", diagnose_routes(state))
            .nest("/observability", observability_routes(metrics))
            .layer(TraceLayer::new_for_http())
            .layer(cors)
    }

    pub fn socket_addr(&self) -> String {
        self.config.socket_addr()
    }

    /// Get the router (for testing)
    pub fn router(self) -> Router {
        self.router
    }

    fn spawn_sweeper(&self) {
        if self.config.evict_interval_secs == 0 {
            return;
        }
        let state = Arc::clone(&self.state);
        let period = Duration::from_secs(self.config.evict_interval_secs);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            loop {
                ticker.tick().await;
                if let Err(e) = state.service.evict_idle(Utc::now()) {
                    let reason = e.to_string();
                    Logger::error("EVICTION_FAILED", &[("reason", reason.as_str())]);
                }
            }
        });
    }

    pub async fn start(self) -> Result<(), io::Error> {
        let addr: SocketAddr = self.config.socket_addr().parse().map_err(|e| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("invalid socket address '{}': {}", self.config.socket_addr(), e),
            )
        })?;

        let listener = TcpListener::bind(addr).await?;
        self.spawn_sweeper();
        let addr_str = addr.to_string();
        log_event(Event::Serving, &[("addr", addr_str.as_str())]);

        axum::serve(listener, self.router).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::engine::{DiagnosisEngine, DiagnosisService};
    use crate::http_server::SharedStore;
    use crate::session::TerminationPolicy;
    use crate::store::InMemorySessionStore;

    fn state() -> DiagnoseState {
        let engine = DiagnosisEngine::new(
            Arc::new(Catalog::builtin().unwrap()),
            TerminationPolicy::default(),
        );
        let store: SharedStore = Arc::new(InMemorySessionStore::new());
        DiagnoseState::new(DiagnosisService::new(engine, store))
    }

    #[test]
    fn test_server_with_custom_port() {
        let server = HttpServer::with_config(HttpServerConfig::with_port(9090), state());
        assert_eq!(server.socket_addr(), "127.0.0.1:9090");
    }

    #[test]
    fn test_router_builds() {
        let server = HttpServer::with_config(HttpServerConfig::default(), state());
        let _router = server.router();
    }
}
