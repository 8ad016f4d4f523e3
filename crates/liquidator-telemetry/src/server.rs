//! HTTP endpoint for the metrics registry.
//!
//! Serves `GET /metrics` in the Prometheus text format until the shutdown
//! future resolves.

use crate::error::{TelemetryError, TelemetryResult};
use crate::metrics::Metrics;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use std::future::Future;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

const PROMETHEUS_CONTENT_TYPE: &str = "text/plain; version=0.0.4";

/// Router with the `/metrics` route.
pub fn metrics_router() -> Router {
    Router::new().route("/metrics", get(serve_metrics))
}

async fn serve_metrics() -> Response {
    match Metrics::encode() {
        Ok(body) => ([(header::CONTENT_TYPE, PROMETHEUS_CONTENT_TYPE)], body).into_response(),
        Err(e) => {
            warn!(error = %e, "Failed to encode metrics");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

/// Running metrics server.
pub struct MetricsServer {
    local_addr: SocketAddr,
    handle: JoinHandle<()>,
}

impl MetricsServer {
    /// Bind `addr` and serve in a background task until `shutdown` resolves.
    ///
    /// Binding happens before this returns, so an unusable address is
    /// reported to the caller.
    pub async fn start<F>(addr: SocketAddr, shutdown: F) -> TelemetryResult<Self>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let bind_error = |e: std::io::Error| TelemetryError::MetricsBind {
            addr: addr.to_string(),
            reason: e.to_string(),
        };
        let listener = TcpListener::bind(addr).await.map_err(bind_error)?;
        let local_addr = listener.local_addr().map_err(bind_error)?;
        info!(addr = %local_addr, "Metrics server listening");

        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, metrics_router())
                .with_graceful_shutdown(shutdown)
                .await
            {
                error!(error = %e, "Metrics server failed");
            }
        });

        Ok(Self { local_addr, handle })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Wait for the server task to finish after shutdown.
    pub async fn stopped(self) {
        if let Err(e) = self.handle.await {
            warn!(error = %e, "Metrics server task ended abnormally");
        }
    }
}
