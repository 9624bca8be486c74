//! HTTP API Server
//!
//! Axum-based HTTP server for the job board REST API.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tracing::{error, info, warn};

use crate::api::ProductService;
use crate::config::HttpConfig;

use super::routes::build_app;

/// Time allowed for in-flight requests to drain after a shutdown signal
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// HTTP API server
pub struct HttpServer {
    config: HttpConfig,
    service: Arc<ProductService>,
}

impl HttpServer {
    pub fn new(config: HttpConfig, service: Arc<ProductService>) -> Self {
        Self { config, service }
    }

    /// Run the HTTP server until a shutdown signal arrives
    pub async fn run(&self, mut shutdown: broadcast::Receiver<()>) -> Result<()> {
        let addr: SocketAddr = self
            .config
            .listen_addr
            .parse()
            .context("Invalid HTTP listen address")?;

        let app = build_app(self.service.clone(), &self.config)?;

        let listener = TcpListener::bind(&addr)
            .await
            .context("Failed to bind HTTP server")?;

        info!("HTTP API server listening on http://{}", addr);
        if self.config.cors.enabled && self.config.cors.allows_any_origin() {
            info!("CORS allows any origin (credentials: {})", self.config.cors.allow_credentials);
        }

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                info!("HTTP server shutting down");
            })
            .await
            .context("HTTP server error")?;

        Ok(())
    }

    /// Serve until `signal` resolves or the server stops on its own.
    ///
    /// A server that fails (bind error, bad CORS origin) returns its error
    /// immediately instead of waiting for the signal. After the signal the
    /// server gets a grace period to drain, then is aborted.
    pub async fn run_until<F>(self, signal: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
        let mut handle = tokio::spawn(async move { self.run(shutdown_rx).await });
        let abort = handle.abort_handle();

        tokio::select! {
            joined = &mut handle => {
                return match joined {
                    Ok(Ok(())) => {
                        warn!("HTTP server stopped without a shutdown signal");
                        Ok(())
                    }
                    Ok(Err(e)) => {
                        error!("HTTP server failed: {:#}", e);
                        Err(e)
                    }
                    Err(e) => {
                        error!("HTTP server task failed: {}", e);
                        Err(e.into())
                    }
                };
            }
            _ = signal => {}
        }

        let _ = shutdown_tx.send(());

        match tokio::time::timeout(SHUTDOWN_GRACE, handle).await {
            Ok(Ok(Ok(()))) => {
                info!("HTTP server shut down cleanly");
                Ok(())
            }
            Ok(Ok(Err(e))) => {
                error!("HTTP server failed: {:#}", e);
                Err(e)
            }
            Ok(Err(e)) => {
                error!("HTTP server task failed: {}", e);
                Err(e.into())
            }
            Err(_) => {
                warn!("HTTP server did not shut down within {:?}, aborting", SHUTDOWN_GRACE);
                abort.abort();
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::PlottersRenderer;
    use crate::store::MemoryStore;

    fn test_service() -> Arc<ProductService> {
        Arc::new(ProductService::new(
            Arc::new(MemoryStore::new()),
            Arc::new(PlottersRenderer::new(&Default::default())),
        ))
    }

    #[tokio::test]
    async fn server_stops_on_shutdown_signal() {
        let service = test_service();
        let config = HttpConfig {
            listen_addr: "127.0.0.1:0".to_string(),
            ..Default::default()
        };
        let (tx, rx) = broadcast::channel(1);
        let server = HttpServer::new(config, service);

        let handle = tokio::spawn(async move { server.run(rx).await });
        tokio::time::sleep(Duration::from_millis(50)).await;
        tx.send(()).unwrap();

        let result = tokio::time::timeout(Duration::from_secs(5), handle).await;
        assert!(result.unwrap().unwrap().is_ok());
    }

    #[tokio::test]
    async fn run_until_returns_when_port_is_taken() {
        let taken = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let config = HttpConfig {
            listen_addr: taken.local_addr().unwrap().to_string(),
            ..Default::default()
        };
        let server = HttpServer::new(config, test_service());

        let result = tokio::time::timeout(
            Duration::from_secs(5),
            server.run_until(std::future::pending()),
        )
        .await
        .expect("bind failure should not wait for a shutdown signal");

        let err = result.unwrap_err();
        assert!(err.to_string().contains("Failed to bind HTTP server"));
    }

    #[tokio::test]
    async fn run_until_stops_on_signal() {
        let config = HttpConfig {
            listen_addr: "127.0.0.1:0".to_string(),
            ..Default::default()
        };
        let server = HttpServer::new(config, test_service());

        let signal = tokio::time::sleep(Duration::from_millis(50));
        let result = tokio::time::timeout(Duration::from_secs(10), server.run_until(signal)).await;
        assert!(result.unwrap().is_ok());
    }

    #[tokio::test]
    async fn invalid_listen_addr_is_rejected() {
        let service = test_service();
        let config = HttpConfig {
            listen_addr: "not an address".to_string(),
            ..Default::default()
        };
        let (_tx, rx) = broadcast::channel(1);
        let err = HttpServer::new(config, service).run(rx).await.unwrap_err();
        assert!(err.to_string().contains("Invalid HTTP listen address"));
    }
}
