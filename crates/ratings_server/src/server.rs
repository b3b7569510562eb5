//! Server startup and binding
//!
//! Provides functionality to start the Axum server with configurable host/port,
//! the startup connection attempt and graceful shutdown.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use crate::config::ServerConfig;
use crate::routes;
use ratings_core::{BatchedFetcher, BondService, IndexScreener, RefDataConnector};

/// Bond service talking to the terminal bridge configured in `config`
pub fn bond_service(config: &ServerConfig) -> BondService {
    let drain = config.drain_policy();
    let connector = RefDataConnector::bridge(
        config.session_options(),
        IndexScreener::new(drain),
        BatchedFetcher::new(config.batch_size, drain),
    );
    BondService::new(connector, config.bond_policy())
}

/// Server instance that can be started
pub struct Server {
    /// Server configuration
    config: Arc<ServerConfig>,
    /// Connection owner shared with the handlers
    service: Arc<BondService>,
    /// The built router
    router: Router,
}

impl Server {
    /// Create a new server instance with the given configuration
    pub fn new(config: ServerConfig) -> Self {
        let service = Arc::new(bond_service(&config));
        Self::with_service(config, service)
    }

    /// Create a server around an existing bond service
    pub fn with_service(config: ServerConfig, service: Arc<BondService>) -> Self {
        let config = Arc::new(config);
        let router = routes::build_router(config.clone(), service.clone());

        Self {
            config,
            service,
            router,
        }
    }

    /// Get the socket address the server will bind to
    pub fn socket_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        self.config.socket_addr().parse()
    }

    /// Get the configuration
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn service(&self) -> &Arc<BondService> {
        &self.service
    }

    /// Try to connect once if configured to; failure leaves the server
    /// running disconnected
    pub async fn connect_on_startup(&self) {
        if !self.config.connect_on_startup {
            return;
        }

        let service = Arc::clone(&self.service);
        match tokio::task::spawn_blocking(move || service.connect()).await {
            Ok(Ok(())) => info!(
                host = %self.config.bloomberg_host,
                port = self.config.bloomberg_port,
                "Connected to Bloomberg Terminal"
            ),
            Ok(Err(e)) => warn!(
                error = %e,
                failure_mode = %self.config.failure_mode,
                "Could not connect to Bloomberg Terminal, serving without a connection"
            ),
            Err(e) => error!(error = %e, "Startup connection task failed"),
        }
    }

    /// Run the server
    ///
    /// Binds to the configured host/port and serves until Ctrl+C or SIGTERM.
    pub async fn run(self) -> Result<(), std::io::Error> {
        let listener = TcpListener::bind(self.config.socket_addr()).await?;
        self.run_with_listener(listener).await
    }

    /// Run the server with a specific listener
    ///
    /// This is useful for testing where you want to use a listener bound to port 0
    /// to get a random available port.
    pub async fn run_with_listener(self, listener: TcpListener) -> Result<(), std::io::Error> {
        self.connect_on_startup().await;

        let addr = listener.local_addr()?;
        info!("Server listening on {}", addr);

        let result = axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await;

        let service = Arc::clone(&self.service);
        if let Err(e) = tokio::task::spawn_blocking(move || service.disconnect()).await {
            error!(error = %e, "Disconnect on shutdown failed");
        }
        info!("Server stopped");

        result
    }

    /// Create a test server and return the bound address
    ///
    /// This binds to port 0 to get a random available port, starts the server
    /// in a background task, and returns the actual bound address.
    #[cfg(test)]
    pub async fn spawn_test_server(
        config: ServerConfig,
        service: Arc<BondService>,
    ) -> (SocketAddr, tokio::task::JoinHandle<()>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let server = Self::with_service(config, service);
        let handle = tokio::spawn(async move {
            server.run_with_listener(listener).await.ok();
        });

        // Give the server a moment to start
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;

        (addr, handle)
    }
}

/// Resolves on Ctrl+C or, on Unix, SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received Ctrl+C, shutting down"),
        () = terminate => info!("Received SIGTERM, shutting down"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FailureMode;
    use ratings_core::fields::ISSUER;
    use ratings_core::{FieldValue, RawFieldRecord, StaticConnector, StaticDataSource};
    use reqwest::StatusCode;

    fn static_service(config: &ServerConfig, source: StaticDataSource) -> Arc<BondService> {
        Arc::new(BondService::new(
            StaticConnector::new(source),
            config.bond_policy(),
        ))
    }

    fn seeded() -> StaticDataSource {
        StaticDataSource::new().with_security(
            "US912828Z250",
            RawFieldRecord::from([(ISSUER.to_string(), Some(FieldValue::from("US TREASURY N/B")))]),
        )
    }

    #[test]
    fn test_server_socket_addr() {
        let config = ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 3000,
            ..Default::default()
        };

        let server = Server::new(config);
        assert_eq!(server.socket_addr().unwrap().to_string(), "127.0.0.1:3000");
        assert!(!server.service().is_connected());
    }

    #[test]
    fn test_server_config_access() {
        let config = ServerConfig {
            port: 9999,
            ..Default::default()
        };

        let server = Server::new(config);
        assert_eq!(server.config().port, 9999);
    }

    #[tokio::test]
    async fn test_server_connects_on_startup() {
        let config = ServerConfig::default();
        let service = static_service(&config, seeded());
        let (addr, handle) = Server::spawn_test_server(config, service.clone()).await;

        let body: serde_json::Value = reqwest::get(format!("http://{}/api/health", addr))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(body["status"], "OK");
        assert_eq!(body["bloomberg_connected"], true);

        let response = reqwest::get(format!("http://{}/api/bonds/US912828Z250", addr))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bond: serde_json::Value = response.json().await.unwrap();
        assert_eq!(bond["issuer"], "US TREASURY N/B");

        handle.abort();
    }

    #[tokio::test]
    async fn test_server_without_startup_connection() {
        let config = ServerConfig {
            connect_on_startup: false,
            failure_mode: FailureMode::Strict,
            ..Default::default()
        };
        let service = static_service(&config, seeded());
        let (addr, handle) = Server::spawn_test_server(config, service).await;

        let response = reqwest::get(format!("http://{}/api/bonds", addr))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let client = reqwest::Client::new();
        let response = client
            .post(format!("http://{}/api/connect", addr))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = reqwest::get(format!("http://{}/api/bonds", addr))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body: serde_json::Value = response.json().await.unwrap();
        assert_eq!(body["mode"], "live");
        assert_eq!(body["count"], 1);

        handle.abort();
    }

    #[tokio::test]
    async fn test_failed_startup_connection_still_serves() {
        let config = ServerConfig::default();
        let service = Arc::new(BondService::new(
            StaticConnector::failing("connection refused"),
            config.bond_policy(),
        ));
        let (addr, handle) = Server::spawn_test_server(config, service).await;

        let response = reqwest::get(format!("http://{}/api/bonds", addr))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body: serde_json::Value = response.json().await.unwrap();
        assert_eq!(body["mode"], "demo");

        handle.abort();
    }

    #[tokio::test]
    async fn test_server_unknown_route_returns_404() {
        let config = ServerConfig::default();
        let service = static_service(&config, StaticDataSource::new());
        let (addr, handle) = Server::spawn_test_server(config, service).await;

        let response = reqwest::get(format!("http://{}/unknown/path", addr))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        handle.abort();
    }
}
