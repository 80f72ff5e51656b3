use std::future::Future;
use std::sync::Arc;

use custody_registry::Contract;
use custody_store::InMemoryLedger;
use tokio::net::TcpListener;

use crate::config::ServerConfig;
use crate::error::ServerResult;
use crate::handler::AppState;
use crate::router::build_router;

/// Custody registry HTTP gateway.
pub struct CustodyServer {
    config: ServerConfig,
    state: AppState,
}

impl CustodyServer {
    /// Create a server, restoring the ledger from the configured snapshot.
    pub fn new(config: ServerConfig) -> ServerResult<Self> {
        let ledger = match &config.snapshot_path {
            Some(path) => InMemoryLedger::load_snapshot(path)?,
            None => InMemoryLedger::new(),
        };
        Ok(Self::with_ledger(config, Arc::new(ledger)))
    }

    pub fn with_ledger(config: ServerConfig, ledger: Arc<InMemoryLedger>) -> Self {
        let state = AppState::new(Contract::new(ledger), config.snapshot_path.clone());
        Self { config, state }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn contract(&self) -> &Contract {
        self.state.contract()
    }

    /// Build the router (useful for testing).
    pub fn router(&self) -> axum::Router {
        build_router(self.state.clone(), self.config.max_body_bytes)
    }

    /// Serve until Ctrl-C.
    pub async fn serve(self) -> ServerResult<()> {
        self.serve_with_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::warn!(error = %e, "failed to listen for shutdown signal");
                std::future::pending::<()>().await;
            }
        })
        .await
    }

    /// Serve until `shutdown` resolves, then persist the ledger once more.
    pub async fn serve_with_shutdown<F>(self, shutdown: F) -> ServerResult<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let app = self.router();
        let listener = TcpListener::bind(self.config.bind_addr).await?;
        tracing::info!(
            snapshot = ?self.config.snapshot_path,
            "custody server listening on {}",
            self.config.bind_addr
        );
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await?;

        self.state.persist()?;
        tracing::info!("custody server stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_construction() {
        let server = CustodyServer::new(ServerConfig::default()).unwrap();
        assert_eq!(server.config().bind_addr, "127.0.0.1:7054".parse().unwrap());
        assert!(server.contract().ledger().is_empty().unwrap());
    }

    #[test]
    fn restores_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.json");
        let ledger = InMemoryLedger::new();
        {
            let contract = Contract::new(Arc::new(ledger));
            assert!(contract
                .invoke("register", &["item-1", r#"{"producer":"Acme"}"#])
                .is_success());
            contract.ledger().save_snapshot(&path).unwrap();
        }

        let config = ServerConfig {
            snapshot_path: Some(path),
            ..Default::default()
        };
        let server = CustodyServer::new(config).unwrap();
        assert_eq!(server.contract().ledger().keys().unwrap(), vec!["item-1"]);
    }

    #[test]
    fn router_builds() {
        let server = CustodyServer::new(ServerConfig::default()).unwrap();
        let _router = server.router();
    }
}
