//! HTTP gateway for the custody registry.
//!
//! Exposes the registry functions as `POST /v1/invoke` over a shared
//! in-memory ledger, persisting a snapshot after every committed write when
//! one is configured.

pub mod config;
pub mod error;
pub mod handler;
pub mod router;
pub mod server;

pub use config::ServerConfig;
pub use error::{ErrorBody, ServerError, ServerResult};
pub use handler::{AppState, HealthResponse, InvokeRequest};
pub use server::CustodyServer;
