use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use custody_registry::{Contract, Execution, Function};
use serde::de::IgnoredAny;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, error};

use crate::error::{ServerError, ServerResult};

/// Shared handler state.
#[derive(Clone, Debug)]
pub struct AppState {
    contract: Contract,
    snapshot_path: Option<PathBuf>,
    persist_lock: Arc<Mutex<()>>,
}

impl AppState {
    pub fn new(contract: Contract, snapshot_path: Option<PathBuf>) -> Self {
        Self {
            contract,
            snapshot_path,
            persist_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn contract(&self) -> &Contract {
        &self.contract
    }

    /// Run one invocation and, if it wrote anything, persist the ledger.
    ///
    /// The commit is the outcome: a snapshot that fails to save is logged
    /// and retried on the next write, but never reported as a failed call.
    pub fn invoke(&self, request: &InvokeRequest) -> ServerResult<Execution> {
        let execution = self.contract.call(&request.function, &request.args)?;
        if execution.receipt.writes > 0 {
            if let Err(e) = self.persist() {
                error!(
                    function = %execution.function,
                    version = execution.receipt.version,
                    error = %e,
                    "committed write not persisted to snapshot"
                );
            }
        }
        Ok(execution)
    }

    /// Save the ledger snapshot, if one is configured.
    pub fn persist(&self) -> ServerResult<()> {
        let Some(path) = &self.snapshot_path else {
            return Ok(());
        };
        let _guard = self
            .persist_lock
            .lock()
            .map_err(|_| ServerError::Internal("snapshot lock poisoned".into()))?;
        self.contract.ledger().save_snapshot(path)?;
        Ok(())
    }
}

/// Body of `POST /v1/invoke`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvokeRequest {
    pub function: String,
    #[serde(default)]
    pub args: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "ok".into(),
            version: env!("CARGO_PKG_VERSION").into(),
        }
    }
}

/// Health check handler.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::default())
}

/// Info handler.
pub async fn info_handler() -> Json<serde_json::Value> {
    let functions: Vec<&str> = Function::ALL.iter().map(Function::name).collect();
    Json(json!({
        "name": "custody-server",
        "version": env!("CARGO_PKG_VERSION"),
        "functions": functions,
    }))
}

/// Invoke a registry function.
pub async fn invoke_handler(
    State(state): State<AppState>,
    Json(request): Json<InvokeRequest>,
) -> Result<Response, ServerError> {
    debug!(function = %request.function, args = request.args.len(), "invoke request");
    let execution = tokio::task::spawn_blocking(move || state.invoke(&request))
        .await
        .map_err(|e| ServerError::Internal(e.to_string()))??;
    Ok(payload_response(execution.payload))
}

fn payload_response(payload: Vec<u8>) -> Response {
    if payload.is_empty() {
        return StatusCode::OK.into_response();
    }
    let content_type = if serde_json::from_slice::<IgnoredAny>(&payload).is_ok() {
        "application/json"
    } else {
        "application/octet-stream"
    };
    ([(header::CONTENT_TYPE, content_type)], payload).into_response()
}
