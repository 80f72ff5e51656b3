use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use custody_registry::RegistryError;
use custody_store::StoreError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type ServerResult<T> = Result<T, ServerError>;

/// JSON body of every error response.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub message: String,
}

impl ServerError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Registry(err) => registry_status(err),
            Self::Store(err) if err.is_conflict() => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Registry(err) => err.kind(),
            Self::Store(_) => "store",
            Self::Config(_) => "config",
            Self::Io(_) => "io",
            Self::Internal(_) => "internal",
        }
    }
}

fn registry_status(err: &RegistryError) -> StatusCode {
    match err {
        RegistryError::Validation(_)
        | RegistryError::Decoding(_)
        | RegistryError::UnknownFunction(_) => StatusCode::BAD_REQUEST,
        RegistryError::NotFound { .. } => StatusCode::NOT_FOUND,
        RegistryError::AlreadyExists(_) => StatusCode::CONFLICT,
        RegistryError::Store(store) if store.is_conflict() => StatusCode::CONFLICT,
        RegistryError::Store(_) | RegistryError::Encoding(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(kind = self.kind(), error = %self, "request failed");
        }
        let body = ErrorBody {
            error: self.kind().to_string(),
            message: match &self {
                Self::Registry(err) => err.to_string(),
                other => other.to_string(),
            },
        };
        (status, Json(body)).into_response()
    }
}
