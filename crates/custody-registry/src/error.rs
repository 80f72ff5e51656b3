use custody_store::StoreError;
use custody_types::CodecError;

/// Errors produced by registry operations and invocation dispatch.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// Missing, empty, or malformed argument. Raised before any ledger access.
    #[error("invalid arguments: {0}")]
    Validation(String),

    #[error("item already exists: {0}")]
    AlreadyExists(String),

    /// The item is absent, or could not be read at all.
    #[error("{}", not_found_message(.id, .cause))]
    NotFound { id: String, cause: Option<String> },

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("decoding error: {0}")]
    Decoding(String),

    #[error("encoding error: {0}")]
    Encoding(String),

    #[error("unknown function: {0}")]
    UnknownFunction(String),
}

fn not_found_message(id: &str, cause: &Option<String>) -> String {
    match cause {
        Some(cause) => format!("failed to get state for {id}: {cause}"),
        None => format!("item does not exist: {id}"),
    }
}

impl RegistryError {
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound {
            id: id.into(),
            cause: None,
        }
    }

    /// Stable machine-readable name of the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::AlreadyExists(_) => "already_exists",
            Self::NotFound { .. } => "not_found",
            Self::Store(_) => "store",
            Self::Decoding(_) => "decoding",
            Self::Encoding(_) => "encoding",
            Self::UnknownFunction(_) => "unknown_function",
        }
    }

    /// Returns `true` if the ledger rejected the commit because of a
    /// concurrent writer.
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Store(e) if e.is_conflict())
    }
}

impl From<CodecError> for RegistryError {
    fn from(err: CodecError) -> Self {
        match err {
            CodecError::Encoding(msg) => Self::Encoding(msg),
            CodecError::Decoding(msg) => Self::Decoding(msg),
        }
    }
}

pub type RegistryResult<T> = Result<T, RegistryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_messages() {
        assert_eq!(
            RegistryError::not_found("item-1").to_string(),
            "item does not exist: item-1"
        );
        let err = RegistryError::NotFound {
            id: "item-1".into(),
            cause: Some("disk on fire".into()),
        };
        assert_eq!(err.to_string(), "failed to get state for item-1: disk on fire");
        assert_eq!(err.kind(), "not_found");
    }

    #[test]
    fn codec_errors_map_by_kind() {
        let err: RegistryError = CodecError::Decoding("bad".into()).into();
        assert_eq!(err.kind(), "decoding");
        let err: RegistryError = CodecError::Encoding("bad".into()).into();
        assert_eq!(err.kind(), "encoding");
    }

    #[test]
    fn conflict_detection() {
        let err = RegistryError::Store(StoreError::WriteConflict {
            key: "a".into(),
            read: None,
            current: Some(1),
        });
        assert!(err.is_conflict());
        assert!(!RegistryError::Store(StoreError::Unavailable("x".into())).is_conflict());
        assert!(!RegistryError::not_found("a").is_conflict());
    }
}
