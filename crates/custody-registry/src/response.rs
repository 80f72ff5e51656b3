use serde::{Deserialize, Serialize};

use crate::error::RegistryError;

/// Status code of a successful invocation.
pub const OK: u16 = 200;
/// Status code of a failed invocation.
pub const ERROR: u16 = 500;

/// Terminal result of one invocation, as handed back to the caller.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    pub status: u16,
    pub message: String,
    pub payload: Vec<u8>,
}

impl Response {
    pub fn success(payload: Vec<u8>) -> Self {
        Self {
            status: OK,
            message: String::new(),
            payload,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: ERROR,
            message: message.into(),
            payload: Vec::new(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == OK
    }
}

impl From<RegistryError> for Response {
    fn from(err: RegistryError) -> Self {
        Self::error(err.to_string())
    }
}
