use serde::{Deserialize, Serialize};

/// Custody update carried by a transfer. Empty fields mean "leave as is".
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransferPayload {
    pub owner: String,
    pub holder: String,
}

impl TransferPayload {
    pub fn new(owner: impl Into<String>, holder: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            holder: holder.into(),
        }
    }

    pub fn owner(owner: impl Into<String>) -> Self {
        Self::new(owner, "")
    }

    pub fn holder(holder: impl Into<String>) -> Self {
        Self::new("", holder)
    }
}
