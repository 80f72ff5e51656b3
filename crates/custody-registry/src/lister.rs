use custody_store::{KeyValue, StateIterator, StoreResult};
use custody_types::{Item, ItemCodec};
use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;

use crate::error::{RegistryError, RegistryResult};

/// One element of a range listing: the ledger key and the stored record,
/// embedded as-is.
#[derive(Debug, Serialize, Deserialize)]
pub struct ListedItem {
    #[serde(rename = "Key")]
    pub key: String,
    #[serde(rename = "Record")]
    pub record: Box<RawValue>,
}

impl ListedItem {
    /// Wrap a ledger entry. The stored bytes must be a JSON document; they
    /// are embedded without re-encoding. Whitespace around the document is
    /// not part of the JSON value and is dropped; everything inside it is
    /// kept byte for byte.
    pub fn from_entry(entry: KeyValue) -> RegistryResult<Self> {
        let KeyValue { key, value } = entry;
        let text = String::from_utf8(value)
            .map_err(|_| RegistryError::Encoding(format!("record at {key} is not UTF-8")))?;
        let record = RawValue::from_string(text).map_err(|e| {
            RegistryError::Encoding(format!("record at {key} is not a JSON document: {e}"))
        })?;
        Ok(Self { key, record })
    }

    /// Decode the embedded record.
    pub fn item(&self) -> RegistryResult<Item> {
        Ok(ItemCodec::decode(self.record.get().as_bytes())?)
    }

    /// Parse a listing produced by [`compose_item_list`].
    pub fn parse_list(data: &[u8]) -> RegistryResult<Vec<Self>> {
        serde_json::from_slice(data).map_err(|e| RegistryError::Decoding(e.to_string()))
    }
}

/// Drain a range iterator into a single JSON array of [`ListedItem`]s.
///
/// Entries keep iteration order. The first iterator error aborts the whole
/// listing. The iterator is consumed, so it is released on every path.
pub fn compose_item_list(iter: StateIterator<'_>) -> RegistryResult<Vec<u8>> {
    let entries = iter.collect::<StoreResult<Vec<KeyValue>>>()?;
    let listed = entries
        .into_iter()
        .map(ListedItem::from_entry)
        .collect::<RegistryResult<Vec<_>>>()?;
    serde_json::to_vec(&listed).map_err(|e| RegistryError::Encoding(e.to_string()))
}
