use serde_json::{Map, Value};

use crate::error::{CodecError, CodecResult};
use crate::item::{Item, ProducedInfo};
use crate::payload::TransferPayload;

/// Codec for item records and operation payloads.
///
/// Records are keyed JSON objects. Unknown fields are ignored and missing
/// fields decode to empty strings, so records written by older or newer
/// versions stay readable.
pub struct ItemCodec;

impl ItemCodec {
    /// Encode an item record.
    pub fn encode(item: &Item) -> CodecResult<Vec<u8>> {
        serde_json::to_vec(item).map_err(|e| CodecError::Encoding(e.to_string()))
    }

    /// Decode an item record.
    pub fn decode(data: &[u8]) -> CodecResult<Item> {
        serde_json::from_slice(data).map_err(|e| CodecError::Decoding(e.to_string()))
    }

    /// Encode a provenance payload as accepted by registration.
    pub fn encode_produced(produced: &ProducedInfo) -> CodecResult<Vec<u8>> {
        serde_json::to_vec(produced).map_err(|e| CodecError::Encoding(e.to_string()))
    }

    /// Decode a provenance payload without ever failing.
    ///
    /// A well-formed payload decodes normally. An object with some ill-typed
    /// members keeps its string members and blanks the rest. Anything else
    /// yields an empty [`ProducedInfo`].
    pub fn decode_produced_lenient(data: &[u8]) -> ProducedInfo {
        if let Ok(produced) = serde_json::from_slice::<ProducedInfo>(data) {
            return produced;
        }
        match serde_json::from_slice::<Value>(data) {
            Ok(Value::Object(fields)) => ProducedInfo {
                producer: string_member(&fields, "producer"),
                model: string_member(&fields, "model"),
                serial: string_member(&fields, "serial"),
                place: string_member(&fields, "place"),
                time: string_member(&fields, "time"),
            },
            _ => ProducedInfo::default(),
        }
    }

    /// Encode a transfer payload.
    pub fn encode_transfer(payload: &TransferPayload) -> CodecResult<Vec<u8>> {
        serde_json::to_vec(payload).map_err(|e| CodecError::Encoding(e.to_string()))
    }

    /// Decode a transfer payload. Malformed input is rejected.
    pub fn decode_transfer(data: &[u8]) -> CodecResult<TransferPayload> {
        serde_json::from_slice(data).map_err(|e| CodecError::Decoding(e.to_string()))
    }
}

fn string_member(fields: &Map<String, Value>, name: &str) -> String {
    fields
        .get(name)
        .and_then(Value::as_str)
        .map(str::to_owned)
        .unwrap_or_default()
}
