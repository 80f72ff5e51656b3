//! Foundation types for the custody registry.
//!
//! Every record the registry keeps is an [`Item`]: a uniquely identified
//! physical object with write-once provenance ([`ProducedInfo`]) and mutable
//! custody fields (location, holder, owner). Records are persisted through
//! the [`ItemCodec`], a keyed JSON encoding that tolerates added fields.
//!
//! # Key Types
//!
//! - [`Item`]: the registry aggregate, keyed by its `id`
//! - [`ProducedInfo`]: producer, model, serial, place, and time of manufacture
//! - [`TransferPayload`]: the custody update carried by a transfer
//! - [`ItemCodec`]: encode/decode for records and payloads

pub mod codec;
pub mod error;
pub mod item;
pub mod payload;

pub use codec::ItemCodec;
pub use error::{CodecError, CodecResult};
pub use item::{Item, ProducedInfo, ITEM_TYPE};
pub use payload::TransferPayload;
