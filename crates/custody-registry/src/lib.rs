//! Custody registry: the state-transition layer of the item ledger.
//!
//! This crate is the heart of the registry. It provides:
//! - [`Registry`] operations: `register`, `transfer`, `read`, `ranged_list`
//! - Range-list composition into a single JSON array of `{Key, Record}`
//!   pairs with records spliced verbatim
//! - [`Invocation`]: the closed set of callable functions, resolved once from
//!   a function name and byte-string arguments
//! - [`Contract`]: runs one invocation per ledger transaction and turns the
//!   outcome into a [`Response`]
//!
//! Operations see storage only through [`custody_store::LedgerStore`]. Every
//! read-then-write sequence relies on the ledger rejecting conflicting
//! commits; nothing here assumes a single writer.

pub mod contract;
pub mod error;
pub mod invocation;
pub mod lister;
pub mod operations;
pub mod response;

#[cfg(test)]
mod test_support;

pub use contract::{Contract, Execution};
pub use error::{RegistryError, RegistryResult};
pub use invocation::{Function, Invocation};
pub use lister::{compose_item_list, ListedItem};
pub use operations::Registry;
pub use response::Response;

pub use custody_types::{Item, ItemCodec, ProducedInfo, TransferPayload, ITEM_TYPE};
