use custody_store::LedgerStore;
use custody_types::{Item, ItemCodec};
use tracing::{debug, info};

use crate::error::{RegistryError, RegistryResult};
use crate::lister::compose_item_list;

/// Registry operations bound to one ledger view.
///
/// Each method is a single read-then-write sequence against `store`. The
/// existence check and the write are not atomic here: when the store is a
/// transaction context, a concurrent writer surfaces as a commit-time
/// [`custody_store::StoreError`] instead.
pub struct Registry<'s, S: LedgerStore + ?Sized> {
    store: &'s mut S,
}

impl<'s, S: LedgerStore + ?Sized> Registry<'s, S> {
    pub fn new(store: &'s mut S) -> Self {
        Self { store }
    }

    /// Create a new item record at `id`.
    ///
    /// `produced` is decoded leniently: a malformed or partial payload
    /// registers the item with empty provenance fields rather than failing.
    /// `location` is recorded only when non-empty.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::Validation`] if `id` is empty.
    /// - [`RegistryError::AlreadyExists`] if a record is present at `id`.
    /// - [`RegistryError::Store`] if the ledger cannot be read or written.
    pub fn register(&mut self, id: &str, produced: &[u8], location: &str) -> RegistryResult<Item> {
        require_id(id)?;
        debug!(item_id = %id, "start register item");

        if self.store.get_state(id)?.is_some() {
            debug!(item_id = %id, "item already exists");
            return Err(RegistryError::AlreadyExists(id.to_string()));
        }

        let produced = ItemCodec::decode_produced_lenient(produced);
        let item = Item::registered(id, produced, location);
        self.save(id, &item)?;

        info!(item_id = %id, producer = %item.produced.producer, "item registered");
        Ok(item)
    }

    /// Merge a custody update into the item at `id`.
    ///
    /// `payload` is a `{owner?, holder?}` object. Non-empty `owner`,
    /// `holder`, and `location` overwrite the stored values; empty ones leave
    /// them untouched. Provenance never changes.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::Validation`] if `id` is empty.
    /// - [`RegistryError::NotFound`] if no record is present at `id`.
    /// - [`RegistryError::Decoding`] if the stored record or `payload` is
    ///   malformed.
    /// - [`RegistryError::Store`] if the ledger cannot be read or written.
    pub fn transfer(&mut self, id: &str, payload: &[u8], location: &str) -> RegistryResult<Item> {
        require_id(id)?;
        debug!(item_id = %id, "start transfer item");

        let stored = self.store.get_state(id)?.ok_or_else(|| {
            debug!(item_id = %id, "item does not exist");
            RegistryError::not_found(id)
        })?;
        let mut item = ItemCodec::decode(&stored)?;
        let payload = ItemCodec::decode_transfer(payload)?;

        let changed = item.apply_transfer(&payload, location);
        self.save(id, &item)?;

        info!(
            item_id = %id,
            owner = %item.owner,
            holder = %item.holder,
            location = %item.location,
            changed,
            "item transferred"
        );
        Ok(item)
    }

    /// The stored record at `id`, byte for byte.
    ///
    /// # Errors
    ///
    /// [`RegistryError::NotFound`] if the record is absent or the ledger read
    /// fails; a read failure keeps its cause in the error.
    pub fn read(&self, id: &str) -> RegistryResult<Vec<u8>> {
        require_id(id)?;
        debug!(item_id = %id, "start read item");

        match self.store.get_state(id) {
            Ok(Some(record)) => Ok(record),
            Ok(None) => Err(RegistryError::not_found(id)),
            Err(e) => Err(RegistryError::NotFound {
                id: id.to_string(),
                cause: Some(e.to_string()),
            }),
        }
    }

    /// All records with keys in `[start_key, end_key)` as one JSON array of
    /// `{"Key": .., "Record": ..}` pairs in ascending key order.
    ///
    /// The scan is all-or-nothing: a ledger error mid-scan discards what was
    /// collected and is returned as [`RegistryError::Store`].
    pub fn ranged_list(&self, start_key: &str, end_key: &str) -> RegistryResult<Vec<u8>> {
        debug!(start_key = %start_key, end_key = %end_key, "start ranged list");
        let iter = self.store.state_by_range(start_key, end_key)?;
        let listing = compose_item_list(iter)?;
        debug!(
            start_key = %start_key,
            end_key = %end_key,
            bytes = listing.len(),
            "ranged list composed"
        );
        Ok(listing)
    }

    /// Write `item` under `key`, the key it was looked up by.
    fn save(&mut self, key: &str, item: &Item) -> RegistryResult<()> {
        let bytes = ItemCodec::encode(item)?;
        self.store.put_state(key, bytes)?;
        Ok(())
    }
}

fn require_id(id: &str) -> RegistryResult<()> {
    if id.is_empty() {
        return Err(RegistryError::Validation(
            "item id must be a non-empty string".into(),
        ));
    }
    Ok(())
}
