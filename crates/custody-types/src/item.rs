use serde::{Deserialize, Serialize};

use crate::payload::TransferPayload;

/// Type tag stamped on every item record.
pub const ITEM_TYPE: &str = "item";

/// Provenance of an item: who made it, what it is, and where and when it was
/// produced.
///
/// Every field is a free-form string. Missing fields decode to the empty
/// string so older or partial records remain readable.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct ProducedInfo {
    pub producer: String,
    pub model: String,
    pub serial: String,
    pub place: String,
    pub time: String,
}

impl ProducedInfo {
    /// Provenance naming only the producer.
    pub fn new(producer: impl Into<String>) -> Self {
        Self {
            producer: producer.into(),
            ..Default::default()
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_serial(mut self, serial: impl Into<String>) -> Self {
        self.serial = serial.into();
        self
    }

    pub fn with_place(mut self, place: impl Into<String>) -> Self {
        self.place = place.into();
        self
    }

    pub fn with_time(mut self, time: impl Into<String>) -> Self {
        self.time = time.into();
        self
    }

    /// Returns `true` if no field is set.
    pub fn is_empty(&self) -> bool {
        self.producer.is_empty()
            && self.model.is_empty()
            && self.serial.is_empty()
            && self.place.is_empty()
            && self.time.is_empty()
    }
}

/// A tracked physical item.
///
/// The `id` doubles as the ledger key and never changes after registration.
/// `produced` is written once at registration; `location`, `holder`, and
/// `owner` change through transfers. An empty string means "not set".
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Item {
    pub item_type: String,
    pub id: String,
    pub location: String,
    pub holder: String,
    pub owner: String,
    pub produced: ProducedInfo,
}

impl Item {
    /// A freshly registered item. `location` is recorded only when non-empty;
    /// holder and owner start unset.
    pub fn registered(id: impl Into<String>, produced: ProducedInfo, location: &str) -> Self {
        let mut item = Self {
            item_type: ITEM_TYPE.to_string(),
            id: id.into(),
            produced,
            ..Default::default()
        };
        if !location.is_empty() {
            item.location = location.to_string();
        }
        item
    }

    /// Merge a custody update into this item.
    ///
    /// Only non-empty incoming values overwrite; `id`, `item_type`, and
    /// `produced` are never touched. Returns `true` if any field changed.
    pub fn apply_transfer(&mut self, payload: &TransferPayload, location: &str) -> bool {
        let mut changed = false;
        changed |= merge_field(&mut self.owner, &payload.owner);
        changed |= merge_field(&mut self.holder, &payload.holder);
        changed |= merge_field(&mut self.location, location);
        changed
    }
}

fn merge_field(field: &mut String, incoming: &str) -> bool {
    if incoming.is_empty() || field == incoming {
        return false;
    }
    *field = incoming.to_string();
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn widget() -> Item {
        Item::registered(
            "item-1",
            ProducedInfo::new("Acme").with_model("W-1").with_serial("SN-7"),
            "Warehouse A",
        )
    }

    #[test]
    fn registered_sets_fixed_tag() {
        let item = widget();
        assert_eq!(item.item_type, ITEM_TYPE);
        assert_eq!(item.id, "item-1");
        assert_eq!(item.location, "Warehouse A");
        assert!(item.holder.is_empty());
        assert!(item.owner.is_empty());
    }

    #[test]
    fn registered_without_location() {
        let item = Item::registered("item-2", ProducedInfo::new("Acme"), "");
        assert!(item.location.is_empty());
    }

    #[test]
    fn transfer_owner_only() {
        let mut item = widget();
        let before = item.clone();
        let changed = item.apply_transfer(
            &TransferPayload {
                owner: "Alice".into(),
                holder: String::new(),
            },
            "",
        );
        assert!(changed);
        assert_eq!(item.owner, "Alice");
        assert_eq!(item.holder, before.holder);
        assert_eq!(item.location, before.location);
        assert_eq!(item.produced, before.produced);
    }

    #[test]
    fn empty_transfer_is_noop() {
        let mut item = widget();
        item.owner = "Bob".into();
        item.holder = "Carrier".into();
        let before = item.clone();
        assert!(!item.apply_transfer(&TransferPayload::default(), ""));
        assert_eq!(item, before);
    }

    #[test]
    fn transfer_all_fields() {
        let mut item = widget();
        item.apply_transfer(&TransferPayload::new("Alice", "Carrier"), "Dock 4");
        assert_eq!(item.owner, "Alice");
        assert_eq!(item.holder, "Carrier");
        assert_eq!(item.location, "Dock 4");
        assert_eq!(item.id, "item-1");
        assert_eq!(item.item_type, ITEM_TYPE);
    }

    #[test]
    fn produced_info_is_empty() {
        assert!(ProducedInfo::default().is_empty());
        assert!(!ProducedInfo::new("Acme").is_empty());
    }
}
